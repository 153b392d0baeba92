use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    assets::variant::LogoSources,
    encode::raster::ExportFormat,
    foundation::error::{NoteError, NoteResult},
};

/// Overrides the serif face path.
pub const ENV_SERIF_FONT: &str = "QZES_SERIF_FONT";
/// Overrides the sans face path.
pub const ENV_SANS_FONT: &str = "QZES_SANS_FONT";
/// Overrides the export directory.
pub const ENV_OUT_DIR: &str = "QZES_OUT_DIR";

/// Host configuration, read from TOML.
///
/// ```toml
/// [fonts]
/// serif = "fonts/NotoSerifSC-Bold.otf"
/// sans = "fonts/NotoSansSC-Regular.otf"
///
/// [logo]
/// opaque = "https://example.org/logo.jpg"
/// transparent = "https://example.org/logo.png"
///
/// [export]
/// dir = "out"
/// format = "png"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// `[fonts]`
    pub fonts: FontPaths,
    /// `[logo]`
    pub logo: LogoSources,
    /// `[export]`
    pub export: ExportSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Font files for the two faces. A missing face falls back to the other.
pub struct FontPaths {
    /// Title, values and dates.
    pub serif: Option<PathBuf>,
    /// Header, body and labels.
    pub sans: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Where and how notes are written.
pub struct ExportSettings {
    /// Output directory, created on demand.
    pub dir: PathBuf,
    /// Default output format.
    pub format: ExportFormat,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            format: ExportFormat::Png,
        }
    }
}

impl AppConfig {
    /// Parse TOML text. Unknown keys are rejected.
    pub fn from_toml_str(text: &str) -> NoteResult<Self> {
        toml::from_str(text).map_err(|e| NoteError::config(format!("invalid config: {e}")))
    }

    /// Read `path` (defaults when absent or missing), then apply environment
    /// overrides.
    ///
    /// Relative font paths in the file are resolved against its directory.
    pub fn load(path: Option<&Path>) -> NoteResult<Self> {
        let mut cfg = match path {
            Some(path) => Self::read_file(path)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var_os(key).map(PathBuf::from));
        Ok(cfg)
    }

    fn read_file(path: &Path) -> NoteResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(NoteError::config(format!(
                    "read config '{}': {err}",
                    path.display()
                )));
            }
        };
        let mut cfg = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            cfg.fonts.resolve_relative(base);
        }
        Ok(cfg)
    }

    /// Apply `QZES_*` overrides looked up through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<PathBuf>) {
        if let Some(p) = var(ENV_SERIF_FONT) {
            self.fonts.serif = Some(p);
        }
        if let Some(p) = var(ENV_SANS_FONT) {
            self.fonts.sans = Some(p);
        }
        if let Some(p) = var(ENV_OUT_DIR) {
            self.export.dir = p;
        }
    }
}

impl FontPaths {
    fn resolve_relative(&mut self, base: &Path) {
        for slot in [&mut self.serif, &mut self.sans] {
            if let Some(p) = slot.as_mut()
                && p.is_relative()
            {
                *p = base.join(&*p);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/app.rs"]
mod tests;
