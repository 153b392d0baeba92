use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;

/// Which logo file suits the current background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogoVariant {
    /// Flat logo with a white field; only used on opaque white paper.
    Opaque,
    /// Logo with an alpha channel for colored or transparent backgrounds.
    Transparent,
}

impl LogoVariant {
    /// `Opaque` only for opaque white paper.
    pub fn for_background(background: Rgba8) -> Self {
        if background == Rgba8::WHITE {
            LogoVariant::Opaque
        } else {
            LogoVariant::Transparent
        }
    }
}

/// URLs for the two logo variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoSources {
    /// Used on opaque white (`logo.jpg`).
    pub opaque: String,
    /// Used on any other background (`logo.png`).
    pub transparent: String,
}

impl Default for LogoSources {
    fn default() -> Self {
        Self {
            opaque: "logo.jpg".to_string(),
            transparent: "logo.png".to_string(),
        }
    }
}

impl LogoSources {
    /// Configured URL of `variant`.
    pub fn url_for(&self, variant: LogoVariant) -> &str {
        match variant {
            LogoVariant::Opaque => &self.opaque,
            LogoVariant::Transparent => &self.transparent,
        }
    }

    /// URL of the variant that suits `background`.
    pub fn url_for_background(&self, background: Rgba8) -> &str {
        self.url_for(LogoVariant::for_background(background))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/variant.rs"]
mod tests;
