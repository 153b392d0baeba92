use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{NoteError, NoteResult},
    foundation::math::mul_div255_u8,
    render::bitmap::Bitmap,
};

/// Exported file format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Keeps the alpha channel (transparent paper stays transparent).
    #[default]
    Png,
    /// Flattened over white.
    #[serde(alias = "jpg")]
    Jpeg,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            other => Err(NoteError::validation(format!(
                "unknown export format '{other}'"
            ))),
        }
    }
}

/// `qzes_<name>_<YYYYMMDDHHmmss>.<ext>`
pub fn export_file_name(name: &str, at: NaiveDateTime, format: ExportFormat) -> String {
    format!(
        "qzes_{}_{}.{}",
        sanitize_file_component(name),
        at.format("%Y%m%d%H%M%S"),
        format.extension()
    )
}

/// Encode `bitmap` into the bytes of an image file.
pub fn encode_bitmap(bitmap: &Bitmap, format: ExportFormat) -> NoteResult<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        ExportFormat::Png => {
            let img = image::RgbaImage::from_raw(
                bitmap.width,
                bitmap.height,
                bitmap.to_straight_rgba8(),
            )
            .ok_or_else(|| NoteError::export("bitmap byte length mismatch"))?;
            img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .context("encode png")?;
        }
        ExportFormat::Jpeg => {
            let img = image::RgbImage::from_raw(
                bitmap.width,
                bitmap.height,
                flatten_over_white(&bitmap.data),
            )
            .ok_or_else(|| NoteError::export("bitmap byte length mismatch"))?;
            img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
                .context("encode jpeg")?;
        }
    }
    Ok(buf)
}

/// Encode and write `bitmap` into `dir` under the export naming convention.
pub fn write_bitmap(
    bitmap: &Bitmap,
    dir: &Path,
    name: &str,
    at: NaiveDateTime,
    format: ExportFormat,
) -> NoteResult<PathBuf> {
    let path = dir.join(export_file_name(name, at, format));
    ensure_parent_dir(&path)?;
    let bytes = encode_bitmap(bitmap, format)?;
    std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    tracing::info!(path = %path.display(), ?format, "exported note");
    Ok(path)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> NoteResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create output directory '{}'", parent.display())
        })?;
    }
    Ok(())
}

fn flatten_over_white(premul: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(premul.len() / 4 * 3);
    for px in premul.chunks_exact(4) {
        let inv = 255 - px[3];
        for &c in &px[..3] {
            out.push(c.saturating_add(mul_div255_u8(255, inv)));
        }
    }
    out
}

/// Keep names usable as a single path component.
fn sanitize_file_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/raster.rs"]
mod tests;
