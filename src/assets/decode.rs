use std::sync::Arc;

use anyhow::Context;

use crate::foundation::{error::NoteResult, math::mul_div255_u8};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Decoded logo in premultiplied RGBA8, keyed by the URL it came from.
pub struct LogoAsset {
    /// URL (or path) the bytes were fetched from.
    pub source: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_logo(source: &str, bytes: &[u8]) -> NoteResult<LogoAsset> {
    let dyn_img = image::load_from_memory(bytes)
        .with_context(|| format!("decode logo image from '{source}'"))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(LogoAsset {
        source: source.to_string(),
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        for c in &mut px[..3] {
            *c = mul_div255_u8(*c, a);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
