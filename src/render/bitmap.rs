use crate::foundation::math::{Fnv1a64, unpremul_u8};

#[derive(Clone, PartialEq, Eq)]
/// Rendered note pixels, row-major **premultiplied** RGBA8.
pub struct Bitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fingerprint", &format_args!("{:016x}", self.fingerprint()))
            .finish()
    }
}

impl Bitmap {
    /// Premultiplied pixel at `(x, y)`, or `None` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Stable 64-bit digest of size and pixels.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Fnv1a64::new_default();
        hasher.write_u32(self.width);
        hasher.write_u32(self.height);
        hasher.write_bytes(&self.data);
        hasher.finish()
    }

    /// Pixels converted to straight (non-premultiplied) RGBA8.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = px[3];
            px[0] = unpremul_u8(px[0], a);
            px[1] = unpremul_u8(px[1], a);
            px[2] = unpremul_u8(px[2], a);
        }
        out
    }

    /// Bounding box `(x0, y0, x1, y1)` (exclusive max) of pixels that differ
    /// from `other`. `None` when identical or sizes differ.
    pub fn diff_bounds(&self, other: &Bitmap) -> Option<(u32, u32, u32, u32)> {
        if self.width != other.width || self.height != other.height {
            return None;
        }
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (i, (a, b)) in self
            .data
            .chunks_exact(4)
            .zip(other.data.chunks_exact(4))
            .enumerate()
        {
            if a == b {
                continue;
            }
            let x = (i % self.width as usize) as u32;
            let y = (i / self.width as usize) as u32;
            bounds = Some(match bounds {
                None => (x, y, x + 1, y + 1),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
            });
        }
        bounds
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/bitmap.rs"]
mod tests;
