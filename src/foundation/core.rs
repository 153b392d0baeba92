use crate::foundation::error::{NoteError, NoteResult};

pub use kurbo::{Point, Rect};

/// Pixel dimensions of a render surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// The one document size the layout is defined for.
    pub const NOTE: Canvas = Canvas {
        width: 1100,
        height: 500,
    };
}

/// Straight (non-premultiplied) RGBA8 color.
///
/// Serialized as a CSS hex string (`#rrggbbaa`); parsing also accepts `#rgb`,
/// `#rgba` and `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha, 255 = opaque.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black, the ink color of every text op and the border.
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);

    /// Color from straight channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse_hex(s: &str) -> NoteResult<Self> {
        let t = s.trim();
        let digits = t
            .strip_prefix('#')
            .ok_or_else(|| NoteError::validation(format!("color '{t}' must start with '#'")))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(NoteError::validation(format!(
                "color '{t}' contains non-hex digits"
            )));
        }

        let nibble = |i: usize| -> u8 {
            let c = digits.as_bytes()[i] as char;
            c.to_digit(16).unwrap_or(0) as u8
        };
        let byte = |i: usize| -> u8 { (nibble(i) << 4) | nibble(i + 1) };

        match digits.len() {
            3 => Ok(Self::new(nibble(0) * 17, nibble(1) * 17, nibble(2) * 17, 255)),
            4 => Ok(Self::new(
                nibble(0) * 17,
                nibble(1) * 17,
                nibble(2) * 17,
                nibble(3) * 17,
            )),
            6 => Ok(Self::new(byte(0), byte(2), byte(4), 255)),
            8 => Ok(Self::new(byte(0), byte(2), byte(4), byte(6))),
            n => Err(NoteError::validation(format!(
                "color '{t}' has {n} hex digits; expected 3, 4, 6 or 8"
            ))),
        }
    }

    /// Format as `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl std::str::FromStr for Rgba8 {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl TryFrom<String> for Rgba8 {
    type Error = NoteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<Rgba8> for String {
    fn from(value: Rgba8) -> Self {
        value.to_hex()
    }
}

impl std::fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
