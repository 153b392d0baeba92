use std::{borrow::Cow, path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    compile::plan::{FontFace, TextWeight},
    foundation::error::{NoteError, NoteResult},
};

/// Raw font bytes for the two faces the note uses.
///
/// A book with only one face uses it for both; an empty book renders no
/// text at all.
#[derive(Clone, Default)]
pub struct FontBook {
    serif: Option<Arc<Vec<u8>>>,
    sans: Option<Arc<Vec<u8>>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("serif_len", &self.serif.as_ref().map(|b| b.len()))
            .field("sans_len", &self.sans.as_ref().map(|b| b.len()))
            .finish()
    }
}

impl FontBook {
    /// Book without fonts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `bytes` (TTF/OTF) for the serif face.
    pub fn with_serif(mut self, bytes: Vec<u8>) -> Self {
        self.serif = Some(Arc::new(bytes));
        self
    }

    /// Use `bytes` (TTF/OTF) for the sans face.
    pub fn with_sans(mut self, bytes: Vec<u8>) -> Self {
        self.sans = Some(Arc::new(bytes));
        self
    }

    /// Read font files from disk. `None` leaves that face unset.
    pub fn load(serif: Option<&Path>, sans: Option<&Path>) -> NoteResult<Self> {
        let read = |p: &Path| -> NoteResult<Arc<Vec<u8>>> {
            let bytes = std::fs::read(p)
                .with_context(|| format!("read font file '{}'", p.display()))?;
            Ok(Arc::new(bytes))
        };
        Ok(Self {
            serif: serif.map(read).transpose()?,
            sans: sans.map(read).transpose()?,
        })
    }

    /// True when neither face is loaded.
    pub fn is_empty(&self) -> bool {
        self.serif.is_none() && self.sans.is_none()
    }

    /// Bytes for `face`, falling back to the other face.
    pub fn face(&self, face: FontFace) -> Option<&Arc<Vec<u8>>> {
        match face {
            FontFace::Serif => self.serif.as_ref().or(self.sans.as_ref()),
            FontFace::Sans => self.sans.as_ref().or(self.serif.as_ref()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct InkBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Shapes single lines of text against one registered font.
///
/// Each shaper owns its own font collection so Parley can never fall back
/// to a face whose glyph ids don't match `font`.
pub(crate) struct FaceShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<InkBrush>,
    family: String,
    pub(crate) font: vello_cpu::peniko::FontData,
}

impl FaceShaper {
    pub(crate) fn new(font_bytes: &[u8]) -> NoteResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| NoteError::asset("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| NoteError::asset("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
            0,
        );
        tracing::debug!(%family, "registered font");

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font,
        })
    }

    pub(crate) fn family(&self) -> &str {
        &self.family
    }

    /// Lay out `text` on a single unbroken line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        weight: TextWeight,
        size_px: f32,
        brush: InkBrush,
    ) -> parley::Layout<InkBrush> {
        let weight = match weight {
            TextWeight::Regular => parley::style::FontWeight::NORMAL,
            TextWeight::Bold => parley::style::FontWeight::BOLD,
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(weight));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<InkBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
