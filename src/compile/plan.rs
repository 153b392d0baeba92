use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::{
    assets::decode::LogoAsset,
    document::model::{ContentRecord, StyleFlag, StyleRecord},
    foundation::core::{Canvas, Point, Rect, Rgba8},
};

/// Fixed layout constants of the note, in canvas pixels.
pub mod layout {
    /// Title text, letter-spaced with plain spaces.
    pub const TITLE: &str = "出 行 条";
    /// Title size in px (bold serif).
    pub const TITLE_SIZE: f32 = 72.0;
    /// Per-glyph advance correction used to center the title.
    pub const TITLE_ADVANCE_TRIM: f64 = 10.0;
    /// Title baseline y.
    pub const TITLE_BASELINE: f64 = 120.0;

    /// Border path inset from every canvas edge.
    pub const BORDER_INSET: f64 = 40.0;
    /// Border stroke width, centered on the path.
    pub const BORDER_STROKE: f64 = 7.0;

    /// Side of the square logo box.
    pub const LOGO_SIZE: f64 = 176.0;
    /// Distance from the right canvas edge to the logo's left edge.
    pub const LOGO_RIGHT: f64 = 218.0;
    /// Top edge of the logo box before the vertical nudge.
    pub const LOGO_TOP: f64 = 64.0;

    /// Header, body and label size (regular sans).
    pub const BODY_SIZE: f32 = 38.0;
    /// Class, dormitory and name size (bold serif).
    pub const VALUE_SIZE: f32 = 52.0;
    /// Date value size (bold serif).
    pub const DATE_SIZE: f32 = 38.0;

    /// Header baseline origin.
    pub const HEADER_AT: (f64, f64) = (48.0, 220.0);
    /// `班` label origin.
    pub const CLASS_LABEL_AT: (f64, f64) = (268.0, 328.0);
    /// `宿舍` label origin.
    pub const DORM_LABEL_AT: (f64, f64) = (566.0, 328.0);
    /// Baseline of `同学离校`.
    pub const BODY_BASELINE: f64 = 328.0;
    /// Border inset plus stroke width.
    pub const TRAILER_RIGHT_PAD: f64 = 47.0;
    /// Character count of `同学离校`, right-aligned by fixed advance.
    pub const TRAILER_CHARS: f64 = 4.0;

    /// `离校时间：` origin.
    pub const LEAVE_LABEL_AT: (f64, f64) = (47.0, 424.0);
    /// `返校时间：` origin.
    pub const BACK_LABEL_AT: (f64, f64) = (528.0, 424.0);

    /// Class value origin.
    pub const CLASS_VALUE_AT: (f64, f64) = (116.0, 338.0);
    /// Dormitory value origin.
    pub const DORM_VALUE_AT: (f64, f64) = (365.0, 338.0);
    /// Name value origin.
    pub const NAME_VALUE_AT: (f64, f64) = (712.0, 338.0);

    /// Leave date origin.
    pub const LEAVE_DATE_AT: (f64, f64) = (224.0, 424.0);
    /// Return date origin.
    pub const BACK_DATE_AT: (f64, f64) = (758.0, 424.0);
}

const FULL_WIDTH_COMMA: &str = "，";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Font family class used by a text op.
pub enum FontFace {
    /// Song-style serif: title, field values, dates.
    Serif,
    /// Hei-style sans: header, body and labels.
    Sans,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Requested weight; bold is synthesized by the renderer.
pub enum TextWeight {
    /// Single strike.
    Regular,
    /// Double strike, offset by `size_px / 52`.
    Bold,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Face, weight and size of a text op.
pub struct TextStyle {
    /// Serif or sans.
    pub face: FontFace,
    /// Regular or bold.
    pub weight: TextWeight,
    /// Font size in pixels.
    pub size_px: f32,
}

impl TextStyle {
    const fn sans(size_px: f32) -> Self {
        Self {
            face: FontFace::Sans,
            weight: TextWeight::Regular,
            size_px,
        }
    }

    const fn serif_bold(size_px: f32) -> Self {
        Self {
            face: FontFace::Serif,
            weight: TextWeight::Bold,
            size_px,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Draw operation emitted by [`compile_note`].
pub enum DrawOp {
    /// Solid axis-aligned rectangle.
    Fill {
        /// Filled area.
        rect: Rect,
        /// Fill color.
        color: Rgba8,
    },
    /// Single line of text; `origin` is the left end of the alphabetic baseline.
    Text {
        /// Line contents; empty text draws nothing.
        text: String,
        /// Left end of the baseline.
        origin: Point,
        /// Face, weight and size.
        style: TextStyle,
        /// Ink color.
        color: Rgba8,
    },
    /// Logo image scaled into `rect`.
    Logo {
        /// Decoded pixels.
        logo: LogoAsset,
        /// Target box; the image is stretched to fill it.
        rect: Rect,
    },
}

#[derive(Clone, Debug, PartialEq)]
/// Backend-agnostic description of one note render.
///
/// The surface is cleared to transparent, filled with `background`, then
/// `ops` are drawn in order.
pub struct NotePlan {
    /// Surface size.
    pub canvas: Canvas,
    /// Paper color filled over the cleared surface.
    pub background: Rgba8,
    /// Draw operations in paint order.
    pub ops: Vec<DrawOp>,
}

impl NotePlan {
    /// Text drawn with its baseline origin exactly at `(x, y)`.
    pub fn text_at(&self, x: f64, y: f64) -> Option<&str> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Text { text, origin, .. } if *origin == Point::new(x, y) => {
                Some(text.as_str())
            }
            _ => None,
        })
    }

    /// Box of the logo op, when one was emitted.
    pub fn logo_rect(&self) -> Option<Rect> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Logo { rect, .. } => Some(*rect),
            _ => None,
        })
    }
}

/// Lay out a leave note.
///
/// Pure and IO-free: identical inputs always produce an identical plan.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile_note(
    content: &ContentRecord,
    style: &StyleRecord,
    logo: Option<&LogoAsset>,
) -> NotePlan {
    use layout::*;

    let canvas = Canvas::NOTE;
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let ink = Rgba8::BLACK;
    let mut ops = Vec::with_capacity(20);

    let text = |s: String, (x, y): (f64, f64), ts: TextStyle| {
        DrawOp::Text {
            text: s,
            origin: Point::new(x, y),
            style: ts,
            color: ink,
        }
    };

    let title_x = w / 2.0 - (f64::from(TITLE_SIZE) - TITLE_ADVANCE_TRIM) * 3.0;
    ops.push(text(
        TITLE.to_string(),
        (title_x, TITLE_BASELINE),
        TextStyle::serif_bold(TITLE_SIZE),
    ));

    ops.extend(
        border_rects(w, h)
            .into_iter()
            .map(|rect| DrawOp::Fill { rect, color: ink }),
    );

    if let Some(logo) = logo
        && !style.has(StyleFlag::NoLogo)
    {
        let (dx, dy) = style.logo_offset();
        let x0 = w - LOGO_RIGHT + f64::from(dx);
        let y0 = LOGO_TOP + f64::from(dy);
        ops.push(DrawOp::Logo {
            logo: logo.clone(),
            rect: Rect::new(x0, y0, x0 + LOGO_SIZE, y0 + LOGO_SIZE),
        });
    }

    let body = TextStyle::sans(BODY_SIZE);
    let comma = if style.has(StyleFlag::NoComma) {
        ""
    } else {
        FULL_WIDTH_COMMA
    };

    ops.push(text(format!("{}：", style.header), HEADER_AT, body));
    ops.push(text(format!("班{comma}"), CLASS_LABEL_AT, body));
    ops.push(text(format!("宿舍{comma}"), DORM_LABEL_AT, body));
    let trailer_x = w - TRAILER_CHARS * f64::from(BODY_SIZE) - TRAILER_RIGHT_PAD;
    ops.push(text(
        "同学离校".to_string(),
        (trailer_x, BODY_BASELINE),
        body,
    ));

    ops.push(text("离校时间：".to_string(), LEAVE_LABEL_AT, body));
    ops.push(text("返校时间：".to_string(), BACK_LABEL_AT, body));

    let value = TextStyle::serif_bold(VALUE_SIZE);
    ops.push(text(content.class_id.clone(), CLASS_VALUE_AT, value));
    ops.push(text(content.dormitory.clone(), DORM_VALUE_AT, value));
    ops.push(text(content.name.clone(), NAME_VALUE_AT, value));

    if !style.has(StyleFlag::NoDate) {
        let date = TextStyle::serif_bold(DATE_SIZE);
        ops.push(text(format_note_date(content.leave_date), LEAVE_DATE_AT, date));
        ops.push(text(format_note_date(content.back_date), BACK_DATE_AT, date));
    }

    NotePlan {
        canvas,
        background: style.background,
        ops,
    }
}

/// Format a timestamp as `MM月D日HH：mm`; a missing date is the empty string.
pub fn format_note_date(date: Option<NaiveDateTime>) -> String {
    match date {
        Some(d) => format!(
            "{:02}月{}日{:02}：{:02}",
            d.month(),
            d.day(),
            d.hour(),
            d.minute()
        ),
        None => String::new(),
    }
}

/// Rectangles covering a 7px stroke centered on the 40px-inset border path,
/// with square (mitered) corners.
fn border_rects(w: f64, h: f64) -> [Rect; 4] {
    use layout::{BORDER_INSET, BORDER_STROKE};

    let half = BORDER_STROKE / 2.0;
    let (l, t) = (BORDER_INSET, BORDER_INSET);
    let (r, b) = (w - BORDER_INSET, h - BORDER_INSET);
    [
        Rect::new(l - half, t - half, r + half, t + half),
        Rect::new(l - half, b - half, r + half, b + half),
        Rect::new(l - half, t + half, l + half, b - half),
        Rect::new(r - half, t + half, r + half, b - half),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
