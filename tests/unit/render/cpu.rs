use super::*;
use crate::{
    compile::plan::compile_note,
    document::model::{ContentRecord, StyleFlag, StyleRecord},
};

fn fixture_fonts() -> FontBook {
    FontBook::new()
        .with_serif(std::fs::read("tests/data/fonts/DejaVuSerif.ttf").unwrap())
        .with_sans(std::fs::read("tests/data/fonts/DejaVuSansMono.ttf").unwrap())
}

fn text_plan(text: &str, weight: TextWeight) -> NotePlan {
    NotePlan {
        canvas: Canvas {
            width: 400,
            height: 300,
        },
        background: Rgba8::new(255, 255, 255, 0),
        ops: vec![DrawOp::Text {
            text: text.to_string(),
            origin: Point::new(100.0, 200.0),
            style: TextStyle {
                face: FontFace::Serif,
                weight,
                size_px: 52.0,
            },
            color: Rgba8::BLACK,
        }],
    }
}

fn ink_bounds(plan: &NotePlan) -> (u32, u32, u32, u32) {
    let mut r = CpuRenderer::new(&fixture_fonts()).unwrap();
    let blank = NotePlan {
        ops: Vec::new(),
        ..plan.clone()
    };
    r.render_plan(plan).diff_bounds(&r.render_plan(&blank)).unwrap()
}

fn red_logo() -> LogoAsset {
    LogoAsset {
        source: "red.png".to_string(),
        width: 4,
        height: 4,
        rgba8_premul: Arc::new([255u8, 0, 0, 255].repeat(16)),
    }
}

fn renderer() -> CpuRenderer {
    CpuRenderer::new(&FontBook::new()).unwrap()
}

fn render(style: &StyleRecord, logo: Option<&LogoAsset>) -> Bitmap {
    let plan = compile_note(&ContentRecord::default(), style, logo);
    renderer().render_plan(&plan)
}

#[test]
fn output_has_note_dimensions() {
    let b = render(&StyleRecord::default(), None);
    assert_eq!((b.width, b.height), (1100, 500));
    assert_eq!(b.data.len(), 1100 * 500 * 4);
}

#[test]
fn background_fills_canvas() {
    let transparent = render(&StyleRecord::default(), None);
    assert_eq!(transparent.pixel(5, 5), Some([0, 0, 0, 0]));

    let white = StyleRecord {
        background: Rgba8::WHITE,
        ..StyleRecord::default()
    };
    let b = render(&white, None);
    assert_eq!(b.pixel(5, 5), Some([255, 255, 255, 255]));
    assert_eq!(b.pixel(1099, 499), Some([255, 255, 255, 255]));
}

#[test]
fn border_is_black_seven_px_band() {
    let b = render(&StyleRecord::default(), None);
    for (x, y) in [(40, 40), (38, 250), (42, 250), (550, 39), (1060, 250), (550, 460)] {
        assert_eq!(b.pixel(x, y), Some([0, 0, 0, 255]), "({x},{y})");
    }
    assert_eq!(b.pixel(30, 250), Some([0, 0, 0, 0]));
    assert_eq!(b.pixel(50, 250), Some([0, 0, 0, 0]));
}

#[test]
fn renders_are_byte_identical() {
    let logo = red_logo();
    let style = StyleRecord::default();
    let mut r = renderer();
    let plan = compile_note(&ContentRecord::default(), &style, Some(&logo));
    let a = r.render_plan(&plan);
    let b = r.render_plan(&plan);
    assert_eq!(a, b);
    assert_eq!(a.fingerprint(), render(&style, Some(&logo)).fingerprint());
}

#[test]
fn no_logo_flag_only_touches_logo_box() {
    let logo = red_logo();
    let with = render(&StyleRecord::default(), Some(&logo));
    let mut style = StyleRecord::default();
    style.flags.insert(StyleFlag::NoLogo);
    let without = render(&style, Some(&logo));

    assert_eq!(with.pixel(970, 150), Some([255, 0, 0, 255]));
    assert_eq!(without.pixel(970, 150), Some([0, 0, 0, 0]));

    let (x0, y0, x1, y1) = with.diff_bounds(&without).unwrap();
    assert!(x0 >= 881 && y0 >= 63, "{x0},{y0}");
    assert!(x1 <= 1059 && y1 <= 241, "{x1},{y1}");
}

#[test]
fn logo_offset_moves_drawn_box_exactly() {
    let logo = red_logo();
    let mut hidden = StyleRecord::default();
    hidden.flags.insert(StyleFlag::NoLogo);
    let blank = render(&hidden, Some(&logo));

    let base = render(&StyleRecord::default(), Some(&logo))
        .diff_bounds(&blank)
        .unwrap();
    let mut nudged = StyleRecord::default();
    nudged.set_logo_offset(5, -5);
    let moved = render(&nudged, Some(&logo)).diff_bounds(&blank).unwrap();

    assert_eq!(moved.0 as i64 - base.0 as i64, 5);
    assert_eq!(moved.1 as i64 - base.1 as i64, -5);
}

#[test]
fn mismatched_logo_bytes_are_skipped() {
    let bad = LogoAsset {
        source: "bad".to_string(),
        width: 10,
        height: 10,
        rgba8_premul: Arc::new(vec![255; 8]),
    };
    let b = render(&StyleRecord::default(), Some(&bad));
    assert_eq!(b, render(&StyleRecord::default(), None));
}

#[test]
fn logo_paint_is_cached_per_pixel_buffer() {
    let logo = red_logo();
    let mut r = renderer();
    r.logo_paint_for(&logo).unwrap();
    let first = r.logo_cache.as_ref().map(|(p, _)| Arc::as_ptr(p));
    r.logo_paint_for(&logo.clone()).unwrap();
    let second = r.logo_cache.as_ref().map(|(p, _)| Arc::as_ptr(p));
    assert_eq!(first, second);
}

#[test]
fn text_sits_on_its_baseline_origin() {
    let (x0, y0, x1, y1) = ink_bounds(&text_plan("M", TextWeight::Regular));
    assert!((100..=110).contains(&x0), "x0 = {x0}");
    // Cap height of the fixture serif is about 0.73 em.
    assert!((155..=168).contains(&y0), "y0 = {y0}");
    assert!((199..=202).contains(&y1), "y1 = {y1}");
    assert!(x1 > x0 + 30, "x1 = {x1}");
}

#[test]
fn bold_adds_a_second_strike_to_the_right() {
    let regular = ink_bounds(&text_plan("M101", TextWeight::Regular));
    let bold = ink_bounds(&text_plan("M101", TextWeight::Bold));
    assert_eq!(bold.0, regular.0);
    assert_eq!((bold.1, bold.3), (regular.1, regular.3));
    assert!(bold.2 > regular.2, "{bold:?} vs {regular:?}");
    assert!(bold.2 <= regular.2 + 2, "{bold:?} vs {regular:?}");
}

#[test]
fn empty_text_draws_nothing() {
    let mut r = CpuRenderer::new(&fixture_fonts()).unwrap();
    let plan = text_plan("", TextWeight::Bold);
    let blank = NotePlan {
        ops: Vec::new(),
        ..plan.clone()
    };
    assert_eq!(r.render_plan(&plan), r.render_plan(&blank));
}
