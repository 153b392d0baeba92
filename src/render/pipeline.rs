use crate::{
    assets::decode::LogoAsset,
    compile::plan::compile_note,
    document::model::{ContentRecord, StyleRecord},
    render::{bitmap::Bitmap, cpu::CpuRenderer},
};

/// Compile + rasterize a single note.
///
/// This is the primary one-shot API for producing pixels:
/// 1. [`compile_note`](crate::compile_note)
/// 2. [`CpuRenderer::render_plan`](crate::CpuRenderer::render_plan)
///
/// Returns a 1100×500 [`Bitmap`] of **premultiplied** RGBA8 pixels. There is
/// no error path: a missing logo or date simply isn't drawn.
#[tracing::instrument(level = "debug", skip_all, fields(name = %content.name))]
pub fn render_note(
    renderer: &mut CpuRenderer,
    content: &ContentRecord,
    style: &StyleRecord,
    logo: Option<&LogoAsset>,
) -> Bitmap {
    let plan = compile_note(content, style, logo);
    renderer.render_plan(&plan)
}
