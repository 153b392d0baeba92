use std::sync::Arc;

use crate::{
    assets::decode::LogoAsset,
    compile::plan::{DrawOp, FontFace, NotePlan, TextStyle, TextWeight},
    foundation::core::{Canvas, Point, Rect, Rgba8},
    foundation::error::{NoteError, NoteResult},
    render::{
        bitmap::Bitmap,
        text::{FaceShaper, FontBook, InkBrush},
    },
};

/// Executes [`NotePlan`]s on a `vello_cpu` surface.
///
/// Font shaping contexts and the decoded logo paint are kept between renders.
pub struct CpuRenderer {
    serif: Option<FaceShaper>,
    sans: Option<FaceShaper>,
    logo_cache: Option<(Arc<Vec<u8>>, vello_cpu::Image)>,
}

impl CpuRenderer {
    /// Build shapers for the faces in `fonts`.
    ///
    /// Fails only when font bytes are present but unusable. A book without
    /// fonts is accepted; text ops are then skipped.
    pub fn new(fonts: &FontBook) -> NoteResult<Self> {
        let serif = fonts
            .face(FontFace::Serif)
            .map(|b| FaceShaper::new(b))
            .transpose()?;
        let sans = fonts
            .face(FontFace::Sans)
            .map(|b| FaceShaper::new(b))
            .transpose()?;

        match (&serif, &sans) {
            (Some(s), Some(h)) => {
                tracing::debug!(serif = s.family(), sans = h.family(), "text faces ready")
            }
            _ => tracing::warn!("no fonts configured; notes will render without text"),
        }

        Ok(Self {
            serif,
            sans,
            logo_cache: None,
        })
    }

    /// Rasterize `plan`. Never fails: a logo whose pixels don't match its
    /// declared size is skipped, text without a face is skipped.
    #[tracing::instrument(level = "debug", skip_all, fields(ops = plan.ops.len()))]
    pub fn render_plan(&mut self, plan: &NotePlan) -> Bitmap {
        let (w, h) = surface_size(plan.canvas);
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        let mut ctx = vello_cpu::RenderContext::new(w, h);

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(plan.background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));

        for op in &plan.ops {
            self.draw_op(&mut ctx, op);
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Bitmap {
            width: u32::from(w),
            height: u32::from(h),
            data: pixmap.data_as_u8_slice().to_vec(),
        }
    }

    fn draw_op(&mut self, ctx: &mut vello_cpu::RenderContext, op: &DrawOp) {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match op {
            DrawOp::Fill { rect, color } => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_rect(&rect_to_cpu(*rect));
            }
            DrawOp::Logo { logo, rect } => {
                let paint = match self.logo_paint_for(logo) {
                    Ok(paint) => paint,
                    Err(err) => {
                        tracing::warn!(source = %logo.source, error = %err, "skipping logo");
                        return;
                    }
                };
                let (iw, ih) = (f64::from(logo.width), f64::from(logo.height));
                let transform = vello_cpu::kurbo::Affine::translate((rect.x0, rect.y0))
                    * vello_cpu::kurbo::Affine::scale_non_uniform(
                        rect.width() / iw,
                        rect.height() / ih,
                    );
                ctx.set_transform(transform);
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
            }
            DrawOp::Text {
                text,
                origin,
                style,
                color,
            } => self.draw_text(ctx, text, *origin, *style, *color),
        }
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        origin: Point,
        style: TextStyle,
        color: Rgba8,
    ) {
        if text.is_empty() {
            return;
        }
        let shaper = match style.face {
            FontFace::Serif => self.serif.as_mut(),
            FontFace::Sans => self.sans.as_mut(),
        };
        let Some(shaper) = shaper else {
            return;
        };

        let brush = InkBrush {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };
        let layout = shaper.layout_line(text, style.weight, style.size_px, brush);
        let Some(baseline) = layout.lines().next().map(|l| l.metrics().baseline) else {
            return;
        };

        // Faux bold: the faces are single-weight, so bold is a second pass
        // nudged right by about 1px at 52px.
        let strikes: &[f64] = match style.weight {
            TextWeight::Regular => &[0.0],
            TextWeight::Bold => &[0.0, f64::from(style.size_px) / 52.0],
        };

        for &dx in strikes {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                origin.x + dx,
                origin.y - f64::from(baseline),
            )));
            for line in layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };

                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));

                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&shaper.font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }
    }

    fn logo_paint_for(&mut self, logo: &LogoAsset) -> NoteResult<vello_cpu::Image> {
        if let Some((pixels, paint)) = &self.logo_cache
            && Arc::ptr_eq(pixels, &logo.rgba8_premul)
        {
            return Ok(paint.clone());
        }

        let pixmap =
            image_premul_bytes_to_pixmap(logo.rgba8_premul.as_slice(), logo.width, logo.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.logo_cache = Some((logo.rgba8_premul.clone(), paint.clone()));
        Ok(paint)
    }
}

fn surface_size(canvas: Canvas) -> (u16, u16) {
    let clamp = |v: u32| u16::try_from(v).unwrap_or(u16::MAX);
    (clamp(canvas.width), clamp(canvas.height))
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> NoteResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| NoteError::render("logo width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| NoteError::render("logo height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(NoteError::render("logo has zero size"));
    }
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(NoteError::render("logo byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
