/// Premultiplied RGBA8 pixel buffer.
pub mod bitmap;
/// `vello_cpu` rasterizer for note plans.
pub mod cpu;
/// Compile-then-render entry point.
pub mod pipeline;
/// Font loading and text shaping.
pub mod text;
