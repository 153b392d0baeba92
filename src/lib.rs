//! Leave-note (出行条) renderer.
//!
//! A note is a fixed 1100×500 raster built from two small records:
//!
//! - [`ContentRecord`]: who is leaving and when
//! - [`StyleRecord`]: header text, paper color, logo nudge and toggles
//!
//! [`compile_note`] turns the records into an ordered [`NotePlan`];
//! [`CpuRenderer`] rasterizes plans into a [`Bitmap`]. The logo is fetched
//! asynchronously through [`LogoLoader`], and [`Preset`]s rewrite the records
//! in one step. Session persistence and export sit at the boundary.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod assets;
pub(crate) mod compile;
/// Persistent configuration.
pub mod config;
pub(crate) mod document;
/// Raster export.
pub mod encode;
/// CPU rendering backend.
pub mod render;
/// Session persistence.
pub mod session;

pub use crate::foundation::core::{Canvas, Point, Rect, Rgba8};
pub use crate::foundation::error::{NoteError, NoteResult};

pub use crate::assets::decode::{LogoAsset, decode_logo};
pub use crate::assets::loader::{FetchBytes, HttpFetcher, LogoLoad, LogoLoader};
pub use crate::assets::variant::{LogoSources, LogoVariant};
pub use crate::compile::plan::{
    DrawOp, FontFace, NotePlan, TextStyle, TextWeight, compile_note, format_note_date, layout,
};
pub use crate::config::app::{AppConfig, ExportSettings, FontPaths};
pub use crate::document::model::{
    ContentRecord, DEFAULT_HEADER, LOGO_OFFSET_MAX, LOGO_OFFSET_MIN, StyleFlag, StyleFlags,
    StyleRecord, parse_timestamp,
};
pub use crate::document::preset::{Preset, apply_preset};
pub use crate::encode::raster::{ExportFormat, encode_bitmap, export_file_name, write_bitmap};
pub use crate::render::bitmap::Bitmap;
pub use crate::render::cpu::CpuRenderer;
pub use crate::render::pipeline::render_note;
pub use crate::render::text::FontBook;
pub use crate::session::store::{
    CONTENT_KEY, JsonFileStore, MemoryStore, STYLE_KEY, SessionStore, load_session, save_session,
};
