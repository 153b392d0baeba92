/// Convenience result type used across the crate.
pub type NoteResult<T> = Result<T, NoteError>;

/// Error taxonomy for the boundary APIs (config, fonts, export, session IO).
///
/// The render path itself has no error states; see [`crate::render_note`].
#[derive(thiserror::Error, Debug)]
pub enum NoteError {
    /// Invalid user-provided data (colors, preset names, dates).
    #[error("validation error: {0}")]
    Validation(String),

    /// A logo or font could not be fetched or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Raster surface setup failed.
    #[error("render error: {0}")]
    Render(String),

    /// Encoding or writing an exported image failed.
    #[error("export error: {0}")]
    Export(String),

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NoteError {
    /// Build a [`NoteError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`NoteError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`NoteError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`NoteError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`NoteError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
