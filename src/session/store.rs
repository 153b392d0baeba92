use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;

use crate::{
    document::model::{ContentRecord, StyleRecord},
    encode::raster::ensure_parent_dir,
    foundation::error::{NoteError, NoteResult},
};

/// Key holding the serialized [`ContentRecord`].
pub const CONTENT_KEY: &str = "qzes_data";
/// Key holding the serialized [`StyleRecord`].
pub const STYLE_KEY: &str = "qzes_advance";

/// Plain key/value text storage for session records.
pub trait SessionStore {
    /// Stored text for `key`, or `None` when nothing (readable) is stored.
    fn load_raw(&self, key: &str) -> Option<String>;

    /// Replace the text stored under `key`.
    fn save_raw(&mut self, key: &str, value: String) -> NoteResult<()>;
}

/// In-memory store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load_raw(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn save_raw(&mut self, key: &str, value: String) -> NoteResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// A single JSON object file mapping keys to text values.
///
/// A missing file behaves as an empty store; it is created on first save.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`; nothing is read until the first load.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> NoteResult<serde_json::Map<String, serde_json::Value>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(serde_json::Map::new());
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("read session file '{}'", self.path.display()))
                    .into());
            }
        };
        serde_json::from_str(&text).map_err(|err| {
            NoteError::validation(format!(
                "session file '{}' is not a JSON object: {err}",
                self.path.display()
            ))
        })
    }
}

impl SessionStore for JsonFileStore {
    fn load_raw(&self, key: &str) -> Option<String> {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring unreadable session file");
                return None;
            }
        };
        match entries.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn save_raw(&mut self, key: &str, value: String) -> NoteResult<()> {
        // An unreadable file is replaced rather than blocking the save.
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(key.to_string(), serde_json::Value::String(value));

        ensure_parent_dir(&self.path)?;
        let text = serde_json::to_string_pretty(&entries).context("serialize session")?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("write session file '{}'", self.path.display()))?;
        Ok(())
    }
}

/// Restore both records. Never fails: missing state yields first-run
/// defaults (dates seeded with `now`), malformed state yields defaults and a
/// warning.
#[tracing::instrument(skip(store))]
pub fn load_session(store: &dyn SessionStore, now: NaiveDateTime) -> (ContentRecord, StyleRecord) {
    let content = load_record(store, CONTENT_KEY).unwrap_or_else(|| ContentRecord::seeded(now));
    let style = load_record(store, STYLE_KEY).unwrap_or_default();
    (content, style)
}

/// Persist both records as JSON text.
pub fn save_session(
    store: &mut dyn SessionStore,
    content: &ContentRecord,
    style: &StyleRecord,
) -> NoteResult<()> {
    let content = serde_json::to_string(content).context("serialize content record")?;
    let style = serde_json::to_string(style).context("serialize style record")?;
    store.save_raw(CONTENT_KEY, content)?;
    store.save_raw(STYLE_KEY, style)?;
    tracing::debug!("session saved");
    Ok(())
}

fn load_record<T: DeserializeOwned>(store: &dyn SessionStore, key: &str) -> Option<T> {
    let raw = store.load_raw(key)?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(key, error = %err, "malformed session record, using defaults");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/store.rs"]
mod tests;
