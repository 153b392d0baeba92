use std::collections::BTreeSet;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::core::Rgba8;

/// Smallest accepted logo nudge, in pixels.
pub const LOGO_OFFSET_MIN: i32 = -15;
/// Largest accepted logo nudge, in pixels.
pub const LOGO_OFFSET_MAX: i32 = 15;

/// Header used when nothing has been persisted yet.
pub const DEFAULT_HEADER: &str = "经家长确认，班主任批准，教官备案，同意";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Who is leaving and when.
///
/// The serialized field names match the persisted session format
/// (`cls`, `leaveDate`, `backDate`).
pub struct ContentRecord {
    /// Student name.
    pub name: String,
    /// Class identifier; stored as text even when persisted as a number.
    #[serde(rename = "cls", deserialize_with = "de_class_id")]
    pub class_id: String,
    /// Dormitory room, e.g. `M101`.
    pub dormitory: String,
    /// Leave time; `None` renders as an empty value.
    #[serde(rename = "leaveDate", deserialize_with = "de_opt_timestamp")]
    pub leave_date: Option<NaiveDateTime>,
    /// Return time; `None` renders as an empty value.
    #[serde(rename = "backDate", deserialize_with = "de_opt_timestamp")]
    pub back_date: Option<NaiveDateTime>,
}

impl Default for ContentRecord {
    fn default() -> Self {
        Self {
            name: "李华".to_string(),
            class_id: "1".to_string(),
            dormitory: "M101".to_string(),
            leave_date: None,
            back_date: None,
        }
    }
}

impl ContentRecord {
    /// First-run content with both dates set to `now`.
    pub fn seeded(now: NaiveDateTime) -> Self {
        Self {
            leave_date: Some(now),
            back_date: Some(now),
            ..Self::default()
        }
    }
}

/// Named presentation toggle. Stored as set membership in [`StyleFlags`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum StyleFlag {
    /// Omit the logo.
    NoLogo,
    /// Drop the full-width comma after `班` and `宿舍`.
    NoComma,
    /// Enable the seal slot in the host form. Nothing is drawn for it.
    WithSign,
    /// Omit the two date values.
    NoDate,
    /// Historical "disable seal" toggle written by the weekend preset.
    ///
    /// Not part of the active vocabulary: nothing reads it. Kept so the
    /// weekend preset round-trips the flag set it has always produced.
    NoSign,
}

impl StyleFlag {
    /// The toggles the renderer and host form actually evaluate.
    pub const ACTIVE: [StyleFlag; 4] = [
        StyleFlag::NoLogo,
        StyleFlag::NoComma,
        StyleFlag::WithSign,
        StyleFlag::NoDate,
    ];

    /// False only for the legacy [`StyleFlag::NoSign`].
    pub fn is_active(self) -> bool {
        !matches!(self, StyleFlag::NoSign)
    }

    /// Persisted name (`noLogo`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            StyleFlag::NoLogo => "noLogo",
            StyleFlag::NoComma => "noComma",
            StyleFlag::WithSign => "withSign",
            StyleFlag::NoDate => "noDate",
            StyleFlag::NoSign => "noSign",
        }
    }
}

impl std::str::FromStr for StyleFlag {
    type Err = crate::NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "noLogo" => Ok(StyleFlag::NoLogo),
            "noComma" => Ok(StyleFlag::NoComma),
            "withSign" => Ok(StyleFlag::WithSign),
            "noDate" => Ok(StyleFlag::NoDate),
            "noSign" => Ok(StyleFlag::NoSign),
            other => Err(crate::NoteError::validation(format!(
                "unknown style flag '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for StyleFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of [`StyleFlag`]s. Order and duplicates carry no meaning.
///
/// Deserialization skips entries it does not recognize, so a stale or
/// hand-edited flag list never invalidates the rest of a [`StyleRecord`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StyleFlags(BTreeSet<StyleFlag>);

impl StyleFlags {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `flag` is set.
    pub fn contains(&self, flag: StyleFlag) -> bool {
        self.0.contains(&flag)
    }

    /// Returns whether the flag was newly added.
    pub fn insert(&mut self, flag: StyleFlag) -> bool {
        self.0.insert(flag)
    }

    /// Returns whether the flag was present.
    pub fn remove(&mut self, flag: StyleFlag) -> bool {
        self.0.remove(&flag)
    }

    /// Flip membership; returns whether the flag is now set.
    pub fn toggle(&mut self, flag: StyleFlag) -> bool {
        if self.0.remove(&flag) {
            false
        } else {
            self.0.insert(flag);
            true
        }
    }

    /// Flags in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = StyleFlag> + '_ {
        self.0.iter().copied()
    }

    /// Number of set flags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no flag is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for StyleFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Entry {
            Name(String),
            Other(serde::de::IgnoredAny),
        }

        let mut flags = StyleFlags::new();
        for entry in Vec::<Entry>::deserialize(deserializer)? {
            match entry {
                Entry::Name(name) => match name.parse::<StyleFlag>() {
                    Ok(flag) => {
                        flags.insert(flag);
                    }
                    Err(_) => tracing::warn!(%name, "ignoring unknown style flag"),
                },
                Entry::Other(_) => tracing::warn!("ignoring non-text style flag entry"),
            }
        }
        Ok(flags)
    }
}

impl FromIterator<StyleFlag> for StyleFlags {
    fn from_iter<T: IntoIterator<Item = StyleFlag>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[StyleFlag; N]> for StyleFlags {
    fn from(value: [StyleFlag; N]) -> Self {
        value.into_iter().collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Presentation settings for a note.
pub struct StyleRecord {
    /// Header line, drawn followed by a full-width colon.
    pub header: String,
    /// Paper color.
    #[serde(rename = "bgColor")]
    pub background: Rgba8,
    /// Horizontal logo nudge, accepted range [-15, 15].
    #[serde(rename = "offsetX")]
    pub logo_offset_x: i32,
    /// Vertical logo nudge, accepted range [-15, 15].
    #[serde(rename = "offsetY")]
    pub logo_offset_y: i32,
    /// Toggles, persisted as `extra`.
    #[serde(rename = "extra")]
    pub flags: StyleFlags,
}

impl Default for StyleRecord {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            background: Rgba8::new(255, 255, 255, 0),
            logo_offset_x: 0,
            logo_offset_y: 0,
            flags: StyleFlags::from([StyleFlag::NoComma]),
        }
    }
}

impl StyleRecord {
    /// Whether `flag` is set.
    pub fn has(&self, flag: StyleFlag) -> bool {
        self.flags.contains(flag)
    }

    /// Store a logo nudge, clamped to the accepted range.
    pub fn set_logo_offset(&mut self, x: i32, y: i32) {
        self.logo_offset_x = clamp_offset(x);
        self.logo_offset_y = clamp_offset(y);
    }

    /// The nudge actually applied to the logo, clamped to the accepted range.
    pub fn logo_offset(&self) -> (i32, i32) {
        (
            clamp_offset(self.logo_offset_x),
            clamp_offset(self.logo_offset_y),
        )
    }
}

fn clamp_offset(v: i32) -> i32 {
    v.clamp(LOGO_OFFSET_MIN, LOGO_OFFSET_MAX)
}

fn de_class_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(s) => s,
        TextOrNumber::Number(n) => n.to_string(),
    })
}

/// Accepts `null`, a naive local timestamp (`2024-05-01T08:00:00`) or an
/// RFC 3339 instant (`2024-05-01T00:00:00.000Z`, converted to local time).
fn de_opt_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_timestamp(&raw).map(Some).map_err(serde::de::Error::custom)
}

/// Parse a user/persisted timestamp into local wall-clock time.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }
    Err(format!("unrecognized timestamp '{raw}'"))
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
