use crate::{
    document::model::{ContentRecord, StyleFlag, StyleFlags, StyleRecord},
    foundation::error::{NoteError, NoteResult},
};

/// Named bundle of style/content changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    /// 日常版: no logo, seal slot on, no dates, identity fields blanked.
    Daily,
    /// 周末版: no commas anywhere, seal slot off.
    Weekend,
}

impl Preset {
    /// Accepts `daily`/`weekend` and the labels `日常版`/`周末版`.
    pub fn parse(s: &str) -> NoteResult<Self> {
        match s.trim() {
            "daily" | "日常版" => Ok(Preset::Daily),
            "weekend" | "周末版" => Ok(Preset::Weekend),
            other => Err(NoteError::validation(format!(
                "unknown preset '{other}' (expected 'daily' or 'weekend')"
            ))),
        }
    }

    /// English name used on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Daily => "daily",
            Preset::Weekend => "weekend",
        }
    }

    /// Flag set the preset installs. Replaces the current set wholesale.
    ///
    /// The weekend set contains [`StyleFlag::NoSign`], which nothing reads;
    /// its "disable seal" intent therefore has no effect beyond dropping
    /// `withSign` from the set.
    pub fn flags(self) -> StyleFlags {
        match self {
            Preset::Daily => StyleFlags::from([
                StyleFlag::NoLogo,
                StyleFlag::WithSign,
                StyleFlag::NoDate,
            ]),
            Preset::Weekend => StyleFlags::from([StyleFlag::NoSign, StyleFlag::NoComma]),
        }
    }

    /// Apply the preset, producing the new record pair.
    pub fn apply(
        self,
        style: &StyleRecord,
        content: &ContentRecord,
    ) -> (StyleRecord, ContentRecord) {
        let mut style = style.clone();
        let mut content = content.clone();
        style.flags = self.flags();

        match self {
            Preset::Daily => {
                content.name.clear();
                content.class_id.clear();
                content.dormitory.clear();
            }
            Preset::Weekend => {
                style.header = strip_commas(&style.header);
            }
        }

        tracing::debug!(preset = self.as_str(), flags = ?style.flags, "applied preset");
        (style, content)
    }
}

impl std::str::FromStr for Preset {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-function form of [`Preset::apply`].
pub fn apply_preset(
    preset: Preset,
    style: &StyleRecord,
    content: &ContentRecord,
) -> (StyleRecord, ContentRecord) {
    preset.apply(style, content)
}

fn strip_commas(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, ',' | '，')).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/document/preset.rs"]
mod tests;
