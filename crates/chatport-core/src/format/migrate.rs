//! Migration of any recognized export shape to the canonical document

use super::{FormatTag, convert_foreign, detect};
use crate::clean::{DefaultCleaner, HistoryCleaner};
use crate::model::{Document, Folder, FolderKind, lenient_id, null_as_default};
use chatport_common::{ChatportError, ConversationDefaults, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Folder as written by v2 exports: no type, id possibly numeric
#[derive(Debug, Deserialize)]
struct LegacyFolder {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
}

impl From<LegacyFolder> for Folder {
    fn from(legacy: LegacyFolder) -> Self {
        Folder {
            id: legacy.id,
            name: legacy.name,
            kind: FolderKind::Chat,
            extra: Map::new(),
        }
    }
}

/// Upgrades older or foreign documents to the current version
pub struct Migrator {
    cleaner: Box<dyn HistoryCleaner>,
    defaults: ConversationDefaults,
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new(ConversationDefaults::default())
    }
}

impl Migrator {
    /// Migrator using the [`DefaultCleaner`] with the same defaults
    pub fn new(defaults: ConversationDefaults) -> Self {
        Self {
            cleaner: Box::new(DefaultCleaner::new(defaults.clone())),
            defaults,
        }
    }

    /// Migrator with a custom history cleaner
    pub fn with_cleaner(cleaner: Box<dyn HistoryCleaner>, defaults: ConversationDefaults) -> Self {
        Self { cleaner, defaults }
    }

    /// Detect the format of `value` and upgrade it
    pub fn migrate(&self, value: Value) -> Result<Document> {
        let tag = detect(&value);
        if !tag.is_recognized() {
            return Err(ChatportError::UnrecognizedFormat);
        }
        self.normalize(value, tag)
    }

    /// Upgrade `value`, already classified as `tag`, to the canonical document
    pub fn normalize(&self, value: Value, tag: FormatTag) -> Result<Document> {
        debug!("Normalizing {} document", tag);
        match (tag, value) {
            (FormatTag::Foreign, value) => Ok(convert_foreign(&value, &self.defaults)),
            (FormatTag::V1, Value::Array(history)) => Ok(Document::new(
                self.cleaner.clean(history),
                Vec::new(),
                Vec::new(),
            )),
            (FormatTag::V2, Value::Object(obj)) => self.from_v2(obj),
            (FormatTag::V3, Value::Object(mut obj)) => {
                obj.remove("version");
                versioned_document(obj, tag)
            }
            (FormatTag::V4, Value::Object(mut obj)) => {
                obj.remove("version");
                versioned_document(obj, tag)
            }
            (FormatTag::V1 | FormatTag::V2 | FormatTag::V3 | FormatTag::V4, _)
            | (FormatTag::Unrecognized, _) => Err(ChatportError::UnsupportedFormat),
        }
    }

    fn from_v2(&self, mut obj: Map<String, Value>) -> Result<Document> {
        let history = match obj.remove("history") {
            Some(Value::Array(items)) => self.cleaner.clean(items),
            None | Some(Value::Null) => Vec::new(),
            Some(_) => {
                warn!("Version 2 history is not an array, importing no conversations");
                Vec::new()
            }
        };

        let folders = records::<LegacyFolder>(&mut obj, "folders", FormatTag::V2)?
            .into_iter()
            .map(Folder::from)
            .collect();

        Ok(Document::new(history, folders, Vec::new()))
    }
}

/// Read a v3/v4 object, minus its `version`, as a version 4 document.
/// Absent or null collections (v3 has no `prompts`) default to empty.
fn versioned_document(mut obj: Map<String, Value>, tag: FormatTag) -> Result<Document> {
    let history = records(&mut obj, "history", tag)?;
    let folders = records(&mut obj, "folders", tag)?;
    let prompts = records(&mut obj, "prompts", tag)?;

    let mut doc = Document::new(history, folders, prompts);
    doc.extra = obj;
    Ok(doc)
}

/// Take the collection under `key`, reading each element on its own.
///
/// Elements that do not fit `T` are skipped with a warning; only a
/// collection that is not an array at all is malformed.
fn records<T: DeserializeOwned>(
    obj: &mut Map<String, Value>,
    key: &str,
    tag: FormatTag,
) -> Result<Vec<T>> {
    let items = match obj.remove(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ChatportError::Malformed(format!(
                "{} {} must be an array, found {}",
                tag, key, other
            )));
        }
    };

    let total = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping {} {} #{}: {}", tag, key, index, e);
                None
            }
        })
        .collect();

    if kept.len() < total {
        warn!("Skipped {} of {} {} {}", total - kept.len(), total, tag, key);
    }
    Ok(kept)
}
