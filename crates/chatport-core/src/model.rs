//! Canonical export document and the records it carries
//!
//! Conversations and prompts are opaque JSON objects: only their `id` is
//! inspected here, every other field passes through untouched. Folders are
//! typed because migration has to rewrite them.

use chatport_common::CURRENT_EXPORT_VERSION;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Anything the merge engine can deduplicate
pub trait Identified {
    /// The record's identity key, `None` when the record carries no string id
    fn identity(&self) -> Option<&str>;
}

macro_rules! opaque_record {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Map<String, Value>);

        impl $name {
            /// Wrap an already-parsed JSON object
            pub fn from_map(fields: Map<String, Value>) -> Self {
                $name(fields)
            }

            /// Build a record holding only an `id`
            pub fn with_id(id: impl Into<String>) -> Self {
                let mut fields = Map::new();
                fields.insert("id".to_string(), Value::String(id.into()));
                $name(fields)
            }

            pub fn id(&self) -> Option<&str> {
                self.0.get("id").and_then(Value::as_str)
            }

            pub fn get(&self, field: &str) -> Option<&Value> {
                self.0.get(field)
            }

            pub fn fields(&self) -> &Map<String, Value> {
                &self.0
            }

            pub fn into_fields(self) -> Map<String, Value> {
                self.0
            }
        }

        impl Identified for $name {
            fn identity(&self) -> Option<&str> {
                self.id()
            }
        }
    };
}

opaque_record!(
    /// A chat conversation, opaque apart from its `id`
    Conversation
);

opaque_record!(
    /// A saved prompt, opaque apart from its `id`
    Prompt
);

impl Conversation {
    /// Display name, if the conversation has one
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }
}

/// Which sidebar a folder belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderKind {
    #[default]
    Chat,
    Prompt,
    /// A type this version does not know, kept verbatim
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for FolderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolderKind::Chat => write!(f, "chat"),
            FolderKind::Prompt => write!(f, "prompt"),
            FolderKind::Other(kind) => write!(f, "{}", kind),
        }
    }
}

/// A folder grouping conversations or prompts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: FolderKind,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Folder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: FolderKind) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            kind,
            extra: Map::new(),
        }
    }
}

impl Identified for Folder {
    fn identity(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Accepts a string or numeric id and yields it as a string.
///
/// Older exports wrote folder ids as numbers.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    }))
}

/// Reads `null` the same as an absent field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn current_version() -> u64 {
    CURRENT_EXPORT_VERSION
}

/// The current (version 4) export document
///
/// Top-level fields other than the three collections are kept in `extra`
/// so that a migrated or merged document carries them along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default = "current_version")]
    pub version: u64,
    #[serde(default)]
    pub history: Vec<Conversation>,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub prompts: Vec<Prompt>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// A version 4 document with nothing in it
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }

    pub fn new(history: Vec<Conversation>, folders: Vec<Folder>, prompts: Vec<Prompt>) -> Self {
        Self {
            version: CURRENT_EXPORT_VERSION,
            history,
            folders,
            prompts,
            extra: Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.folders.is_empty() && self.prompts.is_empty()
    }

    /// The most recent conversation, which import selects
    pub fn last_conversation(&self) -> Option<&Conversation> {
        self.history.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversation_passes_fields_through() {
        let value = json!({"id": "c1", "name": "Chat", "messages": [{"role": "user"}]});
        let conversation: Conversation = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(conversation.id(), Some("c1"));
        assert_eq!(conversation.name(), Some("Chat"));
        assert_eq!(serde_json::to_value(&conversation).unwrap(), value);
    }

    #[test]
    fn test_non_string_id_has_no_identity() {
        let prompt: Prompt = serde_json::from_value(json!({"id": 7})).unwrap();
        assert_eq!(prompt.identity(), None);

        let prompt: Prompt = serde_json::from_value(json!({"name": "p"})).unwrap();
        assert_eq!(prompt.identity(), None);
    }

    #[test]
    fn test_folder_numeric_id_coerced() {
        let folder: Folder = serde_json::from_value(json!({"id": 5, "name": "F"})).unwrap();
        assert_eq!(folder.id.as_deref(), Some("5"));
        assert_eq!(folder.kind, FolderKind::Chat);
    }

    #[test]
    fn test_folder_serializes_type_field() {
        let folder = Folder::new("f1", "Work", FolderKind::Prompt);
        assert_eq!(
            serde_json::to_value(&folder).unwrap(),
            json!({"id": "f1", "name": "Work", "type": "prompt"})
        );
    }

    #[test]
    fn test_folder_without_id_is_kept() {
        let folder: Folder =
            serde_json::from_value(json!({"name": "Loose", "type": "chat", "color": "red"}))
                .unwrap();
        assert_eq!(folder.identity(), None);
        assert_eq!(folder.extra.get("color"), Some(&json!("red")));
        assert_eq!(
            serde_json::to_value(&folder).unwrap(),
            json!({"name": "Loose", "type": "chat", "color": "red"})
        );
    }

    #[test]
    fn test_folder_tolerates_null_name_and_type() {
        let folder: Folder =
            serde_json::from_value(json!({"id": "f1", "name": null, "type": null})).unwrap();
        assert_eq!(folder.name, "");
        assert_eq!(folder.kind, FolderKind::Chat);
    }

    #[test]
    fn test_folder_unknown_type_kept() {
        let value = json!({"id": "f1", "name": "Old", "type": "archive"});
        let folder: Folder = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(folder.kind, FolderKind::Other("archive".to_string()));
        assert_eq!(folder.kind.to_string(), "archive");
        assert_eq!(serde_json::to_value(&folder).unwrap(), value);
    }

    #[test]
    fn test_document_defaults_missing_collections() {
        let doc: Document = serde_json::from_value(json!({"history": [{"id": "a"}]})).unwrap();
        assert_eq!(doc.version, 4);
        assert_eq!(doc.history.len(), 1);
        assert!(doc.folders.is_empty());
        assert!(doc.prompts.is_empty());
    }

    #[test]
    fn test_document_keeps_extra_fields() {
        let doc: Document =
            serde_json::from_value(json!({"version": 4, "history": [], "folders": [], "prompts": [], "theme": "dark"}))
                .unwrap();
        assert_eq!(doc.extra.get("theme"), Some(&json!("dark")));

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["theme"], json!("dark"));
        assert_eq!(value["version"], json!(4));
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::empty();
        assert_eq!(doc.version, 4);
        assert!(doc.is_empty());
        assert!(doc.last_conversation().is_none());
    }
}
