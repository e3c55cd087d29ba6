//! Conversation history cleaning
//!
//! Legacy exports (v1 and v2) predate several conversation fields. The
//! cleaner fills those in from the configured defaults and drops entries
//! that cannot be repaired, so one bad record never aborts an import.

use crate::model::Conversation;
use chatport_common::{ConversationDefaults, ModelConfig, conversation::DEFAULT_NAME};
use serde_json::{Map, Value, json};
use tracing::warn;

/// Repairs or drops malformed conversations from a legacy export
pub trait HistoryCleaner {
    fn clean(&self, raw: Vec<Value>) -> Vec<Conversation>;
}

/// Fills missing chat settings from [`ConversationDefaults`]
#[derive(Debug, Clone, Default)]
pub struct DefaultCleaner {
    defaults: ConversationDefaults,
}

impl DefaultCleaner {
    pub fn new(defaults: ConversationDefaults) -> Self {
        Self { defaults }
    }

    fn clean_one(&self, index: usize, raw: Value) -> Option<Conversation> {
        let Value::Object(mut fields) = raw else {
            warn!("Dropping conversation #{}: not an object", index);
            return None;
        };

        if !fields.get("id").is_some_and(Value::is_string) {
            warn!("Dropping conversation #{}: missing string id", index);
            return None;
        }

        fill(&mut fields, "name", || json!(DEFAULT_NAME));
        if !fields.get("messages").is_some_and(Value::is_array) {
            fields.insert("messages".to_string(), json!([]));
        }
        fill(&mut fields, "model", || model_value(&self.defaults.model));
        fill(&mut fields, "prompt", || json!(self.defaults.system_prompt));
        fill(&mut fields, "temperature", || json!(self.defaults.temperature));
        fill(&mut fields, "folderId", || Value::Null);

        Some(Conversation::from_map(fields))
    }
}

impl HistoryCleaner for DefaultCleaner {
    fn clean(&self, raw: Vec<Value>) -> Vec<Conversation> {
        let total = raw.len();
        let cleaned: Vec<Conversation> = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| self.clean_one(index, value))
            .collect();

        if cleaned.len() < total {
            warn!(
                "Dropped {} of {} conversations during cleaning",
                total - cleaned.len(),
                total
            );
        }
        cleaned
    }
}

fn fill(fields: &mut Map<String, Value>, key: &str, default: impl FnOnce() -> Value) {
    match fields.get(key) {
        Some(value) if !value.is_null() => {}
        // folderId is allowed to be null
        Some(Value::Null) if key == "folderId" => {}
        _ => {
            fields.insert(key.to_string(), default());
        }
    }
}

/// JSON form of a model as stored on a conversation
pub(crate) fn model_value(model: &ModelConfig) -> Value {
    json!({
        "id": model.id,
        "name": model.name,
        "maxLength": model.max_length,
        "tokenLimit": model.token_limit,
    })
}
