//! ChatGPT data export conversion
//!
//! A ChatGPT export is an array of conversations, each holding its messages
//! as a tree in `mapping` (node id -> `{message, parent, children}`), with
//! `current_node` pointing at the leaf of the branch the user last saw.

use crate::clean::model_value;
use crate::model::{Conversation, Document};
use chatport_common::{ConversationDefaults, conversation::DEFAULT_NAME};
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// True for a non-empty array whose every item carries a `mapping` object
pub fn is_foreign(value: &Value) -> bool {
    match value {
        Value::Array(items) => {
            !items.is_empty()
                && items
                    .iter()
                    .all(|item| item.get("mapping").is_some_and(Value::is_object))
        }
        _ => false,
    }
}

/// Convert a ChatGPT export into a canonical document with no folders or prompts
pub fn convert_foreign(value: &Value, defaults: &ConversationDefaults) -> Document {
    let history = value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|item| convert_conversation(item, defaults))
                .collect()
        })
        .unwrap_or_default();

    Document::new(history, Vec::new(), Vec::new())
}

fn convert_conversation(item: &Map<String, Value>, defaults: &ConversationDefaults) -> Conversation {
    let id = item
        .get("id")
        .and_then(Value::as_str)
        .or_else(|| item.get("conversation_id").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let name = item
        .get("title")
        .and_then(Value::as_str)
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_NAME);

    let empty = Map::new();
    let mapping = item
        .get("mapping")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let messages = match item.get("current_node").and_then(Value::as_str) {
        Some(leaf) if mapping.contains_key(leaf) => branch_messages(mapping, leaf),
        _ => all_messages(mapping),
    };
    debug!("Converted foreign conversation {} with {} messages", id, messages.len());

    let mut fields = Map::new();
    fields.insert("id".to_string(), json!(id));
    fields.insert("name".to_string(), json!(name));
    fields.insert("messages".to_string(), Value::Array(messages));
    fields.insert("model".to_string(), model_value(&defaults.model));
    fields.insert("prompt".to_string(), json!(defaults.system_prompt));
    fields.insert("temperature".to_string(), json!(defaults.temperature));
    fields.insert("folderId".to_string(), Value::Null);

    Conversation::from_map(fields)
}

/// Messages on the path from the root to `leaf`, oldest first
fn branch_messages(mapping: &Map<String, Value>, leaf: &str) -> Vec<Value> {
    let mut messages = Vec::new();
    let mut visited = HashSet::new();
    let mut cursor = Some(leaf);

    while let Some(node_id) = cursor {
        if !visited.insert(node_id) {
            break;
        }
        let Some(node) = mapping.get(node_id) else {
            break;
        };
        if let Some(message) = node.get("message").and_then(chat_message) {
            messages.push(message);
        }
        cursor = node.get("parent").and_then(Value::as_str);
    }

    messages.reverse();
    messages
}

/// Every user/assistant message in the tree, ordered by creation time
fn all_messages(mapping: &Map<String, Value>) -> Vec<Value> {
    let mut timed: Vec<(f64, Value)> = mapping
        .values()
        .filter_map(|node| node.get("message"))
        .filter_map(|message| {
            let created = message
                .get("create_time")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            chat_message(message).map(|m| (created, m))
        })
        .collect();

    timed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    timed.into_iter().map(|(_, message)| message).collect()
}

/// `{role, content}` for a user or assistant message with text
fn chat_message(message: &Value) -> Option<Value> {
    let role = message
        .get("author")
        .and_then(|author| author.get("role"))
        .and_then(Value::as_str)
        .filter(|role| matches!(*role, "user" | "assistant"))?;

    let content: String = message
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)?
        .iter()
        .filter_map(Value::as_str)
        .collect();

    if content.trim().is_empty() {
        return None;
    }
    Some(json!({"role": role, "content": content}))
}
