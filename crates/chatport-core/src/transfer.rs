//! History export and import
//!
//! Import detects the shape of the incoming document, migrates it to the
//! current version, merges it with what the store already holds and writes
//! the result back. Export serializes the stored state as a version 4
//! document and hands it to a [`FileDelivery`].

use crate::delivery::FileDelivery;
use crate::format::{Migrator, detect};
use crate::merge::merge_documents;
use crate::model::{Conversation, Document, Folder, Prompt};
use crate::store::{Store, load_collection, save_json};
use chatport_common::{ChatportError, Result, export_filename, keys};
use chrono::{Datelike, Local};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Read the stored state as a canonical document
///
/// Each collection missing from the store reads as empty.
pub fn current_data(store: &dyn Store) -> Result<Document> {
    let history: Vec<Conversation> = load_collection(store, keys::HISTORY)?.unwrap_or_default();
    let folders: Vec<Folder> = load_collection(store, keys::FOLDERS)?.unwrap_or_default();
    let prompts: Vec<Prompt> = load_collection(store, keys::PROMPTS)?.unwrap_or_default();

    Ok(Document::new(history, folders, prompts))
}

/// The conversation import last selected, if any
pub fn selected_conversation(store: &dyn Store) -> Result<Option<Conversation>> {
    match store.get(keys::SELECTED_CONVERSATION)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(None),
    }
}

/// Write the three collections back, selecting the last conversation
fn persist(store: &mut dyn Store, doc: &Document) -> Result<()> {
    save_json(store, keys::HISTORY, &doc.history)?;
    // overwritten on every import, whatever was selected before
    if let Some(last) = doc.last_conversation() {
        save_json(store, keys::SELECTED_CONVERSATION, last)?;
    }
    save_json(store, keys::FOLDERS, &doc.folders)?;
    save_json(store, keys::PROMPTS, &doc.prompts)?;
    Ok(())
}

/// Import/export of the stored chat history
#[derive(Default)]
pub struct HistoryTransfer {
    migrator: Migrator,
}

impl HistoryTransfer {
    pub fn new(migrator: Migrator) -> Self {
        Self { migrator }
    }

    /// Import a parsed document into `store`
    ///
    /// Returns the migrated incoming document, not the merged state. Nothing
    /// is written when the document cannot be recognized or migrated.
    pub fn import_data(&self, store: &mut dyn Store, data: Value) -> Result<Document> {
        let current = current_data(store)?;

        let format = detect(&data);
        if !format.is_recognized() {
            return Err(ChatportError::UnrecognizedFormat);
        }
        let cleaned = self.migrator.normalize(data, format)?;
        info!(
            "Importing {} document: {} conversations, {} folders, {} prompts",
            format,
            cleaned.history.len(),
            cleaned.folders.len(),
            cleaned.prompts.len()
        );

        let merged = merge_documents(current, cleaned.clone());
        persist(store, &merged)?;

        debug!(
            "Store now holds {} conversations, {} folders, {} prompts",
            merged.history.len(),
            merged.folders.len(),
            merged.prompts.len()
        );
        Ok(cleaned)
    }

    /// Import a document from JSON text
    pub fn import_str(&self, store: &mut dyn Store, content: &str) -> Result<Document> {
        let data: Value = serde_json::from_str(content)?;
        self.import_data(store, data)
    }

    /// Import a document from a file
    pub fn import_file(&self, store: &mut dyn Store, input_path: &Path) -> Result<Document> {
        info!("Importing history from {:?}", input_path);
        let content = std::fs::read_to_string(input_path)?;
        self.import_str(store, &content)
    }

    /// The stored state as indented JSON text
    pub fn export_document(&self, store: &dyn Store) -> Result<String> {
        let doc = current_data(store)?;
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Export the stored state, named after `date`, and return the file name
    pub fn export_data<D: Datelike>(
        &self,
        store: &dyn Store,
        delivery: &mut dyn FileDelivery,
        date: &D,
    ) -> Result<String> {
        let payload = self.export_document(store)?;
        let filename = export_filename(date);

        delivery.deliver(&filename, payload.as_bytes())?;
        info!("Exported history as {}", filename);
        Ok(filename)
    }

    /// Export the stored state named after today's local date
    pub fn export_today(&self, store: &dyn Store, delivery: &mut dyn FileDelivery) -> Result<String> {
        self.export_data(store, delivery, &Local::now().date_naive())
    }
}
