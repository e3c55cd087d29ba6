//! Chatport Core - chat history export, import and merge
//!
//! This crate provides:
//! - Detection of every known export shape (legacy versions and ChatGPT exports)
//! - Migration of those shapes to the current version 4 document
//! - Id-deduplicating merge of imported data into the stored state
//! - Pluggable key-value stores and export delivery

pub mod clean;
pub mod delivery;
pub mod format;
pub mod merge;
pub mod model;
pub mod store;
pub mod transfer;

// Re-export key types for convenience
pub use clean::{DefaultCleaner, HistoryCleaner};
pub use delivery::{DirectoryDelivery, FileDelivery};
pub use format::{FormatTag, Migrator, detect};
pub use merge::{merge_by_id, merge_documents};
pub use model::{Conversation, Document, Folder, FolderKind, Identified, Prompt};
pub use store::{FjallStore, MemoryStore, Store};
pub use transfer::{HistoryTransfer, current_data, selected_conversation};
