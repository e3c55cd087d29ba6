//! Chatport Common - Shared utilities and types
//!
//! This crate provides the common error type, configuration structs,
//! constants and utility functions used across all chatport components.

pub mod config;
pub mod constants;
pub mod error;
pub mod utils;

// Re-export commonly used items
pub use config::{
    BaseConfig, ChatportConfig, ConversationDefaults, ExportConfig, ModelConfig, StorageBackend,
    StorageConfig,
};
pub use constants::*;
pub use error::{ChatportError, Result};
pub use utils::*;
