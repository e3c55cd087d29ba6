//! Configuration types and utilities for chatport
//!
//! The configuration lives in a TOML file, by default under the user's
//! config directory at `chatport/config.toml`.

use crate::constants::{conversation, storage};
use crate::error::{ChatportError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatportConfig {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub export: ExportConfig,
    pub conversation: ConversationDefaults,
}

/// Base configuration that all components can use
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BaseConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(storage::DEFAULT_DATA_DIR),
            log_level: "info".to_string(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend type
    pub backend: StorageBackend,
    /// Partition name inside the keyspace
    pub namespace: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Fjall keyspace under `base.data_dir`
    Fjall,
    /// Process-local map, lost on exit; for tests and dry runs
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Fjall,
            namespace: storage::DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exported documents are written to
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
        }
    }
}

/// Model attached to conversations that carry none
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    pub max_length: u32,
    pub token_limit: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id: conversation::DEFAULT_MODEL_ID.to_string(),
            name: conversation::DEFAULT_MODEL_NAME.to_string(),
            max_length: conversation::DEFAULT_MODEL_MAX_LENGTH,
            token_limit: conversation::DEFAULT_MODEL_TOKEN_LIMIT,
        }
    }
}

/// Chat settings filled into imported conversations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversationDefaults {
    pub system_prompt: String,
    pub temperature: f64,
    pub model: ModelConfig,
}

impl Default for ConversationDefaults {
    fn default() -> Self {
        Self {
            system_prompt: conversation::DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: conversation::DEFAULT_TEMPERATURE,
            model: ModelConfig::default(),
        }
    }
}

impl ChatportConfig {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            let config_str = fs::read_to_string(config_path)?;
            let config = toml::from_str(&config_str)?;
            tracing::debug!("Loaded configuration from {:?}", config_path);
            Ok(config)
        } else {
            let config = ChatportConfig::default();
            config.save(config_path)?;
            tracing::info!("Wrote default configuration to {:?}", config_path);
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path = config_path.as_ref();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_str = toml::to_string_pretty(self)?;
        fs::write(config_path, config_str)?;
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ChatportError::Config("Failed to get config directory".to_string()))?;
        Ok(config_dir.join("chatport").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_creates_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = ChatportConfig::load(&path).unwrap();
        assert_eq!(config, ChatportConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = ChatportConfig::default();
        config.storage.backend = StorageBackend::Memory;
        config.conversation.temperature = 0.5;
        config.save(&path).unwrap();

        let loaded = ChatportConfig::load(&path).unwrap();
        assert_eq!(loaded.storage.backend, StorageBackend::Memory);
        assert_eq!(loaded.conversation.temperature, 0.5);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[base]\nlog_level = \"debug\"\n").unwrap();

        let config = ChatportConfig::load(&path).unwrap();
        assert_eq!(config.base.log_level, "debug");
        assert_eq!(config.storage.namespace, "chatport");
        assert_eq!(config.conversation.model.id, "gpt-3.5-turbo");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base = [").unwrap();

        let err = ChatportConfig::load(&path).unwrap_err();
        assert!(matches!(err, ChatportError::Config(_)));
    }
}
