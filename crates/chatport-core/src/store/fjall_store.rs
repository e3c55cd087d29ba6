//! Fjäll-based implementation of the Store
//!
//! All keys live in a single partition of the keyspace.

use super::Store;
use chatport_common::{ChatportError, Result};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;

/// Persistent store backed by a fjall keyspace
pub struct FjallStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
    namespace: String,
}

fn storage_error(err: impl std::fmt::Display) -> ChatportError {
    ChatportError::Storage(err.to_string())
}

impl FjallStore {
    /// Open the store in `data_dir` with the default namespace "chatport"
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        Self::with_namespace(data_dir, chatport_common::storage::DEFAULT_NAMESPACE)
    }

    /// Open the store in `data_dir` using `namespace` as the partition name
    pub fn with_namespace<P: AsRef<Path>>(data_dir: P, namespace: &str) -> Result<Self> {
        let keyspace = Config::new(data_dir).open().map_err(storage_error)?;
        let partition = keyspace
            .open_partition(namespace, PartitionCreateOptions::default())
            .map_err(storage_error)?;
        Ok(Self {
            keyspace,
            partition,
            namespace: namespace.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Store for FjallStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.partition.get(key.as_bytes()).map_err(storage_error)? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| ChatportError::Storage(format!("value under {} is not UTF-8: {}", key, e))),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.partition
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(storage_error)?;
        self.keyspace
            .persist(PersistMode::Buffer)
            .map_err(storage_error)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "fjall"
    }
}
