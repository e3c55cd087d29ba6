//! Hand-off of exported documents to the user

use chatport_common::{ChatportError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Receives an exported payload under a file name
pub trait FileDelivery {
    fn deliver(&mut self, filename: &str, payload: &[u8]) -> Result<()>;
}

/// Writes deliveries into a directory, creating it if needed
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
    dir: PathBuf,
}

impl DirectoryDelivery {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Where a delivery named `filename` ends up
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

impl FileDelivery for DirectoryDelivery {
    fn deliver(&mut self, filename: &str, payload: &[u8]) -> Result<()> {
        let path = self.path_for(filename);
        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(&path, payload))
            .map_err(|e| ChatportError::Delivery(format!("{}: {}", path.display(), e)))?;
        info!("Delivered {} bytes to {:?}", payload.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_writes_into_directory() {
        let dir = tempdir().unwrap();
        let mut delivery = DirectoryDelivery::new(dir.path().join("exports"));

        delivery.deliver("out.json", b"{}").unwrap();
        let written = fs::read_to_string(dir.path().join("exports").join("out.json")).unwrap();
        assert_eq!(written, "{}");
    }

    #[test]
    fn test_unwritable_target_is_delivery_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let mut delivery = DirectoryDelivery::new(&blocker);
        let err = delivery.deliver("out.json", b"{}").unwrap_err();
        assert!(matches!(err, ChatportError::Delivery(_)));
    }
}
