//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── {records_file}   # JSON array of room records
//! └── {export_file}    # CSV export
//! ```
//!
//! Both files are written to a temporary sibling first and renamed into
//! place, so a crash mid-write leaves the previous version intact.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{PathsConfig, RoomRecord};
use crate::storage::{RecordStorage, write_csv};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    records_file: String,
    export_file: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, paths: &PathsConfig) -> Self {
        Self {
            root_dir: root_dir.into(),
            records_file: paths.records_file.clone(),
            export_file: paths.export_file.clone(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    pub fn records_path(&self) -> PathBuf {
        self.path(&self.records_file)
    }

    pub fn export_path(&self) -> PathBuf {
        self.path(&self.export_file)
    }
}

#[async_trait]
impl RecordStorage for LocalStorage {
    async fn load_records(&self) -> Result<Vec<RoomRecord>> {
        match self.read_bytes(&self.records_file).await? {
            Some(bytes) => {
                let records: Vec<RoomRecord> = serde_json::from_slice(&bytes)?;
                log::info!(
                    "Loaded {} room records from {}",
                    records.len(),
                    self.records_path().display()
                );
                Ok(records)
            }
            None => {
                log::warn!(
                    "No record store at {}, starting empty",
                    self.records_path().display()
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save_records(&self, records: &[RoomRecord]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        self.write_bytes(&self.records_file, &bytes).await?;
        log::info!(
            "Saved {} room records to {}",
            records.len(),
            self.records_path().display()
        );
        Ok(())
    }

    async fn write_export(&self, records: &[RoomRecord]) -> Result<()> {
        let mut bytes = Vec::new();
        write_csv(&mut bytes, records)?;
        self.write_bytes(&self.export_file, &bytes).await?;
        log::info!("Data saved as table to {}", self.export_path().display());
        Ok(())
    }

    fn location(&self) -> String {
        self.records_path().display().to_string()
    }
}
