//! JSON document store for the current record.
//!
//! Exactly one record is stored at a time. [`DocumentStore::replace`] writes
//! the new record beside the old one and renames it into place, so readers
//! see either the previous record or the new one, never a mix or a history.

use crate::models::AggregateRecord;
use std::error::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

pub type StoreResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the stored record with `record`.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn replace(&self, record: &AggregateRecord) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(record)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(dir).await {
                error!(dir = %dir.display(), error = %e, "Failed to create store dir");
                return Err(e.into());
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        info!(hemispheres = record.hemispheres.len(), "Replaced stored record");
        Ok(())
    }

    /// The stored record, or `None` when nothing has been stored yet.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self) -> StoreResult<Option<AggregateRecord>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No stored record yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_str(&raw)?;
        Ok(Some(record))
    }

    /// The stored record, or the all-empty default.
    pub async fn load_or_default(&self) -> StoreResult<AggregateRecord> {
        Ok(self.load().await?.unwrap_or_default())
    }
}
