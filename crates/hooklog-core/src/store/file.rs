//! File-backed storage for development use.
//!
//! One JSON document per record, named `webhook-<identifier>.json` inside
//! a dedicated directory. Writes go to a dot-prefixed temp file in the
//! same directory and are renamed into place, so a concurrent reader
//! never observes a partially written record. No ordering is promised
//! between concurrent writers beyond what the filesystem gives rename.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Result, StoreError},
    models::{Record, RecordId},
    store::LogStore,
};

const FILE_PREFIX: &str = "webhook-";
const FILE_SUFFIX: &str = ".json";

/// On-disk document layout. The identifier lives in the filename, not in
/// the document.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    timestamp: DateTime<Utc>,
    headers: BTreeMap<String, String>,
    body: serde_json::Value,
    query: BTreeMap<String, String>,
}

/// File-backed `LogStore` implementation.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory itself is created
    /// lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory records are stored in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &RecordId) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{id}{FILE_SUFFIX}"))
    }

    /// Rejects identifiers that could escape the storage directory when
    /// joined into a path. Anything a `list` call would never produce is
    /// simply not found.
    fn validate_id(id: &RecordId) -> Result<()> {
        let s = id.as_str();
        if s.is_empty() || s.contains(['/', '\\']) || s.contains("..") {
            return Err(StoreError::NotFound(s.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LogStore for FileStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn save(&self, record: &Record) -> Result<RecordId> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(StoreError::write)?;

        let stored = StoredRecord {
            timestamp: record.received_at,
            headers: record.headers.clone(),
            body: record.body.clone(),
            query: record.query.clone(),
        };
        let json = serde_json::to_vec_pretty(&stored).map_err(StoreError::write)?;

        // Write-then-rename keeps readers from seeing a partial document.
        let path = self.record_path(&record.id);
        let tmp = self.dir.join(format!(".{FILE_PREFIX}{}{FILE_SUFFIX}.tmp", record.id));
        tokio::fs::write(&tmp, &json).await.map_err(StoreError::write)?;
        tokio::fs::rename(&tmp, &path).await.map_err(StoreError::write)?;

        debug!(path = %path.display(), "webhook record written");
        Ok(record.id.clone())
    }

    async fn list(&self) -> Result<Vec<RecordId>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // No directory yet means nothing has been saved.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::read(e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(StoreError::read)? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(id) =
                name.strip_prefix(FILE_PREFIX).and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
            {
                ids.push(RecordId::new(id));
            }
        }

        // Identifiers embed the receipt time, so descending lexicographic
        // order is descending chronological order.
        ids.sort_unstable_by(|a, b| b.cmp(a));
        Ok(ids)
    }

    async fn get(&self, id: &RecordId) -> Result<Record> {
        Self::validate_id(id)?;

        let path = self.record_path(id);
        let json = match tokio::fs::read(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            },
            Err(e) => return Err(StoreError::read(e)),
        };

        // The path stays in the log; clients only see the identifier.
        let stored: StoredRecord = serde_json::from_slice(&json).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "malformed record document");
            StoreError::ReadFailed(format!("malformed record document for '{id}'"))
        })?;

        Ok(Record {
            id: id.clone(),
            received_at: stored.timestamp,
            headers: stored.headers,
            body: stored.body,
            query: stored.query,
        })
    }
}
