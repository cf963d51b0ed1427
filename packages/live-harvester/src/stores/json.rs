//! JSON file store.
//!
//! Two files in the output directory:
//! - `commentary.json`: array of records, append-only
//! - `matches.json`: latest discovery snapshot, replaced each pass
//!
//! Every write goes to a temporary file in the same directory, is flushed
//! to disk, then renamed over the target. A crash mid-write leaves the
//! previous file intact.

use async_trait::async_trait;
use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{HarvestError, Result};
use crate::traits::RecordStore;
use crate::types::{Classification, CommentaryRecord};

pub const COMMENTARY_FILE: &str = "commentary.json";
pub const DISCOVERY_FILE: &str = "matches.json";

pub struct JsonFileStore {
    dir: PathBuf,
    log_path: PathBuf,
    discovery_path: PathBuf,
    /// Log contents as last read or written; `None` until first touched.
    records: Mutex<Option<Vec<CommentaryRecord>>>,
}

impl JsonFileStore {
    /// Store rooted at `dir`. The directory is not created; see [`Self::open`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            log_path: dir.join(COMMENTARY_FILE),
            discovery_path: dir.join(DISCOVERY_FILE),
            dir,
            records: Mutex::new(None),
        }
    }

    /// Create the output directory if needed and return the store.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(dir);
        tokio::fs::create_dir_all(&store.dir)
            .await
            .map_err(|e| HarvestError::store_write(&store.dir, e))?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn discovery_path(&self) -> &Path {
        &self.discovery_path
    }

    async fn read_log(&self) -> Vec<CommentaryRecord> {
        let bytes = match tokio::fs::read(&self.log_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(source) => {
                let err = HarvestError::StoreRead {
                    path: self.log_path.clone(),
                    source,
                };
                warn!(error = %err, "Commentary log unreadable, starting fresh");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<CommentaryRecord>>(&bytes) {
            Ok(records) => {
                info!(path = %self.log_path.display(), records = records.len(), "Loaded commentary log");
                records
            }
            Err(e) => {
                warn!(path = %self.log_path.display(), error = %e, "Commentary log corrupt, starting fresh");
                self.quarantine().await;
                Vec::new()
            }
        }
    }

    /// Move a corrupt log aside so the next append does not overwrite it.
    async fn quarantine(&self) {
        let aside = self.dir.join(format!(
            "{COMMENTARY_FILE}.corrupt-{}",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        match tokio::fs::rename(&self.log_path, &aside).await {
            Ok(()) => warn!(path = %aside.display(), "Corrupt commentary log moved aside"),
            Err(e) => warn!(error = %e, "Could not move corrupt commentary log aside"),
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write-then-rename so readers only ever see a complete file.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path);

    let written = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if written.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    written
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<CommentaryRecord>> {
        let mut cache = self.records.lock().await;
        if cache.is_none() {
            *cache = Some(self.read_log().await);
        }
        Ok(cache.clone().unwrap_or_default())
    }

    async fn append(&self, records: &[CommentaryRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut cache = self.records.lock().await;
        let mut next = match cache.as_ref() {
            Some(existing) => existing.clone(),
            None => self.read_log().await,
        };
        next.extend_from_slice(records);

        let bytes = serde_json::to_vec_pretty(&next)?;
        write_atomic(&self.log_path, &bytes)
            .await
            .map_err(|e| HarvestError::store_write(&self.log_path, e))?;

        debug!(appended = records.len(), total = next.len(), "Commentary log written");
        *cache = Some(next);
        Ok(())
    }

    async fn save_discovery(&self, classification: &Classification) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(classification)?;
        write_atomic(&self.discovery_path, &bytes)
            .await
            .map_err(|e| HarvestError::store_write(&self.discovery_path, e))
    }
}
