//! Cache store: the last good snapshot of each dataset, one JSON file per key.
//!
//! Writes go to a uniquely named temporary file in the same directory and are
//! renamed over `{dataset}.json`, so readers see either the previous snapshot
//! or the new one, never a partial file. Concurrent writers race on the
//! rename; the last one wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;
use vitibrasil_parser::{Dataset, Record};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache file {path} is not a valid snapshot: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode snapshot for {dataset}: {source}")]
    Encode {
        dataset: Dataset,
        #[source]
        source: serde_json::Error,
    },
}

/// How the records of a snapshot were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Scrape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub captured_at: DateTime<Utc>,
    pub provenance: Provenance,
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Open the store, creating `dir` if it does not exist.
    pub async fn init(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|source| CacheError::Init {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, dataset: Dataset) -> PathBuf {
        self.dir.join(format!("{}.json", dataset.key()))
    }

    /// Replace the snapshot of `dataset` with `records`, stamped now.
    pub async fn save(&self, dataset: Dataset, records: &[Record]) -> Result<(), CacheError> {
        let snapshot = Snapshot {
            records: records.to_vec(),
            captured_at: Utc::now(),
            provenance: Provenance::Scrape,
        };
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|source| CacheError::Encode { dataset, source })?;

        let path = self.path_for(dataset);
        let temp_path = self
            .dir
            .join(format!(".{}.json.{}.tmp", dataset.key(), Uuid::new_v4()));

        if let Err(source) = fs::write(&temp_path, &json).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(CacheError::Io {
                path: temp_path,
                source,
            });
        }

        if let Err(source) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(CacheError::Io { path, source });
        }

        debug!(%dataset, records = records.len(), path = %path.display(), "snapshot saved");
        Ok(())
    }

    /// Full snapshot of `dataset`, or `None` when nothing was cached yet.
    pub async fn load_snapshot(&self, dataset: Dataset) -> Result<Option<Snapshot>, CacheError> {
        let path = self.path_for(dataset);
        let bytes = match fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| CacheError::Corrupt { path, source })
    }

    pub async fn load(&self, dataset: Dataset) -> Result<Option<Vec<Record>>, CacheError> {
        Ok(self.load_snapshot(dataset).await?.map(|s| s.records))
    }
}
