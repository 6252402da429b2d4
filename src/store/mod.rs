//! Whole-record JSON persistence for per-user state.
//!
//! Each data kind keeps one JSON document per user under the data directory
//! (`word-lists/<userId>.json`, ...). Every mutation is a read-modify-write of
//! the full record performed under that user's async mutex, so mutations for
//! one user are serialized while different users proceed independently. There
//! are no partial updates and no cross-record transactions; the last write of
//! a record wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;

/// The per-user record families the store knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    WordLists,
    Progress,
    DailyPractice,
}

impl DataKind {
    fn dir_name(self) -> &'static str {
        match self {
            DataKind::WordLists => "word-lists",
            DataKind::Progress => "progress",
            DataKind::DailyPractice => "daily-practice",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store record corrupt at {path}: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid record key: {0:?}")]
    InvalidKey(String),
}

/// File-backed store for per-user JSON records.
pub struct JsonStore {
    data_dir: PathBuf,
    locks: Mutex<HashMap<(DataKind, String), Arc<AsyncMutex<()>>>>,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub async fn ensure_dirs(&self) -> Result<(), StoreError> {
        for kind in [DataKind::WordLists, DataKind::Progress, DataKind::DailyPractice] {
            tokio::fs::create_dir_all(self.data_dir.join(kind.dir_name())).await?;
        }
        Ok(())
    }

    /// Reads a user's record, returning `None` when the user has no record yet.
    pub async fn load<R>(&self, kind: DataKind, user_id: &str) -> Result<Option<R>, StoreError>
    where
        R: DeserializeOwned,
    {
        let path = self.record_path(kind, user_id)?;
        read_record(&path).await
    }

    /// Read-modify-write of one user's record under that user's lock.
    ///
    /// The closure receives the current record (`None` if absent) and may
    /// replace it; the resulting record is written back in full. If the
    /// closure errors, nothing is persisted.
    pub async fn update<R, T, E, F>(&self, kind: DataKind, user_id: &str, f: F) -> Result<T, E>
    where
        R: Serialize + DeserializeOwned,
        E: From<StoreError>,
        F: FnOnce(&mut Option<R>) -> Result<T, E>,
    {
        let path = self.record_path(kind, user_id).map_err(E::from)?;
        let lock = self.user_lock(kind, user_id);
        let _guard = lock.lock().await;

        let mut record: Option<R> = read_record(&path).await.map_err(E::from)?;
        let out = f(&mut record)?;

        match record {
            Some(record) => write_record(&path, &record).await.map_err(E::from)?,
            None => remove_record(&path).await.map_err(E::from)?,
        }
        Ok(out)
    }

    fn user_lock(&self, kind: DataKind, user_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(
            locks
                .entry((kind, user_id.to_string()))
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }

    fn record_path(&self, kind: DataKind, user_id: &str) -> Result<PathBuf, StoreError> {
        if !valid_key(user_id) {
            return Err(StoreError::InvalidKey(user_id.to_string()));
        }
        Ok(self
            .data_dir
            .join(kind.dir_name())
            .join(format!("{user_id}.json")))
    }
}

/// Record keys become file names, so path-meaningful characters are rejected.
fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 128
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
}

async fn read_record<R>(path: &Path) -> Result<Option<R>, StoreError>
where
    R: DeserializeOwned,
{
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            path: path.display().to_string(),
            source,
        })
}

async fn write_record<R>(path: &Path, record: &R) -> Result<(), StoreError>
where
    R: Serialize,
{
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let raw = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Corrupt {
        path: path.display().to_string(),
        source,
    })?;

    // Write-then-rename keeps a crashed write from truncating the record.
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &raw).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

async fn remove_record(path: &Path) -> Result<(), StoreError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
