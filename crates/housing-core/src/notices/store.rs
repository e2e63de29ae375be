use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use super::domain::Notice;

/// Error enumeration for notice-store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read notice store at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write notice store at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("notice store at {path} holds invalid JSON: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode notice store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage abstraction so merge semantics can be exercised against in-memory
/// fakes in tests.
pub trait NoticeBackend: Send + Sync {
    fn load(&self) -> Result<Vec<Notice>, StoreError>;
    fn save(&self, notices: &[Notice]) -> Result<(), StoreError>;
}

/// Flat JSON-file backend: the collection is read wholly before a merge and
/// rewritten wholly afterwards, through a temp-file rename so a crashed run
/// never leaves a half-written store behind.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NoticeBackend for JsonFileBackend {
    fn load(&self) -> Result<Vec<Notice>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, notices: &[Notice]) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let encoded = serde_json::to_string_pretty(notices)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, encoded).map_err(write_err)?;
        fs::rename(&staging, &self.path).map_err(write_err)
    }
}

/// Outcome of one merge: how many entries were new and the resulting size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: usize,
    pub total: usize,
}

/// Deduplicating collection of notices keyed by URL, newest first.
pub struct NoticeStore<B> {
    backend: B,
}

impl<B: NoticeBackend> NoticeStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Merge a freshly parsed batch into the persisted collection.
    ///
    /// Already-seen URLs keep their stored record untouched even when the
    /// incoming fields differ (first-write-wins), so re-merging the same
    /// fetch result is a no-op. New unique entries are prepended as a block,
    /// preserving most-recent-first ordering across merges.
    pub fn merge(&self, batch: Vec<Notice>) -> Result<MergeSummary, StoreError> {
        let existing = self.backend.load()?;
        let mut seen: HashSet<String> = existing.iter().map(|notice| notice.url.clone()).collect();

        let mut merged: Vec<Notice> = Vec::with_capacity(existing.len() + batch.len());
        for notice in batch {
            if seen.insert(notice.url.clone()) {
                merged.push(notice);
            }
        }

        let added = merged.len();
        merged.extend(existing);
        self.backend.save(&merged)?;

        info!(added, total = merged.len(), "notice store merged");
        Ok(MergeSummary {
            added,
            total: merged.len(),
        })
    }

    /// All stored notices, newest first.
    pub fn all(&self) -> Result<Vec<Notice>, StoreError> {
        self.backend.load()
    }

    /// All notices published on or after the cutoff, in stored order.
    pub fn recent(&self, cutoff: NaiveDate) -> Result<Vec<Notice>, StoreError> {
        let notices = self.backend.load()?;
        Ok(notices
            .into_iter()
            .filter(|notice| notice.publish_date >= cutoff)
            .collect())
    }
}
