use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Key under which the consumed-attempt counter of an assessment is kept.
pub fn attempt_key(assessment_id: &str) -> String {
    format!("assessment_attempts:{}", assessment_id)
}

/// Client-local key/value store holding one counter per assessment. Missing
/// keys read as zero. No expiry.
pub trait AttemptCounterStore: Send + Sync {
    fn get(&self, key: &str) -> Result<u32>;
    fn set(&self, key: &str, value: u32) -> Result<()>;
}

fn lock<'a>(counters: &'a Mutex<HashMap<String, u32>>) -> Result<MutexGuard<'a, HashMap<String, u32>>> {
    counters
        .lock()
        .map_err(|_| Error::Internal("attempt counter lock poisoned".to_string()))
}

#[derive(Clone, Default)]
pub struct MemoryCounterStore {
    counters: Arc<Mutex<HashMap<String, u32>>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptCounterStore for MemoryCounterStore {
    fn get(&self, key: &str) -> Result<u32> {
        Ok(lock(&self.counters)?.get(key).copied().unwrap_or(0))
    }

    fn set(&self, key: &str, value: u32) -> Result<()> {
        lock(&self.counters)?.insert(key.to_string(), value);
        Ok(())
    }
}

/// Counters persisted as a flat JSON object, surviving restarts the way the
/// browser's local storage does. The whole file is rewritten on every set.
#[derive(Clone)]
pub struct FileCounterStore {
    path: PathBuf,
    counters: Arc<Mutex<HashMap<String, u32>>>,
}

impl FileCounterStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let counters = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => HashMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No attempt counter file yet");
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            counters: Arc::new(Mutex::new(counters)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a sibling temp file and renames it over the counter file, so
    /// an interrupted write never leaves a half-written file behind.
    fn persist(&self, counters: &HashMap<String, u32>) -> Result<()> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent.to_path_buf()
            }
            None => PathBuf::from("."),
        };
        let body = serde_json::to_string_pretty(counters)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(body.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| {
            warn!(path = %self.path.display(), error = %e.error, "Failed to persist attempt counters");
            Error::Io(e.error)
        })?;
        Ok(())
    }
}

impl AttemptCounterStore for FileCounterStore {
    fn get(&self, key: &str) -> Result<u32> {
        Ok(lock(&self.counters)?.get(key).copied().unwrap_or(0))
    }

    fn set(&self, key: &str, value: u32) -> Result<()> {
        let mut counters = lock(&self.counters)?;
        let previous = counters.insert(key.to_string(), value);
        if let Err(e) = self.persist(&counters) {
            match previous {
                Some(v) => counters.insert(key.to_string(), v),
                None => counters.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}
