//! JSON-file key/value store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use crate::error::{AppError, ErrorKind};
use crate::result::AppResult;
use crate::traits::KeyValueStore;

/// Modification time and length of the backing file, `None` when absent.
type Fingerprint = Option<(SystemTime, u64)>;

/// Persistent store kept as a single JSON object on disk.
///
/// Several processes may share the file (the notifier daemon and the CLI).
/// Every access compares the file's fingerprint with the one last seen and
/// reloads when another writer changed it. Writes go through a temporary
/// file followed by a rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, String>,
    seen: Fingerprint,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            inner: Mutex::new(Inner::default()),
        };
        {
            let mut inner = store.lock();
            store.reload(&mut inner)?;
            tracing::debug!(
                path = %store.path.display(),
                keys = inner.entries.len(),
                "Local storage loaded"
            );
        }
        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn fingerprint(&self) -> AppResult<Fingerprint> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(Some((meta.modified()?, meta.len()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Re-read the file if it changed since it was last seen.
    fn reload(&self, inner: &mut Inner) -> AppResult<()> {
        let current = self.fingerprint()?;
        if current.is_some() && current == inner.seen {
            return Ok(());
        }

        inner.entries = match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Corrupt local storage file {}", self.path.display()),
                    e,
                )
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        if inner.seen.is_some() {
            tracing::debug!(path = %self.path.display(), "Local storage changed on disk, reloaded");
        }
        inner.seen = current;
        Ok(())
    }

    fn persist(&self, inner: &mut Inner) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&inner.entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        inner.seen = self.fingerprint()?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut inner = self.lock();
        self.reload(&mut inner)?;
        Ok(inner.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut inner = self.lock();
        self.reload(&mut inner)?;
        inner.entries.insert(key.to_string(), value.to_string());
        self.persist(&mut inner)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut inner = self.lock();
        self.reload(&mut inner)?;
        if inner.entries.remove(key).is_some() {
            self.persist(&mut inner)?;
        }
        Ok(())
    }
}
