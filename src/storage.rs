//! Storage backends for the route collection.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::error::StorageError;
use crate::traits::{RouteStorage, StorageEvent};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Default)]
struct MemoryBackend {
    entries: HashMap<String, String>,
    subscribers: Vec<Subscriber>,
    quota_bytes: Option<usize>,
}

#[derive(Debug)]
struct Subscriber {
    session: u64,
    key: String,
    sender: Sender<StorageEvent>,
}

/// In-process key-value storage shared between sessions.
///
/// Behaves like browser local storage: every handle obtained through
/// [`MemoryStorage::session`] sees the same entries, and a write through one
/// handle notifies subscribers of the other handles only.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    backend: Arc<Mutex<MemoryBackend>>,
    session: u64,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            backend: Arc::new(Mutex::new(MemoryBackend::default())),
            session: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Storage whose total payload size may not exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        let storage = Self::new();
        if let Ok(mut backend) = storage.backend.lock() {
            backend.quota_bytes = Some(quota_bytes);
        }
        storage
    }

    /// Another handle on the same entries, acting as a separate session.
    pub fn session(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            session: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Removes `key`, notifying other sessions with an empty payload.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut backend = self.lock()?;
        if backend.entries.remove(key).is_some() {
            notify(&mut backend, self.session, key, None);
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryBackend>, StorageError> {
        self.backend
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))
    }
}

fn notify(backend: &mut MemoryBackend, origin: u64, key: &str, value: Option<&str>) {
    // Dropped receivers are pruned here.
    backend.subscribers.retain(|subscriber| {
        if subscriber.session == origin || subscriber.key != key {
            return true;
        }
        subscriber
            .sender
            .send(StorageEvent {
                key: key.to_string(),
                new_value: value.map(str::to_string),
            })
            .is_ok()
    });
}

impl RouteStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut backend = self.lock()?;
        if let Some(limit) = backend.quota_bytes {
            let others: usize = backend
                .entries
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(existing, payload)| existing.len() + payload.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }
        backend.entries.insert(key.to_string(), value.to_string());
        notify(&mut backend, self.session, key, Some(value));
        Ok(())
    }

    fn subscribe(&self, key: &str) -> Receiver<StorageEvent> {
        let (sender, receiver) = mpsc::channel();
        if let Ok(mut backend) = self.backend.lock() {
            backend.subscribers.push(Subscriber {
                session: self.session,
                key: key.to_string(),
                sender,
            });
        }
        receiver
    }
}

/// One JSON file per key under a directory.
///
/// Writes go to a temporary file that is renamed over the target. There is
/// no change notification across processes; [`RouteStorage::subscribe`]
/// returns an already disconnected channel.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.json", file_name))
    }
}

impl RouteStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "wrote storage entry");
        Ok(())
    }

    fn subscribe(&self, _key: &str) -> Receiver<StorageEvent> {
        mpsc::channel().1
    }
}
