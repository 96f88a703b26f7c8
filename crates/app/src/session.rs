//! Durable session storage.
//!
//! The browser build of this storefront keeps two entries in local storage:
//! the logged-in session and the guest vehicle choice. This module is that
//! analogue: a small key/value store of JSON blobs under fixed keys, plus
//! the best-effort startup restore pass. Writes are synchronous and treated
//! as always succeeding; a failure is logged and the app carries on.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use mockall::automock;
use tracing::warn;

/// Durable-storage key for the logged-in session (`{profile, orders}`).
pub const SESSION_KEY: &str = "loggedInUserSession";

/// Durable-storage key for the guest vehicle selection.
pub const GUEST_CAR_KEY: &str = "guestSelectedCar";

/// A durable string store keyed by the fixed entry names above.
#[automock]
pub trait SessionStorage: Send + Sync {
    /// Reads an entry, `None` when absent or unreadable.
    fn load(&self, key: &str) -> Option<String>;

    /// Writes an entry, best-effort.
    fn save(&self, key: &str, value: &str);

    /// Deletes an entry, best-effort.
    fn remove(&self, key: &str);
}

/// File-backed storage: each key maps to `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates storage rooted at `dir`; the directory is created lazily on
    /// first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStorage for FileStorage {
    fn load(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path(key)).ok()
    }

    fn save(&self, key: &str, value: &str) {
        if let Err(error) = fs::create_dir_all(&self.dir) {
            warn!("failed to create data dir {:?}: {error}", self.dir);
            return;
        }

        if let Err(error) = fs::write(self.path(key), value) {
            warn!("failed to persist {key}: {error}");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(error) = fs::remove_file(self.path(key)) {
            if error.kind() != ErrorKind::NotFound {
                warn!("failed to remove {key}: {error}");
            }
        }
    }
}

/// In-memory storage for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    /// Storage pre-seeded with entries (startup-restore tests).
    #[must_use]
    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        MemoryStorage {
            entries: Mutex::new(entries.into_iter().collect()),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}
