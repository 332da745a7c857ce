//! Persistent store adapter: a best-effort key-value slot per origin.
//!
//! The cart is durably saved as a string under a named key. Both operations
//! are synchronous and best-effort: any underlying fault (disk I/O, quota,
//! missing directory) is caught at this boundary, logged, and degraded to a
//! no-op (`save`) or absence (`load`). The manager above never crashes or
//! loses in-memory state because a write failed; it only loses durability
//! for that write.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Durable key-value boundary used to save and load serialized cart state.
///
/// Implementations swallow their own faults; neither operation can fail
/// from the caller's perspective.
pub trait CartStore {
    /// Durably store `value` under `key`, best-effort.
    fn save(&self, key: &str, value: &str);

    /// Retrieve the last value saved under `key`, or `None` if absent
    /// (never saved, cleared, or unreadable).
    fn load(&self, key: &str) -> Option<String>;
}

/// In-memory store, one map per "origin".
///
/// Used by tests and by the multi-tab harness, where several managers share
/// a single `Rc<MemoryStore>` the way tabs share one origin-scoped store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStore for MemoryStore {
    fn save(&self, key: &str, value: &str) {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn load(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }
}

/// File-backed store: one file per key under a data directory.
///
/// This is the durable store used by the storefront binary so the cart
/// survives restarts the way a browser cart survives reloads.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CartStore for FileStore {
    fn save(&self, key: &str, value: &str) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!(key, error = %e, "cart save skipped: cannot create data dir");
            return;
        }
        if let Err(e) = fs::write(self.slot_path(key), value) {
            tracing::warn!(key, error = %e, "cart save skipped: write failed");
        }
    }

    fn load(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "cart load failed, treating as absent");
                None
            }
        }
    }
}
