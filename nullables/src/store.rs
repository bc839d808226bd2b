//! Nullable store: in-memory snapshot storage for testing.

use notary_store::{SnapshotStore, StoreError};
use std::sync::Mutex;

/// An in-memory snapshot slot.
///
/// Counts saves so tests can assert that read-only commands do not persist,
/// and can be told to fail writes to exercise error paths.
#[derive(Default)]
pub struct NullSnapshotStore {
    bytes: Mutex<Option<Vec<u8>>>,
    saves: Mutex<usize>,
    fail_writes: Mutex<bool>,
}

impl NullSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `bytes`.
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        let store = Self::new();
        *store.bytes.lock().unwrap() = Some(bytes);
        store
    }

    /// Current contents.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.bytes.lock().unwrap().clone()
    }

    /// Overwrite the contents directly (e.g. to simulate corruption).
    pub fn set_bytes(&self, bytes: Vec<u8>) {
        *self.bytes.lock().unwrap() = Some(bytes);
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }

    /// Make subsequent `save` calls fail.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }
}

impl SnapshotStore for NullSnapshotStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.bytes.lock().unwrap().clone())
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StoreError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(StoreError::Backend("null store configured to fail writes".into()));
        }
        *self.bytes.lock().unwrap() = Some(bytes.to_vec());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}
