//! Durable storage for ledger snapshots.
//!
//! The ledger is persisted as one opaque blob per chain. Every backend (a
//! file on disk, in-memory for testing) implements [`SnapshotStore`]; the
//! rest of the codebase depends only on the trait.

pub mod error;
pub mod file;

pub use error::StoreError;
pub use file::FileSnapshotStore;

/// Storage port for a single chain's snapshot.
///
/// There is no locking: two writers racing on the same backend resolve as
/// last-writer-wins. Callers that need mutual exclusion provide it.
pub trait SnapshotStore {
    /// Read the stored snapshot. `Ok(None)` means nothing has been stored yet,
    /// which is distinct from a read failure.
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the stored snapshot.
    fn save(&self, bytes: &[u8]) -> Result<(), StoreError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).load()
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).save(bytes)
    }
}
