//! Environments: the stores a deployment searches for tools.

use tooldist_storage::{Storage, StorageReader};

/// Storage provided by a deployment environment.
///
/// The private store belongs to the environment and is writable. The public
/// store is shared and read-only; it is searched when the private store has
/// nothing suitable.
pub trait Environ: Send + Sync {
    /// The environment's own store.
    fn storage(&self) -> &dyn Storage;

    /// The shared, read-only store.
    fn public_storage(&self) -> &dyn StorageReader;
}

/// An [`Environ`] built from two concrete stores.
#[derive(Debug, Clone)]
pub struct StorageEnviron<S, P> {
    private: S,
    public: P,
}

impl<S, P> StorageEnviron<S, P> {
    /// Pair a private store with a public one.
    pub const fn new(private: S, public: P) -> Self {
        Self { private, public }
    }
}

impl<S: Storage, P: StorageReader> Environ for StorageEnviron<S, P> {
    fn storage(&self) -> &dyn Storage {
        &self.private
    }

    fn public_storage(&self) -> &dyn StorageReader {
        &self.public
    }
}
