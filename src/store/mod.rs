//! Primitives of the remote key-value store that sectors and the roster live
//! in. The store itself is opaque; this crate only subscribes, reads once and
//! appends.

use serde_json::Value;
use std::{future::Future, sync::Arc};
use thiserror::Error;

mod memory;
pub use memory::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },
    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },
}

/// Receives the full value at the subscribed path, `None` when nothing is stored there.
pub type SnapshotFn = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

pub trait RemoteStore: Send + Sync {
    /// Delivers the current snapshot right away and a fresh one after every
    /// change at or below `path`, until the returned handle is cancelled or dropped.
    fn subscribe(&self, path: &str, on_snapshot: SnapshotFn) -> Subscription;

    fn read_once(&self, path: &str)
    -> impl Future<Output = Result<Option<Value>, Error>> + Send;

    /// Writes `value` as a new child of `path` and returns the key the store assigned.
    fn append_new(&self, path: &str, value: Value)
    -> impl Future<Output = Result<String, Error>> + Send;
}

/// Live listener handle. The listener is detached on `cancel` or drop.
pub struct Subscription {
    path: String,
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new<F>(path: impl Into<String>, detach: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            detach: Some(Box::new(detach)),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .field("active", &self.is_active())
            .finish()
    }
}
