//! Lifecycle notifications for store mutations
//!
//! Every mutating store call is bracketed by a pair of events: `Saving` and
//! `Saved` around a write, `Deleting` and `Deleted` around a removal.
//! Listeners are registered on the store at construction and called
//! synchronously, in registration order.

use crate::NormalizedPath;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kinds of store lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreEventKind {
    /// Before a snapshot file is written
    Saving,
    /// After a snapshot file is written
    Saved,
    /// Before a snapshot file is removed
    Deleting,
    /// After a snapshot file is removed
    Deleted,
}

impl fmt::Display for StoreEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saving => write!(f, "saving"),
            Self::Saved => write!(f, "saved"),
            Self::Deleting => write!(f, "deleting"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// A lifecycle event for one snapshot file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub kind: StoreEventKind,
    pub path: NormalizedPath,
}

/// Receives store lifecycle events.
pub trait StoreListener: Send + Sync {
    fn on_event(&self, event: &StoreEvent);
}

impl<F> StoreListener for F
where
    F: Fn(&StoreEvent) + Send + Sync,
{
    fn on_event(&self, event: &StoreEvent) {
        self(event)
    }
}

/// Ordered set of registered listeners
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Vec<Arc<dyn StoreListener>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Arc<dyn StoreListener>) {
        self.inner.push(listener);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Deliver an event to every listener.
    pub fn notify(&self, kind: StoreEventKind, path: &NormalizedPath) {
        let event = StoreEvent {
            kind,
            path: path.clone(),
        };
        tracing::trace!(%kind, %path, listeners = self.inner.len(), "Store event");
        for listener in &self.inner {
            listener.on_event(&event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.inner.len())
            .finish()
    }
}
