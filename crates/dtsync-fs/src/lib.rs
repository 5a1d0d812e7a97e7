//! Filesystem layer for document-type synchronisation
//!
//! Provides name-safe path resolution, atomic I/O, the versioned snapshot
//! store, and the guard that keeps an external file watcher from reacting to
//! writes this process makes itself.

pub mod config;
pub mod error;
pub mod events;
pub mod io;
pub mod path;
pub mod store;
pub mod watcher;

pub use config::{ConfigStore, StoreConfig};
pub use error::{Error, Result};
pub use events::{Listeners, StoreEvent, StoreEventKind, StoreListener};
pub use path::{NormalizedPath, scrub_file_name, type_folder};
pub use store::VersionedStore;
pub use watcher::{FileWatcher, PausedWatcher, WatcherGuard};
