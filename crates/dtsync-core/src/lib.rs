//! Document-type reconciliation for dtsync
//!
//! Keeps the document types of a content model and their stored snapshots
//! in step:
//!
//! - [`DocTypeReconciler`] exports live types and imports snapshots, either
//!   wholesale or by fit-and-fix editing of the live type
//! - [`DocTypeSync`] runs those operations against a [`VersionedStore`](dtsync_fs::VersionedStore)
//! - [`ContentModel`] is the capability the live model is reached through,
//!   with [`InMemoryContentModel`] as a complete in-process implementation

pub mod change;
pub mod config;
pub mod doctype;
pub mod error;
pub mod logging;
pub mod memory;
pub mod model;
pub mod service;
pub mod sync;

pub use change::{ChangeOutcome, ChangeRecord, ItemType};
pub use config::SyncSettings;
pub use doctype::{DocTypeReconciler, ImportMode};
pub use error::{Error, Result};
pub use memory::InMemoryContentModel;
pub use model::{
    AllowedChild, ContentType, ContentTypeRef, DataTypeDefinition, PropertyGroup, PropertyType,
};
pub use service::ContentModel;
pub use sync::DocTypeSync;
