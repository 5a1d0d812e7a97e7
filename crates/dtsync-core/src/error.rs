//! Error types for dtsync-core

/// Result type for dtsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a single export or import call
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A section the operation cannot proceed without is absent
    #[error("Snapshot is missing required section {section}")]
    MissingSection { section: &'static str },

    /// A field the operation cannot proceed without is absent
    #[error("Snapshot is missing required field {field}")]
    MissingField { field: &'static str },

    /// No live content type carries the alias
    #[error("Content type not found: {alias}")]
    ContentTypeNotFound { alias: String },

    /// No stored snapshot exists for the name
    #[error("Snapshot not found: {category}/{name}")]
    SnapshotNotFound { category: String, name: String },

    /// The content-model service refused an operation
    #[error("Content model error: {message}")]
    Model { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from dtsync-fs
    #[error(transparent)]
    Fs(#[from] dtsync_fs::Error),

    /// Snapshot error from dtsync-snapshot
    #[error(transparent)]
    Snapshot(#[from] dtsync_snapshot::Error),
}
