//! Error types for dtsync-snapshot

/// Result type for snapshot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serializing, parsing or hashing snapshots
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to parse snapshot: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid fingerprint: {value}")]
    InvalidFingerprint { value: String },
}
