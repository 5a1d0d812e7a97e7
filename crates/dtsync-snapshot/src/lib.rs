//! Typed snapshots and content fingerprints for document-type synchronisation
//!
//! A snapshot is the canonical on-disk form of a content definition. This
//! crate owns the snapshot schemas, the canonical serializer that turns a
//! snapshot into stable bytes, and the fingerprint engine that hashes those
//! bytes while ignoring install-specific identifiers.

pub mod canonical;
pub mod error;
pub mod fingerprint;
pub mod schema;

pub use canonical::{from_slice, to_canonical_bytes, to_tree};
pub use error::{Error, Result};
pub use fingerprint::{
    ExclusionPolicy, Fingerprint, Snapshot, hash, hash_excluding, hash_str, recompute,
    stored_hash,
};
pub use schema::{
    DataTypeSnapshot, DictionarySnapshot, DictionaryValue, DocTypeInfo, DocTypeSnapshot,
    GenericProperty, PreValue, Structure, TabSnapshot,
};
