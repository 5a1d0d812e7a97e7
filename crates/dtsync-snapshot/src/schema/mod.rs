//! Snapshot schemas
//!
//! One typed record per snapshot shape. Sections a snapshot may omit are
//! `Option`s, so "section missing" is a single explicit case for callers
//! instead of a lookup that can fail anywhere in a tree walk.

mod data_type;
mod dictionary;
mod doctype;

pub use data_type::{DataTypeSnapshot, PreValue};
pub use dictionary::{DictionarySnapshot, DictionaryValue};
pub use doctype::{DocTypeInfo, DocTypeSnapshot, GenericProperty, Structure, TabSnapshot};
