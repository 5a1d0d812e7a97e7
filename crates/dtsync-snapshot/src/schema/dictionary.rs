//! Dictionary item snapshot schema

use crate::fingerprint::{ExclusionPolicy, Snapshot};
use serde::{Deserialize, Serialize};

/// Canonical snapshot of a dictionary item and its translations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DictionarySnapshot {
    pub key: String,
    pub values: Vec<DictionaryValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// A translation of a dictionary item for one language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DictionaryValue {
    pub id: i32,
    pub language_id: i32,
    pub language_culture_alias: String,
    pub value: String,
}

impl Snapshot for DictionarySnapshot {
    fn exclusion_policy() -> ExclusionPolicy {
        ExclusionPolicy::new(["Values.Id"])
    }

    fn embedded_hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    fn set_embedded_hash(&mut self, hash: Option<String>) {
        self.hash = hash;
    }
}
