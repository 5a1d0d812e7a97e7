//! Data-type definition snapshot schema

use crate::fingerprint::{ExclusionPolicy, Snapshot};
use serde::{Deserialize, Serialize};

/// Canonical snapshot of a data-type definition and its pre-values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DataTypeSnapshot {
    pub name: String,
    /// Unique key of the definition
    pub key: String,
    /// Identifier of the editor backing the definition
    pub id: String,
    pub database_type: String,
    pub pre_values: Vec<PreValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// One configured value of a data-type definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PreValue {
    /// Storage id, assigned per install
    pub id: i32,
    pub alias: String,
    pub value: String,
}

impl Snapshot for DataTypeSnapshot {
    fn exclusion_policy() -> ExclusionPolicy {
        ExclusionPolicy::new(["PreValues.Id"])
    }

    fn embedded_hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    fn set_embedded_hash(&mut self, hash: Option<String>) {
        self.hash = hash;
    }
}
