//! Change records returned by reconciliation calls
//!
//! A record is built fresh for every export or import and never written
//! anywhere by this crate. Aggregating them into reports is up to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of item a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
    DocumentType,
    DataType,
    Dictionary,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemType::DocumentType => "document-type",
            ItemType::DataType => "data-type",
            ItemType::Dictionary => "dictionary",
        };
        write!(f, "{name}")
    }
}

/// How a reconciliation call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeOutcome {
    /// The model now matches the snapshot
    Success,
    /// The save went through but the model still differs from the snapshot
    Mismatch,
    /// The call did not complete
    Failure,
}

/// Outcome of one export or import call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    item_type: ItemType,
    outcome: ChangeOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i32>,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ChangeRecord {
    fn new(item_type: ItemType, outcome: ChangeOutcome, name: impl Into<String>) -> Self {
        Self {
            item_type,
            outcome,
            id: None,
            name: name.into(),
            message: None,
        }
    }

    pub fn success(item_type: ItemType, name: impl Into<String>) -> Self {
        Self::new(item_type, ChangeOutcome::Success, name)
    }

    /// A record for a save whose result still disagrees with the snapshot.
    pub fn mismatch(item_type: ItemType, name: impl Into<String>) -> Self {
        Self::new(item_type, ChangeOutcome::Mismatch, name)
            .with_message("post-import check differs from snapshot")
    }

    pub fn failure(
        item_type: ItemType,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(item_type, ChangeOutcome::Failure, name).with_message(message)
    }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn outcome(&self) -> ChangeOutcome {
        self.outcome
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.outcome == ChangeOutcome::Success
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {:?}", self.item_type, self.name, self.outcome)?;
        if let Some(message) = &self.message {
            write!(f, " ({message})")?;
        }
        Ok(())
    }
}
