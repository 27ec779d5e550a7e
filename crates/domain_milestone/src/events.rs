//! Record change events that trigger notifications

use serde::{Deserialize, Serialize};

use core_kernel::OperationMetadata;

/// What happened to the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Saved,
    Deleted,
}

/// A change to a tracked record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub metadata: OperationMetadata,
}

impl ChangeEvent {
    /// The record was saved by `user`
    pub fn saved(user: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Saved,
            metadata: OperationMetadata::initiated_by(user),
        }
    }

    /// The record was deleted by `user`
    pub fn deleted(user: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            metadata: OperationMetadata::initiated_by(user),
        }
    }

    /// User or process that made the change
    pub fn user(&self) -> &str {
        self.metadata.initiated_by.as_deref().unwrap_or("system")
    }
}
