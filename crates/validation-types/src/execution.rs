//! Execution types
//!
//! An Execution is one run of a selected set of validation rules.

use crate::{ExecutionId, ResourceUri, UnknownStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One end-to-end run of a validation rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Unique execution identifier
    pub id: ExecutionId,

    /// Resource URI of the execution
    pub uri: ResourceUri,

    /// Current status
    pub status: ExecutionStatus,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Validation set that was requested, if any
    pub validation_set: Option<String>,
}

impl Execution {
    /// Create a new ongoing execution
    pub fn new(id: ExecutionId, uri: ResourceUri, validation_set: Option<String>) -> Self {
        Self {
            id,
            uri,
            status: ExecutionStatus::Ongoing,
            created: Utc::now(),
            validation_set,
        }
    }
}

/// Status of an execution
///
/// The terminal status reflects whether the orchestration completed, not
/// whether the individual validations found violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionStatus {
    /// Validations are running
    Ongoing,

    /// All validations were dispatched and finalized
    Done,

    /// The orchestration itself failed
    Failed,

    /// The process stopped while the execution was ongoing
    Cancelled,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Ongoing => "ongoing",
            ExecutionStatus::Done => "done",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal status for a finished orchestration
    pub fn finished(success: bool) -> Self {
        if success {
            ExecutionStatus::Done
        } else {
            ExecutionStatus::Failed
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ongoing" => Ok(ExecutionStatus::Ongoing),
            "done" => Ok(ExecutionStatus::Done),
            "failed" => Ok(ExecutionStatus::Failed),
            "cancelled" => Ok(ExecutionStatus::Cancelled),
            other => Err(UnknownStatus {
                kind: "execution",
                value: other.to_string(),
            }),
        }
    }
}
