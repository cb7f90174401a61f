//! Validation types
//!
//! A Validation records one rule's evaluation within one execution. It is
//! created `ongoing` and finalized exactly once.

use crate::{ResourceUri, UnknownStatus, ValidationId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One rule's evaluation within one execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    /// Unique validation identifier
    pub id: ValidationId,

    /// Resource URI of the validation
    pub uri: ResourceUri,

    /// Rule name, copied from the rule definition
    pub name: String,

    /// Rule description, copied from the rule definition
    pub description: String,

    /// Current status
    pub status: ValidationStatus,

    /// Execution performing this validation
    pub execution: ResourceUri,
}

/// Status of a validation
///
/// Reflects whether the check ran, and if so whether it found violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationStatus {
    /// The check is running
    Ongoing,

    /// The check ran and found no violations
    ValidationSucceeded,

    /// The check ran and found violations
    ValidationFailed,

    /// The check errored before producing a verdict
    Failed,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Ongoing => "ongoing",
            ValidationStatus::ValidationSucceeded => "validation-succeeded",
            ValidationStatus::ValidationFailed => "validation-failed",
            ValidationStatus::Failed => "failed",
        }
    }

    /// Terminal status from the outcome of a check
    ///
    /// `success == false` wins over any error count.
    pub fn from_outcome(error_count: usize, success: bool) -> Self {
        if !success {
            ValidationStatus::Failed
        } else if error_count > 0 {
            ValidationStatus::ValidationFailed
        } else {
            ValidationStatus::ValidationSucceeded
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ongoing" => Ok(ValidationStatus::Ongoing),
            "validation-succeeded" => Ok(ValidationStatus::ValidationSucceeded),
            "validation-failed" => Ok(ValidationStatus::ValidationFailed),
            "failed" => Ok(ValidationStatus::Failed),
            other => Err(UnknownStatus {
                kind: "validation",
                value: other.to_string(),
            }),
        }
    }
}
