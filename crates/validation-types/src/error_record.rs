//! Validation error records
//!
//! A ValidationError is one violation found by a validation. Records are
//! immutable once written.

use crate::{ResourceUri, ValidationErrorId};
use serde::{Deserialize, Serialize};

/// Input for the error recorder before an identifier is assigned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDraft {
    /// Execution that produced the error
    pub execution: Option<ResourceUri>,

    /// Validation that detected the error
    pub validation: Option<ResourceUri>,

    /// Rendered error message
    pub message: Option<String>,
}

impl ErrorDraft {
    pub fn new(
        execution: ResourceUri,
        validation: ResourceUri,
        message: impl Into<String>,
    ) -> Self {
        Self {
            execution: Some(execution),
            validation: Some(validation),
            message: Some(message.into()),
        }
    }

    /// An empty message counts as missing.
    pub fn is_complete(&self) -> bool {
        self.execution.is_some()
            && self.validation.is_some()
            && self.message.as_deref().is_some_and(|m| !m.is_empty())
    }
}

/// A violation record attributed to an execution and a validation
///
/// Records returned by a bulk insert mirror their draft: fields that were
/// missing stay `None`, and such records were not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Unique error identifier
    pub id: ValidationErrorId,

    /// Resource URI of the error
    pub uri: ResourceUri,

    /// Rendered error message
    pub message: Option<String>,

    /// Execution that produced the error
    pub execution: Option<ResourceUri>,

    /// Validation that detected the error
    pub validation: Option<ResourceUri>,
}

impl ValidationError {
    /// Attach an identifier to a draft
    pub fn from_draft(id: ValidationErrorId, uri: ResourceUri, draft: ErrorDraft) -> Self {
        Self {
            id,
            uri,
            message: draft.message,
            execution: draft.execution,
            validation: draft.validation,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.execution.is_some()
            && self.validation.is_some()
            && self.message.as_deref().is_some_and(|m| !m.is_empty())
    }
}
