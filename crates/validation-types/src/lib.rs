//! Validation Types - Core types for the validation service
//!
//! The validation service runs a catalog of data-quality checks against a
//! graph store and keeps an audit trail of every run.
//!
//! ## Key Concepts
//!
//! - **Execution**: One end-to-end run of a selected set of validation rules
//! - **Validation**: The record of one rule's evaluation within one execution
//! - **ValidationError**: One persisted violation produced by a validation
//!
//! ## Status Semantics
//!
//! An execution's status tells whether the *run* completed, not whether the
//! data is valid. Data validity lives at the validation level:
//! `validation-succeeded` (no violations), `validation-failed` (violations
//! found) or `failed` (the check itself errored).

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error_record;
pub mod execution;
pub mod ids;
pub mod validation;

pub use error_record::{ErrorDraft, ValidationError};
pub use execution::{Execution, ExecutionStatus};
pub use ids::{ExecutionId, ResourceKind, ResourceUri, ValidationErrorId, ValidationId};
pub use validation::{Validation, ValidationStatus};

use thiserror::Error;

/// A status string read from storage did not match any known status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} status: {value}")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}
