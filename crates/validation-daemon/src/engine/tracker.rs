//! Validation lifecycle tracking

use crate::rules::{RuleOutcome, ValidationRule};
use crate::storage::{Storage, StorageResult};
use std::sync::Arc;
use tracing::debug;
use validation_types::{
    Execution, ResourceKind, ResourceUri, Validation, ValidationError, ValidationId,
    ValidationStatus,
};

/// Creates and finalizes the Validation record of each rule run
#[derive(Clone)]
pub struct ValidationTracker {
    storage: Arc<dyn Storage>,
    base_uri: String,
}

impl ValidationTracker {
    pub fn new(storage: Arc<dyn Storage>, base_uri: impl Into<String>) -> Self {
        Self {
            storage,
            base_uri: base_uri.into(),
        }
    }

    /// Persist an ongoing validation of `rule` within `execution`
    pub async fn create_validation(
        &self,
        rule: &ValidationRule,
        execution: &Execution,
    ) -> StorageResult<Validation> {
        let id = ValidationId::generate();
        let validation = Validation {
            id,
            uri: ResourceUri::for_resource(&self.base_uri, ResourceKind::Validation, &id),
            name: rule.name.clone(),
            description: rule.description.clone(),
            status: ValidationStatus::Ongoing,
            execution: execution.uri.clone(),
        };

        self.storage.insert_validation(&validation).await?;
        debug!(validation = %validation.uri, rule = %rule.name, "Created validation");
        Ok(validation)
    }

    /// Write the terminal status of a validation
    ///
    /// A failed evaluation wins over any errors; otherwise the outcome is
    /// decided by whether errors were produced.
    pub async fn finish_validation(
        &self,
        validation: &Validation,
        errors: &[ValidationError],
        success: bool,
    ) -> StorageResult<ValidationStatus> {
        let status = ValidationStatus::from_outcome(errors.len(), success);
        self.write_status(validation, status).await
    }

    /// Finalize a validation from the verdict of its check
    ///
    /// A negative verdict is `validation-failed` even when no error record
    /// could be written for it.
    pub async fn finish_evaluated(
        &self,
        validation: &Validation,
        outcome: &RuleOutcome,
    ) -> StorageResult<ValidationStatus> {
        let status = if outcome.valid {
            ValidationStatus::from_outcome(outcome.errors.len(), true)
        } else {
            ValidationStatus::ValidationFailed
        };
        self.write_status(validation, status).await
    }

    async fn write_status(
        &self,
        validation: &Validation,
        status: ValidationStatus,
    ) -> StorageResult<ValidationStatus> {
        self.storage
            .set_validation_status(&validation.id, status)
            .await?;
        debug!(validation = %validation.uri, %status, "Finished validation");
        Ok(status)
    }
}
