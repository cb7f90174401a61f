//! Storage trait definitions

use crate::error::StorageError;
use async_trait::async_trait;
use validation_types::{
    Execution, ExecutionId, ExecutionStatus, ResourceUri, Validation, ValidationError,
    ValidationId, ValidationStatus,
};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Combined storage trait
#[async_trait]
pub trait Storage:
    ExecutionStorage + ValidationStorage + ValidationErrorStorage + Send + Sync
{
}

/// Storage for executions
#[async_trait]
pub trait ExecutionStorage: Send + Sync {
    /// Persist a new execution
    async fn insert_execution(&self, execution: &Execution) -> StorageResult<()>;

    /// Get an execution by ID
    async fn get_execution(&self, id: &ExecutionId) -> StorageResult<Option<Execution>>;

    /// Replace the status of an execution, whatever it currently is
    async fn set_execution_status(
        &self,
        id: &ExecutionId,
        status: ExecutionStatus,
    ) -> StorageResult<()>;

    /// Move every ongoing execution to cancelled, returning how many moved
    async fn cancel_ongoing_executions(&self) -> StorageResult<usize>;
}

/// Storage for validations
#[async_trait]
pub trait ValidationStorage: Send + Sync {
    /// Persist a new validation and link it to its execution
    async fn insert_validation(&self, validation: &Validation) -> StorageResult<()>;

    /// Replace the status of a validation
    async fn set_validation_status(
        &self,
        id: &ValidationId,
        status: ValidationStatus,
    ) -> StorageResult<()>;

    /// List validations performed by an execution
    async fn list_validations_for_execution(
        &self,
        execution: &ResourceUri,
    ) -> StorageResult<Vec<Validation>>;
}

/// Storage for validation error records
#[async_trait]
pub trait ValidationErrorStorage: Send + Sync {
    /// Persist a batch of complete error records in a single write
    async fn insert_validation_errors(&self, errors: &[ValidationError]) -> StorageResult<()>;

    /// Count error records produced by an execution
    async fn count_errors_for_execution(&self, execution: &ResourceUri) -> StorageResult<usize>;
}
