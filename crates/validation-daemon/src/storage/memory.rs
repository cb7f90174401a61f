//! In-memory storage implementation

use super::traits::*;
use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use validation_types::{
    Execution, ExecutionId, ExecutionStatus, ResourceUri, Validation, ValidationError,
    ValidationErrorId, ValidationId, ValidationStatus,
};

/// In-memory storage for development and testing
#[derive(Debug)]
pub struct InMemoryStorage {
    executions: Arc<RwLock<HashMap<ExecutionId, Execution>>>,
    validations: Arc<RwLock<HashMap<ValidationId, Validation>>>,
    errors: Arc<RwLock<HashMap<ValidationErrorId, ValidationError>>>,
    error_writes: Arc<AtomicUsize>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self {
            executions: Arc::new(RwLock::new(HashMap::new())),
            validations: Arc::new(RwLock::new(HashMap::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            error_writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of bulk error writes issued so far
    pub fn error_write_count(&self) -> usize {
        self.error_writes.load(Ordering::SeqCst)
    }

    /// All persisted error records
    pub async fn list_errors(&self) -> Vec<ValidationError> {
        let errors = self.errors.read().await;
        errors.values().cloned().collect()
    }

    /// Get a validation by ID
    pub async fn get_validation(&self, id: &ValidationId) -> Option<Validation> {
        let validations = self.validations.read().await;
        validations.get(id).cloned()
    }
}

#[async_trait]
impl ExecutionStorage for InMemoryStorage {
    async fn insert_execution(&self, execution: &Execution) -> StorageResult<()> {
        let mut executions = self.executions.write().await;
        executions.insert(execution.id, execution.clone());
        Ok(())
    }

    async fn get_execution(&self, id: &ExecutionId) -> StorageResult<Option<Execution>> {
        let executions = self.executions.read().await;
        Ok(executions.get(id).cloned())
    }

    async fn set_execution_status(
        &self,
        id: &ExecutionId,
        status: ExecutionStatus,
    ) -> StorageResult<()> {
        // Matches nothing when the execution does not exist, like the SPARQL update
        let mut executions = self.executions.write().await;
        if let Some(execution) = executions.get_mut(id) {
            execution.status = status;
        }
        Ok(())
    }

    async fn cancel_ongoing_executions(&self) -> StorageResult<usize> {
        let mut executions = self.executions.write().await;
        let mut cancelled = 0;
        for execution in executions.values_mut() {
            if execution.status == ExecutionStatus::Ongoing {
                execution.status = ExecutionStatus::Cancelled;
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }
}

#[async_trait]
impl ValidationStorage for InMemoryStorage {
    async fn insert_validation(&self, validation: &Validation) -> StorageResult<()> {
        let mut validations = self.validations.write().await;
        validations.insert(validation.id, validation.clone());
        Ok(())
    }

    async fn set_validation_status(
        &self,
        id: &ValidationId,
        status: ValidationStatus,
    ) -> StorageResult<()> {
        let mut validations = self.validations.write().await;
        if let Some(validation) = validations.get_mut(id) {
            validation.status = status;
        }
        Ok(())
    }

    async fn list_validations_for_execution(
        &self,
        execution: &ResourceUri,
    ) -> StorageResult<Vec<Validation>> {
        let validations = self.validations.read().await;
        Ok(validations
            .values()
            .filter(|v| &v.execution == execution)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ValidationErrorStorage for InMemoryStorage {
    async fn insert_validation_errors(&self, batch: &[ValidationError]) -> StorageResult<()> {
        self.error_writes.fetch_add(1, Ordering::SeqCst);

        let mut errors = self.errors.write().await;
        for error in batch {
            if !error.is_complete() {
                return Err(StorageError::InvalidData(format!(
                    "error record {} is missing required fields",
                    error.id
                )));
            }
            errors.insert(error.id, error.clone());
        }
        Ok(())
    }

    async fn count_errors_for_execution(&self, execution: &ResourceUri) -> StorageResult<usize> {
        let errors = self.errors.read().await;
        Ok(errors
            .values()
            .filter(|e| e.execution.as_ref() == Some(execution))
            .count())
    }
}

impl Storage for InMemoryStorage {}

#[cfg(test)]
mod tests {
    use super::*;

    fn execution(status: ExecutionStatus) -> Execution {
        let id = ExecutionId::generate();
        let mut execution = Execution::new(
            id,
            ResourceUri::new(format!("http://x/executions/{}", id)),
            None,
        );
        execution.status = status;
        execution
    }

    #[tokio::test]
    async fn test_execution_round_trip() {
        let storage = InMemoryStorage::new();
        let exec = execution(ExecutionStatus::Ongoing);
        storage.insert_execution(&exec).await.unwrap();

        storage
            .set_execution_status(&exec.id, ExecutionStatus::Done)
            .await
            .unwrap();

        let stored = storage.get_execution(&exec.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ExecutionStatus::Done);
        assert!(storage
            .get_execution(&ExecutionId::generate())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_cancel_only_touches_ongoing() {
        let storage = InMemoryStorage::new();
        let ongoing = execution(ExecutionStatus::Ongoing);
        let done = execution(ExecutionStatus::Done);
        let failed = execution(ExecutionStatus::Failed);
        for e in [&ongoing, &done, &failed] {
            storage.insert_execution(e).await.unwrap();
        }

        assert_eq!(storage.cancel_ongoing_executions().await.unwrap(), 1);

        let status = |e: Option<Execution>| e.map(|e| e.status);
        assert_eq!(
            status(storage.get_execution(&ongoing.id).await.unwrap()),
            Some(ExecutionStatus::Cancelled)
        );
        assert_eq!(
            status(storage.get_execution(&done.id).await.unwrap()),
            Some(ExecutionStatus::Done)
        );
        assert_eq!(
            status(storage.get_execution(&failed.id).await.unwrap()),
            Some(ExecutionStatus::Failed)
        );
    }

    #[tokio::test]
    async fn test_incomplete_error_rejected() {
        let storage = InMemoryStorage::new();
        let error = ValidationError {
            id: ValidationErrorId::generate(),
            uri: ResourceUri::new("http://x/errors/1"),
            message: Some("m".to_string()),
            execution: None,
            validation: Some(ResourceUri::new("http://x/validations/1")),
        };
        assert!(storage.insert_validation_errors(&[error]).await.is_err());
        assert_eq!(storage.error_write_count(), 1);
    }
}
