//! Execution management and startup recovery

use crate::storage::{Storage, StorageResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use validation_types::{
    Execution, ExecutionId, ExecutionStatus, ResourceKind, ResourceUri, ValidationStatus,
};

/// Owns the lifecycle of Execution records
#[derive(Clone)]
pub struct ExecutionManager {
    storage: Arc<dyn Storage>,
    base_uri: String,
}

impl ExecutionManager {
    pub fn new(storage: Arc<dyn Storage>, base_uri: impl Into<String>) -> Self {
        Self {
            storage,
            base_uri: base_uri.into(),
        }
    }

    /// Persist an ongoing execution; a blank validation set means every rule
    pub async fn create_execution(&self, validation_set: Option<String>) -> StorageResult<Execution> {
        let validation_set = validation_set.filter(|set| !set.trim().is_empty());
        let id = ExecutionId::generate();
        let uri = ResourceUri::for_resource(&self.base_uri, ResourceKind::Execution, &id);
        let execution = Execution::new(id, uri, validation_set);

        self.storage.insert_execution(&execution).await?;
        info!(
            execution = %execution.uri,
            validation_set = ?execution.validation_set,
            "Created execution"
        );
        Ok(execution)
    }

    pub async fn get_execution(&self, id: &ExecutionId) -> StorageResult<Option<Execution>> {
        self.storage.get_execution(id).await
    }

    /// Move an execution to its terminal status
    ///
    /// Overwrites whatever status is stored, so finishing twice keeps the
    /// last outcome.
    pub async fn finish_execution(
        &self,
        id: &ExecutionId,
        success: bool,
    ) -> StorageResult<ExecutionStatus> {
        let status = ExecutionStatus::finished(success);
        self.storage.set_execution_status(id, status).await?;
        info!(execution_id = %id, %status, "Finished execution");
        Ok(status)
    }

    /// Cancel executions left ongoing by a previous process
    ///
    /// Validations of cancelled executions keep whatever status they had.
    pub async fn recover_on_startup(&self) -> StorageResult<usize> {
        let cancelled = self.storage.cancel_ongoing_executions().await?;
        if cancelled > 0 {
            warn!(count = cancelled, "Cancelled executions left ongoing by a previous run");
        } else {
            info!("No interrupted executions to recover");
        }
        Ok(cancelled)
    }

    /// Counts of an execution's validations and recorded errors
    pub async fn summarize(&self, execution: &Execution) -> StorageResult<ExecutionSummary> {
        let validations = self
            .storage
            .list_validations_for_execution(&execution.uri)
            .await?;
        let errors = self
            .storage
            .count_errors_for_execution(&execution.uri)
            .await?;

        let mut summary = ExecutionSummary {
            execution_id: execution.id,
            status: execution.status,
            validations: validations.len(),
            ongoing: 0,
            succeeded: 0,
            failed_validation: 0,
            failed: 0,
            errors,
        };
        for validation in &validations {
            match validation.status {
                ValidationStatus::Ongoing => summary.ongoing += 1,
                ValidationStatus::ValidationSucceeded => summary.succeeded += 1,
                ValidationStatus::ValidationFailed => summary.failed_validation += 1,
                ValidationStatus::Failed => summary.failed += 1,
            }
        }
        Ok(summary)
    }
}

/// Derived view over one execution's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExecutionSummary {
    pub execution_id: ExecutionId,
    pub status: ExecutionStatus,
    pub validations: usize,
    pub ongoing: usize,
    pub succeeded: usize,
    /// Validations that found violations
    pub failed_validation: usize,
    /// Validations whose evaluation errored
    pub failed: usize,
    pub errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    const BASE: &str = "http://mu.semte.ch/services/validation-service";

    #[tokio::test]
    async fn test_create_and_finish() {
        let storage = Arc::new(InMemoryStorage::new());
        let manager = ExecutionManager::new(storage, BASE);

        let execution = manager
            .create_execution(Some("set-X".to_string()))
            .await
            .unwrap();
        assert_eq!(execution.status, ExecutionStatus::Ongoing);
        assert_eq!(execution.validation_set.as_deref(), Some("set-X"));
        assert_eq!(
            execution.uri.as_str(),
            format!("{}/executions/{}", BASE, execution.id)
        );

        let status = manager.finish_execution(&execution.id, false).await.unwrap();
        assert_eq!(status, ExecutionStatus::Failed);

        let stored = manager.get_execution(&execution.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ExecutionStatus::Failed);
        assert_eq!(stored.created, execution.created);
    }

    #[tokio::test]
    async fn test_get_unknown_execution() {
        let manager = ExecutionManager::new(Arc::new(InMemoryStorage::new()), BASE);
        assert!(manager
            .get_execution(&ExecutionId::generate())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_recover_cancels_ongoing() {
        let storage = Arc::new(InMemoryStorage::new());
        let manager = ExecutionManager::new(storage, BASE);

        let stale = manager.create_execution(None).await.unwrap();
        let finished = manager.create_execution(None).await.unwrap();
        manager.finish_execution(&finished.id, true).await.unwrap();

        assert_eq!(manager.recover_on_startup().await.unwrap(), 1);

        let status = |e: Option<Execution>| e.map(|e| e.status);
        assert_eq!(
            status(manager.get_execution(&stale.id).await.unwrap()),
            Some(ExecutionStatus::Cancelled)
        );
        assert_eq!(
            status(manager.get_execution(&finished.id).await.unwrap()),
            Some(ExecutionStatus::Done)
        );
        assert_eq!(manager.recover_on_startup().await.unwrap(), 0);
    }
}
