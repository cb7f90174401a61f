//! Validation engine
//!
//! Wires the execution manager, validation tracker, error recorder and
//! orchestrator over one storage backend and one rule catalog.

mod manager;
mod orchestrator;
mod recorder;
mod tracker;

pub use manager::{ExecutionManager, ExecutionSummary};
pub use orchestrator::{ExecutionOrchestrator, ExecutionReport, RuleReport};
pub use recorder::ErrorRecorder;
pub use tracker::ValidationTracker;

use crate::config::{EngineConfig, ResourceConfig};
use crate::rules::RuleCatalog;
use crate::sparql::QueryEndpoint;
use crate::storage::{Storage, StorageResult};
use std::sync::Arc;
use tokio::task::JoinHandle;
use validation_types::Execution;

/// Entry point for triggering and inspecting executions
#[derive(Clone)]
pub struct ValidationEngine {
    manager: ExecutionManager,
    orchestrator: ExecutionOrchestrator,
    catalog: Arc<RuleCatalog>,
}

impl ValidationEngine {
    pub fn new(
        storage: Arc<dyn Storage>,
        endpoint: Arc<dyn QueryEndpoint>,
        catalog: RuleCatalog,
        engine: &EngineConfig,
        resources: &ResourceConfig,
    ) -> Self {
        let base_uri = resources.base_uri.as_str();
        let manager = ExecutionManager::new(storage.clone(), base_uri);
        let tracker = ValidationTracker::new(storage.clone(), base_uri);
        let recorder = ErrorRecorder::new(storage, base_uri, engine.error_batch_size);
        let orchestrator = ExecutionOrchestrator::new(
            manager.clone(),
            tracker,
            recorder,
            endpoint,
            engine.max_concurrent_validations,
        );

        Self {
            manager,
            orchestrator,
            catalog: Arc::new(catalog),
        }
    }

    pub fn manager(&self) -> &ExecutionManager {
        &self.manager
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Create an execution and run it in the background
    ///
    /// Returns once the execution is persisted; the handle resolves when
    /// every selected rule has been evaluated and the execution finished.
    pub async fn start_execution(
        &self,
        validation_set: Option<String>,
    ) -> StorageResult<(Execution, JoinHandle<ExecutionReport>)> {
        let execution = self.manager.create_execution(validation_set).await?;
        let rules = self.catalog.select(execution.validation_set.as_deref());

        let orchestrator = self.orchestrator.clone();
        let scheduled = execution.clone();
        let handle = tokio::spawn(async move { orchestrator.perform(scheduled, rules).await });

        Ok((execution, handle))
    }

    /// Create an execution and wait for it to finish
    pub async fn run_execution(
        &self,
        validation_set: Option<String>,
    ) -> StorageResult<ExecutionReport> {
        let execution = self.manager.create_execution(validation_set).await?;
        let rules = self.catalog.select(execution.validation_set.as_deref());
        Ok(self.orchestrator.perform(execution, rules).await)
    }
}
