#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use validation_daemon::config::{EngineConfig, ResourceConfig};
use validation_daemon::error::{SparqlError, StorageError};
use validation_daemon::rules::RuleCatalog;
use validation_daemon::sparql::{Authority, Binding, QueryEndpoint, SparqlResult, Term};
use validation_daemon::storage::{
    ExecutionStorage, InMemoryStorage, Storage, StorageResult, ValidationErrorStorage,
    ValidationStorage,
};
use validation_daemon::ValidationEngine;
use validation_types::{
    Execution, ExecutionId, ExecutionStatus, ResourceUri, Validation, ValidationError,
    ValidationId, ValidationStatus,
};

pub const BASE_URI: &str = "http://mu.semte.ch/services/validation-service";

#[derive(Debug, Clone)]
enum Canned {
    Rows(Vec<Binding>),
    Answer(bool),
    Failure,
}

/// Query endpoint answering from canned responses keyed by a query fragment
///
/// Unmatched SELECTs return no rows and unmatched ASKs answer true.
#[derive(Debug, Default)]
pub struct CannedEndpoint {
    responses: Vec<(String, Canned)>,
    queries: Mutex<Vec<(String, Authority)>>,
    updates: Mutex<Vec<(String, Authority)>>,
}

impl CannedEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(mut self, fragment: &str, rows: Vec<Binding>) -> Self {
        self.responses.push((fragment.to_string(), Canned::Rows(rows)));
        self
    }

    pub fn answer(mut self, fragment: &str, answer: bool) -> Self {
        self.responses
            .push((fragment.to_string(), Canned::Answer(answer)));
        self
    }

    pub fn failure(mut self, fragment: &str) -> Self {
        self.responses.push((fragment.to_string(), Canned::Failure));
        self
    }

    pub fn queries(&self) -> Vec<(String, Authority)> {
        self.queries.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<(String, Authority)> {
        self.updates.lock().unwrap().clone()
    }

    fn lookup(&self, query: &str, authority: Authority) -> Option<Canned> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), authority));
        self.responses
            .iter()
            .find(|(fragment, _)| query.contains(fragment.as_str()))
            .map(|(_, canned)| canned.clone())
    }
}

fn canned_failure() -> SparqlError {
    SparqlError::Status {
        status: 500,
        body: "Virtuoso 37000 Error SP030: SPARQL compiler".to_string(),
    }
}

#[async_trait]
impl QueryEndpoint for CannedEndpoint {
    async fn select(&self, query: &str, authority: Authority) -> SparqlResult<Vec<Binding>> {
        match self.lookup(query, authority) {
            Some(Canned::Rows(rows)) => Ok(rows),
            Some(Canned::Failure) => Err(canned_failure()),
            Some(Canned::Answer(_)) => Err(SparqlError::Decode("expected bindings".to_string())),
            None => Ok(Vec::new()),
        }
    }

    async fn ask(&self, query: &str, authority: Authority) -> SparqlResult<bool> {
        match self.lookup(query, authority) {
            Some(Canned::Answer(answer)) => Ok(answer),
            Some(Canned::Failure) => Err(canned_failure()),
            Some(Canned::Rows(_)) => Err(SparqlError::Decode("expected boolean".to_string())),
            None => Ok(true),
        }
    }

    async fn update(&self, statement: &str, authority: Authority) -> SparqlResult<()> {
        self.updates
            .lock()
            .unwrap()
            .push((statement.to_string(), authority));
        Ok(())
    }
}

/// `n` result rows binding `?s` to distinct subjects
pub fn subjects(n: usize) -> Vec<Binding> {
    (0..n)
        .map(|i| Binding::new().with("s", Term::uri(format!("http://data.example.org/s/{}", i))))
        .collect()
}

/// In-memory storage whose execution status writes can be made to fail
#[derive(Debug, Default)]
pub struct FlakyStorage {
    pub inner: InMemoryStorage,
    pub fail_execution_status: AtomicBool,
    pub fail_validation_status: AtomicBool,
    /// Fails only the next validation status write
    pub fail_next_validation_status: AtomicBool,
    pub execution_status_writes: AtomicUsize,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionStorage for FlakyStorage {
    async fn insert_execution(&self, execution: &Execution) -> StorageResult<()> {
        self.inner.insert_execution(execution).await
    }

    async fn get_execution(&self, id: &ExecutionId) -> StorageResult<Option<Execution>> {
        self.inner.get_execution(id).await
    }

    async fn set_execution_status(
        &self,
        id: &ExecutionId,
        status: ExecutionStatus,
    ) -> StorageResult<()> {
        self.execution_status_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_execution_status.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("store unavailable".to_string()));
        }
        self.inner.set_execution_status(id, status).await
    }

    async fn cancel_ongoing_executions(&self) -> StorageResult<usize> {
        self.inner.cancel_ongoing_executions().await
    }
}

#[async_trait]
impl ValidationStorage for FlakyStorage {
    async fn insert_validation(&self, validation: &Validation) -> StorageResult<()> {
        self.inner.insert_validation(validation).await
    }

    async fn set_validation_status(
        &self,
        id: &ValidationId,
        status: ValidationStatus,
    ) -> StorageResult<()> {
        if self.fail_validation_status.load(Ordering::SeqCst)
            || self.fail_next_validation_status.swap(false, Ordering::SeqCst)
        {
            return Err(StorageError::Connection("store unavailable".to_string()));
        }
        self.inner.set_validation_status(id, status).await
    }

    async fn list_validations_for_execution(
        &self,
        execution: &ResourceUri,
    ) -> StorageResult<Vec<Validation>> {
        self.inner.list_validations_for_execution(execution).await
    }
}

#[async_trait]
impl ValidationErrorStorage for FlakyStorage {
    async fn insert_validation_errors(&self, errors: &[ValidationError]) -> StorageResult<()> {
        self.inner.insert_validation_errors(errors).await
    }

    async fn count_errors_for_execution(&self, execution: &ResourceUri) -> StorageResult<usize> {
        self.inner.count_errors_for_execution(execution).await
    }
}

impl Storage for FlakyStorage {}

pub fn engine_config() -> EngineConfig {
    EngineConfig::default()
}

pub fn resources() -> ResourceConfig {
    ResourceConfig {
        base_uri: BASE_URI.to_string(),
    }
}

pub fn engine(
    storage: Arc<dyn Storage>,
    endpoint: Arc<CannedEndpoint>,
    catalog: RuleCatalog,
) -> ValidationEngine {
    ValidationEngine::new(storage, endpoint, catalog, &engine_config(), &resources())
}
