mod common;

use chrono::{TimeZone, Utc};
use common::{CannedEndpoint, BASE_URI};
use std::sync::Arc;
use validation_daemon::sparql::{Authority, Binding, Term};
use validation_daemon::storage::{
    ExecutionStorage, SparqlStorage, ValidationErrorStorage, ValidationStorage,
};
use validation_types::{
    ErrorDraft, Execution, ExecutionId, ExecutionStatus, ResourceKind, ResourceUri, Validation,
    ValidationError, ValidationErrorId, ValidationId, ValidationStatus,
};

const GRAPH: &str = "http://mu.semte.ch/application";

fn storage(endpoint: &Arc<CannedEndpoint>) -> SparqlStorage {
    SparqlStorage::new(endpoint.clone(), GRAPH)
}

fn execution() -> Execution {
    let id = ExecutionId::generate();
    Execution::new(
        id,
        ResourceUri::for_resource(BASE_URI, ResourceKind::Execution, &id),
        Some("http://sets/mandaat".to_string()),
    )
}

#[tokio::test]
async fn test_execution_writes_use_caller_authority() {
    let endpoint = Arc::new(CannedEndpoint::new());
    let store = storage(&endpoint);
    let exec = execution();

    store.insert_execution(&exec).await.unwrap();
    store
        .set_execution_status(&exec.id, ExecutionStatus::Done)
        .await
        .unwrap();

    let updates = endpoint.updates();
    assert_eq!(updates.len(), 2);
    assert!(updates.iter().all(|(_, a)| *a == Authority::Caller));

    let insert = &updates[0].0;
    assert!(insert.contains(&format!("GRAPH <{}>", GRAPH)));
    assert!(insert.contains(&format!("<{}> a validation:Execution", exec.uri)));
    assert!(insert.contains("validation:validationSet <http://sets/mandaat>"));
    assert!(insert.contains("\"ongoing\""));

    let update = &updates[1].0;
    assert!(update.contains(&format!("mu:uuid \"{}\"", exec.id)));
    assert!(update.contains("validation:status \"done\""));
}

#[tokio::test]
async fn test_get_execution_parses_row() {
    let id = ExecutionId::generate();
    let uri = format!("{}/executions/{}", BASE_URI, id);
    let row = Binding::new()
        .with("uri", Term::uri(uri.clone()))
        .with("status", Term::literal("cancelled"))
        .with("created", Term::literal("2024-03-01T10:15:00.000Z"));
    let endpoint = Arc::new(CannedEndpoint::new().rows(&id.to_string(), vec![row]));

    let stored = storage(&endpoint)
        .get_execution(&id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stored.id, id);
    assert_eq!(stored.uri.as_str(), uri);
    assert_eq!(stored.status, ExecutionStatus::Cancelled);
    assert_eq!(
        stored.created,
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap()
    );
    assert!(stored.validation_set.is_none());
}

#[tokio::test]
async fn test_get_execution_rejects_unknown_status() {
    let id = ExecutionId::generate();
    let row = Binding::new()
        .with("uri", Term::uri("http://x/executions/1"))
        .with("status", Term::literal("paused"))
        .with("created", Term::literal("2024-03-01T10:15:00Z"));
    let endpoint = Arc::new(CannedEndpoint::new().rows(&id.to_string(), vec![row]));

    tokio_test::assert_err!(storage(&endpoint).get_execution(&id).await);
}

#[tokio::test]
async fn test_get_missing_execution() {
    let endpoint = Arc::new(CannedEndpoint::new());
    assert!(storage(&endpoint)
        .get_execution(&ExecutionId::generate())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_cancel_skips_update_when_nothing_ongoing() {
    let endpoint = Arc::new(
        CannedEndpoint::new().rows(
            "COUNT(DISTINCT ?s)",
            vec![Binding::new().with("count", Term::literal("0"))],
        ),
    );
    assert_eq!(
        storage(&endpoint).cancel_ongoing_executions().await.unwrap(),
        0
    );
    assert!(endpoint.updates().is_empty());
}

#[tokio::test]
async fn test_cancel_updates_ongoing() {
    let endpoint = Arc::new(
        CannedEndpoint::new().rows(
            "COUNT(DISTINCT ?s)",
            vec![Binding::new().with("count", Term::literal("3"))],
        ),
    );
    assert_eq!(
        storage(&endpoint).cancel_ongoing_executions().await.unwrap(),
        3
    );

    let updates = endpoint.updates();
    assert_eq!(updates.len(), 1);
    assert!(updates[0].0.contains("FILTER(?status = \"ongoing\")"));
    assert!(updates[0].0.contains("validation:status \"cancelled\""));
}

#[tokio::test]
async fn test_validation_writes_use_sudo() {
    let endpoint = Arc::new(CannedEndpoint::new());
    let store = storage(&endpoint);
    let exec = execution();
    let id = ValidationId::generate();
    let validation = Validation {
        id,
        uri: ResourceUri::for_resource(BASE_URI, ResourceKind::Validation, &id),
        name: "mandataris-start".to_string(),
        description: "Every \"mandataris\" has a start".to_string(),
        status: ValidationStatus::Ongoing,
        execution: exec.uri.clone(),
    };

    store.insert_validation(&validation).await.unwrap();
    store
        .set_validation_status(&id, ValidationStatus::ValidationFailed)
        .await
        .unwrap();

    let updates = endpoint.updates();
    assert!(updates.iter().all(|(_, a)| *a == Authority::Sudo));
    assert!(updates[0].0.contains(&format!(
        "<{}> validation:performsValidation <{}>",
        exec.uri, validation.uri
    )));
    assert!(updates[0].0.contains(r#""Every \"mandataris\" has a start""#));
    assert!(updates[1].0.contains("\"validation-failed\""));
}

#[tokio::test]
async fn test_error_batch_is_one_insert() {
    let endpoint = Arc::new(CannedEndpoint::new());
    let exec = execution();
    let validation = ResourceUri::new(format!("{}/validations/v1", BASE_URI));
    let errors: Vec<_> = (0..3)
        .map(|i| {
            let id = ValidationErrorId::generate();
            ValidationError::from_draft(
                id,
                ResourceUri::for_resource(BASE_URI, ResourceKind::Error, &id),
                ErrorDraft::new(exec.uri.clone(), validation.clone(), format!("error {}", i)),
            )
        })
        .collect();

    tokio_test::assert_ok!(storage(&endpoint).insert_validation_errors(&errors).await);

    let updates = endpoint.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1, Authority::Sudo);
    assert_eq!(updates[0].0.matches("a validation:Error").count(), 3);
    assert!(updates[0].0.contains("validation:message \"error 2\""));
}

#[tokio::test]
async fn test_incomplete_error_is_rejected() {
    let endpoint = Arc::new(CannedEndpoint::new());
    let id = ValidationErrorId::generate();
    let error = ValidationError::from_draft(
        id,
        ResourceUri::for_resource(BASE_URI, ResourceKind::Error, &id),
        ErrorDraft::default(),
    );

    tokio_test::assert_err!(storage(&endpoint).insert_validation_errors(&[error]).await);
    assert!(endpoint.updates().is_empty());
}

#[tokio::test]
async fn test_validation_set_iri_is_percent_encoded() {
    let endpoint = Arc::new(CannedEndpoint::new());
    let id = ExecutionId::generate();
    let exec = Execution::new(
        id,
        ResourceUri::for_resource(BASE_URI, ResourceKind::Execution, &id),
        Some("http://sets/a b>c".to_string()),
    );

    tokio_test::assert_ok!(storage(&endpoint).insert_execution(&exec).await);

    let updates = endpoint.updates();
    assert!(updates[0]
        .0
        .contains("validation:validationSet <http://sets/a%20b%3Ec>"));
}
