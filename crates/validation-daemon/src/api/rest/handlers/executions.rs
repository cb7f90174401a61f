//! Execution handlers

use crate::api::rest::state::AppState;
use crate::engine::ExecutionSummary;
use crate::error::{ApiError, ApiResult};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use validation_types::{Execution, ExecutionId, ExecutionStatus};

const JSON_API: &str = "application/vnd.api+json";

/// Create execution request; the body may be empty
#[derive(Debug, Default, Deserialize)]
pub struct CreateExecutionRequest {
    #[serde(rename = "validation-set", default)]
    pub validation_set: Option<String>,
}

/// JSON:API document holding one execution
#[derive(Debug, Serialize)]
pub struct ExecutionDocument {
    pub data: ExecutionResource,
}

#[derive(Debug, Serialize)]
pub struct ExecutionResource {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
    pub attributes: ExecutionAttributes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExecutionAttributes {
    pub uri: String,
    pub status: ExecutionStatus,
    pub created: DateTime<Utc>,
    pub validation_set: Option<String>,
}

impl From<&Execution> for ExecutionDocument {
    fn from(execution: &Execution) -> Self {
        Self {
            data: ExecutionResource {
                kind: "executions",
                id: execution.id.to_string(),
                attributes: ExecutionAttributes {
                    uri: execution.uri.to_string(),
                    status: execution.status,
                    created: execution.created,
                    validation_set: execution.validation_set.clone(),
                },
            },
        }
    }
}

fn json_api(status: StatusCode, execution: &Execution) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, JSON_API)],
        Json(ExecutionDocument::from(execution)),
    )
        .into_response()
}

/// A blank set selects every rule; anything else must be an absolute IRI
fn validation_set_iri(set: Option<String>) -> ApiResult<Option<String>> {
    let Some(set) = set.filter(|set| !set.trim().is_empty()) else {
        return Ok(None);
    };

    let forbidden = |c: char| c.is_whitespace() || c.is_control() || "<>\"{}|^`\\".contains(c);
    if set.contains(forbidden) || reqwest::Url::parse(&set).is_err() {
        return Err(ApiError::BadRequest(format!(
            "validation-set must be an absolute IRI: {}",
            set
        )));
    }
    Ok(Some(set))
}

/// Trigger an execution and run it in the background
pub async fn create_execution(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let request: CreateExecutionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateExecutionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?
    };

    let validation_set = validation_set_iri(request.validation_set)?;

    let (execution, _handle) = state
        .engine
        .start_execution(validation_set)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create execution");
            ApiError::Storage(e)
        })?;

    info!(execution_id = %execution.id, "Execution accepted");

    let mut response = json_api(StatusCode::ACCEPTED, &execution);
    let location = format!("/executions/{}", execution.id);
    let location = header::HeaderValue::from_str(&location)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    response.headers_mut().insert(header::LOCATION, location);
    Ok(response)
}

/// Get a specific execution
pub async fn get_execution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let execution = find_execution(&state, &id).await?;
    Ok(json_api(StatusCode::OK, &execution))
}

/// Get validation and error counts for an execution
pub async fn get_execution_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ExecutionSummary>> {
    let execution = find_execution(&state, &id).await?;
    let summary = state.engine.manager().summarize(&execution).await?;
    Ok(Json(summary))
}

async fn find_execution(state: &AppState, id: &str) -> ApiResult<Execution> {
    // A malformed id cannot name an execution
    let not_found = || ApiError::NotFound(format!("Execution {} not found", id));
    let execution_id: ExecutionId = id.parse().map_err(|_| not_found())?;

    state
        .engine
        .manager()
        .get_execution(&execution_id)
        .await?
        .ok_or_else(not_found)
}
