//! Triple-store storage implementation
//!
//! Entities are persisted as typed resources in one application graph.
//! Execution writes run under the caller's authority; validation and error
//! bookkeeping runs with sudo so it is never blocked by caller ACLs.

use super::traits::*;
use crate::error::StorageError;
use crate::sparql::escape::{escape_datetime, escape_string, escape_uri};
use crate::sparql::{Authority, Binding, QueryEndpoint};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;
use validation_types::{
    Execution, ExecutionId, ExecutionStatus, ResourceUri, Validation, ValidationError,
    ValidationId, ValidationStatus,
};

const PREFIXES: &str = "PREFIX validation: <http://mu.semte.ch/vocabularies/validation/>
PREFIX mu: <http://mu.semte.ch/vocabularies/core/>
PREFIX dct: <http://purl.org/dc/terms/>
";

/// Storage backed by a SPARQL endpoint
#[derive(Clone)]
pub struct SparqlStorage {
    endpoint: Arc<dyn QueryEndpoint>,
    graph: String,
}

impl SparqlStorage {
    /// Create a storage writing to `graph` through `endpoint`
    pub fn new(endpoint: Arc<dyn QueryEndpoint>, graph: impl Into<String>) -> Self {
        Self {
            endpoint,
            graph: graph.into(),
        }
    }

    fn graph(&self) -> String {
        escape_uri(&self.graph)
    }

    async fn count(&self, query: &str, authority: Authority) -> StorageResult<usize> {
        let rows = self.endpoint.select(query, authority).await?;
        let Some(row) = rows.first() else {
            return Ok(0);
        };
        let raw = required(row, "count")?;
        raw.parse::<usize>()
            .map_err(|e| StorageError::InvalidData(format!("count '{}': {}", raw, e)))
    }
}

fn required<'a>(row: &'a Binding, variable: &str) -> StorageResult<&'a str> {
    row.value(variable)
        .ok_or_else(|| StorageError::InvalidData(format!("missing ?{} in result row", variable)))
}

#[async_trait]
impl ExecutionStorage for SparqlStorage {
    async fn insert_execution(&self, execution: &Execution) -> StorageResult<()> {
        let validation_set = execution
            .validation_set
            .as_deref()
            .map(|set| format!("validation:validationSet {} ;", escape_uri(set)))
            .unwrap_or_default();

        let statement = format!(
            "{PREFIXES}
INSERT DATA {{
  GRAPH {graph} {{
    {uri} a validation:Execution ;
      mu:uuid {uuid} ;
      validation:status {status} ;
      {validation_set}
      dct:created {created} .
  }}
}}",
            graph = self.graph(),
            uri = escape_uri(execution.uri.as_str()),
            uuid = escape_string(&execution.id.to_string()),
            status = escape_string(execution.status.as_str()),
            created = escape_datetime(&execution.created),
        );

        self.endpoint.update(&statement, Authority::Caller).await?;
        Ok(())
    }

    async fn get_execution(&self, id: &ExecutionId) -> StorageResult<Option<Execution>> {
        let query = format!(
            "{PREFIXES}
SELECT ?uri ?status ?created ?validationSet
WHERE {{
  GRAPH {graph} {{
    ?uri a validation:Execution ;
      mu:uuid {uuid} ;
      validation:status ?status ;
      dct:created ?created .
    OPTIONAL {{ ?uri validation:validationSet ?validationSet . }}
  }}
}} LIMIT 1",
            graph = self.graph(),
            uuid = escape_string(&id.to_string()),
        );

        let rows = self.endpoint.select(&query, Authority::Caller).await?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };

        let status = required(row, "status")?
            .parse::<ExecutionStatus>()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?;
        let created = required(row, "created")?;
        let created = DateTime::parse_from_rfc3339(created)
            .map_err(|e| StorageError::InvalidData(format!("created '{}': {}", created, e)))?
            .with_timezone(&Utc);

        Ok(Some(Execution {
            id: *id,
            uri: ResourceUri::new(required(row, "uri")?),
            status,
            created,
            validation_set: row.value("validationSet").map(str::to_string),
        }))
    }

    async fn set_execution_status(
        &self,
        id: &ExecutionId,
        status: ExecutionStatus,
    ) -> StorageResult<()> {
        let statement = format!(
            "{PREFIXES}
WITH {graph}
DELETE {{
  ?s validation:status ?status .
}}
INSERT {{
  ?s validation:status {new_status} .
}}
WHERE {{
  ?s a validation:Execution ;
    mu:uuid {uuid} ;
    validation:status ?status .
}}",
            graph = self.graph(),
            new_status = escape_string(status.as_str()),
            uuid = escape_string(&id.to_string()),
        );

        self.endpoint.update(&statement, Authority::Caller).await?;
        Ok(())
    }

    async fn cancel_ongoing_executions(&self) -> StorageResult<usize> {
        let ongoing = escape_string(ExecutionStatus::Ongoing.as_str());
        let count_query = format!(
            "{PREFIXES}
SELECT (COUNT(DISTINCT ?s) AS ?count)
WHERE {{
  GRAPH {graph} {{
    ?s a validation:Execution ;
      validation:status {ongoing} .
  }}
}}",
            graph = self.graph(),
        );
        let count = self.count(&count_query, Authority::Caller).await?;
        if count == 0 {
            return Ok(0);
        }

        let statement = format!(
            "{PREFIXES}
WITH {graph}
DELETE {{
  ?s validation:status ?status .
}}
INSERT {{
  ?s validation:status {cancelled} .
}}
WHERE {{
  ?s a validation:Execution ;
    validation:status ?status .
  FILTER(?status = {ongoing})
}}",
            graph = self.graph(),
            cancelled = escape_string(ExecutionStatus::Cancelled.as_str()),
        );

        self.endpoint.update(&statement, Authority::Caller).await?;
        Ok(count)
    }
}

#[async_trait]
impl ValidationStorage for SparqlStorage {
    async fn insert_validation(&self, validation: &Validation) -> StorageResult<()> {
        let statement = format!(
            "{PREFIXES}
INSERT DATA {{
  GRAPH {graph} {{
    {uri} a validation:Validation ;
      mu:uuid {uuid} ;
      validation:name {name} ;
      validation:description {description} ;
      validation:status {status} .
    {execution} validation:performsValidation {uri} .
  }}
}}",
            graph = self.graph(),
            uri = escape_uri(validation.uri.as_str()),
            uuid = escape_string(&validation.id.to_string()),
            name = escape_string(&validation.name),
            description = escape_string(&validation.description),
            status = escape_string(validation.status.as_str()),
            execution = escape_uri(validation.execution.as_str()),
        );

        self.endpoint.update(&statement, Authority::Sudo).await?;
        Ok(())
    }

    async fn set_validation_status(
        &self,
        id: &ValidationId,
        status: ValidationStatus,
    ) -> StorageResult<()> {
        let statement = format!(
            "{PREFIXES}
DELETE {{
  GRAPH {graph} {{ ?s validation:status ?status . }}
}}
INSERT {{
  GRAPH {graph} {{ ?s validation:status {new_status} . }}
}}
WHERE {{
  GRAPH {graph} {{
    ?s a validation:Validation ;
      mu:uuid {uuid} ;
      validation:status ?status .
  }}
}}",
            graph = self.graph(),
            new_status = escape_string(status.as_str()),
            uuid = escape_string(&id.to_string()),
        );

        self.endpoint.update(&statement, Authority::Sudo).await?;
        Ok(())
    }

    async fn list_validations_for_execution(
        &self,
        execution: &ResourceUri,
    ) -> StorageResult<Vec<Validation>> {
        let query = format!(
            "{PREFIXES}
SELECT ?uri ?uuid ?name ?description ?status
WHERE {{
  GRAPH {graph} {{
    {execution} validation:performsValidation ?uri .
    ?uri a validation:Validation ;
      mu:uuid ?uuid ;
      validation:name ?name ;
      validation:description ?description ;
      validation:status ?status .
  }}
}}",
            graph = self.graph(),
            execution = escape_uri(execution.as_str()),
        );

        let rows = self.endpoint.select(&query, Authority::Sudo).await?;
        rows.iter()
            .map(|row| {
                let uuid = required(row, "uuid")?;
                let id = uuid
                    .parse::<ValidationId>()
                    .map_err(|e| StorageError::InvalidData(format!("uuid '{}': {}", uuid, e)))?;
                let status = required(row, "status")?
                    .parse::<ValidationStatus>()
                    .map_err(|e| StorageError::InvalidData(e.to_string()))?;

                Ok(Validation {
                    id,
                    uri: ResourceUri::new(required(row, "uri")?),
                    name: required(row, "name")?.to_string(),
                    description: required(row, "description")?.to_string(),
                    status,
                    execution: execution.clone(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl ValidationErrorStorage for SparqlStorage {
    async fn insert_validation_errors(&self, errors: &[ValidationError]) -> StorageResult<()> {
        let mut data = String::new();
        for error in errors {
            let (Some(execution), Some(validation), Some(message)) =
                (&error.execution, &error.validation, &error.message)
            else {
                return Err(StorageError::InvalidData(format!(
                    "error record {} is missing required fields",
                    error.id
                )));
            };

            data.push_str(&format!(
                "    {uri} a validation:Error ; mu:uuid {uuid} ; validation:producedBy {execution} ; validation:validation {validation} ; validation:message {message} .\n",
                uri = escape_uri(error.uri.as_str()),
                uuid = escape_string(&error.id.to_string()),
                execution = escape_uri(execution.as_str()),
                validation = escape_uri(validation.as_str()),
                message = escape_string(message),
            ));
        }

        let statement = format!(
            "{PREFIXES}
INSERT DATA {{
  GRAPH {graph} {{
{data}  }}
}}",
            graph = self.graph(),
        );

        debug!(count = errors.len(), "Writing validation error batch");
        self.endpoint.update(&statement, Authority::Sudo).await?;
        Ok(())
    }

    async fn count_errors_for_execution(&self, execution: &ResourceUri) -> StorageResult<usize> {
        let query = format!(
            "{PREFIXES}
SELECT (COUNT(DISTINCT ?error) AS ?count)
WHERE {{
  GRAPH {graph} {{
    ?error a validation:Error ;
      validation:producedBy {execution} .
  }}
}}",
            graph = self.graph(),
            execution = escape_uri(execution.as_str()),
        );

        self.count(&query, Authority::Sudo).await
    }
}

impl Storage for SparqlStorage {}
