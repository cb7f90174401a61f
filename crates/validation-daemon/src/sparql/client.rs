//! HTTP client for a SPARQL 1.1 endpoint

use super::{Authority, Binding, QueryEndpoint, QueryResponse, SparqlResult};
use crate::error::SparqlError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue};
use std::time::Duration;
use tracing::{debug, instrument};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
const SUDO_HEADER: &str = "mu-auth-sudo";

/// SPARQL endpoint reached over HTTP
#[derive(Debug, Clone)]
pub struct SparqlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SparqlClient {
    /// Create a client for the given endpoint URL
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> SparqlResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SparqlError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    async fn post(
        &self,
        field: &str,
        body: &str,
        authority: Authority,
    ) -> SparqlResult<reqwest::Response> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, HeaderValue::from_static(SPARQL_RESULTS_JSON))
            .form(&[(field, body)]);

        if authority == Authority::Sudo {
            request = request.header(SUDO_HEADER, "true");
        }

        let response = request
            .send()
            .await
            .map_err(|e| SparqlError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SparqlError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn query(&self, query: &str, authority: Authority) -> SparqlResult<QueryResponse> {
        let response = self.post("query", query, authority).await?;
        response
            .json::<QueryResponse>()
            .await
            .map_err(|e| SparqlError::Decode(e.to_string()))
    }
}

#[async_trait]
impl QueryEndpoint for SparqlClient {
    #[instrument(skip(self, query), fields(endpoint = %self.endpoint))]
    async fn select(&self, query: &str, authority: Authority) -> SparqlResult<Vec<Binding>> {
        let response = self.query(query, authority).await?;
        let bindings = response
            .results
            .map(|r| r.bindings)
            .ok_or_else(|| SparqlError::Decode("missing results.bindings".to_string()))?;

        debug!(rows = bindings.len(), "SELECT completed");
        Ok(bindings)
    }

    #[instrument(skip(self, query), fields(endpoint = %self.endpoint))]
    async fn ask(&self, query: &str, authority: Authority) -> SparqlResult<bool> {
        let response = self.query(query, authority).await?;
        response
            .boolean
            .ok_or_else(|| SparqlError::Decode("missing boolean".to_string()))
    }

    #[instrument(skip(self, statement), fields(endpoint = %self.endpoint))]
    async fn update(&self, statement: &str, authority: Authority) -> SparqlResult<()> {
        self.post("update", statement, authority).await?;
        Ok(())
    }
}
