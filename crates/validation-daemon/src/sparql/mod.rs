//! SPARQL store boundary
//!
//! The backing graph store is reached through the [`QueryEndpoint`] trait.
//! [`SparqlClient`] is the HTTP implementation; tests substitute doubles.

mod client;
pub mod escape;

pub use client::SparqlClient;

use crate::error::SparqlError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Result type for SPARQL operations
pub type SparqlResult<T> = Result<T, SparqlError>;

/// Authority under which a request is made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// The caller's own access rights
    Caller,

    /// Privileged access for writes the service must always be able to make
    Sudo,
}

/// One RDF term in a result binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Term type (`uri`, `literal`, `typed-literal`, `bnode`)
    #[serde(rename = "type")]
    pub kind: String,

    /// Raw lexical value
    pub value: String,

    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl Term {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".to_string(),
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: "uri".to_string(),
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }
}

/// One row of a SELECT result: variable name to bound term
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Binding(HashMap<String, Term>);

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a variable, builder style
    pub fn with(mut self, variable: impl Into<String>, term: Term) -> Self {
        self.0.insert(variable.into(), term);
        self
    }

    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.0.get(variable)
    }

    /// Raw value of a bound variable
    pub fn value(&self, variable: &str) -> Option<&str> {
        self.0.get(variable).map(|t| t.value.as_str())
    }

    /// Variable name to raw value, the parameters a rule message is rendered with
    pub fn params(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }
}

/// SPARQL 1.1 JSON results document
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub results: Option<ResultSet>,

    #[serde(default)]
    pub boolean: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResultSet {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// Capability to query and update the backing graph store
#[async_trait]
pub trait QueryEndpoint: Send + Sync {
    /// Run a SELECT query and return its bindings
    async fn select(&self, query: &str, authority: Authority) -> SparqlResult<Vec<Binding>>;

    /// Run an ASK query and return its verdict
    async fn ask(&self, query: &str, authority: Authority) -> SparqlResult<bool>;

    /// Run an update statement
    async fn update(&self, statement: &str, authority: Authority) -> SparqlResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_params() {
        let binding = Binding::new()
            .with("s", Term::uri("http://data.example.org/mandataris/123"))
            .with("start", Term::literal("01-12-2018"));

        let params = binding.params();
        assert_eq!(params.len(), 2);
        assert_eq!(params["s"], "http://data.example.org/mandataris/123");
        assert_eq!(params["start"], "01-12-2018");
    }

    #[test]
    fn test_parse_select_response() {
        let body = r#"{
            "head": {"vars": ["s"]},
            "results": {"bindings": [
                {"s": {"type": "uri", "value": "http://a"}},
                {"s": {"type": "literal", "value": "b", "xml:lang": "nl"}}
            ]}
        }"#;

        let response: QueryResponse = serde_json::from_str(body).unwrap();
        let bindings = response.results.unwrap().bindings;
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].value("s"), Some("http://a"));
        assert_eq!(bindings[1].get("s").unwrap().lang.as_deref(), Some("nl"));
    }

    #[test]
    fn test_parse_ask_response() {
        let response: QueryResponse =
            serde_json::from_str(r#"{"head": {}, "boolean": false}"#).unwrap();
        assert_eq!(response.boolean, Some(false));
        assert!(response.results.is_none());
    }
}
