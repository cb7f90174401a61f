//! Validation daemon library
//!
//! This module provides the core components for the validation daemon:
//! - Rule catalog and query checks
//! - Execution orchestration and error recording
//! - Storage backends (SPARQL store, in-memory)
//! - REST API handlers
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod rules;
pub mod server;
pub mod sparql;
pub mod storage;

pub use config::DaemonConfig;
pub use engine::ValidationEngine;
pub use error::{ApiError, DaemonError, StorageError};
pub use rules::{RuleCatalog, ValidationRule};
pub use server::Server;
pub use storage::{InMemoryStorage, SparqlStorage, Storage};
