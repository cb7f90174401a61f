//! Storage layer for validation-daemon
//!
//! Provides persistent storage for executions, validations and validation
//! errors.

mod memory;
mod sparql;
mod traits;

pub use memory::InMemoryStorage;
pub use sparql::SparqlStorage;
pub use traits::{
    ExecutionStorage, Storage, StorageResult, ValidationErrorStorage, ValidationStorage,
};
