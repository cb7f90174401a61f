//! HTTP API for validation-daemon

pub mod rest;

pub use rest::{create_router, AppState};
