//! REST API

pub mod handlers;
mod router;
mod state;

pub use router::create_router;
pub use state::AppState;
