//! API request handlers

mod executions;
mod health;

pub use executions::*;
pub use health::*;
