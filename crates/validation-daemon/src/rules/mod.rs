//! Validation rules
//!
//! A rule pairs a query against the store with a message describing each
//! violation. Two check kinds exist:
//!
//! - **Select**: every result row is one violation; the row's bindings
//!   parameterize the message.
//! - **Ask**: a `false` answer is one violation with an unparameterized
//!   message.
//!
//! Additional kinds plug in through [`ValidationCheck`].

mod catalog;
mod checks;
mod message;

pub use catalog::{RuleCatalog, RuleDefinition};
pub use checks::{AskCheck, SelectCheck};
pub use message::{MessageFn, Params, RuleMessage};

use crate::engine::ErrorRecorder;
use crate::error::RuleResult;
use crate::sparql::QueryEndpoint;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use validation_types::{Execution, Validation, ValidationError};

/// Kind of check a rule performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    /// Rows returned by a SELECT query are violations
    Select,
    /// A false ASK answer is a violation
    Ask,
    /// Application-defined check
    Custom,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckKind::Select => write!(f, "select"),
            CheckKind::Ask => write!(f, "ask"),
            CheckKind::Custom => write!(f, "custom"),
        }
    }
}

/// Everything a check needs while evaluating one rule
pub struct RuleContext<'a> {
    pub execution: &'a Execution,
    pub validation: &'a Validation,
    pub endpoint: &'a dyn QueryEndpoint,
    pub recorder: &'a ErrorRecorder,
}

/// What a check found
#[derive(Debug, Clone, Default)]
pub struct RuleOutcome {
    /// Whether the data satisfied the rule
    pub valid: bool,

    /// Error records produced, including any that could not be persisted
    pub errors: Vec<ValidationError>,
}

impl RuleOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn violations(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Trait for rule checks
#[async_trait]
pub trait ValidationCheck: Send + Sync {
    /// Kind of this check
    fn kind(&self) -> CheckKind;

    /// Run the check and record its violations
    async fn evaluate(&self, rule: &ValidationRule, ctx: &RuleContext<'_>)
        -> RuleResult<RuleOutcome>;
}

/// A named, described validation rule
#[derive(Clone)]
pub struct ValidationRule {
    /// Unique rule name
    pub name: String,

    /// Human description, copied onto each Validation
    pub description: String,

    /// Message attached to each violation
    pub message: RuleMessage,

    /// Validation sets this rule belongs to
    pub validation_sets: Vec<String>,

    check: Arc<dyn ValidationCheck>,
}

impl ValidationRule {
    /// Rule with a custom check; the message defaults to the description
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        check: Arc<dyn ValidationCheck>,
    ) -> Self {
        let description = description.into();
        Self {
            name: name.into(),
            message: RuleMessage::Static(description.clone()),
            description,
            validation_sets: Vec::new(),
            check,
        }
    }

    pub fn select(
        name: impl Into<String>,
        description: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self::new(name, description, Arc::new(SelectCheck::new(query)))
    }

    pub fn ask(
        name: impl Into<String>,
        description: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self::new(name, description, Arc::new(AskCheck::new(query)))
    }

    pub fn with_message(mut self, message: impl Into<RuleMessage>) -> Self {
        self.message = message.into();
        self
    }

    pub fn in_set(mut self, validation_set: impl Into<String>) -> Self {
        self.validation_sets.push(validation_set.into());
        self
    }

    pub fn belongs_to(&self, validation_set: &str) -> bool {
        self.validation_sets.iter().any(|s| s == validation_set)
    }

    pub fn kind(&self) -> CheckKind {
        self.check.kind()
    }

    /// Evaluate this rule for one validation
    pub async fn evaluate(&self, ctx: &RuleContext<'_>) -> RuleResult<RuleOutcome> {
        self.check.evaluate(self, ctx).await
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("kind", &self.kind())
            .field("message", &self.message)
            .field("validation_sets", &self.validation_sets)
            .finish()
    }
}
