//! Built-in query checks

use super::{CheckKind, RuleContext, RuleOutcome, ValidationCheck, ValidationRule};
use crate::error::{RuleError, RuleResult};
use crate::sparql::Authority;
use async_trait::async_trait;
use tracing::{debug, info};
use validation_types::ErrorDraft;

/// Every row returned by the query is a violation
#[derive(Debug, Clone)]
pub struct SelectCheck {
    query: String,
}

impl SelectCheck {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

#[async_trait]
impl ValidationCheck for SelectCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Select
    }

    async fn evaluate(
        &self,
        rule: &ValidationRule,
        ctx: &RuleContext<'_>,
    ) -> RuleResult<RuleOutcome> {
        debug!(rule = %rule.name, "Running select check");

        let rows = ctx
            .endpoint
            .select(&self.query, Authority::Sudo)
            .await
            .map_err(|source| RuleError::Query {
                rule: rule.name.clone(),
                source,
            })?;

        if rows.is_empty() {
            return Ok(RuleOutcome::valid());
        }

        info!(rule = %rule.name, violations = rows.len(), "Validation found violations");

        let drafts = rows
            .iter()
            .map(|row| {
                ErrorDraft::new(
                    ctx.execution.uri.clone(),
                    ctx.validation.uri.clone(),
                    rule.message.render(&row.params()),
                )
            })
            .collect();

        let errors = ctx
            .recorder
            .insert_errors(drafts)
            .await
            .map_err(|source| RuleError::Storage {
                rule: rule.name.clone(),
                source,
            })?;

        Ok(RuleOutcome::violations(errors))
    }
}

/// A `false` answer is a single violation
#[derive(Debug, Clone)]
pub struct AskCheck {
    query: String,
}

impl AskCheck {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

#[async_trait]
impl ValidationCheck for AskCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Ask
    }

    async fn evaluate(
        &self,
        rule: &ValidationRule,
        ctx: &RuleContext<'_>,
    ) -> RuleResult<RuleOutcome> {
        debug!(rule = %rule.name, "Running ask check");

        let holds = ctx
            .endpoint
            .ask(&self.query, Authority::Sudo)
            .await
            .map_err(|source| RuleError::Query {
                rule: rule.name.clone(),
                source,
            })?;

        if holds {
            return Ok(RuleOutcome::valid());
        }

        info!(rule = %rule.name, "Validation found a violation");

        let draft = ErrorDraft::new(
            ctx.execution.uri.clone(),
            ctx.validation.uri.clone(),
            rule.message.render_plain(),
        );
        let error = ctx
            .recorder
            .insert_error(draft)
            .await
            .map_err(|source| RuleError::Storage {
                rule: rule.name.clone(),
                source,
            })?;

        Ok(RuleOutcome::violations(error.into_iter().collect()))
    }
}
