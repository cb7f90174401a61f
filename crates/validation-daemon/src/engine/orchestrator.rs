//! Execution orchestration
//!
//! Fans out one pipeline per rule (create validation, evaluate, finalize),
//! joins them all, logs the report and finishes the execution. A rule that
//! fails to evaluate only fails its own validation; the execution finishes
//! `failed` only when the orchestration machinery itself breaks down.

use super::{ErrorRecorder, ExecutionManager, ValidationTracker};
use crate::error::OrchestrationError;
use crate::rules::{RuleContext, ValidationRule};
use crate::sparql::QueryEndpoint;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, info_span, Instrument};
use validation_types::{Execution, ExecutionId, ExecutionStatus, ValidationStatus};

/// Outcome of one rule within an execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub rule: String,
    pub is_valid: bool,
    /// Final validation status; `None` when no validation could be created
    pub status: Option<ValidationStatus>,
}

/// Outcome of a whole execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub execution_id: ExecutionId,
    pub status: ExecutionStatus,
    /// One entry per rule, in catalog order; empty when orchestration failed
    pub rules: Vec<RuleReport>,
}

/// Per-rule pipeline, cloned into every spawned task
#[derive(Clone)]
struct RulePipeline {
    tracker: ValidationTracker,
    recorder: ErrorRecorder,
    endpoint: Arc<dyn QueryEndpoint>,
}

impl RulePipeline {
    async fn run(
        &self,
        execution: &Execution,
        rule: &ValidationRule,
    ) -> Result<RuleReport, OrchestrationError> {
        let validation = match self.tracker.create_validation(rule, execution).await {
            Ok(validation) => validation,
            Err(e) => {
                error!(rule = %rule.name, error = %e, "Failed to create validation");
                return Ok(RuleReport {
                    rule: rule.name.clone(),
                    is_valid: false,
                    status: None,
                });
            }
        };

        let ctx = RuleContext {
            execution,
            validation: &validation,
            endpoint: self.endpoint.as_ref(),
            recorder: &self.recorder,
        };

        let (is_valid, finished) = match rule.evaluate(&ctx).await {
            Ok(outcome) => (
                outcome.valid,
                self.tracker.finish_evaluated(&validation, &outcome).await,
            ),
            Err(e) => {
                error!(rule = %rule.name, error = %e, "Error while executing validation");
                (false, self.tracker.finish_validation(&validation, &[], false).await)
            }
        };

        // An unwritable verdict is retried once as `failed`; only a second
        // failure escapes the rule and fails the execution
        let (is_valid, status) = match finished {
            Ok(status) => (is_valid, status),
            Err(e) => {
                error!(rule = %rule.name, error = %e, "Failed to finish validation");
                let status = self
                    .tracker
                    .finish_validation(&validation, &[], false)
                    .await?;
                (false, status)
            }
        };

        Ok(RuleReport {
            rule: rule.name.clone(),
            is_valid,
            status: Some(status),
        })
    }
}

/// Runs rule sets for executions
#[derive(Clone)]
pub struct ExecutionOrchestrator {
    manager: ExecutionManager,
    pipeline: RulePipeline,
    limiter: Option<Arc<Semaphore>>,
}

impl ExecutionOrchestrator {
    /// `max_concurrent` caps in-flight rule pipelines; `None` starts them all at once
    pub fn new(
        manager: ExecutionManager,
        tracker: ValidationTracker,
        recorder: ErrorRecorder,
        endpoint: Arc<dyn QueryEndpoint>,
        max_concurrent: Option<usize>,
    ) -> Self {
        Self {
            manager,
            pipeline: RulePipeline {
                tracker,
                recorder,
                endpoint,
            },
            limiter: max_concurrent.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    /// Evaluate `rules` for `execution` and finish it
    pub async fn perform(
        &self,
        execution: Execution,
        rules: Vec<Arc<ValidationRule>>,
    ) -> ExecutionReport {
        let execution = Arc::new(execution);
        info!(
            execution = %execution.uri,
            rules = rules.len(),
            "Starting validations"
        );

        let (success, reports) = match self.run_rules(&execution, &rules).await {
            Ok(reports) => {
                log_report(&execution, &reports);
                (true, reports)
            }
            Err(e) => {
                error!(execution = %execution.uri, error = %e, "Execution failed");
                (false, Vec::new())
            }
        };

        let status = self.finish(&execution.id, success).await;
        ExecutionReport {
            execution_id: execution.id,
            status,
            rules: reports,
        }
    }

    async fn run_rules(
        &self,
        execution: &Arc<Execution>,
        rules: &[Arc<ValidationRule>],
    ) -> Result<Vec<RuleReport>, OrchestrationError> {
        let tasks: Vec<_> = rules
            .iter()
            .map(|rule| {
                let pipeline = self.pipeline.clone();
                let limiter = self.limiter.clone();
                let execution = execution.clone();
                let rule = rule.clone();
                let span = info_span!("validation", rule = %rule.name);

                tokio::spawn(
                    async move {
                        let _permit = match limiter {
                            Some(limiter) => match limiter.acquire_owned().await {
                                Ok(permit) => Some(permit),
                                Err(e) => return Err(OrchestrationError::Dispatch(e.to_string())),
                            },
                            None => None,
                        };
                        pipeline.run(&execution, &rule).await
                    }
                    .instrument(span),
                )
            })
            .collect();

        // Join every task before deciding, so no rule outlives the execution
        let mut reports = Vec::with_capacity(tasks.len());
        let mut failure = None;
        for joined in join_all(tasks).await {
            match joined {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(e)) => {
                    failure.get_or_insert(e);
                }
                Err(e) => {
                    failure.get_or_insert(OrchestrationError::Dispatch(e.to_string()));
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    }

    /// Finish the execution, falling back to `failed` when a successful
    /// finish cannot be written
    async fn finish(&self, id: &ExecutionId, success: bool) -> ExecutionStatus {
        match self.manager.finish_execution(id, success).await {
            Ok(status) => status,
            Err(e) if success => {
                error!(execution_id = %id, error = %e, "Failed to finish execution");
                match self.manager.finish_execution(id, false).await {
                    Ok(status) => status,
                    Err(e) => {
                        error!(execution_id = %id, error = %e, "Failed to mark execution failed");
                        ExecutionStatus::Ongoing
                    }
                }
            }
            Err(e) => {
                error!(execution_id = %id, error = %e, "Failed to mark execution failed");
                ExecutionStatus::Ongoing
            }
        }
    }
}

fn log_report(execution: &Execution, reports: &[RuleReport]) {
    info!(execution = %execution.uri, "Validation report");
    for report in reports {
        let verdict = if report.is_valid { "SUCCESS" } else { "FAILED" };
        info!("  [{}] {}", verdict, report.rule);
    }
}
