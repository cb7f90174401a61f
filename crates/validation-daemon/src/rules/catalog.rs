//! The configured rule catalog

use super::{CheckKind, RuleMessage, ValidationRule};
use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// One rule as declared in a catalog file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_kind")]
    pub kind: CheckKind,

    #[serde(default)]
    pub query: String,

    /// Message template; the description is used when absent
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub validation_sets: Vec<String>,
}

fn default_kind() -> CheckKind {
    CheckKind::Select
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    validations: Vec<RuleDefinition>,
}

impl RuleDefinition {
    fn into_rule(self, index: usize) -> Result<ValidationRule, CatalogError> {
        let missing = |field| CatalogError::MissingField { index, field };
        if self.name.trim().is_empty() {
            return Err(missing("name"));
        }
        if self.description.trim().is_empty() {
            return Err(missing("description"));
        }
        if self.query.trim().is_empty() {
            return Err(missing("query"));
        }

        let mut rule = match self.kind {
            CheckKind::Select => ValidationRule::select(self.name, self.description, self.query),
            CheckKind::Ask => ValidationRule::ask(self.name, self.description, self.query),
            CheckKind::Custom => {
                return Err(CatalogError::Load(format!(
                    "validation #{} ('{}'): custom checks cannot be declared in a catalog file",
                    index, self.name
                )))
            }
        };
        if let Some(message) = self.message {
            if message.trim().is_empty() {
                return Err(missing("message"));
            }
            rule = rule.with_message(RuleMessage::template(message));
        }
        rule.validation_sets = self.validation_sets;
        Ok(rule)
    }
}

/// Ordered, name-unique set of validation rules
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: Vec<Arc<ValidationRule>>,
}

impl RuleCatalog {
    pub fn new(rules: Vec<ValidationRule>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(CatalogError::DuplicateName(rule.name.clone()));
            }
        }

        Ok(Self {
            rules: rules.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn from_definitions(definitions: Vec<RuleDefinition>) -> Result<Self, CatalogError> {
        let rules = definitions
            .into_iter()
            .enumerate()
            .map(|(index, definition)| definition.into_rule(index))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules)
    }

    /// Load a catalog file; the format follows the file extension
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let file: CatalogFile = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CatalogError::Load(format!("{}: {}", path.display(), e)))?;

        Self::from_definitions(file.validations)
    }

    /// Rules in a validation set, or every rule when no set is given
    pub fn select(&self, validation_set: Option<&str>) -> Vec<Arc<ValidationRule>> {
        match validation_set {
            None => self.rules.clone(),
            Some(set) => self
                .rules
                .iter()
                .filter(|rule| rule.belongs_to(set))
                .cloned()
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ValidationRule>> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Log every configured rule, numbered
    pub fn log_summary(&self) {
        info!(count = self.rules.len(), "Configured validations");
        for (i, rule) in self.rules.iter().enumerate() {
            info!("  {}. {} ({}): {}", i + 1, rule.name, rule.kind(), rule.description);
        }
    }
}
