//! Strongly-typed identifiers for validation service entities
//!
//! Ids are UUID-based newtypes. Every entity is also addressable by a
//! globally unique resource URI derived from a configured base.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for an execution
    ExecutionId
);

uuid_id!(
    /// Unique identifier for a validation
    ValidationId
);

uuid_id!(
    /// Unique identifier for a validation error record
    ValidationErrorId
);

/// Kind of resource, used as the path segment of its URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Execution,
    Validation,
    Error,
}

impl ResourceKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            ResourceKind::Execution => "executions",
            ResourceKind::Validation => "validations",
            ResourceKind::Error => "errors",
        }
    }
}

/// Globally unique URI of a persisted resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceUri(String);

impl ResourceUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Build `{base}/{kind}/{id}`, tolerating a trailing slash on the base
    pub fn for_resource(base: &str, kind: ResourceKind, id: &impl fmt::Display) -> Self {
        Self(format!(
            "{}/{}/{}",
            base.trim_end_matches('/'),
            kind.path_segment(),
            id
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceUri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_id_generation() {
        let id1 = ExecutionId::generate();
        let id2 = ExecutionId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_id_display_is_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = ValidationId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
        assert_eq!(id.to_string().parse::<ValidationId>().unwrap(), id);
    }

    #[test]
    fn test_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<ExecutionId>().is_err());
    }

    #[test]
    fn test_resource_uri_for_resource() {
        let id = ExecutionId::generate();
        let uri = ResourceUri::for_resource(
            "http://example.org/validation-service/",
            ResourceKind::Execution,
            &id,
        );
        assert_eq!(
            uri.as_str(),
            format!("http://example.org/validation-service/executions/{}", id)
        );
    }
}
