//! Request classification
//!
//! Decides whether an observed request is a plain request, a GraphQL query
//! or a GraphQL mutation, and resolves the key its calls are grouped under.

use crate::registry::{route_key, Registry};
use crate::request::{CapturedRequest, OperationKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which correlation table a call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// REST / plain HTTP request
    Request,
    /// GraphQL query
    Query,
    /// GraphQL mutation
    Mutation,
}

impl Category {
    /// Human readable name used in log output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

impl From<OperationKind> for Category {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Query => Self::Query,
            OperationKind::Mutation => Self::Mutation,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Target table
    pub category: Category,
    /// Key within that table
    pub key: String,
    /// GraphQL operation name, if any
    pub operation_name: Option<String>,
}

/// Classify a request against the registry
///
/// GraphQL operations are keyed by operation name. Plain requests take the
/// key of the first registered route that matches, or `METHOD:url` when none
/// does.
#[must_use]
pub fn classify(request: &CapturedRequest, registry: &Registry) -> Classification {
    if let Some(op) = request.graphql_operation() {
        return Classification {
            category: op.kind.into(),
            key: op.name.clone(),
            operation_name: Some(op.name),
        };
    }

    let key = registry.resolve_route(request).map_or_else(
        || route_key(request.method, &request.url),
        |route| route.key(),
    );
    Classification {
        category: Category::Request,
        key,
        operation_name: None,
    }
}

/// Request id → classification, written at most once per id
#[derive(Debug, Clone, Default)]
pub struct ClassificationLog {
    entries: HashMap<String, Classification>,
}

impl ClassificationLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a classification unless one exists for this id
    ///
    /// Returns `true` when the record was written, `false` when an earlier
    /// classification already won.
    pub fn record(&mut self, request_id: &str, classification: Classification) -> bool {
        if self.entries.contains_key(request_id) {
            return false;
        }
        self.entries.insert(request_id.to_string(), classification);
        true
    }

    /// Classification recorded for an id
    #[must_use]
    pub fn get(&self, request_id: &str) -> Option<&Classification> {
        self.entries.get(request_id)
    }

    /// Number of classified requests
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been classified
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
