// 🚨 Error Taxonomy
// Every failure is local and recoverable: returned to the immediate caller.

use crate::entities::{EntityId, EntityKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// FIELD VIOLATION
// ============================================================================

/// One rejected write: which field, what value, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub value: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        FieldViolation {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}: {}", self.field, self.value, self.reason)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_incomplete(missing: &[String], rejected: &[FieldViolation]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing [{}]", missing.join(", ")));
    }
    if !rejected.is_empty() {
        parts.push(format!("rejected [{}]", join_violations(rejected)));
    }
    parts.join(", ")
}

// ============================================================================
// ENTITY ERROR
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    /// A single field failed its invariant
    #[error("Invalid value for {}", .0)]
    InvalidValue(FieldViolation),

    /// Constructor aggregate of every field that failed
    #[error("Invalid {} entity: {}", .kind, join_violations(.violations))]
    InvalidEntity {
        kind: EntityKind,
        violations: Vec<FieldViolation>,
    },

    /// Builder finalized with missing or rejected required fields
    #[error("Incomplete {} entity: {}", .kind, describe_incomplete(.missing, .rejected))]
    IncompleteEntity {
        kind: EntityKind,
        missing: Vec<String>,
        rejected: Vec<FieldViolation>,
    },

    /// Builder used after `build()`
    #[error("{kind} builder already consumed")]
    BuilderAlreadyConsumed { kind: EntityKind },
}

impl EntityError {
    /// Collapse per-field results into `InvalidEntity`, keeping every violation.
    pub fn invalid_entity<I>(kind: EntityKind, failures: I) -> Self
    where
        I: IntoIterator<Item = Option<EntityError>>,
    {
        let violations = failures
            .into_iter()
            .flatten()
            .flat_map(EntityError::into_violations)
            .collect();
        EntityError::InvalidEntity { kind, violations }
    }

    /// Field-level violations carried by this error.
    pub fn violations(&self) -> Vec<&FieldViolation> {
        match self {
            EntityError::InvalidValue(v) => vec![v],
            EntityError::InvalidEntity { violations, .. } => violations.iter().collect(),
            EntityError::IncompleteEntity { rejected, .. } => rejected.iter().collect(),
            EntityError::BuilderAlreadyConsumed { .. } => Vec::new(),
        }
    }

    pub fn into_violations(self) -> Vec<FieldViolation> {
        match self {
            EntityError::InvalidValue(v) => vec![v],
            EntityError::InvalidEntity { violations, .. } => violations,
            EntityError::IncompleteEntity { missing, rejected, .. } => missing
                .into_iter()
                .map(|field| FieldViolation::new(field, "<unset>", "required field was never set"))
                .chain(rejected)
                .collect(),
            EntityError::BuilderAlreadyConsumed { .. } => Vec::new(),
        }
    }

    /// True if any violation or missing entry names `field`.
    pub fn mentions_field(&self, field: &str) -> bool {
        if let EntityError::IncompleteEntity { missing, .. } = self {
            if missing.iter().any(|m| m == field) {
                return true;
            }
        }
        self.violations().iter().any(|v| v.field == field)
    }
}

// ============================================================================
// REGISTRY ERROR
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Entity already registered: {0}")]
    DuplicateId(EntityId),

    #[error("Entity not found: {0}")]
    NotFound(EntityId),
}

// ============================================================================
// TESTS
// ============================================================================
