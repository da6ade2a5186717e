//! Schema and conformance error types.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The rule a field descriptor broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaRule {
    /// The schema itself is not a JSON object.
    #[error("schema must be an object mapping field names to descriptors")]
    NotAnObject,

    /// A descriptor is a scalar or a list instead of an object.
    #[error("must be an object")]
    NotAMapping,

    #[error("must contain key '{0}'")]
    MissingKey(&'static str),

    #[error("'{key}' must be {expected}")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
    },

    #[error("'{key}' contains '{value}', allowed values: {}", .allowed.join(", "))]
    DisallowedValue {
        key: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    /// Only produced when the policy rejects unknown types.
    #[error("has unrecognised type '{0}'")]
    UnknownType(String),

    #[error("schema has {actual} fields, max {max}")]
    TooManyFields { max: usize, actual: usize },
}

/// A field schema failed validation.
///
/// `field` is empty when the rule concerns the schema as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidationError {
    pub field: String,
    pub rule: SchemaRule,
}

impl SchemaValidationError {
    pub fn new(field: impl Into<String>, rule: SchemaRule) -> Self {
        Self {
            field: field.into(),
            rule,
        }
    }

    pub(crate) fn schema(rule: SchemaRule) -> Self {
        Self::new(String::new(), rule)
    }
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.rule)
        } else {
            write!(f, "field '{}' {}", self.field, self.rule)
        }
    }
}

impl std::error::Error for SchemaValidationError {}

/// A single way instance data disagrees with its template's schema.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ConformanceViolation {
    #[error("field '{field}' is not declared by the template")]
    UndeclaredField { field: String },

    #[error("field '{field}' must be {expected}")]
    WrongValueType {
        field: String,
        expected: &'static str,
    },

    #[error("field '{field}' is too long ({actual} chars, max {max})")]
    TooLong {
        field: String,
        max: u32,
        actual: usize,
    },

    #[error("field '{field}' must reference a file with an extension")]
    MissingExtension { field: String },

    #[error("field '{field}' has format '{format}' which is not allowed")]
    FormatNotAllowed { field: String, format: String },
}

impl ConformanceViolation {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ConformanceViolation::UndeclaredField { field }
            | ConformanceViolation::WrongValueType { field, .. }
            | ConformanceViolation::TooLong { field, .. }
            | ConformanceViolation::MissingExtension { field }
            | ConformanceViolation::FormatNotAllowed { field, .. } => field,
        }
    }
}

/// Every violation found while checking one instance. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConformanceErrors(Vec<ConformanceViolation>);

impl ConformanceErrors {
    pub(crate) fn new(violations: Vec<ConformanceViolation>) -> Self {
        Self(violations)
    }

    pub fn violations(&self) -> &[ConformanceViolation] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<ConformanceViolation> {
        self.0
    }
}

impl fmt::Display for ConformanceErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConformanceErrors {}
