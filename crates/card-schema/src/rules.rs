//! Declarative rule table for field descriptors.
//!
//! Every descriptor must carry the [`COMMON_REQUIRED`] keys. The remaining
//! keys are governed by the [`FIELD_RULES`] row for the descriptor's `type`.
//! Rules marked `strict_only` are skipped unless the caller asks for strict
//! value checks.
//! Supporting a new field type means adding a row here and a variant to
//! [`crate::FieldDescriptor`].

use serde_json::Value;

use crate::descriptor::SUPPORTED_IMAGE_FORMATS;
use crate::error::SchemaRule;

/// Constraint on the value stored under a descriptor key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueConstraint {
    /// A string with at least one non-whitespace character.
    NonEmptyString,
    /// An integer in `1..=u32::MAX`.
    PositiveInteger,
    /// A list of strings, each drawn from the given set.
    SubsetOf(&'static [&'static str]),
}

/// A key and the constraint its value must satisfy.
#[derive(Debug, Clone, Copy)]
pub struct KeyRule {
    pub key: &'static str,
    pub constraint: ValueConstraint,
    pub strict_only: bool,
}

/// Keys a given field type requires or allows beyond the common ones.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field_type: &'static str,
    pub required: &'static [KeyRule],
    pub optional: &'static [KeyRule],
}

/// Keys every descriptor must carry, checked in order. Presence is always
/// required; the value shape only under strict checks.
pub const COMMON_REQUIRED: &[KeyRule] = &[
    KeyRule {
        key: "type",
        constraint: ValueConstraint::NonEmptyString,
        strict_only: true,
    },
    KeyRule {
        key: "label",
        constraint: ValueConstraint::NonEmptyString,
        strict_only: true,
    },
];

const MAX_LENGTH: KeyRule = KeyRule {
    key: "max_length",
    constraint: ValueConstraint::PositiveInteger,
    strict_only: true,
};

pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field_type: "text",
        required: &[],
        optional: &[MAX_LENGTH],
    },
    FieldRule {
        field_type: "textarea",
        required: &[],
        optional: &[MAX_LENGTH],
    },
    FieldRule {
        field_type: "image",
        required: &[],
        optional: &[
            KeyRule {
                key: "allowed_formats",
                constraint: ValueConstraint::SubsetOf(SUPPORTED_IMAGE_FORMATS),
                strict_only: false,
            },
            KeyRule {
                key: "max_size",
                constraint: ValueConstraint::PositiveInteger,
                strict_only: true,
            },
        ],
    },
];

/// Look up the rule row for a `type` name.
pub fn rule_for(field_type: &str) -> Option<&'static FieldRule> {
    FIELD_RULES.iter().find(|rule| rule.field_type == field_type)
}

impl KeyRule {
    /// Whether this rule's value constraint runs under the given strictness.
    pub fn applies(&self, strict_values: bool) -> bool {
        strict_values || !self.strict_only
    }
}

impl ValueConstraint {
    /// Check `value` (stored under `key`) against this constraint.
    pub fn check(&self, key: &'static str, value: &Value) -> Result<(), SchemaRule> {
        match self {
            ValueConstraint::NonEmptyString => match value.as_str() {
                Some(s) if !s.trim().is_empty() => Ok(()),
                _ => Err(SchemaRule::InvalidValue {
                    key,
                    expected: "a non-empty string",
                }),
            },
            ValueConstraint::PositiveInteger => match value.as_u64() {
                Some(n) if n >= 1 && n <= u64::from(u32::MAX) => Ok(()),
                _ => Err(SchemaRule::InvalidValue {
                    key,
                    expected: "a positive integer",
                }),
            },
            ValueConstraint::SubsetOf(allowed) => {
                let items = value.as_array().ok_or(SchemaRule::InvalidValue {
                    key,
                    expected: "a list of strings",
                })?;

                for item in items {
                    let item = item.as_str().ok_or(SchemaRule::InvalidValue {
                        key,
                        expected: "a list of strings",
                    })?;
                    if !allowed.contains(&item) {
                        return Err(SchemaRule::DisallowedValue {
                            key,
                            value: item.to_string(),
                            allowed,
                        });
                    }
                }

                Ok(())
            }
        }
    }
}
