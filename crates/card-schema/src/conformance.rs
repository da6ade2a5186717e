//! Instance data conformance against a validated schema.

use serde_json::{Map, Value};

use crate::descriptor::{FieldDescriptor, ImageFormat};
use crate::error::{ConformanceErrors, ConformanceViolation};
use crate::validate::TemplateSchema;

/// Check instance `data` against `schema`, collecting every violation.
///
/// Declared fields that are absent from `data` are allowed. Fields of an
/// unknown type accept any value.
pub fn check_instance(
    schema: &TemplateSchema,
    data: &Map<String, Value>,
) -> Result<(), ConformanceErrors> {
    let mut violations = Vec::new();

    for (field, value) in data {
        match schema.get(field) {
            Some(descriptor) => check_value(field, descriptor, value, &mut violations),
            None => violations.push(ConformanceViolation::UndeclaredField {
                field: field.clone(),
            }),
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = violations.len(), "Instance data does not conform");
        Err(ConformanceErrors::new(violations))
    }
}

fn check_value(
    field: &str,
    descriptor: &FieldDescriptor,
    value: &Value,
    violations: &mut Vec<ConformanceViolation>,
) {
    match descriptor {
        FieldDescriptor::Text { max_length, .. } | FieldDescriptor::Textarea { max_length, .. } => {
            let Some(text) = value.as_str() else {
                violations.push(ConformanceViolation::WrongValueType {
                    field: field.to_string(),
                    expected: "a string",
                });
                return;
            };

            if let Some(max) = max_length {
                let actual = text.chars().count();
                if actual > *max as usize {
                    violations.push(ConformanceViolation::TooLong {
                        field: field.to_string(),
                        max: *max,
                        actual,
                    });
                }
            }
        }
        FieldDescriptor::Image {
            allowed_formats, ..
        } => {
            let Some(path) = value.as_str() else {
                violations.push(ConformanceViolation::WrongValueType {
                    field: field.to_string(),
                    expected: "an image path",
                });
                return;
            };

            let Some(extension) = extension_of(path) else {
                violations.push(ConformanceViolation::MissingExtension {
                    field: field.to_string(),
                });
                return;
            };

            let allowed = match ImageFormat::parse(extension) {
                Some(format) => allowed_formats
                    .as_ref()
                    .map_or(true, |formats| formats.contains(&format)),
                None => false,
            };
            if !allowed {
                violations.push(ConformanceViolation::FormatNotAllowed {
                    field: field.to_string(),
                    format: extension.to_ascii_lowercase(),
                });
            }
        }
        FieldDescriptor::Unknown { .. } => {}
    }
}

/// Extension of the last path segment, if it has a non-empty one.
fn extension_of(path: &str) -> Option<&str> {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}
