//! Template schema validation.

use std::collections::BTreeMap;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::descriptor::{FieldDescriptor, FieldType, ImageFormat};
use crate::error::{SchemaRule, SchemaValidationError};
use crate::rules::{self, COMMON_REQUIRED};

/// How to treat descriptor types the rule table has no row for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownTypes {
    /// Keep them as [`FieldDescriptor::Unknown`].
    #[default]
    Accept,
    /// Fail with [`SchemaRule::UnknownType`].
    Reject,
}

/// Knobs for [`validate_fields_with`].
///
/// The default only requires `type` and `label` to be present and
/// `allowed_formats` to name supported formats, matching what stored
/// templates have always been held to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaPolicy {
    pub unknown_types: UnknownTypes,
    /// Upper bound on the number of fields. `None` means unbounded.
    pub max_fields: Option<usize>,
    /// Also enforce value shapes: non-empty string `type`/`label`, positive
    /// `max_length`/`max_size`.
    pub strict_values: bool,
}

impl SchemaPolicy {
    /// Closed type set and checked values.
    pub fn strict() -> Self {
        Self {
            unknown_types: UnknownTypes::Reject,
            max_fields: None,
            strict_values: true,
        }
    }
}

/// A validated field schema, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateSchema {
    fields: BTreeMap<String, FieldDescriptor>,
}

impl TemplateSchema {
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(name, d)| (name.as_str(), d))
    }

    /// The JSON object form persisted in a template's `fields` column.
    pub fn to_value(&self) -> Value {
        let obj: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, d)| (name.clone(), d.to_value()))
            .collect();
        Value::Object(obj)
    }
}

impl Serialize for TemplateSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, descriptor) in &self.fields {
            map.serialize_entry(name, &descriptor.to_value())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TemplateSchema {
    /// Stored schemas are re-validated with the default policy on load.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        validate_fields(&value).map_err(de::Error::custom)
    }
}

/// Validate a field schema with the default (permissive) policy.
///
/// # Example
///
/// ```
/// use serde_json::json;
///
/// let schema = card_schema::validate_fields(&json!({
///     "term": {"type": "text", "label": "Term"},
///     "definition": {"type": "textarea", "label": "Definition"}
/// }))
/// .unwrap();
/// assert_eq!(schema.len(), 2);
/// ```
pub fn validate_fields(fields: &Value) -> Result<TemplateSchema, SchemaValidationError> {
    validate_fields_with(fields, SchemaPolicy::default())
}

/// Validate a field schema, stopping at the first violation.
///
/// Fields are checked in name order, so the reported field is stable for a
/// given input.
pub fn validate_fields_with(
    fields: &Value,
    policy: SchemaPolicy,
) -> Result<TemplateSchema, SchemaValidationError> {
    let obj = fields
        .as_object()
        .ok_or_else(|| SchemaValidationError::schema(SchemaRule::NotAnObject))?;

    if let Some(max) = policy.max_fields {
        if obj.len() > max {
            return Err(SchemaValidationError::schema(SchemaRule::TooManyFields {
                max,
                actual: obj.len(),
            }));
        }
    }

    let mut schema = TemplateSchema::default();
    for (name, config) in obj {
        let descriptor = validate_descriptor(config, policy)
            .map_err(|rule| SchemaValidationError::new(name.clone(), rule))?;
        schema.fields.insert(name.clone(), descriptor);
    }

    tracing::debug!(fields = schema.len(), "Field schema validated");
    Ok(schema)
}

fn validate_descriptor(config: &Value, policy: SchemaPolicy) -> Result<FieldDescriptor, SchemaRule> {
    let obj = config.as_object().ok_or(SchemaRule::NotAMapping)?;

    for rule in COMMON_REQUIRED {
        if !obj.contains_key(rule.key) {
            return Err(SchemaRule::MissingKey(rule.key));
        }
    }
    for rule in COMMON_REQUIRED {
        if rule.applies(policy.strict_values) {
            rule.constraint.check(rule.key, &obj[rule.key])?;
        }
    }

    let type_name = text_at(obj, "type");
    let label = text_at(obj, "label");

    match rules::rule_for(&type_name) {
        Some(row) => {
            for rule in row.required {
                let value = obj.get(rule.key).ok_or(SchemaRule::MissingKey(rule.key))?;
                if rule.applies(policy.strict_values) {
                    rule.constraint.check(rule.key, value)?;
                }
            }
            for rule in row.optional {
                if let Some(value) = obj.get(rule.key) {
                    if rule.applies(policy.strict_values) {
                        rule.constraint.check(rule.key, value)?;
                    }
                }
            }
        }
        None if policy.unknown_types == UnknownTypes::Reject => {
            return Err(SchemaRule::UnknownType(type_name));
        }
        None => {}
    }

    Ok(build_descriptor(obj, type_name, label))
}

/// Build the typed descriptor from an object that already passed the rules.
///
/// Any key whose value the typed form would not write back identically ends
/// up in `extra`, so the descriptor renders to `obj` again.
fn build_descriptor(obj: &Map<String, Value>, type_name: String, label: String) -> FieldDescriptor {
    let mut descriptor = typed_descriptor(obj, type_name, label);

    let rendered = descriptor.to_value();
    let extra: Map<String, Value> = obj
        .iter()
        .filter(|(key, value)| rendered.get(key.as_str()) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    *descriptor.extra_mut() = extra;

    descriptor
}

fn typed_descriptor(obj: &Map<String, Value>, type_name: String, label: String) -> FieldDescriptor {
    match FieldType::parse(&type_name) {
        FieldType::Text => FieldDescriptor::Text {
            label,
            max_length: u32_at(obj, "max_length"),
            extra: Map::new(),
        },
        FieldType::Textarea => FieldDescriptor::Textarea {
            label,
            max_length: u32_at(obj, "max_length"),
            extra: Map::new(),
        },
        FieldType::Image => FieldDescriptor::Image {
            label,
            allowed_formats: obj.get("allowed_formats").and_then(Value::as_array).map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(ImageFormat::parse)
                    .collect()
            }),
            max_size_kb: u32_at(obj, "max_size"),
            extra: Map::new(),
        },
        FieldType::Unknown(type_name) => FieldDescriptor::Unknown {
            type_name,
            label,
            extra: Map::new(),
        },
    }
}

/// Strings as-is, anything else as its JSON text.
fn text_at(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn u32_at(obj: &Map<String, Value>, key: &str) -> Option<u32> {
    obj.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}
