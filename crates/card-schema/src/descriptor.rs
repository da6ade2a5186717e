//! Strongly-typed field descriptors.
//!
//! A [`FieldDescriptor`] is the parsed form of one entry in a template's
//! `fields` object. Descriptors are only built by the validator, so every
//! value held here has already passed the rule table. Keys the descriptor
//! does not interpret are carried in `extra` and written back unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Image formats a template may accept.
pub const SUPPORTED_IMAGE_FORMATS: &[&str] = &["png", "jpg", "jpeg"];

/// The kind of editor/payload a field uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Single-line text.
    Text,
    /// Multi-line text.
    Textarea,
    /// Reference to an uploaded image file.
    Image,
    /// Any type name the rule table does not recognise.
    Unknown(String),
}

impl FieldType {
    /// Parse a `type` value. Never fails: unrecognised names become `Unknown`.
    pub fn parse(name: &str) -> Self {
        match name {
            "text" => FieldType::Text,
            "textarea" => FieldType::Textarea,
            "image" => FieldType::Image,
            other => FieldType::Unknown(other.to_string()),
        }
    }

    /// The wire name stored in the `type` key.
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Image => "image",
            FieldType::Unknown(name) => name,
        }
    }

    /// Whether the rule table has a row for this type.
    pub fn is_known(&self) -> bool {
        !matches!(self, FieldType::Unknown(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A supported image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpg,
    Jpeg,
}

impl ImageFormat {
    /// Parse a format name, ignoring ASCII case.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" => Some(ImageFormat::Jpg),
            "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field of a card template.
///
/// `extra` holds every key of the source object whose value is not
/// reproduced by the typed members, so [`FieldDescriptor::to_value`] gives
/// back exactly what the author wrote.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDescriptor {
    Text {
        label: String,
        max_length: Option<u32>,
        extra: Map<String, Value>,
    },
    Textarea {
        label: String,
        max_length: Option<u32>,
        extra: Map<String, Value>,
    },
    Image {
        label: String,
        /// `None` accepts every supported format.
        allowed_formats: Option<Vec<ImageFormat>>,
        /// Upload size limit in kilobytes.
        max_size_kb: Option<u32>,
        extra: Map<String, Value>,
    },
    /// A field type this crate does not interpret.
    Unknown {
        type_name: String,
        label: String,
        extra: Map<String, Value>,
    },
}

impl FieldDescriptor {
    /// Human-readable display name.
    pub fn label(&self) -> &str {
        match self {
            FieldDescriptor::Text { label, .. }
            | FieldDescriptor::Textarea { label, .. }
            | FieldDescriptor::Image { label, .. }
            | FieldDescriptor::Unknown { label, .. } => label,
        }
    }

    /// Uninterpreted keys, such as `placeholder` or `help_text`.
    pub fn extra(&self) -> &Map<String, Value> {
        match self {
            FieldDescriptor::Text { extra, .. }
            | FieldDescriptor::Textarea { extra, .. }
            | FieldDescriptor::Image { extra, .. }
            | FieldDescriptor::Unknown { extra, .. } => extra,
        }
    }

    pub(crate) fn extra_mut(&mut self) -> &mut Map<String, Value> {
        match self {
            FieldDescriptor::Text { extra, .. }
            | FieldDescriptor::Textarea { extra, .. }
            | FieldDescriptor::Image { extra, .. }
            | FieldDescriptor::Unknown { extra, .. } => extra,
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldDescriptor::Text { .. } => FieldType::Text,
            FieldDescriptor::Textarea { .. } => FieldType::Textarea,
            FieldDescriptor::Image { .. } => FieldType::Image,
            FieldDescriptor::Unknown { type_name, .. } => FieldType::Unknown(type_name.clone()),
        }
    }

    /// Render the descriptor back into its JSON object form.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".into(), Value::String(self.field_type().as_str().to_string()));
        obj.insert("label".into(), Value::String(self.label().to_string()));

        match self {
            FieldDescriptor::Text { max_length, .. }
            | FieldDescriptor::Textarea { max_length, .. } => {
                if let Some(max) = max_length {
                    obj.insert("max_length".into(), Value::from(*max));
                }
            }
            FieldDescriptor::Image {
                allowed_formats,
                max_size_kb,
                ..
            } => {
                if let Some(formats) = allowed_formats {
                    let list = formats
                        .iter()
                        .map(|f| Value::String(f.as_str().to_string()))
                        .collect();
                    obj.insert("allowed_formats".into(), Value::Array(list));
                }
                if let Some(max) = max_size_kb {
                    obj.insert("max_size".into(), Value::from(*max));
                }
            }
            FieldDescriptor::Unknown { .. } => {}
        }

        for (key, value) in self.extra() {
            obj.insert(key.clone(), value.clone());
        }

        Value::Object(obj)
    }
}
