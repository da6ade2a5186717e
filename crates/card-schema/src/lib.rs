//! Field schemas for card templates.
//!
//! A card template declares its fields as a JSON object mapping field names
//! to descriptors (`{"term": {"type": "text", "label": "Term"}}`). This crate
//! validates such objects into a typed [`TemplateSchema`] and checks card
//! instance data against one.
//!
//! # Example
//!
//! ```
//! use card_schema::{check_instance, validate_fields};
//! use serde_json::json;
//!
//! let schema = validate_fields(&json!({
//!     "question": {"type": "text", "label": "Question", "max_length": 200},
//!     "image": {"type": "image", "label": "Picture", "allowed_formats": ["png"]}
//! }))?;
//!
//! let data = json!({"question": "What is a cell?", "image": "cells/01.png"});
//! check_instance(&schema, data.as_object().unwrap())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod conformance;
pub mod descriptor;
pub mod error;
pub mod rules;
pub mod validate;

pub use conformance::check_instance;
pub use descriptor::{FieldDescriptor, FieldType, ImageFormat, SUPPORTED_IMAGE_FORMATS};
pub use error::{ConformanceErrors, ConformanceViolation, SchemaRule, SchemaValidationError};
pub use validate::{validate_fields, validate_fields_with, SchemaPolicy, TemplateSchema, UnknownTypes};
