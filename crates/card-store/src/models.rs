//! Store models.

use card_schema::TemplateSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;

/// An account, identified by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    /// Login identifier, unique.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// Telegram username.
    pub telegram: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

/// Fields for registering a user. New users are active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
}

/// A named, creator-owned card schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CardTemplate {
    pub id: i64,
    pub name: String,
    pub creator_id: i64,
    /// Validated field descriptors, stored as a JSON object.
    pub fields: Json<TemplateSchema>,
    /// Stamped by the store on insert; never updated.
    pub created_at: String,
}

/// A template as listed for display, joined with its creator's email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TemplateSummary {
    pub id: i64,
    pub name: String,
    pub creator_id: i64,
    pub creator_email: String,
    pub field_count: i64,
    pub created_at: String,
}

/// Input for [`crate::card_template::create_template`].
///
/// `fields` is the raw JSON object; it is validated before anything is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCardTemplate {
    pub name: String,
    pub creator_id: i64,
    pub fields: Value,
}

/// One card's data, keyed by the template's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CardInstance {
    pub id: i64,
    pub template_id: i64,
    pub data: Json<Map<String, Value>>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCardInstance {
    pub template_id: i64,
    pub data: Map<String, Value>,
}
