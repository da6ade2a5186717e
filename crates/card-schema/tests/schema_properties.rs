//! Property tests for schema validation.

use card_schema::{validate_fields, SchemaRule};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<String>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn type_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!("text")),
        Just(json!("textarea")),
        Just(json!("image")),
        scalar(),
    ]
}

/// Any mapping holding both `type` and `label`, whatever their values,
/// sometimes with an uninterpreted key alongside.
fn well_formed_descriptor() -> impl Strategy<Value = Value> {
    (type_value(), scalar(), prop::option::of(any::<String>())).prop_map(|(ty, label, hint)| {
        let mut descriptor = json!({"type": ty, "label": label});
        if let Some(hint) = hint {
            descriptor["hint"] = Value::from(hint);
        }
        descriptor
    })
}

fn well_formed_schema() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(field_name(), well_formed_descriptor(), 0..8)
        .prop_map(|fields| fields.into_iter().collect())
}

proptest! {
    #[test]
    fn well_formed_schemas_validate(fields in well_formed_schema()) {
        let schema = validate_fields(&Value::Object(fields.clone()));
        prop_assert!(schema.is_ok());
        prop_assert_eq!(schema.unwrap().len(), fields.len());
    }

    #[test]
    fn validated_schemas_render_what_was_submitted(fields in well_formed_schema()) {
        let value = Value::Object(fields);
        let schema = validate_fields(&value).unwrap();
        prop_assert_eq!(schema.to_value(), value);
    }

    #[test]
    fn missing_required_key_names_the_field(
        mut fields in well_formed_schema(),
        broken in field_name(),
        drop_type in any::<bool>(),
    ) {
        let descriptor = if drop_type {
            json!({"label": "Broken"})
        } else {
            json!({"type": "text"})
        };
        fields.insert(broken.clone(), descriptor);

        let err = validate_fields(&Value::Object(fields.clone())).unwrap_err();
        prop_assert_eq!(&err.field, &broken);
        let expected = if drop_type { "type" } else { "label" };
        prop_assert_eq!(err.rule, SchemaRule::MissingKey(expected));
    }

    #[test]
    fn scalar_descriptor_names_the_field(
        mut fields in well_formed_schema(),
        broken in field_name(),
        scalar in prop_oneof![
            Just(json!("text")),
            Just(json!(1)),
            Just(json!(null)),
            Just(json!(["type", "label"])),
        ],
    ) {
        fields.insert(broken.clone(), scalar);

        let err = validate_fields(&Value::Object(fields)).unwrap_err();
        prop_assert_eq!(err.field, broken);
        prop_assert_eq!(err.rule, SchemaRule::NotAMapping);
    }

    #[test]
    fn validation_is_idempotent(fields in well_formed_schema(), extra in any::<bool>()) {
        let mut fields = fields;
        if extra {
            fields.insert("zz".to_string(), json!({"type": "image", "label": "Z", "allowed_formats": ["gif"]}));
        }
        let value = Value::Object(fields);
        prop_assert_eq!(validate_fields(&value), validate_fields(&value));
    }
}
