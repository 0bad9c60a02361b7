//! Schema compilation.
//!
//! Turns a loosely-typed schema description (a [`serde_json::Value`] tree)
//! into the owned [`Schema`] IR in two passes: a recursive structural
//! validation pass that allocates nothing, then an IR construction pass
//! that cannot fail. Splitting the passes keeps rejection cheap and means
//! a half-built tree never escapes.
//!
//! Unknown keywords are ignored for forward compatibility. Known keywords
//! with out-of-domain values (a negative `minLength`, a non-numeric
//! `maximum`) fall back to their neutral defaults rather than rejecting,
//! matching the keyword-by-keyword leniency of the structural pass.

use log::debug;
use serde_json::{Map, Value as Json};

use super::types::{Items, Schema};
use crate::error::{Error, SieveResult};
use crate::json::JsonType;

/// Compile a schema description into the IR.
///
/// The description must be a JSON object; each nested schema must satisfy
/// the structural rules for the keywords it uses. Any violation yields
/// [`Error::InvalidSchema`].
pub fn compile(description: &Json) -> SieveResult<Schema> {
    let obj = description.as_object().ok_or(Error::InvalidSchema)?;
    validate_structure(obj)?;
    let schema = build(obj);
    debug!(
        "compiled schema: {} type(s), {} propert(ies)",
        schema.types.len(),
        schema.properties.len()
    );
    Ok(schema)
}

const LOGICAL_KEYWORDS: [&str; 3] = ["allOf", "anyOf", "oneOf"];
const CONDITIONAL_KEYWORDS: [&str; 3] = ["if", "then", "else"];

/// Structural validation pass.
///
/// Checks shape only: which keywords hold which kinds of nodes. Value
/// domains (bounds, signs) are the construction pass's concern.
fn validate_structure(schema: &Map<String, Json>) -> SieveResult<()> {
    if let Some(type_val) = schema.get("type") {
        validate_type_field(type_val)?;
    }

    if let Some(properties) = schema.get("properties") {
        let map = properties.as_object().ok_or(Error::InvalidSchema)?;
        for prop_schema in map.values() {
            validate_subschema(prop_schema)?;
        }
    }

    if let Some(items) = schema.get("items") {
        match items {
            Json::Object(map) => validate_structure(map)?,
            Json::Array(elements) => {
                for element in elements {
                    validate_subschema(element)?;
                }
            }
            _ => return Err(Error::InvalidSchema),
        }
    }

    if let Some(required) = schema.get("required") {
        let names = required.as_array().ok_or(Error::InvalidSchema)?;
        if !names.iter().all(Json::is_string) {
            return Err(Error::InvalidSchema);
        }
    }

    for keyword in LOGICAL_KEYWORDS {
        if let Some(op_val) = schema.get(keyword) {
            let subschemas = op_val.as_array().ok_or(Error::InvalidSchema)?;
            for subschema in subschemas {
                validate_subschema(subschema)?;
            }
        }
    }

    if let Some(not_val) = schema.get("not") {
        validate_subschema(not_val)?;
    }

    for keyword in CONDITIONAL_KEYWORDS {
        if let Some(op_val) = schema.get(keyword) {
            validate_subschema(op_val)?;
        }
    }

    Ok(())
}

/// A nested schema must be an object; validate it recursively.
fn validate_subschema(value: &Json) -> SieveResult<()> {
    let map = value.as_object().ok_or(Error::InvalidSchema)?;
    validate_structure(map)
}

/// `type` must be a valid type name or a non-empty array of valid names.
fn validate_type_field(type_val: &Json) -> SieveResult<()> {
    match type_val {
        Json::String(name) => {
            JsonType::from_name(name).ok_or(Error::InvalidSchema)?;
            Ok(())
        }
        Json::Array(names) => {
            if names.is_empty() {
                return Err(Error::InvalidSchema);
            }
            for name in names {
                let name = name.as_str().ok_or(Error::InvalidSchema)?;
                JsonType::from_name(name).ok_or(Error::InvalidSchema)?;
            }
            Ok(())
        }
        _ => Err(Error::InvalidSchema),
    }
}

/// IR construction pass. Runs only on structurally valid descriptions.
fn build(schema_obj: &Map<String, Json>) -> Schema {
    let mut schema = Schema::default();

    build_type_field(schema_obj, &mut schema);
    build_object_fields(schema_obj, &mut schema);
    build_array_fields(schema_obj, &mut schema);
    build_string_fields(schema_obj, &mut schema);
    build_number_fields(schema_obj, &mut schema);
    build_logical_fields(schema_obj, &mut schema);
    build_conditional_fields(schema_obj, &mut schema);
    build_metadata_fields(schema_obj, &mut schema);

    schema
}

fn build_type_field(obj: &Map<String, Json>, schema: &mut Schema) {
    match obj.get("type") {
        Some(Json::String(name)) => {
            if let Some(ty) = JsonType::from_name(name) {
                schema.types.insert(ty);
            }
        }
        Some(Json::Array(names)) => {
            for name in names {
                if let Some(ty) = name.as_str().and_then(JsonType::from_name) {
                    schema.types.insert(ty);
                }
            }
        }
        _ => {}
    }
}

fn build_object_fields(obj: &Map<String, Json>, schema: &mut Schema) {
    if let Some(Json::Object(properties)) = obj.get("properties") {
        for (name, prop_schema) in properties {
            if let Json::Object(map) = prop_schema {
                schema.properties.insert(name.clone(), build(map));
            }
        }
    }

    if let Some(Json::Array(names)) = obj.get("required") {
        for name in names {
            if let Some(name) = name.as_str() {
                schema.required.insert(name.to_string());
            }
        }
    }

    if let Some(Json::Object(map)) = obj.get("additionalProperties") {
        schema.additional_properties = Some(Box::new(build(map)));
    }

    schema.min_properties = size_constraint(obj, "minProperties", 0);
    schema.max_properties = size_constraint(obj, "maxProperties", usize::MAX);
}

fn build_array_fields(obj: &Map<String, Json>, schema: &mut Schema) {
    match obj.get("items") {
        Some(Json::Object(map)) => {
            schema.items = Items::Single(Box::new(build(map)));
        }
        Some(Json::Array(elements)) => {
            let compiled = elements
                .iter()
                .filter_map(Json::as_object)
                .map(build)
                .collect();
            schema.items = Items::Tuple(compiled);
        }
        _ => {}
    }

    if let Some(Json::Object(map)) = obj.get("additionalItems") {
        schema.additional_items = Some(Box::new(build(map)));
    }

    schema.min_items = size_constraint(obj, "minItems", 0);
    schema.max_items = size_constraint(obj, "maxItems", usize::MAX);

    if let Some(Json::Bool(unique)) = obj.get("uniqueItems") {
        schema.unique_items = *unique;
    }
}

fn build_string_fields(obj: &Map<String, Json>, schema: &mut Schema) {
    schema.min_length = size_constraint(obj, "minLength", 0);
    schema.max_length = size_constraint(obj, "maxLength", usize::MAX);

    if let Some(pattern) = string_field(obj, "pattern") {
        schema.pattern = pattern;
    }
    if let Some(format) = string_field(obj, "format") {
        schema.format = format;
    }
}

fn build_number_fields(obj: &Map<String, Json>, schema: &mut Schema) {
    schema.minimum = double_constraint(obj, "minimum", f64::NEG_INFINITY);
    schema.maximum = double_constraint(obj, "maximum", f64::INFINITY);
    schema.exclusive_minimum = double_constraint(obj, "exclusiveMinimum", f64::NEG_INFINITY);
    schema.exclusive_maximum = double_constraint(obj, "exclusiveMaximum", f64::INFINITY);
    schema.multiple_of = double_constraint(obj, "multipleOf", 0.0);
}

fn build_logical_fields(obj: &Map<String, Json>, schema: &mut Schema) {
    schema.all_of = schema_array(obj, "allOf");
    schema.any_of = schema_array(obj, "anyOf");
    schema.one_of = schema_array(obj, "oneOf");

    if let Some(Json::Object(map)) = obj.get("not") {
        schema.not_schema = Some(Box::new(build(map)));
    }
}

fn build_conditional_fields(obj: &Map<String, Json>, schema: &mut Schema) {
    if let Some(Json::Object(map)) = obj.get("if") {
        schema.if_schema = Some(Box::new(build(map)));
    }
    if let Some(Json::Object(map)) = obj.get("then") {
        schema.then_schema = Some(Box::new(build(map)));
    }
    if let Some(Json::Object(map)) = obj.get("else") {
        schema.else_schema = Some(Box::new(build(map)));
    }
}

fn build_metadata_fields(obj: &Map<String, Json>, schema: &mut Schema) {
    if let Some(version) = string_field(obj, "$schema") {
        schema.schema_version = version;
    }
    if let Some(id) = string_field(obj, "$id") {
        schema.id = id;
    }
    if let Some(reference) = string_field(obj, "$ref") {
        schema.reference = reference;
    }
    if let Some(anchor) = string_field(obj, "$anchor") {
        schema.anchor = anchor;
    }
    if let Some(dynamic_ref) = string_field(obj, "$dynamicRef") {
        schema.dynamic_ref = dynamic_ref;
    }
    if let Some(dynamic_anchor) = string_field(obj, "$dynamicAnchor") {
        schema.dynamic_anchor = dynamic_anchor;
    }
    if let Some(vocabulary) = obj.get("$vocabulary") {
        schema.vocabulary = vocabulary.to_string();
    }
    if let Some(comment) = string_field(obj, "$comment") {
        schema.comment = comment;
    }
    if let Some(title) = string_field(obj, "title") {
        schema.title = title;
    }
    if let Some(description) = string_field(obj, "description") {
        schema.description = description;
    }
    if let Some(default_value) = obj.get("default") {
        schema.default_value = default_value.to_string();
    }
    if let Some(Json::Array(examples)) = obj.get("examples") {
        schema.examples = examples.iter().map(Json::to_string).collect();
    }
}

/// Copy a non-negative size constraint, clamping out-of-domain values to
/// the default.
fn size_constraint(obj: &Map<String, Json>, key: &str, default: usize) -> usize {
    match obj.get(key).and_then(Json::as_f64) {
        Some(n) if n >= 0.0 => n as usize,
        _ => default,
    }
}

/// Copy a numeric constraint, keeping the default for absent or
/// non-numeric values.
fn double_constraint(obj: &Map<String, Json>, key: &str, default: f64) -> f64 {
    obj.get(key).and_then(Json::as_f64).unwrap_or(default)
}

fn string_field(obj: &Map<String, Json>, key: &str) -> Option<String> {
    obj.get(key).and_then(Json::as_str).map(str::to_string)
}

fn schema_array(obj: &Map<String, Json>, key: &str) -> Vec<Schema> {
    match obj.get(key) {
        Some(Json::Array(elements)) => elements
            .iter()
            .filter_map(Json::as_object)
            .map(build)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_schema() {
        let schema = compile(&json!({})).unwrap();
        assert_eq!(schema, Schema::default());
    }

    #[test]
    fn test_non_object_description_rejected() {
        assert_eq!(compile(&json!("string")), Err(Error::InvalidSchema));
        assert_eq!(compile(&json!([])), Err(Error::InvalidSchema));
        assert_eq!(compile(&json!(null)), Err(Error::InvalidSchema));
    }

    #[test]
    fn test_type_single() {
        let schema = compile(&json!({"type": "string"})).unwrap();
        assert!(schema.types.contains(&JsonType::String));
        assert_eq!(schema.types.len(), 1);
    }

    #[test]
    fn test_type_array() {
        let schema = compile(&json!({"type": ["string", "null"]})).unwrap();
        assert!(schema.types.contains(&JsonType::String));
        assert!(schema.types.contains(&JsonType::Null));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert_eq!(
            compile(&json!({"type": "widget"})),
            Err(Error::InvalidSchema)
        );
        assert_eq!(
            compile(&json!({"type": ["string", "widget"]})),
            Err(Error::InvalidSchema)
        );
    }

    #[test]
    fn test_empty_type_array_rejected() {
        assert_eq!(compile(&json!({"type": []})), Err(Error::InvalidSchema));
    }

    #[test]
    fn test_type_must_be_string_or_array() {
        assert_eq!(compile(&json!({"type": 42})), Err(Error::InvalidSchema));
    }

    #[test]
    fn test_string_constraints() {
        let schema = compile(&json!({
            "type": "string",
            "minLength": 2,
            "maxLength": 5,
            "pattern": "^a",
            "format": "email",
        }))
        .unwrap();
        assert_eq!(schema.min_length, 2);
        assert_eq!(schema.max_length, 5);
        assert_eq!(schema.pattern, "^a");
        assert_eq!(schema.format, "email");
    }

    #[test]
    fn test_negative_size_constraint_clamped() {
        let schema = compile(&json!({"minLength": -3, "maxItems": -1})).unwrap();
        assert_eq!(schema.min_length, 0);
        assert_eq!(schema.max_items, usize::MAX);
    }

    #[test]
    fn test_non_numeric_constraint_ignored() {
        let schema = compile(&json!({"minimum": "zero", "minLength": true})).unwrap();
        assert_eq!(schema.minimum, f64::NEG_INFINITY);
        assert_eq!(schema.min_length, 0);
    }

    #[test]
    fn test_number_constraints() {
        let schema = compile(&json!({
            "minimum": 0,
            "maximum": 100,
            "exclusiveMinimum": -1,
            "exclusiveMaximum": 101,
            "multipleOf": 2.5,
        }))
        .unwrap();
        assert_eq!(schema.minimum, 0.0);
        assert_eq!(schema.maximum, 100.0);
        assert_eq!(schema.exclusive_minimum, -1.0);
        assert_eq!(schema.exclusive_maximum, 101.0);
        assert_eq!(schema.multiple_of, 2.5);
    }

    #[test]
    fn test_properties_and_required() {
        let schema = compile(&json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer"},
            },
            "required": ["name"],
            "minProperties": 1,
            "maxProperties": 4,
        }))
        .unwrap();
        assert_eq!(schema.properties.len(), 2);
        assert!(schema.properties["name"].types.contains(&JsonType::String));
        assert!(schema.required.contains("name"));
        assert_eq!(schema.min_properties, 1);
        assert_eq!(schema.max_properties, 4);
    }

    #[test]
    fn test_properties_must_hold_objects() {
        assert_eq!(
            compile(&json!({"properties": {"a": "nope"}})),
            Err(Error::InvalidSchema)
        );
        assert_eq!(
            compile(&json!({"properties": []})),
            Err(Error::InvalidSchema)
        );
    }

    #[test]
    fn test_nested_property_schema_validated() {
        assert_eq!(
            compile(&json!({"properties": {"a": {"type": "widget"}}})),
            Err(Error::InvalidSchema)
        );
    }

    #[test]
    fn test_required_must_be_string_array() {
        assert_eq!(
            compile(&json!({"required": "name"})),
            Err(Error::InvalidSchema)
        );
        assert_eq!(
            compile(&json!({"required": ["name", 3]})),
            Err(Error::InvalidSchema)
        );
    }

    #[test]
    fn test_items_single() {
        let schema = compile(&json!({"items": {"type": "number"}})).unwrap();
        match &schema.items {
            Items::Single(child) => assert!(child.types.contains(&JsonType::Number)),
            other => panic!("expected single items schema, got {other:?}"),
        }
    }

    #[test]
    fn test_items_tuple() {
        let schema = compile(&json!({
            "items": [{"type": "string"}, {"type": "number"}],
        }))
        .unwrap();
        match &schema.items {
            Items::Tuple(children) => assert_eq!(children.len(), 2),
            other => panic!("expected tuple items schema, got {other:?}"),
        }
    }

    #[test]
    fn test_items_scalar_rejected() {
        assert_eq!(compile(&json!({"items": 7})), Err(Error::InvalidSchema));
    }

    #[test]
    fn test_array_constraints() {
        let schema = compile(&json!({
            "minItems": 1,
            "maxItems": 10,
            "uniqueItems": true,
        }))
        .unwrap();
        assert_eq!(schema.min_items, 1);
        assert_eq!(schema.max_items, 10);
        assert!(schema.unique_items);
    }

    #[test]
    fn test_logical_keywords_compiled() {
        let schema = compile(&json!({
            "allOf": [{"type": "object"}],
            "anyOf": [{"minimum": 0}, {"maximum": 10}],
            "oneOf": [{}],
            "not": {"type": "null"},
        }))
        .unwrap();
        assert_eq!(schema.all_of.len(), 1);
        assert_eq!(schema.any_of.len(), 2);
        assert_eq!(schema.one_of.len(), 1);
        assert!(schema.not_schema.is_some());
    }

    #[test]
    fn test_logical_keywords_must_hold_schema_arrays() {
        assert_eq!(
            compile(&json!({"allOf": {"type": "string"}})),
            Err(Error::InvalidSchema)
        );
        assert_eq!(
            compile(&json!({"anyOf": ["string"]})),
            Err(Error::InvalidSchema)
        );
        assert_eq!(compile(&json!({"not": []})), Err(Error::InvalidSchema));
    }

    #[test]
    fn test_conditional_keywords_compiled() {
        let schema = compile(&json!({
            "if": {"type": "object"},
            "then": {"required": ["a"]},
            "else": {"type": "array"},
        }))
        .unwrap();
        assert!(schema.if_schema.is_some());
        assert!(schema.then_schema.is_some());
        assert!(schema.else_schema.is_some());
    }

    #[test]
    fn test_conditional_keywords_must_hold_objects() {
        assert_eq!(
            compile(&json!({"if": true})),
            Err(Error::InvalidSchema)
        );
    }

    #[test]
    fn test_unknown_keywords_ignored() {
        let schema = compile(&json!({
            "type": "string",
            "x-internal": {"anything": [1, 2, 3]},
            "contentMediaType": "text/html",
        }))
        .unwrap();
        assert!(schema.types.contains(&JsonType::String));
    }

    #[test]
    fn test_metadata_carried() {
        let schema = compile(&json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "$id": "https://example.com/person",
            "$ref": "#/defs/name",
            "$comment": "internal",
            "title": "Person",
            "description": "A person record",
            "default": {"name": "anon"},
            "examples": [{"name": "alice"}, 42],
        }))
        .unwrap();
        assert_eq!(
            schema.schema_version,
            "https://json-schema.org/draft/2020-12/schema"
        );
        assert_eq!(schema.id, "https://example.com/person");
        assert_eq!(schema.reference, "#/defs/name");
        assert_eq!(schema.comment, "internal");
        assert_eq!(schema.title, "Person");
        assert_eq!(schema.description, "A person record");
        assert_eq!(schema.default_value, r#"{"name":"anon"}"#);
        assert_eq!(schema.examples, vec![r#"{"name":"alice"}"#, "42"]);
    }

    #[test]
    fn test_additional_properties_carried() {
        let schema = compile(&json!({
            "additionalProperties": {"type": "string"},
            "additionalItems": {"type": "number"},
        }))
        .unwrap();
        assert!(schema.additional_properties.is_some());
        assert!(schema.additional_items.is_some());
    }

    #[test]
    fn test_deeply_nested_compilation() {
        let schema = compile(&json!({
            "type": "object",
            "properties": {
                "tags": {
                    "type": "array",
                    "items": {"type": "string", "minLength": 1},
                },
            },
        }))
        .unwrap();
        let tags = &schema.properties["tags"];
        match &tags.items {
            Items::Single(child) => assert_eq!(child.min_length, 1),
            other => panic!("expected single items schema, got {other:?}"),
        }
    }
}
