//! Schema-directed parse-and-validate engine.
//!
//! The engine descends a JSON document and a compiled [`Schema`] in
//! lock-step: at each node the current schema's type filter is applied
//! before the node is materialized, and its size/range/required
//! constraints immediately after. The document streams through the cursor
//! once; a violation surfaces the moment the offending node is read, and
//! no intermediate tree ever exists.
//!
//! Where the schema has nothing to say (an undeclared property, an array
//! without `items`, skip-validation mode) the descent continues under the
//! shared permissive schema, so the value tree is always fully
//! materialized with faithful types.

use std::collections::{HashMap, HashSet};

use log::trace;

use crate::error::{Error, SieveResult};
use crate::json::{coerce_to_string, Cursor, JsonType, Limits, Value};
use crate::schema::{compile, Items, Schema};

/// Options for a single parse call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Parse and materialize without applying any schema constraints.
    /// Syntax errors are still reported.
    pub skip_validation: bool,
    /// Resource limits for the document cursor.
    pub limits: Limits,
}

/// A compiled schema plus the parse entry points.
///
/// Construction compiles the description once; the handle can then parse
/// any number of documents. The compiled schema is immutable, so a handle
/// may be shared across threads by reference.
#[derive(Debug)]
pub struct SchemaParser {
    schema: Schema,
}

impl SchemaParser {
    /// Compile `description` and build a parser for it.
    pub fn new(description: &serde_json::Value) -> SieveResult<Self> {
        let schema = compile(description)?;
        Ok(Self { schema })
    }

    /// The compiled schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Parse and validate `json` with default options.
    pub fn parse(&self, json: &str) -> SieveResult<Value> {
        self.parse_with_options(json, ParseOptions::default())
    }

    /// Parse and validate `json`.
    pub fn parse_with_options(&self, json: &str, options: ParseOptions) -> SieveResult<Value> {
        parse_with_schema(json, &self.schema, options)
    }
}

/// Parse `json` against an already-compiled schema.
///
/// This is the same operation as [`SchemaParser::parse_with_options`] for
/// callers that share one compiled schema across threads and hold only a
/// reference.
pub fn parse_with_schema(
    json: &str,
    schema: &Schema,
    options: ParseOptions,
) -> SieveResult<Value> {
    let mut cursor = Cursor::new(json.as_bytes(), &options.limits)?;
    let effective = if options.skip_validation {
        Schema::permissive()
    } else {
        schema
    };
    let value = parse_value(&mut cursor, effective, options.skip_validation)?;
    cursor.finish()?;
    Ok(value)
}

/// Recursive descent over one document node.
fn parse_value(cursor: &mut Cursor<'_>, schema: &Schema, skip: bool) -> SieveResult<Value> {
    let observed = cursor.peek_type()?;

    if !skip && !schema.admits(observed) {
        trace!("type filter rejected {}", observed.name());
        return Err(Error::TypeMismatch);
    }

    match observed {
        JsonType::String => {
            let s = cursor.take_string()?;
            if !skip {
                check_string(schema, &s)?;
            }
            Ok(Value::String(s))
        }
        JsonType::Number => {
            let raw = cursor.take_number()?;
            materialize_number(&raw, schema, skip)
        }
        JsonType::Boolean => Ok(Value::Bool(cursor.take_bool()?)),
        JsonType::Null => {
            cursor.take_null()?;
            Ok(Value::Null)
        }
        JsonType::Object => parse_object(cursor, schema, skip),
        JsonType::Array => parse_array(cursor, schema, skip),
        // The cursor never reports Integer; it is a schema-side refinement.
        JsonType::Integer => Err(Error::InvalidJson),
    }
}

/// Integer-then-double extraction with the integer refinement.
///
/// A raw token parses as `i64` only when it is a plain whole number; any
/// fraction or exponent falls through to `f64`. A fractional value under
/// an `Integer`-only filter is a type mismatch, not a range violation.
fn materialize_number(raw: &str, schema: &Schema, skip: bool) -> SieveResult<Value> {
    if let Ok(int_value) = raw.parse::<i64>() {
        if !skip {
            check_number(schema, int_value as f64)?;
        }
        return Ok(Value::Int(int_value));
    }

    let double_value: f64 = raw.parse().map_err(|_| Error::InvalidJson)?;
    if !double_value.is_finite() {
        // Overflow to infinity; the token was valid but unrepresentable.
        return Err(Error::InvalidJson);
    }

    if !skip && schema.requires_integer() && double_value.floor() != double_value {
        return Err(Error::TypeMismatch);
    }

    if !skip {
        check_number(schema, double_value)?;
    }

    Ok(Value::Float(double_value))
}

/// String constraints. Length is measured in UTF-16 code units, the host
/// string semantics this engine models; surrogate-pair characters count
/// as two units.
fn check_string(schema: &Schema, value: &str) -> SieveResult<()> {
    let units = value.encode_utf16().count();

    if units < schema.min_length {
        return Err(Error::StringTooShort);
    }
    if units > schema.max_length {
        return Err(Error::StringTooLong);
    }

    Ok(())
}

/// Numeric constraints, in a fixed order so a value violating several
/// bounds reports deterministically.
fn check_number(schema: &Schema, value: f64) -> SieveResult<()> {
    if value < schema.minimum {
        return Err(Error::BelowMinimum);
    }
    if value > schema.maximum {
        return Err(Error::AboveMaximum);
    }
    if value <= schema.exclusive_minimum {
        return Err(Error::NotAboveExclusiveMinimum);
    }
    if value >= schema.exclusive_maximum {
        return Err(Error::NotBelowExclusiveMaximum);
    }

    if schema.multiple_of > 0.0 {
        // Exact comparison; no tolerance.
        let quotient = value / schema.multiple_of;
        if quotient.floor() != quotient {
            return Err(Error::NotMultipleOf);
        }
    }

    Ok(())
}

fn parse_object(cursor: &mut Cursor<'_>, schema: &Schema, skip: bool) -> SieveResult<Value> {
    cursor.begin_object()?;

    let mut pairs: Vec<(String, Value)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut field_count: usize = 0;
    let mut first = true;

    while let Some(key) = cursor.next_key(first)? {
        first = false;
        field_count += 1;

        let child_schema = if skip {
            Schema::permissive()
        } else {
            schema.properties.get(&key).unwrap_or(Schema::permissive())
        };

        let value = parse_value(cursor, child_schema, skip)?;

        match positions.get(&key) {
            // Duplicate key: later value wins, first position kept
            Some(&at) => {
                if let Some(pair) = pairs.get_mut(at) {
                    pair.1 = value;
                }
            }
            None => {
                positions.insert(key.clone(), pairs.len());
                pairs.push((key, value));
            }
        }
    }

    if !skip {
        if field_count < schema.min_properties {
            return Err(Error::TooFewProperties);
        }
        if field_count > schema.max_properties {
            return Err(Error::TooManyProperties);
        }

        for name in &schema.required {
            if !positions.contains_key(name) {
                return Err(Error::MissingRequired(name.clone()));
            }
        }
    }

    Ok(Value::Object(pairs))
}

fn parse_array(cursor: &mut Cursor<'_>, schema: &Schema, skip: bool) -> SieveResult<Value> {
    cursor.begin_array()?;

    let element_schema = if skip {
        Schema::permissive()
    } else {
        match &schema.items {
            Items::Single(child) => child.as_ref(),
            // Tuple form is compiled but not applied; elements descend
            // permissively, as does an absent `items`.
            Items::Any | Items::Tuple(_) => Schema::permissive(),
        }
    };

    let check_unique = !skip && schema.unique_items;
    let mut fingerprints: HashSet<String> = HashSet::new();
    let mut elements: Vec<Value> = Vec::new();
    let mut first = true;

    while cursor.next_element(first)? {
        first = false;

        let value = parse_value(cursor, element_schema, skip)?;

        if check_unique && !fingerprints.insert(coerce_to_string(&value)) {
            return Err(Error::DuplicateItem);
        }

        elements.push(value);
    }

    if !skip {
        if elements.len() < schema.min_items {
            return Err(Error::TooFewItems);
        }
        if elements.len() > schema.max_items {
            return Err(Error::TooManyItems);
        }
    }

    Ok(Value::Array(elements))
}
