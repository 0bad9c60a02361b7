//! Textual renderings of [`Value`].
//!
//! Two forms live here. [`to_json_string`] is compact JSON: no whitespace,
//! object pairs in document order, strings with standard JSON escaping. It
//! backs `Value`'s `Display` impl, so `value.to_string()` re-serializes a
//! parse result. Neither form canonicalizes: keys are never sorted.
//!
//! [`coerce_to_string`] is the host string conversion, which drops quotes
//! and structure; the engine fingerprints array elements with it for
//! `uniqueItems`.

use std::fmt;

use super::types::Value;

/// Render a value as compact JSON.
pub fn to_json_string(value: &Value) -> String {
    let mut output = String::new();
    write_value(value, &mut output);
    output
}

fn write_value(value: &Value, output: &mut String) {
    match value {
        Value::Null => output.push_str("null"),
        Value::Bool(true) => output.push_str("true"),
        Value::Bool(false) => output.push_str("false"),
        Value::Int(n) => output.push_str(&n.to_string()),
        Value::Float(f) => output.push_str(&f.to_string()),
        Value::String(s) => write_string(s, output),
        Value::Array(arr) => write_array(arr, output),
        Value::Object(pairs) => write_object(pairs, output),
    }
}

/// Write a string with standard JSON escaping.
fn write_string(s: &str, output: &mut String) {
    output.push('"');
    for ch in s.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\x08' => output.push_str("\\b"),
            '\x0C' => output.push_str("\\f"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c < '\x20' => {
                output.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => output.push(c),
        }
    }
    output.push('"');
}

fn write_array(arr: &[Value], output: &mut String) {
    output.push('[');
    for (i, value) in arr.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        write_value(value, output);
    }
    output.push(']');
}

fn write_object(pairs: &[(String, Value)], output: &mut String) {
    output.push('{');
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        write_string(key, output);
        output.push(':');
        write_value(value, output);
    }
    output.push('}');
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_json_string(self))
    }
}

/// Coerce a value to the host's textual form.
///
/// This mirrors the host string conversion rather than JSON rendering:
/// scalars render bare (no quotes, no escaping), arrays join their coerced
/// elements with commas, and every object renders as `[object Object]`.
/// The engine fingerprints array elements with this form for `uniqueItems`,
/// which makes the comparison deliberately imprecise: the number `1` and
/// the string `"1"` collide, and object contents are not distinguished.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(elements) => {
            let parts: Vec<String> = elements.iter().map(coerce_to_string).collect();
            parts.join(",")
        }
        Value::Object(_) => "[object Object]".to_string(),
    }
}
