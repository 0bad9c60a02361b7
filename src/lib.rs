//! json-sieve - schema-directed streaming JSON parsing.
//!
//! This crate parses a JSON document and validates it against a compiled
//! JSON Schema subset (Draft 2020-12) in one pass: constraints are applied
//! as each node is read, so validation costs no more than parsing and the
//! first violation aborts immediately with a precise error.
//!
//! # Architecture
//!
//! The implementation is organized into focused modules:
//!
//! - [`schema`] - Schema description compilation and the compiled IR
//! - [`json`] - Tokenizer, on-demand document cursor, value tree, printer
//! - [`engine`] - The schema-directed descent tying the two together
//! - [`error`] - Error taxonomy and host-facing categories
//!
//! # Example
//!
//! ```
//! use json_sieve::{SchemaParser, Value};
//! use serde_json::json;
//!
//! let parser = SchemaParser::new(&json!({
//!     "type": "object",
//!     "properties": {"name": {"type": "string", "minLength": 1}},
//!     "required": ["name"],
//! })).unwrap();
//!
//! let value = parser.parse(r#"{"name": "alice"}"#).unwrap();
//! assert_eq!(value.get("name").and_then(Value::as_str), Some("alice"));
//!
//! assert!(parser.parse("{}").is_err());
//! ```

// Library code must avoid unwrap/expect/panic; errors propagate to the
// caller. Tests are checked separately with `cargo test`.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod json;
pub mod schema;

// Re-export commonly used types
pub use engine::{parse_with_schema, ParseOptions, SchemaParser};
pub use error::{Category, Error, SieveResult};
pub use json::{JsonType, Limits, Value};
pub use schema::{compile, Items, Schema};
