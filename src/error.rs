//! Error handling for json-sieve.
//!
//! One crate-wide error enum covers the tokenizer, the schema compiler and
//! the validation engine. Every variant carries the exact message reported
//! to callers, and maps to one of three host-facing categories so embedders
//! can translate failures into their native error constructors
//! (syntax error, type error, plain error).

use thiserror::Error;

/// Result alias used throughout the crate.
pub type SieveResult<T> = std::result::Result<T, Error>;

/// Host-facing error category.
///
/// Embedders surface [`Category::Syntax`] as a syntax error,
/// [`Category::Type`] as a type error and [`Category::Constraint`] as a
/// generic error carrying the variant's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Malformed JSON input, or a document that fails mid-read.
    Syntax,
    /// The document's type is excluded by the schema's type filter.
    Type,
    /// Any other schema constraint violation, including schema compilation.
    Constraint,
}

/// All failures the parser and compiler can report.
///
/// Validation is fail-fast: the first violation encountered unwinds to the
/// caller and no partial value is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The tokenizer rejected the input, or a node read failed mid-document.
    #[error("Invalid JSON format")]
    InvalidJson,

    /// Input buffer larger than the configured limit.
    #[error("JSON input exceeds size limit")]
    InputTooLarge,

    /// Arrays/objects nested deeper than the configured limit.
    #[error("JSON nesting exceeds depth limit")]
    NestingTooDeep,

    /// The node's JSON type is not in the schema's type set.
    #[error("Value does not match schema type")]
    TypeMismatch,

    /// String length below `minLength`.
    #[error("String is shorter than minLength")]
    StringTooShort,

    /// String length above `maxLength`.
    #[error("String is longer than maxLength")]
    StringTooLong,

    /// Number below `minimum`.
    #[error("Number is less than minimum")]
    BelowMinimum,

    /// Number above `maximum`.
    #[error("Number is greater than maximum")]
    AboveMaximum,

    /// Number not strictly above `exclusiveMinimum`.
    #[error("Number is not greater than exclusiveMinimum")]
    NotAboveExclusiveMinimum,

    /// Number not strictly below `exclusiveMaximum`.
    #[error("Number is not less than exclusiveMaximum")]
    NotBelowExclusiveMaximum,

    /// Number not an exact multiple of `multipleOf`.
    #[error("Number is not a multiple of multipleOf")]
    NotMultipleOf,

    /// A name listed in `required` was absent from the object.
    #[error("Required property '{0}' is missing")]
    MissingRequired(String),

    /// Fewer properties than `minProperties`.
    #[error("Object has fewer properties than minProperties")]
    TooFewProperties,

    /// More properties than `maxProperties`.
    #[error("Object has more properties than maxProperties")]
    TooManyProperties,

    /// Fewer elements than `minItems`.
    #[error("Array has fewer items than minItems")]
    TooFewItems,

    /// More elements than `maxItems`.
    #[error("Array has more items than maxItems")]
    TooManyItems,

    /// Two elements of a `uniqueItems` array share a fingerprint.
    #[error("Array contains duplicate items")]
    DuplicateItem,

    /// The schema description is structurally malformed.
    #[error("Invalid JSON Schema")]
    InvalidSchema,
}

impl Error {
    /// The host-facing category of this error.
    pub fn category(&self) -> Category {
        match self {
            Error::InvalidJson | Error::InputTooLarge | Error::NestingTooDeep => Category::Syntax,
            Error::TypeMismatch => Category::Type,
            _ => Category::Constraint,
        }
    }
}
