//! Schema description compilation and the compiled representation.
//!
//! A schema enters the crate once as a loosely-typed JSON tree, is checked
//! and compiled by [`compile`], and lives on as an immutable [`Schema`]
//! tree that any number of parses (and threads) can read concurrently.
//!
//! - [`types`] - The compiled `Schema` IR
//! - [`compile`](mod@compile) - The two-pass compiler

pub mod compile;
pub mod types;

// Re-export commonly used items
pub use compile::compile;
pub use types::{Items, Schema};
