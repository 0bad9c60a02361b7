//! Resource limits for JSON parsing.
//!
//! The document cursor walks input recursively, so hostile documents could
//! otherwise exhaust the stack or memory. Both limits are generous enough
//! that conforming callers never notice them.

/// Resource limits applied while reading a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum total input size in bytes.
    pub max_input_size: u64,
    /// Maximum nesting depth for arrays/objects.
    pub max_nesting_depth: u64,
}

impl Limits {
    /// Default limits: 16 MiB of input, 128 levels of nesting.
    pub const fn standard() -> Self {
        Self {
            max_input_size: 16 * 1024 * 1024,
            max_nesting_depth: 128,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::standard()
    }
}
