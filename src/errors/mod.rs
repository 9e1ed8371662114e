//! Error types and error handling for the interpreter core.
//!
//! This module defines the single error type shared by the type checker
//! and the interpreter. It includes:
//!
//! - Error structures carrying the source line
//! - Specific error variants for semantic, runtime and internal failures
//! - The `line N: <category>: <message>` diagnostic format
//! - Helpful suggestions and per-category exit statuses

pub mod errors;

#[cfg(test)]
mod tests;
