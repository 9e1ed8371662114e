#![allow(clippy::module_inception)]

use std::fmt::Display;

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod builtins;
pub mod driver;
pub mod errors;
pub mod interpreter;
pub mod macros;
pub mod symbol_table;
pub mod type_checker;

/// Source line a node was produced from. Line `0` marks nodes and errors
/// that have no place in the source (built-ins, internal failures).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Line(pub u32);

impl Line {
    pub fn null() -> Self {
        Line(0)
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Line {
    fn from(line: u32) -> Self {
        Line(line)
    }
}

/// Writes a diagnostic for `error` to standard error.
///
/// ```text
/// line 12: Semantic: variable "x" not declared
///   tip: Variable `x` is not visible from this scope
/// ```
pub fn display_error(error: &Error) {
    eprintln!("{}", error);

    if let ErrorTip::Suggestion(tip) = error.get_tip() {
        eprintln!("  tip: {}", tip);
    }
}
