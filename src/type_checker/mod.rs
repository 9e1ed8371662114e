//! Type checking and semantic analysis module.
//!
//! This module walks the whole tree once before anything runs. It:
//!
//! - Resolves every identifier, function and type name against the scope stack
//! - Assigns a type to every expression and declaration node
//! - Checks operands, arguments, assignments, branches and loop bodies
//! - Registers the types and function signatures of a `let` before its
//!   bodies, so declarations may refer forwards and recurse mutually
//! - Rejects `break` outside of a `while` or `for` body
//!
//! The first violation ends the pass with a semantic error.

mod decl;
mod expr;
pub mod type_checker;
