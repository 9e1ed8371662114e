//! Tree-walking evaluation of a type-checked program.
//!
//! - `value`: runtime values, deep copies, identity equality and the
//!   storage locations lvalues designate
//! - `interpreter`: the evaluator, with `break` carried as an explicit
//!   `Flow::BrokeOut` result rather than a flag
//!
//! Assignment, array fills, record fields and the results of calls and
//! `let` blocks are deep copies. Variable and parameter bindings share the
//! value they are initialised with. `=` and `<>` compare arrays and records
//! by identity.

pub mod interpreter;
pub mod value;

#[cfg(test)]
mod tests;
