//! Runs a parsed program: type check first, evaluate only if that passed.
//!
//! Failures of either pass are reported as a single diagnostic line and
//! mapped to a process exit status:
//!
//! - `0` on success
//! - `3` for a semantic error
//! - `4` for a runtime error
//! - `5` for an internal error

use std::io::{self, Write};

use log::info;

use crate::{
    ast::ast::Program, display_error, errors::errors::Error,
    interpreter::{interpreter::interpret, value::Value},
    type_checker::type_checker::type_check,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Stop after type checking.
    pub analyze_only: bool,
}

/// Type checks and then evaluates `program`, writing its output to `out`.
///
/// Returns the value of the root expression. With `analyze_only` nothing
/// is evaluated and the result is `None`.
pub fn run<W: Write>(
    program: &mut Program,
    options: Options,
    out: &mut W,
) -> Result<Option<Value>, Error> {
    info!("type checking");
    let types = type_check(program)?;

    if options.analyze_only {
        info!("analysis only, skipping evaluation");
        return Ok(None);
    }

    info!("evaluating");
    interpret(program, types, out)
}

/// Runs `program` against standard output and returns the exit status.
pub fn execute(program: &mut Program, options: Options) -> i32 {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run(program, options, &mut out) {
        Ok(_) => 0,
        Err(error) => {
            let _ = out.flush();
            display_error(&error);
            error.exit_code()
        }
    }
}
