//! Functions every program can call without declaring them.
//!
//! - `print(s : string)` writes `s`
//! - `printi(i : int)` writes the decimal form of `i`
//! - `not(i : int) : int` maps `0` to `1` and anything else to `0`
//!
//! Output is written with no separator or trailing newline.

use lazy_static::lazy_static;
use std::{collections::HashMap, io::Write};

use crate::{
    errors::errors::{Error, ErrorImpl},
    interpreter::value::Value,
    symbol_table::types::TypeId,
    Line,
};

lazy_static! {
    pub static ref BUILTINS: HashMap<&'static str, Builtin> = {
        let mut map = HashMap::new();
        map.insert("print", Builtin::Print);
        map.insert("printi", Builtin::PrintI);
        map.insert("not", Builtin::Not);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Builtin {
    Print,
    PrintI,
    Not,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::PrintI => "printi",
            Builtin::Not => "not",
        }
    }

    pub fn params(&self) -> Vec<(String, TypeId)> {
        match self {
            Builtin::Print => vec![(String::from("s"), TypeId::STRING)],
            Builtin::PrintI | Builtin::Not => vec![(String::from("i"), TypeId::INT)],
        }
    }

    pub fn return_type(&self) -> TypeId {
        match self {
            Builtin::Print | Builtin::PrintI => TypeId::UNIT,
            Builtin::Not => TypeId::INT,
        }
    }

    pub fn invoke(
        &self,
        arguments: &[Value],
        out: &mut dyn Write,
        line: Line,
    ) -> Result<Option<Value>, Error> {
        match self {
            Builtin::Print => {
                let text = self.argument(arguments, line)?.as_str().ok_or_else(|| {
                    Error::invariant("print expects a string argument", line)
                })?;
                write_output(out, text, line)?;
                Ok(None)
            }
            Builtin::PrintI => {
                let value = self.int_argument(arguments, line)?;
                write_output(out, &value.to_string(), line)?;
                Ok(None)
            }
            Builtin::Not => {
                let value = self.int_argument(arguments, line)?;
                Ok(Some(Value::Int(if value == 0 { 1 } else { 0 })))
            }
        }
    }

    fn argument<'a>(&self, arguments: &'a [Value], line: Line) -> Result<&'a Value, Error> {
        match arguments {
            [argument] => Ok(argument),
            _ => Err(Error::invariant(
                format!(
                    "{} called with {} arguments",
                    self.name(),
                    arguments.len()
                ),
                line,
            )),
        }
    }

    fn int_argument(&self, arguments: &[Value], line: Line) -> Result<i64, Error> {
        self.argument(arguments, line)?.as_int().ok_or_else(|| {
            Error::invariant(format!("{} expects an int argument", self.name()), line)
        })
    }
}

fn write_output(out: &mut dyn Write, text: &str, line: Line) -> Result<(), Error> {
    out.write_all(text.as_bytes()).map_err(|error| {
        Error::new(
            ErrorImpl::Output {
                message: error.to_string(),
            },
            line,
        )
    })
}
