//! Name resolution shared by the type checker and the interpreter.
//!
//! - `types`: the arena of named types with alias, array and record
//!   resolution (`actual_kind`, `actual_type`, assignability)
//! - `symbol_table`: the stack of lexical scopes mapping names to symbols
//!   and types, seeded with the primitive types and the builtins
//!
//! Each pass builds its own `SymbolTable`; only the type arena is handed
//! from the type checker to the interpreter.

pub mod symbol_table;
pub mod types;
