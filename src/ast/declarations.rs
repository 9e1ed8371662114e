//! Declarations that may appear in the head of a `let`.
//!
//! A `let` block holds an ordered list of declarations:
//!
//! - `type name = ...` introduces an alias, array or record type
//! - `var name [: type] := init` introduces a variable
//! - `function name(params) [: type] = body` introduces a function
//!
//! Type references are kept as `TypeName`s, which the type checker resolves
//! against the scope stack and annotates with the resulting `TypeId`.

use crate::{symbol_table::types::TypeId, Line, MK_DECL, MK_TYPE_NAME};

use super::ast::Expr;

/// Declaration node with its resolved type slot.
///
/// For a type declaration the slot holds the declared type, for a variable
/// the variable's type and for a function its result type.
#[derive(Debug, Clone)]
pub struct Decl {
    pub kind: DeclKind,
    pub line: Line,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    Type(TypeDecl),
    Var(VarDecl),
    Function(FunctionDecl),
}

/// A reference to a type by name, e.g. the `int` in `var x : int := 0`.
#[derive(Debug, Clone)]
pub struct TypeName {
    pub name: String,
    pub line: Line,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub definition: TypeDef,
}

/// Right hand side of a type declaration.
#[derive(Debug, Clone)]
pub enum TypeDef {
    /// `type a = b`
    Alias(TypeName),
    /// `type a = array of b`
    Array(TypeName),
    /// `type a = { f1 : t1, f2 : t2 }`
    Record(Vec<FieldDecl>),
}

/// `name : type`, used for record fields and function parameters.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub type_name: TypeName,
    pub line: Line,
}

impl FieldDecl {
    pub fn new(name: &str, type_name: &str, line: u32) -> Self {
        FieldDecl {
            name: String::from(name),
            type_name: MK_TYPE_NAME!(type_name, line),
            line: Line(line),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub type_name: Option<TypeName>,
    pub init: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<FieldDecl>,
    /// `None` for procedures, which return `unit`.
    pub return_type: Option<TypeName>,
    pub body: Box<Expr>,
}

impl FunctionDecl {
    /// Parameter names paired with their resolved types.
    ///
    /// Parameters the type checker has not resolved are skipped, so the
    /// result is only complete after analysis.
    pub fn get_params(&self) -> Vec<(String, TypeId)> {
        self.params
            .iter()
            .filter_map(|param| param.type_name.ty.map(|ty| (param.name.clone(), ty)))
            .collect()
    }
}

impl Decl {
    /// `type name = target`
    pub fn type_alias(line: u32, name: &str, target: &str) -> Self {
        MK_DECL!(
            DeclKind::Type(TypeDecl {
                name: String::from(name),
                definition: TypeDef::Alias(MK_TYPE_NAME!(target, line)),
            }),
            line
        )
    }

    /// `type name = array of element`
    pub fn type_array(line: u32, name: &str, element: &str) -> Self {
        MK_DECL!(
            DeclKind::Type(TypeDecl {
                name: String::from(name),
                definition: TypeDef::Array(MK_TYPE_NAME!(element, line)),
            }),
            line
        )
    }

    /// `type name = { field : type, ... }`
    pub fn type_record(line: u32, name: &str, fields: &[(&str, &str)]) -> Self {
        MK_DECL!(
            DeclKind::Type(TypeDecl {
                name: String::from(name),
                definition: TypeDef::Record(
                    fields
                        .iter()
                        .map(|(field, ty)| FieldDecl::new(field, ty, line))
                        .collect(),
                ),
            }),
            line
        )
    }

    /// `var name [: type_name] := init`
    pub fn var(line: u32, name: &str, type_name: Option<&str>, init: Expr) -> Self {
        MK_DECL!(
            DeclKind::Var(VarDecl {
                name: String::from(name),
                type_name: type_name.map(|ty| MK_TYPE_NAME!(ty, line)),
                init: Box::new(init),
            }),
            line
        )
    }

    /// `function name(params) [: return_type] = body`
    pub fn function(
        line: u32,
        name: &str,
        params: &[(&str, &str)],
        return_type: Option<&str>,
        body: Expr,
    ) -> Self {
        MK_DECL!(
            DeclKind::Function(FunctionDecl {
                name: String::from(name),
                params: params
                    .iter()
                    .map(|(param, ty)| FieldDecl::new(param, ty, line))
                    .collect(),
                return_type: return_type.map(|ty| MK_TYPE_NAME!(ty, line)),
                body: Box::new(body),
            }),
            line
        )
    }
}
