use std::{cell::RefCell, fmt::Display};

use crate::{interpreter::value::Value, symbol_table::types::TypeId, Line};

use super::declarations::{Decl, TypeName};

/// A whole program: a single expression, usually a `let`.
#[derive(Debug, Clone)]
pub struct Program {
    pub root: Expr,
}

impl Program {
    pub fn new(root: Expr) -> Self {
        Program { root }
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }
}

/// Expression node.
///
/// The shape of the tree never changes after construction. Only the two
/// slots are written: `ty` once by the type checker, `value` by the
/// interpreter every time the node is evaluated.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: Line,
    pub ty: Option<TypeId>,
    pub value: RefCell<Option<Value>>,
}

impl Expr {
    /// Returns the type resolved by the type checker, if it has run.
    pub fn get_type(&self) -> Option<TypeId> {
        self.ty
    }

    /// Returns the value of the most recent evaluation of this node.
    pub fn get_value(&self) -> Option<Value> {
        self.value.borrow().clone()
    }

    pub fn record_value(&self, value: Option<Value>) {
        *self.value.borrow_mut() = value;
    }

    /// Whether the node designates a storage location.
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Identifier(_) | ExprKind::Field { .. } | ExprKind::Subscript { .. }
        )
    }
}

/// Expression Kinds
///
/// Defines the various kinds of expressions in the AST.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Nil,
    Break,
    Int(i64),
    Str(String),
    Identifier(String),
    /// `target[index]`
    Subscript {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    /// `target.field`
    Field {
        target: Box<Expr>,
        field: String,
    },
    /// `(e1; e2; ...)`
    Sequence(Vec<Expr>),
    Negation(Box<Expr>),
    Call {
        function: String,
        arguments: Vec<Expr>,
    },
    Infix {
        operator: Operator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `type_name[size] of init`
    ArrayCreate {
        type_name: TypeName,
        size: Box<Expr>,
        init: Box<Expr>,
    },
    /// `type_name { field = value, ... }`
    RecordCreate {
        type_name: TypeName,
        fields: Vec<FieldInit>,
    },
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    While {
        condition: Box<Expr>,
        body: Box<Expr>,
    },
    /// `for variable := init to bound do body`
    For {
        variable: String,
        init: Box<Expr>,
        bound: Box<Expr>,
        body: Box<Expr>,
    },
    Let {
        declarations: Vec<Decl>,
        body: Vec<Expr>,
    },
}

/// One `name = value` entry of a record creation expression.
#[derive(Debug, Clone)]
pub struct FieldInit {
    pub name: String,
    pub value: Expr,
    pub line: Line,
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
    And,
    Or,
}

impl Operator {
    /// `+ - * / & |`: both operands must be `int`.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Operator::Add
                | Operator::Subtract
                | Operator::Multiply
                | Operator::Divide
                | Operator::And
                | Operator::Or
        )
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Eq => "=",
            Operator::Neq => "<>",
            Operator::Lt => "<",
            Operator::Leq => "<=",
            Operator::Gt => ">",
            Operator::Geq => ">=",
            Operator::And => "&",
            Operator::Or => "|",
        };
        write!(f, "{}", symbol)
    }
}
