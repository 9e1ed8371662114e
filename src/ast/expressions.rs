//! Constructors for expression nodes.
//!
//! The parser (an external collaborator) and the tests build trees through
//! these helpers. Each takes the source line first and returns an `Expr`
//! whose type and value slots are still empty.

use crate::{MK_EXPR, MK_TYPE_NAME};

use super::{
    ast::{Expr, ExprKind, FieldInit, Operator},
    declarations::Decl,
};

// LITERALS

impl Expr {
    pub fn nil(line: u32) -> Self {
        MK_EXPR!(ExprKind::Nil, line)
    }

    pub fn brk(line: u32) -> Self {
        MK_EXPR!(ExprKind::Break, line)
    }

    pub fn int(line: u32, value: i64) -> Self {
        MK_EXPR!(ExprKind::Int(value), line)
    }

    pub fn string(line: u32, value: &str) -> Self {
        MK_EXPR!(ExprKind::Str(String::from(value)), line)
    }
}

// LVALUES

impl Expr {
    pub fn id(line: u32, name: &str) -> Self {
        MK_EXPR!(ExprKind::Identifier(String::from(name)), line)
    }

    pub fn subscript(line: u32, target: Expr, index: Expr) -> Self {
        MK_EXPR!(
            ExprKind::Subscript {
                target: Box::new(target),
                index: Box::new(index),
            },
            line
        )
    }

    pub fn field(line: u32, target: Expr, field: &str) -> Self {
        MK_EXPR!(
            ExprKind::Field {
                target: Box::new(target),
                field: String::from(field),
            },
            line
        )
    }
}

// OPERATIONS

impl Expr {
    pub fn seq(line: u32, expressions: Vec<Expr>) -> Self {
        MK_EXPR!(ExprKind::Sequence(expressions), line)
    }

    pub fn neg(line: u32, operand: Expr) -> Self {
        MK_EXPR!(ExprKind::Negation(Box::new(operand)), line)
    }

    pub fn call(line: u32, function: &str, arguments: Vec<Expr>) -> Self {
        MK_EXPR!(
            ExprKind::Call {
                function: String::from(function),
                arguments,
            },
            line
        )
    }

    pub fn infix(line: u32, left: Expr, operator: Operator, right: Expr) -> Self {
        MK_EXPR!(
            ExprKind::Infix {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
            line
        )
    }

    pub fn assign(line: u32, target: Expr, value: Expr) -> Self {
        MK_EXPR!(
            ExprKind::Assignment {
                target: Box::new(target),
                value: Box::new(value),
            },
            line
        )
    }
}

// CREATION

impl Expr {
    /// `type_name[size] of init`
    pub fn array(line: u32, type_name: &str, size: Expr, init: Expr) -> Self {
        MK_EXPR!(
            ExprKind::ArrayCreate {
                type_name: MK_TYPE_NAME!(type_name, line),
                size: Box::new(size),
                init: Box::new(init),
            },
            line
        )
    }

    /// `type_name { name = value, ... }`
    pub fn record(line: u32, type_name: &str, fields: Vec<(&str, Expr)>) -> Self {
        MK_EXPR!(
            ExprKind::RecordCreate {
                type_name: MK_TYPE_NAME!(type_name, line),
                fields: fields
                    .into_iter()
                    .map(|(name, value)| FieldInit {
                        name: String::from(name),
                        line: value.line,
                        value,
                    })
                    .collect(),
            },
            line
        )
    }
}

// CONTROL FLOW

impl Expr {
    pub fn if_then(line: u32, condition: Expr, then_branch: Expr) -> Self {
        MK_EXPR!(
            ExprKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: None,
            },
            line
        )
    }

    pub fn if_else(line: u32, condition: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        MK_EXPR!(
            ExprKind::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Some(Box::new(else_branch)),
            },
            line
        )
    }

    pub fn while_loop(line: u32, condition: Expr, body: Expr) -> Self {
        MK_EXPR!(
            ExprKind::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            line
        )
    }

    /// `for variable := init to bound do body`
    pub fn for_loop(line: u32, variable: &str, init: Expr, bound: Expr, body: Expr) -> Self {
        MK_EXPR!(
            ExprKind::For {
                variable: String::from(variable),
                init: Box::new(init),
                bound: Box::new(bound),
                body: Box::new(body),
            },
            line
        )
    }

    pub fn let_in(line: u32, declarations: Vec<Decl>, body: Vec<Expr>) -> Self {
        MK_EXPR!(ExprKind::Let { declarations, body }, line)
    }
}
