//! Utility macros for building the AST.
//!
//! This module defines helper macros used by the node constructors:
//!
//! - `MK_EXPR!` - Creates an Expr with empty type and value slots
//! - `MK_DECL!` - Creates a Decl with an empty type slot
//! - `MK_TYPE_NAME!` - Creates an unresolved TypeName reference
//!
//! These macros keep the slot initialisation in one place.

/// Creates an Expr instance with both resolution slots empty.
///
/// # Arguments
///
/// * `$kind` - The ExprKind
/// * `$line` - The source line (anything convertible into `Line`)
///
/// # Example
///
/// ```ignore
/// let literal = MK_EXPR!(ExprKind::Int(42), 3);
/// ```
#[macro_export]
macro_rules! MK_EXPR {
    ($kind:expr, $line:expr) => {
        $crate::ast::ast::Expr {
            kind: $kind,
            line: $crate::Line::from($line),
            ty: None,
            value: ::std::cell::RefCell::new(None),
        }
    };
}

/// Creates a Decl instance with an empty type slot.
///
/// # Arguments
///
/// * `$kind` - The DeclKind
/// * `$line` - The source line
#[macro_export]
macro_rules! MK_DECL {
    ($kind:expr, $line:expr) => {
        $crate::ast::declarations::Decl {
            kind: $kind,
            line: $crate::Line::from($line),
            ty: None,
        }
    };
}

/// Creates a TypeName reference that the type checker resolves later.
///
/// # Example
///
/// ```ignore
/// let element = MK_TYPE_NAME!("int", 1);
/// ```
#[macro_export]
macro_rules! MK_TYPE_NAME {
    ($name:expr, $line:expr) => {
        $crate::ast::declarations::TypeName {
            name: String::from($name),
            line: $crate::Line::from($line),
            ty: None,
        }
    };
}
