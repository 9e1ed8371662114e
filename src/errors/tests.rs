//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorCategory, ErrorImpl, ErrorTip};
use crate::Line;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::VariableNotDeclared {
            variable: "foo".to_string(),
        },
        Line(10),
    );

    assert_eq!(error.get_error_name(), "VariableNotDeclared");
}

#[test]
fn test_error_line() {
    let error = Error::new(ErrorImpl::BreakOutsideLoop, Line(42));

    assert_eq!(error.get_line(), Line(42));
}

#[test]
fn test_semantic_error_display() {
    let error = Error::new(
        ErrorImpl::VariableNotDeclared {
            variable: "x".to_string(),
        },
        Line(12),
    );

    assert_eq!(error.get_category(), ErrorCategory::Semantic);
    assert_eq!(
        error.to_string(),
        "line 12: Semantic: variable \"x\" not declared"
    );
}

#[test]
fn test_runtime_error_display() {
    let error = Error::new(
        ErrorImpl::ArrayIndexOutOfBounds {
            index: 5,
            length: 3,
        },
        Line(7),
    );

    assert_eq!(error.get_category(), ErrorCategory::Runtime);
    assert_eq!(
        error.to_string(),
        "line 7: Runtime: array index 5 out of bounds for length 3"
    );
}

#[test]
fn test_division_by_zero_is_runtime() {
    let error = Error::new(ErrorImpl::DivisionByZero, Line(1));

    assert_eq!(error.get_category(), ErrorCategory::Runtime);
    assert_eq!(error.get_error_name(), "DivisionByZero");
}

#[test]
fn test_internal_errors() {
    let errors = [
        Error::new(ErrorImpl::EmptyScopeStack, Line::null()),
        Error::invariant("record has no field \"x\"", Line(3)),
        Error::new(
            ErrorImpl::BreakEscapedFunction {
                function: "f".to_string(),
            },
            Line(4),
        ),
        Error::new(
            ErrorImpl::Output {
                message: "broken pipe".to_string(),
            },
            Line(5),
        ),
    ];

    for error in &errors {
        assert_eq!(error.get_category(), ErrorCategory::Internal);
        assert_eq!(error.exit_code(), 5);
    }
}

#[test]
fn test_exit_codes() {
    let semantic = Error::new(ErrorImpl::BreakOutsideLoop, Line(1));
    let runtime = Error::new(ErrorImpl::DivisionByZero, Line(1));

    assert_eq!(semantic.exit_code(), 3);
    assert_eq!(runtime.exit_code(), 4);
}

#[test]
fn test_argument_count_error() {
    let error = Error::new(
        ErrorImpl::ArgumentCountMismatch {
            function: "f".to_string(),
            expected: 2,
            received: 1,
        },
        Line(0),
    );

    assert_eq!(error.get_error_name(), "ArgumentCountMismatch");
    assert!(matches!(
        error.get_kind(),
        ErrorImpl::ArgumentCountMismatch { expected: 2, .. }
    ));
}

#[test]
fn test_error_tip() {
    let error = Error::new(
        ErrorImpl::ArrayIndexOutOfBounds {
            index: 3,
            length: 3,
        },
        Line(0),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert_eq!(tip, "Valid indices are 0 to 2"),
        ErrorTip::None => panic!("Expected a suggestion"),
    }
}

#[test]
fn test_error_without_tip() {
    let error = Error::new(ErrorImpl::DivisionByZero, Line(0));

    assert!(matches!(error.get_tip(), ErrorTip::None));
    assert_eq!(error.get_tip().to_string(), "");
}

#[test]
fn test_call_before_declaration_display() {
    let error = Error::new(
        ErrorImpl::CallBeforeDeclaration {
            variable: "a".to_string(),
            function: "f".to_string(),
        },
        Line(2),
    );

    assert_eq!(error.get_category(), ErrorCategory::Semantic);
    assert_eq!(
        error.to_string(),
        "line 2: Semantic: initialiser of \"a\" calls \"f\", which is declared after it"
    );
}
