use std::fmt::Display;

use thiserror::Error;

use crate::Line;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    line: Line,
}

/// The taxonomy an error belongs to. Each one aborts the run with its own
/// exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected by the type checker before anything runs.
    Semantic,
    /// Raised while evaluating a well-typed program.
    Runtime,
    /// The type checker and the interpreter disagree about the tree.
    Internal,
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Semantic => write!(f, "Semantic"),
            ErrorCategory::Runtime => write!(f, "Runtime"),
            ErrorCategory::Internal => write!(f, "Internal"),
        }
    }
}

impl Error {
    pub fn new(error_impl: ErrorImpl, line: Line) -> Self {
        Error {
            internal_error: error_impl,
            line,
        }
    }

    /// Shorthand for an analyzer/interpreter disagreement.
    pub fn invariant(message: impl Into<String>, line: Line) -> Self {
        Error::new(
            ErrorImpl::InvariantViolation {
                message: message.into(),
            },
            line,
        )
    }

    pub fn get_line(&self) -> Line {
        self.line
    }

    pub fn get_kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_category(&self) -> ErrorCategory {
        match &self.internal_error {
            ErrorImpl::ArrayIndexOutOfBounds { .. } | ErrorImpl::DivisionByZero => {
                ErrorCategory::Runtime
            }
            ErrorImpl::EmptyScopeStack
            | ErrorImpl::InvariantViolation { .. }
            | ErrorImpl::BreakEscapedFunction { .. }
            | ErrorImpl::Output { .. } => ErrorCategory::Internal,
            _ => ErrorCategory::Semantic,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self.get_category() {
            ErrorCategory::Semantic => 3,
            ErrorCategory::Runtime => 4,
            ErrorCategory::Internal => 5,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::FunctionNotDeclared { .. } => "FunctionNotDeclared",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::NotAVariable { .. } => "NotAVariable",
            ErrorImpl::NotAFunction { .. } => "NotAFunction",
            ErrorImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::OperandNotInteger { .. } => "OperandNotInteger",
            ErrorImpl::OperandTypeMatchError { .. } => "OperandTypeMatchError",
            ErrorImpl::NotAnArray { .. } => "NotAnArray",
            ErrorImpl::NotARecord { .. } => "NotARecord",
            ErrorImpl::NoSuchField { .. } => "NoSuchField",
            ErrorImpl::SubscriptNotInteger { .. } => "SubscriptNotInteger",
            ErrorImpl::ArraySizeNotInteger { .. } => "ArraySizeNotInteger",
            ErrorImpl::ArrayInitMatchError { .. } => "ArrayInitMatchError",
            ErrorImpl::FieldTypeMatchError { .. } => "FieldTypeMatchError",
            ErrorImpl::FieldAlreadyInitialised { .. } => "FieldAlreadyInitialised",
            ErrorImpl::MissingFieldInit { .. } => "MissingFieldInit",
            ErrorImpl::FieldAlreadyDeclared { .. } => "FieldAlreadyDeclared",
            ErrorImpl::AssignmentTypeMatchError { .. } => "AssignmentTypeMatchError",
            ErrorImpl::NotAssignable => "NotAssignable",
            ErrorImpl::ReadOnlyVariable { .. } => "ReadOnlyVariable",
            ErrorImpl::ConditionNotInteger { .. } => "ConditionNotInteger",
            ErrorImpl::BranchTypeMatchError { .. } => "BranchTypeMatchError",
            ErrorImpl::ThenBranchNotUnit { .. } => "ThenBranchNotUnit",
            ErrorImpl::LoopBodyNotUnit { .. } => "LoopBodyNotUnit",
            ErrorImpl::LoopRangeNotInteger { .. } => "LoopRangeNotInteger",
            ErrorImpl::NegationNotInteger { .. } => "NegationNotInteger",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::TypeAlreadyDeclared { .. } => "TypeAlreadyDeclared",
            ErrorImpl::IllegalTypeCycle { .. } => "IllegalTypeCycle",
            ErrorImpl::NilWithoutRecordType { .. } => "NilWithoutRecordType",
            ErrorImpl::VariableTypeMatchError { .. } => "VariableTypeMatchError",
            ErrorImpl::ReturnTypeMatchError { .. } => "ReturnTypeMatchError",
            ErrorImpl::CallBeforeDeclaration { .. } => "CallBeforeDeclaration",
            ErrorImpl::BreakOutsideLoop => "BreakOutsideLoop",
            ErrorImpl::ArrayIndexOutOfBounds { .. } => "ArrayIndexOutOfBounds",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::EmptyScopeStack => "EmptyScopeStack",
            ErrorImpl::InvariantViolation { .. } => "InvariantViolation",
            ErrorImpl::BreakEscapedFunction { .. } => "BreakEscapedFunction",
            ErrorImpl::Output { .. } => "Output",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::VariableNotDeclared { variable } => ErrorTip::Suggestion(format!(
                "Variable `{}` is not visible from this scope",
                variable
            )),
            ErrorImpl::UnknownType { type_ } => ErrorTip::Suggestion(format!(
                "Declare `{}` in an enclosing `let` before using it",
                type_
            )),
            ErrorImpl::ArgumentCountMismatch {
                expected, received, ..
            } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::ThenBranchNotUnit { .. } => ErrorTip::Suggestion(String::from(
                "Add an `else` branch or make the `then` branch produce no value",
            )),
            ErrorImpl::LoopBodyNotUnit { .. } => ErrorTip::Suggestion(String::from(
                "Loop bodies must not produce a value",
            )),
            ErrorImpl::ReadOnlyVariable { variable } => ErrorTip::Suggestion(format!(
                "`{}` is a loop counter and cannot be assigned",
                variable
            )),
            ErrorImpl::IllegalTypeCycle { .. } => ErrorTip::Suggestion(String::from(
                "Recursive types must pass through an array or record",
            )),
            ErrorImpl::NilWithoutRecordType { variable } => ErrorTip::Suggestion(format!(
                "Give `{}` an explicit record type",
                variable
            )),
            ErrorImpl::CallBeforeDeclaration { variable, function } => {
                ErrorTip::Suggestion(format!(
                    "Declare `{}` after the functions its initialiser calls, including `{}`",
                    variable, function
                ))
            }
            ErrorImpl::BreakOutsideLoop => ErrorTip::Suggestion(String::from(
                "`break` must appear directly inside a `while` or `for` body",
            )),
            ErrorImpl::ArrayIndexOutOfBounds { length, .. } => ErrorTip::Suggestion(format!(
                "Valid indices are 0 to {}",
                length.saturating_sub(1)
            )),
            ErrorImpl::InvariantViolation { .. } | ErrorImpl::EmptyScopeStack => {
                ErrorTip::Suggestion(String::from(
                    "This is a bug in the interpreter, not in the program",
                ))
            }
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: {}: {}",
            self.line,
            self.get_category(),
            self.internal_error
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Name resolution
    #[error("variable {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("function {function:?} not declared")]
    FunctionNotDeclared { function: String },
    #[error("unknown type {type_:?}")]
    UnknownType { type_: String },
    #[error("{name:?} is a function, not a variable")]
    NotAVariable { name: String },
    #[error("{name:?} is not a function")]
    NotAFunction { name: String },

    // Calls
    #[error("function {function:?} expects {expected} arguments, received {received}")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("argument {position} of {function:?}: expected type {expected:?}, received {received:?}")]
    ArgumentTypeMatchError {
        function: String,
        position: usize,
        expected: String,
        received: String,
    },

    // Operators
    #[error("{side} operand of {operator:?} is of type {received:?}, expected \"int\"")]
    OperandNotInteger {
        operator: String,
        side: String,
        received: String,
    },
    #[error("operands of {operator:?} do not match: {left:?} and {right:?}")]
    OperandTypeMatchError {
        operator: String,
        left: String,
        right: String,
    },
    #[error("negation operand is of type {received:?}, expected \"int\"")]
    NegationNotInteger { received: String },

    // Arrays and records
    #[error("type {type_:?} is not an array type")]
    NotAnArray { type_: String },
    #[error("type {type_:?} is not a record type")]
    NotARecord { type_: String },
    #[error("record type {record:?} has no field {field:?}")]
    NoSuchField { record: String, field: String },
    #[error("subscript is of type {received:?}, expected \"int\"")]
    SubscriptNotInteger { received: String },
    #[error("array size is of type {received:?}, expected \"int\"")]
    ArraySizeNotInteger { received: String },
    #[error("array of {expected:?} cannot be filled with {received:?}")]
    ArrayInitMatchError { expected: String, received: String },
    #[error("field {field:?}: expected type {expected:?}, received {received:?}")]
    FieldTypeMatchError {
        field: String,
        expected: String,
        received: String,
    },
    #[error("field {field:?} initialised more than once")]
    FieldAlreadyInitialised { field: String },
    #[error("record {record:?} created without field {field:?}")]
    MissingFieldInit { record: String, field: String },
    #[error("field {field:?} declared twice in record {record:?}")]
    FieldAlreadyDeclared { record: String, field: String },

    // Assignment
    #[error("cannot assign {received:?} to a location of type {expected:?}")]
    AssignmentTypeMatchError { expected: String, received: String },
    #[error("left hand side of an assignment must be a variable, field or subscript")]
    NotAssignable,
    #[error("variable {variable:?} is read-only")]
    ReadOnlyVariable { variable: String },

    // Control flow
    #[error("condition is of type {received:?}, expected \"int\"")]
    ConditionNotInteger { received: String },
    #[error("else branch is of type {else_type:?}, then branch is of type {then_type:?}")]
    BranchTypeMatchError { then_type: String, else_type: String },
    #[error("then branch without else is of type {received:?}, expected \"unit\"")]
    ThenBranchNotUnit { received: String },
    #[error("loop body is of type {received:?}, expected \"unit\"")]
    LoopBodyNotUnit { received: String },
    #[error("loop bound is of type {received:?}, expected \"int\"")]
    LoopRangeNotInteger { received: String },
    #[error("break outside of while or for loop")]
    BreakOutsideLoop,

    // Declarations
    #[error("variable {variable:?} already declared with the same type")]
    VariableAlreadyDeclared { variable: String },
    #[error("function {function:?} already declared")]
    FunctionAlreadyDeclared { function: String },
    #[error("type {type_:?} already declared")]
    TypeAlreadyDeclared { type_: String },
    #[error("type {type_:?} is an alias of itself")]
    IllegalTypeCycle { type_: String },
    #[error("variable {variable:?} initialised with nil needs a record type")]
    NilWithoutRecordType { variable: String },
    #[error("variable {variable:?} of type {expected:?} initialised with {received:?}")]
    VariableTypeMatchError {
        variable: String,
        expected: String,
        received: String,
    },
    #[error("function {function:?} returns {expected:?} but its body is of type {received:?}")]
    ReturnTypeMatchError {
        function: String,
        expected: String,
        received: String,
    },
    #[error("initialiser of {variable:?} calls {function:?}, which is declared after it")]
    CallBeforeDeclaration { variable: String, function: String },

    // Runtime
    #[error("array index {index} out of bounds for length {length}")]
    ArrayIndexOutOfBounds { index: i64, length: usize },
    #[error("division by zero")]
    DivisionByZero,

    // Internal
    #[error("pop from an empty scope stack")]
    EmptyScopeStack,
    #[error("invariant violated: {message}")]
    InvariantViolation { message: String },
    #[error("break escaped the body of function {function:?}")]
    BreakEscapedFunction { function: String },
    #[error("could not write program output: {message}")]
    Output { message: String },
}
