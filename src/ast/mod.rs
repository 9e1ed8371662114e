/// AST (Abstract Syntax Tree) module
/// Contains every node the semantic analyzer and the interpreter walk
///
/// Submodules:
/// - ast: Program, Expr and the expression variants
/// - expressions: Constructors for expression nodes
/// - declarations: Type, variable and function declarations
pub mod ast;
pub mod declarations;
pub mod expressions;
