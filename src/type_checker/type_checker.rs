use log::{debug, info};

use crate::{
    ast::{
        ast::{Expr, ExprKind, Program},
        declarations::TypeName,
    },
    errors::errors::{Error, ErrorImpl},
    symbol_table::{
        symbol_table::{ScopeOrigin, SymbolTable},
        types::{TypeId, TypeTable},
    },
    Line,
};

/// Single-pass semantic analyzer.
///
/// Children are checked before their parent; the first violation aborts
/// the pass. Every checked node gets its type slot filled.
#[derive(Debug)]
pub struct TypeChecker {
    pub(super) table: SymbolTable<'static>,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker {
            table: SymbolTable::with_defaults(),
        }
    }

    pub fn types(&self) -> &TypeTable {
        self.table.types()
    }

    pub fn into_types(self) -> TypeTable {
        self.table.into_types()
    }

    /// Runs `check` inside a fresh scope, popping it whatever the outcome.
    pub(super) fn scoped<T>(
        &mut self,
        origin: ScopeOrigin,
        check: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.table.push_scope(origin);
        let result = check(self);
        self.table.pop_scope()?;
        result
    }

    pub(super) fn type_name(&self, ty: TypeId) -> String {
        String::from(self.types().name(ty))
    }

    pub(super) fn resolve_type_name(&self, type_name: &mut TypeName) -> Result<TypeId, Error> {
        match self.table.lookup_type(&type_name.name) {
            Some(ty) => {
                type_name.ty = Some(ty);
                Ok(ty)
            }
            None => Err(Error::new(
                ErrorImpl::UnknownType {
                    type_: type_name.name.clone(),
                },
                type_name.line,
            )),
        }
    }

    pub(super) fn expect_int(
        &self,
        ty: TypeId,
        line: Line,
        error: impl FnOnce(String) -> ErrorImpl,
    ) -> Result<(), Error> {
        if self.types().is_int(ty) {
            Ok(())
        } else {
            Err(Error::new(error(self.type_name(ty)), line))
        }
    }

    pub fn check_expr(&mut self, expr: &mut Expr) -> Result<TypeId, Error> {
        let line = expr.line;
        let ty = match &mut expr.kind {
            ExprKind::Nil => TypeId::UNIT,
            ExprKind::Break => self.check_break(line)?,
            ExprKind::Int(_) => TypeId::INT,
            ExprKind::Str(_) => TypeId::STRING,
            ExprKind::Identifier(name) => self.check_identifier(name, line)?,
            ExprKind::Subscript { target, index } => self.check_subscript(target, index, line)?,
            ExprKind::Field { target, field } => self.check_field(target, field, line)?,
            ExprKind::Sequence(expressions) => self.check_sequence(expressions)?,
            ExprKind::Negation(operand) => self.check_negation(operand, line)?,
            ExprKind::Call {
                function,
                arguments,
            } => self.check_call(function, arguments, line)?,
            ExprKind::Infix {
                operator,
                left,
                right,
            } => self.check_infix(*operator, left, right, line)?,
            ExprKind::ArrayCreate {
                type_name,
                size,
                init,
            } => self.check_array_create(type_name, size, init, line)?,
            ExprKind::RecordCreate { type_name, fields } => {
                self.check_record_create(type_name, fields, line)?
            }
            ExprKind::Assignment { target, value } => self.check_assignment(target, value, line)?,
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.check_if(condition, then_branch, else_branch.as_deref_mut())?,
            ExprKind::While { condition, body } => self.check_while(condition, body)?,
            ExprKind::For {
                variable,
                init,
                bound,
                body,
            } => self.check_for(variable, init, bound, body, line)?,
            ExprKind::Let { declarations, body } => {
                debug!("let at line {}: {} declarations", line, declarations.len());
                self.scoped(ScopeOrigin::Let, |checker| {
                    checker.check_declarations(declarations)?;
                    checker.check_sequence(body)
                })?
            }
        };

        expr.ty = Some(ty);
        Ok(ty)
    }
}

/// Type-checks `program`, filling every type slot.
///
/// Returns the type arena the slots refer to, for the interpreter and for
/// inspecting the results.
pub fn type_check(program: &mut Program) -> Result<TypeTable, Error> {
    let mut checker = TypeChecker::new();
    let root = checker.check_expr(&mut program.root)?;

    info!(
        "type check passed, program is of type {}",
        checker.types().name(root)
    );

    Ok(checker.into_types())
}
