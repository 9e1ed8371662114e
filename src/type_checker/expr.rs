use std::collections::HashSet;

use log::trace;

use crate::{
    ast::{
        ast::{Expr, ExprKind, FieldInit, Operator},
        declarations::TypeName,
    },
    builtins::BUILTINS,
    errors::errors::{Error, ErrorImpl},
    symbol_table::{
        symbol_table::{ScopeOrigin, Symbol, VarSymbol},
        types::{TypeId, TypeKind},
    },
    Line,
};

use super::type_checker::TypeChecker;

// NAMES

impl TypeChecker {
    pub(super) fn check_break(&self, line: Line) -> Result<TypeId, Error> {
        match self.table.current_origin() {
            Some(ScopeOrigin::While) | Some(ScopeOrigin::For) => Ok(TypeId::UNIT),
            _ => Err(Error::new(ErrorImpl::BreakOutsideLoop, line)),
        }
    }

    pub(super) fn check_identifier(&self, name: &str, line: Line) -> Result<TypeId, Error> {
        match self.table.lookup_symbol(name) {
            Some(Symbol::Variable(variable)) => Ok(variable.ty),
            Some(Symbol::Function(_)) => Err(Error::new(
                ErrorImpl::NotAVariable {
                    name: String::from(name),
                },
                line,
            )),
            None => Err(Error::new(
                ErrorImpl::VariableNotDeclared {
                    variable: String::from(name),
                },
                line,
            )),
        }
    }

    pub(super) fn check_subscript(
        &mut self,
        target: &mut Expr,
        index: &mut Expr,
        line: Line,
    ) -> Result<TypeId, Error> {
        let target_ty = self.check_expr(target)?;
        let index_ty = self.check_expr(index)?;

        if self.types().actual_kind(target_ty) != TypeKind::Array {
            return Err(Error::new(
                ErrorImpl::NotAnArray {
                    type_: self.type_name(target_ty),
                },
                line,
            ));
        }
        self.expect_int(index_ty, index.line, |received| {
            ErrorImpl::SubscriptNotInteger { received }
        })?;

        Ok(self.types().actual_type(target_ty))
    }

    pub(super) fn check_field(
        &mut self,
        target: &mut Expr,
        field: &str,
        line: Line,
    ) -> Result<TypeId, Error> {
        let target_ty = self.check_expr(target)?;

        if self.types().actual_kind(target_ty) != TypeKind::Record {
            return Err(Error::new(
                ErrorImpl::NotARecord {
                    type_: self.type_name(target_ty),
                },
                line,
            ));
        }

        self.types().field_type(target_ty, field).ok_or_else(|| {
            Error::new(
                ErrorImpl::NoSuchField {
                    record: self.type_name(target_ty),
                    field: String::from(field),
                },
                line,
            )
        })
    }
}

// OPERATIONS

impl TypeChecker {
    /// Type of the last expression, `unit` when there is none.
    pub(super) fn check_sequence(&mut self, expressions: &mut [Expr]) -> Result<TypeId, Error> {
        let mut ty = TypeId::UNIT;
        for expression in expressions.iter_mut() {
            ty = self.check_expr(expression)?;
        }
        Ok(ty)
    }

    pub(super) fn check_negation(&mut self, operand: &mut Expr, line: Line) -> Result<TypeId, Error> {
        let ty = self.check_expr(operand)?;
        self.expect_int(ty, line, |received| ErrorImpl::NegationNotInteger { received })?;
        Ok(TypeId::INT)
    }

    pub(super) fn check_call(
        &mut self,
        function: &str,
        arguments: &mut [Expr],
        line: Line,
    ) -> Result<TypeId, Error> {
        let mut argument_types = Vec::with_capacity(arguments.len());
        for argument in arguments.iter_mut() {
            argument_types.push(self.check_expr(argument)?);
        }

        // built-ins are called by name, whatever the scopes declare
        let (params, return_type) = match BUILTINS.get(function) {
            Some(builtin) => (builtin.params(), builtin.return_type()),
            None => match self.table.lookup_symbol(function) {
                Some(Symbol::Function(symbol)) => (symbol.params.clone(), symbol.return_type),
                Some(Symbol::Variable(_)) => {
                    return Err(Error::new(
                        ErrorImpl::NotAFunction {
                            name: String::from(function),
                        },
                        line,
                    ))
                }
                None => {
                    return Err(Error::new(
                        ErrorImpl::FunctionNotDeclared {
                            function: String::from(function),
                        },
                        line,
                    ))
                }
            },
        };

        if params.len() != argument_types.len() {
            return Err(Error::new(
                ErrorImpl::ArgumentCountMismatch {
                    function: String::from(function),
                    expected: params.len(),
                    received: argument_types.len(),
                },
                line,
            ));
        }

        for (position, ((_, expected), received)) in
            params.iter().zip(argument_types.iter()).enumerate()
        {
            if !self.types().is_assignable(*expected, *received) {
                return Err(Error::new(
                    ErrorImpl::ArgumentTypeMatchError {
                        function: String::from(function),
                        position,
                        expected: self.type_name(*expected),
                        received: self.type_name(*received),
                    },
                    line,
                ));
            }
        }

        trace!("call to {} at line {} is of type {}", function, line, return_type);
        Ok(return_type)
    }

    pub(super) fn check_infix(
        &mut self,
        operator: Operator,
        left: &mut Expr,
        right: &mut Expr,
        line: Line,
    ) -> Result<TypeId, Error> {
        let left_ty = self.check_expr(left)?;
        let right_ty = self.check_expr(right)?;

        if operator.is_arithmetic() {
            for (side, ty) in [("left", left_ty), ("right", right_ty)] {
                self.expect_int(ty, line, |received| ErrorImpl::OperandNotInteger {
                    operator: operator.to_string(),
                    side: String::from(side),
                    received,
                })?;
            }
        } else {
            let types = self.types();
            if !types.is_assignable(left_ty, types.actual_type(right_ty)) {
                return Err(Error::new(
                    ErrorImpl::OperandTypeMatchError {
                        operator: operator.to_string(),
                        left: self.type_name(left_ty),
                        right: self.type_name(right_ty),
                    },
                    line,
                ));
            }
        }

        Ok(TypeId::INT)
    }

    pub(super) fn check_assignment(
        &mut self,
        target: &mut Expr,
        value: &mut Expr,
        line: Line,
    ) -> Result<TypeId, Error> {
        if !target.is_lvalue() {
            return Err(Error::new(ErrorImpl::NotAssignable, line));
        }
        if let ExprKind::Identifier(name) = &target.kind {
            if let Some(Symbol::Variable(VarSymbol {
                read_only: true, ..
            })) = self.table.lookup_symbol(name)
            {
                return Err(Error::new(
                    ErrorImpl::ReadOnlyVariable {
                        variable: name.clone(),
                    },
                    line,
                ));
            }
        }

        let target_ty = self.check_expr(target)?;
        let value_ty = self.check_expr(value)?;

        let types = self.types();
        if !types.is_assignable(target_ty, types.actual_type(value_ty)) {
            return Err(Error::new(
                ErrorImpl::AssignmentTypeMatchError {
                    expected: self.type_name(target_ty),
                    received: self.type_name(value_ty),
                },
                line,
            ));
        }

        Ok(TypeId::UNIT)
    }
}

// CREATION

impl TypeChecker {
    pub(super) fn check_array_create(
        &mut self,
        type_name: &mut TypeName,
        size: &mut Expr,
        init: &mut Expr,
        line: Line,
    ) -> Result<TypeId, Error> {
        let ty = self.resolve_type_name(type_name)?;
        if self.types().actual_kind(ty) != TypeKind::Array {
            return Err(Error::new(
                ErrorImpl::NotAnArray {
                    type_: self.type_name(ty),
                },
                line,
            ));
        }

        let size_ty = self.check_expr(size)?;
        self.expect_int(size_ty, size.line, |received| {
            ErrorImpl::ArraySizeNotInteger { received }
        })?;

        let init_ty = self.check_expr(init)?;
        let element = self.types().actual_type(ty);
        if !self.types().is_assignable(element, init_ty) {
            return Err(Error::new(
                ErrorImpl::ArrayInitMatchError {
                    expected: self.type_name(element),
                    received: self.type_name(init_ty),
                },
                line,
            ));
        }

        Ok(ty)
    }

    pub(super) fn check_record_create(
        &mut self,
        type_name: &mut TypeName,
        fields: &mut [FieldInit],
        line: Line,
    ) -> Result<TypeId, Error> {
        let ty = self.resolve_type_name(type_name)?;
        let declared = match self.types().record_fields(ty) {
            Some(declared) => declared.to_vec(),
            None => {
                return Err(Error::new(
                    ErrorImpl::NotARecord {
                        type_: self.type_name(ty),
                    },
                    line,
                ))
            }
        };

        let mut initialised = HashSet::new();
        for field in fields.iter_mut() {
            let value_ty = self.check_expr(&mut field.value)?;

            let field_ty = match declared.iter().find(|(name, _)| *name == field.name) {
                Some((_, field_ty)) => *field_ty,
                None => {
                    return Err(Error::new(
                        ErrorImpl::NoSuchField {
                            record: self.type_name(ty),
                            field: field.name.clone(),
                        },
                        field.line,
                    ))
                }
            };

            if !initialised.insert(field.name.clone()) {
                return Err(Error::new(
                    ErrorImpl::FieldAlreadyInitialised {
                        field: field.name.clone(),
                    },
                    field.line,
                ));
            }

            if !self.types().is_assignable(field_ty, value_ty) {
                return Err(Error::new(
                    ErrorImpl::FieldTypeMatchError {
                        field: field.name.clone(),
                        expected: self.type_name(field_ty),
                        received: self.type_name(value_ty),
                    },
                    field.line,
                ));
            }
        }

        if let Some((missing, _)) = declared.iter().find(|(name, _)| !initialised.contains(name)) {
            return Err(Error::new(
                ErrorImpl::MissingFieldInit {
                    record: self.type_name(ty),
                    field: missing.clone(),
                },
                line,
            ));
        }

        Ok(ty)
    }
}

// CONTROL FLOW

impl TypeChecker {
    pub(super) fn check_if(
        &mut self,
        condition: &mut Expr,
        then_branch: &mut Expr,
        else_branch: Option<&mut Expr>,
    ) -> Result<TypeId, Error> {
        let condition_ty = self.check_expr(condition)?;
        self.expect_int(condition_ty, condition.line, |received| {
            ErrorImpl::ConditionNotInteger { received }
        })?;

        let then_ty = self.check_expr(then_branch)?;

        match else_branch {
            Some(else_branch) => {
                let else_ty = self.check_expr(else_branch)?;
                if !self.branches_agree(then_ty, else_ty) {
                    return Err(Error::new(
                        ErrorImpl::BranchTypeMatchError {
                            then_type: self.type_name(then_ty),
                            else_type: self.type_name(else_ty),
                        },
                        else_branch.line,
                    ));
                }
            }
            None => {
                if !self.types().is_unit(then_ty) {
                    return Err(Error::new(
                        ErrorImpl::ThenBranchNotUnit {
                            received: self.type_name(then_ty),
                        },
                        then_branch.line,
                    ));
                }
            }
        }

        Ok(then_ty)
    }

    /// Same actual type, or a record on one side and `nil` on the other.
    fn branches_agree(&self, then_ty: TypeId, else_ty: TypeId) -> bool {
        let types = self.types();
        let is_record = |ty| types.actual_kind(ty) == TypeKind::Record;

        types.actual_type(then_ty) == types.actual_type(else_ty)
            || (is_record(then_ty) && else_ty == TypeId::UNIT)
            || (then_ty == TypeId::UNIT && is_record(else_ty))
    }

    pub(super) fn check_while(&mut self, condition: &mut Expr, body: &mut Expr) -> Result<TypeId, Error> {
        let condition_ty = self.check_expr(condition)?;
        self.expect_int(condition_ty, condition.line, |received| {
            ErrorImpl::ConditionNotInteger { received }
        })?;

        let body_ty = self.scoped(ScopeOrigin::While, |checker| checker.check_expr(body))?;
        if !self.types().is_unit(body_ty) {
            return Err(Error::new(
                ErrorImpl::LoopBodyNotUnit {
                    received: self.type_name(body_ty),
                },
                body.line,
            ));
        }

        Ok(TypeId::UNIT)
    }

    pub(super) fn check_for(
        &mut self,
        variable: &str,
        init: &mut Expr,
        bound: &mut Expr,
        body: &mut Expr,
        line: Line,
    ) -> Result<TypeId, Error> {
        for range in [init, bound] {
            let ty = self.check_expr(range)?;
            self.expect_int(ty, range.line, |received| {
                ErrorImpl::LoopRangeNotInteger { received }
            })?;
        }

        self.scoped(ScopeOrigin::For, |checker| {
            checker.table.add_symbol(
                variable,
                Symbol::Variable(VarSymbol {
                    ty: TypeId::INT,
                    slot: None,
                    read_only: true,
                }),
                line,
            )?;
            checker.check_expr(body)
        })?;

        Ok(TypeId::UNIT)
    }
}
