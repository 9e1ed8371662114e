use std::collections::{HashMap, HashSet};

use log::debug;

use crate::{
    ast::{
        ast::{Expr, ExprKind},
        declarations::{Decl, DeclKind, FunctionDecl, TypeDef, VarDecl},
    },
    builtins::BUILTINS,
    errors::errors::{Error, ErrorImpl},
    symbol_table::{
        symbol_table::{FuncSymbol, FunctionBody, ScopeOrigin, Symbol, VarSymbol},
        types::{Type, TypeId},
    },
    Line,
};

use super::type_checker::TypeChecker;

impl TypeChecker {
    /// Checks the head of a `let` in the current scope.
    ///
    /// Type names and function signatures are all registered before any
    /// definition or body is checked, so both may refer forwards.
    pub(super) fn check_declarations(&mut self, declarations: &mut [Decl]) -> Result<(), Error> {
        debug!("let phase 1: types");
        self.declare_types(declarations)?;
        self.define_types(declarations)?;

        debug!("let phase 2: function signatures");
        for decl in declarations.iter_mut() {
            if let DeclKind::Function(function) = &mut decl.kind {
                decl.ty = Some(self.resolve_signature(function)?);
            }
        }

        debug!("let phase 3: function symbols");
        self.declare_functions(declarations)?;

        debug!("let phase 4: declarations");
        let reach = call_reach(declarations);
        for (position, decl) in declarations.iter_mut().enumerate() {
            let line = decl.line;
            match &mut decl.kind {
                DeclKind::Type(_) => {}
                DeclKind::Var(var) => {
                    let ty = self.check_var_decl(var, line)?;
                    check_forward_calls(var, position, &reach, line)?;
                    decl.ty = Some(ty);
                }
                DeclKind::Function(function) => self.check_function_body(function, line)?,
            }
        }

        debug!("let phase 5: body");
        Ok(())
    }

    fn declare_types(&mut self, declarations: &mut [Decl]) -> Result<(), Error> {
        for decl in declarations.iter_mut() {
            if let DeclKind::Type(type_decl) = &decl.kind {
                let id = self.table.types_mut().declare(&type_decl.name);
                self.table.add_type(&type_decl.name, id, decl.line)?;
                decl.ty = Some(id);
            }
        }
        Ok(())
    }

    fn define_types(&mut self, declarations: &mut [Decl]) -> Result<(), Error> {
        let mut defined = vec![];

        for decl in declarations.iter_mut() {
            let (type_decl, id) = match (&mut decl.kind, decl.ty) {
                (DeclKind::Type(type_decl), Some(id)) => (type_decl, id),
                _ => continue,
            };

            let definition = match &mut type_decl.definition {
                TypeDef::Alias(target) => Type::Alias(self.resolve_type_name(target)?),
                TypeDef::Array(element) => Type::Array(self.resolve_type_name(element)?),
                TypeDef::Record(fields) => {
                    let mut resolved: Vec<(String, TypeId)> = Vec::with_capacity(fields.len());
                    for field in fields.iter_mut() {
                        if resolved.iter().any(|(name, _)| *name == field.name) {
                            return Err(Error::new(
                                ErrorImpl::FieldAlreadyDeclared {
                                    record: type_decl.name.clone(),
                                    field: field.name.clone(),
                                },
                                field.line,
                            ));
                        }
                        resolved.push((field.name.clone(), self.resolve_type_name(&mut field.type_name)?));
                    }
                    Type::Record(resolved)
                }
            };

            self.table.types_mut().define(id, definition);
            defined.push((id, decl.line));
        }

        for (id, line) in defined {
            if self.types().has_alias_cycle(id) {
                return Err(Error::new(
                    ErrorImpl::IllegalTypeCycle {
                        type_: self.type_name(id),
                    },
                    line,
                ));
            }
        }

        Ok(())
    }

    /// Resolves parameter and result types. A missing result type is `unit`.
    fn resolve_signature(&mut self, function: &mut FunctionDecl) -> Result<TypeId, Error> {
        for param in function.params.iter_mut() {
            self.resolve_type_name(&mut param.type_name)?;
        }

        match &mut function.return_type {
            Some(return_type) => self.resolve_type_name(return_type),
            None => Ok(TypeId::UNIT),
        }
    }

    fn declare_functions(&mut self, declarations: &[Decl]) -> Result<(), Error> {
        let scope = self.table.current_id().unwrap_or_default();
        let mut names = HashSet::new();

        for decl in declarations {
            let (function, return_type) = match (&decl.kind, decl.ty) {
                (DeclKind::Function(function), Some(return_type)) => (function, return_type),
                _ => continue,
            };

            if !names.insert(function.name.as_str()) {
                return Err(Error::new(
                    ErrorImpl::FunctionAlreadyDeclared {
                        function: function.name.clone(),
                    },
                    decl.line,
                ));
            }

            self.table.add_symbol(
                &function.name,
                Symbol::Function(FuncSymbol {
                    return_type,
                    params: function.get_params(),
                    body: FunctionBody::Signature,
                    scope,
                }),
                decl.line,
            )?;
        }

        Ok(())
    }

    /// Checks the initializer, then binds the variable in the current scope.
    fn check_var_decl(&mut self, var: &mut VarDecl, line: Line) -> Result<TypeId, Error> {
        let init_ty = self.check_expr(&mut var.init)?;

        let declared = match &mut var.type_name {
            Some(type_name) => self.resolve_type_name(type_name)?,
            None if matches!(var.init.kind, ExprKind::Nil) => {
                return Err(Error::new(
                    ErrorImpl::NilWithoutRecordType {
                        variable: var.name.clone(),
                    },
                    line,
                ))
            }
            None => init_ty,
        };

        if !self.types().is_assignable(declared, init_ty) {
            return Err(Error::new(
                ErrorImpl::VariableTypeMatchError {
                    variable: var.name.clone(),
                    expected: self.type_name(declared),
                    received: self.type_name(init_ty),
                },
                line,
            ));
        }

        self.table.add_symbol(
            &var.name,
            Symbol::Variable(VarSymbol {
                ty: declared,
                slot: None,
                read_only: false,
            }),
            line,
        )?;

        Ok(declared)
    }

    fn check_function_body(&mut self, function: &mut FunctionDecl, line: Line) -> Result<(), Error> {
        let params = function.get_params();
        let return_type = match &function.return_type {
            Some(type_name) => type_name.ty.unwrap_or(TypeId::UNIT),
            None => TypeId::UNIT,
        };

        let body_ty = self.scoped(ScopeOrigin::Function, |checker| {
            for (name, ty) in params {
                checker.table.add_symbol(
                    &name,
                    Symbol::Variable(VarSymbol {
                        ty,
                        slot: None,
                        read_only: false,
                    }),
                    line,
                )?;
            }
            checker.check_expr(&mut function.body)
        })?;

        let types = self.types();
        if !types.is_assignable(return_type, body_ty) && !types.is_assignable(body_ty, return_type) {
            return Err(Error::new(
                ErrorImpl::ReturnTypeMatchError {
                    function: function.name.clone(),
                    expected: self.type_name(return_type),
                    received: self.type_name(body_ty),
                },
                line,
            ));
        }

        Ok(())
    }
}

/// For every function of a `let`, the latest declaration position it can
/// reach through calls to functions of the same `let`, itself included.
fn call_reach(declarations: &[Decl]) -> HashMap<String, usize> {
    let functions: HashMap<&str, (usize, Vec<&str>)> = declarations
        .iter()
        .enumerate()
        .filter_map(|(position, decl)| match &decl.kind {
            DeclKind::Function(function) => {
                let mut callees = vec![];
                collect_calls(&function.body, &mut callees);
                Some((function.name.as_str(), (position, callees)))
            }
            _ => None,
        })
        .collect();

    functions
        .keys()
        .map(|name| {
            let mut reach = 0;
            let mut seen = HashSet::new();
            let mut pending = vec![*name];
            while let Some(current) = pending.pop() {
                if !seen.insert(current) {
                    continue;
                }
                if let Some((position, callees)) = functions.get(current) {
                    reach = reach.max(*position);
                    pending.extend(callees.iter().copied());
                }
            }
            (String::from(*name), reach)
        })
        .collect()
}

/// A variable initialiser may only call functions of its own `let` whose
/// calls stay among declarations before the variable. Anything later could
/// read a variable that is not bound yet.
fn check_forward_calls(
    var: &VarDecl,
    position: usize,
    reach: &HashMap<String, usize>,
    line: Line,
) -> Result<(), Error> {
    let mut calls = vec![];
    collect_calls(&var.init, &mut calls);

    for function in calls {
        if reach.get(function).is_some_and(|reach| *reach > position) {
            return Err(Error::new(
                ErrorImpl::CallBeforeDeclaration {
                    variable: var.name.clone(),
                    function: String::from(function),
                },
                line,
            ));
        }
    }
    Ok(())
}

/// Names of the user functions called anywhere inside `expr`. Built-ins are
/// skipped, calls to them never reach user code.
fn collect_calls<'e>(expr: &'e Expr, calls: &mut Vec<&'e str>) {
    match &expr.kind {
        ExprKind::Nil
        | ExprKind::Break
        | ExprKind::Int(_)
        | ExprKind::Str(_)
        | ExprKind::Identifier(_) => {}
        ExprKind::Subscript { target, index } => {
            collect_calls(target, calls);
            collect_calls(index, calls);
        }
        ExprKind::Field { target, .. } => collect_calls(target, calls),
        ExprKind::Sequence(expressions) => {
            for expression in expressions {
                collect_calls(expression, calls);
            }
        }
        ExprKind::Negation(operand) => collect_calls(operand, calls),
        ExprKind::Call {
            function,
            arguments,
        } => {
            if !BUILTINS.contains_key(function.as_str()) {
                calls.push(function);
            }
            for argument in arguments {
                collect_calls(argument, calls);
            }
        }
        ExprKind::Infix { left, right, .. } => {
            collect_calls(left, calls);
            collect_calls(right, calls);
        }
        ExprKind::ArrayCreate { size, init, .. } => {
            collect_calls(size, calls);
            collect_calls(init, calls);
        }
        ExprKind::RecordCreate { fields, .. } => {
            for field in fields {
                collect_calls(&field.value, calls);
            }
        }
        ExprKind::Assignment { target, value } => {
            collect_calls(target, calls);
            collect_calls(value, calls);
        }
        ExprKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            collect_calls(condition, calls);
            collect_calls(then_branch, calls);
            if let Some(else_branch) = else_branch {
                collect_calls(else_branch, calls);
            }
        }
        ExprKind::While { condition, body } => {
            collect_calls(condition, calls);
            collect_calls(body, calls);
        }
        ExprKind::For {
            init, bound, body, ..
        } => {
            collect_calls(init, calls);
            collect_calls(bound, calls);
            collect_calls(body, calls);
        }
        ExprKind::Let { declarations, body } => {
            for decl in declarations {
                match &decl.kind {
                    DeclKind::Var(var) => collect_calls(&var.init, calls),
                    DeclKind::Function(function) => collect_calls(&function.body, calls),
                    DeclKind::Type(_) => {}
                }
            }
            for expression in body {
                collect_calls(expression, calls);
            }
        }
    }
}
