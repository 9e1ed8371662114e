use std::{cell::RefCell, io::Write, rc::Rc};

use log::{debug, info, trace, warn};

use crate::{
    ast::{
        ast::{Expr, ExprKind, FieldInit, Operator, Program},
        declarations::{Decl, DeclKind},
    },
    builtins::BUILTINS,
    errors::errors::{Error, ErrorImpl},
    symbol_table::{
        symbol_table::{FuncSymbol, FunctionBody, ScopeId, ScopeOrigin, Symbol, SymbolTable, VarSymbol},
        types::{TypeId, TypeTable},
    },
    Line,
};

use super::value::{Place, Value};

/// Outcome of evaluating a node.
///
/// `BrokeOut` travels up from a `break` to the nearest enclosing loop, which
/// absorbs it. `Completed(None)` is the result of a node without a value.
#[derive(Debug, Clone)]
pub enum Flow<T = Option<Value>> {
    Completed(T),
    BrokeOut,
}

/// Unwraps a completed flow or returns `BrokeOut` from the calling function.
macro_rules! completed {
    ($flow:expr) => {
        match $flow? {
            Flow::Completed(value) => value,
            Flow::BrokeOut => return Ok(Flow::BrokeOut),
        }
    };
}

fn expect_value(value: Option<Value>, line: Line) -> Result<Value, Error> {
    value.ok_or_else(|| Error::invariant("expression produced no value", line))
}

fn expect_int(value: Option<Value>, line: Line) -> Result<i64, Error> {
    let value = expect_value(value, line)?;
    value.as_int().ok_or_else(|| {
        Error::invariant(
            format!("expected an int, found a {}", value.type_name()),
            line,
        )
    })
}

/// Value stored in a variable or parameter. A `unit` result binds as `nil`.
fn bindable(value: Option<Value>) -> Value {
    value.unwrap_or_else(Value::nil)
}

/// Tree-walking evaluator over a type-checked program.
///
/// Output of `print` and `printi` goes to `out`.
pub struct Interpreter<'ast, W: Write> {
    table: SymbolTable<'ast>,
    out: W,
}

impl<'ast, W: Write> Interpreter<'ast, W> {
    pub fn new(types: TypeTable, out: W) -> Self {
        Interpreter {
            table: SymbolTable::new(types),
            out,
        }
    }

    /// Runs `eval` inside a fresh scope linked to `parent`, popping it
    /// whatever the outcome.
    fn scoped<T>(
        &mut self,
        origin: ScopeOrigin,
        parent: Option<ScopeId>,
        eval: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.table.push_scope_within(origin, parent);
        let result = eval(self);
        self.table.pop_scope()?;
        result
    }

    /// Evaluates `expr` and records the value in its value slot.
    pub fn evaluate(&mut self, expr: &'ast Expr) -> Result<Flow, Error> {
        let flow = self.evaluate_kind(expr)?;
        if let Flow::Completed(value) = &flow {
            expr.record_value(value.clone());
        }
        Ok(flow)
    }

    fn evaluate_kind(&mut self, expr: &'ast Expr) -> Result<Flow, Error> {
        let line = expr.line;
        match &expr.kind {
            ExprKind::Nil => Ok(Flow::Completed(Some(Value::nil()))),
            ExprKind::Break => Ok(Flow::BrokeOut),
            ExprKind::Int(value) => Ok(Flow::Completed(Some(Value::Int(*value)))),
            ExprKind::Str(value) => Ok(Flow::Completed(Some(Value::String(value.clone())))),
            ExprKind::Identifier(_) | ExprKind::Subscript { .. } | ExprKind::Field { .. } => {
                let place = completed!(self.place(expr));
                let value = place
                    .read()
                    .ok_or_else(|| Error::invariant("location vanished before it was read", line))?;
                Ok(Flow::Completed(Some(value)))
            }
            ExprKind::Sequence(expressions) => self.evaluate_sequence(expressions),
            ExprKind::Negation(operand) => {
                let value = expect_int(completed!(self.evaluate(operand)), operand.line)?;
                Ok(Flow::Completed(Some(Value::Int(value.wrapping_neg()))))
            }
            ExprKind::Call {
                function,
                arguments,
            } => self.evaluate_call(function, arguments, line),
            ExprKind::Infix {
                operator,
                left,
                right,
            } => self.evaluate_infix(*operator, left, right, line),
            ExprKind::ArrayCreate { size, init, .. } => {
                let size = expect_int(completed!(self.evaluate(size)), size.line)?;
                let fill = bindable(completed!(self.evaluate(init)));
                if size < 0 {
                    warn!("array of negative size {} at line {}, created empty", size, line);
                }
                Ok(Flow::Completed(Some(Value::new_array(size, &fill))))
            }
            ExprKind::RecordCreate { fields, .. } => self.evaluate_record(fields),
            ExprKind::Assignment { target, value } => self.evaluate_assignment(target, value, line),
            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = expect_int(completed!(self.evaluate(condition)), condition.line)?;
                if condition != 0 {
                    self.evaluate(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.evaluate(else_branch)
                } else {
                    Ok(Flow::Completed(None))
                }
            }
            ExprKind::While { condition, body } => self.evaluate_while(condition, body),
            ExprKind::For {
                variable,
                init,
                bound,
                body,
            } => self.evaluate_for(variable, init, bound, body, line),
            ExprKind::Let { declarations, body } => self.evaluate_let(declarations, body),
        }
    }

    /// Locates the storage an lvalue designates.
    fn place(&mut self, expr: &'ast Expr) -> Result<Flow<Place>, Error> {
        let line = expr.line;
        match &expr.kind {
            ExprKind::Identifier(name) => match self.table.lookup_symbol(name) {
                Some(Symbol::Variable(VarSymbol {
                    slot: Some(slot), ..
                })) => Ok(Flow::Completed(Place::Variable(Rc::clone(slot)))),
                _ => Err(Error::invariant(
                    format!("no storage for variable \"{}\"", name),
                    line,
                )),
            },
            ExprKind::Subscript { target, index } => {
                let array = expect_value(completed!(self.evaluate(target)), target.line)?;
                let index = expect_int(completed!(self.evaluate(index)), index.line)?;

                let elements = match array {
                    Value::Array(elements) => elements,
                    other => {
                        return Err(Error::invariant(
                            format!("subscript of a {}", other.type_name()),
                            line,
                        ))
                    }
                };

                let length = elements.borrow().len();
                match usize::try_from(index) {
                    Ok(position) if position < length => {
                        Ok(Flow::Completed(Place::Element(elements, position)))
                    }
                    _ => Err(Error::new(
                        ErrorImpl::ArrayIndexOutOfBounds { index, length },
                        line,
                    )),
                }
            }
            ExprKind::Field { target, field } => {
                let record = expect_value(completed!(self.evaluate(target)), target.line)?;

                let fields = match record {
                    Value::Record(fields) => fields,
                    other => {
                        return Err(Error::invariant(
                            format!("field access on a {}", other.type_name()),
                            line,
                        ))
                    }
                };

                let position = fields.borrow().iter().position(|(name, _)| name == field);
                match position {
                    Some(position) => Ok(Flow::Completed(Place::Field(fields, position))),
                    None => Err(Error::invariant(
                        format!("record has no field \"{}\"", field),
                        line,
                    )),
                }
            }
            _ => Err(Error::invariant("assignment to a non-lvalue", line)),
        }
    }

    fn evaluate_sequence(&mut self, expressions: &'ast [Expr]) -> Result<Flow, Error> {
        let mut last = None;
        for expression in expressions {
            last = completed!(self.evaluate(expression));
        }
        Ok(Flow::Completed(last))
    }

    fn evaluate_infix(
        &mut self,
        operator: Operator,
        left: &'ast Expr,
        right: &'ast Expr,
        line: Line,
    ) -> Result<Flow, Error> {
        let left_value = expect_value(completed!(self.evaluate(left)), left.line)?;

        // `&` and `|` skip the right operand once the left one decides
        match operator {
            Operator::And if left_value.as_int() == Some(0) => {
                return Ok(Flow::Completed(Some(Value::Int(0))))
            }
            Operator::Or if left_value.as_int().is_some_and(|value| value != 0) => {
                return Ok(Flow::Completed(Some(Value::Int(1))))
            }
            _ => {}
        }

        let right_value = expect_value(completed!(self.evaluate(right)), right.line)?;

        let result = if operator.is_arithmetic() {
            let left = expect_int(Some(left_value), left.line)?;
            let right = expect_int(Some(right_value), right.line)?;
            match operator {
                Operator::Add => left.wrapping_add(right),
                Operator::Subtract => left.wrapping_sub(right),
                Operator::Multiply => left.wrapping_mul(right),
                Operator::Divide => {
                    if right == 0 {
                        return Err(Error::new(ErrorImpl::DivisionByZero, line));
                    }
                    left.wrapping_div(right)
                }
                // `&` and `|` whose left operand did not decide
                _ => i64::from(right != 0),
            }
        } else {
            let mismatch = || {
                Error::invariant(
                    format!(
                        "cannot compare a {} with a {}",
                        left_value.type_name(),
                        right_value.type_name()
                    ),
                    line,
                )
            };
            let holds = match operator {
                Operator::Eq => left_value.equals(&right_value).ok_or_else(mismatch)?,
                Operator::Neq => !left_value.equals(&right_value).ok_or_else(mismatch)?,
                _ => {
                    let ordering = left_value.compare(&right_value).ok_or_else(mismatch)?;
                    match operator {
                        Operator::Lt => ordering.is_lt(),
                        Operator::Leq => ordering.is_le(),
                        Operator::Gt => ordering.is_gt(),
                        _ => ordering.is_ge(),
                    }
                }
            };
            i64::from(holds)
        };

        Ok(Flow::Completed(Some(Value::Int(result))))
    }

    fn evaluate_call(
        &mut self,
        function: &str,
        arguments: &'ast [Expr],
        line: Line,
    ) -> Result<Flow, Error> {
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(bindable(completed!(self.evaluate(argument))));
        }

        if let Some(builtin) = BUILTINS.get(function) {
            trace!("builtin {} at line {}", builtin.name(), line);
            let result = builtin.invoke(&values, &mut self.out, line)?;
            return Ok(Flow::Completed(result));
        }

        let symbol: FuncSymbol<'ast> = match self.table.lookup_symbol(function) {
            Some(Symbol::Function(symbol)) => symbol.clone(),
            _ => {
                return Err(Error::invariant(
                    format!("\"{}\" is not a callable function", function),
                    line,
                ))
            }
        };

        match symbol.body {
            FunctionBody::Declared(body) => {
                if symbol.params.len() != values.len() {
                    return Err(Error::invariant(
                        format!(
                            "\"{}\" takes {} parameters, called with {}",
                            function,
                            symbol.params.len(),
                            values.len()
                        ),
                        line,
                    ));
                }

                trace!("call {} at line {}, depth {}", function, line, self.table.depth());
                let flow = self.scoped(ScopeOrigin::Function, Some(symbol.scope), |interpreter| {
                    for ((name, ty), value) in symbol.params.iter().zip(values) {
                        interpreter.table.add_symbol(
                            name,
                            Symbol::Variable(VarSymbol {
                                ty: *ty,
                                slot: Some(Rc::new(RefCell::new(value))),
                                read_only: false,
                            }),
                            line,
                        )?;
                    }
                    interpreter.evaluate(body)
                })?;

                match flow {
                    Flow::Completed(result) => Ok(Flow::Completed(result.map(|value| value.deep_copy()))),
                    Flow::BrokeOut => Err(Error::new(
                        ErrorImpl::BreakEscapedFunction {
                            function: String::from(function),
                        },
                        line,
                    )),
                }
            }
            FunctionBody::Builtin(_) | FunctionBody::Signature => Err(Error::invariant(
                format!("function \"{}\" has no body", function),
                line,
            )),
        }
    }

    fn evaluate_record(&mut self, fields: &'ast [FieldInit]) -> Result<Flow, Error> {
        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            let value = bindable(completed!(self.evaluate(&field.value)));
            values.push((field.name.clone(), value.deep_copy()));
        }
        Ok(Flow::Completed(Some(Value::new_record(values))))
    }

    fn evaluate_assignment(
        &mut self,
        target: &'ast Expr,
        value: &'ast Expr,
        line: Line,
    ) -> Result<Flow, Error> {
        let place = completed!(self.place(target));
        let value = bindable(completed!(self.evaluate(value)));

        if place.store(&value).is_none() {
            return Err(match &place {
                Place::Element(elements, index) => Error::new(
                    ErrorImpl::ArrayIndexOutOfBounds {
                        index: i64::try_from(*index).unwrap_or(i64::MAX),
                        length: elements.borrow().len(),
                    },
                    target.line,
                ),
                _ => Error::invariant("assignment target vanished", line),
            });
        }
        target.record_value(place.read());

        Ok(Flow::Completed(None))
    }

    fn evaluate_while(&mut self, condition: &'ast Expr, body: &'ast Expr) -> Result<Flow, Error> {
        let mut iterations = 0usize;
        loop {
            let holds = expect_int(completed!(self.evaluate(condition)), condition.line)?;
            if holds == 0 {
                break;
            }

            trace!("while at line {}: iteration {}", condition.line, iterations);
            iterations += 1;
            if let Flow::BrokeOut = self.evaluate(body)? {
                debug!("while at line {}: break after {} iterations", condition.line, iterations);
                break;
            }
        }
        Ok(Flow::Completed(None))
    }

    fn evaluate_for(
        &mut self,
        variable: &str,
        init: &'ast Expr,
        bound: &'ast Expr,
        body: &'ast Expr,
        line: Line,
    ) -> Result<Flow, Error> {
        let start = expect_int(completed!(self.evaluate(init)), init.line)?;
        let bound = expect_int(completed!(self.evaluate(bound)), bound.line)?;

        let parent = self.table.current_id();
        self.scoped(ScopeOrigin::For, parent, |interpreter| {
            let counter = Rc::new(RefCell::new(Value::Int(start)));
            interpreter.table.add_symbol(
                variable,
                Symbol::Variable(VarSymbol {
                    ty: TypeId::INT,
                    slot: Some(Rc::clone(&counter)),
                    read_only: true,
                }),
                line,
            )?;

            for i in start..bound {
                *counter.borrow_mut() = Value::Int(i);
                trace!("for {} at line {}: {} = {}", variable, line, variable, i);
                if let Flow::BrokeOut = interpreter.evaluate(body)? {
                    debug!("for {} at line {}: break at {}", variable, line, i);
                    break;
                }
            }
            Ok(Flow::Completed(None))
        })
    }

    fn evaluate_let(&mut self, declarations: &'ast [Decl], body: &'ast [Expr]) -> Result<Flow, Error> {
        let parent = self.table.current_id();
        self.scoped(ScopeOrigin::Let, parent, |interpreter| {
            interpreter.declare_functions(declarations)?;

            for decl in declarations {
                if let DeclKind::Var(var) = &decl.kind {
                    let value = bindable(completed!(interpreter.evaluate(&var.init)));
                    let ty = decl.ty.ok_or_else(|| {
                        Error::invariant(format!("variable \"{}\" was never typed", var.name), decl.line)
                    })?;
                    interpreter.table.add_symbol(
                        &var.name,
                        Symbol::Variable(VarSymbol {
                            ty,
                            slot: Some(Rc::new(RefCell::new(value))),
                            read_only: false,
                        }),
                        decl.line,
                    )?;
                }
            }

            let last = completed!(interpreter.evaluate_sequence(body));
            Ok(Flow::Completed(last.map(|value| value.deep_copy())))
        })
    }

    /// Binds every function of a `let` before any variable is initialised.
    fn declare_functions(&mut self, declarations: &'ast [Decl]) -> Result<(), Error> {
        let scope = self.table.current_id().unwrap_or_default();

        for decl in declarations {
            if let DeclKind::Function(function) = &decl.kind {
                let return_type = decl.ty.ok_or_else(|| {
                    Error::invariant(
                        format!("function \"{}\" was never typed", function.name),
                        decl.line,
                    )
                })?;
                self.table.add_symbol(
                    &function.name,
                    Symbol::Function(FuncSymbol {
                        return_type,
                        params: function.get_params(),
                        body: FunctionBody::Declared(&function.body),
                        scope,
                    }),
                    decl.line,
                )?;
            }
        }

        Ok(())
    }
}

/// Evaluates a type-checked `program`, writing its output to `out`.
///
/// `types` is the arena the type checker filled for this program. Returns
/// the value of the root expression, if it has one.
pub fn interpret<W: Write>(
    program: &Program,
    types: TypeTable,
    out: &mut W,
) -> Result<Option<Value>, Error> {
    let result = {
        let mut interpreter = Interpreter::new(types, &mut *out);
        match interpreter.evaluate(program.root())? {
            Flow::Completed(value) => value,
            Flow::BrokeOut => {
                return Err(Error::invariant(
                    "break outside of any loop",
                    program.root().line,
                ))
            }
        }
    };

    out.flush().map_err(|error| {
        Error::new(
            ErrorImpl::Output {
                message: error.to_string(),
            },
            Line::null(),
        )
    })?;

    info!("program finished");
    Ok(result)
}
