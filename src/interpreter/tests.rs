//! Unit tests for values and the interpreter.

use crate::{
    ast::{
        ast::{Expr, ExprKind, Operator, Program},
        declarations::{Decl, DeclKind},
    },
    errors::errors::{Error, ErrorCategory},
    interpreter::{
        interpreter::interpret,
        value::{Place, Value},
    },
    symbol_table::types::{TypeId, TypeTable},
    type_checker::type_checker::type_check,
};

use std::{cell::RefCell, rc::Rc};

fn run(root: Expr) -> (Result<Option<Value>, Error>, String) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut program = Program::new(root);
    let types = type_check(&mut program).unwrap();

    let mut out = vec![];
    let result = interpret(&program, types, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn value_of(root: Expr) -> i64 {
    run(root).0.unwrap().and_then(|value| value.as_int()).unwrap()
}

fn output_of(root: Expr) -> String {
    let (result, out) = run(root);
    result.unwrap();
    out
}

fn int(value: i64) -> Expr {
    Expr::int(1, value)
}

fn id(name: &str) -> Expr {
    Expr::id(1, name)
}

fn infix(left: Expr, operator: Operator, right: Expr) -> Expr {
    Expr::infix(1, left, operator, right)
}

fn printi(argument: Expr) -> Expr {
    Expr::call(1, "printi", vec![argument])
}

fn ints_of(name: &str, length: i64) -> Decl {
    Decl::var(1, name, None, Expr::array(1, "ints", int(length), int(0)))
}

// VALUES

#[test]
fn test_deep_copy_has_new_identity() {
    let array = Value::new_array(2, &Value::Int(5));
    let shared = array.clone();
    let copy = array.deep_copy();

    assert_eq!(array.equals(&shared), Some(true));
    assert_eq!(array.equals(&copy), Some(false));
    assert_eq!(array.to_string(), copy.to_string());
}

#[test]
fn test_fill_is_copied_per_element() {
    let row = Value::new_array(2, &Value::Int(0));
    let grid = Value::new_array(2, &row);

    let Value::Array(rows) = &grid else {
        panic!("Expected an array");
    };
    let rows = rows.borrow();
    assert_eq!(rows[0].equals(&rows[1]), Some(false));
    assert_eq!(rows[0].equals(&row), Some(false));
}

#[test]
fn test_negative_length() {
    assert_eq!(Value::new_array(-3, &Value::Int(1)).to_string(), "[]");
}

#[test]
fn test_scalar_equality() {
    assert_eq!(Value::Int(3).equals(&Value::Int(3)), Some(true));
    assert_eq!(
        Value::String("a".into()).equals(&Value::String("a".into())),
        Some(true)
    );
    assert_eq!(Value::Int(3).equals(&Value::String("3".into())), None);
    assert!(Value::String("a".into())
        .compare(&Value::String("b".into()))
        .is_some_and(|ordering| ordering.is_lt()));
    assert_eq!(Value::nil().compare(&Value::nil()), None);
}

#[test]
fn test_store_keeps_identity() {
    let slot = Rc::new(RefCell::new(Value::new_array(1, &Value::Int(0))));
    let before = slot.borrow().clone();
    let source = Value::new_array(3, &Value::Int(7));

    Place::Variable(Rc::clone(&slot)).store(&source).unwrap();

    let after = slot.borrow().clone();
    assert_eq!(after.equals(&before), Some(true));
    assert_eq!(after.equals(&source), Some(false));
    assert_eq!(before.to_string(), "[7, 7, 7]");
}

#[test]
fn test_store_to_stale_element() {
    let Value::Array(elements) = Value::new_array(1, &Value::Int(0)) else {
        panic!("Expected an array");
    };

    assert!(Place::Element(Rc::clone(&elements), 0).store(&Value::Int(1)).is_some());
    assert!(Place::Element(elements, 1).store(&Value::Int(1)).is_none());
}

#[test]
fn test_display() {
    let record = Value::new_record(vec![
        (String::from("x"), Value::Int(1)),
        (String::from("name"), Value::String("p".into())),
    ]);

    assert_eq!(record.to_string(), "{x = 1, name = p}");
    assert_eq!(Value::nil().to_string(), "nil");
}

// EXPRESSIONS

#[test]
fn test_arithmetic() {
    assert_eq!(value_of(infix(int(7), Operator::Divide, int(2))), 3);
    assert_eq!(value_of(infix(int(7), Operator::Subtract, int(9))), -2);
    assert_eq!(value_of(Expr::neg(1, int(4))), -4);
    assert_eq!(value_of(infix(int(i64::MAX), Operator::Add, int(1))), i64::MIN);
}

#[test]
fn test_division_by_zero() {
    let (result, _) = run(Expr::infix(6, int(1), Operator::Divide, int(0)));
    let error = result.unwrap_err();

    assert_eq!(error.get_category(), ErrorCategory::Runtime);
    assert_eq!(error.get_error_name(), "DivisionByZero");
    assert_eq!(error.get_line().0, 6);
}

#[test]
fn test_short_circuit() {
    let divide_by_zero = || infix(int(1), Operator::Divide, int(0));

    assert_eq!(value_of(infix(int(0), Operator::And, divide_by_zero())), 0);
    assert_eq!(value_of(infix(int(1), Operator::Or, divide_by_zero())), 1);
    assert_eq!(value_of(infix(int(1), Operator::And, int(5))), 1);
    assert_eq!(value_of(infix(int(0), Operator::Or, int(0))), 0);
    assert!(run(infix(int(1), Operator::And, divide_by_zero())).0.is_err());
}

#[test]
fn test_comparisons() {
    assert_eq!(value_of(infix(int(2), Operator::Leq, int(2))), 1);
    assert_eq!(value_of(infix(int(2), Operator::Gt, int(3))), 0);
    assert_eq!(value_of(infix(int(2), Operator::Neq, int(3))), 1);
    assert_eq!(
        value_of(infix(Expr::string(1, "abc"), Operator::Lt, Expr::string(1, "abd"))),
        1
    );
    assert_eq!(
        value_of(infix(Expr::string(1, "x"), Operator::Eq, Expr::string(1, "x"))),
        1
    );
}

#[test]
fn test_builtins() {
    let program = Expr::seq(
        1,
        vec![
            Expr::call(1, "print", vec![Expr::string(1, "n=")]),
            printi(Expr::call(1, "not", vec![int(0)])),
            printi(Expr::call(1, "not", vec![int(3)])),
        ],
    );
    assert_eq!(output_of(program), "n=10");
}

// LOOPS

#[test]
fn test_for_is_exclusive() {
    let program = Expr::for_loop(1, "i", int(0), int(4), printi(id("i")));
    assert_eq!(output_of(program), "0123");
}

#[test]
fn test_for_with_empty_range() {
    let program = Expr::for_loop(1, "i", int(3), int(1), printi(id("i")));
    assert_eq!(output_of(program), "");
}

#[test]
fn test_while() {
    let program = Expr::let_in(
        1,
        vec![Decl::var(1, "n", None, int(0))],
        vec![Expr::while_loop(
            2,
            infix(id("n"), Operator::Lt, int(3)),
            Expr::seq(
                2,
                vec![
                    printi(id("n")),
                    Expr::assign(2, id("n"), infix(id("n"), Operator::Add, int(1))),
                ],
            ),
        )],
    );
    assert_eq!(output_of(program), "012");
}

#[test]
fn test_break_stops_innermost_loop() {
    let inner = Expr::for_loop(
        2,
        "j",
        int(0),
        int(10),
        Expr::seq(
            2,
            vec![
                Expr::if_then(2, infix(id("j"), Operator::Eq, int(2)), Expr::brk(2)),
                printi(id("j")),
            ],
        ),
    );
    let program = Expr::for_loop(1, "i", int(0), int(2), Expr::seq(1, vec![inner, printi(int(9))]));

    assert_eq!(output_of(program), "019019");
}

// BINDINGS

fn with_ints(declarations: Vec<Decl>, body: Vec<Expr>) -> Expr {
    let mut all = vec![Decl::type_array(1, "ints", "int")];
    all.extend(declarations);
    Expr::let_in(1, all, body)
}

#[test]
fn test_var_binding_shares_storage() {
    let program = with_ints(
        vec![ints_of("a", 3), Decl::var(1, "b", None, id("a"))],
        vec![
            Expr::assign(2, Expr::subscript(2, id("b"), int(0)), int(5)),
            printi(Expr::subscript(3, id("a"), int(0))),
            printi(infix(id("a"), Operator::Eq, id("b"))),
        ],
    );
    assert_eq!(output_of(program), "51");
}

#[test]
fn test_assignment_copies() {
    let program = with_ints(
        vec![ints_of("a", 3), ints_of("b", 1)],
        vec![
            Expr::assign(2, id("b"), id("a")),
            Expr::assign(3, Expr::subscript(3, id("b"), int(2)), int(8)),
            printi(Expr::subscript(4, id("a"), int(2))),
            printi(Expr::subscript(4, id("b"), int(2))),
            printi(infix(id("a"), Operator::Eq, id("b"))),
        ],
    );
    assert_eq!(output_of(program), "080");
}

#[test]
fn test_array_parameter_is_shared() {
    let set = Decl::function(
        1,
        "set",
        &[("v", "ints")],
        None,
        Expr::assign(1, Expr::subscript(1, id("v"), int(0)), int(9)),
    );
    let program = with_ints(
        vec![ints_of("a", 3), set],
        vec![Expr::call(2, "set", vec![id("a")]), Expr::subscript(3, id("a"), int(0))],
    );
    assert_eq!(value_of(program), 9);
}

#[test]
fn test_int_parameter_is_local() {
    let bump = Decl::function(
        1,
        "bump",
        &[("n", "int")],
        None,
        Expr::assign(1, id("n"), infix(id("n"), Operator::Add, int(1))),
    );
    let program = Expr::let_in(
        1,
        vec![Decl::var(1, "x", None, int(1)), bump],
        vec![Expr::call(2, "bump", vec![id("x")]), id("x")],
    );
    assert_eq!(value_of(program), 1);
}

#[test]
fn test_call_result_is_copied() {
    let get = Decl::function(1, "get", &[], Some("ints"), id("a"));
    let program = with_ints(
        vec![ints_of("a", 2), get],
        vec![infix(Expr::call(2, "get", vec![]), Operator::Eq, id("a"))],
    );
    assert_eq!(value_of(program), 0);
}

#[test]
fn test_functions_are_lexically_scoped() {
    let program = Expr::let_in(
        1,
        vec![
            Decl::var(1, "x", None, int(1)),
            Decl::function(1, "f", &[], Some("int"), id("x")),
        ],
        vec![Expr::let_in(
            2,
            vec![Decl::var(2, "x", None, int(2))],
            vec![Expr::call(2, "f", vec![])],
        )],
    );
    assert_eq!(value_of(program), 1);
}

#[test]
fn test_same_name_in_separate_lets() {
    let block = |result| {
        Expr::let_in(
            1,
            vec![Decl::function(1, "f", &[], Some("int"), int(result))],
            vec![printi(Expr::call(1, "f", vec![]))],
        )
    };
    assert_eq!(output_of(Expr::seq(1, vec![block(1), block(2)])), "12");
}

#[test]
fn test_records() {
    let program = Expr::let_in(
        1,
        vec![
            Decl::type_record(1, "point", &[("x", "int"), ("y", "int")]),
            Decl::var(2, "p", None, Expr::record(2, "point", vec![("x", int(1)), ("y", int(2))])),
        ],
        vec![
            Expr::assign(3, Expr::field(3, id("p"), "y"), int(5)),
            printi(Expr::field(4, id("p"), "x")),
            printi(Expr::field(4, id("p"), "y")),
            printi(infix(id("p"), Operator::Eq, id("p"))),
            printi(infix(id("p"), Operator::Eq, Expr::nil(5))),
        ],
    );
    assert_eq!(output_of(program), "1510");
}

#[test]
fn test_nil_field_is_internal() {
    let program = Expr::let_in(
        1,
        vec![
            Decl::type_record(1, "point", &[("x", "int")]),
            Decl::var(2, "p", Some("point"), Expr::nil(2)),
        ],
        vec![Expr::field(3, id("p"), "x")],
    );
    let error = run(program).0.unwrap_err();

    assert_eq!(error.get_category(), ErrorCategory::Internal);
    assert_eq!(error.get_line().0, 3);
}

#[test]
fn test_value_slots() {
    let mut program = Program::new(Expr::let_in(
        1,
        vec![Decl::var(1, "x", None, int(4))],
        vec![infix(id("x"), Operator::Multiply, int(2))],
    ));
    let types = type_check(&mut program).unwrap();
    let mut out = vec![];
    let result = interpret(&program, types, &mut out).unwrap();

    assert_eq!(result.and_then(|value| value.as_int()), Some(8));
    assert_eq!(program.root().get_value().and_then(|value| value.as_int()), Some(8));

    let ExprKind::Let { declarations, body } = &program.root().kind else {
        panic!("Expected a let");
    };
    assert_eq!(body[0].get_value().and_then(|value| value.as_int()), Some(8));
    let DeclKind::Var(var) = &declarations[0].kind else {
        panic!("Expected a var");
    };
    assert_eq!(var.init.get_value().and_then(|value| value.as_int()), Some(4));
}

#[test]
fn test_builtins_are_called_by_name() {
    let program = Expr::let_in(
        1,
        vec![Decl::function(
            1,
            "printi",
            &[("i", "int")],
            None,
            Expr::call(1, "print", vec![Expr::string(1, "user")]),
        )],
        vec![printi(int(3))],
    );
    assert_eq!(output_of(program), "3");
}

#[test]
fn test_initialiser_calls_earlier_function() {
    let program = Expr::let_in(
        1,
        vec![
            Decl::function(1, "f", &[], Some("int"), int(4)),
            Decl::var(2, "a", None, Expr::call(2, "f", vec![])),
            Decl::function(3, "g", &[], Some("int"), infix(id("a"), Operator::Add, int(1))),
        ],
        vec![Expr::call(4, "g", vec![])],
    );
    assert_eq!(value_of(program), 5);
}

// INVARIANTS

#[test]
fn test_break_escaping_function() {
    // Built without the type checker, which rejects this program.
    let mut function = Decl::function(1, "f", &[], None, Expr::brk(1));
    function.ty = Some(TypeId::UNIT);
    let program = Program::new(Expr::let_in(
        1,
        vec![function],
        vec![Expr::while_loop(2, int(1), Expr::call(2, "f", vec![]))],
    ));

    let mut out = vec![];
    let error = interpret(&program, TypeTable::new(), &mut out).unwrap_err();

    assert_eq!(error.get_error_name(), "BreakEscapedFunction");
    assert_eq!(error.get_category(), ErrorCategory::Internal);
}

#[test]
fn test_untyped_tree() {
    let program = Program::new(Expr::let_in(1, vec![Decl::var(1, "x", None, int(1))], vec![]));

    let mut out = vec![];
    let error = interpret(&program, TypeTable::new(), &mut out).unwrap_err();

    assert_eq!(error.get_error_name(), "InvariantViolation");
}
