//! Operators and coercions, checked through global bindings

use pretty_assertions::assert_eq;

use super::helpers::{build, global, run_all};
use crate::executor::{Interpreter, LogKind, Val};

fn run(source: &str) -> Interpreter {
    let mut interp = build(source);
    run_all(&mut interp);
    assert!(
        interp.state().error.is_none(),
        "unexpected error: {:?}",
        interp.state().error
    );
    interp
}

fn value_of(expression: &str) -> Val {
    let interp = run(&format!("let result = {};", expression));
    global(&interp, "result")
}

fn num(n: f64) -> Val {
    Val::Num(n)
}

fn text(s: &str) -> Val {
    Val::Str(s.to_string())
}

#[test]
fn test_arithmetic_coercion() {
    assert_eq!(value_of("\"5\" * \"2\""), num(10.0));
    assert_eq!(value_of("\"5\" + 2"), text("52"));
    assert_eq!(value_of("5 + 2 + \"1\""), text("71"));
    assert_eq!(value_of("true + 1"), num(2.0));
    assert_eq!(value_of("null + 1"), num(1.0));
    assert_eq!(value_of("7 % 3"), num(1.0));
    assert_eq!(value_of("-\"3\""), num(-3.0));
    assert_eq!(value_of("+\"\""), num(0.0));
    assert_eq!(value_of("1 / 0"), num(f64::INFINITY));
}

#[test]
fn test_nan_results() {
    match value_of("0 / 0") {
        Val::Num(n) => assert!(n.is_nan()),
        other => panic!("Expected NaN, got {:?}", other),
    }
    match value_of("undefined * 2") {
        Val::Num(n) => assert!(n.is_nan()),
        other => panic!("Expected NaN, got {:?}", other),
    }

    let interp = run("console.log(0 / 0, 1.5, -0, 10 / 4, 1e3);");
    assert_eq!(
        interp.state().messages(LogKind::Console),
        vec!["NaN 1.5 0 2.5 1000"]
    );
}

#[test]
fn test_equality() {
    assert_eq!(value_of("null == undefined"), Val::Bool(true));
    assert_eq!(value_of("null === undefined"), Val::Bool(false));
    assert_eq!(value_of("\"1\" == 1"), Val::Bool(true));
    assert_eq!(value_of("\"1\" === 1"), Val::Bool(false));
    assert_eq!(value_of("true == 1"), Val::Bool(true));
    assert_eq!(value_of("0 == \"\""), Val::Bool(true));
    assert_eq!(value_of("null == 0"), Val::Bool(false));
    assert_eq!(value_of("NaN == NaN"), Val::Bool(false));
    assert_eq!(value_of("\"a\" != \"b\""), Val::Bool(true));
}

#[test]
fn test_comparison() {
    assert_eq!(value_of("\"b\" > \"a\""), Val::Bool(true));
    assert_eq!(value_of("\"10\" < \"9\""), Val::Bool(true));
    assert_eq!(value_of("\"10\" < 9"), Val::Bool(false));
    assert_eq!(value_of("2 >= 2"), Val::Bool(true));
    assert_eq!(value_of("undefined < 1"), Val::Bool(false));
}

#[test]
fn test_logical_operators_return_operands() {
    assert_eq!(value_of("0 || \"fallback\""), text("fallback"));
    assert_eq!(value_of("1 && 2"), num(2.0));
    assert_eq!(value_of("\"\" && 2"), text(""));
    assert_eq!(value_of("!\"\""), Val::Bool(true));
    assert_eq!(value_of("!!\"x\""), Val::Bool(true));
}

#[test]
fn test_short_circuit_skips_right_side() {
    // `missing` would halt with "missing is not defined" if evaluated
    let interp = run("let a = false && missing;\nlet b = true || missing;");
    assert_eq!(global(&interp, "a"), Val::Bool(false));
    assert_eq!(global(&interp, "b"), Val::Bool(true));
}

#[test]
fn test_typeof() {
    assert_eq!(value_of("typeof undeclared"), text("undefined"));
    assert_eq!(value_of("typeof \"x\""), text("string"));
    assert_eq!(value_of("typeof 1"), text("number"));
    assert_eq!(value_of("typeof null"), text("object"));
    assert_eq!(value_of("typeof true"), text("boolean"));
    assert_eq!(value_of("typeof function () {}"), text("function"));
    assert_eq!(value_of("typeof console.log"), text("function"));
    assert_eq!(value_of("typeof console"), text("object"));
}

#[test]
fn test_ternary() {
    assert_eq!(value_of("5 > 3 ? \"yes\" : \"no\""), text("yes"));
    assert_eq!(value_of("0 ? 1 : 0 ? 2 : 3"), num(3.0));
}

#[test]
fn test_prefix_and_postfix_update() {
    let interp = run("let p = 1;\nlet q = p++;\nlet r = ++p;\nlet s = p--;");

    assert_eq!(global(&interp, "q"), num(1.0));
    assert_eq!(global(&interp, "r"), num(3.0));
    assert_eq!(global(&interp, "s"), num(3.0));
    assert_eq!(global(&interp, "p"), num(2.0));
}

#[test]
fn test_string_members() {
    assert_eq!(value_of("\"hello\".length"), num(5.0));
    assert_eq!(value_of("\"hello\"[1]"), text("e"));
    assert_eq!(value_of("\"hello\"[9]"), Val::Undefined);
    assert_eq!(value_of("\"hello\".missing"), Val::Undefined);
}

#[test]
fn test_function_members() {
    let interp = run("function add(a, b) {}\nlet n = add.name;\nlet l = add.length;");
    assert_eq!(global(&interp, "n"), text("add"));
    assert_eq!(global(&interp, "l"), num(2.0));
}

#[test]
fn test_string_escapes_and_concatenation() {
    let interp = run("let s = 'it\\'s' + \"\\n\" + \"tab\\t\";");
    assert_eq!(global(&interp, "s"), text("it's\ntab\t"));
}

#[test]
fn test_compound_assignment_operators() {
    let interp = run("let a = 10;\na -= 4;\na *= 3;\na /= 2;\nlet s = \"x\";\ns += 1;");
    assert_eq!(global(&interp, "a"), num(9.0));
    assert_eq!(global(&interp, "s"), text("x1"));
}

#[test]
fn test_exponent_number_strings() {
    assert_eq!(value_of("\"\" + 1e21"), text("1e+21"));
    assert_eq!(value_of("\"\" + 0.0000001"), text("1e-7"));
    assert_eq!(value_of("\"\" + 1.5e300"), text("1.5e+300"));
    assert_eq!(value_of("\"\" + -2.5e-9"), text("-2.5e-9"));
    assert_eq!(value_of("\"\" + 123e18"), text("123000000000000000000"));
    assert_eq!(value_of("\"\" + 0.000001"), text("0.000001"));

    let interp = run("console.log(1e21, 1e-7);");
    assert_eq!(
        interp.state().messages(LogKind::Console),
        vec!["1e+21 1e-7"]
    );
}

#[test]
fn test_compound_assignment_reads_target_first() {
    let interp = run("let a = 1;\na += (a = 10);");
    assert_eq!(global(&interp, "a"), num(11.0));

    let interp = run("let s = \"x\";\ns += (s = \"y\");");
    assert_eq!(global(&interp, "s"), text("xy"));
}

#[test]
fn test_string_index_matches_length_units() {
    assert_eq!(value_of("\"a😀b\".length"), num(4.0));
    assert_eq!(value_of("\"a😀b\"[3]"), text("b"));
    assert_eq!(value_of("\"a😀b\"[0]"), text("a"));
    assert_eq!(value_of("\"a😀b\"[4]"), Val::Undefined);
}
