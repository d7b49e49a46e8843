//! Function calls: frame push/pop, return unwinding and call scoping

use pretty_assertions::assert_eq;

use super::helpers::{build, build_scoped, global, global_num, run_all};
use crate::executor::{CallScoping, DeclKind, LogKind, Val};

/* ===================== Frames ===================== */

#[test]
fn test_call_pushes_frame_and_yields_undefined() {
    let mut interp = build("function add(a, b) {\n  return a + b;\n}\nlet r = add(1, 2);");

    interp.step();
    let state = interp.step();
    assert_eq!(state.stack.names(), vec!["(global)", "add"]);
    assert_eq!(state.global("r"), Some(&Val::Undefined));
    assert!(!state.finished);

    let state = interp.step();
    assert_eq!(state.current_line, Some(2));
    assert_eq!(state.stack.depth(), 0);
    assert!(state.finished);
    assert_eq!(state.messages(LogKind::Return), vec!["add returned 3"]);
    assert_eq!(global(&interp, "r"), Val::Undefined);
}

#[test]
fn test_params_are_frame_locals() {
    let mut interp = build("function f(x, y) {\n  x;\n}\nf(10);");

    interp.step();
    interp.step();
    let frame = interp.state().stack.current();
    assert_eq!(frame.display_name(), "f");
    assert_eq!(frame.scope.get("x"), Some(&Val::Num(10.0)));
    assert_eq!(frame.scope.get("y"), Some(&Val::Undefined));
    assert_eq!(frame.scope.meta("x").map(|m| m.kind), Some(DeclKind::Param));
}

#[test]
fn test_implicit_return_pops_frame_without_log() {
    let mut interp = build("function hello() {\n  console.log(\"hi\");\n}\nhello();");
    run_all(&mut interp);

    assert_eq!(interp.state().stack.depth(), 0);
    assert!(interp.state().messages(LogKind::Return).is_empty());
    assert_eq!(interp.state().messages(LogKind::Console), vec!["hi"]);
}

#[test]
fn test_return_skips_rest_of_function() {
    let mut interp = build(
        r#"
        function sign(n) {
            if (n > 0) {
                return "pos";
            }
            return "neg";
        }
        sign(1);
        "#,
    );
    let steps = run_all(&mut interp);

    assert_eq!(steps, 4);
    assert_eq!(
        interp.state().messages(LogKind::Return),
        vec!["sign returned \"pos\""]
    );
}

#[test]
fn test_return_of_call_keeps_callee_frame() {
    let mut interp = build(
        r#"
        function inner() { return 1; }
        function outer() { return inner(); }
        outer();
        "#,
    );

    run_all(&mut interp);

    // outer's return value is computed before inner's body runs
    assert_eq!(
        interp.state().messages(LogKind::Return),
        vec!["outer returned undefined", "inner returned 1"]
    );
}

#[test]
fn test_body_runs_after_caller_statement() {
    let mut interp = build(
        r#"
        function mark() { console.log("in mark"); }
        let before = 1;
        mark();
        console.log("after call");
        "#,
    );
    run_all(&mut interp);

    assert_eq!(
        interp.state().messages(LogKind::Console),
        vec!["in mark", "after call"]
    );
}

#[test]
fn test_arrow_function_expression_body() {
    let mut interp = build("const double = (n) => n * 2;\ndouble(4);");
    run_all(&mut interp);

    let returns = interp.state().messages(LogKind::Return);
    assert_eq!(returns.len(), 1);
    assert!(returns[0].ends_with("returned 8"), "got {:?}", returns);
}

#[test]
fn test_recursion_through_snapshot() {
    let mut interp = build(
        r#"
        function countdown(n) {
            if (n > 0) {
                console.log(n);
                countdown(n - 1);
            }
        }
        countdown(3);
        "#,
    );
    run_all(&mut interp);

    assert_eq!(interp.state().messages(LogKind::Console), vec!["3", "2", "1"]);
    assert_eq!(interp.state().stack.depth(), 0);
}

/* ===================== Scoping ===================== */

const SCOPING_SOURCE: &str = r#"
    let g = 1;
    function f(x) {
        g = 5;
        console.log(x + g);
    }
    f(10);
"#;

#[test]
fn test_snapshot_scoping_keeps_writes_local() {
    let mut interp = build_scoped(SCOPING_SOURCE, CallScoping::Snapshot);
    run_all(&mut interp);

    assert_eq!(interp.state().messages(LogKind::Console), vec!["15"]);
    assert_eq!(global_num(&interp, "g"), 1.0);
}

#[test]
fn test_chained_scoping_writes_through_to_global() {
    let mut interp = build_scoped(SCOPING_SOURCE, CallScoping::Chained);
    run_all(&mut interp);

    assert_eq!(interp.state().messages(LogKind::Console), vec!["15"]);
    assert_eq!(global_num(&interp, "g"), 5.0);
}

#[test]
fn test_chained_frame_starts_with_params_only() {
    let mut interp = build_scoped("let g = 1;\nfunction f(x) { x; }\nf(2);", CallScoping::Chained);
    interp.step();
    interp.step();
    interp.step();

    let frame = interp.state().stack.current();
    assert_eq!(frame.scope.len(), 1);
    assert!(frame.scope.has("x"));
}

#[test]
fn test_parameter_shadows_global_in_chained_mode() {
    let mut interp = build_scoped(
        r#"
        let x = "global";
        function f(x) {
            console.log(x);
            x = "changed";
        }
        f("param");
        console.log(x);
        "#,
        CallScoping::Chained,
    );
    run_all(&mut interp);

    assert_eq!(
        interp.state().messages(LogKind::Console),
        vec!["param", "global"]
    );
    assert_eq!(global(&interp, "x"), Val::Str("global".to_string()));
}

#[test]
fn test_parameter_shadows_global_in_snapshot_mode() {
    let mut interp = build_scoped(
        "let x = 1;\nfunction f(x) { console.log(x); }\nf(2);",
        CallScoping::Snapshot,
    );
    run_all(&mut interp);

    assert_eq!(interp.state().messages(LogKind::Console), vec!["2"]);
    assert_eq!(global_num(&interp, "x"), 1.0);
}

#[test]
fn test_snapshot_sees_globals_at_call_time() {
    let mut interp = build_scoped(
        r#"
        let v = "first";
        function show() { console.log(v); }
        show();
        v = "second";
        "#,
        CallScoping::Snapshot,
    );
    run_all(&mut interp);

    // The frame copied the global scope when it was pushed, and its body
    // ran before the later assignment
    assert_eq!(interp.state().messages(LogKind::Console), vec!["first"]);
}
