//! Declarations, assignment and stepping basics

use pretty_assertions::assert_eq;

use super::helpers::{build, global, global_num, run_all};
use crate::executor::{DeclKind, LogKind, Step, Val};

/* ===================== Stepping ===================== */

#[test]
fn test_compound_assignment() {
    let mut interp = build("let a = 1; a += 2;");
    let steps = run_all(&mut interp);

    assert_eq!(steps, 2);
    assert_eq!(global_num(&interp, "a"), 3.0);
    assert!(interp.state().error.is_none());
}

#[test]
fn test_nothing_runs_before_first_step() {
    let interp = build("let a = 1;");
    let state = interp.state();

    assert_eq!(state.steps, 0);
    assert!(!state.finished);
    assert!(state.global("a").is_none());
    assert_eq!(state.current_line, None);
}

#[test]
fn test_finishes_eagerly_on_last_statement() {
    let mut interp = build("let a = 1;");

    let state = interp.step();
    assert_eq!(state.steps, 1);
    assert!(state.finished);
}

#[test]
fn test_step_after_finish_is_noop() {
    let mut interp = build("let a = 1;");
    run_all(&mut interp);
    let logs_before = interp.state().logs.len();

    assert_eq!(crate::executor::exec_loop::step(&mut interp), Step::Done);
    interp.step();

    assert_eq!(interp.state().steps, 1);
    assert_eq!(interp.state().logs.len(), logs_before);
}

#[test]
fn test_empty_program_finishes_without_steps() {
    let mut interp = build("");
    interp.step();

    assert!(interp.state().finished);
    assert_eq!(interp.state().steps, 0);
}

#[test]
fn test_blocks_and_empty_statements_are_not_steps() {
    let mut interp = build("{ ; let a = 1; { a = 2; } } ;");
    let steps = run_all(&mut interp);

    assert_eq!(steps, 2);
    assert_eq!(global_num(&interp, "a"), 2.0);
}

#[test]
fn test_current_line_tracks_dispatched_node() {
    let mut interp = build("let a = 1;\n\nlet b = 2;");

    assert_eq!(interp.step().current_line, Some(1));
    assert_eq!(interp.step().current_line, Some(3));
}

/* ===================== Declarations ===================== */

#[test]
fn test_const_metadata() {
    let mut interp = build("const a = 5;");
    run_all(&mut interp);

    let scope = interp.state().global_scope();
    assert_eq!(scope.get("a"), Some(&Val::Num(5.0)));
    let meta = scope.meta("a").expect("metadata for a");
    assert_eq!(meta.kind, DeclKind::Const);
    assert_eq!(meta.label, None);
    assert_eq!(interp.state().messages(LogKind::Binding), vec!["const a = 5"]);
}

#[test]
fn test_multiple_declarators_are_one_step() {
    let mut interp = build("let a = 1, b = a + 1;");
    let steps = run_all(&mut interp);

    assert_eq!(steps, 1);
    assert_eq!(global_num(&interp, "b"), 2.0);
    assert_eq!(
        interp.state().messages(LogKind::Binding),
        vec!["let a = 1", "let b = 2"]
    );
}

#[test]
fn test_declaration_without_initializer() {
    let mut interp = build("var v;");
    run_all(&mut interp);

    assert_eq!(global(&interp, "v"), Val::Undefined);
    assert_eq!(
        interp.state().global_scope().meta("v").map(|m| m.kind),
        Some(DeclKind::Var)
    );
    assert_eq!(interp.state().messages(LogKind::Binding), vec!["var v = undefined"]);
}

#[test]
fn test_string_bindings_are_quoted_in_logs() {
    let mut interp = build("let s = \"a\" + 1 + true;");
    run_all(&mut interp);

    assert_eq!(global(&interp, "s"), Val::Str("a1true".to_string()));
    assert_eq!(interp.state().messages(LogKind::Binding), vec!["let s = \"a1true\""]);
}

#[test]
fn test_function_label() {
    let mut interp = build("const f = function() {};\nfunction g(a, b) {}");
    run_all(&mut interp);

    let scope = interp.state().global_scope();
    assert_eq!(scope.meta("f").and_then(|m| m.label.clone()), Some("function".to_string()));
    assert_eq!(scope.meta("g").map(|m| m.kind), Some(DeclKind::Func));
    assert!(interp
        .state()
        .messages(LogKind::Binding)
        .contains(&"function g(a, b)"));
}

/* ===================== Assignment ===================== */

#[test]
fn test_assignment_to_undeclared_name_writes_global() {
    let mut interp = build("x = 5;");
    run_all(&mut interp);

    assert_eq!(global_num(&interp, "x"), 5.0);
    assert!(interp.state().global_scope().meta("x").is_none());
}

#[test]
fn test_if_else_branches() {
    let mut interp = build("let r = 0;\nif (r > 0) { r = 1; } else { r = 2; }");
    let steps = run_all(&mut interp);

    assert_eq!(steps, 3);
    assert_eq!(global_num(&interp, "r"), 2.0);
}

#[test]
fn test_if_without_else_skips() {
    let mut interp = build("let r = 0;\nif (r) r = 1;");
    let steps = run_all(&mut interp);

    assert_eq!(steps, 2);
    assert_eq!(global_num(&interp, "r"), 0.0);
}

#[test]
fn test_const_reassignment_is_allowed() {
    let mut interp = build("const c = 1;\nc = 2;");
    run_all(&mut interp);

    assert_eq!(global_num(&interp, "c"), 2.0);
    assert_eq!(
        interp.state().global_scope().meta("c").map(|m| m.kind),
        Some(DeclKind::Const)
    );
}

#[test]
fn test_state_serializes_frames_global_first() {
    let mut interp = build("let a = 1;");
    run_all(&mut interp);

    let json = serde_json::to_value(interp.state()).expect("state should serialize");
    assert_eq!(json["finished"], serde_json::json!(true));
    assert_eq!(json["stack"][0]["scope"]["values"]["a"], serde_json::json!({"t": "Num", "v": 1.0}));
}
