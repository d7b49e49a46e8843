//! For loops: initializer, body, update and re-check as separate steps

use pretty_assertions::assert_eq;

use super::helpers::{build, explanations, global_num, run_all};
use crate::executor::{run_until_done, LogKind};

#[test]
fn test_loop_step_count() {
    let mut interp = build("let x = 0;\nfor (let i = 0; i < 3; i++) {\n  x++;\n}");

    assert_eq!(interp.step().steps, 1);
    let from_loop = run_all(&mut interp);

    // Loop start, then body/update/check per iteration
    assert_eq!(from_loop, 10);
    assert_eq!(interp.state().steps, 11);
    assert_eq!(global_num(&interp, "x"), 3.0);
    assert_eq!(global_num(&interp, "i"), 3.0);
}

#[test]
fn test_loop_explanations() {
    let mut interp = build("for (let i = 0; i < 2; i++) { console.log(i); }");
    let steps = explanations(&mut interp);

    assert_eq!(
        steps,
        vec![
            "Start a for loop with `let i = 0`, repeating while `i < 2`",
            "Print `i` to the console",
            "Update the loop: increase `i` by 1",
            "Check the loop condition `i < 2` again",
            "Print `i` to the console",
            "Update the loop: increase `i` by 1",
            "Check the loop condition `i < 2` again",
        ]
    );
    assert_eq!(interp.state().messages(LogKind::Console), vec!["0", "1"]);
}

#[test]
fn test_loop_lines_point_at_parts() {
    let mut interp = build("for (let i = 0; i < 1; i++) {\n  i;\n}");

    assert_eq!(interp.step().current_line, Some(1));
    assert_eq!(interp.step().current_line, Some(2));
}

#[test]
fn test_loop_with_false_test_never_enters_body() {
    let mut interp = build("let x = 0;\nfor (let i = 5; i < 3; i++) { x = 1; }");
    let steps = run_all(&mut interp);

    assert_eq!(steps, 2);
    assert_eq!(global_num(&interp, "x"), 0.0);
}

#[test]
fn test_nested_loops() {
    let mut interp = build(
        r#"
        let n = 0;
        for (let i = 0; i < 2; i++) {
            for (let j = 0; j < 3; j++) {
                n++;
            }
        }
        "#,
    );
    run_all(&mut interp);

    assert_eq!(global_num(&interp, "n"), 6.0);
}

#[test]
fn test_expression_initializer_and_update() {
    let mut interp = build("let i;\nfor (i = 0; i < 3; i = i + 1) {}");
    run_all(&mut interp);

    assert_eq!(global_num(&interp, "i"), 3.0);
}

#[test]
fn test_missing_test_repeats_until_limit() {
    let mut interp = build("let c = 0;\nfor (;;) { c++; }");

    let taken = run_until_done(&mut interp, Some(50));

    assert_eq!(taken, 50);
    assert!(!interp.state().finished);
    assert_eq!(interp.state().explanation, "Repeat the loop");
}

#[test]
fn test_missing_test_explanation() {
    let mut interp = build("for (;;) {}");
    assert_eq!(interp.step().explanation, "Start a for loop, repeating forever");
}

#[test]
fn test_loop_inside_function() {
    let mut interp = build(
        r#"
        function sum(n) {
            let total = 0;
            for (let k = 1; k <= n; k++) {
                total += k;
            }
            return total;
        }
        sum(4);
        "#,
    );
    run_all(&mut interp);

    assert_eq!(interp.state().messages(LogKind::Return), vec!["sum returned 10"]);
    // Loop variables live in the call frame, not the global scope
    assert!(interp.state().global("total").is_none());
    assert!(interp.state().global("k").is_none());
}
