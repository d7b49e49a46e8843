//! Tests for the semantic validation system

use super::*;
use crate::parser::parse_program;

// ============================================================================
// Helper Functions
// ============================================================================

fn validate(source: &str) -> Vec<ValidationError> {
    let program = parse_program(source).expect("Parse should succeed");
    validate_program(&program, source)
}

fn has_rule(errors: &[ValidationError], rule_id: &str) -> bool {
    errors.iter().any(|e| e.rule_id == rule_id)
}

fn for_rule<'a>(errors: &'a [ValidationError], rule_id: &str) -> Vec<&'a ValidationError> {
    errors.iter().filter(|e| e.rule_id == rule_id).collect()
}

// ============================================================================
// Return Outside Function Tests
// ============================================================================

#[test]
fn test_return_at_top_level() {
    let errors = validate("let x = 1;\nreturn x;");

    let found = for_rule(&errors, "return-outside-function");
    assert_eq!(found.len(), 1);
    assert!(found[0].is_error());
    assert_eq!(found[0].span.line(), 2);
}

#[test]
fn test_return_inside_top_level_block() {
    let errors = validate("if (true) { return 5; }");
    assert!(has_rule(&errors, "return-outside-function"));
}

#[test]
fn test_return_inside_function_ok() {
    let source = r#"
function add(a, b) {
    return a + b;
}
const twice = function (n) { return n * 2; };
const inc = (n) => n + 1;
"#;

    let errors = validate(source);
    assert!(!has_rule(&errors, "return-outside-function"));
}

#[test]
fn test_return_inside_nested_loop_in_function_ok() {
    let source = r#"
function find(limit) {
    for (let i = 0; i < limit; i++) {
        if (i === 3) {
            return i;
        }
    }
}
"#;

    assert!(validate(source).is_empty());
}

// ============================================================================
// Unsupported Syntax Tests
// ============================================================================

#[test]
fn test_unsupported_while_warns() {
    let errors = validate("let i = 0;\nwhile (i < 3) { i++; }");

    let found = for_rule(&errors, "unsupported-syntax");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Warning);
    assert!(found[0].message.contains("WhileStatement"));
}

#[test]
fn test_unsupported_literals_warn() {
    let errors = validate("const xs = [1, 2];\nconst o = { a: 1 };");

    let found = for_rule(&errors, "unsupported-syntax");
    assert_eq!(found.len(), 2);
    assert!(found[0].message.contains("ArrayExpression"));
    assert!(found[1].message.contains("ObjectExpression"));
}

#[test]
fn test_break_inside_function_warns() {
    let errors = validate("function f() { for (;;) { break; } }");
    assert!(has_rule(&errors, "unsupported-syntax"));
    assert!(!errors.iter().any(|e| e.is_error()));
}

// ============================================================================
// Invalid Update Target Tests
// ============================================================================

#[test]
fn test_update_member_warns() {
    let errors = validate("let el = 0;\nel.count++;");

    let found = for_rule(&errors, "invalid-update-target");
    assert_eq!(found.len(), 1);
    assert!(!found[0].is_error());
}

#[test]
fn test_update_identifier_ok() {
    let errors = validate("let i = 0;\ni++;\n--i;");
    assert!(!has_rule(&errors, "invalid-update-target"));
}

// ============================================================================
// Validator Integration Tests
// ============================================================================

#[test]
fn test_findings_sorted_by_position() {
    let source = "[1];\nreturn 2;\nwhile (true) {}";
    let errors = validate(source);

    let lines: Vec<usize> = errors.iter().map(|e| e.span.line()).collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn test_has_errors_only_counts_errors() {
    let warn_only = "while (false) {}";
    let program = parse_program(warn_only).expect("Parse should succeed");
    assert!(!has_errors(&program, warn_only));

    let with_error = "return 1;";
    let program = parse_program(with_error).expect("Parse should succeed");
    assert!(has_errors(&program, with_error));
}

#[test]
fn test_display_format() {
    let errors = validate("\n  return 1;");
    assert_eq!(
        errors[0].to_string(),
        "error at line 2, col 3: 'return' outside of function [return-outside-function]"
    );
}

#[test]
fn test_registered_rules() {
    let ids: Vec<&str> = Validator::new().rules().map(|(id, _)| id).collect();
    assert_eq!(
        ids,
        vec![
            "return-outside-function",
            "unsupported-syntax",
            "invalid-update-target"
        ]
    );
}
