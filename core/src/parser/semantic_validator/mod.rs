//! Semantic validation for stepjs scripts
//!
//! Runs after parsing to catch problems the grammar can't enforce. Each rule
//! implements [`ValidationRule`]; the [`Validator`] runs all of them.
//!
//! Error-severity findings stop construction. Warnings and hints are kept on
//! the interpreter so a host tool can show them next to the source.
//!
//! # Adding a New Rule
//!
//! 1. Create a new file in `semantic_validator/rules/`
//! 2. Implement `ValidationRule` for your struct
//! 3. Add it to the `Validator::new()` constructor

pub mod rules;
mod walk;

use serde::Serialize;

use crate::executor::types::ast::Span;

use super::ProgramDef;

// ============================================================================
// Validation Error Types
// ============================================================================

/// A finding produced by semantic analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// The source location of the issue
    pub span: Span,
    /// Human-readable message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Which rule produced this error
    pub rule_id: &'static str,
}

/// Severity levels for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed - the script cannot run
    Error,
    /// The script runs, but part of it will be skipped
    Warning,
    /// Suggestion for improvement
    Hint,
}

impl ValidationError {
    pub fn error(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Error,
            rule_id,
        }
    }

    pub fn warning(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Warning,
            rule_id,
        }
    }

    #[allow(dead_code)]
    pub fn hint(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Hint,
            rule_id,
        }
    }

    /// Check if this is an error (not a warning or hint)
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Hint => "hint",
        };
        write!(
            f,
            "{} at line {}, col {}: {} [{}]",
            severity,
            self.span.start_line + 1,
            self.span.start_col + 1,
            self.message,
            self.rule_id
        )
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait that all validation rules implement.
pub trait ValidationRule: Send + Sync {
    /// Unique identifier for this rule (e.g., "return-outside-function")
    fn id(&self) -> &'static str;

    /// Human-readable description of what this rule checks
    fn description(&self) -> &'static str;

    /// Run the rule against a parsed program. Empty means no issues found.
    fn validate(&self, program: &ProgramDef, source: &str) -> Vec<ValidationError>;
}

// ============================================================================
// Validator - Runs All Rules
// ============================================================================

pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a new validator with all built-in rules.
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(rules::ReturnOutsideFunctionRule),
                Box::new(rules::UnsupportedSyntaxRule),
                Box::new(rules::InvalidUpdateTargetRule),
            ],
        }
    }

    /// Run all validation rules and collect their findings, ordered by position.
    pub fn validate(&self, program: &ProgramDef, source: &str) -> Vec<ValidationError> {
        let mut errors: Vec<ValidationError> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(program, source))
            .collect();
        errors.sort_by_key(|e| e.span.start);
        errors
    }

    /// Registered rules as `(id, description)` pairs
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.id(), r.description()))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Validate a program with every built-in rule.
pub fn validate_program(program: &ProgramDef, source: &str) -> Vec<ValidationError> {
    Validator::new().validate(program, source)
}

/// Check if a program has any Error-severity findings.
pub fn has_errors(program: &ProgramDef, source: &str) -> bool {
    validate_program(program, source)
        .iter()
        .any(|e| e.is_error())
}

#[cfg(test)]
mod tests;
