//! Construction and runtime errors

use thiserror::Error;

use crate::parser::semantic_validator::ValidationError;
use crate::parser::ParseError;

/// The source could not be turned into an interpreter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{}", render_findings(.0))]
    Validation(Vec<ValidationError>),
}

fn render_findings(findings: &[ValidationError]) -> String {
    findings
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A failure while dispatching a step. Halts the interpreter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("{0} is not defined")]
    NotDefined(String),

    #[error("{0} is not a function")]
    NotAFunction(String),

    #[error("Invalid assignment target: {0}")]
    InvalidAssignment(String),

    #[error("Cannot read properties of {target} (reading '{property}')")]
    PropertyRead { target: String, property: String },

    #[error("Cannot set property '{property}' of {target}")]
    PropertyWrite { target: String, property: String },

    #[error("{0}")]
    Host(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
