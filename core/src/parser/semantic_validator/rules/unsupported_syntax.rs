//! Rule: Unsupported Syntax
//!
//! Warns about syntax the parser recognises but the engine does not run
//! (`while`, `break`, `continue`, array and object literals). These become
//! no-op steps with a diagnostic log entry.

use crate::executor::types::ast::{Expr, Stmt};
use crate::parser::ProgramDef;

use super::super::walk::{walk_stmt, Node};
use super::super::{ValidationError, ValidationRule};

pub struct UnsupportedSyntaxRule;

impl ValidationRule for UnsupportedSyntaxRule {
    fn id(&self) -> &'static str {
        "unsupported-syntax"
    }

    fn description(&self) -> &'static str {
        "Syntax outside the supported subset is skipped at run time"
    }

    fn validate(&self, program: &ProgramDef, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        walk_stmt(&program.body, 0, &mut |node, _| {
            let found = match node {
                Node::Stmt(Stmt::Unsupported { kind, span }) => Some((kind, span)),
                Node::Expr(Expr::Unsupported { kind, span }) => Some((kind, span)),
                _ => None,
            };
            if let Some((kind, span)) = found {
                errors.push(ValidationError::warning(
                    *span,
                    format!("{} is not supported and will be skipped", kind),
                    self.id(),
                ));
            }
        });
        errors
    }
}
