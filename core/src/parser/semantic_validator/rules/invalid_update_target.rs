//! Rule: Invalid Update Target
//!
//! Warns when `++` or `--` is applied to anything but a plain name.
//!
//! ```js
//! let i = 0;
//! i++;          // OK
//! el.count++;   // Warning: evaluates to undefined, nothing is written
//! ```

use crate::executor::types::ast::Expr;
use crate::parser::ProgramDef;

use super::super::walk::{walk_stmt, Node};
use super::super::{ValidationError, ValidationRule};

pub struct InvalidUpdateTargetRule;

impl ValidationRule for InvalidUpdateTargetRule {
    fn id(&self) -> &'static str {
        "invalid-update-target"
    }

    fn description(&self) -> &'static str {
        "++ and -- only update plain variables"
    }

    fn validate(&self, program: &ProgramDef, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        walk_stmt(&program.body, 0, &mut |node, _| {
            if let Node::Expr(Expr::Update { arg, span, .. }) = node {
                if !matches!(arg.as_ref(), Expr::Ident { .. }) {
                    errors.push(ValidationError::warning(
                        *span,
                        "Update target must be a variable name",
                        self.id(),
                    ));
                }
            }
        });
        errors
    }
}
