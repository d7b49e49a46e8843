//! Rule: Return Outside Function
//!
//! Reports an error for `return` outside any function body. The global frame
//! is never popped, so a top-level return has nothing to return from.
//!
//! ```js
//! // Error
//! let x = 1;
//! return x;
//! ```

use crate::executor::types::ast::Stmt;
use crate::parser::ProgramDef;

use super::super::walk::{walk_stmt, Node};
use super::super::{ValidationError, ValidationRule};

pub struct ReturnOutsideFunctionRule;

impl ValidationRule for ReturnOutsideFunctionRule {
    fn id(&self) -> &'static str {
        "return-outside-function"
    }

    fn description(&self) -> &'static str {
        "return is only allowed inside a function body"
    }

    fn validate(&self, program: &ProgramDef, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        walk_stmt(&program.body, 0, &mut |node, depth| {
            if let Node::Stmt(Stmt::Return { span, .. }) = node {
                if depth == 0 {
                    errors.push(ValidationError::error(
                        *span,
                        "'return' outside of function",
                        self.id(),
                    ));
                }
            }
        });
        errors
    }
}
