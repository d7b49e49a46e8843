//! Statement dispatch
//!
//! Each dispatched unit runs in the frame it was taken from (`it.active`).
//! Control flow never recurses: branches, loop bodies and block contents are
//! pushed back onto the front of that frame's queue and run as later steps.

use super::calls;
use super::errors::RuntimeResult;
use super::expressions::eval;
use super::types::ast::{Declarator, Expr, ForInit, Stmt, VarKind};
use super::types::{DeclKind, LogKind, Pending, Val};
use super::Interpreter;

/// Run one unit of queued work
pub(crate) fn dispatch(it: &mut Interpreter, pending: Pending) -> RuntimeResult<()> {
    match pending {
        Pending::Node(stmt) => execute(it, stmt),
        Pending::LoopUpdate { update } => {
            eval(it, &update)?;
            Ok(())
        }
        Pending::LoopCheck { node } => {
            let Stmt::For { test, .. } = node.as_ref() else {
                return Ok(());
            };
            if test_passes(it, test.as_ref())? {
                schedule_iteration(it, *node);
            }
            Ok(())
        }
    }
}

/// Queue work at the front of the active frame
fn schedule(it: &mut Interpreter, pending: Pending) {
    let depth = it.active;
    it.state.stack.frame_mut(depth).push_front(pending);
}

fn execute(it: &mut Interpreter, stmt: Stmt) -> RuntimeResult<()> {
    match stmt {
        Stmt::Block { body, .. } => {
            for s in body.into_iter().rev() {
                schedule(it, Pending::Node(s));
            }
            Ok(())
        }

        Stmt::Declare { kind, decls, .. } => declare(it, kind, &decls),

        Stmt::Function { def } => {
            let name = def.display_name().to_string();
            it.state.log(
                LogKind::Binding,
                format!("function {}({})", name, def.params.join(", ")),
            );
            let depth = it.active;
            it.state
                .stack
                .frame_mut(depth)
                .scope
                .declare(&name, DeclKind::Func, Val::Func(Box::new(def)));
            Ok(())
        }

        Stmt::Expr { expr, .. } => {
            eval(it, &expr)?;
            Ok(())
        }

        Stmt::If {
            test,
            then_s,
            else_s,
            ..
        } => {
            if eval(it, &test)?.is_truthy() {
                schedule(it, Pending::Node(*then_s));
            } else if let Some(else_s) = else_s {
                schedule(it, Pending::Node(*else_s));
            }
            Ok(())
        }

        Stmt::For { .. } => enter_loop(it, stmt),

        Stmt::Return { value, .. } => {
            let value = match value {
                Some(expr) => eval(it, &expr)?,
                None => Val::Undefined,
            };
            let depth = it.active;
            calls::return_from(it, depth, value);
            Ok(())
        }

        Stmt::Empty { .. } => Ok(()),

        Stmt::Unsupported { kind, .. } => {
            it.diagnostic(format!("Skipped unsupported {}", kind));
            Ok(())
        }
    }
}

fn declare(it: &mut Interpreter, kind: VarKind, decls: &[Declarator]) -> RuntimeResult<()> {
    for decl in decls {
        let value = match &decl.init {
            Some(init) => eval(it, init)?,
            None => Val::Undefined,
        };
        it.state.log(
            LogKind::Binding,
            format!("{} {} = {}", kind.keyword(), decl.name, value.repr()),
        );
        let depth = it.active;
        it.state
            .stack
            .frame_mut(depth)
            .scope
            .declare(&decl.name, kind.into(), value);
    }
    Ok(())
}

/* ===================== For Loops ===================== */

/// First encounter of a `for` loop: run the initializer, test, and queue
/// the first iteration
fn enter_loop(it: &mut Interpreter, stmt: Stmt) -> RuntimeResult<()> {
    let Stmt::For { init, test, .. } = &stmt else {
        return Ok(());
    };

    match init {
        Some(ForInit::Declare { kind, decls, .. }) => declare(it, *kind, decls)?,
        Some(ForInit::Expr { expr }) => {
            eval(it, expr)?;
        }
        None => {}
    }

    if test_passes(it, test.as_ref())? {
        schedule_iteration(it, stmt);
    }
    Ok(())
}

/// A missing test counts as true
fn test_passes(it: &mut Interpreter, test: Option<&Expr>) -> RuntimeResult<bool> {
    match test {
        Some(test) => Ok(eval(it, test)?.is_truthy()),
        None => Ok(true),
    }
}

/// Queue body, update and check so they run in that order
fn schedule_iteration(it: &mut Interpreter, node: Stmt) {
    let (body, update) = match &node {
        Stmt::For { body, update, .. } => ((**body).clone(), update.clone()),
        _ => return,
    };

    schedule(
        it,
        Pending::LoopCheck {
            node: Box::new(node),
        },
    );
    if let Some(update) = update {
        schedule(it, Pending::LoopUpdate { update });
    }
    schedule(it, Pending::Node(body));
}
