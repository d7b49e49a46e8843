//! Frame lifecycle: pushing call frames and unwinding them on return

use tracing::trace;

use super::bridge;
use super::errors::{RuntimeError, RuntimeResult};
use super::types::ast::FunctionDef;
use super::types::{DeclKind, Frame, LogKind, ReturnHook, Scope, Val};
use super::{CallScoping, Interpreter};

/// Call any callable value.
///
/// Natives run immediately and return their result. Interpreted functions
/// get a new frame and the call site receives `undefined`; their body runs
/// over the following steps.
pub(crate) fn call_value(
    it: &mut Interpreter,
    callee: Val,
    args: Vec<Val>,
    hook: Option<ReturnHook>,
    label: &str,
) -> RuntimeResult<Val> {
    match callee {
        Val::Native { func, this } => bridge::call_native(it, &func, this.as_deref(), args),
        Val::Func(def) => {
            push_call(it, &def, args, hook);
            Ok(Val::Undefined)
        }
        _ => Err(RuntimeError::NotAFunction(label.to_string())),
    }
}

/// Push a frame for an interpreted function
pub(crate) fn push_call(
    it: &mut Interpreter,
    def: &FunctionDef,
    args: Vec<Val>,
    hook: Option<ReturnHook>,
) {
    let mut scope = match it.config.call_scoping {
        CallScoping::Snapshot => it.state.stack.global().scope.clone(),
        CallScoping::Chained => Scope::new(),
    };

    let mut args = args.into_iter();
    for param in &def.params {
        scope.declare(param, DeclKind::Param, args.next().unwrap_or(Val::Undefined));
    }

    let name = def.display_name();
    trace!(function = name, depth = it.state.stack.depth() + 1, "Pushing call frame");
    it.state
        .stack
        .push(Frame::call(name, scope, (*def.body).clone(), hook));
}

/// Unwind for a `return` executed in the frame at `depth`.
///
/// Frames are removed from `depth` downwards until a function boundary has
/// been removed. Frames pushed above `depth` while evaluating the return
/// value stay on the stack. The global frame is never removed.
pub(crate) fn return_from(it: &mut Interpreter, depth: usize, value: Val) {
    let name = it.state.stack.frame(depth).display_name().to_string();
    it.state
        .log(LogKind::Return, format!("{} returned {}", name, value.repr()));

    let mut depth = depth;
    while let Some(frame) = it.state.stack.remove(depth) {
        let boundary = frame.is_function;
        finish_frame(it, frame);
        if boundary {
            return;
        }
        depth -= 1;
    }

    // Only reachable when a top-level return slipped past validation
    it.state.stack.global_mut().queue.clear();
}

/// Run the completion hook of a frame that has just been removed
pub(crate) fn finish_frame(it: &mut Interpreter, frame: Frame) {
    trace!(function = frame.display_name(), "Popped frame");
    match frame.on_return {
        Some(ReturnHook::EventHandled { event, target }) => {
            it.state.log(
                LogKind::Event,
                format!("Finished handling {} event on {}", event, target),
            );
        }
        None => {}
    }
}
