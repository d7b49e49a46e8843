//! Core execution loop
//!
//! `step()` performs one visible unit of work. Before it finds that unit it
//! trampolines: exhausted call frames are popped and transparent work
//! (blocks, empty statements) is expanded without counting as a step.
//!
//! ## Function Organization
//! 1. run_until_done() - Top-level driver (calls step repeatedly)
//! 2. step() - One visible step
//! 3. next_pending() / settle() - Trampoline over exhausted frames

use tracing::{debug, trace};

use super::calls;
use super::explain;
use super::statements;
use super::types::Pending;
use super::Interpreter;

/* ===================== Step Result ===================== */

/// Result of executing one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More work is queued
    Continue,
    /// Execution is finished or halted
    Done,
}

/* ===================== Public API ===================== */

/// Step until finished, or until `limit` visible steps have been taken.
///
/// Returns the number of steps taken by this call.
pub fn run_until_done(it: &mut Interpreter, limit: Option<usize>) -> usize {
    let start = it.state.steps;
    loop {
        if limit.is_some_and(|max| it.state.steps - start >= max) {
            break;
        }
        match step(it) {
            Step::Continue => continue,
            Step::Done => break,
        }
    }
    it.state.steps - start
}

/// Execute one visible step
pub fn step(it: &mut Interpreter) -> Step {
    if it.state.finished {
        return Step::Done;
    }

    loop {
        let Some(pending) = next_pending(it) else {
            mark_finished(it);
            return Step::Done;
        };
        it.active = it.state.stack.depth();

        if pending.is_transparent() {
            trace!(kind = pending.kind_name(), depth = it.active, "Expanding");
            if let Err(err) = statements::dispatch(it, pending) {
                it.halt(err);
                it.notify();
                return Step::Done;
            }
            continue;
        }

        // Describe before dispatch: dispatch consumes the node
        let line = pending.span().line();
        it.state.current_line = Some(line);
        it.state.explanation = explain::explain(&pending);
        it.state.steps += 1;
        debug!(
            step = it.state.steps,
            line,
            kind = pending.kind_name(),
            explanation = %it.state.explanation,
            "Dispatching"
        );

        match statements::dispatch(it, pending) {
            Ok(()) => settle(it),
            Err(err) => it.halt(err),
        }
        it.notify();

        return if it.state.finished {
            Step::Done
        } else {
            Step::Continue
        };
    }
}

/* ===================== Trampoline ===================== */

/// Pop the next unit of work, discarding exhausted call frames on the way
fn next_pending(it: &mut Interpreter) -> Option<Pending> {
    loop {
        if let Some(pending) = it.state.stack.current_mut().queue.pop_front() {
            return Some(pending);
        }
        let frame = it.state.stack.pop()?;
        calls::finish_frame(it, frame);
    }
}

/// After a step: pop call frames with nothing left to do, and finish when
/// the global frame is empty too
fn settle(it: &mut Interpreter) {
    while it.state.stack.current().queue.is_empty() {
        match it.state.stack.pop() {
            Some(frame) => calls::finish_frame(it, frame),
            None => {
                mark_finished(it);
                return;
            }
        }
    }
}

fn mark_finished(it: &mut Interpreter) {
    if !it.state.finished {
        debug!(steps = it.state.steps, "Execution finished");
    }
    it.state.finished = true;
}
