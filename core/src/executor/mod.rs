//! # Step-indexed interpreter
//!
//! Runs a parsed script one observable unit at a time.
//!
//! ## Core Principles
//!
//! 1. **Queue-driven execution**: each frame owns a deque of pending work;
//!    there is no native recursion over statements
//! 2. **One visible unit per step**: blocks expand silently, everything else
//!    counts as a step and gets an explanation
//! 3. **Calls are asynchronous to their caller**: an interpreted call pushes
//!    a frame and yields `undefined`; the body runs over later steps
//! 4. **Host re-entry**: event listeners fire through the same call machinery
//!
//! ```ignore
//! let mut interp = Interpreter::new("let x = 1; x += 2;", None)?;
//! while !interp.step().finished {}
//! assert_eq!(interp.state().global("x"), Some(&Val::Num(3.0)));
//! ```

pub mod bridge;
pub mod calls;
pub mod errors;
pub mod exec_loop;
pub mod explain;
pub mod expressions;
pub mod statements;
pub mod types;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::parser::semantic_validator::{validate_program, ValidationError};
use crate::parser::{parse_program, ProgramDef};

pub use bridge::{
    DomElement, ElementProxy, ElementRef, LiveSurface, Listener, MemorySurface, NativeFn, NodeId,
    PropertyValue, SurfaceRef,
};
pub use errors::{ConstructionError, RuntimeError};
pub use exec_loop::{run_until_done, Step};
pub use types::{CallStack, DeclKind, ExecutionState, Frame, LogEntry, LogKind, Scope, Val};

/* ===================== Configuration ===================== */

/// How a call frame's scope relates to the global scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallScoping {
    /// The frame starts with a shallow copy of the global scope
    #[default]
    Snapshot,
    /// The frame starts with its parameters only; other names reach the
    /// live global scope
    Chained,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    pub call_scoping: CallScoping,
}

/// Callback run after every visible step and every event re-entry
pub type StepObserver = Box<dyn FnMut(&ExecutionState) + Send>;

/* ===================== Interpreter ===================== */

pub struct Interpreter {
    pub(crate) state: ExecutionState,
    pub(crate) surface: Option<SurfaceRef>,
    pub(crate) listeners: Vec<Listener>,
    pub(crate) config: InterpreterConfig,
    /// Depth of the frame the current step was taken from
    pub(crate) active: usize,
    observer: Option<StepObserver>,
    warnings: Vec<ValidationError>,
    program: ProgramDef,
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("state", &self.state)
            .field("listeners", &self.listeners)
            .field("config", &self.config)
            .field("has_surface", &self.surface.is_some())
            .finish()
    }
}

impl Interpreter {
    /// Parse and validate `source`. Nothing runs until the first `step()`.
    pub fn new(source: &str, surface: Option<SurfaceRef>) -> Result<Self, ConstructionError> {
        Self::with_config(source, surface, InterpreterConfig::default())
    }

    pub fn with_config(
        source: &str,
        surface: Option<SurfaceRef>,
        config: InterpreterConfig,
    ) -> Result<Self, ConstructionError> {
        let program = parse_program(source)?;

        let (errors, warnings): (Vec<_>, Vec<_>) = validate_program(&program, source)
            .into_iter()
            .partition(|finding| finding.is_error());
        if !errors.is_empty() {
            return Err(ConstructionError::Validation(errors));
        }

        let global = Frame::global(program.body.clone());
        info!(
            warnings = warnings.len(),
            host = surface.is_some(),
            scoping = ?config.call_scoping,
            "Interpreter ready"
        );

        Ok(Self {
            state: ExecutionState::new(CallStack::new(global)),
            surface,
            listeners: Vec::new(),
            config,
            active: 0,
            observer: None,
            warnings,
            program,
        })
    }

    /// Advance exactly one visible step. A no-op once finished.
    pub fn step(&mut self) -> &ExecutionState {
        exec_loop::step(self);
        &self.state
    }

    /// Register the observer, replacing any previous one
    pub fn set_on_step(&mut self, observer: impl FnMut(&ExecutionState) + Send + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// The live state. Read-only for callers.
    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// Non-fatal validation findings
    pub fn warnings(&self) -> &[ValidationError] {
        &self.warnings
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn program(&self) -> &ProgramDef {
        &self.program
    }

    pub fn surface(&self) -> Option<&SurfaceRef> {
        self.surface.as_ref()
    }

    /// Fire `event` on `node`: every matching listener gets a call frame.
    ///
    /// Clears `finished` unless a runtime error halted the interpreter, then
    /// notifies the observer. Returns the number of listeners scheduled.
    pub fn fire_event(&mut self, node: NodeId, event: &str) -> usize {
        if self.state.error.is_some() {
            return 0;
        }

        let count = bridge::dispatch_event(self, node, event);
        if count > 0 {
            if self.state.error.is_none() {
                self.state.finished = false;
            }
            self.notify();
        }
        count
    }

    /// Fire `event` on the element with the given id
    pub fn fire_event_by_id(&mut self, id: &str, event: &str) -> usize {
        let node = self
            .surface
            .as_ref()
            .and_then(|surface| surface.lock().get_element_by_id(id))
            .map(|element| element.node);
        match node {
            Some(node) => self.fire_event(node, event),
            None => 0,
        }
    }

    /* ===================== Internal ===================== */

    /// Record a runtime error and stop
    pub(crate) fn halt(&mut self, err: RuntimeError) {
        warn!(error = %err, line = ?self.state.current_line, "Runtime error");
        self.state.error = Some(err.to_string());
        self.state.finished = true;
    }

    /// Log skipped code without stopping
    pub(crate) fn diagnostic(&mut self, message: String) {
        warn!(line = ?self.state.current_line, "{}", message);
        self.state.log(LogKind::Diagnostic, message);
    }

    pub(crate) fn notify(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.state);
        }
    }
}

/* ===================== Session ===================== */

/// Cloneable, thread-safe handle that serialises stepping and event re-entry
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<Interpreter>>,
}

impl Session {
    pub fn new(interpreter: Interpreter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(interpreter)),
        }
    }

    pub fn step(&self) -> Step {
        exec_loop::step(&mut self.inner.lock())
    }

    pub fn fire_event(&self, node: NodeId, event: &str) -> usize {
        self.inner.lock().fire_event(node, event)
    }

    pub fn set_on_step(&self, observer: impl FnMut(&ExecutionState) + Send + 'static) {
        self.inner.lock().set_on_step(observer);
    }

    /// Read the state while holding the lock
    pub fn with_state<R>(&self, f: impl FnOnce(&ExecutionState) -> R) -> R {
        f(&self.inner.lock().state)
    }

    pub fn is_finished(&self) -> bool {
        self.inner.lock().state.finished
    }
}
