//! Observable execution state

use serde::Serialize;

use super::frame::CallStack;
use super::scope::Scope;
use super::values::Val;

/// Category of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Output of `console.*`
    Console,
    /// A declaration bound a value
    Binding,
    /// A function returned
    Return,
    /// Listener registration, event firing and handling
    Event,
    /// Skipped or unsupported code
    Diagnostic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
    /// 1-based source line of the step that produced the entry
    pub line: Option<usize>,
}

/// Everything a host tool reads after each step.
///
/// Created once at construction; logs are append-only.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionState {
    /// Call stack, innermost frame last
    pub stack: CallStack,
    pub logs: Vec<LogEntry>,
    pub finished: bool,
    pub error: Option<String>,
    /// 1-based line of the last dispatched node
    pub current_line: Option<usize>,
    /// Description of the last dispatched node
    pub explanation: String,
    /// Number of visible steps taken
    pub steps: usize,
}

impl ExecutionState {
    pub fn new(stack: CallStack) -> Self {
        Self {
            stack,
            logs: Vec::new(),
            finished: false,
            error: None,
            current_line: None,
            explanation: String::new(),
            steps: 0,
        }
    }

    pub fn global_scope(&self) -> &Scope {
        &self.stack.global().scope
    }

    /// Value of a global binding
    pub fn global(&self, name: &str) -> Option<&Val> {
        self.global_scope().get(name)
    }

    pub fn log(&mut self, kind: LogKind, message: impl Into<String>) {
        self.logs.push(LogEntry {
            kind,
            message: message.into(),
            line: self.current_line,
        });
    }

    /// Messages of one kind, oldest first
    pub fn messages(&self, kind: LogKind) -> Vec<&str> {
        self.logs
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.message.as_str())
            .collect()
    }
}
