//! Execution frames, pending work and the call stack
//!
//! A frame owns the scope of one activation and a deque of work still to be
//! done in it. The deque is the continuation: stepping pops from its front,
//! and control-flow statements push their successors back onto the front.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

use super::ast::{Expr, Span, Stmt};
use super::scope::Scope;

/* ===================== Pending Work ===================== */

/// One unit of queued work
#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    /// A statement still to run
    Node(Stmt),
    /// The update clause of a running `for` loop
    LoopUpdate { update: Expr },
    /// Re-test of a running `for` loop; holds the loop itself
    LoopCheck { node: Box<Stmt> },
}

impl Pending {
    pub fn span(&self) -> Span {
        match self {
            Pending::Node(stmt) => stmt.span(),
            Pending::LoopUpdate { update } => update.span(),
            Pending::LoopCheck { node } => match node.as_ref() {
                Stmt::For {
                    test: Some(test), ..
                } => test.span(),
                other => other.span(),
            },
        }
    }

    /// Work that expands or does nothing without counting as a step
    pub fn is_transparent(&self) -> bool {
        matches!(
            self,
            Pending::Node(Stmt::Block { .. }) | Pending::Node(Stmt::Empty { .. })
        )
    }

    pub fn kind_name(&self) -> &str {
        match self {
            Pending::Node(stmt) => stmt.kind_name(),
            Pending::LoopUpdate { .. } => "LoopUpdate",
            Pending::LoopCheck { .. } => "LoopCheck",
        }
    }
}

/* ===================== Frame ===================== */

/// Completion callback attached to a frame, run when the frame is popped
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "t")]
pub enum ReturnHook {
    /// The frame runs an event listener
    EventHandled { event: String, target: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    /// Function name, `None` for the global frame
    pub name: Option<String>,
    /// Function boundary flag: return unwinds up to and including this frame
    pub is_function: bool,
    pub scope: Scope,
    #[serde(skip)]
    pub queue: VecDeque<Pending>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_return: Option<ReturnHook>,
}

impl Frame {
    pub fn global(program: Stmt) -> Self {
        Self {
            name: None,
            is_function: false,
            scope: Scope::new(),
            queue: VecDeque::from([Pending::Node(program)]),
            on_return: None,
        }
    }

    pub fn call(name: &str, scope: Scope, body: Stmt, on_return: Option<ReturnHook>) -> Self {
        Self {
            name: Some(name.to_string()),
            is_function: true,
            scope,
            queue: VecDeque::from([Pending::Node(body)]),
            on_return,
        }
    }

    /// Name shown in the call stack
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(global)")
    }

    /// Schedule work to run before everything else queued in this frame
    pub fn push_front(&mut self, pending: Pending) {
        self.queue.push_front(pending);
    }
}

/* ===================== Call Stack ===================== */

/// Ordered frames, innermost last. The global frame is never removed.
///
/// Frames are addressed by depth: 0 is the global frame, `n` is the n-th
/// call frame above it.
#[derive(Debug, Clone)]
pub struct CallStack {
    global: Frame,
    calls: Vec<Frame>,
}

impl CallStack {
    pub fn new(global: Frame) -> Self {
        Self {
            global,
            calls: Vec::new(),
        }
    }

    /// Depth of the active frame
    pub fn depth(&self) -> usize {
        self.calls.len()
    }

    pub fn global(&self) -> &Frame {
        &self.global
    }

    pub fn global_mut(&mut self) -> &mut Frame {
        &mut self.global
    }

    pub fn current(&self) -> &Frame {
        self.calls.last().unwrap_or(&self.global)
    }

    pub fn current_mut(&mut self) -> &mut Frame {
        self.calls.last_mut().unwrap_or(&mut self.global)
    }

    /// Frame at `depth`, clamped to the active frame
    pub fn frame(&self, depth: usize) -> &Frame {
        match depth.min(self.calls.len()) {
            0 => &self.global,
            n => &self.calls[n - 1],
        }
    }

    /// Frame at `depth`, clamped to the active frame
    pub fn frame_mut(&mut self, depth: usize) -> &mut Frame {
        match depth.min(self.calls.len()) {
            0 => &mut self.global,
            n => &mut self.calls[n - 1],
        }
    }

    pub fn push(&mut self, frame: Frame) {
        self.calls.push(frame);
    }

    /// Pop the active call frame; `None` when only the global frame is left
    pub fn pop(&mut self) -> Option<Frame> {
        self.calls.pop()
    }

    /// Remove the call frame at `depth`, keeping any frames above it
    pub fn remove(&mut self, depth: usize) -> Option<Frame> {
        if depth == 0 || depth > self.calls.len() {
            return None;
        }
        Some(self.calls.remove(depth - 1))
    }

    /// All frames, global first
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        std::iter::once(&self.global).chain(self.calls.iter())
    }

    /// Frame names, global first
    pub fn names(&self) -> Vec<&str> {
        self.frames().map(|f| f.display_name()).collect()
    }
}

impl Serialize for CallStack {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.frames())
    }
}
