//! Type definitions for the executor
//!
//! - AST nodes (Stmt, Expr)
//! - Runtime values (Val)
//! - Scopes, frames and the call stack
//! - The observable execution state

pub mod ast;
pub mod frame;
pub mod scope;
pub mod state;
pub mod values;

pub use ast::{Expr, Span, Stmt};
pub use frame::{CallStack, Frame, Pending, ReturnHook};
pub use scope::{DeclKind, Scope, VarMeta};
pub use state::{ExecutionState, LogEntry, LogKind};
pub use values::{HostObject, Val};
