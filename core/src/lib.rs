pub mod cli;
pub mod config;
pub mod executor;
pub mod parser;

// Re-export main types
pub use executor::{
    CallScoping, ConstructionError, ExecutionState, Interpreter, InterpreterConfig, LiveSurface,
    LogEntry, LogKind, MemorySurface, RuntimeError, Session, Step, SurfaceRef, Val,
};
pub use parser::{parse_program, ProgramDef};
