//! Validation Rules
//!
//! Each file in this module contains one validation rule:
//!
//! - `return_outside_function.rs` - `return` at the top level of a script
//! - `unsupported_syntax.rs` - syntax the engine will skip at run time
//! - `invalid_update_target.rs` - `++`/`--` applied to something other than a name

mod invalid_update_target;
mod return_outside_function;
mod unsupported_syntax;

pub use invalid_update_target::InvalidUpdateTargetRule;
pub use return_outside_function::ReturnOutsideFunctionRule;
pub use unsupported_syntax::UnsupportedSyntaxRule;
