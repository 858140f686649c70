pub mod builtins;
pub mod control_flow;
pub mod error;
pub mod evaluator;
pub mod modules;
pub mod parser;

pub use builtins::Builtins;
pub use control_flow::Flow;
pub use error::{EvalError, EvalErrorKind, RunError};
pub use evaluator::{Interpreter, Output};
pub use parser::{parse, ParseError, ParseResult, Parser};

use crate::object::Object;

/// Runs `source` in a fresh interpreter with the default configuration.
pub fn run(source: &str) -> Result<Object, RunError> {
    run_with(source, "<input>", Interpreter::new())
}

/// Runs `source` in `interpreter`, naming it `file` in error positions.
pub fn run_with(source: &str, file: &str, mut interpreter: Interpreter) -> Result<Object, RunError> {
    interpreter.eval_source(source, file)
}
