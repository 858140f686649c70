pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod interpreter;
pub mod lexer;
pub mod object;
pub mod stack;
pub mod token;

pub use ast::{Expr, ExprKind, Program, Stmt};
pub use config::Config;
pub use interpreter::{run, run_with, EvalError, Interpreter, Output, RunError};
pub use object::Object;
pub use token::Token;
