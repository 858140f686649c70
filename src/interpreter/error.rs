use crate::diagnostic::{Diagnostic, Label, Position};
use crate::object::ObjectType;
use crate::token::Token;
use std::fmt;
use thiserror::Error;

use super::parser::ParseError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalErrorKind {
    #[error("type mismatch: {left} {op} {right}")]
    TypeMismatch {
        left: ObjectType,
        op: &'static str,
        right: ObjectType,
    },
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
    #[error("Can't divide by zero")]
    DivisionByZero,
    #[error("cannot find '{0}' in scope")]
    NotFound(String),
    #[error("unusable as hash key: {0}")]
    NotHashable(ObjectType),
    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),
    #[error("not a function: {0}")]
    NotCallable(ObjectType),
    #[error("value of type `{ty}` has no member `{member}`")]
    NoMember { ty: ObjectType, member: String },
    #[error("{0} is unknown")]
    Unknown(String),
    #[error("wrong number of arguments to `{name}`: expected {expected}, got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    Import(String),
    #[error("maximum recursion depth of {0} exceeded")]
    DepthExceeded(usize),
    #[error("{0}")]
    Custom(String),
}

/// A runtime error, optionally tagged with the source position that raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub position: Option<Position>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        Self { kind, position: None }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::Type(message.into()))
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::Custom(message.into()))
    }

    pub fn import(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::Import(message.into()))
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Tags the error with `token`'s position unless it already has one.
    pub fn at(mut self, token: &Token) -> Self {
        if self.position.is_none() {
            self.position = Some(token.position());
        }
        self
    }

    /// The message without position.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// The form an error takes when shown as a value.
    pub fn inspect(&self) -> String {
        format!("ERROR: {}", self)
    }

    fn code(&self) -> &'static str {
        match self.kind {
            EvalErrorKind::TypeMismatch { .. } => "E0201",
            EvalErrorKind::UnknownOperator(_) => "E0202",
            EvalErrorKind::DivisionByZero => "E0203",
            EvalErrorKind::NotFound(_) | EvalErrorKind::Unknown(_) => "E0204",
            EvalErrorKind::NotHashable(_) | EvalErrorKind::IndexNotSupported(_) => "E0205",
            EvalErrorKind::NotCallable(_) | EvalErrorKind::NoMember { .. } => "E0206",
            EvalErrorKind::Arity { .. } | EvalErrorKind::Type(_) => "E0207",
            EvalErrorKind::Import(_) => "E0208",
            EvalErrorKind::DepthExceeded(_) => "E0209",
            EvalErrorKind::Custom(_) => "E0210",
        }
    }

    /// Convert to a diagnostic for pretty printing
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.message()).with_code(self.code());
        match &self.position {
            Some(position) => diag.with_label(Label::primary(position.clone(), 1, "")),
            None => diag,
        }
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.position {
            Some(position) if position.is_known() => write!(f, "{}: {}", position, self.kind),
            _ => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Failure of a whole run: either the source did not parse or evaluation raised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error("{}", join_parse_errors(.0))]
    Parse(Vec<ParseError>),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl RunError {
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            RunError::Parse(errors) => errors.iter().map(ParseError::to_diagnostic).collect(),
            RunError::Eval(error) => vec![error.to_diagnostic()],
        }
    }
}

pub(crate) fn join_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_display_with_and_without_position() {
        let err = EvalError::new(EvalErrorKind::DivisionByZero);
        assert_eq!(err.to_string(), "Can't divide by zero");

        let err = err.with_position(Position::new(Rc::from("main.eso"), 2, 5));
        assert_eq!(err.to_string(), "main.eso:2:5: Can't divide by zero");
        assert_eq!(err.inspect(), "ERROR: main.eso:2:5: Can't divide by zero");
    }

    #[test]
    fn test_at_keeps_first_position() {
        let first = Position::new(Rc::from("lib.eso"), 1, 1);
        let token = Token::new(crate::token::TokenKind::Ident, "x", &Position::new(Rc::from("main.eso"), 9, 9));
        let err = EvalError::custom("boom").with_position(first.clone()).at(&token);
        assert_eq!(err.position, Some(first));
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = EvalError::new(EvalErrorKind::TypeMismatch {
            left: ObjectType::Integer,
            op: "+",
            right: ObjectType::Boolean,
        });
        assert_eq!(err.message(), "type mismatch: INTEGER + BOOLEAN");
        assert_eq!(err.to_diagnostic().code.as_deref(), Some("E0201"));
    }
}
