use crate::object::Object;

/// Outcome of evaluating a statement or expression. Errors travel separately
/// as `Err(EvalError)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Value(Object),
    /// A `return` unwinding to the nearest function call or the program.
    Return(Object),
}

impl Flow {
    pub fn into_value(self) -> Object {
        match self {
            Flow::Value(value) | Flow::Return(value) => value,
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, Flow::Return(_))
    }
}
