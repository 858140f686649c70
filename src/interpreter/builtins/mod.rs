//! Built-in functions for the eso interpreter.
//!
//! Functions are organized into categories:
//! - **General**: `count`, `len`, `type_of`, `print`, `println`, `Set`, `str`, `int`, `float`
//! - **Array**: `array.*` free functions (new, get, pop, append, sort, rest, ...)
//! - **String**: `string.upper`, `string.lower`, `string.contains`
//! - **Math**: `math.*` numeric helpers and random numbers
//! - **JSON**: `json.parse`, `json.stringify`
//!
//! The evaluator consults this table only after a name is missing from every
//! scope. The table is built once and never changes afterwards.

mod array;
mod general;
mod json;
mod math;
mod string;

use super::error::EvalError;
use crate::object::{Builtin, BuiltinFn, NativeFn, Object};
use std::collections::HashMap;

/// Returns early with a `TypeError` unless exactly `$n` arguments were given.
macro_rules! require_args {
    ($args:expr, $n:expr, $name:expr) => {
        $crate::object::typing::check($name, $args, &[$crate::object::typing::exact_args($n)])?
    };
}

/// Runs `$body` on the elements of the array in argument 0.
macro_rules! with_array {
    ($args:expr, $name:expr, $body:expr) => {
        match &$args[0] {
            $crate::object::Object::Array(elements) => $body(elements),
            other => Err($crate::interpreter::error::EvalError::type_error(format!(
                "argument to `{}` must be ARRAY, got {}",
                $name,
                other.object_type()
            ))),
        }
    };
}

macro_rules! with_string {
    ($args:expr, $name:expr, $body:expr) => {
        match &$args[0] {
            $crate::object::Object::String(s) => $body(s),
            other => Err($crate::interpreter::error::EvalError::type_error(format!(
                "argument to `{}` must be STRING, got {}",
                $name,
                other.object_type()
            ))),
        }
    };
}

/// Runs `$body` on argument 0 as `f64`, accepting Integer or Float.
macro_rules! with_number {
    ($args:expr, $name:expr, $body:expr) => {
        match &$args[0] {
            $crate::object::Object::Integer(n) => $body(*n as f64),
            $crate::object::Object::Float(n) => $body(*n),
            other => Err($crate::interpreter::error::EvalError::type_error(format!(
                "argument to `{}` must be a number, got {}",
                $name,
                other.object_type()
            ))),
        }
    };
}

pub(crate) use require_args;
pub(crate) use with_array;
pub(crate) use with_number;
pub(crate) use with_string;

/// Name to native function table.
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    table: HashMap<&'static str, Builtin>,
}

impl Builtins {
    /// A table with no functions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every builtin the language ships with.
    pub fn standard() -> Self {
        Self::empty()
            .with("count", general::count)
            .with("len", general::count)
            .with("type_of", general::type_of)
            .with("Set", general::set)
            .with("str", general::str)
            .with("int", general::int)
            .with("float", general::float)
            .with_output("print", general::print)
            .with_output("println", general::println)
            .with("array.new", array::new)
            .with("array.get", array::get)
            .with("array.getFirst", array::get_first)
            .with("array.getLast", array::get_last)
            .with("array.pop", array::pop)
            .with("array.append", array::append)
            .with("array.indexOf", array::index_of)
            .with("array.sort", array::sort)
            .with("array.rest", array::rest)
            .with("string.upper", string::upper)
            .with("string.lower", string::lower)
            .with("string.contains", string::contains)
            .with("math.rand", math::random)
            .with("math.randomInt", math::random_int)
            .with("math.randomFloat", math::random_float)
            .with("math.abs", math::abs)
            .with("math.pow", math::pow)
            .with("math.sqrt", math::sqrt)
            .with("math.floor", math::floor)
            .with("math.ceil", math::ceil)
            .with("json.parse", json::parse)
            .with("json.stringify", json::stringify)
    }

    pub fn with(mut self, name: &'static str, func: BuiltinFn) -> Self {
        self.table.insert(
            name,
            Builtin {
                name,
                func: NativeFn::Pure(func),
            },
        );
        self
    }

    pub fn with_output(
        mut self,
        name: &'static str,
        func: fn(&[Object]) -> Result<String, EvalError>,
    ) -> Self {
        self.table.insert(
            name,
            Builtin {
                name,
                func: NativeFn::Output(func),
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<Builtin> {
        self.table.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.table.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_has_namespaced_names() {
        let builtins = Builtins::standard();
        for name in ["count", "print", "array.sort", "math.sqrt", "json.parse"] {
            assert!(builtins.contains(name), "missing builtin {}", name);
        }
        assert!(builtins.get("nope").is_none());
    }

    #[test]
    fn test_every_namespaced_builtin_is_lexed_as_one_identifier() {
        for name in Builtins::standard().names() {
            let mut lexer = crate::lexer::Lexer::new(name);
            assert_eq!(lexer.next_token().literal, name);
        }
    }
}
