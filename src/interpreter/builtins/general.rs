//! Global builtins that are not namespaced.

use super::super::error::EvalError;
use super::require_args;
use crate::object::methods::parse_int_prefixed;
use crate::object::typing::{args_range, check};
use crate::object::Object;

pub fn count(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "count");
    let n = match &args[0] {
        Object::String(s) => s.chars().count(),
        Object::Array(elements) | Object::Set(elements) => elements.borrow().len(),
        Object::Hash(pairs) => pairs.borrow().len(),
        other => {
            return Err(EvalError::type_error(format!(
                "argument to `count` not supported, got {}",
                other.object_type()
            )))
        }
    };
    Ok(Object::Integer(n as i64))
}

pub fn type_of(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "type_of");
    Ok(Object::from(args[0].object_type().name()))
}

fn joined(args: &[Object]) -> String {
    args.iter().map(Object::inspect).collect::<Vec<_>>().join(" ")
}

pub fn print(args: &[Object]) -> Result<String, EvalError> {
    Ok(joined(args))
}

pub fn println(args: &[Object]) -> Result<String, EvalError> {
    Ok(joined(args) + "\n")
}

/// `Set()` or `Set(array)`; duplicates are dropped by inspect string.
pub fn set(args: &[Object]) -> Result<Object, EvalError> {
    check("Set", args, &[args_range(0, 1)])?;
    match args.first() {
        None => Ok(Object::new_set(Vec::new())),
        Some(Object::Array(elements)) | Some(Object::Set(elements)) => {
            Ok(Object::new_set(elements.borrow().iter().cloned()))
        }
        Some(other) => Err(EvalError::type_error(format!(
            "argument to `Set` must be ARRAY, got {}",
            other.object_type()
        ))),
    }
}

pub fn str(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "str");
    Ok(Object::from(args[0].inspect()))
}

pub fn int(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "int");
    match &args[0] {
        Object::Integer(n) => Ok(Object::Integer(*n)),
        Object::Float(f) => Ok(Object::Integer(f.trunc() as i64)),
        Object::Boolean(b) => Ok(Object::Integer(i64::from(*b))),
        Object::String(s) => parse_int_prefixed(s)
            .map(Object::Integer)
            .ok_or_else(|| EvalError::type_error(format!("could not convert '{}' to INTEGER", s))),
        other => Err(EvalError::type_error(format!(
            "argument to `int` not supported, got {}",
            other.object_type()
        ))),
    }
}

pub fn float(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "float");
    match &args[0] {
        Object::Integer(n) => Ok(Object::Float(*n as f64)),
        Object::Float(f) => Ok(Object::Float(*f)),
        Object::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Object::Float)
            .map_err(|_| EvalError::type_error(format!("could not convert '{}' to FLOAT", s))),
        other => Err(EvalError::type_error(format!(
            "argument to `float` not supported, got {}",
            other.object_type()
        ))),
    }
}
