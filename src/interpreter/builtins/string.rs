use super::super::error::EvalError;
use super::{require_args, with_string};
use crate::object::typing::{check, exact_args, with_types};
use crate::object::{Object, ObjectType};

pub fn upper(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "string.upper");
    with_string!(args, "upper", |s: &str| Ok(Object::from(s.to_uppercase())))
}

pub fn lower(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "string.lower");
    with_string!(args, "lower", |s: &str| Ok(Object::from(s.to_lowercase())))
}

pub fn contains(args: &[Object]) -> Result<Object, EvalError> {
    check(
        "string.contains",
        args,
        &[exact_args(2), with_types(&[ObjectType::String, ObjectType::String])],
    )?;
    let haystack = args[0].as_str().unwrap_or_default();
    let needle = args[1].as_str().unwrap_or_default();
    Ok(Object::Boolean(haystack.contains(needle)))
}
