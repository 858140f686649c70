//! Argument checks shared by the method tables and the builtin registry.
//!
//! ```ignore
//! check("String.equals", args, &[exact_args(1), with_types(&[ObjectType::String])])?;
//! ```

use super::{Object, ObjectType};
use crate::interpreter::error::EvalError;

#[derive(Debug, Clone, Copy)]
pub enum Check<'a> {
    Exact(usize),
    Min(usize),
    Range(usize, usize),
    Types(&'a [ObjectType]),
}

pub fn exact_args(n: usize) -> Check<'static> {
    Check::Exact(n)
}

pub fn min_args(n: usize) -> Check<'static> {
    Check::Min(n)
}

pub fn args_range(min: usize, max: usize) -> Check<'static> {
    Check::Range(min, max)
}

/// Leading arguments must have these types. Missing arguments are not
/// reported here; pair with a count check.
pub fn with_types(types: &[ObjectType]) -> Check<'_> {
    Check::Types(types)
}

impl Check<'_> {
    fn run(&self, name: &str, args: &[Object]) -> Result<(), EvalError> {
        let given = args.len();
        match *self {
            Check::Exact(n) if given != n => Err(EvalError::type_error(format!(
                "TypeError: {}() takes exactly {} argument ({} given)",
                name, n, given
            ))),
            Check::Min(n) if given < n => Err(EvalError::type_error(format!(
                "TypeError: {}() takes a minimum {} arguments ({} given)",
                name, n, given
            ))),
            Check::Range(min, max) if given < min || given > max => {
                Err(EvalError::type_error(format!(
                    "TypeError: {}() takes at least {} arguments at most {} ({} given)",
                    name, min, max, given
                )))
            }
            Check::Types(types) => {
                for (i, (expected, arg)) in types.iter().zip(args).enumerate() {
                    if arg.object_type() != *expected {
                        return Err(EvalError::type_error(format!(
                            "TypeError: {}() expected argument #{} to be `{}` got `{}`",
                            name,
                            i + 1,
                            expected,
                            arg.object_type()
                        )));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Runs every check in order, stopping at the first failure.
pub fn check(name: &str, args: &[Object], checks: &[Check<'_>]) -> Result<(), EvalError> {
    checks.iter().try_for_each(|c| c.run(name, args))
}

/// The integer at `index`, or a type error naming the parameter.
pub fn integer_arg(name: &str, args: &[Object], index: usize, param: &str) -> Result<i64, EvalError> {
    match args.get(index) {
        Some(Object::Integer(value)) => Ok(*value),
        Some(other) => Err(EvalError::type_error(format!(
            "TypeError: {}() argument `{}` must be INTEGER, got {}",
            name,
            param,
            other.object_type()
        ))),
        None => Err(EvalError::type_error(format!(
            "TypeError: {}() missing argument `{}`",
            name, param
        ))),
    }
}

/// Integer or Float at `index` as `f64`.
pub fn number_arg(name: &str, args: &[Object], index: usize) -> Result<f64, EvalError> {
    match args.get(index) {
        Some(Object::Integer(value)) => Ok(*value as f64),
        Some(Object::Float(value)) => Ok(*value),
        Some(other) => Err(EvalError::type_error(format!(
            "TypeError: {}() expected argument #{} to be a number got `{}`",
            name,
            index + 1,
            other.object_type()
        ))),
        None => Err(EvalError::type_error(format!(
            "TypeError: {}() missing argument #{}",
            name,
            index + 1
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_args_message() {
        let err = check("String.reverse", &[Object::Integer(1)], &[exact_args(0)]).unwrap_err();
        assert_eq!(
            err.message(),
            "TypeError: String.reverse() takes exactly 0 argument (1 given)"
        );
    }

    #[test]
    fn test_range_and_min() {
        let args = [Object::Null, Object::Null, Object::Null, Object::Null];
        assert!(check("fill", &args, &[args_range(1, 3)]).is_err());
        assert!(check("fill", &args[..2], &[args_range(1, 3)]).is_ok());
        assert_eq!(
            check("append", &[], &[min_args(1)]).unwrap_err().message(),
            "TypeError: append() takes a minimum 1 arguments (0 given)"
        );
    }

    #[test]
    fn test_with_types_stops_at_first_mismatch() {
        let args = [Object::from("a"), Object::Integer(1)];
        let err = check(
            "f",
            &args,
            &[exact_args(2), with_types(&[ObjectType::String, ObjectType::String])],
        )
        .unwrap_err();
        assert_eq!(
            err.message(),
            "TypeError: f() expected argument #2 to be `STRING` got `INTEGER`"
        );
    }

    #[test]
    fn test_number_arg_accepts_int_and_float() {
        let args = [Object::Integer(2), Object::Float(0.5), Object::Null];
        assert_eq!(number_arg("pow", &args, 0).unwrap(), 2.0);
        assert_eq!(number_arg("pow", &args, 1).unwrap(), 0.5);
        assert!(number_arg("pow", &args, 2).is_err());
        assert!(number_arg("pow", &args, 3).is_err());
    }
}
