//! Mathematical built-in functions.

use super::super::error::EvalError;
use super::{require_args, with_number};
use crate::object::typing::{check, exact_args, integer_arg, number_arg};
use crate::object::Object;
use rand::Rng;

/// Integers pass through; floats round toward the named direction.
macro_rules! rounding_math {
    ($name:ident, $op:ident) => {
        pub fn $name(args: &[Object]) -> Result<Object, EvalError> {
            require_args!(args, 1, concat!("math.", stringify!($op)));
            match &args[0] {
                Object::Integer(n) => Ok(Object::Integer(*n)),
                _ => with_number!(args, stringify!($op), |n: f64| Ok(Object::Integer(
                    n.$op() as i64
                ))),
            }
        }
    };
}

rounding_math!(floor, floor);
rounding_math!(ceil, ceil);

pub fn abs(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "math.abs");
    match &args[0] {
        Object::Integer(n) => Ok(Object::Integer(n.wrapping_abs())),
        _ => with_number!(args, "abs", |n: f64| Ok(Object::Float(n.abs()))),
    }
}

/// Integer result for an integer base and non-negative integer exponent.
pub fn pow(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 2, "math.pow");
    if let (Object::Integer(base), Object::Integer(exp)) = (&args[0], &args[1]) {
        if let Ok(exp) = u32::try_from(*exp) {
            return Ok(Object::Integer(base.wrapping_pow(exp)));
        }
    }
    let base = number_arg("math.pow", args, 0)?;
    let exp = number_arg("math.pow", args, 1)?;
    Ok(Object::Float(base.powf(exp)))
}

pub fn sqrt(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "math.sqrt");
    with_number!(args, "sqrt", |n: f64| {
        if n < 0.0 {
            Err(EvalError::custom(format!("math.sqrt: negative number {}", n)))
        } else {
            Ok(Object::Float(n.sqrt()))
        }
    })
}

pub fn random(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 0, "math.rand");
    Ok(Object::Float(rand::thread_rng().r#gen::<f64>()))
}

pub fn random_float(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 0, "math.randomFloat");
    Ok(Object::Float(rand::thread_rng().r#gen::<f64>()))
}

/// `math.randomInt()` gives any non-negative integer, `math.randomInt(lo, hi)`
/// one in the inclusive range.
pub fn random_int(args: &[Object]) -> Result<Object, EvalError> {
    let mut rng = rand::thread_rng();
    if args.is_empty() {
        return Ok(Object::Integer(rng.gen_range(0..=i64::MAX)));
    }
    check("math.randomInt", args, &[exact_args(2)])?;
    let low = integer_arg("math.randomInt", args, 0, "low")?;
    let high = integer_arg("math.randomInt", args, 1, "high")?;
    if low > high {
        return Err(EvalError::custom(format!(
            "math.randomInt: empty range {}..={}",
            low, high
        )));
    }
    Ok(Object::Integer(rng.gen_range(low..=high)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_returns_integers() {
        assert_eq!(floor(&[Object::Float(2.7)]).unwrap(), Object::Integer(2));
        assert_eq!(ceil(&[Object::Float(2.1)]).unwrap(), Object::Integer(3));
        assert_eq!(floor(&[Object::Integer(5)]).unwrap(), Object::Integer(5));
        assert!(ceil(&[Object::from("x")]).is_err());
    }

    #[test]
    fn test_pow_and_sqrt() {
        assert_eq!(pow(&[Object::Integer(2), Object::Integer(10)]).unwrap(), Object::Integer(1024));
        assert_eq!(pow(&[Object::Integer(2), Object::Integer(-1)]).unwrap(), Object::Float(0.5));
        assert_eq!(sqrt(&[Object::Integer(9)]).unwrap(), Object::Float(3.0));
        assert!(sqrt(&[Object::Integer(-1)]).is_err());
    }

    #[test]
    fn test_random_int_stays_in_range() {
        for _ in 0..100 {
            let n = random_int(&[Object::Integer(1), Object::Integer(3)]).unwrap();
            assert!(matches!(n, Object::Integer(1..=3)));
        }
        assert!(random_int(&[Object::Integer(3), Object::Integer(1)]).is_err());
    }

    #[test]
    fn test_rand_is_unit_interval() {
        let value = random(&[]).unwrap().as_float().unwrap();
        assert!((0.0..1.0).contains(&value));
    }
}
