//! `array.*` free functions. Out-of-range reads give Null rather than an error.

use super::super::error::EvalError;
use super::{require_args, with_array};
use crate::object::methods::{element_at, sort_elements};
use crate::object::typing::{args_range, check, integer_arg, min_args};
use crate::object::{position_by_inspect, Object, MAX_BUILD_LEN};
use std::cell::RefCell;
use std::rc::Rc;

type Elements = Rc<RefCell<Vec<Object>>>;

/// `array.new(n)` gives `n` nulls, `array.new(n, fill)` repeats `fill`.
pub fn new(args: &[Object]) -> Result<Object, EvalError> {
    check("array.new", args, &[args_range(1, 2)])?;
    let size = integer_arg("array.new", args, 0, "size")?;
    let size = usize::try_from(size).map_err(|_| {
        EvalError::type_error(format!("array.new() size must not be negative, got {}", size))
    })?;
    if size > MAX_BUILD_LEN {
        return Err(EvalError::custom(format!(
            "array.new() size {} exceeds the limit of {}",
            size, MAX_BUILD_LEN
        )));
    }
    let fill = args.get(1).cloned().unwrap_or(Object::Null);
    Ok(Object::from(vec![fill; size]))
}

pub fn get(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 2, "array.get");
    let index = integer_arg("array.get", args, 1, "index")?;
    with_array!(args, "get", |elements: &Elements| Ok(element_at(&elements.borrow(), index)))
}

pub fn get_first(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "array.getFirst");
    with_array!(args, "getFirst", |elements: &Elements| {
        Ok(elements.borrow().first().cloned().unwrap_or(Object::Null))
    })
}

pub fn get_last(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "array.getLast");
    with_array!(args, "getLast", |elements: &Elements| {
        Ok(elements.borrow().last().cloned().unwrap_or(Object::Null))
    })
}

/// Removes and returns the last element, Null when empty.
pub fn pop(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "array.pop");
    with_array!(args, "pop", |elements: &Elements| {
        Ok(elements.borrow_mut().pop().unwrap_or(Object::Null))
    })
}

/// Appends in place and returns the same array.
pub fn append(args: &[Object]) -> Result<Object, EvalError> {
    check("array.append", args, &[min_args(2)])?;
    with_array!(args, "append", |elements: &Elements| {
        elements.borrow_mut().extend(args[1..].iter().cloned());
        Ok(args[0].clone())
    })
}

pub fn index_of(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 2, "array.indexOf");
    with_array!(args, "indexOf", |elements: &Elements| {
        let index = position_by_inspect(&elements.borrow(), &args[1]);
        Ok(Object::Integer(index.map_or(-1, |i| i as i64)))
    })
}

/// Sorted copy; the argument is left untouched.
pub fn sort(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "array.sort");
    with_array!(args, "sort", |elements: &Elements| -> Result<Object, EvalError> {
        let mut sorted = elements.borrow().clone();
        sort_elements("array.sort", &mut sorted)?;
        Ok(Object::from(sorted))
    })
}

/// Everything after the first element, Null for an empty array.
pub fn rest(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "array.rest");
    with_array!(args, "rest", |elements: &Elements| {
        let elements = elements.borrow();
        Ok(match elements.split_first() {
            Some((_, tail)) => Object::from(tail.to_vec()),
            None => Object::Null,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Object {
        Object::from(values.iter().copied().map(Object::Integer).collect::<Vec<_>>())
    }

    #[test]
    fn test_new_fills() {
        assert_eq!(new(&[Object::Integer(2)]).unwrap().inspect(), "[null, null]");
        assert_eq!(new(&[Object::Integer(3), Object::Integer(0)]).unwrap().inspect(), "[0, 0, 0]");
        assert!(new(&[Object::Integer(-1)]).is_err());
    }

    #[test]
    fn test_get_out_of_range_is_null() {
        let arr = ints(&[1, 2]);
        assert_eq!(get(&[arr.clone(), Object::Integer(1)]).unwrap(), Object::Integer(2));
        assert_eq!(get(&[arr, Object::Integer(2)]).unwrap(), Object::Null);
        assert!(get(&[Object::Null, Object::Integer(0)]).is_err());
    }

    #[test]
    fn test_sort_returns_copy() {
        let arr = ints(&[3, 1, 2]);
        assert_eq!(sort(&[arr.clone()]).unwrap().inspect(), "[1, 2, 3]");
        assert_eq!(arr.inspect(), "[3, 1, 2]");
    }

    #[test]
    fn test_append_pop_rest() {
        let arr = ints(&[1]);
        append(&[arr.clone(), Object::Integer(2), Object::Integer(3)]).unwrap();
        assert_eq!(arr.inspect(), "[1, 2, 3]");
        assert_eq!(pop(&[arr.clone()]).unwrap(), Object::Integer(3));
        assert_eq!(rest(&[arr]).unwrap().inspect(), "[2]");
        assert_eq!(rest(&[ints(&[])]).unwrap(), Object::Null);
        assert_eq!(index_of(&[ints(&[4, 5]), Object::Integer(5)]).unwrap(), Object::Integer(1));
    }
}
