//! Per-type method tables behind `value.method(args)`.
//!
//! Each dispatcher returns `None` when the type has no such method, letting
//! the evaluator report a missing member with the call's position.

use super::typing::{args_range, check, exact_args, integer_arg, min_args, with_types};
use super::{position_by_inspect, HashPair, Object, ObjectType, Pairs};
use crate::interpreter::error::{EvalError, EvalErrorKind};
use std::cell::RefCell;
use std::rc::Rc;

type MethodResult = Option<Result<Object, EvalError>>;

impl Object {
    pub fn invoke_method(&self, method: &str, args: &[Object]) -> MethodResult {
        match self {
            Object::String(value) => string_method(value, method, args),
            Object::Integer(value) => integer_method(*value, method, args),
            Object::Float(value) => float_method(*value, method, args),
            Object::Array(elements) => array_method(self, elements, method, args),
            Object::Hash(pairs) => hash_method(self, pairs, method, args),
            Object::Set(elements) => set_method(self, elements, method, args),
            _ => None,
        }
    }
}

fn no_args(name: &str, args: &[Object]) -> Result<(), EvalError> {
    check(name, args, &[exact_args(0)])
}

/// Runs `body` after a zero-argument check.
fn nullary(name: &str, args: &[Object], body: impl FnOnce() -> Object) -> MethodResult {
    Some(no_args(name, args).map(|_| body()))
}

fn string_method(value: &str, method: &str, args: &[Object]) -> MethodResult {
    let name = format!("String.{}", method);
    match method {
        "count" | "length" | "len" => nullary(&name, args, || {
            Object::Integer(value.chars().count() as i64)
        }),
        "reverse" => nullary(&name, args, || Object::from(value.chars().rev().collect::<String>())),
        "empty" => nullary(&name, args, || Object::Boolean(value.is_empty())),
        "upper_case" => nullary(&name, args, || Object::from(value.to_uppercase())),
        "lower_case" => nullary(&name, args, || Object::from(value.to_lowercase())),
        "trim" => nullary(&name, args, || Object::from(value.trim())),
        "to_int" => nullary(&name, args, || Object::Integer(parse_int_prefixed(value).unwrap_or(0))),
        "equals" | "contains" | "split" => {
            let other = match check(&name, args, &[exact_args(1), with_types(&[ObjectType::String])]) {
                Ok(()) => args[0].as_str().unwrap_or_default(),
                Err(err) => return Some(Err(err)),
            };
            Some(Ok(match method {
                "equals" => Object::Boolean(value == other),
                "contains" => Object::Boolean(value.contains(other)),
                _ => split(value, other),
            }))
        }
        _ => None,
    }
}

fn split(value: &str, separator: &str) -> Object {
    let parts: Vec<Object> = if separator.is_empty() {
        value.chars().map(|c| Object::from(c.to_string())).collect()
    } else {
        value.split(separator).map(Object::from).collect()
    };
    Object::from(parts)
}

/// Integer parsing that understands `0x`, `0o` and `0b` prefixes.
pub(crate) fn parse_int_prefixed(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (radix, digits) = match digits.get(..2) {
        Some("0x") | Some("0X") => (16, &digits[2..]),
        Some("0o") | Some("0O") => (8, &digits[2..]),
        Some("0b") | Some("0B") => (2, &digits[2..]),
        _ => (10, digits),
    };
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn integer_method(value: i64, method: &str, args: &[Object]) -> MethodResult {
    let name = format!("Integer.{}", method);
    match method {
        "to_string" => nullary(&name, args, || Object::from(value.to_string())),
        "to_float" => nullary(&name, args, || Object::Float(value as f64)),
        "abs" => nullary(&name, args, || Object::Integer(value.wrapping_abs())),
        _ => None,
    }
}

fn float_method(value: f64, method: &str, args: &[Object]) -> MethodResult {
    let name = format!("Float.{}", method);
    match method {
        "to_string" => nullary(&name, args, || Object::from(Object::Float(value).inspect())),
        "to_int" => nullary(&name, args, || Object::Integer(value.trunc() as i64)),
        "round" => nullary(&name, args, || Object::Integer(value.round() as i64)),
        "floor" => nullary(&name, args, || Object::Integer(value.floor() as i64)),
        "ceil" => nullary(&name, args, || Object::Integer(value.ceil() as i64)),
        _ => None,
    }
}

fn array_method(
    this: &Object,
    elements: &Rc<RefCell<Vec<Object>>>,
    method: &str,
    args: &[Object],
) -> MethodResult {
    let name = format!("Array.{}", method);
    let result = match method {
        "count" | "length" => {
            no_args(&name, args).map(|_| Object::Integer(elements.borrow().len() as i64))
        }
        "append" => check(&name, args, &[min_args(1)]).map(|_| {
            elements.borrow_mut().extend(args.iter().cloned());
            this.clone()
        }),
        "fill" => fill(&name, elements, args).map(|_| this.clone()),
        "sort" => no_args(&name, args)
            .and_then(|_| sort_elements(&name, &mut elements.borrow_mut()))
            .map(|_| this.clone()),
        "get" => check(&name, args, &[exact_args(1)])
            .and_then(|_| integer_arg(&name, args, 0, "index"))
            .map(|index| element_at(&elements.borrow(), index)),
        "get_first" => no_args(&name, args)
            .map(|_| elements.borrow().first().cloned().unwrap_or(Object::Null)),
        "get_last" => no_args(&name, args)
            .map(|_| elements.borrow().last().cloned().unwrap_or(Object::Null)),
        "pop" => no_args(&name, args).map(|_| elements.borrow_mut().pop().unwrap_or(Object::Null)),
        "index_of" => check(&name, args, &[exact_args(1)]).map(|_| {
            let index = position_by_inspect(&elements.borrow(), &args[0]);
            Object::Integer(index.map_or(-1, |i| i as i64))
        }),
        "contains" => check(&name, args, &[exact_args(1)])
            .map(|_| Object::Boolean(position_by_inspect(&elements.borrow(), &args[0]).is_some())),
        "join" => check(&name, args, &[args_range(0, 1), with_types(&[ObjectType::String])]).map(|_| {
            let separator = args.first().and_then(Object::as_str).unwrap_or("");
            let parts: Vec<String> = elements.borrow().iter().map(Object::inspect).collect();
            Object::from(parts.join(separator))
        }),
        "to_string" => no_args(&name, args).map(|_| Object::from(this.inspect())),
        _ => return None,
    };
    Some(result)
}

/// Element at `index`, Null when out of range. Negative indices are out of range.
pub(crate) fn element_at(elements: &[Object], index: i64) -> Object {
    usize::try_from(index)
        .ok()
        .and_then(|i| elements.get(i))
        .cloned()
        .unwrap_or(Object::Null)
}

fn fill(name: &str, elements: &Rc<RefCell<Vec<Object>>>, args: &[Object]) -> Result<(), EvalError> {
    check(name, args, &[args_range(1, 3)])?;
    let mut elements = elements.borrow_mut();
    let len = elements.len() as i64;
    let start = if args.len() > 1 { integer_arg(name, args, 1, "start")? } else { 0 };
    let end = if args.len() > 2 { integer_arg(name, args, 2, "end")? } else { len };
    let start = start.clamp(0, len) as usize;
    let end = end.clamp(0, len) as usize;
    for slot in elements.iter_mut().take(end).skip(start) {
        *slot = args[0].clone();
    }
    Ok(())
}

/// Sorts an all-integer or all-string array in place.
pub(crate) fn sort_elements(name: &str, elements: &mut [Object]) -> Result<(), EvalError> {
    if elements.iter().all(|e| matches!(e, Object::Integer(_))) {
        elements.sort_by_key(|e| e.as_integer().unwrap_or_default());
        return Ok(());
    }
    if elements.iter().all(|e| matches!(e, Object::String(_))) {
        elements.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        return Ok(());
    }
    Err(EvalError::type_error(format!(
        "TypeError: {}() can only sort arrays of INTEGER or STRING",
        name
    )))
}

fn hash_key_of(key: &Object) -> Result<super::HashKey, EvalError> {
    key.hash_key()
        .ok_or_else(|| EvalErrorKind::NotHashable(key.object_type()).into())
}

fn hash_method(this: &Object, pairs: &Rc<RefCell<Pairs>>, method: &str, args: &[Object]) -> MethodResult {
    let name = format!("Hash.{}", method);
    let collect = |f: fn(&HashPair) -> Object| {
        Object::from(pairs.borrow().values().map(f).collect::<Vec<_>>())
    };
    let result = match method {
        "count" | "length" => no_args(&name, args).map(|_| Object::Integer(pairs.borrow().len() as i64)),
        "keys" => no_args(&name, args).map(|_| collect(|pair| pair.key.clone())),
        "values" => no_args(&name, args).map(|_| collect(|pair| pair.value.clone())),
        "entries" => no_args(&name, args)
            .map(|_| collect(|pair| Object::from(vec![pair.key.clone(), pair.value.clone()]))),
        "get" => check(&name, args, &[args_range(1, 2)])
            .and_then(|_| hash_key_of(&args[0]))
            .map(|key| match pairs.borrow().get(&key) {
                Some(pair) => pair.value.clone(),
                None => args.get(1).cloned().unwrap_or(Object::Null),
            }),
        "set" => check(&name, args, &[exact_args(2)])
            .and_then(|_| hash_key_of(&args[0]))
            .map(|key| {
                pairs.borrow_mut().insert(
                    key,
                    HashPair {
                        key: args[0].clone(),
                        value: args[1].clone(),
                    },
                );
                this.clone()
            }),
        "delete" => check(&name, args, &[exact_args(1)])
            .and_then(|_| hash_key_of(&args[0]))
            .map(|key| {
                pairs.borrow_mut().shift_remove(&key);
                this.clone()
            }),
        "contains" => check(&name, args, &[exact_args(1)])
            .and_then(|_| hash_key_of(&args[0]))
            .map(|key| Object::Boolean(pairs.borrow().contains_key(&key))),
        "to_string" => no_args(&name, args).map(|_| Object::from(this.inspect())),
        _ => return None,
    };
    Some(result)
}

fn set_method(
    this: &Object,
    elements: &Rc<RefCell<Vec<Object>>>,
    method: &str,
    args: &[Object],
) -> MethodResult {
    let name = format!("Set.{}", method);
    let result = match method {
        "insert" => check(&name, args, &[exact_args(1)]).map(|_| {
            let found = position_by_inspect(&elements.borrow(), &args[0]).is_some();
            if !found {
                elements.borrow_mut().push(args[0].clone());
            }
            this.clone()
        }),
        "delete" => check(&name, args, &[exact_args(1)]).map(|_| {
            let found = position_by_inspect(&elements.borrow(), &args[0]);
            if let Some(index) = found {
                elements.borrow_mut().remove(index);
            }
            this.clone()
        }),
        "contains" => check(&name, args, &[exact_args(1)])
            .map(|_| Object::Boolean(position_by_inspect(&elements.borrow(), &args[0]).is_some())),
        "size" => no_args(&name, args).map(|_| Object::Integer(elements.borrow().len() as i64)),
        "clear" => no_args(&name, args).map(|_| {
            elements.borrow_mut().clear();
            this.clone()
        }),
        "isEmpty" => no_args(&name, args).map(|_| Object::Boolean(elements.borrow().is_empty())),
        "to_array" => no_args(&name, args).map(|_| Object::from(elements.borrow().clone())),
        _ => return None,
    };
    Some(result)
}
