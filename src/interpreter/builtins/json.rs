//! `json.parse` and `json.stringify`, backed by `serde_json`.

use super::super::error::EvalError;
use super::{require_args, with_string};
use crate::object::{HashPair, Object, Pairs};
use crate::stack::ensure_sufficient_stack;
use serde_json::{Map, Number, Value};

pub fn parse(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "json.parse");
    with_string!(args, "json.parse", |s: &str| {
        serde_json::from_str::<Value>(s)
            .map(json_to_object)
            .map_err(|e| EvalError::custom(format!("json.parse: {}", e)))
    })
}

pub fn stringify(args: &[Object]) -> Result<Object, EvalError> {
    require_args!(args, 1, "json.stringify");
    let value = object_to_json(&args[0])?;
    Ok(Object::from(value.to_string()))
}

pub fn json_to_object(value: Value) -> Object {
    match value {
        Value::Null => Object::Null,
        Value::Bool(b) => Object::Boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Object::Integer(i),
            None => Object::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Object::from(s),
        Value::Array(items) => Object::from(items.into_iter().map(json_to_object).collect::<Vec<_>>()),
        Value::Object(map) => {
            let mut pairs = Pairs::new();
            for (key, value) in map {
                let key = Object::from(key);
                if let Some(hash_key) = key.hash_key() {
                    pairs.insert(
                        hash_key,
                        HashPair {
                            key,
                            value: json_to_object(value),
                        },
                    );
                }
            }
            Object::new_hash(pairs)
        }
    }
}

pub fn object_to_json(object: &Object) -> Result<Value, EvalError> {
    to_json(object, &mut Vec::new())
}

/// `open` holds the containers being serialized further up the tree.
fn to_json(object: &Object, open: &mut Vec<*const ()>) -> Result<Value, EvalError> {
    let id = object.container_id();
    if let Some(id) = id {
        if open.contains(&id) {
            return Err(EvalError::custom(format!(
                "json.stringify: cannot serialize {} that contains itself",
                object.object_type()
            )));
        }
        open.push(id);
    }

    let value = ensure_sufficient_stack(|| {
        Ok(match object {
            Object::Null => Value::Null,
            Object::Boolean(b) => Value::Bool(*b),
            Object::Integer(i) => Value::Number((*i).into()),
            Object::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Object::String(s) => Value::String(s.to_string()),
            Object::Array(elements) | Object::Set(elements) => Value::Array(
                elements
                    .borrow()
                    .iter()
                    .map(|element| to_json(element, open))
                    .collect::<Result<_, _>>()?,
            ),
            Object::Hash(pairs) => {
                let mut map = Map::new();
                for pair in pairs.borrow().values() {
                    map.insert(pair.key.inspect(), to_json(&pair.value, open)?);
                }
                Value::Object(map)
            }
            other => {
                return Err(EvalError::type_error(format!(
                    "json.stringify: cannot serialize {}",
                    other.object_type()
                )))
            }
        })
    })?;

    if id.is_some() {
        open.pop();
    }
    Ok(value)
}
