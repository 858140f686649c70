//! Runtime values.
//!
//! Arrays, hashes and sets are shared by reference: every binding holding the
//! same array sees in-place mutation through any of them. `:=` is the only
//! operation that copies them.

pub mod environment;
pub mod methods;
pub mod typing;

pub use environment::Environment;

use crate::ast::FunctionLiteral;
use crate::interpreter::error::EvalError;
use crate::stack::ensure_sufficient_stack;
use indexmap::IndexMap;
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Longest string, in bytes, or array, in elements, that one operation may build.
pub const MAX_BUILD_LEN: usize = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Integer,
    Float,
    String,
    Boolean,
    Null,
    Array,
    Hash,
    Set,
    Function,
    Builtin,
    Module,
}

impl ObjectType {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Float => "FLOAT",
            ObjectType::String => "STRING",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::Null => "NULL",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
            ObjectType::Set => "SET",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::Module => "MODULE",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage key of a hash entry, derived from the key's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub ty: ObjectType,
    pub value: u64,
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a.
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// A hash entry keeps the original key for display and iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

pub type Pairs = IndexMap<HashKey, HashPair>;

pub type BuiltinFn = fn(&[Object]) -> Result<Object, EvalError>;

#[derive(Clone, Copy)]
pub enum NativeFn {
    Pure(BuiltinFn),
    /// Renders text for the interpreter's output sink and evaluates to Null.
    Output(fn(&[Object]) -> Result<String, EvalError>),
}

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: NativeFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// A closure: the function's code plus the scope it was created in.
pub struct Function {
    pub literal: Rc<FunctionLiteral>,
    pub env: Environment,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function(fn{})", self.literal)
    }
}

#[derive(Debug)]
pub struct Module {
    pub name: String,
    pub attrs: Rc<RefCell<Pairs>>,
}

#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    Boolean(bool),
    Null,
    Array(Rc<RefCell<Vec<Object>>>),
    Hash(Rc<RefCell<Pairs>>),
    Set(Rc<RefCell<Vec<Object>>>),
    Function(Rc<Function>),
    Builtin(Builtin),
    Module(Rc<Module>),
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Float(a), Object::Float(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Array(a), Object::Array(b)) | (Object::Set(a), Object::Set(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => a == b,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a.name == b.name,
            (Object::Module(a), Object::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Integer(value)
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Object::Float(value)
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Boolean(value)
    }
}

impl From<&str> for Object {
    fn from(value: &str) -> Self {
        Object::String(Rc::from(value))
    }
}

impl From<String> for Object {
    fn from(value: String) -> Self {
        Object::String(Rc::from(value))
    }
}

impl From<Vec<Object>> for Object {
    fn from(elements: Vec<Object>) -> Self {
        Object::Array(Rc::new(RefCell::new(elements)))
    }
}

impl Object {
    pub fn new_hash(pairs: Pairs) -> Self {
        Object::Hash(Rc::new(RefCell::new(pairs)))
    }

    /// Builds a set, dropping elements whose inspect string repeats.
    pub fn new_set(elements: impl IntoIterator<Item = Object>) -> Self {
        let mut unique: Vec<Object> = Vec::new();
        for element in elements {
            if !contains_by_inspect(&unique, &element) {
                unique.push(element);
            }
        }
        Object::Set(Rc::new(RefCell::new(unique)))
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Float(_) => ObjectType::Float,
            Object::String(_) => ObjectType::String,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::Null => ObjectType::Null,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::Set(_) => ObjectType::Set,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::Module(_) => ObjectType::Module,
        }
    }

    /// Display form used by `print`, string conversion and membership tests.
    /// A container met again inside itself prints as `[...]` or `{...}`.
    pub fn inspect(&self) -> String {
        let mut out = String::new();
        self.write_inspect(&mut out, &mut Vec::new(), false);
        out
    }

    /// `open` holds the containers being printed further up the tree.
    fn write_inspect(&self, out: &mut String, open: &mut Vec<*const ()>, quote: bool) {
        let id = self.container_id();
        if let Some(id) = id {
            if open.contains(&id) {
                out.push_str(if matches!(self, Object::Array(_)) { "[...]" } else { "{...}" });
                return;
            }
            open.push(id);
        }

        ensure_sufficient_stack(|| match self {
            Object::Integer(value) => out.push_str(&value.to_string()),
            Object::Float(value) => out.push_str(&format_float(*value)),
            Object::String(value) if quote => {
                out.push('"');
                out.push_str(value);
                out.push('"');
            }
            Object::String(value) => out.push_str(value),
            Object::Boolean(value) => out.push_str(&value.to_string()),
            Object::Null => out.push_str("null"),
            Object::Array(elements) => {
                out.push('[');
                write_all(out, &elements.borrow(), open);
                out.push(']');
            }
            Object::Set(elements) => {
                out.push('{');
                write_all(out, &elements.borrow(), open);
                out.push('}');
            }
            Object::Hash(pairs) => {
                out.push('{');
                for (i, pair) in pairs.borrow().values().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    pair.key.write_inspect(out, open, true);
                    out.push_str(": ");
                    pair.value.write_inspect(out, open, true);
                }
                out.push('}');
            }
            Object::Function(function) => out.push_str(&format!("fn{}", function.literal)),
            Object::Builtin(_) => out.push_str("builtin function"),
            Object::Module(module) => out.push_str(&format!("<module {}>", module.name)),
        });

        if id.is_some() {
            open.pop();
        }
    }

    /// Identity of a mutable container, `None` for every other value.
    pub(crate) fn container_id(&self) -> Option<*const ()> {
        match self {
            Object::Array(elements) | Object::Set(elements) => Some(Rc::as_ptr(elements).cast()),
            Object::Hash(pairs) => Some(Rc::as_ptr(pairs).cast()),
            _ => None,
        }
    }

    /// `None` for values that cannot key a hash.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Integer(value) => *value as u64,
            Object::Boolean(value) => u64::from(*value),
            Object::String(value) => fnv1a_64(value.as_bytes()),
            _ => return None,
        };
        Some(HashKey {
            ty: self.object_type(),
            value,
        })
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Null => false,
            Object::Boolean(value) => *value,
            Object::Integer(value) => *value != 0,
            Object::String(value) => !value.is_empty(),
            Object::Array(elements) => !elements.borrow().is_empty(),
            Object::Hash(pairs) => !pairs.borrow().is_empty(),
            _ => true,
        }
    }

    /// Copy used by `:=`. Arrays, hashes and sets are copied recursively;
    /// everything else is returned as is. Shared and cyclic references keep
    /// their shape in the copy.
    pub fn deep_copy(&self) -> Object {
        self.copy_into(&mut HashMap::new())
    }

    fn copy_into(&self, copies: &mut HashMap<*const (), Object>) -> Object {
        let Some(id) = self.container_id() else {
            return self.clone();
        };
        if let Some(copy) = copies.get(&id) {
            return copy.clone();
        }

        ensure_sufficient_stack(|| match self {
            Object::Array(elements) | Object::Set(elements) => {
                let cell = Rc::new(RefCell::new(Vec::new()));
                let copy = match self {
                    Object::Set(_) => Object::Set(Rc::clone(&cell)),
                    _ => Object::Array(Rc::clone(&cell)),
                };
                copies.insert(id, copy.clone());
                let copied: Vec<Object> = elements.borrow().iter().map(|e| e.copy_into(copies)).collect();
                *cell.borrow_mut() = copied;
                copy
            }
            Object::Hash(pairs) => {
                let cell = Rc::new(RefCell::new(Pairs::default()));
                let copy = Object::Hash(Rc::clone(&cell));
                copies.insert(id, copy.clone());
                let copied: Pairs = pairs
                    .borrow()
                    .iter()
                    .map(|(key, pair)| {
                        let value = pair.value.copy_into(copies);
                        (*key, HashPair { key: pair.key.clone(), value })
                    })
                    .collect();
                *cell.borrow_mut() = copied;
                copy
            }
            other => other.clone(),
        })
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Object::Integer(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        if let Object::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Object::String(value) = self {
            Some(value)
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Object::Boolean(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<Ref<'_, Vec<Object>>> {
        if let Object::Array(elements) = self {
            Some(elements.borrow())
        } else {
            None
        }
    }

    pub fn as_hash(&self) -> Option<Ref<'_, Pairs>> {
        if let Object::Hash(pairs) = self {
            Some(pairs.borrow())
        } else {
            None
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect())
    }
}

pub(crate) fn format_float(value: f64) -> String {
    let formatted = value.to_string();
    if !value.is_finite() || formatted.contains(['.', 'e', 'E']) {
        formatted
    } else {
        format!("{}.0", formatted)
    }
}

fn write_all(out: &mut String, elements: &[Object], open: &mut Vec<*const ()>) {
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        element.write_inspect(out, open, false);
    }
}

/// Membership by inspect string, as used by sets and `index_of`.
pub fn contains_by_inspect(elements: &[Object], needle: &Object) -> bool {
    position_by_inspect(elements, needle).is_some()
}

pub fn position_by_inspect(elements: &[Object], needle: &Object) -> Option<usize> {
    let needle = needle.inspect();
    elements.iter().position(|element| element.inspect() == needle)
}
