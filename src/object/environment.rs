use super::{HashPair, Object, Pairs};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

struct Scope {
    store: RefCell<IndexMap<Rc<str>, Object>>,
    outer: Option<Environment>,
}

/// A lexical scope chained to its enclosing scope.
///
/// Cloning is cheap and yields a handle to the same scope, so a closure and
/// the frame that created it observe each other's writes.
#[derive(Clone)]
pub struct Environment {
    scope: Rc<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        Self::with_outer(None)
    }

    /// A fresh scope whose lookups fall back to `outer`.
    pub fn enclosed(outer: &Environment) -> Self {
        Self::with_outer(Some(outer.clone()))
    }

    fn with_outer(outer: Option<Environment>) -> Self {
        Self {
            scope: Rc::new(Scope {
                store: RefCell::new(IndexMap::new()),
                outer,
            }),
        }
    }

    /// Get a variable, searching from innermost to outermost scope.
    pub fn get(&self, name: &str) -> Option<Object> {
        if let Some(value) = self.scope.store.borrow().get(name) {
            return Some(value.clone());
        }
        self.scope.outer.as_ref().and_then(|outer| outer.get(name))
    }

    /// Bind `name` in this scope, shadowing any outer binding.
    pub fn define(&self, name: impl Into<Rc<str>>, value: Object) {
        self.scope.store.borrow_mut().insert(name.into(), value);
    }

    /// Update the nearest existing binding of `name`.
    /// Returns false if no scope in the chain binds it.
    pub fn assign(&self, name: &str, value: Object) -> bool {
        {
            let mut store = self.scope.store.borrow_mut();
            if let Some(slot) = store.get_mut(name) {
                *slot = value;
                return true;
            }
        }
        match &self.scope.outer {
            Some(outer) => outer.assign(name, value),
            None => false,
        }
    }

    /// Update the nearest binding, or define it here when there is none.
    pub fn set(&self, name: &str, value: Object) {
        if !self.assign(name, value.clone()) {
            self.define(name, value);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Bindings of this scope whose name starts with an uppercase letter,
    /// keyed by name, in definition order. Outer scopes are not consulted.
    pub fn exported(&self) -> Pairs {
        let store = self.scope.store.borrow();
        let mut exports = IndexMap::new();
        for (name, value) in store.iter() {
            if !name.chars().next().is_some_and(char::is_uppercase) {
                continue;
            }
            let key = Object::String(name.clone());
            if let Some(hash_key) = key.hash_key() {
                exports.insert(
                    hash_key,
                    HashPair {
                        key,
                        value: value.clone(),
                    },
                );
            }
        }
        exports
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// Closures stored in a scope point back at it, so only names are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.scope.store.borrow();
        f.debug_struct("Environment")
            .field("names", &store.keys().collect::<Vec<_>>())
            .field("has_outer", &self.scope.outer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_define_get() {
        let env = Environment::new();
        env.define("x", Object::Integer(42));
        assert_eq!(env.get("x"), Some(Object::Integer(42)));
        assert_eq!(env.get("y"), None);
    }

    #[test]
    fn test_enclosed_shadowing() {
        let outer = Environment::new();
        outer.define("x", Object::Integer(1));

        let inner = Environment::enclosed(&outer);
        inner.define("x", Object::Integer(2));
        assert_eq!(inner.get("x"), Some(Object::Integer(2)));
        assert_eq!(outer.get("x"), Some(Object::Integer(1)));
    }

    #[test]
    fn test_assign_updates_outer_scope() {
        let outer = Environment::new();
        outer.define("x", Object::Integer(1));

        let inner = Environment::enclosed(&outer);
        assert!(inner.assign("x", Object::Integer(2)));
        assert_eq!(outer.get("x"), Some(Object::Integer(2)));
        assert!(!inner.assign("missing", Object::Null));
    }

    #[test]
    fn test_set_defines_when_unbound() {
        let outer = Environment::new();
        let inner = Environment::enclosed(&outer);
        inner.set("y", Object::Integer(3));
        assert_eq!(inner.get("y"), Some(Object::Integer(3)));
        assert_eq!(outer.get("y"), None);
    }

    #[test]
    fn test_clones_share_scope() {
        let env = Environment::new();
        let alias = env.clone();
        alias.define("z", Object::Boolean(true));
        assert!(env.contains("z"));
    }

    #[test]
    fn test_exported_keeps_uppercase_names() {
        let outer = Environment::new();
        outer.define("Outer", Object::Integer(0));
        let env = Environment::enclosed(&outer);
        env.define("x", Object::Integer(1));
        env.define("X", Object::Integer(2));
        env.define("_Y", Object::Integer(3));

        let exports = env.exported();
        let names: Vec<String> = exports.values().map(|p| p.key.inspect()).collect();
        assert_eq!(names, vec!["X".to_string()]);
    }
}
