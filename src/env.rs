// ABOUTME: Environment module for managing variable bindings and scopes
// ABOUTME: Scopes live in an arena addressed by EnvId handles rather than an
// ABOUTME: Rc-linked chain, so a closure captured by the scope it lives in
// ABOUTME: (the def-f-stores-itself cycle) doesn't leak

use std::collections::HashMap;

use crate::error::MinilangError;
use crate::value::Value;

/// A cheap, `Copy` handle into an `EnvArena`. Stable for the lifetime of the
/// arena that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvId(usize);

struct Scope {
    bindings: HashMap<String, Value>,
    parent: Option<EnvId>,
}

/// Owns every scope created during one evaluation. Environments are never
/// individually freed; the whole arena is dropped at interpreter teardown,
/// which is what lets a closure and the scope holding it reference each
/// other without a cycle collector.
#[derive(Default)]
pub struct EnvArena {
    scopes: Vec<Scope>,
}

impl EnvArena {
    pub fn new() -> Self {
        EnvArena { scopes: Vec::new() }
    }

    /// Creates a new environment with no parent (the evaluator's root).
    pub fn create_root(&mut self) -> EnvId {
        self.scopes.push(Scope {
            bindings: HashMap::new(),
            parent: None,
        });
        EnvId(self.scopes.len() - 1)
    }

    /// Creates a new environment whose parent is `parent`.
    pub fn create_child(&mut self, parent: EnvId) -> EnvId {
        self.scopes.push(Scope {
            bindings: HashMap::new(),
            parent: Some(parent),
        });
        EnvId(self.scopes.len() - 1)
    }

    /// Fails if `name` is already present in THIS scope; otherwise inserts.
    pub fn define(&mut self, env: EnvId, name: &str, value: Value) -> Result<(), MinilangError> {
        let scope = &mut self.scopes[env.0];
        if scope.bindings.contains_key(name) {
            return Err(MinilangError::AlreadyDefined {
                name: name.to_string(),
            });
        }
        scope.bindings.insert(name.to_string(), value);
        Ok(())
    }

    /// Searches `env` then its parents; writes to the scope that owns the
    /// name; fails if not found anywhere.
    pub fn assign(&mut self, env: EnvId, name: &str, value: Value) -> Result<(), MinilangError> {
        let mut cursor = Some(env);
        while let Some(id) = cursor {
            let scope = &mut self.scopes[id.0];
            if scope.bindings.contains_key(name) {
                scope.bindings.insert(name.to_string(), value);
                return Ok(());
            }
            cursor = scope.parent;
        }
        Err(MinilangError::NotDefined {
            name: name.to_string(),
        })
    }

    /// Same search as `assign`; returns the value or fails if not found.
    pub fn get(&self, env: EnvId, name: &str) -> Result<Value, MinilangError> {
        let mut cursor = Some(env);
        while let Some(id) = cursor {
            let scope = &self.scopes[id.0];
            if let Some(v) = scope.bindings.get(name) {
                return Ok(v.clone());
            }
            cursor = scope.parent;
        }
        Err(MinilangError::NotDefined {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let mut arena = EnvArena::new();
        let root = arena.create_root();
        arena.define(root, "x", Value::Int(1)).unwrap();
        assert_eq!(arena.get(root, "x").unwrap(), Value::Int(1));
    }

    #[test]
    fn redefining_in_same_scope_is_rejected() {
        let mut arena = EnvArena::new();
        let root = arena.create_root();
        arena.define(root, "x", Value::Int(1)).unwrap();
        let err = arena.define(root, "x", Value::Int(2)).unwrap_err();
        assert_eq!(err.to_string(), "`x` already defined.");
    }

    #[test]
    fn shadowing_in_a_child_scope_is_allowed() {
        let mut arena = EnvArena::new();
        let root = arena.create_root();
        arena.define(root, "x", Value::Int(1)).unwrap();
        let child = arena.create_child(root);
        arena.define(child, "x", Value::Int(2)).unwrap();
        assert_eq!(arena.get(child, "x").unwrap(), Value::Int(2));
        assert_eq!(arena.get(root, "x").unwrap(), Value::Int(1));
    }

    #[test]
    fn lookup_walks_parent_chain() {
        let mut arena = EnvArena::new();
        let root = arena.create_root();
        arena.define(root, "x", Value::Int(1)).unwrap();
        let child = arena.create_child(root);
        let grandchild = arena.create_child(child);
        assert_eq!(arena.get(grandchild, "x").unwrap(), Value::Int(1));
    }

    #[test]
    fn undefined_symbol_error() {
        let mut arena = EnvArena::new();
        let root = arena.create_root();
        let err = arena.get(root, "missing").unwrap_err();
        assert_eq!(err.to_string(), "`missing` not defined.");
    }

    #[test]
    fn assign_writes_through_to_owning_scope() {
        let mut arena = EnvArena::new();
        let root = arena.create_root();
        arena.define(root, "x", Value::Int(1)).unwrap();
        let child = arena.create_child(root);
        arena.assign(child, "x", Value::Int(9)).unwrap();
        assert_eq!(arena.get(root, "x").unwrap(), Value::Int(9));
    }

    #[test]
    fn assign_to_unknown_name_fails() {
        let mut arena = EnvArena::new();
        let root = arena.create_root();
        let err = arena.assign(root, "x", Value::Int(1)).unwrap_err();
        assert_eq!(err.to_string(), "`x` not defined.");
    }

    #[test]
    fn closure_capturing_its_own_defining_scope_does_not_need_special_handling() {
        // A def storing a closure in the very scope it captures is exactly
        // the cycle case the arena sidesteps: nothing here needs an Rc.
        let mut arena = EnvArena::new();
        let root = arena.create_root();
        arena.define(root, "f", Value::Null).unwrap();
        arena.assign(root, "f", Value::Int(1)).unwrap();
        assert_eq!(arena.get(root, "f").unwrap(), Value::Int(1));
    }
}
