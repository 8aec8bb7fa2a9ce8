// ABOUTME: Runtime value types and the printing/equality rules that govern them

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::env::EnvId;
use crate::error::MinilangError;
use crate::parser::Stmt;

/// A user-defined function together with the environment it closed over.
pub struct ClosureData {
    pub params: Vec<String>,
    pub body: Rc<Stmt>,
    pub env: EnvId,
}

/// A host-provided callable. `name` is purely diagnostic; a UFCS-bound
/// builtin is a fresh `BuiltinData` wrapping the original, so identity
/// comparison still distinguishes bound from unbound forms.
pub struct BuiltinData {
    pub name: &'static str,
    pub func: Box<dyn Fn(&[Value]) -> Result<Value, MinilangError>>,
}

/// A minilang runtime value. Integers, booleans, null, and strings are
/// value-typed; arrays, dictionaries, closures, and builtins are shared by
/// reference (cloning a `Value` clones the handle, not the underlying data).
#[derive(Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Null,
    Str(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<IndexMap<String, Value>>>),
    Closure(Rc<ClosureData>),
    Builtin(Rc<BuiltinData>),
}

impl Value {
    pub fn str(s: impl Into<Rc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn dict(entries: IndexMap<String, Value>) -> Value {
        Value::Dict(Rc::new(RefCell::new(entries)))
    }

    /// `false` and `null` are falsy; everything else (including `0` and
    /// `""`) is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Null)
    }

    /// One of `int`, `bool`, `null`, `str`, `arr`, `dic`, `func`, `builtin` —
    /// the name surfaced by the `type` builtin.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Str(_) => "str",
            Value::Array(_) => "arr",
            Value::Dict(_) => "dic",
            Value::Closure(_) => "func",
            Value::Builtin(_) => "builtin",
        }
    }
}

/// Structural equality for integers, booleans, null, strings, and arrays
/// (element-wise, same length); reference identity for dictionaries,
/// closures, and builtins. `null = null` is true; `null = 0` is false.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Null => write!(f, "null"),
            Value::Str(s) => write!(f, "{}", s),
            Value::Builtin(_) => write!(f, "<builtin>"),
            Value::Closure(_) => write!(f, "<func>"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, v) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Dict(entries) => {
                write!(f, "$[")?;
                for (i, (k, v)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_int() {
        assert_eq!(Value::Int(47).to_string(), "47");
        assert_eq!(Value::Int(-3).to_string(), "-3");
    }

    #[test]
    fn display_bool_and_null() {
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn display_string_has_no_quotes() {
        assert_eq!(Value::str("hi").to_string(), "hi");
    }

    #[test]
    fn display_array() {
        let v = Value::array(vec![Value::Int(1), Value::Int(2), Value::str("x")]);
        assert_eq!(v.to_string(), "[1, 2, x]");
    }

    #[test]
    fn display_dict_is_insertion_ordered() {
        let mut m = IndexMap::new();
        m.insert("b".to_string(), Value::Int(2));
        m.insert("a".to_string(), Value::Int(1));
        let v = Value::dict(m);
        assert_eq!(v.to_string(), "$[b: 2, a: 1]");
    }

    #[test]
    fn equality_is_structural_for_arrays() {
        let a = Value::array(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::array(vec![Value::Int(1), Value::Int(2)]);
        let c = Value::array(vec![Value::Int(1)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn equality_is_reference_identity_for_dicts() {
        let a = Value::dict(IndexMap::new());
        let b = Value::dict(IndexMap::new());
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn null_equals_null_but_not_zero() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Null, Value::Int(0));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::str("").is_truthy());
        assert!(Value::array(vec![]).is_truthy());
    }
}
