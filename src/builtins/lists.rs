//! Array/dictionary builtins: `push`, `pop`, `len`, `keys`, `first`, `rest`

use crate::env::{EnvArena, EnvId};
use crate::error::MinilangError;
use crate::value::{BuiltinData, Value};
use std::rc::Rc;

/// Appends `v` to `array` in place. Returns null.
pub fn builtin_push(args: &[Value]) -> Result<Value, MinilangError> {
    let [array, v] = args else {
        return Err(MinilangError::IllegalOperation);
    };
    match array {
        Value::Array(items) => {
            items.borrow_mut().push(v.clone());
            Ok(Value::Null)
        }
        _ => Err(MinilangError::IllegalOperation),
    }
}

/// Removes and returns the last element of `array`.
pub fn builtin_pop(args: &[Value]) -> Result<Value, MinilangError> {
    let [array] = args else {
        return Err(MinilangError::IllegalOperation);
    };
    match array {
        Value::Array(items) => items
            .borrow_mut()
            .pop()
            .ok_or(MinilangError::IllegalIndex),
        _ => Err(MinilangError::IllegalOperation),
    }
}

/// Length of a string or array.
pub fn builtin_len(args: &[Value]) -> Result<Value, MinilangError> {
    let [x] = args else {
        return Err(MinilangError::IllegalOperation);
    };
    match x {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::Array(items) => Ok(Value::Int(items.borrow().len() as i64)),
        _ => Err(MinilangError::IllegalOperation),
    }
}

/// Array of `dict`'s keys not starting with `__`, in insertion order.
pub fn builtin_keys(args: &[Value]) -> Result<Value, MinilangError> {
    let [dict] = args else {
        return Err(MinilangError::IllegalOperation);
    };
    match dict {
        Value::Dict(entries) => {
            let keys = entries
                .borrow()
                .keys()
                .filter(|k| !k.starts_with("__"))
                .map(|k| Value::str(k.clone()))
                .collect();
            Ok(Value::array(keys))
        }
        _ => Err(MinilangError::IllegalOperation),
    }
}

/// First element of an array.
pub fn builtin_first(args: &[Value]) -> Result<Value, MinilangError> {
    let [array] = args else {
        return Err(MinilangError::IllegalOperation);
    };
    match array {
        Value::Array(items) => items
            .borrow()
            .first()
            .cloned()
            .ok_or(MinilangError::IllegalIndex),
        _ => Err(MinilangError::IllegalOperation),
    }
}

/// All but the first element of an array.
pub fn builtin_rest(args: &[Value]) -> Result<Value, MinilangError> {
    let [array] = args else {
        return Err(MinilangError::IllegalOperation);
    };
    match array {
        Value::Array(items) => {
            let items = items.borrow();
            if items.is_empty() {
                return Err(MinilangError::IllegalIndex);
            }
            Ok(Value::array(items[1..].to_vec()))
        }
        _ => Err(MinilangError::IllegalOperation),
    }
}

pub fn register(arena: &mut EnvArena, env: EnvId) {
    let builtins: [(&'static str, Box<dyn Fn(&[Value]) -> Result<Value, MinilangError>>); 6] = [
        ("push", Box::new(builtin_push)),
        ("pop", Box::new(builtin_pop)),
        ("len", Box::new(builtin_len)),
        ("keys", Box::new(builtin_keys)),
        ("first", Box::new(builtin_first)),
        ("rest", Box::new(builtin_rest)),
    ];
    for (name, func) in builtins {
        arena
            .define(env, name, Value::Builtin(Rc::new(BuiltinData { name, func })))
            .expect("builtin names are distinct and the root scope is fresh");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arr(items: Vec<Value>) -> Value {
        Value::array(items)
    }

    #[test]
    fn push_mutates_in_place_and_returns_null() {
        let a = arr(vec![Value::Int(1)]);
        let result = builtin_push(&[a.clone(), Value::Int(2)]).unwrap();
        assert_eq!(result, Value::Null);
        assert_eq!(a, arr(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn pop_removes_and_returns_last_element() {
        let a = arr(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(builtin_pop(&[a.clone()]).unwrap(), Value::Int(2));
        assert_eq!(a, arr(vec![Value::Int(1)]));
    }

    #[test]
    fn len_of_string_counts_characters_not_bytes() {
        assert_eq!(builtin_len(&[Value::str("hi")]).unwrap(), Value::Int(2));
    }

    #[test]
    fn keys_excludes_dunder_entries() {
        let mut m = indexmap::IndexMap::new();
        m.insert("__proto__".to_string(), Value::Null);
        m.insert("a".to_string(), Value::Int(1));
        let d = Value::dict(m);
        assert_eq!(builtin_keys(&[d]).unwrap(), arr(vec![Value::str("a")]));
    }

    #[test]
    fn first_and_rest() {
        let a = arr(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(builtin_first(&[a.clone()]).unwrap(), Value::Int(1));
        assert_eq!(
            builtin_rest(&[a]).unwrap(),
            arr(vec![Value::Int(2), Value::Int(3)])
        );
    }
}
