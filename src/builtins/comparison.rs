//! Comparison builtins: `less`
//!
//! The language's own `<`/`>` operators cover integer and string ordering
//! directly (see the evaluator); `less` exposes the same relation as an
//! ordinary callable so it can be passed around or bound via UFCS.

use crate::env::{EnvArena, EnvId};
use crate::error::MinilangError;
use crate::value::{BuiltinData, Value};
use std::rc::Rc;

/// Tests whether `a < b`. Integers compare numerically, strings
/// lexicographically; any other combination is "Illegal operation."
pub fn builtin_less(args: &[Value]) -> Result<Value, MinilangError> {
    let [a, b] = args else {
        return Err(MinilangError::IllegalOperation);
    };
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a < b)),
        (Value::Str(a), Value::Str(b)) => Ok(Value::Bool(a < b)),
        _ => Err(MinilangError::IllegalOperation),
    }
}

pub fn register(arena: &mut EnvArena, env: EnvId) {
    arena
        .define(
            env,
            "less",
            Value::Builtin(Rc::new(BuiltinData {
                name: "less",
                func: Box::new(builtin_less),
            })),
        )
        .expect("builtin names are distinct and the root scope is fresh");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_integers() {
        assert_eq!(builtin_less(&[Value::Int(1), Value::Int(2)]).unwrap(), Value::Bool(true));
        assert_eq!(builtin_less(&[Value::Int(2), Value::Int(1)]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn compares_strings_lexicographically() {
        assert_eq!(
            builtin_less(&[Value::str("a"), Value::str("b")]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn rejects_mixed_types() {
        assert!(builtin_less(&[Value::Int(1), Value::str("a")]).is_err());
    }
}
