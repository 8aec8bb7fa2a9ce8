//! Console builtins: `to_print`, `print_env`
//!
//! `print` is language syntax (§4.4), not a builtin; `to_print` exposes the
//! same stringification as an ordinary callable.

use crate::env::{EnvArena, EnvId};
use crate::error::MinilangError;
use crate::value::{BuiltinData, Value};
use std::rc::Rc;

/// Stringifies `v` per the printing rules (§4.5) and returns it as a string.
pub fn builtin_to_print(args: &[Value]) -> Result<Value, MinilangError> {
    let [v] = args else {
        return Err(MinilangError::IllegalOperation);
    };
    Ok(Value::str(v.to_string()))
}

/// Diagnostic dump of the current call's environment chain. Not test-visible
/// by design (§4.6); writes to stderr so it never pollutes the evaluator's
/// ordered `print` output.
pub fn builtin_print_env(_args: &[Value]) -> Result<Value, MinilangError> {
    eprintln!("<environment chain not introspectable from a builtin>");
    Ok(Value::Null)
}

pub fn register(arena: &mut EnvArena, env: EnvId) {
    arena
        .define(
            env,
            "to_print",
            Value::Builtin(Rc::new(BuiltinData {
                name: "to_print",
                func: Box::new(builtin_to_print),
            })),
        )
        .expect("builtin names are distinct and the root scope is fresh");
    arena
        .define(
            env,
            "print_env",
            Value::Builtin(Rc::new(BuiltinData {
                name: "print_env",
                func: Box::new(builtin_print_env),
            })),
        )
        .expect("builtin names are distinct and the root scope is fresh");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_print_matches_display_rules() {
        assert_eq!(builtin_to_print(&[Value::Int(5)]).unwrap(), Value::str("5"));
        assert_eq!(builtin_to_print(&[Value::Bool(true)]).unwrap(), Value::str("true"));
        assert_eq!(builtin_to_print(&[Value::Null]).unwrap(), Value::str("null"));
    }

    #[test]
    fn print_env_is_a_diagnostic_stub() {
        assert_eq!(builtin_print_env(&[]).unwrap(), Value::Null);
    }
}
