//! Error builtin: `error`
//!
//! Unlike the teacher's catchable `Value::Error`, minilang errors are not
//! first-class: `error(msg)` aborts evaluation outright by returning
//! `MinilangError::Explicit`, which propagates like any other fatal error.
//! See DESIGN.md.

use crate::env::{EnvArena, EnvId};
use crate::error::MinilangError;
use crate::value::{BuiltinData, Value};
use std::rc::Rc;

/// Aborts evaluation with `msg` as the error message.
pub fn builtin_error(args: &[Value]) -> Result<Value, MinilangError> {
    let [msg] = args else {
        return Err(MinilangError::IllegalOperation);
    };
    let text = match msg {
        Value::Str(s) => s.to_string(),
        other => other.to_string(),
    };
    Err(MinilangError::Explicit(text))
}

pub fn register(arena: &mut EnvArena, env: EnvId) {
    arena
        .define(
            env,
            "error",
            Value::Builtin(Rc::new(BuiltinData {
                name: "error",
                func: Box::new(builtin_error),
            })),
        )
        .expect("builtin names are distinct and the root scope is fresh");
}
