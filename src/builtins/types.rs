//! Type inspection builtin: `type`

use crate::env::{EnvArena, EnvId};
use crate::error::MinilangError;
use crate::value::{BuiltinData, Value};
use std::rc::Rc;

/// One of `int`, `bool`, `null`, `str`, `func`, `builtin`, `arr`, `dic`.
pub fn builtin_type(args: &[Value]) -> Result<Value, MinilangError> {
    let [v] = args else {
        return Err(MinilangError::IllegalOperation);
    };
    Ok(Value::str(v.type_name()))
}

pub fn register(arena: &mut EnvArena, env: EnvId) {
    arena
        .define(
            env,
            "type",
            Value::Builtin(Rc::new(BuiltinData {
                name: "type",
                func: Box::new(builtin_type),
            })),
        )
        .expect("builtin names are distinct and the root scope is fresh");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_each_runtime_type() {
        assert_eq!(builtin_type(&[Value::Int(1)]).unwrap(), Value::str("int"));
        assert_eq!(builtin_type(&[Value::Bool(true)]).unwrap(), Value::str("bool"));
        assert_eq!(builtin_type(&[Value::Null]).unwrap(), Value::str("null"));
        assert_eq!(builtin_type(&[Value::str("x")]).unwrap(), Value::str("str"));
        assert_eq!(
            builtin_type(&[Value::array(vec![])]).unwrap(),
            Value::str("arr")
        );
        assert_eq!(
            builtin_type(&[Value::dict(indexmap::IndexMap::new())]).unwrap(),
            Value::str("dic")
        );
    }
}
