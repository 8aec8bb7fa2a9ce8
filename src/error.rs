// ABOUTME: Error types for scan/parse/eval failures, rendered as the single
// ABOUTME: user-visible error string the external interface contract requires

use thiserror::Error;

/// Every failure the interpreter can produce, down to the exact wording an
/// external harness inspects on failure. `Display` (via `#[error(...)]`) IS
/// the contract — these strings are not debug output.
#[derive(Debug, Clone, Error)]
pub enum MinilangError {
    #[error("Expected `{expected}`, found `{found}`.")]
    ExpectedToken { expected: String, found: String },

    /// Used when the parser needs a bare identifier as a target or callee
    /// base (e.g. the left side of `var`/`set`) and finds something else.
    #[error("Expected a name, found `{found}`.")]
    ExpectedName { found: String },

    /// Used when the parser needs a bare identifier in a list position
    /// (function parameters, dictionary-literal keys) and finds something
    /// else.
    #[error("Name expected, found `{found}`.")]
    NameExpected { found: String },

    #[error("Unexpected token `{found}`.")]
    UnexpectedToken { found: String },

    #[error("`{name}` not defined.")]
    NotDefined { name: String },

    #[error("`{name}` already defined.")]
    AlreadyDefined { name: String },

    #[error("Illegal assignment.")]
    IllegalAssignment,

    #[error("Index must be applied to an array, a dic or a string.")]
    IllegalIndex,

    #[error("Division by zero.")]
    DivisionByZero,

    #[error("Return at top level.")]
    ReturnAtTopLevel,

    #[error("Break at top level.")]
    BreakAtTopLevel,

    #[error("Continue at top level.")]
    ContinueAtTopLevel,

    #[error("Break outside loop.")]
    BreakOutsideLoop,

    #[error("Continue outside loop.")]
    ContinueOutsideLoop,

    /// The callee of a call expression was not a closure or builtin.
    #[error("Not callable.")]
    NotCallable,

    /// A `for` loop's iterable was not a string, array, or dictionary.
    #[error("Not iterable: `{found}`.")]
    NotIterable { found: String },

    /// Catch-all for operand-type combinations §4.4 leaves unspecified
    /// (e.g. comparing a string to an integer).
    #[error("Illegal operation.")]
    IllegalOperation,

    /// The `error` builtin's argument, used verbatim.
    #[error("{0}")]
    Explicit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_the_external_contract_verbatim() {
        assert_eq!(
            MinilangError::ExpectedToken {
                expected: ";".to_string(),
                found: ":".to_string(),
            }
            .to_string(),
            "Expected `;`, found `:`."
        );
        assert_eq!(
            MinilangError::UnexpectedToken {
                found: "prin".to_string()
            }
            .to_string(),
            "Unexpected token `prin`."
        );
        assert_eq!(
            MinilangError::NotDefined {
                name: "a".to_string()
            }
            .to_string(),
            "`a` not defined."
        );
        assert_eq!(
            MinilangError::AlreadyDefined {
                name: "a".to_string()
            }
            .to_string(),
            "`a` already defined."
        );
        assert_eq!(MinilangError::DivisionByZero.to_string(), "Division by zero.");
        assert_eq!(
            MinilangError::IllegalIndex.to_string(),
            "Index must be applied to an array, a dic or a string."
        );
        assert_eq!(
            MinilangError::Explicit("boom".to_string()).to_string(),
            "boom"
        );
    }
}
