//! Error taxonomy for the evaluator and reader.
//!
//! `EvalError` covers the evaluation-error kinds of the distilled spec's §7:
//! unbound symbol, wrong arity, type mismatch, attempted mutation of a
//! constant, division by zero, malformed quasiquote, invalid application, and
//! a catch-all for primitive-specific and user-raised (`error`) messages.
//! These are never propagated as Rust panics; every site that produces one
//! converts it into a `Value::Error` cell (see `eval::Interpreter::raise`)
//! before it can reach user-visible evaluation results, matching the
//! "errors are first-class values" model of the source interpreter.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unbound symbol: {0}")]
    UnboundSymbol(String),

    #[error("{function}: expected {expected} argument(s), got {actual}")]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("{function}: expected {expected}, got {actual}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
    },

    #[error("Expected function or macro, got {got}")]
    NotCallable { got: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Cannot reassign constant binding: {name}")]
    ConstReassignment { name: String },

    #[error("Malformed quasiquote: {0}")]
    MalformedQuasiquote(String),

    #[error("Invalid application: {0}")]
    InvalidApplication(String),

    #[error("{0}")]
    Custom(String),
}

impl EvalError {
    pub fn arity(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityMismatch {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn type_mismatch(function: &str, expected: impl Into<String>, actual: &str) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected: expected.into(),
            actual: actual.to_string(),
        }
    }
}

/// Surfaced by the reader; at the top level this is reported the same way as
/// an evaluation error (see §7: "Parse errors... surface the same way").
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parse error: {0}")]
pub struct ParseError(pub String);
