//! The tagged value union (§3.1) and the lambda/macro closure record (§3.3).
//!
//! Every value lives in a pool cell (`pool::CellRef`); `Pair`'s `car`/`cdr`
//! are therefore cell references rather than boxed values, so the collector
//! can walk them without any type-specific unboxing. `nil` is not a separate
//! variant: it is the single, self-referential `Pair` cell allocated by
//! `Interpreter::new` (see eval.rs), matching the source interpreter's
//! `EXPR_PARENT` with a null `children` pointer ("the empty Pair chain").

use crate::env::Environment;
use crate::eval::Interpreter;
use crate::pool::CellRef;
use std::fmt;
use std::rc::Rc;

/// A built-in operation. Two handles are equal iff they wrap the same
/// function pointer ("primitives by identity", §3.4).
pub type PrimitiveFn =
    fn(&mut Interpreter, &Environment, CellRef) -> Result<CellRef, CellRef>;

#[derive(Clone, Copy)]
pub struct PrimitiveHandle {
    pub name: &'static str,
    pub func: PrimitiveFn,
}

impl fmt::Debug for PrimitiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<primitive:{}>", self.name)
    }
}

impl PartialEq for PrimitiveHandle {
    fn eq(&self, other: &Self) -> bool {
        self.func as usize == other.func as usize
    }
}

/// The captured-closure record behind `Value::Lambda`/`Value::Macro` (§3.3).
///
/// `env` is the capture: a fresh frame created by `lambda`/`macro` whose
/// parent is retargeted to the caller's active frame on every invocation
/// (§4.3, §4.5, §9 "Frame-parent retargeting on call").
#[derive(Debug, Clone)]
pub struct LambdaCtx {
    pub env: Environment,
    pub formals: Vec<String>,
    pub rest: Option<String>,
    pub body: Vec<CellRef>,
}

#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Symbol(String),
    Str(String),
    Error(String),
    Pair(CellRef, CellRef),
    Primitive(PrimitiveHandle),
    Lambda(Rc<LambdaCtx>),
    Macro(Rc<LambdaCtx>),
}

impl Value {
    /// Name used by `type-of` and in error messages, grounded on
    /// `original_source/src/include/expr.h`'s `exprtype2str`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "int",
            Value::Float(_) => "flt",
            Value::Symbol(_) => "symbol",
            Value::Str(_) => "string",
            Value::Error(_) => "error",
            Value::Pair(..) => "pair",
            Value::Primitive(_) => "primitive",
            Value::Lambda(_) => "lambda",
            Value::Macro(_) => "macro",
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, Value::Primitive(_) | Value::Lambda(_) | Value::Macro(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}
