//! Type predicates and conversions: `type-of`, `int?`/`flt?`/`symbol?`/
//! `string?`/`list?`/`primitive?`/`lambda?`/`macro?`, `int->flt`,
//! `flt->int`, `int->str`, `flt->str`, `str->int`, `str->flt` (§6.2).
//!
//! Grounded on `original_source/src/prim_type.c`. The predicates are
//! variadic: every argument must match, not just the first
//! (`expr_list_has_only_type`). `list?` tests raw Pair-ness — a dotted pair
//! satisfies it too, it is not a list-properness check.

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{EvalResult, Interpreter};
use crate::pool::CellRef;
use crate::value::Value;

pub fn install(interp: &mut Interpreter) {
    interp.bind_primitive("type-of", prim_type_of);
    interp.bind_primitive("int?", prim_int_p);
    interp.bind_primitive("flt?", prim_flt_p);
    interp.bind_primitive("symbol?", prim_symbol_p);
    interp.bind_primitive("string?", prim_string_p);
    interp.bind_primitive("list?", prim_list_p);
    interp.bind_primitive("primitive?", prim_primitive_p);
    interp.bind_primitive("lambda?", prim_lambda_p);
    interp.bind_primitive("macro?", prim_macro_p);
    interp.bind_primitive("int->flt", prim_int_to_flt);
    interp.bind_primitive("flt->int", prim_flt_to_int);
    interp.bind_primitive("int->str", prim_int_to_str);
    interp.bind_primitive("flt->str", prim_flt_to_str);
    interp.bind_primitive("str->int", prim_str_to_int);
    interp.bind_primitive("str->flt", prim_str_to_flt);
}

pub fn prim_type_of(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("type-of", "1", items.len());
        return Err(interp.raise(err));
    }
    let name = interp.pool.get(items[0]).type_name().to_string();
    Ok(interp.alloc(Value::Symbol(name)))
}

fn all_match(
    interp: &mut Interpreter,
    who: &'static str,
    args: CellRef,
    pred: impl Fn(&Value) -> bool,
) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.is_empty() {
        let err = EvalError::arity(who, "at least 1", 0);
        return Err(interp.raise(err));
    }
    let ok = items.iter().all(|&c| pred(interp.pool.get(c)));
    Ok(if ok { interp.tru } else { interp.nil })
}

pub fn prim_int_p(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    all_match(interp, "int?", args, |v| matches!(v, Value::Integer(_)))
}

pub fn prim_flt_p(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    all_match(interp, "flt?", args, |v| matches!(v, Value::Float(_)))
}

pub fn prim_symbol_p(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    all_match(interp, "symbol?", args, |v| matches!(v, Value::Symbol(_)))
}

pub fn prim_string_p(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    all_match(interp, "string?", args, |v| matches!(v, Value::Str(_)))
}

pub fn prim_list_p(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    all_match(interp, "list?", args, |v| matches!(v, Value::Pair(..)))
}

pub fn prim_primitive_p(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    all_match(interp, "primitive?", args, |v| matches!(v, Value::Primitive(_)))
}

pub fn prim_lambda_p(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    all_match(interp, "lambda?", args, |v| matches!(v, Value::Lambda(_)))
}

pub fn prim_macro_p(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    all_match(interp, "macro?", args, |v| matches!(v, Value::Macro(_)))
}

fn single(interp: &mut Interpreter, who: &'static str, args: CellRef) -> Result<CellRef, CellRef> {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity(who, "1", items.len());
        return Err(interp.raise(err));
    }
    Ok(items[0])
}

pub fn prim_int_to_flt(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let cell = single(interp, "int->flt", args)?;
    match interp.pool.get(cell) {
        Value::Integer(n) => {
            let f = *n as f64;
            Ok(interp.alloc(Value::Float(f)))
        }
        other => {
            let err = EvalError::type_mismatch("int->flt", "int", other.type_name());
            Err(interp.raise(err))
        }
    }
}

pub fn prim_flt_to_int(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let cell = single(interp, "flt->int", args)?;
    match interp.pool.get(cell) {
        Value::Float(f) => {
            let n = *f as i64;
            Ok(interp.alloc(Value::Integer(n)))
        }
        other => {
            let err = EvalError::type_mismatch("flt->int", "flt", other.type_name());
            Err(interp.raise(err))
        }
    }
}

pub fn prim_int_to_str(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let cell = single(interp, "int->str", args)?;
    match interp.pool.get(cell) {
        Value::Integer(n) => {
            let s = n.to_string();
            Ok(interp.alloc(Value::Str(s)))
        }
        other => {
            let err = EvalError::type_mismatch("int->str", "int", other.type_name());
            Err(interp.raise(err))
        }
    }
}

pub fn prim_flt_to_str(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let cell = single(interp, "flt->str", args)?;
    match interp.pool.get(cell) {
        Value::Float(f) => {
            let s = format!("{f:.6}");
            Ok(interp.alloc(Value::Str(s)))
        }
        other => {
            let err = EvalError::type_mismatch("flt->str", "flt", other.type_name());
            Err(interp.raise(err))
        }
    }
}

/// Leading-numeric-prefix scan, matching `strtoll`'s tolerance of trailing
/// garbage (`"3abc"` reads as `3`, not an error).
fn leading_int_prefix(s: &str) -> i64 {
    let trimmed = s.trim_start();
    let mut end = 0;
    let bytes = trimmed.as_bytes();
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    trimmed[..end].parse().unwrap_or(0)
}

fn leading_float_prefix(s: &str) -> f64 {
    let trimmed = s.trim_start();
    let mut end = 0;
    let bytes = trimmed.as_bytes();
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    trimmed[..end].parse().unwrap_or(0.0)
}

pub fn prim_str_to_int(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let cell = single(interp, "str->int", args)?;
    match interp.pool.get(cell) {
        Value::Str(s) => {
            let n = leading_int_prefix(s);
            Ok(interp.alloc(Value::Integer(n)))
        }
        other => {
            let err = EvalError::type_mismatch("str->int", "string", other.type_name());
            Err(interp.raise(err))
        }
    }
}

pub fn prim_str_to_flt(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let cell = single(interp, "str->flt", args)?;
    match interp.pool.get(cell) {
        Value::Str(s) => {
            let f = leading_float_prefix(s);
            Ok(interp.alloc(Value::Float(f)))
        }
        other => {
            let err = EvalError::type_mismatch("str->flt", "string", other.type_name());
            Err(interp.raise(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Interpreter;

    fn eval_str(interp: &mut Interpreter, src: &str) -> CellRef {
        let forms = crate::parser::read_all(src).unwrap();
        let cell = interp.intern(&forms[0]);
        let env = interp.globals.clone();
        interp.eval(&env, cell)
    }

    #[test]
    fn type_of_names_match_the_catalogue() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(type-of 1)");
        assert!(matches!(interp.pool.get(r), Value::Symbol(s) if s == "int"));
        let r = eval_str(&mut interp, "(type-of nil)");
        assert!(matches!(interp.pool.get(r), Value::Symbol(s) if s == "pair"));
    }

    #[test]
    fn list_predicate_accepts_dotted_pairs() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(list? (cons 1 2))");
        assert_eq!(r, interp.tru);
    }

    #[test]
    fn predicates_require_every_argument_to_match() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(int? 1 2 3)");
        assert_eq!(r, interp.tru);
        let r = eval_str(&mut interp, "(int? 1 2.0)");
        assert_eq!(r, interp.nil);
    }

    #[test]
    fn str_to_int_reads_a_leading_prefix() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(str->int \"42abc\")");
        assert!(matches!(interp.pool.get(r), Value::Integer(42)));
    }
}
