//! List manipulation: `list`, `cons`, `car`, `cdr`, `length`, `append`
//! (§6.2).
//!
//! Grounded on `original_source/src/prim_list.c`. `car`/`cdr` accept `nil`
//! (returning `nil`) and raise on anything that isn't a Pair or `nil`.
//! `length` requires a proper list (or a String, counted in bytes);
//! `append` requires all-proper-lists XOR all-strings, never a mix.

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{EvalResult, Interpreter};
use crate::pool::CellRef;
use crate::value::Value;

pub fn install(interp: &mut Interpreter) {
    interp.bind_primitive("list", prim_list);
    interp.bind_primitive("cons", prim_cons);
    interp.bind_primitive("car", prim_car);
    interp.bind_primitive("cdr", prim_cdr);
    interp.bind_primitive("length", prim_length);
    interp.bind_primitive("append", prim_append);
}

/// Arguments to a non-special primitive arrive already evaluated, so
/// `list` is just the identity on its argument list.
pub fn prim_list(_interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    Ok(args)
}

pub fn prim_cons(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 2 {
        let err = EvalError::arity("cons", "2", items.len());
        return Err(interp.raise(err));
    }
    Ok(interp.cons(items[0], items[1]))
}

fn pair_or_nil(interp: &Interpreter, cell: CellRef) -> bool {
    cell == interp.nil || matches!(interp.pool.get(cell), Value::Pair(..))
}

pub fn prim_car(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("car", "1", items.len());
        return Err(interp.raise(err));
    }
    let cell = items[0];
    if cell == interp.nil {
        return Ok(interp.nil);
    }
    match interp.pool.get(cell) {
        Value::Pair(car, _) => Ok(*car),
        other => {
            let err = EvalError::type_mismatch("car", "pair or nil", other.type_name());
            Err(interp.raise(err))
        }
    }
}

pub fn prim_cdr(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("cdr", "1", items.len());
        return Err(interp.raise(err));
    }
    let cell = items[0];
    if cell == interp.nil {
        return Ok(interp.nil);
    }
    match interp.pool.get(cell) {
        Value::Pair(_, cdr) => Ok(*cdr),
        other => {
            let err = EvalError::type_mismatch("cdr", "pair or nil", other.type_name());
            Err(interp.raise(err))
        }
    }
}

pub fn prim_length(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("length", "1", items.len());
        return Err(interp.raise(err));
    }
    let cell = items[0];
    if cell == interp.nil {
        return Ok(interp.alloc(Value::Integer(0)));
    }
    if let Value::Str(s) = interp.pool.get(cell) {
        return Ok(interp.alloc(Value::Integer(s.len() as i64)));
    }
    if !interp.is_proper_list(cell) {
        let got = interp.pool.get(cell).type_name();
        let err = EvalError::type_mismatch("length", "proper list or string", got);
        return Err(interp.raise(err));
    }
    let n = interp.list_len(cell);
    Ok(interp.alloc(Value::Integer(n as i64)))
}

pub fn prim_append(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.is_empty() {
        return Ok(interp.nil);
    }
    if items.iter().all(|&c| pair_or_nil(interp, c)) {
        let mut out = Vec::new();
        for &c in &items {
            if !interp.is_proper_list(c) {
                let err = EvalError::type_mismatch("append", "proper list", "improper list");
                return Err(interp.raise(err));
            }
            out.extend(interp.list_to_vec(c)?);
        }
        return Ok(interp.vec_to_list(&out));
    }
    if items.iter().all(|&c| matches!(interp.pool.get(c), Value::Str(_))) {
        let mut out = String::new();
        for &c in &items {
            if let Value::Str(s) = interp.pool.get(c) {
                out.push_str(s);
            }
        }
        return Ok(interp.alloc(Value::Str(out)));
    }
    let err = EvalError::Custom("append: arguments must be all lists or all strings".to_string());
    Err(interp.raise(err))
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
    fn car_cdr_on_nil_return_nil() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(car nil)");
        assert_eq!(r, interp.nil);
        let r = eval_str(&mut interp, "(cdr nil)");
        assert_eq!(r, interp.nil);
    }

    #[test]
    fn car_cdr_on_non_pair_errors() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(car 1)");
        assert!(matches!(interp.pool.get(r), Value::Error(_)));
    }

    #[test]
    fn length_counts_proper_lists_and_string_bytes() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(length (list 1 2 3))");
        assert!(matches!(interp.pool.get(r), Value::Integer(3)));
        let r = eval_str(&mut interp, "(length \"abc\")");
        assert!(matches!(interp.pool.get(r), Value::Integer(3)));
    }

    #[test]
    fn append_concatenates_lists() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(append (list 1 2) (list 3 4))");
        let items = interp.list_to_vec(r).unwrap();
        assert_eq!(items.len(), 4);
    }

    #[test]
    fn append_rejects_mixed_lists_and_strings() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(append (list 1 2) \"x\")");
        assert!(matches!(interp.pool.get(r), Value::Error(_)));
    }
}
