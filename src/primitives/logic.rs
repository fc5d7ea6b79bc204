//! Comparison: `equal?`, `=`, `<`, `>` (§6.2).
//!
//! Grounded on `original_source/src/prim_logic.c`: all four require at
//! least 2 arguments and compare pairwise CHAINED across the whole list
//! (`a op b`, `b op c`, ...), short-circuiting on the first failing pair.
//! `equal?` never cross-promotes Integer/Float (§3.4); `=` always does,
//! via `Interpreter::numeric_eq` rather than `values_equal`.

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{EvalResult, Interpreter};
use crate::pool::CellRef;

pub fn install(interp: &mut Interpreter) {
    interp.bind_primitive("equal?", prim_equal);
    interp.bind_primitive("=", prim_num_eq);
    interp.bind_primitive("<", prim_lt);
    interp.bind_primitive(">", prim_gt);
}

fn chained(
    interp: &mut Interpreter,
    who: &'static str,
    args: CellRef,
    holds: impl Fn(&Interpreter, CellRef, CellRef) -> bool,
) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() < 2 {
        let err = EvalError::arity(who, "at least 2", items.len());
        return Err(interp.raise(err));
    }
    for pair in items.windows(2) {
        if !holds(interp, pair[0], pair[1]) {
            return Ok(interp.nil);
        }
    }
    Ok(interp.tru)
}

pub fn prim_equal(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    chained(interp, "equal?", args, Interpreter::values_equal)
}

pub fn prim_num_eq(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    chained(interp, "=", args, Interpreter::numeric_eq)
}

pub fn prim_lt(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    chained(interp, "<", args, Interpreter::less_than)
}

pub fn prim_gt(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    chained(interp, ">", args, Interpreter::greater_than)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Interpreter;
    use crate::value::Value;

    fn eval_str(interp: &mut Interpreter, src: &str) -> CellRef {
        let forms = crate::parser::read_all(src).unwrap();
        let cell = interp.intern(&forms[0]);
        let env = interp.globals.clone();
        interp.eval(&env, cell)
    }

    #[test]
    fn chained_less_than_requires_every_pair() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(< 1 2 3)");
        assert_eq!(r, interp.tru);
        let r = eval_str(&mut interp, "(< 1 3 2)");
        assert_eq!(r, interp.nil);
    }

    #[test]
    fn comparisons_require_at_least_two_arguments() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(< 1)");
        assert!(matches!(interp.pool.get(r), Value::Error(_)));
    }

    #[test]
    fn equal_is_structural() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(equal? (quote (1 2)) (quote (1 2)))");
        assert_eq!(r, interp.tru);
    }

    #[test]
    fn equal_does_not_cross_promote_int_and_float() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(equal? 1 1.0)");
        assert_eq!(r, interp.nil);
    }

    #[test]
    fn numeric_eq_promotes_int_and_float() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(= 1 1.0)");
        assert_eq!(r, interp.tru);
    }

    #[test]
    fn equal_treats_the_symbol_nil_as_nil_itself() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(equal? (quote nil) nil)");
        assert_eq!(r, interp.tru);
        let r = eval_str(&mut interp, "(equal? (quote (nil)) (list nil))");
        assert_eq!(r, interp.tru);
    }
}
