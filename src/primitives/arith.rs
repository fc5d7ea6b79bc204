//! Arithmetic: `+ - * /`, `mod`, `quotient`, `remainder`, `round`, `floor`,
//! `ceiling`, `truncate` (§6.2).
//!
//! Grounded on `original_source/src/prim_arith.c`. `+`/`-`/`*` stay in the
//! Integer domain when every argument is an Integer, stay in the Float
//! domain when every argument is a Float, and promote to Float the moment
//! the arguments are mixed (`prim_add`/`prim_sub`/`prim_mul`'s
//! `expr_list_is_homogeneous` branch) — per SPEC_FULL §3.4, the promoted
//! result is a plain `Value::Float`, not a third "generic number" tag.
//! `/` always promotes, matching `prim_div`'s unconditional `GenericNum`.

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{EvalResult, Interpreter};
use crate::pool::CellRef;
use crate::value::Value;

pub fn install(interp: &mut Interpreter) {
    interp.bind_primitive("+", prim_add);
    interp.bind_primitive("-", prim_sub);
    interp.bind_primitive("*", prim_mul);
    interp.bind_primitive("/", prim_div);
    interp.bind_primitive("mod", prim_mod);
    interp.bind_primitive("quotient", prim_quotient);
    interp.bind_primitive("remainder", prim_remainder);
    interp.bind_primitive("round", prim_round);
    interp.bind_primitive("floor", prim_floor);
    interp.bind_primitive("ceiling", prim_ceiling);
    interp.bind_primitive("truncate", prim_truncate);
}

enum Num {
    Int(i64),
    Flt(f64),
}

fn num_of(interp: &mut Interpreter, who: &str, cell: CellRef) -> Result<Num, CellRef> {
    match interp.pool.get(cell) {
        Value::Integer(n) => Ok(Num::Int(*n)),
        Value::Float(f) => Ok(Num::Flt(*f)),
        other => {
            let err = EvalError::type_mismatch(who, "int or flt", other.type_name());
            Err(interp.raise(err))
        }
    }
}

fn nums_of(interp: &mut Interpreter, who: &str, items: &[CellRef]) -> Result<Vec<Num>, CellRef> {
    items.iter().map(|&c| num_of(interp, who, c)).collect()
}

fn all_int(nums: &[Num]) -> bool {
    nums.iter().all(|n| matches!(n, Num::Int(_)))
}

fn as_f64(n: &Num) -> f64 {
    match n {
        Num::Int(i) => *i as f64,
        Num::Flt(f) => *f,
    }
}

fn as_i64(n: &Num) -> i64 {
    match n {
        Num::Int(i) => *i,
        Num::Flt(f) => *f as i64,
    }
}

pub fn prim_add(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    let nums = nums_of(interp, "+", &items)?;
    if nums.is_empty() {
        return Ok(interp.alloc(Value::Integer(0)));
    }
    if all_int(&nums) {
        let total: i64 = nums.iter().map(as_i64).sum();
        Ok(interp.alloc(Value::Integer(total)))
    } else {
        let total: f64 = nums.iter().map(as_f64).sum();
        Ok(interp.alloc(Value::Float(total)))
    }
}

pub fn prim_sub(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    let nums = nums_of(interp, "-", &items)?;
    if nums.is_empty() {
        return Ok(interp.alloc(Value::Integer(0)));
    }
    if nums.len() == 1 {
        return Ok(match &nums[0] {
            Num::Int(n) => interp.alloc(Value::Integer(-n)),
            Num::Flt(f) => interp.alloc(Value::Float(-f)),
        });
    }
    if all_int(&nums) {
        let mut total = as_i64(&nums[0]);
        for n in &nums[1..] {
            total -= as_i64(n);
        }
        Ok(interp.alloc(Value::Integer(total)))
    } else {
        let mut total = as_f64(&nums[0]);
        for n in &nums[1..] {
            total -= as_f64(n);
        }
        Ok(interp.alloc(Value::Float(total)))
    }
}

pub fn prim_mul(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    let nums = nums_of(interp, "*", &items)?;
    if nums.is_empty() {
        return Ok(interp.alloc(Value::Integer(1)));
    }
    if all_int(&nums) {
        let total: i64 = nums.iter().map(as_i64).product();
        Ok(interp.alloc(Value::Integer(total)))
    } else {
        let total: f64 = nums.iter().map(as_f64).product();
        Ok(interp.alloc(Value::Float(total)))
    }
}

pub fn prim_div(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.is_empty() {
        let err = EvalError::arity("/", "at least 1", 0);
        return Err(interp.raise(err));
    }
    let nums = nums_of(interp, "/", &items)?;
    if nums.len() == 1 {
        let n = as_f64(&nums[0]);
        if n == 0.0 {
            return Err(interp.raise(EvalError::DivisionByZero));
        }
        return Ok(interp.alloc(Value::Float(1.0 / n)));
    }
    let mut total = as_f64(&nums[0]);
    for n in &nums[1..] {
        let d = as_f64(n);
        if d == 0.0 {
            return Err(interp.raise(EvalError::DivisionByZero));
        }
        total /= d;
    }
    Ok(interp.alloc(Value::Float(total)))
}

/// Floored modulo, sign matching the divisor, per the `fmod`-then-fixup
/// recipe in `prim_mod`.
pub fn prim_mod(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.is_empty() {
        let err = EvalError::arity("mod", "at least 1", 0);
        return Err(interp.raise(err));
    }
    let nums = nums_of(interp, "mod", &items)?;
    let mut total = as_f64(&nums[0]);
    for n in &nums[1..] {
        let d = as_f64(n);
        if d == 0.0 {
            return Err(interp.raise(EvalError::DivisionByZero));
        }
        total %= d;
        if if d < 0.0 { total > 0.0 } else { total < 0.0 } {
            total += d;
        }
    }
    Ok(interp.alloc(Value::Float(total)))
}

fn int_of(interp: &mut Interpreter, who: &str, cell: CellRef) -> Result<i64, CellRef> {
    match interp.pool.get(cell) {
        Value::Integer(n) => Ok(*n),
        other => {
            let err = EvalError::type_mismatch(who, "int", other.type_name());
            Err(interp.raise(err))
        }
    }
}

pub fn prim_quotient(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.is_empty() {
        let err = EvalError::arity("quotient", "at least 1", 0);
        return Err(interp.raise(err));
    }
    let mut total = int_of(interp, "quotient", items[0])?;
    for &c in &items[1..] {
        let d = int_of(interp, "quotient", c)?;
        if d == 0 {
            return Err(interp.raise(EvalError::DivisionByZero));
        }
        total /= d;
    }
    Ok(interp.alloc(Value::Integer(total)))
}

pub fn prim_remainder(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.is_empty() {
        let err = EvalError::arity("remainder", "at least 1", 0);
        return Err(interp.raise(err));
    }
    let mut total = int_of(interp, "remainder", items[0])?;
    for &c in &items[1..] {
        let d = int_of(interp, "remainder", c)?;
        if d == 0 {
            return Err(interp.raise(EvalError::DivisionByZero));
        }
        total %= d;
    }
    Ok(interp.alloc(Value::Integer(total)))
}

/// `round`/`floor`/`ceiling`/`truncate` pass an Integer through unchanged
/// and only transform a Float (still as Float), per `prim_round` et al.
fn unary_float_op(
    interp: &mut Interpreter,
    who: &'static str,
    args: CellRef,
    op: fn(f64) -> f64,
) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity(who, "1", items.len());
        return Err(interp.raise(err));
    }
    match interp.pool.get(items[0]).clone() {
        Value::Integer(n) => Ok(interp.alloc(Value::Integer(n))),
        Value::Float(f) => Ok(interp.alloc(Value::Float(op(f)))),
        other => {
            let err = EvalError::type_mismatch(who, "int or flt", other.type_name());
            Err(interp.raise(err))
        }
    }
}

pub fn prim_round(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    unary_float_op(interp, "round", args, f64::round)
}

pub fn prim_floor(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    unary_float_op(interp, "floor", args, f64::floor)
}

pub fn prim_ceiling(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    unary_float_op(interp, "ceiling", args, f64::ceil)
}

pub fn prim_truncate(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    unary_float_op(interp, "truncate", args, f64::trunc)
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
    fn addition_stays_integer_when_homogeneous() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(+ 1 2 3)");
        assert!(matches!(interp.pool.get(r), Value::Integer(6)));
    }

    #[test]
    fn mixed_arithmetic_promotes_to_float() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(+ 1 2.0 3)");
        assert!(matches!(interp.pool.get(r), Value::Float(f) if (*f - 6.0).abs() < 1e-9));
    }

    #[test]
    fn subtraction_with_one_argument_negates() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(- 5)");
        assert!(matches!(interp.pool.get(r), Value::Integer(-5)));
    }

    #[test]
    fn division_always_promotes_and_reciprocates() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(/ 4)");
        assert!(matches!(interp.pool.get(r), Value::Float(f) if (*f - 0.25).abs() < 1e-9));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(/ 1 0)");
        assert!(matches!(interp.pool.get(r), Value::Error(_)));
    }

    #[test]
    fn mod_sign_matches_divisor() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(mod -7 3)");
        assert!(matches!(interp.pool.get(r), Value::Float(f) if (*f - 2.0).abs() < 1e-9));
    }

    #[test]
    fn quotient_and_remainder_are_integer_only() {
        let mut interp = Interpreter::new(64);
        let q = eval_str(&mut interp, "(quotient 7 2)");
        assert!(matches!(interp.pool.get(q), Value::Integer(3)));
        let r = eval_str(&mut interp, "(remainder 7 2)");
        assert!(matches!(interp.pool.get(r), Value::Integer(1)));
    }

    #[test]
    fn floor_and_friends_pass_integers_through() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(floor 4)");
        assert!(matches!(interp.pool.get(r), Value::Integer(4)));
        let r = eval_str(&mut interp, "(floor 4.7)");
        assert!(matches!(interp.pool.get(r), Value::Float(f) if (*f - 4.0).abs() < 1e-9));
    }
}
