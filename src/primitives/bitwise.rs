//! Bitwise integer operations: `bit-and`, `bit-or`, `bit-xor`, `bit-not`,
//! `shr`, `shl` (§6.2).
//!
//! Grounded on `original_source/src/prim_bitwise.c`: the three folds are
//! variadic and start from the first argument; `bit-not`/`shr`/`shl` are
//! fixed-arity (1/2/2). All operands are Integer-only.

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{EvalResult, Interpreter};
use crate::pool::CellRef;
use crate::value::Value;

pub fn install(interp: &mut Interpreter) {
    interp.bind_primitive("bit-and", prim_bit_and);
    interp.bind_primitive("bit-or", prim_bit_or);
    interp.bind_primitive("bit-xor", prim_bit_xor);
    interp.bind_primitive("bit-not", prim_bit_not);
    interp.bind_primitive("shr", prim_shr);
    interp.bind_primitive("shl", prim_shl);
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

fn fold(
    interp: &mut Interpreter,
    who: &'static str,
    args: CellRef,
    op: fn(i64, i64) -> i64,
) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.is_empty() {
        let err = EvalError::arity(who, "at least 1", 0);
        return Err(interp.raise(err));
    }
    let mut total = int_of(interp, who, items[0])?;
    for &c in &items[1..] {
        total = op(total, int_of(interp, who, c)?);
    }
    Ok(interp.alloc(Value::Integer(total)))
}

pub fn prim_bit_and(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    fold(interp, "bit-and", args, |a, b| a & b)
}

pub fn prim_bit_or(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    fold(interp, "bit-or", args, |a, b| a | b)
}

pub fn prim_bit_xor(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    fold(interp, "bit-xor", args, |a, b| a ^ b)
}

pub fn prim_bit_not(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("bit-not", "1", items.len());
        return Err(interp.raise(err));
    }
    let n = int_of(interp, "bit-not", items[0])?;
    Ok(interp.alloc(Value::Integer(!n)))
}

pub fn prim_shr(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 2 {
        let err = EvalError::arity("shr", "2", items.len());
        return Err(interp.raise(err));
    }
    let n = int_of(interp, "shr", items[0])?;
    let by = int_of(interp, "shr", items[1])?;
    Ok(interp.alloc(Value::Integer(n >> by)))
}

pub fn prim_shl(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 2 {
        let err = EvalError::arity("shl", "2", items.len());
        return Err(interp.raise(err));
    }
    let n = int_of(interp, "shl", items[0])?;
    let by = int_of(interp, "shl", items[1])?;
    Ok(interp.alloc(Value::Integer(n << by)))
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
    fn bitwise_folds_are_variadic() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(bit-and 12 10 8)");
        assert!(matches!(interp.pool.get(r), Value::Integer(8)));
        let r = eval_str(&mut interp, "(bit-or 1 2 4)");
        assert!(matches!(interp.pool.get(r), Value::Integer(7)));
    }

    #[test]
    fn shifts_are_fixed_arity() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(shl 1 4)");
        assert!(matches!(interp.pool.get(r), Value::Integer(16)));
        let r = eval_str(&mut interp, "(shr 16 4)");
        assert!(matches!(interp.pool.get(r), Value::Integer(1)));
    }

    #[test]
    fn bit_not_inverts_bits() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(bit-not 0)");
        assert!(matches!(interp.pool.get(r), Value::Integer(-1)));
    }
}
