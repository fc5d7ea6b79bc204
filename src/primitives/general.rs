//! Evaluation control and randomness: `eval`, `apply`, `macroexpand`,
//! `random`, `set-random-seed` (§6.2).
//!
//! Grounded on `original_source/src/prim_general.c`. `macroexpand` resolves
//! its argument to a macro-call-shaped form, looks the head up to get the
//! actual `Value::Macro`, then expands it through the same binding/body
//! machinery as a normal macro call but *without* the follow-up `eval` a
//! macro call normally gets — hence `Interpreter::call_closure` being
//! exposed as `pub(crate)` rather than private.

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{EvalResult, Interpreter};
use crate::pool::CellRef;
use crate::value::Value;

pub fn install(interp: &mut Interpreter) {
    interp.bind_primitive("eval", prim_eval);
    interp.bind_primitive("apply", prim_apply);
    interp.bind_primitive("macroexpand", prim_macroexpand);
    interp.bind_primitive("random", prim_random);
    interp.bind_primitive("set-random-seed", prim_set_random_seed);
}

pub fn prim_eval(interp: &mut Interpreter, env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("eval", "1", items.len());
        return Err(interp.raise(err));
    }
    interp.eval_result(env, items[0])
}

pub fn prim_apply(interp: &mut Interpreter, env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 2 {
        let err = EvalError::arity("apply", "2", items.len());
        return Err(interp.raise(err));
    }
    let func = items[0];
    if !interp.pool.get(func).is_applicable() {
        let got = interp.pool.get(func).type_name().to_string();
        return Err(interp.raise(EvalError::NotCallable { got }));
    }
    if !interp.is_proper_list(items[1]) {
        let err = EvalError::type_mismatch(
            "apply",
            "proper list",
            interp.pool.get(items[1]).type_name(),
        );
        return Err(interp.raise(err));
    }
    interp.apply_result(env, func, items[1])
}

/// The argument, once evaluated normally, must itself be a proper list
/// shaped like `(macro-name . args)`; `macro-name` is resolved via `eval`
/// to obtain the `Value::Macro`.
pub fn prim_macroexpand(interp: &mut Interpreter, env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("macroexpand", "1", items.len());
        return Err(interp.raise(err));
    }
    let form = items[0];
    if !interp.is_proper_list(form) || form == interp.nil {
        let err = EvalError::type_mismatch(
            "macroexpand",
            "a macro call form",
            interp.pool.get(form).type_name(),
        );
        return Err(interp.raise(err));
    }
    let (head, call_args) = match interp.pool.get(form) {
        Value::Pair(car, cdr) => (*car, *cdr),
        _ => unreachable!("checked is_proper_list and non-nil above"),
    };
    let func = interp.eval_result(env, head)?;
    let ctx = match interp.pool.get(func) {
        Value::Macro(ctx) => ctx.clone(),
        other => {
            let err = EvalError::type_mismatch("macroexpand", "macro", other.type_name());
            return Err(interp.raise(err));
        }
    };
    interp.call_closure(env, &ctx, call_args)
}

pub fn prim_random(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("random", "1", items.len());
        return Err(interp.raise(err));
    }
    interp.random_upper(items[0])
}

pub fn prim_set_random_seed(
    interp: &mut Interpreter,
    _env: &Environment,
    args: CellRef,
) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("set-random-seed", "1", items.len());
        return Err(interp.raise(err));
    }
    match interp.pool.get(items[0]) {
        Value::Integer(seed) => {
            let seed = *seed;
            interp.set_random_seed(seed);
            Ok(interp.tru)
        }
        other => {
            let err = EvalError::type_mismatch("set-random-seed", "int", other.type_name());
            Err(interp.raise(err))
        }
    }
}
