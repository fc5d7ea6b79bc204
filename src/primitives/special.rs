//! Special forms: `quote`, `backquote`/unquote/splice, `define`,
//! `define-global`, `lambda`, `macro`, `begin`, `if`, `or`, `and` (§4.4).
//!
//! Grounded on `original_source/src/prim_special.c`. These are bound with
//! `Flags::SPECIAL`, so `eval_call` passes their argument list unevaluated —
//! each form below decides for itself which of its arguments to evaluate
//! and in what order.

use crate::env::{Environment, Flags};
use crate::error::EvalError;
use crate::eval::{EvalResult, Interpreter};
use crate::pool::CellRef;
use crate::value::{LambdaCtx, Value};
use std::rc::Rc;

/// `(func . args)` shaped like a call to the named head symbol, returning
/// the single argument cell if so. Grounded on `is_call_to` in
/// `prim_special.c`.
fn is_call_to(interp: &Interpreter, expr: CellRef, name: &str) -> Option<CellRef> {
    if expr == interp.nil {
        return None;
    }
    match interp.pool.get(expr) {
        Value::Pair(car, cdr) => {
            let is_head = matches!(interp.pool.get(*car), Value::Symbol(s) if s == name);
            if !is_head {
                return None;
            }
            match interp.pool.get(*cdr) {
                Value::Pair(arg, rest) if *rest == interp.nil => Some(*arg),
                _ => None,
            }
        }
        _ => None,
    }
}

/// `handle_backquote_arg`: rewrites a single quasiquoted form, resolving
/// `unquote`/`splice` children, leaving everything else structurally
/// unchanged.
fn handle_backquote_arg(interp: &mut Interpreter, env: &Environment, expr: CellRef) -> EvalResult {
    if expr == interp.nil {
        return Ok(interp.nil);
    }
    if !matches!(interp.pool.get(expr), Value::Pair(..)) {
        return Ok(expr);
    }
    if let Some(arg) = is_call_to(interp, expr, "unquote") {
        return interp.eval_result(env, arg);
    }
    if is_call_to(interp, expr, "splice").is_some() {
        let err = EvalError::MalformedQuasiquote("can't splice (,@) outside of a list".to_string());
        return Err(interp.raise(err));
    }

    let mut items = Vec::new();
    let mut cur = expr;
    while cur != interp.nil {
        let (car, cdr) = match interp.pool.get(cur) {
            Value::Pair(car, cdr) => (*car, *cdr),
            _ => {
                let err = EvalError::MalformedQuasiquote("improper list in backquote".to_string());
                return Err(interp.raise(err));
            }
        };
        if let Some(splice_arg) = is_call_to(interp, car, "splice") {
            let evaluated = interp.eval_result(env, splice_arg)?;
            if !interp.is_proper_list(evaluated) {
                let err = EvalError::MalformedQuasiquote(
                    "can't splice (,@) a non-list expression".to_string(),
                );
                return Err(interp.raise(err));
            }
            let spliced = interp.list_to_vec(evaluated)?;
            items.extend(spliced);
        } else {
            items.push(handle_backquote_arg(interp, env, car)?);
        }
        cur = cdr;
    }
    Ok(interp.vec_to_list(&items))
}

pub fn prim_quote(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("quote", "1", items.len());
        return Err(interp.raise(err));
    }
    Ok(items[0])
}

pub fn prim_backquote(interp: &mut Interpreter, env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("backquote", "1", items.len());
        return Err(interp.raise(err));
    }
    handle_backquote_arg(interp, env, items[0])
}

pub fn prim_unquote(interp: &mut Interpreter, _env: &Environment, _args: CellRef) -> EvalResult {
    let err = EvalError::MalformedQuasiquote("invalid use of unquote (,) outside of backquote".to_string());
    Err(interp.raise(err))
}

pub fn prim_splice(interp: &mut Interpreter, _env: &Environment, _args: CellRef) -> EvalResult {
    let err = EvalError::MalformedQuasiquote("invalid use of splice (,@) outside of backquote".to_string());
    Err(interp.raise(err))
}

fn symbol_name(interp: &mut Interpreter, cell: CellRef, who: &str) -> Result<String, CellRef> {
    match interp.pool.get(cell) {
        Value::Symbol(s) => Ok(s.clone()),
        other => {
            let err = EvalError::type_mismatch(who, "symbol", other.type_name());
            Err(interp.raise(err))
        }
    }
}

pub fn prim_define(interp: &mut Interpreter, env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 2 {
        let err = EvalError::arity("define", "2", items.len());
        return Err(interp.raise(err));
    }
    let name = symbol_name(interp, items[0], "define")?;
    let value = interp.eval_result(env, items[1])?;
    if env.bind(&name, value, Flags::NONE) {
        Ok(value)
    } else {
        Err(interp.raise(EvalError::ConstReassignment { name }))
    }
}

pub fn prim_define_global(interp: &mut Interpreter, env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 2 {
        let err = EvalError::arity("define-global", "2", items.len());
        return Err(interp.raise(err));
    }
    let name = symbol_name(interp, items[0], "define-global")?;
    let value = interp.eval_result(env, items[1])?;
    if env.bind_global(&name, value, Flags::NONE) {
        Ok(value)
    } else {
        Err(interp.raise(EvalError::ConstReassignment { name }))
    }
}

/// Parses a `(a b &rest c)`-shaped formals list (`count_formals` /
/// `lambda_ctx_new` in `lambda.c`).
fn parse_formals(
    interp: &mut Interpreter,
    formals: CellRef,
) -> Result<(Vec<String>, Option<String>), CellRef> {
    let raw = interp.list_to_vec(formals)?;
    let mut mandatory = Vec::new();
    let mut rest = None;
    let mut i = 0;
    while i < raw.len() {
        let name = symbol_name(interp, raw[i], "lambda")?;
        if name == "&rest" {
            if i + 2 != raw.len() {
                let err = EvalError::Custom(
                    "expected exactly 1 formal after `&rest' keyword".to_string(),
                );
                return Err(interp.raise(err));
            }
            rest = Some(symbol_name(interp, raw[i + 1], "lambda")?);
            break;
        }
        mandatory.push(name);
        i += 1;
    }
    Ok((mandatory, rest))
}

fn make_closure(
    interp: &mut Interpreter,
    env: &Environment,
    args: CellRef,
    who: &str,
) -> Result<LambdaCtx, CellRef> {
    let items = interp.list_to_vec(args)?;
    if items.len() < 2 {
        let err = EvalError::arity(who, "at least 2", items.len());
        return Err(interp.raise(err));
    }
    let (formals, rest) = parse_formals(interp, items[0])?;
    let body = items[1..].to_vec();
    let captured = Environment::new_child(env);
    Ok(LambdaCtx { env: captured, formals, rest, body })
}

pub fn prim_lambda(interp: &mut Interpreter, env: &Environment, args: CellRef) -> EvalResult {
    let ctx = make_closure(interp, env, args, "lambda")?;
    Ok(interp.alloc(Value::Lambda(Rc::new(ctx))))
}

pub fn prim_macro(interp: &mut Interpreter, env: &Environment, args: CellRef) -> EvalResult {
    let ctx = make_closure(interp, env, args, "macro")?;
    Ok(interp.alloc(Value::Macro(Rc::new(ctx))))
}

pub fn prim_begin(interp: &mut Interpreter, env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    let mut last = interp.nil;
    for item in items {
        last = interp.eval_result(env, item)?;
    }
    Ok(last)
}

pub fn prim_if(interp: &mut Interpreter, env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 3 {
        let err = EvalError::arity("if", "3", items.len());
        return Err(interp.raise(err));
    }
    let predicate = interp.eval_result(env, items[0])?;
    let branch = if interp.is_nil(predicate) { items[2] } else { items[1] };
    interp.eval_result(env, branch)
}

pub fn prim_or(interp: &mut Interpreter, env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    for item in items {
        let result = interp.eval_result(env, item)?;
        if !interp.is_nil(result) {
            return Ok(result);
        }
    }
    Ok(interp.nil)
}

pub fn prim_and(interp: &mut Interpreter, env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    let mut result = interp.tru;
    for item in items {
        result = interp.eval_result(env, item)?;
        if interp.is_nil(result) {
            return Ok(result);
        }
    }
    Ok(result)
}
