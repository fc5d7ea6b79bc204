//! The evaluator core: `Interpreter`, `eval`, `apply`, interning, and the
//! handful of cross-cutting helpers (list conversion, equality, ordering,
//! print/write form) every primitive needs.
//!
//! Grounded on `original_source/src/eval.c` (`eval`/`eval_function_call`/
//! `eval_list`/`apply`) and `src/lambda.c` (`lambda_ctx_eval_body`,
//! `lambda_call`, `macro_call`), restructured around `Result<CellRef,
//! CellRef>` so `?` can propagate a first-class Error value without a
//! parallel Rust-level `Result<T, EvalError>` track.

use crate::ast::Sexpr;
use crate::env::{Environment, Flags};
use crate::error::EvalError;
use crate::gc::{self, Roots};
use crate::pool::{CellRef, Pool};
use crate::trace::{CallStack, Render, Tracer};
use crate::value::{LambdaCtx, PrimitiveHandle, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Both arms carry a `CellRef` — `Ok` the value, `Err` an already-allocated
/// `Value::Error` cell — so `?` propagates an Error the same way it would
/// propagate any other Rust error, while keeping "errors are first-class
/// values" intact at the `eval`/`apply` public boundary (§7).
pub type EvalResult = Result<CellRef, CellRef>;

const POOL_GROW_BY: usize = crate::pool::POOL_BASE_SIZE;

/// Renders a cell as Lisp-readable text, with string contents escaped —
/// `write`'s notion of printing, not `print`'s. Grounded on `expr.c`'s
/// `expr_print`: Integer via plain decimal, Float with six decimal places
/// (the C `%f` default), Symbol bare, String with escapes, Pair as a
/// parenthesised list.
pub fn write_form(pool: &Pool, cell: CellRef) -> String {
    render(pool, cell, true)
}

/// Renders a cell the way `print`/`princ` would: string contents are written
/// raw, with no surrounding quotes or escaping.
pub fn print_form(pool: &Pool, cell: CellRef) -> String {
    render(pool, cell, false)
}

fn render(pool: &Pool, cell: CellRef, quote_strings: bool) -> String {
    match pool.get(cell) {
        Value::Integer(n) => n.to_string(),
        Value::Float(f) => format!("{f:.6}"),
        Value::Symbol(s) => s.clone(),
        Value::Str(s) => {
            if quote_strings {
                format!("\"{}\"", escape_str(s))
            } else {
                s.clone()
            }
        }
        Value::Error(msg) => format!("<error: {msg}>"),
        Value::Primitive(handle) => format!("<primitive:{}>", handle.name),
        Value::Lambda(_) => "<lambda>".to_string(),
        Value::Macro(_) => "<macro>".to_string(),
        Value::Pair(car, cdr) => {
            let car = *car;
            let cdr = *cdr;
            if car == cell && cdr == cell {
                return "nil".to_string();
            }
            let mut out = String::from("(");
            out.push_str(&render(pool, car, quote_strings));
            let mut rest = cdr;
            loop {
                match pool.get(rest) {
                    Value::Pair(next_car, next_cdr) => {
                        if *next_car == rest && *next_cdr == rest {
                            break;
                        }
                        out.push(' ');
                        out.push_str(&render(pool, *next_car, quote_strings));
                        rest = *next_cdr;
                    }
                    _ => {
                        out.push_str(" . ");
                        out.push_str(&render(pool, rest, quote_strings));
                        break;
                    }
                }
            }
            out.push(')');
            out
        }
    }
}

fn escape_str(s: &str) -> String {
    let mut out = String::new();
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out
}

pub struct Interpreter {
    pub pool: Pool,
    pub globals: Environment,
    pub nil: CellRef,
    pub tru: CellRef,
    pub rng: StdRng,
    pub tracer: Tracer,
    pub callstack: CallStack,
}

impl Interpreter {
    pub fn new(pool_size: usize) -> Self {
        let mut pool = Pool::new(pool_size);

        // `nil` is the unique, self-referential empty Pair (see value.rs).
        // A cell can't reference itself before it exists, so allocate a
        // placeholder, then patch it in place.
        let nil = pool.alloc_or_expand(Value::Integer(0), POOL_GROW_BY);
        *pool.get_mut(nil) = Value::Pair(nil, nil);

        let tru = pool.alloc_or_expand(Value::Symbol("tru".to_string()), POOL_GROW_BY);

        let globals = Environment::new_root();

        let mut interp = Interpreter {
            pool,
            globals,
            nil,
            tru,
            rng: StdRng::seed_from_u64(0xbeef_cafe),
            tracer: Tracer::new(),
            callstack: CallStack::new(),
        };

        interp.bind_global_const("nil", nil);
        interp.bind_global_const("tru", tru);
        let trace_list = interp.nil;
        interp.globals.bind("*debug-trace*", trace_list, Flags::NONE);

        crate::primitives::install(&mut interp);
        interp
    }

    fn bind_global_const(&mut self, name: &str, value: CellRef) {
        self.globals.bind(name, value, Flags::CONST);
    }

    pub fn bind_primitive(&mut self, name: &'static str, func: crate::value::PrimitiveFn) {
        let handle = Value::Primitive(PrimitiveHandle { name, func });
        let cell = self.alloc(handle);
        self.globals.bind(name, cell, Flags::CONST);
    }

    pub fn bind_special(&mut self, name: &'static str, func: crate::value::PrimitiveFn) {
        let handle = Value::Primitive(PrimitiveHandle { name, func });
        let cell = self.alloc(handle);
        self.globals.bind(name, cell, Flags::CONST_SPECIAL);
    }

    pub fn alloc(&mut self, value: Value) -> CellRef {
        self.pool.alloc_or_expand(value, POOL_GROW_BY)
    }

    pub fn raise(&mut self, err: EvalError) -> CellRef {
        self.alloc(Value::Error(err.to_string()))
    }

    /// Runs a full mark-and-sweep collection rooted at the global frame
    /// (and, transitively, every closure reachable from it) plus `nil`/
    /// `tru`. Called between top-level forms (§4.6), never mid-evaluation.
    pub fn collect_garbage(&mut self) -> usize {
        let roots = Roots {
            environments: std::slice::from_ref(&self.globals),
            values: &[self.nil, self.tru],
        };
        gc::collect(&mut self.pool, &roots)
    }

    pub fn write_form(&self, cell: CellRef) -> String {
        write_form(&self.pool, cell)
    }

    pub fn print_form(&self, cell: CellRef) -> String {
        print_form(&self.pool, cell)
    }

    // -- interning: Sexpr -> pool cells ----------------------------------

    /// Converts a reader `Sexpr` into a pool-resident value tree. An empty
    /// `Sexpr::List` interns to `nil`.
    pub fn intern(&mut self, sexpr: &Sexpr) -> CellRef {
        match sexpr {
            Sexpr::Integer(n) => self.alloc(Value::Integer(*n)),
            Sexpr::Float(f) => self.alloc(Value::Float(*f)),
            Sexpr::Symbol(s) => self.alloc(Value::Symbol(s.clone())),
            Sexpr::Str(s) => self.alloc(Value::Str(s.clone())),
            Sexpr::List(items) => {
                let mut list = self.nil;
                for item in items.iter().rev() {
                    let cell = self.intern(item);
                    list = self.alloc(Value::Pair(cell, list));
                }
                list
            }
        }
    }

    // -- list helpers ------------------------------------------------------

    /// True for the canonical `nil` cell itself, or for any cell holding the
    /// symbol `nil` — the two are indistinguishable at the equality/
    /// truthiness level (§3.1, §3.4), even though only the former is ever
    /// produced by list-spine operations.
    pub fn is_nil_value(&self, cell: CellRef) -> bool {
        cell == self.nil || matches!(self.pool.get(cell), Value::Symbol(s) if s == "nil")
    }

    pub fn is_nil(&self, cell: CellRef) -> bool {
        self.is_nil_value(cell)
    }

    pub fn cons(&mut self, car: CellRef, cdr: CellRef) -> CellRef {
        self.alloc(Value::Pair(car, cdr))
    }

    /// `nil` or a chain of `Pair`s whose final `cdr` is `nil`.
    pub fn is_proper_list(&self, mut cell: CellRef) -> bool {
        loop {
            if cell == self.nil {
                return true;
            }
            match self.pool.get(cell) {
                Value::Pair(_, cdr) => cell = *cdr,
                _ => return false,
            }
        }
    }

    /// Collects a proper list into a `Vec`. Returns an `InvalidApplication`
    /// error if the spine is improper.
    pub fn list_to_vec(&mut self, mut cell: CellRef) -> Result<Vec<CellRef>, CellRef> {
        let mut out = Vec::new();
        while cell != self.nil {
            match self.pool.get(cell) {
                Value::Pair(car, cdr) => {
                    out.push(*car);
                    cell = *cdr;
                }
                _ => {
                    let err = EvalError::InvalidApplication("improper list".to_string());
                    return Err(self.raise(err));
                }
            }
        }
        Ok(out)
    }

    pub fn vec_to_list(&mut self, items: &[CellRef]) -> CellRef {
        let mut list = self.nil;
        for &item in items.iter().rev() {
            list = self.cons(item, list);
        }
        list
    }

    pub fn list_len(&self, mut cell: CellRef) -> usize {
        let mut n = 0;
        while cell != self.nil {
            match self.pool.get(cell) {
                Value::Pair(_, cdr) => {
                    n += 1;
                    cell = *cdr;
                }
                _ => break,
            }
        }
        n
    }

    // -- eval/apply ----------------------------------------------------------

    /// Public entry point: always returns a value (an Error cell on
    /// failure), matching the "no third state" invariant (§8.1).
    pub fn eval(&mut self, env: &Environment, expr: CellRef) -> CellRef {
        self.eval_result(env, expr).unwrap_or_else(|e| e)
    }

    pub fn eval_result(&mut self, env: &Environment, expr: CellRef) -> EvalResult {
        if expr == self.nil {
            // nil is its own self-referential Pair; evaluating the empty
            // list as an application would recurse into itself forever, so
            // treat it as self-evaluating like any other atomic constant.
            return Ok(self.nil);
        }

        match self.pool.get(expr).clone() {
            Value::Symbol(name) => env
                .get(&name)
                .ok_or_else(|| self.raise(EvalError::UnboundSymbol(name))),
            Value::Pair(head, _) => self.eval_call(env, expr, head),
            _ => Ok(expr),
        }
    }

    fn is_special_head(&self, env: &Environment, head: CellRef) -> bool {
        if let Value::Symbol(name) = self.pool.get(head) {
            env.get_flags(name).is_special
        } else {
            false
        }
    }

    fn eval_call(&mut self, env: &Environment, form: CellRef, head: CellRef) -> EvalResult {
        if !self.is_proper_list(form) {
            let err = EvalError::InvalidApplication(
                "expected a proper list for the procedure/macro call".to_string(),
            );
            return Err(self.raise(err));
        }

        let args_unevaled = match self.pool.get(form) {
            Value::Pair(_, cdr) => *cdr,
            _ => unreachable!("eval_call is only entered for a Pair form"),
        };

        let got_special = self.is_special_head(env, head);
        let func = self.eval_result(env, head)?;

        let func_value = self.pool.get(func).clone();
        if !func_value.is_applicable() {
            let err = EvalError::NotCallable {
                got: func_value.type_name().to_string(),
            };
            return Err(self.raise(err));
        }
        let is_macro = matches!(func_value, Value::Macro(_));

        let should_eval_args = args_unevaled != self.nil && !got_special && !is_macro;
        let args = if should_eval_args {
            self.eval_list(env, args_unevaled)?
        } else {
            args_unevaled
        };

        let traced = self.is_traced(func);
        if traced {
            let render: &Render = &render_for_trace;
            self.tracer.print_pre(&self.pool, render, head, args, self.nil);
        }

        self.callstack.push(head);
        let result = self.apply_result(env, func, args);
        self.callstack.pop();

        if traced {
            let render: &Render = &render_for_trace;
            self.tracer
                .print_post(&self.pool, render, result.as_ref().ok().copied());
        }

        result
    }

    /// Evaluates each element of a proper list left-to-right, short-circuiting
    /// on the first Error (`eval_list` in the original).
    fn eval_list(&mut self, env: &Environment, mut list: CellRef) -> EvalResult {
        let mut results = Vec::new();
        while list != self.nil {
            let (car, cdr) = match self.pool.get(list) {
                Value::Pair(car, cdr) => (*car, *cdr),
                _ => {
                    let err = EvalError::InvalidApplication("improper argument list".to_string());
                    return Err(self.raise(err));
                }
            };
            results.push(self.eval_result(env, car)?);
            list = cdr;
        }
        Ok(self.vec_to_list(&results))
    }

    fn is_traced(&self, func: CellRef) -> bool {
        let trace_list = match self.globals.get("*debug-trace*") {
            Some(v) => v,
            None => return false,
        };
        self.is_member(trace_list, func)
    }

    fn is_member(&self, mut list: CellRef, target: CellRef) -> bool {
        while list != self.nil {
            match self.pool.get(list) {
                Value::Pair(car, cdr) => {
                    if self.values_equal(*car, target) {
                        return true;
                    }
                    list = *cdr;
                }
                _ => return false,
            }
        }
        false
    }

    pub fn apply_result(&mut self, env: &Environment, func: CellRef, args: CellRef) -> EvalResult {
        match self.pool.get(func).clone() {
            Value::Primitive(handle) => (handle.func)(self, env, args),
            Value::Lambda(ctx) => self.call_closure(env, &ctx, args),
            Value::Macro(ctx) => {
                let expansion = self.call_closure(env, &ctx, args)?;
                self.eval_result(env, expansion)
            }
            other => {
                let err = EvalError::NotCallable {
                    got: other.type_name().to_string(),
                };
                Err(self.raise(err))
            }
        }
    }

    /// §4.5: bind formals into the captured frame, retarget its parent to
    /// the caller's active frame, then evaluate the body in order. Shared
    /// by `apply_result`'s Lambda arm and `macroexpand` (which needs the
    /// expansion without the follow-up `eval`).
    pub(crate) fn call_closure(
        &mut self,
        env: &Environment,
        ctx: &LambdaCtx,
        args: CellRef,
    ) -> EvalResult {
        let arg_values = self.list_to_vec(args)?;
        let mandatory = ctx.formals.len();

        let arity_ok = match &ctx.rest {
            Some(_) => arg_values.len() >= mandatory,
            None => arg_values.len() == mandatory,
        };
        if !arity_ok {
            let expected = match &ctx.rest {
                Some(_) => format!("at least {mandatory}"),
                None => mandatory.to_string(),
            };
            let err = EvalError::arity("lambda", expected, arg_values.len());
            return Err(self.raise(err));
        }

        for (name, &value) in ctx.formals.iter().zip(arg_values.iter()) {
            ctx.env.bind(name, value, Flags::NONE);
        }
        if let Some(rest_name) = &ctx.rest {
            let rest_values = &arg_values[mandatory..];
            let rest_list = self.vec_to_list(rest_values);
            ctx.env.bind(rest_name, rest_list, Flags::NONE);
        }

        ctx.env.set_parent(env.clone());

        let mut last = self.nil;
        for &expr in &ctx.body {
            last = self.eval_result(&ctx.env, expr)?;
        }
        Ok(last)
    }

    // -- equality / ordering -------------------------------------------------

    /// Structural equality (§3.4): `nil` and the symbol `nil` are equal as a
    /// special case; numbers never cross-promote; lambdas/macros compare by
    /// formals/rest/body, not by captured environment.
    pub fn values_equal(&self, a: CellRef, b: CellRef) -> bool {
        if self.is_nil_value(a) && self.is_nil_value(b) {
            return true;
        }
        let (va, vb) = (self.pool.get(a), self.pool.get(b));
        match (va, vb) {
            (Value::Integer(x), Value::Integer(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => x == y,
            (Value::Symbol(x), Value::Symbol(y)) => x == y,
            (Value::Str(x), Value::Str(y)) => x == y,
            (Value::Error(x), Value::Error(y)) => x == y,
            (Value::Pair(ca, da), Value::Pair(cb, db)) => {
                self.values_equal(*ca, *cb) && self.values_equal(*da, *db)
            }
            (Value::Primitive(x), Value::Primitive(y)) => x == y,
            (Value::Lambda(x), Value::Lambda(y)) | (Value::Macro(x), Value::Macro(y)) => {
                x.formals == y.formals
                    && x.rest == y.rest
                    && x.body.len() == y.body.len()
                    && x.body
                        .iter()
                        .zip(y.body.iter())
                        .all(|(&p, &q)| self.values_equal(p, q))
            }
            _ => false,
        }
    }

    /// Numeric value for `=`/`<`/`>` promotion; `None` for non-numbers.
    pub fn as_f64(&self, cell: CellRef) -> Option<f64> {
        self.pool.get(cell).as_f64()
    }

    /// `=`: numeric equality, promoting both sides to a common float domain
    /// (§3.4) — unlike `values_equal`, `(= 1 1.0)` holds. Non-numbers are
    /// never equal under `=`.
    pub fn numeric_eq(&self, a: CellRef, b: CellRef) -> bool {
        match (self.as_f64(a), self.as_f64(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// `<` (and, negated/swapped by callers, `>`): numeric comparison
    /// float-promotes; symbol/string/error compare byte-wise; anything else
    /// is false for both directions (§3.4, grounded on `expr_lt`/`expr_gt`).
    pub fn less_than(&self, a: CellRef, b: CellRef) -> bool {
        if let (Some(x), Some(y)) = (self.as_f64(a), self.as_f64(b)) {
            return x < y;
        }
        match (self.pool.get(a), self.pool.get(b)) {
            (Value::Symbol(x), Value::Symbol(y)) => x < y,
            (Value::Str(x), Value::Str(y)) => x < y,
            (Value::Error(x), Value::Error(y)) => x < y,
            _ => false,
        }
    }

    pub fn greater_than(&self, a: CellRef, b: CellRef) -> bool {
        if let (Some(x), Some(y)) = (self.as_f64(a), self.as_f64(b)) {
            return x > y;
        }
        match (self.pool.get(a), self.pool.get(b)) {
            (Value::Symbol(x), Value::Symbol(y)) => x > y,
            (Value::Str(x), Value::Str(y)) => x > y,
            (Value::Error(x), Value::Error(y)) => x > y,
            _ => false,
        }
    }

    pub fn random_upper(&mut self, upper: CellRef) -> EvalResult {
        match self.pool.get(upper).clone() {
            Value::Integer(n) if n > 0 => {
                let v = self.rng.gen_range(0..n);
                Ok(self.alloc(Value::Integer(v)))
            }
            Value::Integer(_) => Ok(self.alloc(Value::Integer(0))),
            Value::Float(f) => {
                let v: f64 = self.rng.gen::<f64>() * f;
                Ok(self.alloc(Value::Float(v)))
            }
            other => {
                let err = EvalError::type_mismatch("random", "int or flt", other.type_name());
                Err(self.raise(err))
            }
        }
    }

    pub fn set_random_seed(&mut self, seed: i64) {
        self.rng = StdRng::seed_from_u64(seed as u64);
    }
}

fn render_for_trace(pool: &Pool, cell: CellRef) -> String {
    print_form(pool, cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_evaluating_atoms_round_trip() {
        let mut interp = Interpreter::new(64);
        let n = interp.alloc(Value::Integer(7));
        let env = interp.globals.clone();
        let result = interp.eval(&env, n);
        assert!(interp.values_equal(result, n));
    }

    #[test]
    fn nil_self_evaluates() {
        let mut interp = Interpreter::new(64);
        let nil = interp.nil;
        let env = interp.globals.clone();
        let result = interp.eval(&env, nil);
        assert_eq!(result, nil);
    }

    #[test]
    fn unbound_symbol_raises_error() {
        let mut interp = Interpreter::new(64);
        let sym = interp.alloc(Value::Symbol("undefined-thing".to_string()));
        let env = interp.globals.clone();
        let result = interp.eval(&env, sym);
        assert!(matches!(interp.pool.get(result), Value::Error(_)));
    }

    #[test]
    fn define_binds_in_current_frame_and_returns_value() {
        let mut interp = Interpreter::new(64);
        let forms = crate::parser::read_all("(define x (+ 1 2))").unwrap();
        let mut result = interp.nil;
        let env = interp.globals.clone();
        for form in &forms {
            let cell = interp.intern(form);
            result = interp.eval(&env, cell);
        }
        assert!(matches!(interp.pool.get(result), Value::Integer(3)));
        let looked_up = env.get("x").unwrap();
        assert!(interp.values_equal(looked_up, result));
    }

    #[test]
    fn quote_returns_argument_unevaluated() {
        let mut interp = Interpreter::new(64);
        let forms = crate::parser::read_all("(quote (a b c))").unwrap();
        let cell = interp.intern(&forms[0]);
        let env = interp.globals.clone();
        let result = interp.eval(&env, cell);
        let items = interp.list_to_vec(result).unwrap();
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn if_picks_consequent_or_alternative() {
        let mut interp = Interpreter::new(64);
        let env = interp.globals.clone();
        let forms = crate::parser::read_all("(if 1 10 20)").unwrap();
        let cell = interp.intern(&forms[0]);
        let result = interp.eval(&env, cell);
        assert!(matches!(interp.pool.get(result), Value::Integer(10)));

        let forms = crate::parser::read_all("(if nil 10 20)").unwrap();
        let cell = interp.intern(&forms[0]);
        let result = interp.eval(&env, cell);
        assert!(matches!(interp.pool.get(result), Value::Integer(20)));
    }

    #[test]
    fn quoted_nil_symbol_is_treated_as_false_like_nil_itself() {
        let mut interp = Interpreter::new(64);
        let env = interp.globals.clone();

        let forms = crate::parser::read_all("(if (quote nil) 1 2)").unwrap();
        let cell = interp.intern(&forms[0]);
        let result = interp.eval(&env, cell);
        assert!(matches!(interp.pool.get(result), Value::Integer(2)));

        let forms = crate::parser::read_all("(or (quote nil) 5)").unwrap();
        let cell = interp.intern(&forms[0]);
        let result = interp.eval(&env, cell);
        assert!(matches!(interp.pool.get(result), Value::Integer(5)));

        let forms = crate::parser::read_all("(and (quote nil) 5)").unwrap();
        let cell = interp.intern(&forms[0]);
        let result = interp.eval(&env, cell);
        assert!(interp.is_nil_value(result));
    }

    #[test]
    fn quoted_nil_symbol_compares_equal_to_nil_itself() {
        let mut interp = Interpreter::new(64);
        let nil_symbol = interp.alloc(Value::Symbol("nil".to_string()));
        assert!(interp.values_equal(nil_symbol, interp.nil));
        assert!(interp.is_nil_value(nil_symbol));
    }

    #[test]
    fn lambda_call_binds_formals_and_evaluates_body() {
        let mut interp = Interpreter::new(64);
        let env = interp.globals.clone();
        let forms = crate::parser::read_all("((lambda (a b) (+ a b)) 3 4)").unwrap();
        let cell = interp.intern(&forms[0]);
        let result = interp.eval(&env, cell);
        assert!(matches!(interp.pool.get(result), Value::Integer(7)));
    }

    #[test]
    fn recursive_factorial_via_define() {
        let mut interp = Interpreter::new(256);
        let env = interp.globals.clone();
        let src =
            "(begin (define fact (lambda (n) (if (< n 2) 1 (* n (fact (- n 1)))))) (fact 5))";
        let forms = crate::parser::read_all(src).unwrap();
        let cell = interp.intern(&forms[0]);
        let result = interp.eval(&env, cell);
        assert!(matches!(interp.pool.get(result), Value::Integer(120)));
    }

    #[test]
    fn quasiquote_unquote_and_splice() {
        let mut interp = Interpreter::new(256);
        let env = interp.globals.clone();
        let forms = crate::parser::read_all("`(a ,(+ 1 2) ,@(list 4 5) b)").unwrap();
        let cell = interp.intern(&forms[0]);
        let result = interp.eval(&env, cell);
        let items = interp.list_to_vec(result).unwrap();
        assert_eq!(items.len(), 4);
        assert!(matches!(interp.pool.get(items[1]), Value::Integer(3)));
    }

    #[test]
    fn define_global_escapes_the_closures_local_frame() {
        let mut interp = Interpreter::new(256);
        let env = interp.globals.clone();
        let src = "(begin (define-global g 1) ((lambda () (define g 2) g)))";
        let forms = crate::parser::read_all(src).unwrap();
        let cell = interp.intern(&forms[0]);
        let result = interp.eval(&env, cell);
        assert!(matches!(interp.pool.get(result), Value::Integer(2)));
        let top_level_g = env.get("g").unwrap();
        assert!(matches!(interp.pool.get(top_level_g), Value::Integer(1)));
    }

    #[test]
    fn arity_mismatch_on_lambda_without_rest_is_an_error() {
        let mut interp = Interpreter::new(64);
        let env = interp.globals.clone();
        let forms = crate::parser::read_all("((lambda (a b) a) 1)").unwrap();
        let cell = interp.intern(&forms[0]);
        let result = interp.eval(&env, cell);
        assert!(matches!(interp.pool.get(result), Value::Error(_)));
    }

    #[test]
    fn garbage_collection_reclaims_unreferenced_cells() {
        let mut interp = Interpreter::new(16);
        let env = interp.globals.clone();
        let forms = crate::parser::read_all("(cons 1 2)").unwrap();
        let cell = interp.intern(&forms[0]);
        let _ = interp.eval(&env, cell);
        let reclaimed = interp.collect_garbage();
        assert!(reclaimed > 0);
    }
}
