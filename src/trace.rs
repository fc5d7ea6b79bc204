//! Call tracing and the callstack (§4.7).
//!
//! Grounded on `original_source/src/debug.c`: a nesting counter plus an
//! indented "pre"/"post" print pair around a traced call, and a separate
//! growable callstack of in-flight calls used only for `(callstack)`
//! introspection. `*debug-trace*` (the list of functions to trace) lives as
//! an ordinary, mutable global binding in the environment (see
//! `eval::Interpreter::new`), not in this module — this module only holds
//! the nesting/callstack bookkeeping that has no Lisp-visible binding.
//!
//! Printing needs a pool to resolve `CellRef`s into text, which this module
//! does not own, so callers pass a formatting closure rather than this
//! module depending on `eval`.

use crate::pool::{CellRef, Pool};

/// Renders a value for trace/callstack output. Supplied by the caller
/// (`eval::Interpreter::write_form`) so this module stays pool-agnostic.
pub type Render<'a> = dyn Fn(&Pool, CellRef) -> String + 'a;

#[derive(Default)]
pub struct Tracer {
    nesting: usize,
}

impl Tracer {
    pub fn new() -> Self {
        Tracer { nesting: 0 }
    }

    fn indent(&self) -> String {
        "  ".repeat(self.nesting + 1)
    }

    /// Prints `(func arg1 arg2 ...)` at the current nesting, then increments
    /// it. `args` must be a proper list (or `nil`).
    pub fn print_pre(&mut self, pool: &Pool, render: &Render, func: CellRef, mut args: CellRef, nil: CellRef) {
        let mut out = format!("{}{}: (", self.indent(), self.nesting % 10);
        out.push_str(&render(pool, func));
        while args != nil {
            match pool.get(args) {
                crate::value::Value::Pair(car, cdr) => {
                    out.push(' ');
                    out.push_str(&render(pool, *car));
                    args = *cdr;
                }
                _ => break,
            }
        }
        out.push(')');
        println!("{out}");
        self.nesting += 1;
    }

    /// Prints the result of a traced call, then decrements the nesting.
    /// `result` is `None` when the call raised an error.
    pub fn print_post(&mut self, pool: &Pool, render: &Render, result: Option<CellRef>) {
        self.nesting = self.nesting.saturating_sub(1);
        let body = match result {
            Some(r) => render(pool, r),
            None => "ERR".to_string(),
        };
        println!("{}{}: {}", self.indent(), self.nesting % 10, body);
    }
}

/// The introspectable callstack: every call currently in flight, most recent
/// last. Distinct from `Tracer`, which only prints around *traced* calls;
/// this tracks every call so `(callstack)` can report the full chain.
#[derive(Default)]
pub struct CallStack {
    frames: Vec<CellRef>,
}

impl CallStack {
    pub fn new() -> Self {
        CallStack { frames: Vec::new() }
    }

    pub fn push(&mut self, func: CellRef) {
        self.frames.push(func);
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Every in-flight call, recent first — mirrors `debug_callstack_print`.
    pub fn to_lines(&self, pool: &Pool, render: &Render) -> Vec<String> {
        self.frames
            .iter()
            .rev()
            .enumerate()
            .map(|(i, &f)| format!("  {i}: {}", render(pool, f)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn render_int(pool: &Pool, r: CellRef) -> String {
        match pool.get(r) {
            Value::Integer(n) => n.to_string(),
            _ => "?".to_string(),
        }
    }

    #[test]
    fn callstack_push_pop_tracks_depth() {
        let mut pool = Pool::new(4);
        let f = pool.alloc(Value::Integer(1)).unwrap();
        let mut stack = CallStack::new();
        assert_eq!(stack.depth(), 0);
        stack.push(f);
        assert_eq!(stack.depth(), 1);
        stack.pop();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn callstack_lines_are_most_recent_first() {
        let mut pool = Pool::new(4);
        let a = pool.alloc(Value::Integer(1)).unwrap();
        let b = pool.alloc(Value::Integer(2)).unwrap();
        let mut stack = CallStack::new();
        stack.push(a);
        stack.push(b);
        let lines = stack.to_lines(&pool, &render_int);
        assert_eq!(lines[0], "  0: 2");
        assert_eq!(lines[1], "  1: 1");
    }

    #[test]
    fn tracer_nesting_increments_and_decrements() {
        let mut pool = Pool::new(4);
        let nil = pool.alloc(Value::Integer(0)).unwrap();
        let f = pool.alloc(Value::Integer(9)).unwrap();
        let mut tracer = Tracer::new();
        tracer.print_pre(&pool, &render_int, f, nil, nil);
        tracer.print_post(&pool, &render_int, Some(f));
    }
}
