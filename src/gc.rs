//! Mark-and-sweep collection (§4.6).
//!
//! Grounded on `original_source/src/garbage_collector.c`'s `gc_unmark_all` /
//! `gc_mark_expr` / `gc_collect` three-phase shape, with one deliberate
//! correctness fix over the original (see SPEC_FULL.md's "GC root fix"):
//! the original only marks a lambda/macro's *own* captured frame as
//! `is_used` and recurses into its body, but never walks the bindings held
//! *in* that frame (or its ancestors) — a closure over a large captured
//! value can be collected out from under it. Here, marking a `Lambda`/
//! `Macro` recursively marks every value reachable from its captured frame
//! chain, not just the frame's existence.

use crate::env::Environment;
use crate::pool::{CellRef, Pool};
use crate::value::Value;
use std::collections::HashSet;

/// Marks `cell_ref` and everything reachable from it, skipping work already
/// marked (handles cycles through `Pair`s and shared structure).
fn mark_value(pool: &mut Pool, cell_ref: CellRef) {
    if pool.is_marked(cell_ref) {
        return;
    }
    pool.set_marked(cell_ref);

    match pool.get(cell_ref).clone() {
        Value::Pair(car, cdr) => {
            mark_value(pool, car);
            mark_value(pool, cdr);
        }
        Value::Lambda(ctx) | Value::Macro(ctx) => {
            mark_env(pool, &ctx.env);
            for &expr in &ctx.body {
                mark_value(pool, expr);
            }
        }
        Value::Integer(_)
        | Value::Float(_)
        | Value::Symbol(_)
        | Value::Str(_)
        | Value::Error(_)
        | Value::Primitive(_) => {}
    }
}

/// Marks every value bound in `env`'s frame chain, walking to the root.
/// Frames are visited at most once even when several closures share an
/// ancestor, via `visited`'s pointer-identity check.
fn mark_env(pool: &mut Pool, env: &Environment) {
    mark_env_inner(pool, env, &mut HashSet::new());
}

fn mark_env_inner(pool: &mut Pool, env: &Environment, visited: &mut HashSet<usize>) {
    let key = env.identity_key();
    if !visited.insert(key) {
        return;
    }
    for value in env.own_bindings() {
        mark_value(pool, value);
    }
    if let Some(parent) = env.parent() {
        mark_env_inner(pool, &parent, visited);
    }
}

/// The root set for a collection: every environment frame currently
/// reachable from the running evaluator (the global frame plus the active
/// call chain), and every loose value the evaluator is holding outside any
/// frame (`nil`, `tru`, the trace list, in-flight intermediate results).
pub struct Roots<'a> {
    pub environments: &'a [Environment],
    pub values: &'a [CellRef],
}

/// Runs a full collection: unmark everything, mark from `roots`, sweep.
/// Returns the number of cells reclaimed.
pub fn collect(pool: &mut Pool, roots: &Roots) -> usize {
    pool.unmark_all();
    for env in roots.environments {
        mark_env(pool, env);
    }
    for &value in roots.values {
        mark_value(pool, value);
    }
    pool.sweep()
}
