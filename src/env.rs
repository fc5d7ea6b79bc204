//! Environment: a chain of binding frames (§3.2, §4.3).
//!
//! Grounded on `original_source/src/env.c`: a frame is a flat, linearly
//! scanned list of bindings (not a hash map), searched front-to-back, with an
//! optional parent. The teacher's `Rc<Environment>` sharing shape is kept —
//! a child frame holds a reference-counted handle to its parent — but each
//! binding now carries a `Flags` bitset (`CONST`/`SPECIAL`) as the distilled
//! spec requires, and binding values are `CellRef`s into the pool so the
//! collector can reach them as roots (§4.6).
//!
//! The parent link is `RefCell<Option<Environment>>`, not a plain field,
//! because lambda/macro invocation transiently retargets a captured frame's
//! parent to the caller's active frame on every call (§4.3, §9).

use crate::pool::CellRef;
use std::cell::RefCell;
use std::rc::Rc;

/// Per-binding flag set, a subset of `{CONST, SPECIAL}` (§3.2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub is_const: bool,
    pub is_special: bool,
}

impl Flags {
    pub const NONE: Flags = Flags { is_const: false, is_special: false };
    pub const CONST: Flags = Flags { is_const: true, is_special: false };
    pub const SPECIAL: Flags = Flags { is_const: false, is_special: true };
    pub const CONST_SPECIAL: Flags = Flags { is_const: true, is_special: true };
}

#[derive(Debug, Clone)]
struct Binding {
    name: String,
    value: CellRef,
    flags: Flags,
}

#[derive(Debug)]
struct Frame {
    bindings: RefCell<Vec<Binding>>,
    parent: RefCell<Option<Environment>>,
}

/// A reference-counted handle to a single environment frame. Cloning an
/// `Environment` shares the same frame (and therefore its bindings); it does
/// not copy them.
#[derive(Debug, Clone)]
pub struct Environment(Rc<Frame>);

impl Environment {
    pub fn new_root() -> Self {
        Environment(Rc::new(Frame {
            bindings: RefCell::new(Vec::new()),
            parent: RefCell::new(None),
        }))
    }

    pub fn new_child(parent: &Environment) -> Self {
        Environment(Rc::new(Frame {
            bindings: RefCell::new(Vec::new()),
            parent: RefCell::new(Some(parent.clone())),
        }))
    }

    /// Identity comparison, used by the collector to recognise a frame it
    /// has already visited and by tests; not Lisp `equal?`.
    pub fn same_frame(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// A stable per-frame identity, used by the collector to avoid
    /// re-marking a frame shared by multiple closures.
    pub fn identity_key(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn parent(&self) -> Option<Environment> {
        self.0.parent.borrow().clone()
    }

    /// Transiently retargets this frame's parent (§4.3, §4.5). Used only
    /// when invoking a lambda/macro context.
    pub fn set_parent(&self, parent: Environment) {
        *self.0.parent.borrow_mut() = Some(parent);
    }

    /// `env_bind`: overwrite an existing binding in this frame unless it is
    /// `CONST`, otherwise append. Returns `false` iff blocked by `CONST`.
    pub fn bind(&self, name: &str, value: CellRef, flags: Flags) -> bool {
        let mut bindings = self.0.bindings.borrow_mut();
        for binding in bindings.iter_mut() {
            if binding.name == name {
                if binding.flags.is_const {
                    return false;
                }
                binding.value = value;
                binding.flags = flags;
                return true;
            }
        }
        bindings.push(Binding { name: name.to_string(), value, flags });
        true
    }

    /// `env_bind_global`: walk to the root frame and bind there.
    pub fn bind_global(&self, name: &str, value: CellRef, flags: Flags) -> bool {
        self.root().bind(name, value, flags)
    }

    fn root(&self) -> Environment {
        let mut cur = self.clone();
        loop {
            let next = cur.parent();
            match next {
                Some(p) => cur = p,
                None => return cur,
            }
        }
    }

    /// `env_get`: scan this frame, then recurse into the parent.
    pub fn get(&self, name: &str) -> Option<CellRef> {
        if let Some(b) = self.0.bindings.borrow().iter().find(|b| b.name == name) {
            return Some(b.value);
        }
        match self.parent() {
            Some(p) => p.get(name),
            None => None,
        }
    }

    /// `env_get_flags`: as `get`, but returns the binding's flags; empty on
    /// miss.
    pub fn get_flags(&self, name: &str) -> Flags {
        if let Some(b) = self.0.bindings.borrow().iter().find(|b| b.name == name) {
            return b.flags;
        }
        match self.parent() {
            Some(p) => p.get_flags(name),
            None => Flags::NONE,
        }
    }

    /// Iterates every value cell bound directly in this frame (not
    /// ancestors). Used only by the collector's mark phase.
    pub fn own_bindings(&self) -> Vec<CellRef> {
        self.0.bindings.borrow().iter().map(|b| b.value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{CellRef, Pool};

    fn fake_ref(pool: &mut Pool, n: i64) -> CellRef {
        pool.alloc(crate::value::Value::Integer(n)).unwrap()
    }

    #[test]
    fn bind_and_get() {
        let mut pool = Pool::new(4);
        let env = Environment::new_root();
        let v = fake_ref(&mut pool, 42);
        assert!(env.bind("x", v, Flags::NONE));
        assert_eq!(env.get("x"), Some(v));
    }

    #[test]
    fn lookup_falls_through_to_parent() {
        let mut pool = Pool::new(4);
        let parent = Environment::new_root();
        let v = fake_ref(&mut pool, 1);
        parent.bind("x", v, Flags::NONE);

        let child = Environment::new_child(&parent);
        assert_eq!(child.get("x"), Some(v));
        assert_eq!(child.get("missing"), None);
    }

    #[test]
    fn shadowing_does_not_mutate_parent() {
        let mut pool = Pool::new(4);
        let parent = Environment::new_root();
        let a = fake_ref(&mut pool, 1);
        let b = fake_ref(&mut pool, 2);
        parent.bind("x", a, Flags::NONE);

        let child = Environment::new_child(&parent);
        child.bind("x", b, Flags::NONE);

        assert_eq!(child.get("x"), Some(b));
        assert_eq!(parent.get("x"), Some(a));
    }

    #[test]
    fn const_binding_rejects_overwrite() {
        let mut pool = Pool::new(4);
        let env = Environment::new_root();
        let a = fake_ref(&mut pool, 1);
        let b = fake_ref(&mut pool, 2);
        assert!(env.bind("x", a, Flags::CONST));
        assert!(!env.bind("x", b, Flags::NONE));
        assert_eq!(env.get("x"), Some(a));
    }

    #[test]
    fn bind_global_walks_to_root() {
        let mut pool = Pool::new(4);
        let root = Environment::new_root();
        let child = Environment::new_child(&root);
        let grandchild = Environment::new_child(&child);
        let v = fake_ref(&mut pool, 7);

        grandchild.bind_global("g", v, Flags::NONE);
        assert_eq!(root.get("g"), Some(v));
        assert_eq!(child.get("g"), Some(v));
    }

    #[test]
    fn set_parent_retargets_lookup() {
        let mut pool = Pool::new(4);
        let closure_frame = Environment::new_root();
        let caller_frame = Environment::new_root();
        let v = fake_ref(&mut pool, 9);
        caller_frame.bind("dyn", v, Flags::NONE);

        assert_eq!(closure_frame.get("dyn"), None);
        closure_frame.set_parent(caller_frame.clone());
        assert_eq!(closure_frame.get("dyn"), Some(v));
    }
}
