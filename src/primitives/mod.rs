//! Primitive catalogue (§6.2): every name bound at startup in the root
//! frame besides the special forms of `special.rs`.
//!
//! Each sub-module groups one family from the distilled spec's table and is
//! grounded on the matching `original_source/src/prim_*.c` file, named in
//! each submodule's header comment. `install` wires every primitive and
//! special form into a fresh [`crate::eval::Interpreter`]'s global frame.

pub mod arith;
pub mod bitwise;
pub mod general;
pub mod io;
pub mod list;
pub mod logic;
pub mod special;
pub mod string;
pub mod type_ops;

use crate::eval::Interpreter;

pub fn install(interp: &mut Interpreter) {
    interp.bind_special("quote", special::prim_quote);
    interp.bind_special("backquote", special::prim_backquote);
    interp.bind_special("`", special::prim_backquote);
    interp.bind_special("unquote", special::prim_unquote);
    interp.bind_special(",", special::prim_unquote);
    interp.bind_special("splice", special::prim_splice);
    interp.bind_special(",@", special::prim_splice);
    interp.bind_special("define", special::prim_define);
    interp.bind_special("define-global", special::prim_define_global);
    interp.bind_special("lambda", special::prim_lambda);
    interp.bind_special("macro", special::prim_macro);
    interp.bind_special("begin", special::prim_begin);
    interp.bind_special("if", special::prim_if);
    interp.bind_special("or", special::prim_or);
    interp.bind_special("and", special::prim_and);

    general::install(interp);
    logic::install(interp);
    type_ops::install(interp);
    list::install(interp);
    string::install(interp);
    arith::install(interp);
    bitwise::install(interp);
    io::install(interp);
}
