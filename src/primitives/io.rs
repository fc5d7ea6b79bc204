//! I/O primitives: `read`, `write`, `scan-str`, `print-str`, `error`
//! (§6.2).
//!
//! Grounded on `original_source/src/prim_io.c`. The original's `error`
//! prints a diagnostic and returns a null sentinel to abort the current
//! top-level form; this port raises a first-class `Value::Error` instead,
//! since `eval_result`'s `Result<CellRef, CellRef>` already models that
//! without a sentinel.

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{EvalResult, Interpreter};
use crate::pool::CellRef;
use crate::value::Value;
use std::io::{self, Read as _, Write as _};

pub fn install(interp: &mut Interpreter) {
    interp.bind_primitive("read", prim_read);
    interp.bind_primitive("write", prim_write);
    interp.bind_primitive("scan-str", prim_scan_str);
    interp.bind_primitive("print-str", prim_print_str);
    interp.bind_primitive("error", prim_error);
}

pub fn prim_read(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if !items.is_empty() {
        let err = EvalError::arity("read", "0", items.len());
        return Err(interp.raise(err));
    }
    let mut input = String::new();
    if io::stdin().read_to_string(&mut input).is_err() {
        return Ok(interp.nil);
    }
    match crate::parser::read_one(&input) {
        Ok(Some((sexpr, _rest))) => Ok(interp.intern(&sexpr)),
        Ok(None) => Ok(interp.nil),
        Err(msg) => Err(interp.raise(EvalError::Custom(msg))),
    }
}

pub fn prim_write(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("write", "1", items.len());
        return Err(interp.raise(err));
    }
    let text = interp.write_form(items[0]);
    print!("{text}");
    let _ = io::stdout().flush();
    Ok(interp.tru)
}

/// Reads from stdin up to (not including) the first occurrence of the
/// delimiter string, defaulting to `"\n"`, or up to EOF.
pub fn prim_scan_str(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() > 1 {
        let err = EvalError::arity("scan-str", "0 or 1", items.len());
        return Err(interp.raise(err));
    }
    let delim = if items.is_empty() {
        "\n".to_string()
    } else {
        match interp.pool.get(items[0]) {
            Value::Str(s) => s.clone(),
            other => {
                let err = EvalError::type_mismatch("scan-str", "string", other.type_name());
                return Err(interp.raise(err));
            }
        }
    };

    let mut out = String::new();
    let stdin = io::stdin();
    let mut byte = [0u8; 1];
    loop {
        match stdin.lock().read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                out.push(byte[0] as char);
                if !delim.is_empty() && out.ends_with(delim.as_str()) {
                    out.truncate(out.len() - delim.len());
                    break;
                }
            }
            Err(_) => break,
        }
    }
    Ok(interp.alloc(Value::Str(out)))
}

pub fn prim_print_str(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("print-str", "1", items.len());
        return Err(interp.raise(err));
    }
    match interp.pool.get(items[0]) {
        Value::Str(s) => {
            print!("{s}");
            let _ = io::stdout().flush();
            Ok(items[0])
        }
        other => {
            let err = EvalError::type_mismatch("print-str", "string", other.type_name());
            Err(interp.raise(err))
        }
    }
}

pub fn prim_error(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("error", "1", items.len());
        return Err(interp.raise(err));
    }
    match interp.pool.get(items[0]) {
        Value::Str(s) => {
            let message = s.clone();
            Err(interp.raise(EvalError::Custom(message)))
        }
        other => {
            let err = EvalError::type_mismatch("error", "string", other.type_name());
            Err(interp.raise(err))
        }
    }
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
    fn error_raises_a_first_class_error_value() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(error \"boom\")");
        assert!(matches!(interp.pool.get(r), Value::Error(msg) if msg.contains("boom")));
    }

    #[test]
    fn error_requires_a_string_argument() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(error 1)");
        assert!(matches!(interp.pool.get(r), Value::Error(_)));
    }

    #[test]
    fn print_str_returns_its_argument() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(print-str \"\")");
        assert!(matches!(interp.pool.get(r), Value::Str(s) if s.is_empty()));
    }
}
