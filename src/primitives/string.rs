//! String operations: `write-to-str`, `format`, `substring`,
//! `re-match-groups` (§6.2).
//!
//! Grounded on `original_source/src/prim_string.c`. `format` supports the
//! `%s %d %u %x %f %%` specifiers, type-checking each consumed argument;
//! `substring` clamps `end` to `[0, len]` *before* clamping `start` to
//! `[0, end]` — the order matters for indices past the end of the string.
//! Indexing is by `char`, not byte, to keep the port panic-free on
//! multi-byte UTF-8 content (a deliberate deviation from the original's
//! byte-oriented `strlen`/pointer arithmetic, recorded in DESIGN.md).

use crate::env::Environment;
use crate::error::EvalError;
use crate::eval::{EvalResult, Interpreter};
use crate::pool::CellRef;
use crate::value::Value;

pub fn install(interp: &mut Interpreter) {
    interp.bind_primitive("write-to-str", prim_write_to_str);
    interp.bind_primitive("format", prim_format);
    interp.bind_primitive("substring", prim_substring);
    interp.bind_primitive("re-match-groups", prim_re_match_groups);
}

pub fn prim_write_to_str(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() != 1 {
        let err = EvalError::arity("write-to-str", "1", items.len());
        return Err(interp.raise(err));
    }
    let s = interp.write_form(items[0]);
    Ok(interp.alloc(Value::Str(s)))
}

fn string_of(interp: &mut Interpreter, who: &str, cell: CellRef) -> Result<String, CellRef> {
    match interp.pool.get(cell) {
        Value::Str(s) => Ok(s.clone()),
        other => {
            let err = EvalError::type_mismatch(who, "string", other.type_name());
            Err(interp.raise(err))
        }
    }
}

/// `%s %d %u %x %f %%`, each consuming one argument in order (`%%` aside).
/// Running out of arguments or holding an extra one is not itself an
/// error here; only a type mismatch at a consumed specifier is.
pub fn prim_format(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.is_empty() {
        let err = EvalError::arity("format", "at least 1", 0);
        return Err(interp.raise(err));
    }
    let template = string_of(interp, "format", items[0])?;
    let mut rest = items[1..].iter();
    let mut out = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('s') => {
                let cell = next_arg(interp, &mut rest)?;
                out.push_str(&string_of(interp, "format", cell)?);
            }
            Some('d') => {
                let cell = next_arg(interp, &mut rest)?;
                match interp.pool.get(cell) {
                    Value::Integer(n) => out.push_str(&n.to_string()),
                    other => {
                        let err = EvalError::type_mismatch("format", "int", other.type_name());
                        return Err(interp.raise(err));
                    }
                }
            }
            Some('u') => {
                let cell = next_arg(interp, &mut rest)?;
                match interp.pool.get(cell) {
                    Value::Integer(n) => out.push_str(&(*n as u64).to_string()),
                    other => {
                        let err = EvalError::type_mismatch("format", "int", other.type_name());
                        return Err(interp.raise(err));
                    }
                }
            }
            Some('x') => {
                let cell = next_arg(interp, &mut rest)?;
                match interp.pool.get(cell) {
                    Value::Integer(n) => out.push_str(&format!("0x{:x}", *n as u64)),
                    other => {
                        let err = EvalError::type_mismatch("format", "int", other.type_name());
                        return Err(interp.raise(err));
                    }
                }
            }
            Some('f') => {
                let cell = next_arg(interp, &mut rest)?;
                match interp.pool.get(cell) {
                    Value::Float(f) => out.push_str(&format!("{f:.6}")),
                    other => {
                        let err = EvalError::type_mismatch("format", "flt", other.type_name());
                        return Err(interp.raise(err));
                    }
                }
            }
            Some(other) => {
                let err = EvalError::Custom(format!("format: unknown specifier %{other}"));
                return Err(interp.raise(err));
            }
            None => {
                let err = EvalError::Custom("format: dangling % at end of template".to_string());
                return Err(interp.raise(err));
            }
        }
    }
    Ok(interp.alloc(Value::Str(out)))
}

fn next_arg(
    interp: &mut Interpreter,
    rest: &mut std::slice::Iter<'_, CellRef>,
) -> Result<CellRef, CellRef> {
    rest.next().copied().ok_or_else(|| {
        let err = EvalError::Custom("format: not enough arguments for template".to_string());
        interp.raise(err)
    })
}

/// `(substring s &optional start end)`: negative `start`/`end` count from
/// the end of the string (`-1` is the last character) before clamping —
/// `end` clamps to `[0, len]` first, then `start` clamps to `[0, end]`,
/// preserving the original's order so both indices running past the
/// string still clamp to an empty slice rather than swapping.
pub fn prim_substring(interp: &mut Interpreter, _env: &Environment, args: CellRef) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.is_empty() || items.len() > 3 {
        let err = EvalError::arity("substring", "1 to 3", items.len());
        return Err(interp.raise(err));
    }
    let s = string_of(interp, "substring", items[0])?;
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;

    let mut start = match items.get(1) {
        Some(&c) if !interp.is_nil(c) => int_of(interp, "substring", c)?,
        _ => 0,
    };
    let mut end = match items.get(2) {
        Some(&c) if !interp.is_nil(c) => int_of(interp, "substring", c)?,
        _ => len,
    };
    if start < 0 {
        start += len;
    }
    if end < 0 {
        end += len;
    }

    let end = end.clamp(0, len);
    let start = start.clamp(0, end);

    let slice: String = chars[start as usize..end as usize].iter().collect();
    Ok(interp.alloc(Value::Str(slice)))
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

/// `(regexp string &optional ignore-case)`: POSIX-ERE-equivalent matching
/// via the `regex` crate. Each capture group (group 0 first) becomes a
/// `(start . end)` dotted pair of char offsets; a missing optional group
/// breaks the scan short, matching the original's `regmatch_t` loop.
pub fn prim_re_match_groups(
    interp: &mut Interpreter,
    _env: &Environment,
    args: CellRef,
) -> EvalResult {
    let items = interp.list_to_vec(args)?;
    if items.len() < 2 || items.len() > 3 {
        let err = EvalError::arity("re-match-groups", "2 or 3", items.len());
        return Err(interp.raise(err));
    }
    let pattern = string_of(interp, "re-match-groups", items[0])?;
    let subject = string_of(interp, "re-match-groups", items[1])?;
    let ignore_case = items.get(2).is_some_and(|&c| !interp.is_nil(c));

    let re = regex::RegexBuilder::new(&pattern)
        .case_insensitive(ignore_case)
        .build()
        .map_err(|e| interp.raise(EvalError::Custom(format!("re-match-groups: {e}"))))?;

    let caps = match re.captures(&subject) {
        Some(c) => c,
        None => return Ok(interp.nil),
    };

    let mut pairs = Vec::new();
    for group in caps.iter() {
        let m = match group {
            Some(m) => m,
            None => break,
        };
        let start = interp.alloc(Value::Integer(m.start() as i64));
        let end = interp.alloc(Value::Integer(m.end() as i64));
        pairs.push(interp.cons(start, end));
    }
    Ok(interp.vec_to_list(&pairs))
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
    fn format_substitutes_each_specifier() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(format \"%s=%d (%f%%)\" \"n\" 3 1.5)");
        match interp.pool.get(r) {
            Value::Str(s) => assert_eq!(s, "n=3 (1.500000%)"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn format_hex_is_zero_x_prefixed() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(format \"%x\" 255)");
        match interp.pool.get(r) {
            Value::Str(s) => assert_eq!(s, "0xff"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn substring_clamps_end_before_start() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(substring \"hello\" 100 100)");
        match interp.pool.get(r) {
            Value::Str(s) => assert_eq!(s, ""),
            other => panic!("expected string, got {other:?}"),
        }
        let r = eval_str(&mut interp, "(substring \"hello\" 1 3)");
        match interp.pool.get(r) {
            Value::Str(s) => assert_eq!(s, "el"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn substring_negative_indices_count_from_the_end() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(substring \"hello\" -3 -1)");
        match interp.pool.get(r) {
            Value::Str(s) => assert_eq!(s, "ll"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn substring_defaults_to_the_whole_string() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(substring \"hello\")");
        match interp.pool.get(r) {
            Value::Str(s) => assert_eq!(s, "hello"),
            other => panic!("expected string, got {other:?}"),
        }
        let r = eval_str(&mut interp, "(substring \"hello\" 2)");
        match interp.pool.get(r) {
            Value::Str(s) => assert_eq!(s, "llo"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn re_match_groups_ignore_case_flag() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(re-match-groups \"ABC\" \"abc\")");
        assert_eq!(r, interp.nil);
        let r = eval_str(&mut interp, "(re-match-groups \"ABC\" \"abc\" tru)");
        assert!(!interp.is_nil(r));
    }

    #[test]
    fn re_match_groups_returns_dotted_offset_pairs() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(re-match-groups \"a(b)c\" \"abc\")");
        let items = interp.list_to_vec(r).unwrap();
        assert_eq!(items.len(), 2);
        match interp.pool.get(items[0]) {
            Value::Pair(start, end) => {
                assert!(matches!(interp.pool.get(*start), Value::Integer(0)));
                assert!(matches!(interp.pool.get(*end), Value::Integer(3)));
            }
            other => panic!("expected pair, got {other:?}"),
        }
    }

    #[test]
    fn write_to_str_renders_readable_form() {
        let mut interp = Interpreter::new(64);
        let r = eval_str(&mut interp, "(write-to-str (quote (1 2)))");
        match interp.pool.get(r) {
            Value::Str(s) => assert_eq!(s, "(1 2)"),
            other => panic!("expected string, got {other:?}"),
        }
    }
}
