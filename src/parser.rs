//! The reader: a `nom` combinator parser producing `ast::Sexpr` trees (§6.1).
//!
//! Structurally grounded on the teacher's `src/parser.rs` (comment skipping,
//! quote/quasiquote/unquote reader macros, alternation over list/number/
//! string/symbol), generalised to distinguish `Integer` from `Float` at the
//! lexical level (grounded on `original_source/src/lexer.c`'s `parse_number`:
//! a bare run of digits with no `.` is an Integer) instead of the teacher's
//! single `f64`-only number.

use crate::ast::Sexpr;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1},
    combinator::{opt, recognize},
    multi::many0,
    IResult, Parser,
};

fn line_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

fn ws(input: &str) -> IResult<&str, ()> {
    many0(alt((nom::combinator::value((), multispace1), line_comment)))
        .map(|_| ())
        .parse(input)
}

fn parse_number(input: &str) -> IResult<&str, Sexpr> {
    let (rest, text) = recognize((opt(char('-')), digit1, opt((char('.'), digit1)))).parse(input)?;

    if text.contains('.') {
        let f: f64 = text.parse().expect("validated by the digit1/char('.') grammar");
        Ok((rest, Sexpr::Float(f)))
    } else {
        let n: i64 = text.parse().expect("validated by the digit1 grammar");
        Ok((rest, Sexpr::Integer(n)))
    }
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !"()'`,\";".contains(c)
}

fn parse_symbol(input: &str) -> IResult<&str, Sexpr> {
    let (rest, text) = take_while1(is_symbol_char)(input)?;
    Ok((rest, Sexpr::Symbol(text.to_string())))
}

/// Translates the escape sequences named in §6.1: `\a \b \e \f \n \r \t \v
/// \\ \"`. Any other escaped character stands for itself.
fn translate_escape(c: char) -> char {
    match c {
        'a' => '\u{07}',
        'b' => '\u{08}',
        'e' => '\u{1B}',
        'f' => '\u{0C}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{0B}',
        other => other,
    }
}

fn parse_string(input: &str) -> IResult<&str, Sexpr> {
    let (input, _) = char('"')(input)?;
    let mut rest = input;
    let mut out = String::new();
    loop {
        match rest.chars().next() {
            None => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    rest,
                    nom::error::ErrorKind::Eof,
                )))
            }
            Some('"') => {
                rest = &rest[1..];
                break;
            }
            Some('\\') => {
                let after_backslash = &rest[1..];
                let mut chars = after_backslash.chars();
                match chars.next() {
                    Some(escaped) => {
                        out.push(translate_escape(escaped));
                        rest = chars.as_str();
                    }
                    None => {
                        return Err(nom::Err::Error(nom::error::Error::new(
                            rest,
                            nom::error::ErrorKind::Eof,
                        )))
                    }
                }
            }
            Some(c) => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    Ok((rest, Sexpr::Str(out)))
}

fn parse_list(input: &str) -> IResult<&str, Sexpr> {
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;
    let mut items = Vec::new();
    let mut rest = input;
    loop {
        if let Ok((after, _)) = char::<_, nom::error::Error<&str>>(')')(rest) {
            return Ok((after, Sexpr::List(items)));
        }
        let (after_expr, expr) = parse_expr(rest)?;
        items.push(expr);
        let (after_ws, _) = ws(after_expr)?;
        rest = after_ws;
    }
}

fn reader_macro<'a>(
    prefix: &'static str,
    head: &'static str,
) -> impl Fn(&'a str) -> IResult<&'a str, Sexpr> {
    move |input: &'a str| {
        let (input, _) = tag(prefix)(input)?;
        let (input, inner) = parse_expr(input)?;
        Ok((input, Sexpr::List(vec![Sexpr::Symbol(head.to_string()), inner])))
    }
}

fn parse_quote(input: &str) -> IResult<&str, Sexpr> {
    reader_macro("'", "quote")(input)
}

fn parse_backquote(input: &str) -> IResult<&str, Sexpr> {
    reader_macro("`", "backquote")(input)
}

fn parse_splice(input: &str) -> IResult<&str, Sexpr> {
    reader_macro(",@", "splice")(input)
}

fn parse_unquote(input: &str) -> IResult<&str, Sexpr> {
    reader_macro(",", "unquote")(input)
}

fn parse_expr(input: &str) -> IResult<&str, Sexpr> {
    let (input, _) = ws(input)?;
    alt((
        parse_quote,
        parse_backquote,
        parse_splice,
        parse_unquote,
        parse_list,
        parse_string,
        parse_number,
        parse_symbol,
    ))
    .parse(input)
}

/// Parses a single top-level form, returning the remainder of the input so
/// callers (the REPL, script runner, stdlib preloader) can feed forms one at
/// a time.
pub fn read_one(input: &str) -> Result<Option<(Sexpr, &str)>, String> {
    let (rest, _) = ws(input).map_err(|e| format!("{e:?}"))?;
    if rest.is_empty() {
        return Ok(None);
    }
    let (rest, expr) = parse_expr(rest).map_err(|e| format!("{e:?}"))?;
    Ok(Some((expr, rest)))
}

/// Parses every top-level form in `input`.
pub fn read_all(input: &str) -> Result<Vec<Sexpr>, String> {
    let mut forms = Vec::new();
    let mut rest = input;
    while let Some((expr, remainder)) = read_one(rest)? {
        forms.push(expr);
        rest = remainder;
    }
    Ok(forms)
}

/// Parses exactly one top-level form, failing if the input is empty or if
/// anything but whitespace/comments remains afterward.
pub fn parse_single(input: &str) -> Result<Sexpr, String> {
    match read_one(input)? {
        None => Err("empty input".to_string()),
        Some((expr, rest)) => {
            let (rest, _) = ws(rest).map_err(|e| format!("{e:?}"))?;
            if !rest.is_empty() {
                return Err(format!("unexpected trailing input: {rest:?}"));
            }
            Ok(expr)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_and_floats_are_distinguished() {
        assert_eq!(parse_single("42").unwrap(), Sexpr::Integer(42));
        assert_eq!(parse_single("-7").unwrap(), Sexpr::Integer(-7));
        assert_eq!(parse_single("3.5").unwrap(), Sexpr::Float(3.5));
        assert_eq!(parse_single("-0.5").unwrap(), Sexpr::Float(-0.5));
    }

    #[test]
    fn symbols_and_operators() {
        assert_eq!(parse_single("foo-bar?").unwrap(), Sexpr::Symbol("foo-bar?".into()));
        assert_eq!(parse_single("+").unwrap(), Sexpr::Symbol("+".into()));
        assert_eq!(parse_single("nil").unwrap(), Sexpr::Symbol("nil".into()));
    }

    #[test]
    fn strings_with_escapes() {
        assert_eq!(parse_single(r#""hi\nthere""#).unwrap(), Sexpr::Str("hi\nthere".into()));
        assert_eq!(parse_single(r#""a\"b""#).unwrap(), Sexpr::Str("a\"b".into()));
    }

    #[test]
    fn empty_list_parses_to_empty_list_sexpr() {
        assert_eq!(parse_single("()").unwrap(), Sexpr::List(vec![]));
    }

    #[test]
    fn nested_lists() {
        let parsed = parse_single("(1 (2 3) 4)").unwrap();
        assert_eq!(
            parsed,
            Sexpr::List(vec![
                Sexpr::Integer(1),
                Sexpr::List(vec![Sexpr::Integer(2), Sexpr::Integer(3)]),
                Sexpr::Integer(4),
            ])
        );
    }

    #[test]
    fn reader_macros_expand_to_canonical_forms() {
        assert_eq!(
            parse_single("'x").unwrap(),
            Sexpr::List(vec![Sexpr::Symbol("quote".into()), Sexpr::Symbol("x".into())])
        );
        assert_eq!(
            parse_single("`x").unwrap(),
            Sexpr::List(vec![Sexpr::Symbol("backquote".into()), Sexpr::Symbol("x".into())])
        );
        assert_eq!(
            parse_single(",x").unwrap(),
            Sexpr::List(vec![Sexpr::Symbol("unquote".into()), Sexpr::Symbol("x".into())])
        );
        assert_eq!(
            parse_single(",@x").unwrap(),
            Sexpr::List(vec![Sexpr::Symbol("splice".into()), Sexpr::Symbol("x".into())])
        );
    }

    #[test]
    fn quasiquote_with_unquote_and_splice() {
        let parsed = parse_single("`(a ,(+ 1 2) ,@(list 4 5) b)").unwrap();
        match parsed {
            Sexpr::List(items) => {
                assert_eq!(items[0], Sexpr::Symbol("backquote".into()));
                match &items[1] {
                    Sexpr::List(inner) => assert_eq!(inner.len(), 4),
                    _ => panic!("expected inner list"),
                }
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(parse_single("; hello\n42").unwrap(), Sexpr::Integer(42));
        let parsed = parse_single("(1 2 ; trailing\n 3)").unwrap();
        assert_eq!(
            parsed,
            Sexpr::List(vec![Sexpr::Integer(1), Sexpr::Integer(2), Sexpr::Integer(3)])
        );
    }

    #[test]
    fn read_all_reads_multiple_top_level_forms() {
        let forms = read_all("1 2 (+ 1 2)").unwrap();
        assert_eq!(forms.len(), 3);
    }

    #[test]
    fn unclosed_list_is_an_error() {
        assert!(parse_single("(1 2").is_err());
    }
}
