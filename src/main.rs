mod ast;
mod config;
mod env;
mod error;
mod eval;
mod gc;
mod parser;
mod pool;
mod primitives;
mod trace;
mod value;

use clap::Parser;
use env::Environment;
use eval::Interpreter;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::PathBuf;

/// Evaluation core of a small, homoiconic Lisp-family interpreter.
#[derive(Parser, Debug)]
#[command(name = "sl-rs")]
#[command(version = config::VERSION)]
#[command(about = "A pool-allocated, mark-and-sweep Lisp interpreter")]
struct CliArgs {
    /// Script file to execute (optional — if not given, starts the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Initial pool size, in cells
    #[arg(long = "pool-size", value_name = "CELLS", default_value_t = config::DEFAULT_POOL_SIZE)]
    pool_size: usize,

    /// Override the standard library path (silently skipped if absent)
    #[arg(long = "stdlib", value_name = "PATH")]
    stdlib: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let mut interp = Interpreter::new(args.pool_size);
    let env = interp.globals.clone();

    load_stdlib(&mut interp, &env, &args.stdlib);

    if let Some(script_path) = args.script {
        run_file(&mut interp, &env, &script_path)?;
        return Ok(());
    }

    run_repl(&mut interp, &env)
}

/// Preloaded before the main loop and silent unless it errors — mirrors
/// `main.c`'s non-fatal `load_stdlib` call, which only reports a failure
/// on stderr and otherwise proceeds without comment.
fn load_stdlib(interp: &mut Interpreter, env: &Environment, override_path: &Option<PathBuf>) {
    let path = override_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_STDLIB_PATH));

    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return,
    };

    let forms = match parser::read_all(&contents) {
        Ok(forms) => forms,
        Err(e) => {
            eprintln!("Warning: failed to parse stdlib {}: {e}", path.display());
            return;
        }
    };

    for sexpr in forms {
        let cell = interp.intern(&sexpr);
        let result = interp.eval(env, cell);
        if let value::Value::Error(msg) = interp.pool.get(result) {
            eprintln!("Warning: error while loading stdlib: {msg}");
        }
        interp.collect_garbage();
    }
}

/// Runs every top-level form in `path`, printing each result (or error, to
/// stderr) in turn and collecting garbage after each one — grounded on
/// `repl_until_eof`'s file-input branch in `main.c`, which prints results
/// for batch/script input exactly as it does for the interactive REPL.
fn run_file(
    interp: &mut Interpreter,
    env: &Environment,
    path: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read script file {}: {e}", path.display()))?;

    let forms = parser::read_all(&contents).map_err(|e| format!("parse error: {e}"))?;

    for sexpr in forms {
        let cell = interp.intern(&sexpr);
        let result = interp.eval(env, cell);
        print_evaluated(interp, result);
        interp.collect_garbage();
    }
    Ok(())
}

fn print_evaluated(interp: &Interpreter, result: pool::CellRef) {
    if let value::Value::Error(msg) = interp.pool.get(result) {
        eprintln!("Error: {msg}");
    } else {
        println!("{}", interp.print_form(result));
    }
}

fn run_repl(interp: &mut Interpreter, env: &Environment) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_SUBTITLE);

    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl = DefaultEditor::with_config(rl_config)?;

    let history_file = ".sl_history";
    let _ = rl.load_history(history_file);

    let mut pending = String::new();
    loop {
        let prompt = if pending.is_empty() { "sl> " } else { "..> " };
        match rl.readline(prompt) {
            Ok(line) => {
                if pending.is_empty() {
                    match line.trim() {
                        "(quit)" | "(exit)" => {
                            println!("Goodbye!");
                            break;
                        }
                        "" => continue,
                        _ => {}
                    }
                }
                pending.push_str(&line);
                pending.push('\n');

                if !is_balanced(&pending) {
                    continue;
                }

                match parser::read_all(&pending) {
                    Ok(forms) => {
                        for sexpr in forms {
                            let cell = interp.intern(&sexpr);
                            let result = interp.eval(env, cell);
                            print_evaluated(interp, result);
                            interp.collect_garbage();
                        }
                    }
                    Err(e) => eprintln!("Parse error: {e}"),
                }
                pending.clear();
            }
            Err(ReadlineError::Interrupted) => {
                pending.clear();
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
    Ok(())
}

/// True once every opened paren in `input` (outside of a string or a `;`
/// comment) has a matching close — the signal that the REPL has a complete
/// form to read rather than needing another line of input.
fn is_balanced(input: &str) -> bool {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            ';' => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0 && !in_string
}
