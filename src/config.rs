// ABOUTME: Configuration and constants for the Lisp interpreter
// This module contains version info, welcome messages, and default pool/stdlib settings

pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "sl-rs v1.0";
pub const WELCOME_SUBTITLE: &str = "a small homoiconic Lisp with a mark-and-sweep collector";

/// Initial pool size (in cells) a fresh `Interpreter` is built with,
/// absent a `--pool-size` override. Matches `POOL_BASE_SIZE` in pool.rs.
pub const DEFAULT_POOL_SIZE: usize = crate::pool::POOL_BASE_SIZE;

/// Preloaded silently at startup if present; absence is not an error.
/// Mirrors the original's `STDLIB_PATH` in `main.c`.
pub const DEFAULT_STDLIB_PATH: &str = "/usr/local/lib/sl/stdlib.lisp";
