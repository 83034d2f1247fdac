//! Core library for the `arc-lisp` interpreter: value representation and
//! heap, environment, reader, printer, macro expander, and evaluator. The
//! CLI/REPL in `main.rs` is a thin driver over this crate.

pub mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod heap;
pub mod macros;
pub mod printer;
pub mod reader;
pub mod value;

pub use error::{ErrorKind, LispError};
pub use value::{Atom, Interp, PairId, StringId, SymbolId};
