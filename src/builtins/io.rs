//! `pr writeb readline read macex eval quit` — the builtins that cross the
//! boundary into stdin/stdout or recurse back into the reader/expander/
//! evaluator.

use std::io::{self, BufRead, Write};

use crate::error::LispError;
use crate::value::{Atom, Interp};

/// `(pr a b ...)` — print each argument's human-readable form to stdout
/// with no separators, then return the last argument (or `nil` with no
/// arguments).
pub fn pr(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let mut out = io::stdout();
    let mut last = Atom::Nil;
    for a in args {
        let text = crate::printer::pr(&interp.heap, *a);
        let _ = out.write_all(text.as_bytes());
        last = *a;
    }
    let _ = out.flush();
    Ok(last)
}

/// `(writeb byte)` — write a single raw byte to stdout.
pub fn writeb(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("writeb", "1", args.len()))?;
    let byte = match a {
        Atom::Num(n) => n as u8,
        other => return Err(LispError::wrong_type("writeb", "number", other.type_name())),
    };
    let _ = io::stdout().write_all(&[byte]);
    let _ = io::stdout().flush();
    Ok(a)
}

/// `(readline)` — read one line from stdin, without the trailing newline.
/// Returns `nil` at end of input.
pub fn readline(interp: &mut Interp, _args: &[Atom]) -> Result<Atom, LispError> {
    let mut line = String::new();
    let n = io::stdin().lock().read_line(&mut line).map_err(|e| LispError::File(e.to_string()))?;
    if n == 0 {
        return Ok(Atom::Nil);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(interp.heap.make_string(line.into_bytes()))
}

/// `(read)` — read one complete expression from stdin. Each call reads a
/// fresh line and parses exactly one expression from it; no partial-token
/// state is carried between calls. Returns `nil` at end of input.
pub fn read(interp: &mut Interp, _args: &[Atom]) -> Result<Atom, LispError> {
    let mut line = String::new();
    let n = io::stdin().lock().read_line(&mut line).map_err(|e| LispError::File(e.to_string()))?;
    if n == 0 {
        return Ok(Atom::Nil);
    }
    match crate::reader::read_one(interp, &line)? {
        Some(atom) => Ok(atom),
        None => Ok(Atom::Nil),
    }
}

/// `(macex expr)` — one-step-to-fixpoint macro expansion of `expr`, exposed
/// as a builtin for introspection.
pub fn macex(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("macex", "1", args.len()))?;
    crate::macros::macex(interp, a)
}

/// `(eval expr)` — evaluate `expr` (already a value, e.g. quoted data) in
/// the global environment.
pub fn eval(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("eval", "1", args.len()))?;
    let expanded = crate::macros::macex(interp, a)?;
    crate::eval::eval_expr(interp, expanded, interp.global_env)
}

/// `(quit)` — terminate the process immediately via `exit(0)`, rather than
/// unwinding through an error value.
pub fn quit(_interp: &mut Interp, _args: &[Atom]) -> Result<Atom, LispError> {
    std::process::exit(0);
}
