//! `system load` — shelling out and loading a source file's top-level forms
//! into the global environment. No sandboxing layer sits in front of
//! `std::fs`/`std::process`: these run directly against the real
//! filesystem and shell.

use std::fs;
use std::process::Command;

use crate::error::LispError;
use crate::value::{Atom, Interp};

fn as_str(interp: &Interp, function: &str, atom: Atom) -> Result<String, LispError> {
    match atom {
        Atom::Str(id) => Ok(String::from_utf8_lossy(&interp.heap.string(id).bytes).into_owned()),
        other => Err(LispError::wrong_type(function, "string", other.type_name())),
    }
}

/// `(system cmd)` — run `cmd` through the platform shell, returning its
/// exit code as a number.
pub fn system(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("system", "1", args.len()))?;
    let cmd = as_str(interp, "system", a)?;
    let status = Command::new("sh")
        .arg("-c")
        .arg(&cmd)
        .status()
        .map_err(|e| LispError::System(e.to_string()))?;
    Ok(Atom::Num(status.code().unwrap_or(-1) as f64))
}

/// Read an entire file's contents as a string.
pub fn slurp(path: &str) -> Result<String, LispError> {
    fs::read_to_string(path).map_err(|e| LispError::File(format!("{path}: {e}")))
}

/// Load every top-level form in `path` into `interp.global_env`, evaluating
/// each in turn: read one form, macex it, eval it, repeat until the source
/// is exhausted.
pub fn load_file(interp: &mut Interp, path: &str) -> Result<(), LispError> {
    let source = slurp(path)?;
    let forms = crate::reader::read_all(interp, &source)?;
    let env = interp.global_env;
    for form in forms {
        let expanded = crate::macros::macex(interp, form)?;
        crate::eval::eval_expr(interp, expanded, env)?;
    }
    Ok(())
}

/// `(load path)` builtin wrapper around [`load_file`].
pub fn load(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("load", "1", args.len()))?;
    let path = as_str(interp, "load", a)?;
    load_file(interp, &path)?;
    Ok(Atom::Nil)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_interp() -> Interp {
        Interp::new()
    }

    #[test]
    fn system_runs_a_shell_command_and_returns_exit_code() {
        let mut interp = test_interp();
        let cmd = interp.heap.make_string(b"exit 0".to_vec());
        assert_eq!(system(&mut interp, &[cmd]).unwrap(), Atom::Num(0.0));
    }

    #[test]
    fn load_evaluates_every_top_level_form_in_a_file() {
        let mut interp = test_interp();
        let plus = interp.heap.intern("+");
        crate::env::env_assign(&mut interp.heap, interp.global_env, plus, Atom::Builtin(crate::builtins::arithmetic::add));
        let dir = std::env::temp_dir();
        let path = dir.join(format!("arc-lisp-test-{}.arc", std::process::id()));
        std::fs::write(&path, "(assign x (+ 1 2))").unwrap();
        load_file(&mut interp, path.to_str().unwrap()).unwrap();
        let _ = std::fs::remove_file(&path);
        let x = interp.heap.intern("x");
        assert_eq!(crate::env::env_get(&interp.heap, interp.global_env, x, "x").unwrap(), Atom::Num(3.0));
    }
}
