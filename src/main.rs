//! CLI entry point: REPL or batch file execution over the `arc-lisp` core,
//! built on `clap` for argument parsing and `rustyline` for line editing.

use std::env;
use std::path::{Path, PathBuf};

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use arc_lisp::builtins::system::load_file;
use arc_lisp::config::{self, HISTORY_FILENAME, PRELUDE_FILENAME, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use arc_lisp::reader::lex;
use arc_lisp::{Atom, Interp, LispError};

#[derive(Parser, Debug)]
#[command(name = "arc-lisp")]
#[command(version = config::VERSION)]
#[command(about = "A small Arc-family Lisp interpreter")]
struct CliArgs {
    /// Script to run instead of starting the REPL.
    file: Option<PathBuf>,
}

fn main() {
    let args = CliArgs::parse();
    let mut interp = Interp::new();
    load_prelude(&mut interp);

    match args.file {
        Some(path) => run_script(&mut interp, &path),
        None => run_repl(&mut interp),
    }
}

/// Looks for `library.arc` next to the running executable, then in its
/// parent directory. Either miss is non-fatal: the prelude's content is
/// out of this crate's scope.
fn load_prelude(interp: &mut Interp) {
    let exe_dir = match env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        Some(dir) => dir,
        None => return,
    };
    let candidates = [exe_dir.join(PRELUDE_FILENAME), exe_dir.join("..").join(PRELUDE_FILENAME)];
    for candidate in candidates {
        if candidate.is_file() {
            if let Err(e) = load_file(interp, candidate.to_string_lossy().as_ref()) {
                eprintln!("warning: failed to load {}: {e}", candidate.display());
            }
            return;
        }
    }
}

/// Batch mode: load and evaluate every top-level form in `path` in order,
/// printing nothing per-form. An evaluation error is reported to stderr for
/// that form, and evaluation continues with the next one.
fn run_script(interp: &mut Interp, path: &Path) {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: couldn't read {}: {e}", path.display());
            std::process::exit(1);
        }
    };
    let forms = match arc_lisp::reader::read_all(interp, &source) {
        Ok(forms) => forms,
        Err(e) => {
            eprintln!("syntax error: {e}");
            std::process::exit(1);
        }
    };
    let env = interp.global_env;
    for form in forms {
        let result = arc_lisp::macros::macex(interp, form)
            .and_then(|expanded| arc_lisp::eval::eval_expr(interp, expanded, env));
        if let Err(e) = result {
            eprintln!("error: {e}");
        }
    }
}

fn run_repl(interp: &mut Interp) {
    println!("{WELCOME_MESSAGE} — {WELCOME_SUBTITLE}");
    let mut editor = match DefaultEditor::new() {
        Ok(ed) => ed,
        Err(e) => {
            eprintln!("error: couldn't start line editor: {e}");
            return;
        }
    };
    let _ = editor.load_history(HISTORY_FILENAME);

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { "arc> " } else { "...> " };
        match editor.readline(prompt) {
            Ok(line) => {
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);
                let _ = editor.add_history_entry(line.as_str());

                match lex(&buffer) {
                    Ok(_) => {
                        // A complete lex means every string/token is well
                        // formed; whether it's a *complete* expression is
                        // decided by whether reading it leaves no dangling
                        // open parens, which read_all would otherwise
                        // report as UnexpectedEof.
                        match arc_lisp::reader::read_all(interp, &buffer) {
                            Ok(forms) => {
                                evaluate_and_print(interp, forms);
                                buffer.clear();
                            }
                            Err(LispError::UnexpectedEof) => {
                                // Incomplete form: keep accumulating lines.
                            }
                            Err(e) => {
                                eprintln!("syntax error: {e}");
                                buffer.clear();
                            }
                        }
                    }
                    Err(LispError::UnterminatedString) => {
                        // Keep accumulating: an unterminated string might
                        // be completed on the next line.
                    }
                    Err(e) => {
                        eprintln!("syntax error: {e}");
                        buffer.clear();
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("error: {e}");
                break;
            }
        }
    }
    let _ = editor.save_history(HISTORY_FILENAME);
}

fn evaluate_and_print(interp: &mut Interp, forms: Vec<Atom>) {
    let env = interp.global_env;
    for form in forms {
        match arc_lisp::macros::macex(interp, form)
            .and_then(|expanded| arc_lisp::eval::eval_expr(interp, expanded, env))
        {
            Ok(value) => println!("{}", arc_lisp::printer::print_expr(&interp.heap, value)),
            Err(e) => eprintln!("error: {e}"),
        }
    }
}
