//! Version/welcome constants and the handful of numeric knobs the interpreter
//! exposes, kept here instead of scattered as magic numbers. This interpreter
//! has no sandboxing config: `system`/`load` run against the real filesystem
//! and shell directly.

pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "arc-lisp";
pub const WELCOME_SUBTITLE: &str = "a small Arc-family Lisp interpreter";

/// Name of the prelude source file looked up next to the executable (and,
/// failing that, in its parent directory) at startup.
pub const PRELUDE_FILENAME: &str = "library.arc";

/// History file used by the REPL's line editor.
pub const HISTORY_FILENAME: &str = ".arc_history";
