//! The tagged value representation and the interpreter context that owns
//! every heap arena, the symbol table, and the global environment.

use std::fmt;

use crate::error::LispError;
use crate::heap::Heap;

/// Index of an interned symbol name in the interpreter's `SymbolTable`.
///
/// Two `SymbolId`s compare equal iff `intern` returned the same id for the
/// same name, which realizes pointer-identity comparison for symbols without
/// any raw pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// Index of a cons cell in `Heap::pairs`. Shared by `Atom::Cons`,
/// `Atom::Closure` and `Atom::Macro` — the arena slot layout is identical,
/// only the tag differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairId(pub u32);

/// Index of a managed string buffer in `Heap::strings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringId(pub u32);

/// A built-in function pointer. Takes the interpreter context (since
/// several builtins, like `eval` and `apply`, recurse back into the
/// evaluator) and the already-evaluated argument list.
pub type Builtin = fn(&mut Interp, &[Atom]) -> Result<Atom, LispError>;

/// A tagged atom. `Copy` throughout: every variant is either unit or a small
/// arena index, so values move around the evaluator as cheaply as a raw
/// pointer would, without unsafe code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Atom {
    Nil,
    Num(f64),
    Sym(SymbolId),
    Str(StringId),
    Cons(PairId),
    Closure(PairId),
    Macro(PairId),
    Builtin(Builtin),
}

impl Atom {
    pub fn is_nil(&self) -> bool {
        matches!(self, Atom::Nil)
    }

    /// Arc truthiness: everything but `nil` is true.
    pub fn is_truthy(&self) -> bool {
        !self.is_nil()
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Atom::Nil => "symbol",
            Atom::Num(_) => "number",
            Atom::Sym(_) => "symbol",
            Atom::Str(_) => "string",
            Atom::Cons(_) => "cons",
            Atom::Closure(_) => "closure",
            Atom::Macro(_) => "macro",
            Atom::Builtin(_) => "builtin",
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Real printing needs heap access for Sym/Str/Cons and lives in
        // printer.rs; this impl only covers the atoms that carry their own
        // data, for use in error messages and debug contexts.
        match self {
            Atom::Nil => write!(f, "nil"),
            Atom::Num(n) => write!(f, "{}", crate::printer::format_number(*n)),
            Atom::Builtin(_) => write!(f, "#<builtin>"),
            Atom::Closure(_) => write!(f, "#<closure>"),
            Atom::Macro(_) => write!(f, "#<macro>"),
            Atom::Sym(_) | Atom::Str(_) | Atom::Cons(_) => write!(f, "#<atom>"),
        }
    }
}

/// Cached ids for the symbols the evaluator dispatches on by identity,
/// resolved once at startup instead of string-compared on every eval.
#[derive(Debug, Clone, Copy)]
pub struct SpecialForms {
    pub quote: SymbolId,
    pub quasiquote: SymbolId,
    pub unquote: SymbolId,
    pub unquote_splicing: SymbolId,
    pub assign: SymbolId,
    pub fn_: SymbolId,
    pub if_: SymbolId,
    pub mac: SymbolId,
    pub while_: SymbolId,
    pub t: SymbolId,
    pub o: SymbolId,
}

/// The single context value threaded through every operation that can
/// allocate: heap arenas, symbol table (owned by `Heap`), the global
/// environment, and the cached special-form ids.
pub struct Interp {
    pub heap: Heap,
    pub global_env: Atom,
    pub special: SpecialForms,
}

impl Interp {
    /// Build a fresh interpreter: empty heap, a global environment, the
    /// special-form symbols interned and cached, and every builtin bound.
    pub fn new() -> Self {
        let mut heap = Heap::new();
        let global_env = crate::env::env_create(&mut heap, Atom::Nil);
        let special = SpecialForms {
            quote: heap.intern("quote"),
            quasiquote: heap.intern("quasiquote"),
            unquote: heap.intern("unquote"),
            unquote_splicing: heap.intern("unquote-splicing"),
            assign: heap.intern("assign"),
            fn_: heap.intern("fn"),
            if_: heap.intern("if"),
            mac: heap.intern("mac"),
            while_: heap.intern("while"),
            t: heap.intern("t"),
            o: heap.intern("o"),
        };
        let mut interp = Interp {
            heap,
            global_env,
            special,
        };
        crate::builtins::register_all(&mut interp);
        interp
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}
