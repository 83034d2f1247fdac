//! The mark-and-sweep heap: two arenas (cons pairs, string buffers) with
//! free lists, the symbol table, and the guard stack the evaluator pushes
//! onto to root every allocation it is still holding a reference to.

use std::collections::HashMap;

use crate::value::{Atom, PairId, StringId, SymbolId};

/// A cons cell. Shared storage for `Atom::Cons`, `Atom::Closure` and
/// `Atom::Macro` — only the tag on the `Atom` that points at a given slot
/// says which of the three it is.
#[derive(Debug, Clone, Copy)]
pub struct Pair {
    pub car: Atom,
    pub cdr: Atom,
    marked: bool,
}

/// A managed, mutable string buffer (backs `string-sref`'s in-place byte
/// mutation).
#[derive(Debug, Clone)]
pub struct StrCell {
    pub bytes: Vec<u8>,
    marked: bool,
}

/// Slot in an arena: either a live value or a link in the free list.
enum Slot<T> {
    Live(T),
    Free(Option<u32>),
}

struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
}

impl<T> Arena<T> {
    fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free_head: None,
        }
    }

    fn alloc(&mut self, value: T) -> u32 {
        if let Some(idx) = self.free_head {
            let next = match &self.slots[idx as usize] {
                Slot::Free(next) => *next,
                Slot::Live(_) => unreachable!("free list pointed at a live slot"),
            };
            self.free_head = next;
            self.slots[idx as usize] = Slot::Live(value);
            idx
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot::Live(value));
            idx
        }
    }

    fn get(&self, idx: u32) -> &T {
        match &self.slots[idx as usize] {
            Slot::Live(v) => v,
            Slot::Free(_) => panic!("use of a freed arena slot {idx}"),
        }
    }

    fn get_mut(&mut self, idx: u32) -> &mut T {
        match &mut self.slots[idx as usize] {
            Slot::Live(v) => v,
            Slot::Free(_) => panic!("use of a freed arena slot {idx}"),
        }
    }

    fn free(&mut self, idx: u32) {
        self.slots[idx as usize] = Slot::Free(self.free_head);
        self.free_head = Some(idx);
    }

    fn len(&self) -> usize {
        self.slots.len()
    }
}

/// Interned symbol names, owned outside the mark-and-sweep arenas — a
/// symbol's name buffer is never a GC candidate, so the symbol table does
/// not need to be a root.
#[derive(Default)]
pub struct SymbolTable {
    names: Vec<Box<str>>,
    ids: HashMap<Box<str>, SymbolId>,
}

impl SymbolTable {
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = SymbolId(self.names.len() as u32);
        let boxed: Box<str> = name.into();
        self.names.push(boxed.clone());
        self.ids.insert(boxed, id);
        id
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.names[id.0 as usize]
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }
}

/// Starting allocation threshold; doubles after every collection so
/// long-running programs don't pay for a full mark-sweep on every
/// single cons.
const GC_INITIAL_THRESHOLD: usize = 10_000;

pub struct Heap {
    pairs: Arena<Pair>,
    strings: Arena<StrCell>,
    pub symbols: SymbolTable,
    /// Every atom the evaluator is still holding a live reference to while
    /// it may allocate again (and so might trigger a sweep) gets pushed
    /// here. Popped back off once the evaluator no longer needs to keep it
    /// rooted.
    guard_stack: Vec<Atom>,
    /// Root for "the expression currently being evaluated". Not otherwise
    /// assigned by the core evaluator, but kept as a GC root and extension
    /// point for a debugger or tracer to set.
    pub code_expr: Atom,
    alloc_count: usize,
    gc_threshold: usize,
}

impl Heap {
    pub fn new() -> Self {
        Heap {
            pairs: Arena::new(),
            strings: Arena::new(),
            symbols: SymbolTable::default(),
            guard_stack: Vec::new(),
            code_expr: Atom::Nil,
            alloc_count: 0,
            gc_threshold: GC_INITIAL_THRESHOLD,
        }
    }

    pub fn intern(&mut self, name: &str) -> SymbolId {
        self.symbols.intern(name)
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.symbols.name(id)
    }

    /// Push a guard root. Call this for every freshly allocated atom the
    /// caller needs to keep alive across a later allocation.
    pub fn guard(&mut self, atom: Atom) {
        self.guard_stack.push(atom);
    }

    /// Pop `n` guard roots back off. Callers restore the guard stack to its
    /// depth from before a sub-evaluation once they no longer need those
    /// roots.
    pub fn unguard(&mut self, n: usize) {
        let new_len = self.guard_stack.len().saturating_sub(n);
        self.guard_stack.truncate(new_len);
    }

    pub fn guard_depth(&self) -> usize {
        self.guard_stack.len()
    }

    pub fn cons(&mut self, car: Atom, cdr: Atom) -> Atom {
        self.consider_gc();
        let idx = self.pairs.alloc(Pair {
            car,
            cdr,
            marked: false,
        });
        self.alloc_count += 1;
        let atom = Atom::Cons(PairId(idx));
        self.guard(atom);
        atom
    }

    /// Allocate a pair tagged as a closure rather than a plain cons —
    /// same arena, different `Atom` tag.
    pub fn cons_closure(&mut self, car: Atom, cdr: Atom) -> Atom {
        match self.cons(car, cdr) {
            Atom::Cons(id) => {
                self.guard_stack.pop();
                let atom = Atom::Closure(id);
                self.guard(atom);
                atom
            }
            _ => unreachable!(),
        }
    }

    pub fn cons_macro(&mut self, car: Atom, cdr: Atom) -> Atom {
        match self.cons(car, cdr) {
            Atom::Cons(id) => {
                self.guard_stack.pop();
                let atom = Atom::Macro(id);
                self.guard(atom);
                atom
            }
            _ => unreachable!(),
        }
    }

    pub fn make_string(&mut self, bytes: Vec<u8>) -> Atom {
        self.consider_gc();
        let idx = self.strings.alloc(StrCell {
            bytes,
            marked: false,
        });
        self.alloc_count += 1;
        let atom = Atom::Str(StringId(idx));
        self.guard(atom);
        atom
    }

    pub fn pair(&self, id: PairId) -> &Pair {
        self.pairs.get(id.0)
    }

    pub fn pair_mut(&mut self, id: PairId) -> &mut Pair {
        self.pairs.get_mut(id.0)
    }

    pub fn string(&self, id: StringId) -> &StrCell {
        self.strings.get(id.0)
    }

    pub fn string_mut(&mut self, id: StringId) -> &mut StrCell {
        self.strings.get_mut(id.0)
    }

    pub fn car(&self, atom: Atom) -> Atom {
        match atom {
            Atom::Cons(id) | Atom::Closure(id) | Atom::Macro(id) => self.pair(id).car,
            Atom::Nil => Atom::Nil,
            _ => Atom::Nil,
        }
    }

    pub fn cdr(&self, atom: Atom) -> Atom {
        match atom {
            Atom::Cons(id) | Atom::Closure(id) | Atom::Macro(id) => self.pair(id).cdr,
            Atom::Nil => Atom::Nil,
            _ => Atom::Nil,
        }
    }

    fn consider_gc(&mut self) {
        if self.alloc_count >= self.gc_threshold {
            self.gc();
            // Grow the threshold so steady-state allocation doesn't pay for
            // a full sweep on every single cons once the live set is large.
            self.gc_threshold = (self.pairs.len() + self.strings.len()).max(self.gc_threshold) * 2;
        }
    }

    /// Mark-and-sweep collection. Roots: `code_expr`, and every entry of the
    /// guard stack. The global environment stays alive transitively: it's
    /// guarded at `Interp::new()` time and every live binding in it is
    /// reachable from that one guard-stack entry.
    pub fn gc(&mut self) {
        let code_expr = self.code_expr;
        self.mark(code_expr);
        for i in 0..self.guard_stack.len() {
            let atom = self.guard_stack[i];
            self.mark(atom);
        }
        self.sweep();
        self.alloc_count = 0;
    }

    fn mark(&mut self, atom: Atom) {
        match atom {
            Atom::Cons(id) | Atom::Closure(id) | Atom::Macro(id) => {
                let idx = id.0;
                if self.pairs.get(idx).marked {
                    return;
                }
                self.pairs.get_mut(idx).marked = true;
                let car = self.pairs.get(idx).car;
                let cdr = self.pairs.get(idx).cdr;
                self.mark(car);
                self.mark(cdr);
            }
            Atom::Str(id) => {
                self.strings.get_mut(id.0).marked = true;
            }
            _ => {}
        }
    }

    fn sweep(&mut self) {
        for idx in 0..self.pairs.len() as u32 {
            let live = matches!(self.pairs.slots[idx as usize], Slot::Live(_));
            if !live {
                continue;
            }
            if self.pairs.get(idx).marked {
                self.pairs.get_mut(idx).marked = false;
            } else {
                self.pairs.free(idx);
            }
        }
        for idx in 0..self.strings.len() as u32 {
            let live = matches!(self.strings.slots[idx as usize], Slot::Live(_));
            if !live {
                continue;
            }
            if self.strings.get(idx).marked {
                self.strings.get_mut(idx).marked = false;
            } else {
                self.strings.free(idx);
            }
        }
    }

    /// Count of live (non-freed) pair slots, for tests asserting that GC
    /// actually reclaims unreachable structure.
    #[cfg(test)]
    pub fn live_pair_count(&self) -> usize {
        self.pairs
            .slots
            .iter()
            .filter(|s| matches!(s, Slot::Live(_)))
            .count()
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
