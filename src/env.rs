//! Lexically-scoped environments. Per spec, an environment is nothing more
//! than a heap cons pair `(parent . bindings)`, where `bindings` is an alist
//! of `(symbol . value)` pairs — there is no distinct Rust environment type,
//! only ordinary heap structure the evaluator knows how to walk.

use crate::error::LispError;
use crate::heap::Heap;
use crate::value::{Atom, SymbolId};

/// Allocate a new environment frame with the given parent (`Atom::Nil` for
/// the global environment) and no bindings yet.
pub fn env_create(heap: &mut Heap, parent: Atom) -> Atom {
    heap.cons(parent, Atom::Nil)
}

fn bindings_of(heap: &Heap, env: Atom) -> Atom {
    heap.cdr(env)
}

fn parent_of(heap: &Heap, env: Atom) -> Atom {
    heap.car(env)
}

/// Find the `(symbol . value)` binding pair for `sym` in `env` or any of its
/// ancestors. Returns `Atom::Nil` if unbound anywhere in the chain.
fn lookup_binding(heap: &Heap, env: Atom, sym: SymbolId) -> Atom {
    let mut frame = env;
    loop {
        if frame.is_nil() {
            return Atom::Nil;
        }
        let mut alist = bindings_of(heap, frame);
        while !alist.is_nil() {
            let pair = heap.car(alist);
            if let Atom::Sym(bound) = heap.car(pair) {
                if bound == sym {
                    return pair;
                }
            }
            alist = heap.cdr(alist);
        }
        frame = parent_of(heap, frame);
    }
}

/// Look up `sym`'s value, walking from `env` up through parents to the
/// global environment.
pub fn env_get(heap: &Heap, env: Atom, sym: SymbolId, name: &str) -> Result<Atom, LispError> {
    let binding = lookup_binding(heap, env, sym);
    if binding.is_nil() {
        Err(LispError::Unbound(name.to_string()))
    } else {
        Ok(heap.cdr(binding))
    }
}

/// Bind `sym` to `value` in `env` directly — creating a new binding if one
/// doesn't already exist in this exact frame, or overwriting the existing
/// one if it does. Never looks at parent frames.
pub fn env_assign(heap: &mut Heap, env: Atom, sym: SymbolId, value: Atom) {
    let mut alist = bindings_of(heap, env);
    while !alist.is_nil() {
        let pair = heap.car(alist);
        if let Atom::Sym(bound) = heap.car(pair) {
            if bound == sym {
                if let Atom::Cons(id) = pair {
                    heap.pair_mut(id).cdr = value;
                }
                return;
            }
        }
        alist = heap.cdr(alist);
    }
    let new_pair = heap.cons(Atom::Sym(sym), value);
    let old_bindings = bindings_of(heap, env);
    let new_bindings = heap.cons(new_pair, old_bindings);
    if let Atom::Cons(id) = env {
        heap.pair_mut(id).cdr = new_bindings;
    }
}

/// `set`/mutate-if-bound-anywhere semantics: walk up the environment chain
/// looking for an existing binding and mutate it in place if found. If no
/// frame up the chain already binds `sym`, falls back to creating the
/// binding in `origin` — the frame the caller started the search from, not
/// the global environment.
pub fn env_assign_eq(heap: &mut Heap, env: Atom, origin: Atom, sym: SymbolId, value: Atom) {
    let mut frame = env;
    while !frame.is_nil() {
        let mut alist = bindings_of(heap, frame);
        while !alist.is_nil() {
            let pair = heap.car(alist);
            if let Atom::Sym(bound) = heap.car(pair) {
                if bound == sym {
                    if let Atom::Cons(id) = pair {
                        heap.pair_mut(id).cdr = value;
                    }
                    return;
                }
            }
            alist = heap.cdr(alist);
        }
        frame = parent_of(heap, frame);
    }
    env_assign(heap, origin, sym, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(heap: &mut Heap, name: &str) -> SymbolId {
        heap.intern(name)
    }

    #[test]
    fn define_and_get_in_same_frame() {
        let mut heap = Heap::new();
        let env = env_create(&mut heap, Atom::Nil);
        let x = sym(&mut heap, "x");
        env_assign(&mut heap, env, x, Atom::Num(10.0));
        assert_eq!(env_get(&heap, env, x, "x").unwrap(), Atom::Num(10.0));
    }

    #[test]
    fn get_unbound_is_error() {
        let mut heap = Heap::new();
        let env = env_create(&mut heap, Atom::Nil);
        let x = sym(&mut heap, "x");
        let err = env_get(&heap, env, x, "x").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Unbound);
    }

    #[test]
    fn child_frame_sees_parent_binding() {
        let mut heap = Heap::new();
        let global = env_create(&mut heap, Atom::Nil);
        let x = sym(&mut heap, "x");
        env_assign(&mut heap, global, x, Atom::Num(1.0));
        let child = env_create(&mut heap, global);
        assert_eq!(env_get(&heap, child, x, "x").unwrap(), Atom::Num(1.0));
    }

    #[test]
    fn child_binding_shadows_parent() {
        let mut heap = Heap::new();
        let global = env_create(&mut heap, Atom::Nil);
        let x = sym(&mut heap, "x");
        env_assign(&mut heap, global, x, Atom::Num(1.0));
        let child = env_create(&mut heap, global);
        env_assign(&mut heap, child, x, Atom::Num(2.0));
        assert_eq!(env_get(&heap, child, x, "x").unwrap(), Atom::Num(2.0));
        assert_eq!(env_get(&heap, global, x, "x").unwrap(), Atom::Num(1.0));
    }

    #[test]
    fn assign_eq_mutates_parent_binding_in_place() {
        let mut heap = Heap::new();
        let global = env_create(&mut heap, Atom::Nil);
        let x = sym(&mut heap, "x");
        env_assign(&mut heap, global, x, Atom::Num(1.0));
        let child = env_create(&mut heap, global);
        env_assign_eq(&mut heap, child, child, x, Atom::Num(99.0));
        assert_eq!(env_get(&heap, global, x, "x").unwrap(), Atom::Num(99.0));
        assert_eq!(env_get(&heap, child, x, "x").unwrap(), Atom::Num(99.0));
    }

    #[test]
    fn assign_eq_falls_back_to_origin_frame_on_miss() {
        let mut heap = Heap::new();
        let global = env_create(&mut heap, Atom::Nil);
        let child = env_create(&mut heap, global);
        let y = sym(&mut heap, "y");
        env_assign_eq(&mut heap, child, child, y, Atom::Num(5.0));
        // bound in child (the origin), not global
        assert_eq!(env_get(&heap, child, y, "y").unwrap(), Atom::Num(5.0));
        assert_eq!(env_get(&heap, global, y, "y").unwrap_err().kind(), crate::error::ErrorKind::Unbound);
    }
}
