//! `car cdr cons apply scar scdr` — list construction, access, and the
//! in-place mutators `scar`/`scdr` ("set-car"/"set-cdr").

use crate::error::LispError;
use crate::value::{Atom, Interp};

fn pair_id(function: &str, atom: Atom) -> Result<crate::value::PairId, LispError> {
    match atom {
        Atom::Cons(id) | Atom::Closure(id) | Atom::Macro(id) => Ok(id),
        other => Err(LispError::wrong_type(function, "cons", other.type_name())),
    }
}

pub fn car(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("car", "1", args.len()))?;
    if a.is_nil() {
        return Ok(Atom::Nil);
    }
    pair_id("car", a)?;
    Ok(interp.heap.car(a))
}

pub fn cdr(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("cdr", "1", args.len()))?;
    if a.is_nil() {
        return Ok(Atom::Nil);
    }
    pair_id("cdr", a)?;
    Ok(interp.heap.cdr(a))
}

pub fn cons(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    if args.len() != 2 {
        return Err(LispError::arity("cons", "2", args.len()));
    }
    Ok(interp.heap.cons(args[0], args[1]))
}

/// `(apply f args)` — call `f` with the elements of list `args` as its
/// argument list.
pub fn apply_builtin(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    if args.len() != 2 {
        return Err(LispError::arity("apply", "2", args.len()));
    }
    let arg_list = crate::eval::list_to_vec(&interp.heap, args[1])?;
    crate::eval::apply(interp, args[0], &arg_list)
}

/// `(scar pair val)` — mutate `pair`'s car in place, returns `val`.
pub fn scar(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    if args.len() != 2 {
        return Err(LispError::arity("scar", "2", args.len()));
    }
    let id = pair_id("scar", args[0])?;
    interp.heap.pair_mut(id).car = args[1];
    Ok(args[1])
}

/// `(scdr pair val)` — mutate `pair`'s cdr in place, returns `val`.
pub fn scdr(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    if args.len() != 2 {
        return Err(LispError::arity("scdr", "2", args.len()));
    }
    let id = pair_id("scdr", args[0])?;
    interp.heap.pair_mut(id).cdr = args[1];
    Ok(args[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_interp() -> Interp {
        Interp::new()
    }

    #[test]
    fn cons_car_cdr_roundtrip() {
        let mut interp = test_interp();
        let pair = cons(&mut interp, &[Atom::Num(1.0), Atom::Num(2.0)]).unwrap();
        assert_eq!(car(&mut interp, &[pair]).unwrap(), Atom::Num(1.0));
        assert_eq!(cdr(&mut interp, &[pair]).unwrap(), Atom::Num(2.0));
    }

    #[test]
    fn car_and_cdr_of_nil_is_nil() {
        let mut interp = test_interp();
        assert_eq!(car(&mut interp, &[Atom::Nil]).unwrap(), Atom::Nil);
        assert_eq!(cdr(&mut interp, &[Atom::Nil]).unwrap(), Atom::Nil);
    }

    #[test]
    fn scar_mutates_in_place() {
        let mut interp = test_interp();
        let pair = cons(&mut interp, &[Atom::Num(1.0), Atom::Num(2.0)]).unwrap();
        scar(&mut interp, &[pair, Atom::Num(99.0)]).unwrap();
        assert_eq!(car(&mut interp, &[pair]).unwrap(), Atom::Num(99.0));
    }
}
