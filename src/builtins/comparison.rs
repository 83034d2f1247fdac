//! `< is` — numeric ordering and value equality.

use crate::error::LispError;
use crate::value::{Atom, Interp};

/// `(< a b c ...)` — true iff the arguments are strictly increasing.
/// Numbers compare by value, strings compare lexicographically by byte.
pub fn lt(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    for pair in args.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let ordered = match (a, b) {
            (Atom::Num(x), Atom::Num(y)) => x < y,
            (Atom::Str(x), Atom::Str(y)) => {
                interp.heap.string(x).bytes < interp.heap.string(y).bytes
            }
            _ => {
                return Err(LispError::wrong_type("<", "number or string", a.type_name()))
            }
        };
        if !ordered {
            return Ok(Atom::Nil);
        }
    }
    Ok(Atom::Sym(interp.special.t))
}

/// `(is a b ...)` — true iff all arguments are the same atom. Numbers
/// compare by value; symbols, builtins and nil compare by identity (which
/// for interned symbols and `nil` coincides with value equality); cons,
/// closures and macros compare by arena slot identity.
pub fn is(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    if args.is_empty() {
        return Ok(Atom::Sym(interp.special.t));
    }
    let first = args[0];
    for other in &args[1..] {
        let eq = match (first, *other) {
            (Atom::Nil, Atom::Nil) => true,
            (Atom::Num(a), Atom::Num(b)) => a == b,
            (Atom::Sym(a), Atom::Sym(b)) => a == b,
            (Atom::Cons(a), Atom::Cons(b)) => a == b,
            (Atom::Closure(a), Atom::Closure(b)) => a == b,
            (Atom::Macro(a), Atom::Macro(b)) => a == b,
            (Atom::Str(a), Atom::Str(b)) => {
                a == b || interp.heap.string(a).bytes == interp.heap.string(b).bytes
            }
            _ => false,
        };
        if !eq {
            return Ok(Atom::Nil);
        }
    }
    Ok(Atom::Sym(interp.special.t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_interp() -> Interp {
        Interp::new()
    }

    #[test]
    fn lt_detects_increasing_sequence() {
        let mut interp = test_interp();
        assert_eq!(lt(&mut interp, &[Atom::Num(1.0), Atom::Num(2.0), Atom::Num(3.0)]).unwrap().is_truthy(), true);
        assert_eq!(lt(&mut interp, &[Atom::Num(3.0), Atom::Num(2.0)]).unwrap().is_truthy(), false);
    }

    #[test]
    fn is_compares_numbers_by_value() {
        let mut interp = test_interp();
        assert!(is(&mut interp, &[Atom::Num(1.0), Atom::Num(1.0)]).unwrap().is_truthy());
        assert!(!is(&mut interp, &[Atom::Num(1.0), Atom::Num(2.0)]).unwrap().is_truthy());
    }
}
