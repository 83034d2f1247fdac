//! `type` — runtime type tag introspection.

use crate::error::LispError;
use crate::value::{Atom, Interp};

/// `(type x)` returns a symbol naming `x`'s tag: `sym`, `cons`, `string`,
/// `num`, `fn`, or `mac`. Closures report as `fn` rather than the internal
/// `closure` tag name — there's no separate closure/cons distinction
/// visible to user code beyond `fn`.
pub fn type_of(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("type", "1", args.len()))?;
    let name = match a {
        Atom::Nil | Atom::Sym(_) => "sym",
        Atom::Num(_) => "num",
        Atom::Str(_) => "string",
        Atom::Cons(_) => "cons",
        Atom::Closure(_) | Atom::Builtin(_) => "fn",
        Atom::Macro(_) => "mac",
    };
    let id = interp.heap.intern(name);
    Ok(Atom::Sym(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_interp() -> Interp {
        Interp::new()
    }

    #[test]
    fn type_of_number_is_num() {
        let mut interp = test_interp();
        let result = type_of(&mut interp, &[Atom::Num(1.0)]).unwrap();
        if let Atom::Sym(id) = result {
            assert_eq!(interp.heap.symbol_name(id), "num");
        } else {
            panic!("expected a symbol");
        }
    }
}
