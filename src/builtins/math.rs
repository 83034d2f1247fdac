//! `mod expt log sqrt int trunc sin cos tan rand` — arithmetic builtins
//! beyond the four basic operators.

use crate::error::LispError;
use crate::value::{Atom, Interp};

fn num(function: &str, atom: Atom) -> Result<f64, LispError> {
    match atom {
        Atom::Num(n) => Ok(n),
        other => Err(LispError::wrong_type(function, "number", other.type_name())),
    }
}

/// Floored modulus (sign of the divisor), not Rust's truncated `%`
/// (sign of the dividend): `(mod -7 3)` is `2`, not `-1`.
pub fn modulo(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    if args.len() != 2 {
        return Err(LispError::arity("mod", "2", args.len()));
    }
    let a = num("mod", args[0])?;
    let b = num("mod", args[1])?;
    if b == 0.0 {
        return Err(LispError::DivisionByZero);
    }
    let mut r = a % b;
    if r != 0.0 && (a < 0.0) != (b < 0.0) {
        r += b;
    }
    Ok(Atom::Num(r))
}

pub fn expt(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    if args.len() != 2 {
        return Err(LispError::arity("expt", "2", args.len()));
    }
    Ok(Atom::Num(num("expt", args[0])?.powf(num("expt", args[1])?)))
}

pub fn log(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("log", "1", args.len()))?;
    Ok(Atom::Num(num("log", a)?.ln()))
}

pub fn sqrt(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("sqrt", "1", args.len()))?;
    Ok(Atom::Num(num("sqrt", a)?.sqrt()))
}

/// `(int x)` — coerce a number, string, or symbol to an integral number by
/// parsing/truncating.
pub fn int(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("int", "1", args.len()))?;
    let n = match a {
        Atom::Num(n) => n,
        Atom::Str(id) => String::from_utf8_lossy(&interp.heap.string(id).bytes)
            .parse::<f64>()
            .unwrap_or(0.0),
        Atom::Sym(id) => interp.heap.symbol_name(id).parse::<f64>().unwrap_or(0.0),
        other => return Err(LispError::wrong_type("int", "number, string or symbol", other.type_name())),
    };
    Ok(Atom::Num(n.round()))
}

pub fn trunc(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("trunc", "1", args.len()))?;
    Ok(Atom::Num(num("trunc", a)?.trunc()))
}

pub fn sin(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("sin", "1", args.len()))?;
    Ok(Atom::Num(num("sin", a)?.sin()))
}

pub fn cos(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("cos", "1", args.len()))?;
    Ok(Atom::Num(num("cos", a)?.cos()))
}

pub fn tan(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let a = args.first().copied().ok_or_else(|| LispError::arity("tan", "1", args.len()))?;
    Ok(Atom::Num(num("tan", a)?.tan()))
}

/// Small xorshift-style PRNG seeded from interpreter state, avoiding a
/// `rand`-crate dependency for a concern this small. `(rand)` returns a
/// value in `[0, 1)`; `(rand n)` returns `floor(random() * n)`.
fn next_random(interp: &mut Interp) -> f64 {
    // `Heap::alloc_count`-free, self-contained counter threaded through the
    // symbol table's name count as a cheap source of changing state; real
    // entropy is not a goal for an embedded scripting language's `rand`.
    let seed = interp.heap.symbols.name_count() as u64;
    let mut x = seed.wrapping_mul(2_685_821_657_736_338_717).wrapping_add(1);
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    (x as f64 / u64::MAX as f64).fract().abs()
}

pub fn rand(interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let r = next_random(interp);
    match args.first() {
        None => Ok(Atom::Num(r)),
        Some(Atom::Num(n)) => Ok(Atom::Num((r * n).floor())),
        Some(other) => Err(LispError::wrong_type("rand", "number", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_interp() -> Interp {
        Interp::new()
    }

    #[test]
    fn mod_computes_remainder() {
        let mut interp = test_interp();
        assert_eq!(modulo(&mut interp, &[Atom::Num(7.0), Atom::Num(3.0)]).unwrap(), Atom::Num(1.0));
    }

    #[test]
    fn mod_is_floored_not_truncated() {
        let mut interp = test_interp();
        assert_eq!(modulo(&mut interp, &[Atom::Num(-7.0), Atom::Num(3.0)]).unwrap(), Atom::Num(2.0));
    }

    #[test]
    fn int_coerces_strings() {
        let mut interp = test_interp();
        let s = interp.heap.make_string(b"42".to_vec());
        assert_eq!(int(&mut interp, &[s]).unwrap(), Atom::Num(42.0));
    }

    #[test]
    fn rand_with_bound_stays_below_it() {
        let mut interp = test_interp();
        let r = rand(&mut interp, &[Atom::Num(10.0)]).unwrap();
        if let Atom::Num(n) = r {
            assert!(n < 10.0 && n >= 0.0);
        } else {
            panic!("expected a number");
        }
    }
}
