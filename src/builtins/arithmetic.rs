//! `+ - * /` — variadic numeric arithmetic.

use crate::error::LispError;
use crate::value::{Atom, Interp};

fn as_num(function: &str, atom: Atom) -> Result<f64, LispError> {
    match atom {
        Atom::Num(n) => Ok(n),
        other => Err(LispError::wrong_type(function, "number", other.type_name())),
    }
}

pub fn add(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let mut total = 0.0;
    for a in args {
        total += as_num("+", *a)?;
    }
    Ok(Atom::Num(total))
}

pub fn sub(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    if args.is_empty() {
        return Err(LispError::arity("-", "at least 1", 0));
    }
    if args.len() == 1 {
        return Ok(Atom::Num(-as_num("-", args[0])?));
    }
    let mut total = as_num("-", args[0])?;
    for a in &args[1..] {
        total -= as_num("-", *a)?;
    }
    Ok(Atom::Num(total))
}

pub fn mul(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    let mut total = 1.0;
    for a in args {
        total *= as_num("*", *a)?;
    }
    Ok(Atom::Num(total))
}

pub fn div(_interp: &mut Interp, args: &[Atom]) -> Result<Atom, LispError> {
    if args.is_empty() {
        return Err(LispError::arity("/", "at least 1", 0));
    }
    if args.len() == 1 {
        let n = as_num("/", args[0])?;
        if n == 0.0 {
            return Err(LispError::DivisionByZero);
        }
        return Ok(Atom::Num(1.0 / n));
    }
    let mut total = as_num("/", args[0])?;
    for a in &args[1..] {
        let n = as_num("/", *a)?;
        if n == 0.0 {
            return Err(LispError::DivisionByZero);
        }
        total /= n;
    }
    Ok(Atom::Num(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_interp() -> Interp {
        Interp::new()
    }

    #[test]
    fn add_sums_all_arguments() {
        let mut interp = test_interp();
        assert_eq!(add(&mut interp, &[Atom::Num(1.0), Atom::Num(2.0), Atom::Num(3.0)]).unwrap(), Atom::Num(6.0));
    }

    #[test]
    fn sub_with_one_arg_negates() {
        let mut interp = test_interp();
        assert_eq!(sub(&mut interp, &[Atom::Num(5.0)]).unwrap(), Atom::Num(-5.0));
    }

    #[test]
    fn div_by_zero_is_an_error() {
        let mut interp = test_interp();
        let err = div(&mut interp, &[Atom::Num(1.0), Atom::Num(0.0)]).unwrap_err();
        assert_eq!(err, LispError::DivisionByZero);
    }
}
