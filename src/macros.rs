//! The macro expander. Takes no environment parameter: it operates only
//! against `interp.global_env` — macros are a purely global-namespace
//! facility, never lexically scoped.

use crate::env::env_get;
use crate::error::LispError;
use crate::eval::apply;
use crate::value::{Atom, Interp};

/// Expand `expr` fully:
///
/// 1. Non-cons atoms return as-is.
/// 2. `(quote x)` returns unchanged; its interior is never expanded.
/// 3. `(mac name params body...)` defines the macro (binding `name` in the
///    global environment) and expands to `(quote name)`.
/// 4. If the head is a symbol bound (globally) to a macro: apply it to the
///    unexpanded argument list, then recursively expand the result.
/// 5. Otherwise, copy the list spine and expand each element in place.
pub fn macex(interp: &mut Interp, expr: Atom) -> Result<Atom, LispError> {
    let Atom::Cons(_) = expr else {
        return Ok(expr);
    };
    let head = interp.heap.car(expr);
    if let Atom::Sym(sym) = head {
        let special = interp.special;
        if sym == special.quote {
            return Ok(expr);
        }
        if sym == special.mac {
            let name = crate::eval::define_macro(interp, interp.heap.cdr(expr))?;
            let name_atom = Atom::Sym(name);
            let quote_sym = Atom::Sym(special.quote);
            let tail = interp.heap.cons(name_atom, Atom::Nil);
            return Ok(interp.heap.cons(quote_sym, tail));
        }
        let name = interp.heap.symbol_name(sym).to_string();
        if let Ok(bound) = env_get(&interp.heap, interp.global_env, sym, &name) {
            if let Atom::Macro(_) = bound {
                let args = interp.heap.cdr(expr);
                let arg_list = crate::eval::list_to_vec(&interp.heap, args)?;
                let expanded = apply(interp, bound, &arg_list)?;
                return macex(interp, expanded);
            }
        }
    }
    macex_spine(interp, expr)
}

/// Copy a list's spine, recursively expanding every element (and, for an
/// improper list, the final non-`nil` tail) in place.
fn macex_spine(interp: &mut Interp, expr: Atom) -> Result<Atom, LispError> {
    match expr {
        Atom::Cons(_) => {
            let head = interp.heap.car(expr);
            let tail = interp.heap.cdr(expr);
            let new_head = macex(interp, head)?;
            let new_tail = macex_spine(interp, tail)?;
            Ok(interp.heap.cons(new_head, new_tail))
        }
        other => macex(interp, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::env_assign;
    use crate::reader::read_one;

    fn test_interp() -> Interp {
        Interp::new()
    }

    #[test]
    fn non_macro_call_is_unchanged() {
        // The spine gets copied during expansion, so identity isn't
        // preserved, but content is.
        let mut interp = test_interp();
        let expr = read_one(&mut interp, "(+ 1 2)").unwrap().unwrap();
        let expanded = macex(&mut interp, expr).unwrap();
        assert_eq!(
            crate::printer::print_expr(&interp.heap, expanded),
            crate::printer::print_expr(&interp.heap, expr)
        );
    }

    #[test]
    fn quoted_form_is_not_expanded() {
        let mut interp = test_interp();
        let expr = read_one(&mut interp, "'(double 5)").unwrap().unwrap();
        let expanded = macex(&mut interp, expr).unwrap();
        assert_eq!(
            crate::printer::print_expr(&interp.heap, expanded),
            "(quote (double 5))"
        );
    }

    #[test]
    fn macro_call_expands_via_its_body() {
        let mut interp = test_interp();
        // (mac double (x) `(+ ,x ,x)) -- build the macro value directly
        // rather than going through eval.rs's `mac` special form, to keep
        // this a unit test of macex alone. The body uses quasiquote so the
        // macro call expands to the *form* `(+ 5 5)`, not the number 10.
        let params = read_one(&mut interp, "(x)").unwrap().unwrap();
        let body_src = read_one(&mut interp, "`(+ ,x ,x)").unwrap().unwrap();
        let body = interp.heap.cons(body_src, Atom::Nil);
        let params_body = interp.heap.cons(params, body);
        let makro = match interp.heap.cons(Atom::Nil, params_body) {
            Atom::Cons(id) => Atom::Macro(id),
            _ => unreachable!(),
        };
        let name = interp.heap.intern("double");
        env_assign(&mut interp.heap, interp.global_env, name, makro);

        let call = read_one(&mut interp, "(double 5)").unwrap().unwrap();
        let expanded = macex(&mut interp, call).unwrap();
        assert_eq!(crate::printer::print_expr(&interp.heap, expanded), "(+ 5 5)");

        // Nested inside another form, the macro call still expands: macex
        // must copy the spine and recurse into every element, not just
        // check the form's own head.
        let nested = read_one(&mut interp, "(- 10 (double 5))").unwrap().unwrap();
        let nested_expanded = macex(&mut interp, nested).unwrap();
        assert_eq!(
            crate::printer::print_expr(&interp.heap, nested_expanded),
            "(- 10 (+ 5 5))"
        );
    }

    #[test]
    fn mac_form_defines_the_macro_and_expands_to_quoted_name() {
        let mut interp = test_interp();
        let form = read_one(&mut interp, "(mac twice (x) `(+ ,x ,x))").unwrap().unwrap();
        let expanded = macex(&mut interp, form).unwrap();
        assert_eq!(crate::printer::print_expr(&interp.heap, expanded), "(quote twice)");

        let twice = interp.heap.intern("twice");
        let bound = crate::env::env_get(&interp.heap, interp.global_env, twice, "twice").unwrap();
        assert!(matches!(bound, Atom::Macro(_)));

        let call = read_one(&mut interp, "(twice 3)").unwrap().unwrap();
        let call_expanded = macex(&mut interp, call).unwrap();
        assert_eq!(crate::printer::print_expr(&interp.heap, call_expanded), "(+ 3 3)");
    }
}
