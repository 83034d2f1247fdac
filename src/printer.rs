//! Printers. `print_expr` is the machine-readable form (strings quoted and
//! escaped, suitable for `read` to parse back); `pr` is the human-readable
//! form (strings printed raw, as `display`/`princ` would in other Lisps).

use crate::heap::Heap;
use crate::value::Atom;

/// Format an `f64` the way Arc prints numbers: integral values print
/// without a trailing `.0`, everything else prints as the shortest decimal
/// that round-trips back to the same bits.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn escape_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            _ => out.push(b as char),
        }
    }
    out.push('"');
    out
}

fn write_list(heap: &Heap, mut atom: Atom, out: &mut String, readable: bool) {
    out.push('(');
    let mut first = true;
    loop {
        match atom {
            Atom::Nil => break,
            Atom::Cons(_) => {
                if !first {
                    out.push(' ');
                }
                first = false;
                write_atom(heap, heap.car(atom), out, readable);
                atom = heap.cdr(atom);
            }
            other => {
                out.push_str(" . ");
                write_atom(heap, other, out, readable);
                break;
            }
        }
    }
    out.push(')');
}

fn write_atom(heap: &Heap, atom: Atom, out: &mut String, readable: bool) {
    match atom {
        Atom::Nil => out.push_str("nil"),
        Atom::Num(n) => out.push_str(&format_number(n)),
        Atom::Sym(id) => out.push_str(heap.symbol_name(id)),
        Atom::Str(id) => {
            let bytes = &heap.string(id).bytes;
            if readable {
                out.push_str(&escape_string(bytes));
            } else {
                out.push_str(&String::from_utf8_lossy(bytes));
            }
        }
        Atom::Cons(_) => write_list(heap, atom, out, readable),
        Atom::Closure(_) => {
            out.push_str("(closure ");
            write_atom(heap, heap.cdr(atom), out, readable);
            out.push(')');
        }
        Atom::Macro(_) => {
            out.push_str("(macro ");
            write_atom(heap, heap.cdr(atom), out, readable);
            out.push(')');
        }
        Atom::Builtin(_) => out.push_str("#<builtin>"),
    }
}

/// Machine-readable print: what `write`/`prn` would produce. Strings are
/// quoted and escaped so the result round-trips through `read`.
pub fn print_expr(heap: &Heap, atom: Atom) -> String {
    let mut out = String::new();
    write_atom(heap, atom, &mut out, true);
    out
}

/// Human-readable print: what `pr`/`display` produce. Strings print with
/// their raw bytes, no quoting.
pub fn pr(heap: &Heap, atom: Atom) -> String {
    let mut out = String::new();
    write_atom(heap, atom, &mut out, false);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;

    #[test]
    fn integral_numbers_print_without_trailing_zero() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-7.0), "-7");
    }

    #[test]
    fn fractional_numbers_print_plainly() {
        assert_eq!(format_number(3.5), "3.5");
    }

    #[test]
    fn print_expr_quotes_strings_and_pr_does_not() {
        let mut heap = Heap::new();
        let s = heap.make_string(b"hi".to_vec());
        assert_eq!(print_expr(&heap, s), "\"hi\"");
        assert_eq!(pr(&heap, s), "hi");
    }

    #[test]
    fn print_expr_renders_proper_and_dotted_lists() {
        let mut heap = Heap::new();
        let tail = heap.cons(Atom::Num(2.0), Atom::Nil);
        let proper = heap.cons(Atom::Num(1.0), tail);
        assert_eq!(print_expr(&heap, proper), "(1 2)");
        let dotted = heap.cons(Atom::Num(1.0), Atom::Num(2.0));
        assert_eq!(print_expr(&heap, dotted), "(1 . 2)");
    }

    #[test]
    fn closure_prints_its_args_and_body_tail() {
        let mut heap = Heap::new();
        let x = Atom::Sym(heap.intern("x"));
        let params = heap.cons(x, Atom::Nil);
        let body = heap.cons(x, Atom::Nil);
        let params_body = heap.cons(params, body);
        let closure = match heap.cons(Atom::Nil, params_body) {
            Atom::Cons(id) => Atom::Closure(id),
            _ => unreachable!(),
        };
        let printed = print_expr(&heap, closure);
        assert!(printed.starts_with("(closure ("), "{printed}");
    }
}
