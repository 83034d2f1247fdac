//! End-to-end scenarios exercising reader → macro expander → evaluator
//! together, the way a script loaded into the interpreter actually runs.

use arc_lisp::{Atom, ErrorKind, Interp};

fn run(interp: &mut Interp, src: &str) -> Result<Atom, arc_lisp::LispError> {
    let env = interp.global_env;
    let form = arc_lisp::reader::read_one(interp, src)?.expect("non-empty source");
    let expanded = arc_lisp::macros::macex(interp, form)?;
    arc_lisp::eval::eval_expr(interp, expanded, env)
}

fn run_all(interp: &mut Interp, src: &str) -> Result<Atom, arc_lisp::LispError> {
    let env = interp.global_env;
    let forms = arc_lisp::reader::read_all(interp, src)?;
    let mut last = Atom::Nil;
    for form in forms {
        let expanded = arc_lisp::macros::macex(interp, form)?;
        last = arc_lisp::eval::eval_expr(interp, expanded, env)?;
    }
    Ok(last)
}

#[test]
fn arithmetic_sums_three_numbers() {
    let mut interp = Interp::new();
    let result = run(&mut interp, "(+ 1 2 3)").unwrap();
    assert_eq!(result, Atom::Num(6.0));
}

#[test]
fn anonymous_function_adds_its_arguments() {
    let mut interp = Interp::new();
    let result = run(&mut interp, "((fn (x y) (+ x y)) 10 32)").unwrap();
    assert_eq!(result, Atom::Num(42.0));
}

#[test]
fn factorial_via_assign_fn_and_if() {
    let mut interp = Interp::new();
    run_all(
        &mut interp,
        "(assign fact (fn (n) (if (< n 2) 1 (* n (fact (- n 1))))))",
    )
    .unwrap();
    let result = run(&mut interp, "(fact 5)").unwrap();
    assert_eq!(result, Atom::Num(120.0));
}

#[test]
fn mac_defines_a_macro_that_expands_before_eval() {
    let mut interp = Interp::new();
    run_all(&mut interp, "(mac my-when (test expr) `(if ,test ,expr))").unwrap();
    let result = run(&mut interp, "(my-when t 42)").unwrap();
    assert_eq!(result, Atom::Num(42.0));
    let result_false = run(&mut interp, "(my-when nil 42)").unwrap();
    assert_eq!(result_false, Atom::Nil);
}

#[test]
fn string_indexing_returns_a_byte_value() {
    let mut interp = Interp::new();
    run_all(&mut interp, "(assign s \"abcde\")").unwrap();
    let result = run(&mut interp, "(s 1)").unwrap();
    assert_eq!(result, Atom::Num(b'b' as f64));
}

#[test]
fn list_indexing_returns_the_nth_element() {
    let mut interp = Interp::new();
    // `list` itself isn't in this crate's builtin table (only cons/car/cdr
    // are specified); build the list with cons instead.
    run_all(&mut interp, "(assign xs (cons 10 (cons 20 (cons 30 (cons 40 nil)))))").unwrap();
    let result = run(&mut interp, "(xs 2)").unwrap();
    assert_eq!(result, Atom::Num(30.0));
}

#[test]
fn reader_round_trips_a_dotted_pair() {
    let mut interp = Interp::new();
    let form = arc_lisp::reader::read_one(&mut interp, "'(1 2 . 3)").unwrap().unwrap();
    let evaluated = {
        let env = interp.global_env;
        arc_lisp::eval::eval_expr(&mut interp, form, env).unwrap()
    };
    assert_eq!(arc_lisp::printer::print_expr(&interp.heap, evaluated), "(1 2 . 3)");
}

#[test]
fn calling_with_too_few_arguments_is_an_arity_error() {
    let mut interp = Interp::new();
    run_all(&mut interp, "(assign f (fn (x y) (+ x y)))").unwrap();
    let err = run(&mut interp, "(f 1)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Args);
}

#[test]
fn calling_a_number_is_a_type_error() {
    let mut interp = Interp::new();
    let err = run(&mut interp, "(1 2 3)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn referencing_an_unbound_symbol_is_an_unbound_error() {
    let mut interp = Interp::new();
    let err = run(&mut interp, "nonexistent-name").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unbound);
}

#[test]
fn gc_does_not_disturb_live_data_across_many_allocations() {
    let mut interp = Interp::new();
    run_all(&mut interp, "(assign xs (cons 1 (cons 2 (cons 3 nil))))").unwrap();
    // Force plenty of garbage so a collection is likely to run.
    run_all(
        &mut interp,
        "(assign i 0)(while (< i 50) (assign tmp (cons i (cons i nil))) (assign i (+ i 1)))",
    )
    .unwrap();
    let result = run(&mut interp, "(car (cdr xs))").unwrap();
    assert_eq!(result, Atom::Num(2.0));
}

#[test]
fn closures_capture_their_defining_environment_across_calls() {
    let mut interp = Interp::new();
    run_all(
        &mut interp,
        "(assign make-adder (fn (n) (fn (x) (+ x n))))",
    )
    .unwrap();
    run_all(&mut interp, "(assign add5 (make-adder 5))").unwrap();
    let result = run(&mut interp, "(add5 10)").unwrap();
    assert_eq!(result, Atom::Num(15.0));
}
