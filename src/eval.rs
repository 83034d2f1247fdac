//! The evaluator: special-form dispatch plus `apply`. Special forms are
//! recognized by comparing the head symbol's `SymbolId` against ids cached
//! once at startup (`Interp::special`), so dispatch never does a string
//! comparison per call.
//!
//! No tail-call optimization: this recurses the way a tree-walking
//! interpreter naturally does and relies on Rust's call stack.

use crate::env::{env_assign, env_assign_eq, env_create, env_get};
use crate::error::LispError;
use crate::value::{Atom, Interp, SymbolId};

/// Collect a proper list into a `Vec`, erroring if it's improper (ends in
/// something other than `nil`).
pub fn list_to_vec(heap: &crate::heap::Heap, mut list: Atom) -> Result<Vec<Atom>, LispError> {
    let mut out = Vec::new();
    loop {
        match list {
            Atom::Nil => return Ok(out),
            Atom::Cons(_) => {
                out.push(heap.car(list));
                list = heap.cdr(list);
            }
            _ => {
                return Err(LispError::WrongType {
                    function: "list".to_string(),
                    expected: "proper list".to_string(),
                    actual: list.type_name().to_string(),
                })
            }
        }
    }
}

/// Concatenate a proper list `front` onto `back`, copying `front`'s cells
/// (used by quasiquote's `unquote-splicing` to avoid sharing structure with
/// whatever produced `front`).
fn append_lists(interp: &mut Interp, front: Atom, back: Atom) -> Atom {
    let items = list_to_vec(&interp.heap, front).unwrap_or_default();
    let mut result = back;
    for item in items.iter().rev() {
        result = interp.heap.cons(*item, result);
    }
    result
}

fn vec_to_list(interp: &mut Interp, items: &[Atom]) -> Atom {
    let mut result = Atom::Nil;
    for item in items.iter().rev() {
        result = interp.heap.cons(*item, result);
    }
    result
}

fn sym_name(interp: &Interp, sym: SymbolId) -> String {
    interp.heap.symbol_name(sym).to_string()
}

/// Evaluate `expr` in `env`. Restores the guard stack to its depth on entry
/// before returning, then re-roots only the result, so a deep evaluation's
/// intermediate garbage doesn't stay rooted after that evaluation returns.
pub fn eval_expr(interp: &mut Interp, expr: Atom, env: Atom) -> Result<Atom, LispError> {
    let depth = interp.heap.guard_depth();
    let result = eval_expr_inner(interp, expr, env);
    interp.heap.unguard(interp.heap.guard_depth() - depth);
    if let Ok(value) = result {
        interp.heap.guard(value);
    }
    result
}

fn eval_expr_inner(interp: &mut Interp, expr: Atom, env: Atom) -> Result<Atom, LispError> {
    match expr {
        Atom::Nil
        | Atom::Num(_)
        | Atom::Str(_)
        | Atom::Builtin(_)
        | Atom::Closure(_)
        | Atom::Macro(_) => Ok(expr),
        Atom::Sym(id) => {
            let name = sym_name(interp, id);
            env_get(&interp.heap, env, id, &name)
        }
        Atom::Cons(_) => eval_list_form(interp, expr, env),
    }
}

fn head_sym(interp: &Interp, expr: Atom) -> Option<SymbolId> {
    match interp.heap.car(expr) {
        Atom::Sym(id) => Some(id),
        _ => None,
    }
}

fn eval_list_form(interp: &mut Interp, expr: Atom, env: Atom) -> Result<Atom, LispError> {
    if let Some(sym) = head_sym(interp, expr) {
        let special = interp.special;
        if sym == special.quote {
            return Ok(interp.heap.car(interp.heap.cdr(expr)));
        }
        if sym == special.if_ {
            return eval_if(interp, interp.heap.cdr(expr), env);
        }
        if sym == special.assign {
            return eval_assign(interp, interp.heap.cdr(expr), env);
        }
        if sym == special.fn_ {
            let rest = interp.heap.cdr(expr);
            let params = interp.heap.car(rest);
            let body = interp.heap.cdr(rest);
            let params_body = interp.heap.cons(params, body);
            return Ok(interp.heap.cons_closure(env, params_body));
        }
        if sym == special.mac {
            return eval_defmacro(interp, interp.heap.cdr(expr));
        }
        if sym == special.while_ {
            return eval_while(interp, interp.heap.cdr(expr), env);
        }
        if sym == special.quasiquote {
            let template = interp.heap.car(interp.heap.cdr(expr));
            return eval_quasiquote(interp, template, env, 1);
        }
    }
    // Ordinary call: evaluate the head first, since it might turn out to be
    // bound to a macro.
    let fn_val = eval_expr(interp, interp.heap.car(expr), env)?;
    let arg_forms = list_to_vec(&interp.heap, interp.heap.cdr(expr))?;
    if let Atom::Macro(id) = fn_val {
        // Late-bound expansion: retag to a closure, apply to the raw
        // (unevaluated) argument forms, then evaluate whatever it hands
        // back — the same path `macex` takes ahead of time, just triggered
        // here because the macro binding was only discovered at eval time.
        let expansion = apply(interp, Atom::Closure(id), &arg_forms)?;
        return eval_expr(interp, expansion, env);
    }
    let mut args = Vec::with_capacity(arg_forms.len());
    for form in arg_forms {
        args.push(eval_expr(interp, form, env)?);
    }
    apply(interp, fn_val, &args)
}

/// `(if test then ... )` / `(if t1 e1 t2 e2 ... else)` — arc-style if with
/// any number of test/expr clause pairs and an optional trailing else.
fn eval_if(interp: &mut Interp, mut clauses: Atom, env: Atom) -> Result<Atom, LispError> {
    loop {
        if clauses.is_nil() {
            return Ok(Atom::Nil);
        }
        let rest = interp.heap.cdr(clauses);
        if rest.is_nil() {
            // A single trailing form is the else branch.
            return eval_expr(interp, interp.heap.car(clauses), env);
        }
        let test = interp.heap.car(clauses);
        let then = interp.heap.car(rest);
        let test_val = eval_expr(interp, test, env)?;
        if test_val.is_truthy() {
            return eval_expr(interp, then, env);
        }
        clauses = interp.heap.cdr(rest);
    }
}

/// `(assign sym1 val1 sym2 val2 ...)` — mutate-if-bound-anywhere, else
/// define in the frame evaluation started from, per `env_assign_eq`.
fn eval_assign(interp: &mut Interp, mut pairs: Atom, env: Atom) -> Result<Atom, LispError> {
    let mut last = Atom::Nil;
    while !pairs.is_nil() {
        let sym_atom = interp.heap.car(pairs);
        let sym = match sym_atom {
            Atom::Sym(id) => id,
            other => {
                return Err(LispError::wrong_type(
                    "assign",
                    "symbol",
                    other.type_name(),
                ))
            }
        };
        let rest = interp.heap.cdr(pairs);
        let val_form = interp.heap.car(rest);
        let val = eval_expr(interp, val_form, env)?;
        env_assign_eq(&mut interp.heap, env, env, sym, val);
        last = val;
        pairs = interp.heap.cdr(rest);
    }
    Ok(last)
}

/// `(mac name (params...) body...)` — builds a macro closure capturing the
/// global environment and binds `name` to it there, never in the lexical
/// `env` eval/macex was called with. Returns `name`'s `SymbolId`; callers
/// decide how to surface it (bare symbol for `eval_expr`, `(quote name)`
/// for `macex`).
pub(crate) fn define_macro(interp: &mut Interp, rest: Atom) -> Result<SymbolId, LispError> {
    let name_atom = interp.heap.car(rest);
    let name = match name_atom {
        Atom::Sym(id) => id,
        other => return Err(LispError::wrong_type("mac", "symbol", other.type_name())),
    };
    let rest2 = interp.heap.cdr(rest);
    let params = interp.heap.car(rest2);
    let body = interp.heap.cdr(rest2);
    let params_body = interp.heap.cons(params, body);
    let global_env = interp.global_env;
    let makro = interp.heap.cons_macro(global_env, params_body);
    env_assign(&mut interp.heap, interp.global_env, name, makro);
    Ok(name)
}

/// `(mac name (params...) body...)` as evaluated directly by `eval_expr`
/// (bypassing `macex`): defines the macro and returns its bare name.
fn eval_defmacro(interp: &mut Interp, rest: Atom) -> Result<Atom, LispError> {
    let name = define_macro(interp, rest)?;
    Ok(Atom::Sym(name))
}

/// `(while cond body...)` — loops while `cond` evaluates to anything but
/// `nil`. Any non-nil value is truthy; there's no special case for `t`
/// versus other truthy values.
fn eval_while(interp: &mut Interp, rest: Atom, env: Atom) -> Result<Atom, LispError> {
    let cond = interp.heap.car(rest);
    let body = interp.heap.cdr(rest);
    loop {
        let test_val = eval_expr(interp, cond, env)?;
        if !test_val.is_truthy() {
            break;
        }
        let forms = list_to_vec(&interp.heap, body)?;
        for form in forms {
            eval_expr(interp, form, env)?;
        }
    }
    Ok(Atom::Nil)
}

/// Quasiquote expansion. `depth` tracks nested quasiquotes so that
/// `unquote`/`unquote-splicing` only fire at the matching nesting level.
fn eval_quasiquote(interp: &mut Interp, template: Atom, env: Atom, depth: i32) -> Result<Atom, LispError> {
    match template {
        Atom::Cons(_) => {
            if let Some(sym) = head_sym(interp, template) {
                let special = interp.special;
                if sym == special.unquote {
                    let inner = interp.heap.car(interp.heap.cdr(template));
                    if depth == 1 {
                        return eval_expr(interp, inner, env);
                    }
                    let expanded = eval_quasiquote(interp, inner, env, depth - 1)?;
                    let tail = interp.heap.cons(expanded, Atom::Nil);
                    let sym_atom = Atom::Sym(special.unquote);
                    return Ok(interp.heap.cons(sym_atom, tail));
                }
                if sym == special.quasiquote {
                    let inner = interp.heap.car(interp.heap.cdr(template));
                    let expanded = eval_quasiquote(interp, inner, env, depth + 1)?;
                    let tail = interp.heap.cons(expanded, Atom::Nil);
                    let sym_atom = Atom::Sym(special.quasiquote);
                    return Ok(interp.heap.cons(sym_atom, tail));
                }
            }
            // Build the list back up element by element, splicing in a
            // `(unquote-splicing x)` element's evaluated list in place of
            // cons-ing it on as a single item.
            let head = interp.heap.car(template);
            let tail = interp.heap.cdr(template);
            if depth == 1 {
                if let Some(sym) = head_sym(interp, head) {
                    if sym == interp.special.unquote_splicing {
                        let inner = interp.heap.car(interp.heap.cdr(head));
                        let spliced = eval_expr(interp, inner, env)?;
                        let expanded_tail = eval_quasiquote(interp, tail, env, depth)?;
                        return Ok(append_lists(interp, spliced, expanded_tail));
                    }
                }
            }
            let expanded_head = eval_quasiquote(interp, head, env, depth)?;
            let expanded_tail = eval_quasiquote(interp, tail, env, depth)?;
            Ok(interp.heap.cons(expanded_head, expanded_tail))
        }
        other => Ok(other),
    }
}

/// Apply `fn_val` to already-evaluated `args`. Builtins and closures/macros
/// dispatch normally; strings and lists are also callable-as-indexers
/// (`(s 1)` on a string or list `s` returns its element at index 1).
///
/// Same guard-stack restore-then-reroot discipline as `eval_expr`.
pub fn apply(interp: &mut Interp, fn_val: Atom, args: &[Atom]) -> Result<Atom, LispError> {
    let depth = interp.heap.guard_depth();
    let result = apply_inner(interp, fn_val, args);
    interp.heap.unguard(interp.heap.guard_depth() - depth);
    if let Ok(value) = result {
        interp.heap.guard(value);
    }
    result
}

fn apply_inner(interp: &mut Interp, fn_val: Atom, args: &[Atom]) -> Result<Atom, LispError> {
    match fn_val {
        Atom::Builtin(f) => f(interp, args),
        Atom::Closure(_) => apply_closure(interp, fn_val, args),
        Atom::Macro(_) => apply_closure(interp, fn_val, args),
        Atom::Str(id) => {
            let index = index_arg(args)?;
            let bytes = &interp.heap.string(id).bytes;
            bytes
                .get(index)
                .map(|b| Atom::Num(*b as f64))
                .ok_or_else(|| LispError::wrong_type("string-index", "in-bounds index", "out of range"))
        }
        Atom::Cons(_) => {
            let index = index_arg(args)?;
            let mut rest = fn_val;
            for _ in 0..index {
                if rest.is_nil() {
                    return Ok(Atom::Nil);
                }
                rest = interp.heap.cdr(rest);
            }
            if rest.is_nil() {
                Ok(Atom::Nil)
            } else {
                Ok(interp.heap.car(rest))
            }
        }
        other => Err(LispError::NotCallable(format!(
            "{}",
            crate::printer::print_expr(&interp.heap, other)
        ))),
    }
}

fn index_arg(args: &[Atom]) -> Result<usize, LispError> {
    if args.len() != 1 {
        return Err(LispError::arity("index", "1", args.len()));
    }
    match args[0] {
        Atom::Num(n) if n >= 0.0 => Ok(n as usize),
        other => Err(LispError::wrong_type("index", "non-negative number", other.type_name())),
    }
}

fn closure_parts(interp: &Interp, closure: Atom) -> (Atom, Atom, Atom) {
    let env = interp.heap.car(closure);
    let params_body = interp.heap.cdr(closure);
    let params = interp.heap.car(params_body);
    let body = interp.heap.cdr(params_body);
    (env, params, body)
}

fn apply_closure(interp: &mut Interp, closure: Atom, args: &[Atom]) -> Result<Atom, LispError> {
    let (captured_env, params, body) = closure_parts(interp, closure);
    let call_env = env_create(&mut interp.heap, captured_env);
    bind_params(interp, call_env, params, args)?;
    let forms = list_to_vec(&interp.heap, body)?;
    let mut result = Atom::Nil;
    for form in forms {
        result = eval_expr(interp, form, call_env)?;
    }
    Ok(result)
}

/// Bind a lambda list against the supplied arguments: plain symbols bind
/// positionally, `(o name default)` is an optional parameter, and a bare
/// symbol in tail position (instead of `nil`) collects the remaining
/// arguments as a rest parameter.
fn bind_params(interp: &mut Interp, env: Atom, mut params: Atom, args: &[Atom]) -> Result<(), LispError> {
    let mut idx = 0usize;
    loop {
        match params {
            Atom::Nil => {
                if idx != args.len() {
                    return Err(LispError::arity(
                        "closure",
                        format!("{}", idx),
                        args.len(),
                    ));
                }
                return Ok(());
            }
            Atom::Sym(rest_sym) => {
                let rest_list = vec_to_list(interp, &args[idx.min(args.len())..]);
                env_assign(&mut interp.heap, env, rest_sym, rest_list);
                return Ok(());
            }
            Atom::Cons(_) => {
                let param = interp.heap.car(params);
                let next = interp.heap.cdr(params);
                match param {
                    Atom::Sym(sym) => {
                        let value = args.get(idx).copied().ok_or_else(|| {
                            LispError::arity("closure", "more arguments", args.len())
                        })?;
                        env_assign(&mut interp.heap, env, sym, value);
                        idx += 1;
                    }
                    Atom::Cons(_) => {
                        // (o name default)
                        let o_sym = interp.heap.car(param);
                        if let Atom::Sym(o_id) = o_sym {
                            if o_id != interp.special.o {
                                return Err(LispError::InvalidForm(
                                    "malformed optional parameter".to_string(),
                                ));
                            }
                        }
                        let rest = interp.heap.cdr(param);
                        let name = interp.heap.car(rest);
                        let default_form = interp.heap.car(interp.heap.cdr(rest));
                        let name_sym = match name {
                            Atom::Sym(id) => id,
                            _ => {
                                return Err(LispError::InvalidForm(
                                    "malformed optional parameter".to_string(),
                                ))
                            }
                        };
                        let value = if let Some(v) = args.get(idx) {
                            idx += 1;
                            *v
                        } else {
                            eval_expr(interp, default_form, env)?
                        };
                        env_assign(&mut interp.heap, env, name_sym, value);
                    }
                    _ => {
                        return Err(LispError::InvalidForm(
                            "malformed parameter list".to_string(),
                        ))
                    }
                }
                params = next;
            }
            _ => return Err(LispError::InvalidForm("malformed parameter list".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_one;

    fn test_interp() -> Interp {
        Interp::new()
    }

    fn eval_src(interp: &mut Interp, src: &str) -> Atom {
        let env = interp.global_env;
        let expr = read_one(interp, src).unwrap().unwrap();
        eval_expr(interp, expr, env).unwrap()
    }

    #[test]
    fn quote_returns_its_argument_unevaluated() {
        let mut interp = test_interp();
        let result = eval_src(&mut interp, "(quote (a b c))");
        assert_eq!(crate::printer::print_expr(&interp.heap, result), "(a b c)");
    }

    #[test]
    fn if_picks_the_matching_branch() {
        let mut interp = test_interp();
        assert_eq!(eval_src(&mut interp, "(if t 1 2)"), Atom::Num(1.0));
        assert_eq!(eval_src(&mut interp, "(if nil 1 2)"), Atom::Num(2.0));
    }

    #[test]
    fn if_supports_multiple_clause_pairs() {
        let mut interp = test_interp();
        assert_eq!(eval_src(&mut interp, "(if nil 1 nil 2 3)"), Atom::Num(3.0));
    }

    #[test]
    fn assign_defines_a_global_binding() {
        let mut interp = test_interp();
        eval_src(&mut interp, "(assign x 10)");
        assert_eq!(eval_src(&mut interp, "x"), Atom::Num(10.0));
    }

    #[test]
    fn fn_and_apply_add_two_numbers() {
        let mut interp = test_interp();
        assert_eq!(
            eval_src(&mut interp, "((fn (x y) (+ x y)) 10 32)").type_name(),
            "number"
        );
    }

    #[test]
    fn while_loops_until_condition_is_nil() {
        let mut interp = test_interp();
        eval_src(&mut interp, "(assign i 0)");
        eval_src(&mut interp, "(while (< i 5) (assign i (+ i 1)))");
        assert_eq!(eval_src(&mut interp, "i"), Atom::Num(5.0));
    }

    #[test]
    fn closure_captures_its_defining_environment() {
        let mut interp = test_interp();
        eval_src(&mut interp, "(assign y 100)");
        eval_src(&mut interp, "(assign addy (fn (x) (+ x y)))");
        assert_eq!(eval_src(&mut interp, "(addy 1)"), Atom::Num(101.0));
    }

    #[test]
    fn rest_parameter_collects_remaining_args() {
        let mut interp = test_interp();
        eval_src(&mut interp, "(assign f (fn args args))");
        let result = eval_src(&mut interp, "(f 1 2 3)");
        assert_eq!(crate::printer::print_expr(&interp.heap, result), "(1 2 3)");
    }

    #[test]
    fn quasiquote_substitutes_unquoted_values() {
        let mut interp = test_interp();
        eval_src(&mut interp, "(assign x 5)");
        let result = eval_src(&mut interp, "`(a ,x c)");
        assert_eq!(crate::printer::print_expr(&interp.heap, result), "(a 5 c)");
    }

    #[test]
    fn quasiquote_splices_a_list_in_place() {
        let mut interp = test_interp();
        eval_src(&mut interp, "(assign xs (cons 2 (cons 3 nil)))");
        let result = eval_src(&mut interp, "`(1 ,@xs 4)");
        assert_eq!(crate::printer::print_expr(&interp.heap, result), "(1 2 3 4)");
    }

    #[test]
    fn calling_through_a_value_holding_a_macro_expands_then_evaluates() {
        // `dbl` evaluates (as a bare symbol) to the macro value itself, so
        // `m` ends up holding a `Macro` atom reached only at eval time --
        // the late-bound path in `eval_list_form`, not `macex`.
        let mut interp = test_interp();
        eval_src(&mut interp, "(mac dbl (x) `(+ ,x ,x))");
        eval_src(&mut interp, "(assign m dbl)");
        assert_eq!(eval_src(&mut interp, "(m 5)"), Atom::Num(10.0));
    }
}
