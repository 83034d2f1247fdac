//! Built-in registration. One module per category, aggregated here into a
//! single [`register_all`] call that `env_assign`s every builtin into the
//! global environment.

pub mod arithmetic;
pub mod comparison;
pub mod io;
pub mod lists;
pub mod math;
pub mod strings;
pub mod system;
pub mod types;

use crate::env::env_assign;
use crate::value::{Atom, Interp};

macro_rules! register {
    ($interp:expr, $( $name:literal => $func:expr ),+ $(,)?) => {
        $(
            let id = $interp.heap.intern($name);
            env_assign(&mut $interp.heap, $interp.global_env, id, Atom::Builtin($func));
        )+
    };
}

/// Bind every builtin into `interp.global_env`, and bind `t` to itself.
pub fn register_all(interp: &mut Interp) {
    let t = interp.special.t;
    env_assign(&mut interp.heap, interp.global_env, t, Atom::Sym(t));

    register! { interp,
        "+" => arithmetic::add,
        "-" => arithmetic::sub,
        "*" => arithmetic::mul,
        "/" => arithmetic::div,
        "<" => comparison::lt,
        "is" => comparison::is,
        "car" => lists::car,
        "cdr" => lists::cdr,
        "cons" => lists::cons,
        "apply" => lists::apply_builtin,
        "scar" => lists::scar,
        "scdr" => lists::scdr,
        "type" => types::type_of,
        "string-sref" => strings::string_sref,
        "string" => strings::string,
        "sym" => strings::sym,
        "mod" => math::modulo,
        "expt" => math::expt,
        "log" => math::log,
        "sqrt" => math::sqrt,
        "int" => math::int,
        "trunc" => math::trunc,
        "sin" => math::sin,
        "cos" => math::cos,
        "tan" => math::tan,
        "rand" => math::rand,
        "pr" => io::pr,
        "writeb" => io::writeb,
        "readline" => io::readline,
        "read" => io::read,
        "macex" => io::macex,
        "eval" => io::eval,
        "quit" => io::quit,
        "system" => system::system,
        "load" => system::load,
    }
}
