use std::f64::consts::{E, PI};

/// The closed table of callable functions. Names match case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Pi,
    E,
    Sin,
    Cos,
    Tan,
    Abs,
    Rad,
    Deg,
    Log,
    Log10,
    Log2,
}

impl Builtin {
    pub const ALL: [Builtin; 11] = [
        Builtin::Pi,
        Builtin::E,
        Builtin::Sin,
        Builtin::Cos,
        Builtin::Tan,
        Builtin::Abs,
        Builtin::Rad,
        Builtin::Deg,
        Builtin::Log,
        Builtin::Log10,
        Builtin::Log2,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Pi => "pi",
            Builtin::E => "e",
            Builtin::Sin => "sin",
            Builtin::Cos => "cos",
            Builtin::Tan => "tan",
            Builtin::Abs => "abs",
            Builtin::Rad => "rad",
            Builtin::Deg => "deg",
            Builtin::Log => "log",
            Builtin::Log10 => "log10",
            Builtin::Log2 => "log2",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Builtin::Pi => Arity::Nullary(PI),
            Builtin::E => Arity::Nullary(E),
            Builtin::Sin => Arity::Unary(f64::sin),
            Builtin::Cos => Arity::Unary(f64::cos),
            Builtin::Tan => Arity::Unary(f64::tan),
            Builtin::Abs => Arity::Unary(f64::abs),
            Builtin::Rad => Arity::Unary(|x| x * 2.0 * PI / 360.0),
            Builtin::Deg => Arity::Unary(|x| x * 360.0 / (2.0 * PI)),
            Builtin::Log => Arity::Unary(f64::ln),
            Builtin::Log10 => Arity::Unary(f64::log10),
            Builtin::Log2 => Arity::Unary(f64::log2),
        }
    }
}

/// How a builtin is evaluated: a constant, or a function of its one argument.
#[derive(Debug, Clone, Copy)]
pub enum Arity {
    Nullary(f64),
    Unary(fn(f64) -> f64),
}
