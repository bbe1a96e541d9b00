use miette::Diagnostic;
use thiserror::Error;

use crate::lex::ParseError;

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error("unknown function `{name}`")]
    #[diagnostic(
        code(calc::unknown_function),
        help("available functions: pi, e, sin, cos, tan, abs, rad, deg, log, log10, log2")
    )]
    UnknownFunction { name: String },

    #[error("function `{name}` takes one argument, none given")]
    #[diagnostic(code(calc::missing_argument), help("call it as `{name}(x)`"))]
    MissingArgument { name: String },

    #[error("at most 9 positional arguments are supported, got {count}")]
    #[diagnostic(code(calc::too_many_arguments))]
    TooManyArguments { count: usize },
}
