//! Arithmetic and boolean expressions over `f64`.
//!
//! An expression such as `_1 * sin(rad(_2)) >= 0.5 && _0 == 2` is parsed into
//! an [`Expression`] tree with C-like precedence and then evaluated against up
//! to nine positional arguments. `_0` reads the number of arguments supplied.
//!
//! ```
//! assert_eq!(calc::evaluate("1+2*3", &[]).unwrap(), 7.0);
//! assert_eq!(calc::evaluate("_1 + _2", &[1.5, 2.0]).unwrap(), 3.5);
//! ```

pub mod ast;
pub mod error;
pub mod eval;
pub mod lex;
pub mod parse;
pub mod system;

pub use ast::{Expression, Operand};
pub use error::Error;
pub use eval::{Arguments, Evaluator, Falsy, Options, UnknownFunction};
pub use lex::{Lexer, ParseError};
pub use parse::Parser;

pub fn parse(source: &str) -> Result<Expression, ParseError> {
    Parser::new(source).parse()
}

/// Parses `source` and evaluates it against `args` with default [`Options`].
pub fn evaluate(source: &str, args: &[f64]) -> Result<f64, Error> {
    evaluate_with(source, args, Options::default())
}

pub fn evaluate_with(source: &str, args: &[f64], options: Options) -> Result<f64, Error> {
    let args = Arguments::new(args)?;
    let expression = parse(source)?;
    Evaluator::new(args).with_options(options).eval(&expression)
}
