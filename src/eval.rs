use crate::{
    Error,
    ast::{Arg, Expression, FunctionCall, Op, Operand, Operation, PowerExpr, Sign, Signed},
    system::{Arity, Builtin},
};

pub const MAX_ARGUMENTS: usize = 9;

/// Magnitude below which a value counts as false under [`Falsy::Tolerant`].
pub const FALSY_EPSILON: f64 = 1e-6;

/// Positional argument table.
///
/// Slot 0 holds the number of supplied values, slots 1..=9 the values
/// themselves; slots past the supplied count read as 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arguments {
    slots: [f64; MAX_ARGUMENTS + 1],
}

impl Arguments {
    pub fn new(values: &[f64]) -> Result<Self, Error> {
        if values.len() > MAX_ARGUMENTS {
            return Err(Error::TooManyArguments {
                count: values.len(),
            });
        }
        let mut slots = [0.0; MAX_ARGUMENTS + 1];
        slots[0] = values.len() as f64;
        slots[1..=values.len()].copy_from_slice(values);
        Ok(Arguments { slots })
    }

    pub fn count(&self) -> usize {
        self.slots[0] as usize
    }

    pub fn get(&self, arg: Arg) -> f64 {
        self.slots[usize::from(arg.digit())]
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Arguments {
            slots: [0.0; MAX_ARGUMENTS + 1],
        }
    }
}

/// Which values `!`, `&&` and `||` treat as false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Falsy {
    /// `|x| < 1e-6`
    #[default]
    Tolerant,
    /// `x == 0`
    Exact,
}

impl Falsy {
    pub fn is_falsy(self, x: f64) -> bool {
        match self {
            Falsy::Tolerant => x.abs() < FALSY_EPSILON,
            Falsy::Exact => x == 0.0,
        }
    }
}

/// What a call to a name outside the builtin table evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFunction {
    #[default]
    Zero,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub falsy: Falsy,
    pub unknown_functions: UnknownFunction,
}

#[derive(Debug, Clone)]
pub struct Evaluator {
    args: Arguments,
    options: Options,
}

impl Evaluator {
    pub fn new(args: Arguments) -> Self {
        Self {
            args,
            options: Options::default(),
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn eval(&self, expression: &Expression) -> Result<f64, Error> {
        let value = self.eval_expression(expression)?;
        log::debug!("{expression} evaluated to {value}");
        Ok(value)
    }

    fn eval_operand(&self, operand: &Operand) -> Result<f64, Error> {
        Ok(match operand {
            Operand::Nil => unreachable!("nil operand reached evaluation"),
            Operand::Number(n) => *n,
            Operand::Signed(signed) => self.eval_signed(signed)?,
            Operand::Expression(expression) => self.eval_expression(expression)?,
            Operand::Power(power) => self.eval_power(power)?,
            Operand::Arg(arg) => self.args.get(*arg),
            Operand::Call(call) => self.eval_call(call)?,
        })
    }

    fn eval_signed(&self, signed: &Signed) -> Result<f64, Error> {
        let value = self.eval_operand(&signed.operand)?;
        Ok(match signed.sign {
            Sign::Minus => -value,
            Sign::Plus => value,
            Sign::Not => boolean(self.options.falsy.is_falsy(value)),
        })
    }

    fn eval_power(&self, power: &PowerExpr) -> Result<f64, Error> {
        let base = self.eval_operand(&power.base)?;
        match &power.exponent {
            None => Ok(base),
            Some(exponent) => Ok(base.powf(self.eval_operand(exponent)?)),
        }
    }

    fn eval_call(&self, call: &FunctionCall) -> Result<f64, Error> {
        let Some(builtin) = Builtin::from_name(&call.name) else {
            return match self.options.unknown_functions {
                UnknownFunction::Zero => {
                    log::warn!("unknown function `{}` evaluates to 0", call.name);
                    Ok(0.0)
                }
                UnknownFunction::Reject => Err(Error::UnknownFunction {
                    name: call.name.clone(),
                }),
            };
        };

        match builtin.arity() {
            Arity::Nullary(constant) => Ok(constant),
            Arity::Unary(_) if matches!(call.arg, Operand::Nil) => Err(Error::MissingArgument {
                name: call.name.clone(),
            }),
            Arity::Unary(f) => Ok(f(self.eval_operand(&call.arg)?)),
        }
    }

    fn eval_expression(&self, expression: &Expression) -> Result<f64, Error> {
        let mut state = self.eval_operand(&expression.head)?;
        for operation in &expression.tail {
            state = self.apply(operation, state)?;
            log::trace!("{} {} -> {state}", operation.op, operation.operand);
        }
        Ok(state)
    }

    /// Folds one chain step into the running value `lhs`.
    ///
    /// `&&` and `||` evaluate their right operand only when it decides the result.
    fn apply(&self, operation: &Operation, lhs: f64) -> Result<f64, Error> {
        let falsy = self.options.falsy;
        match operation.op {
            Op::And if falsy.is_falsy(lhs) => return Ok(0.0),
            Op::And => return self.eval_operand(&operation.operand),
            Op::Or if falsy.is_falsy(lhs) => return self.eval_operand(&operation.operand),
            Op::Or => return Ok(lhs),
            _ => {}
        }

        let rhs = self.eval_operand(&operation.operand)?;
        Ok(match operation.op {
            Op::Plus => lhs + rhs,
            Op::Minus => lhs - rhs,
            Op::Star => lhs * rhs,
            Op::Slash => lhs / rhs,
            Op::Less => boolean(lhs < rhs),
            Op::LessEqual => boolean(lhs <= rhs),
            Op::Greater => boolean(lhs > rhs),
            Op::GreaterEqual => boolean(lhs >= rhs),
            Op::EqualEqual => boolean(lhs == rhs),
            Op::BangEqual => boolean(lhs != rhs),
            Op::And | Op::Or => unreachable!("short-circuit operators are handled above"),
        })
    }
}

fn boolean(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}
