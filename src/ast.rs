use std::fmt::Display;

/// Any value-producing node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Absent operand, e.g. the argument of `pi()`. Never a valid evaluation target.
    Nil,
    Number(f64),
    Signed(Box<Signed>),
    Expression(Box<Expression>),
    Power(Box<PowerExpr>),
    Arg(Arg),
    Call(Box<FunctionCall>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Minus,
    Plus,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signed {
    pub sign: Sign,
    pub operand: Operand,
}

/// Reference to a positional argument, `_0` through `_9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arg {
    digit: u8,
}

impl Arg {
    pub fn new(digit: u8) -> Option<Self> {
        (digit <= 9).then_some(Arg { digit })
    }

    pub fn digit(self) -> u8 {
        self.digit
    }
}

/// Right-associative exponentiation: `base ^ exponent`.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerExpr {
    pub base: Operand,
    pub exponent: Option<Operand>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arg: Operand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    And,
    Or,
    Plus,
    Minus,
    Star,
    Slash,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    EqualEqual,
    BangEqual,
}

/// One `op rhs` step of an [`Expression`] chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub op: Op,
    pub operand: Operand,
}

/// `head op1 rhs1 op2 rhs2 ...`, folded strictly left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub head: Operand,
    pub tail: Vec<Operation>,
}

impl Expression {
    /// Unwraps a chain without operators into its sole operand.
    pub fn into_operand(self) -> Operand {
        if self.tail.is_empty() {
            self.head
        } else {
            Operand::Expression(Box::new(self))
        }
    }
}

impl Display for Sign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sign::Minus => write!(f, "-"),
            Sign::Plus => write!(f, "+"),
            Sign::Not => write!(f, "!"),
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            Op::And => "&&",
            Op::Or => "||",
            Op::Plus => "+",
            Op::Minus => "-",
            Op::Star => "*",
            Op::Slash => "/",
            Op::Less => "<",
            Op::LessEqual => "<=",
            Op::Greater => ">",
            Op::GreaterEqual => ">=",
            Op::EqualEqual => "==",
            Op::BangEqual => "!=",
        };
        write!(f, "{op}")
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Nil => write!(f, "nil"),
            Operand::Number(n) => write!(f, "{n}"),
            Operand::Signed(signed) => write!(f, "({} {})", signed.sign, signed.operand),
            Operand::Expression(expression) => write!(f, "{expression}"),
            Operand::Power(power) => match &power.exponent {
                Some(exponent) => write!(f, "(^ {} {exponent})", power.base),
                None => write!(f, "{}", power.base),
            },
            Operand::Arg(arg) => write!(f, "_{}", arg.digit),
            Operand::Call(call) => match &call.arg {
                Operand::Nil => write!(f, "({})", call.name),
                arg => write!(f, "({} {arg})", call.name),
            },
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // (op2 (op1 head rhs1) rhs2)
        for operation in self.tail.iter().rev() {
            write!(f, "({} ", operation.op)?;
        }
        write!(f, "{}", self.head)?;
        for operation in &self.tail {
            write!(f, " {})", operation.operand)?;
        }
        Ok(())
    }
}
