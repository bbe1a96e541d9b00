use crate::{
    Lexer,
    ast::{Arg, Expression, FunctionCall, Op, Operand, Operation, PowerExpr, Sign, Signed},
    lex::{ParseError, Token, TokenKind},
};

/// Deepest nesting of parentheses, signs, calls and exponents accepted.
pub const MAX_DEPTH: usize = 64;

/// Recursive-descent parser, one method per precedence layer, loosest first.
///
/// Once a binary operator has been consumed its right-hand operand is
/// mandatory: a failure there is reported, never backtracked over.
/// Nesting beyond [`MAX_DEPTH`] is reported rather than recursed into.
pub struct Parser<'de> {
    whole: &'de str,
    lexer: Lexer<'de>,
    depth: usize,
}

impl<'de> Parser<'de> {
    pub fn new(whole: &'de str) -> Self {
        Parser {
            whole,
            lexer: Lexer::new(whole),
            depth: 0,
        }
    }

    /// Parses the whole input; anything left after the expression is an error.
    pub fn parse(mut self) -> Result<Expression, ParseError> {
        let expression = match self.parse_expression()? {
            // a tighter layer's chain is the whole input
            Expression {
                head: Operand::Expression(inner),
                tail,
            } if tail.is_empty() => *inner,
            expression => expression,
        };
        if let Some(token) = self.lexer.peek()? {
            return Err(ParseError::new(self.whole, token.offset, "end of input"));
        }
        log::debug!("parsed `{}` as {expression}", self.whole);
        Ok(expression)
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_chain(
            |kind| match kind {
                TokenKind::AndAnd => Some(Op::And),
                TokenKind::OrOr => Some(Op::Or),
                _ => None,
            },
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> Result<Operand, ParseError> {
        self.parse_chain(
            |kind| match kind {
                TokenKind::LessEqual => Some(Op::LessEqual),
                TokenKind::Less => Some(Op::Less),
                TokenKind::GreaterEqual => Some(Op::GreaterEqual),
                TokenKind::Greater => Some(Op::Greater),
                TokenKind::BangEqual => Some(Op::BangEqual),
                TokenKind::EqualEqual => Some(Op::EqualEqual),
                _ => None,
            },
            Self::parse_additive,
        )
        .map(Expression::into_operand)
    }

    fn parse_additive(&mut self) -> Result<Operand, ParseError> {
        self.parse_chain(
            |kind| match kind {
                TokenKind::Plus => Some(Op::Plus),
                TokenKind::Minus => Some(Op::Minus),
                _ => None,
            },
            Self::parse_multiplicative,
        )
        .map(Expression::into_operand)
    }

    fn parse_multiplicative(&mut self) -> Result<Operand, ParseError> {
        self.parse_chain(
            |kind| match kind {
                TokenKind::Star => Some(Op::Star),
                TokenKind::Slash => Some(Op::Slash),
                _ => None,
            },
            Self::parse_exponential,
        )
        .map(Expression::into_operand)
    }

    /// `operand (op operand)*` as one flat, left-associative chain.
    fn parse_chain(
        &mut self,
        operator: fn(TokenKind) -> Option<Op>,
        operand: fn(&mut Self) -> Result<Operand, ParseError>,
    ) -> Result<Expression, ParseError> {
        let head = operand(self)?;
        let mut tail = Vec::new();

        while let Some(op) = self.lexer.peek()?.and_then(|token| operator(token.kind)) {
            self.lexer.next();
            log::trace!("operator `{op}`");
            let operand = operand(self)?;
            tail.push(Operation { op, operand });
        }

        Ok(Expression { head, tail })
    }

    fn parse_exponential(&mut self) -> Result<Operand, ParseError> {
        let base = self.parse_unary()?;
        if !matches!(
            self.lexer.peek()?,
            Some(Token {
                kind: TokenKind::Caret,
                ..
            })
        ) {
            return Ok(base);
        }
        self.lexer.next();

        let exponent = self.nested(Self::parse_exponential)?;
        Ok(Operand::Power(Box::new(PowerExpr {
            base,
            exponent: Some(exponent),
        })))
    }

    fn parse_unary(&mut self) -> Result<Operand, ParseError> {
        self.nested(Self::parse_signed)
    }

    fn parse_signed(&mut self) -> Result<Operand, ParseError> {
        let sign = match self.lexer.peek()? {
            Some(Token {
                kind: TokenKind::Minus,
                ..
            }) => Sign::Minus,
            Some(Token {
                kind: TokenKind::Plus,
                ..
            }) => Sign::Plus,
            Some(Token {
                kind: TokenKind::Bang,
                ..
            }) => Sign::Not,
            _ => return self.parse_primary(),
        };
        self.lexer.next();

        let operand = self.parse_unary()?;
        Ok(Operand::Signed(Box::new(Signed { sign, operand })))
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<Operand, ParseError>,
    ) -> Result<Operand, ParseError> {
        if self.depth >= MAX_DEPTH {
            let offset = self
                .lexer
                .peek()?
                .map_or(self.whole.len(), |token| token.offset);
            return Err(ParseError::new(
                self.whole,
                offset,
                "a less deeply nested expression",
            ));
        }
        self.depth += 1;
        let operand = parse(self);
        self.depth -= 1;
        operand
    }

    fn parse_primary(&mut self) -> Result<Operand, ParseError> {
        let token = match self.lexer.next() {
            Some(Ok(token)) => token,
            Some(Err(e)) => return Err(e),
            None => return Err(ParseError::new(self.whole, self.whole.len(), "an operand")),
        };

        match token.kind {
            TokenKind::Number(n) => Ok(Operand::Number(n)),
            TokenKind::Arg(digit) => Arg::new(digit)
                .map(Operand::Arg)
                .ok_or_else(|| ParseError::new(self.whole, token.offset, "a digit after `_`")),
            TokenKind::Ident => {
                self.lexer
                    .expect(TokenKind::LeftParen, "`(` after function name")?;
                let arg = match self.lexer.peek()? {
                    Some(Token {
                        kind: TokenKind::RightParen,
                        ..
                    }) => Operand::Nil,
                    _ => self.parse_unary()?,
                };
                self.lexer.expect(TokenKind::RightParen, "`)`")?;
                Ok(Operand::Call(Box::new(FunctionCall {
                    name: token.literal.to_string(),
                    arg,
                })))
            }
            TokenKind::LeftParen => {
                let expression = self.parse_expression()?;
                self.lexer.expect(TokenKind::RightParen, "`)`")?;
                Ok(expression.into_operand())
            }
            _ => Err(ParseError::new(self.whole, token.offset, "an operand")),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tree(input: &str) -> String {
        Parser::new(input).parse().unwrap().to_string()
    }

    fn error(input: &str) -> ParseError {
        Parser::new(input).parse().unwrap_err()
    }

    #[test]
    fn precedence_layers() {
        assert_eq!(tree("1+2*3"), "(+ 1 (* 2 3))");
        assert_eq!(tree("1<2+3&&4"), "(&& (< 1 (+ 2 3)) 4)");
        assert_eq!(tree("(1+2)*(3+4)"), "(* (+ 1 2) (+ 3 4))");
    }

    #[test]
    fn chains_are_flat_and_left_folded() {
        let expression = Parser::new("1-2-3").parse().unwrap();
        assert_eq!(expression.tail.len(), 2);
        assert_eq!(expression.to_string(), "(- (- 1 2) 3)");
        assert_eq!(tree("1<2<3"), "(< (< 1 2) 3)");
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(tree("2^3^2"), "(^ 2 (^ 3 2))");
    }

    #[test]
    fn unary_binds_tighter_than_power() {
        assert_eq!(tree("-2^2"), "(^ (- 2) 2)");
        assert_eq!(tree("2^-1"), "(^ 2 (- 1))");
    }

    #[test]
    fn unary_chains() {
        assert_eq!(tree("--1"), "(- (- 1))");
        assert_eq!(tree("1--1"), "(- 1 (- 1))");
        assert_eq!(tree("!+_1"), "(! (+ _1))");
    }

    #[test]
    fn function_calls() {
        assert_eq!(tree("pi()"), "(pi)");
        assert_eq!(tree("sin(rad(90))"), "(sin (rad 90))");
        assert_eq!(tree("log10 ( -_2 )"), "(log10 (- _2))");
    }

    #[test]
    fn single_operand_keeps_expression_root() {
        let expression = Parser::new("  42 ").parse().unwrap();
        assert_eq!(expression.head, Operand::Number(42.0));
        assert!(expression.tail.is_empty());
    }

    #[test]
    fn missing_operand_after_operator() {
        let err = error("1+");
        assert_eq!(err.expected(), "an operand");
        assert_eq!(err.position(), 2);
        assert_eq!(err.remainder(), "");
    }

    #[test]
    fn missing_operand_after_power() {
        let err = error("2^*3");
        assert_eq!(err.expected(), "an operand");
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn unclosed_parenthesis() {
        let err = error("(1+2");
        assert_eq!(err.expected(), "`)`");
        assert_eq!(err.position(), 4);
    }

    #[test]
    fn trailing_input() {
        let err = error("1 2");
        assert_eq!(err.expected(), "end of input");
        assert_eq!(err.position(), 2);
        assert_eq!(err.remainder(), "2");

        let err = error("(1))");
        assert_eq!(err.remainder(), ")");
    }

    #[test]
    fn function_argument_is_unary_level() {
        let err = error("sin(1+2)");
        assert_eq!(err.expected(), "`)`");
        assert_eq!(err.remainder(), "+2)");
        assert_eq!(tree("sin((1+2))"), "(sin (+ 1 2))");
    }

    #[test]
    fn name_without_call() {
        let err = error("x + 1");
        assert_eq!(err.expected(), "`(` after function name");
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn nesting_is_capped() {
        let deep = format!("{}1", "(".repeat(10_000));
        let err = error(&deep);
        assert_eq!(err.expected(), "a less deeply nested expression");
        assert_eq!(err.position(), MAX_DEPTH);
        assert_eq!(err.remainder().len(), 10_000 - MAX_DEPTH + 1);

        let balanced = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(
            error(&balanced).expected(),
            "a less deeply nested expression"
        );
        assert_eq!(
            error(&format!("{}1", "-".repeat(10_000))).expected(),
            "a less deeply nested expression"
        );
        assert_eq!(
            error(&format!("{}2", "2^".repeat(10_000))).expected(),
            "a less deeply nested expression"
        );
        assert_eq!(
            error(&format!("{}1{}", "abs(".repeat(10_000), ")".repeat(10_000))).expected(),
            "a less deeply nested expression"
        );
    }

    #[test]
    fn nesting_below_cap_parses() {
        let depth = MAX_DEPTH / 4;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(tree(&source), "1");
        assert_eq!(tree(&format!("{}1", "-".repeat(depth))).matches('-').count(), depth);
    }

    #[test]
    fn empty_input() {
        let err = error("   ");
        assert_eq!(err.expected(), "an operand");
    }
}
