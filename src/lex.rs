use std::fmt::Display;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Failure to turn the source text into an expression tree.
///
/// Raised both by the lexer (a character that starts no token) and by the
/// parser (a token where some other construct was required, or input left
/// over after a complete expression).
#[derive(Error, Debug, Diagnostic)]
#[error("expecting {expected} here: \"{remainder}\"")]
#[diagnostic(code(calc::parse), help("expected {expected}"))]
pub struct ParseError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    bad_bit: SourceSpan,

    expected: String,
    position: usize,
    remainder: String,
}

impl ParseError {
    pub fn new(whole: &str, position: usize, expected: impl Into<String>) -> Self {
        let position = position.min(whole.len());
        let width = whole[position..].chars().next().map_or(0, char::len_utf8);
        ParseError {
            src: NamedSource::new("<expression>", whole.to_string()),
            bad_bit: SourceSpan::from(position..position + width),
            expected: expected.into(),
            position,
            remainder: whole[position..].to_string(),
        }
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Byte offset into the source at which parsing stopped.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The unconsumed source text starting at [`position`](Self::position).
    pub fn remainder(&self) -> &str {
        &self.remainder
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Bang,
    AndAnd,
    OrOr,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    EqualEqual,
    BangEqual,
    Number(f64),
    Ident,
    Arg(u8),
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit} null"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit} null"),
            TokenKind::Plus => write!(f, "PLUS {lit} null"),
            TokenKind::Minus => write!(f, "MINUS {lit} null"),
            TokenKind::Star => write!(f, "STAR {lit} null"),
            TokenKind::Slash => write!(f, "SLASH {lit} null"),
            TokenKind::Caret => write!(f, "CARET {lit} null"),
            TokenKind::Bang => write!(f, "BANG {lit} null"),
            TokenKind::AndAnd => write!(f, "AND_AND {lit} null"),
            TokenKind::OrOr => write!(f, "OR_OR {lit} null"),
            TokenKind::Less => write!(f, "LESS {lit} null"),
            TokenKind::LessEqual => write!(f, "LESS_EQUAL {lit} null"),
            TokenKind::Greater => write!(f, "GREATER {lit} null"),
            TokenKind::GreaterEqual => write!(f, "GREATER_EQUAL {lit} null"),
            TokenKind::EqualEqual => write!(f, "EQUAL_EQUAL {lit} null"),
            TokenKind::BangEqual => write!(f, "BANG_EQUAL {lit} null"),
            TokenKind::Number(n) => {
                if n == n.trunc() {
                    write!(f, "NUMBER {lit} {n}.0")
                } else {
                    write!(f, "NUMBER {lit} {n}")
                }
            }
            TokenKind::Ident => write!(f, "IDENTIFIER {lit} null"),
            TokenKind::Arg(digit) => write!(f, "ARG {lit} {digit}"),
        }
    }
}

pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    pub byte: usize,
    peeked: Option<Token<'de>>,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
            peeked: None,
        }
    }

    pub fn expect(&mut self, expected: TokenKind, error: &str) -> Result<Token<'de>, ParseError> {
        self.expect_where(|token| token.kind == expected, error)
    }

    pub fn expect_where(
        &mut self,
        check: impl FnOnce(&Token<'de>) -> bool,
        error: &str,
    ) -> Result<Token<'de>, ParseError> {
        match self.next() {
            Some(Ok(token)) if check(&token) => Ok(token),
            Some(Ok(token)) => Err(ParseError::new(self.whole, token.offset, error)),
            Some(Err(e)) => Err(e),
            None => Err(ParseError::new(self.whole, self.whole.len(), error)),
        }
    }

    /// Looks at the next token without consuming it.
    ///
    /// A lexical error is returned immediately rather than buffered.
    pub fn peek(&mut self) -> Result<Option<Token<'de>>, ParseError> {
        if let Some(token) = self.peeked {
            return Ok(Some(token));
        }
        match self.next() {
            Some(Ok(token)) => {
                self.peeked = Some(token);
                Ok(Some(token))
            }
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    fn advance(&mut self, bytes: usize) {
        self.rest = &self.rest[bytes..];
        self.byte += bytes;
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(peeked) = self.peeked.take() {
            return Some(Ok(peeked));
        }
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let offset = self.byte;
            let literal = &self.rest[..c.len_utf8()];
            let cur = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            enum Started {
                Number,
                Ident,
                Arg,
                IfNextElse(char, TokenKind, Option<TokenKind>),
            }

            let process = |kind: TokenKind| {
                Some(Ok(Token {
                    kind,
                    literal,
                    offset,
                }))
            };

            let started = match c {
                '(' => return process(TokenKind::LeftParen),
                ')' => return process(TokenKind::RightParen),
                '+' => return process(TokenKind::Plus),
                '-' => return process(TokenKind::Minus),
                '*' => return process(TokenKind::Star),
                '/' => return process(TokenKind::Slash),
                '^' => return process(TokenKind::Caret),
                '&' => Started::IfNextElse('&', TokenKind::AndAnd, None),
                '|' => Started::IfNextElse('|', TokenKind::OrOr, None),
                '=' => Started::IfNextElse('=', TokenKind::EqualEqual, None),
                '!' => Started::IfNextElse('=', TokenKind::BangEqual, Some(TokenKind::Bang)),
                '<' => Started::IfNextElse('=', TokenKind::LessEqual, Some(TokenKind::Less)),
                '>' => Started::IfNextElse('=', TokenKind::GreaterEqual, Some(TokenKind::Greater)),
                '0'..='9' | '.' => Started::Number,
                'a'..='z' | 'A'..='Z' => Started::Ident,
                '_' => Started::Arg,
                c if c.is_ascii_whitespace() => continue,
                _ => {
                    return Some(Err(ParseError::new(
                        self.whole,
                        offset,
                        "a number, argument, function call, operator or parenthesis",
                    )));
                }
            };

            match started {
                Started::Number => {
                    let len = number_len(cur);
                    if len == 0 {
                        return Some(Err(ParseError::new(self.whole, offset, "a number")));
                    }
                    let literal = &cur[..len];
                    self.advance(len - c.len_utf8());

                    let n = match literal.parse() {
                        Ok(n) => n,
                        Err(_) => {
                            return Some(Err(ParseError::new(self.whole, offset, "a number")));
                        }
                    };

                    return Some(Ok(Token {
                        kind: TokenKind::Number(n),
                        literal,
                        offset,
                    }));
                }
                Started::Ident => {
                    let first_non_ident = cur
                        .find(|c: char| !c.is_ascii_alphanumeric())
                        .unwrap_or(cur.len());

                    let literal = &cur[..first_non_ident];
                    self.advance(literal.len() - c.len_utf8());

                    return Some(Ok(Token {
                        kind: TokenKind::Ident,
                        literal,
                        offset,
                    }));
                }
                Started::Arg => {
                    // `_` and its digit may be separated by whitespace: `_ 1`
                    let trimmed = self.rest.len()
                        - self.rest.trim_start_matches(|c: char| c.is_ascii_whitespace()).len();
                    self.advance(trimmed);

                    let Some(digit) = self.rest.chars().next().and_then(|d| d.to_digit(10)) else {
                        return Some(Err(ParseError::new(
                            self.whole,
                            self.byte,
                            "a digit after `_`",
                        )));
                    };
                    self.advance(1);

                    return Some(Ok(Token {
                        kind: TokenKind::Arg(digit as u8),
                        literal: &cur[..self.byte - offset],
                        offset,
                    }));
                }
                Started::IfNextElse(next, yes, no) => {
                    if self.rest.starts_with(next) {
                        self.advance(next.len_utf8());
                        return Some(Ok(Token {
                            kind: yes,
                            literal: &cur[..c.len_utf8() + next.len_utf8()],
                            offset,
                        }));
                    }
                    match no {
                        Some(kind) => return process(kind),
                        None => {
                            return Some(Err(ParseError::new(
                                self.whole,
                                offset,
                                format!("`{c}{next}`"),
                            )));
                        }
                    }
                }
            }
        }
    }
}

/// Length of the numeric literal at the start of `s`, or 0 if there is none.
///
/// Accepts `12`, `1.5`, `1.`, `.5`, each optionally followed by an exponent.
/// The exponent is only taken when at least one digit follows `e`.
fn number_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let int = digits_from(0);
    let mut len = int;
    let mut frac = 0;
    if bytes.get(len) == Some(&b'.') {
        frac = digits_from(len + 1);
        len += 1 + frac;
    }
    if int == 0 && frac == 0 {
        return 0;
    }

    if matches!(bytes.get(len), Some(b'e' | b'E')) {
        let mut exp = len + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            len = exp + exp_digits;
        }
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .map(|token| token.map(|token| token.kind))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn two_character_operators_win() {
        assert_eq!(
            kinds("<= < >= > != ! == && ||"),
            vec![
                TokenKind::LessEqual,
                TokenKind::Less,
                TokenKind::GreaterEqual,
                TokenKind::Greater,
                TokenKind::BangEqual,
                TokenKind::Bang,
                TokenKind::EqualEqual,
                TokenKind::AndAnd,
                TokenKind::OrOr,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("12 1.5 3. .25 1e3 2.5E-1"),
            vec![
                TokenKind::Number(12.0),
                TokenKind::Number(1.5),
                TokenKind::Number(3.0),
                TokenKind::Number(0.25),
                TokenKind::Number(1000.0),
                TokenKind::Number(0.25),
            ]
        );
    }

    #[test]
    fn exponent_needs_digits() {
        assert_eq!(
            kinds("2e"),
            vec![TokenKind::Number(2.0), TokenKind::Ident]
        );
        assert_eq!(number_len("1e+"), 1);
        assert_eq!(number_len("."), 0);
    }

    #[test]
    fn names_and_arguments() {
        assert_eq!(
            kinds("log10(_1) _ 9"),
            vec![
                TokenKind::Ident,
                TokenKind::LeftParen,
                TokenKind::Arg(1),
                TokenKind::RightParen,
                TokenKind::Arg(9),
            ]
        );
    }

    #[test]
    fn offsets_skip_whitespace() {
        let tokens: Vec<_> = Lexer::new("  1 +\t_2")
            .collect::<Result<_, _>>()
            .unwrap();
        let offsets: Vec<_> = tokens.iter().map(|token| token.offset).collect();
        assert_eq!(offsets, vec![2, 4, 6]);
        assert_eq!(tokens[2].literal, "_2");
    }

    #[test]
    fn inf_and_nan_are_names() {
        assert_eq!(kinds("inf nan"), vec![TokenKind::Ident, TokenKind::Ident]);
        let tokens: Vec<_> = Lexer::new("nan").collect::<Result<_, _>>().unwrap();
        assert_eq!(tokens[0].literal, "nan");
    }

    #[test]
    fn unexpected_character() {
        let err = Lexer::new("1 $ 2").nth(1).unwrap().unwrap_err();
        assert_eq!(err.position(), 2);
        assert_eq!(err.remainder(), "$ 2");
    }

    #[test]
    fn lone_ampersand() {
        let err = Lexer::new("1 & 2").nth(1).unwrap().unwrap_err();
        assert_eq!(err.expected(), "`&&`");
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn underscore_without_digit() {
        let err = Lexer::new("_x").next().unwrap().unwrap_err();
        assert_eq!(err.expected(), "a digit after `_`");
        assert_eq!(err.position(), 1);
    }

    #[test]
    fn display() {
        let tokens: Vec<_> = Lexer::new("1.5 <= 2")
            .map(|token| token.unwrap().to_string())
            .collect();
        assert_eq!(
            tokens,
            vec!["NUMBER 1.5 1.5", "LESS_EQUAL <= null", "NUMBER 2 2.0"]
        );
    }
}
