//
// TOKENIZATION SECTION
//

use std::fmt;

use log::debug;

use crate::error::{Error, Result};

/// Where a NOT sits relative to its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    /// `!A`, `~A`
    Prefix,
    /// `A'`
    Postfix,
}

/// Binary operators, all left-associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    And,
    Xor,
    Or,
}

impl BinOp {
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::And => 3,
            BinOp::Xor => 2,
            BinOp::Or => 1,
        }
    }

    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            BinOp::And => a && b,
            BinOp::Xor => a != b,
            BinOp::Or => a || b,
        }
    }
}

/// Precedence shared by both NOT forms.
pub const NOT_PRECEDENCE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Single uppercase variable name.
    Var(char),
    Const(bool),
    Not(Fixity),
    Bin(BinOp),
    LParen,
    RParen,
}

impl Token {
    /// Operator precedence, `None` for operands and parentheses.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            Token::Not(_) => Some(NOT_PRECEDENCE),
            Token::Bin(op) => Some(op.precedence()),
            _ => None,
        }
    }

    /// True if an operand can end with this token.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            Token::Var(_) | Token::Const(_) | Token::Not(Fixity::Postfix) | Token::RParen
        )
    }

    /// True if an operand can start with this token.
    pub fn begins_operand(&self) -> bool {
        matches!(
            self,
            Token::Var(_) | Token::Const(_) | Token::LParen | Token::Not(Fixity::Prefix)
        )
    }
}

/// Whether an implicit AND belongs between `prev` and `next`.
///
/// A missing token on either side never calls for one.
pub fn implicit_and(prev: Option<&Token>, next: Option<&Token>) -> bool {
    prev.map_or(false, Token::ends_operand) && next.map_or(false, Token::begins_operand)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Var(name) => write!(f, "{}", name),
            Token::Const(value) => write!(f, "{}", u8::from(*value)),
            Token::Not(Fixity::Prefix) => write!(f, "!"),
            Token::Not(Fixity::Postfix) => write!(f, "'"),
            Token::Bin(BinOp::And) => write!(f, "&"),
            Token::Bin(BinOp::Xor) => write!(f, "^"),
            Token::Bin(BinOp::Or) => write!(f, "+"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

/// Formats a token sequence space-separated, e.g. `A B ' &`.
pub fn format_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenizes the input string and returns a list of tokens.
///
/// Whitespace is dropped before scanning, so error positions count
/// non-whitespace characters only.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let src: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < src.len() {
        let ch = src[pos];
        pos += 1;
        match ch {
            '0' | '1' => {
                tokens.push(Token::Const(ch == '1'));
                pos = apostrophes(&src, pos, &mut tokens);
            }
            c if c.is_ascii_alphabetic() => {
                tokens.push(Token::Var(c.to_ascii_uppercase()));
                pos = apostrophes(&src, pos, &mut tokens);
            }
            '(' => tokens.push(Token::LParen),
            ')' => {
                tokens.push(Token::RParen);
                pos = apostrophes(&src, pos, &mut tokens);
            }
            '!' | '~' => tokens.push(Token::Not(Fixity::Prefix)),
            '&' | '*' | '.' => tokens.push(Token::Bin(BinOp::And)),
            '+' | '|' => tokens.push(Token::Bin(BinOp::Or)),
            '^' => tokens.push(Token::Bin(BinOp::Xor)),
            _ => return Err(Error::UnexpectedChar { ch, pos: pos - 1 }),
        }
    }
    debug!("tokenize: {} tokens [{}]", tokens.len(), format_tokens(&tokens));
    Ok(tokens)
}

/// Consumes a run of `'` starting at `pos`; an odd run becomes one postfix NOT.
fn apostrophes(src: &[char], mut pos: usize, tokens: &mut Vec<Token>) -> usize {
    let start = pos;
    while src.get(pos) == Some(&'\'') {
        pos += 1;
    }
    if (pos - start) % 2 == 1 {
        tokens.push(Token::Not(Fixity::Postfix));
    }
    pos
}

/// Distinct variables of a token sequence, sorted.
pub fn variables(tokens: &[Token]) -> Vec<char> {
    let mut vars: Vec<char> = tokens
        .iter()
        .filter_map(|tok| match tok {
            Token::Var(name) => Some(*name),
            _ => None,
        })
        .collect();
    vars.sort_unstable();
    vars.dedup();
    vars
}
