//
// PARSER SECTION (operator precedence, infix to postfix)
//

use log::debug;

use crate::error::{Error, Result};
use crate::token::{format_tokens, implicit_and, BinOp, Fixity, Token};

/// Splices an AND between every pair of tokens where one operand ends and
/// the next begins, so `AB` reads as `A & B`.
pub fn insert_implicit_and(tokens: &[Token]) -> Vec<Token> {
    let mut expanded = Vec::with_capacity(tokens.len() * 2);
    for (i, tok) in tokens.iter().enumerate() {
        expanded.push(*tok);
        if implicit_and(Some(tok), tokens.get(i + 1)) {
            expanded.push(Token::Bin(BinOp::And));
        }
    }
    expanded
}

/// Converts infix tokens into postfix order.
///
/// Precedence from highest: NOT, AND, XOR, OR. Binary operators are
/// left-associative.
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<Token>> {
    let expanded = insert_implicit_and(tokens);
    let mut output = Vec::with_capacity(expanded.len());
    let mut stack: Vec<Token> = Vec::new();

    for tok in expanded {
        match tok {
            Token::Var(_) | Token::Const(_) | Token::Not(Fixity::Postfix) => output.push(tok),
            Token::Not(Fixity::Prefix) | Token::LParen => stack.push(tok),
            Token::Bin(op) => {
                while let Some(&top) = stack.last() {
                    match top.precedence() {
                        // Every binary operator is left-associative, so ties pop too.
                        Some(p) if p >= op.precedence() => {
                            output.push(top);
                            stack.pop();
                        }
                        _ => break,
                    }
                }
                stack.push(tok);
            }
            Token::RParen => loop {
                match stack.pop() {
                    Some(Token::LParen) => break,
                    Some(top) => output.push(top),
                    None => return Err(Error::UnmatchedClose),
                }
            },
        }
    }

    while let Some(top) = stack.pop() {
        if top == Token::LParen {
            return Err(Error::UnclosedOpen);
        }
        output.push(top);
    }

    debug!("to_postfix: [{}]", format_tokens(&output));
    Ok(output)
}
