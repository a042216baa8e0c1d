//
// POSTFIX EVALUATION
//

use crate::context::Env;
use crate::error::{Error, Result};
use crate::token::Token;

/// Evaluates a postfix sequence against `env`.
///
/// A variable missing from `env` reads as false.
pub fn evaluate(postfix: &[Token], env: &Env) -> Result<bool> {
    let mut stack: Vec<bool> = Vec::with_capacity(postfix.len());
    for tok in postfix {
        match *tok {
            Token::Const(value) => stack.push(value),
            Token::Var(name) => stack.push(env.get(name).unwrap_or(false)),
            Token::Not(_) => {
                let a = stack.pop().ok_or(Error::MissingOperand(*tok))?;
                stack.push(!a);
            }
            Token::Bin(op) => {
                let (Some(b), Some(a)) = (stack.pop(), stack.pop()) else {
                    return Err(Error::MissingOperand(*tok));
                };
                stack.push(op.apply(a, b));
            }
            // to_postfix never emits these
            Token::LParen | Token::RParen => return Err(Error::InvalidExpression(stack.len())),
        }
    }
    match stack.as_slice() {
        [value] => Ok(*value),
        _ => Err(Error::InvalidExpression(stack.len())),
    }
}
