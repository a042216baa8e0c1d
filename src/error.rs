//
// ERROR TYPES
//

use thiserror::Error;

use crate::context::VarContext;
use crate::token::Token;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the core reports back to the caller.
///
/// Messages are meant to be shown to the user as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("expression is empty")]
    EmptyExpression,

    /// Unrecognized character; `pos` is the 0-based offset after whitespace removal.
    #[error("unrecognized character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unbalanced parenthesis: ')' without a matching '('")]
    UnmatchedClose,

    #[error("unbalanced parenthesis: '(' is never closed")]
    UnclosedOpen,

    #[error(
        "variable(s) '{}' not in the {}-variable context ({})",
        join(.vars),
        .context.count(),
        .context
    )]
    UndeclaredVariables { vars: Vec<char>, context: VarContext },

    #[error("operator '{0}' is missing operands")]
    MissingOperand(Token),

    #[error("invalid expression: evaluation ended with {0} values on the stack")]
    InvalidExpression(usize),

    /// Carries the entry as written, so values beyond `u64` report verbatim.
    #[error("minterm {0} is too large (max 15)")]
    MintermTooLarge(String),

    #[error("invalid minterm '{0}'")]
    InvalidMinterm(String),

    #[error("unsupported variable count {0} (expected 2 to 4)")]
    VarCount(usize),

    #[error("cell {index} is outside the {size}-cell map")]
    CellOutOfRange { index: usize, size: usize },

    #[error("invalid cell value {0} (expected 0, 1 or 2)")]
    InvalidCell(u8),

    #[error("expected {expected} cells, got {actual}")]
    CellCount { expected: usize, actual: usize },
}

fn join(vars: &[char]) -> String {
    vars.iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
