//
// VARIABLE CONTEXTS
//

use std::fmt;

use crate::error::{Error, Result};

/// Smallest supported variable count.
pub const MIN_VARS: usize = 2;
/// Largest supported variable count.
pub const MAX_VARS: usize = 4;
/// Number of cells in the largest map.
pub const MAX_CELLS: usize = 1 << MAX_VARS;

const NAMES: [char; MAX_VARS] = ['A', 'B', 'C', 'D'];

/// Ordered set of variables a function is defined over.
///
/// Always a prefix of `A, B, C, D`. The first variable is the most
/// significant bit of a minterm index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarContext {
    count: usize,
}

impl VarContext {
    pub fn new(count: usize) -> Result<Self> {
        if (MIN_VARS..=MAX_VARS).contains(&count) {
            Ok(VarContext { count })
        } else {
            Err(Error::VarCount(count))
        }
    }

    /// Picks the context for the variables found in an expression.
    ///
    /// `D` forces four variables, `C` three, anything else two. Without any
    /// variable the `fallback` context is kept.
    pub fn derive(vars: &[char], fallback: VarContext) -> Self {
        let count = if vars.is_empty() {
            fallback.count
        } else if vars.contains(&'D') {
            4
        } else if vars.contains(&'C') {
            3
        } else {
            2
        };
        VarContext { count }
    }

    /// Picks the smallest context whose map holds `max` as a minterm index.
    pub fn for_minterm(max: u64) -> Result<Self> {
        match max {
            0..=3 => Ok(VarContext { count: 2 }),
            4..=7 => Ok(VarContext { count: 3 }),
            8..=15 => Ok(VarContext { count: 4 }),
            _ => Err(Error::MintermTooLarge(max.to_string())),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of assignments (`2^n`).
    pub fn size(&self) -> usize {
        1 << self.count
    }

    pub fn names(&self) -> &'static [char] {
        &NAMES[..self.count]
    }

    pub fn index_of(&self, var: char) -> Option<usize> {
        self.names().iter().position(|&name| name == var)
    }

    pub fn contains(&self, var: char) -> bool {
        self.index_of(var).is_some()
    }

    /// Decodes minterm `m` into an assignment over this context.
    pub fn env(&self, m: usize) -> Env {
        let mut values = [false; MAX_VARS];
        for (i, value) in values.iter_mut().take(self.count).enumerate() {
            *value = (m >> (self.count - 1 - i)) & 1 == 1;
        }
        Env {
            values,
            len: self.count,
        }
    }
}

impl Default for VarContext {
    fn default() -> Self {
        VarContext { count: 3 }
    }
}

impl fmt::Display for VarContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.names().iter().map(char::to_string).collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Assignment of a boolean to each variable, indexed `A = 0`, `B = 1`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Env {
    values: [bool; MAX_VARS],
    len: usize,
}

impl Env {
    /// Builds an assignment from explicit values; extra values beyond four are ignored.
    pub fn from_values(values: &[bool]) -> Self {
        let len = values.len().min(MAX_VARS);
        let mut env = Env {
            values: [false; MAX_VARS],
            len,
        };
        env.values[..len].copy_from_slice(&values[..len]);
        env
    }

    /// Value of `var`, or `None` when the variable is not part of this assignment.
    pub fn get(&self, var: char) -> Option<bool> {
        let index = (var as u32).checked_sub('A' as u32)? as usize;
        if index < self.len {
            Some(self.values[index])
        } else {
            None
        }
    }

    pub fn values(&self) -> &[bool] {
        &self.values[..self.len]
    }
}
