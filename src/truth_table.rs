//
// TRUTH TABLE GENERATION
//

use std::collections::BTreeSet;

use crate::context::{Env, VarContext};
use crate::error::Result;
use crate::eval::evaluate;
use crate::token::Token;

/// What decides the output column.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// Evaluate a postfix sequence on every row.
    Expression(&'a [Token]),
    /// Output is 1 exactly for the listed minterms.
    Minterms(&'a BTreeSet<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub m: usize,
    pub env: Env,
    pub y: bool,
}

/// All `2^n` rows of a function, in ascending minterm order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthTable {
    context: VarContext,
    rows: Vec<Row>,
}

impl TruthTable {
    pub fn build(context: VarContext, source: Source<'_>) -> Result<Self> {
        let rows = (0..context.size())
            .map(|m| -> Result<Row> {
                let env = context.env(m);
                let y = match source {
                    Source::Expression(postfix) => evaluate(postfix, &env)?,
                    Source::Minterms(set) => set.contains(&m),
                };
                Ok(Row { m, env, y })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(TruthTable { context, rows })
    }

    pub fn context(&self) -> VarContext {
        self.context
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Output column as a vector indexed by minterm.
    pub fn outputs(&self) -> Vec<bool> {
        self.rows.iter().map(|row| row.y).collect()
    }

    /// Rows with output 1, ascending.
    pub fn minterms(&self) -> Vec<usize> {
        self.rows.iter().filter(|row| row.y).map(|row| row.m).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::to_postfix;
    use crate::token::tokenize;

    use test_log::test;

    fn ctx(n: usize) -> VarContext {
        VarContext::new(n).unwrap()
    }

    #[test]
    fn test_rows_ascending_and_complete() {
        let postfix = to_postfix(&tokenize("A").unwrap()).unwrap();
        let table = TruthTable::build(ctx(4), Source::Expression(&postfix)).unwrap();
        assert_eq!(table.rows().len(), 16);
        for (i, row) in table.rows().iter().enumerate() {
            assert_eq!(row.m, i);
            assert_eq!(row.env, ctx(4).env(i));
        }
        assert_eq!(table.minterms(), (8..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_expression_minterms() {
        let postfix = to_postfix(&tokenize("A'B + AC").unwrap()).unwrap();
        let table = TruthTable::build(ctx(3), Source::Expression(&postfix)).unwrap();
        assert_eq!(table.minterms(), vec![2, 3, 5, 7]);

        let postfix = to_postfix(&tokenize("A(B+C)").unwrap()).unwrap();
        let table = TruthTable::build(ctx(3), Source::Expression(&postfix)).unwrap();
        assert_eq!(table.minterms(), vec![5, 6, 7]);
    }

    #[test]
    fn test_minterm_membership() {
        let set: BTreeSet<usize> = [0, 3].into_iter().collect();
        let table = TruthTable::build(ctx(2), Source::Minterms(&set)).unwrap();
        assert_eq!(table.outputs(), vec![true, false, false, true]);
        assert_eq!(table.minterms(), vec![0, 3]);
    }

    #[test]
    fn test_empty_minterms_all_zero() {
        let table = TruthTable::build(ctx(3), Source::Minterms(&BTreeSet::new())).unwrap();
        assert_eq!(table.rows().len(), 8);
        assert!(table.rows().iter().all(|row| !row.y));
    }

    #[test]
    fn test_evaluation_error_propagates() {
        let postfix = to_postfix(&tokenize("A+").unwrap()).unwrap();
        let err = TruthTable::build(ctx(2), Source::Expression(&postfix)).unwrap_err();
        assert!(matches!(err, Error::MissingOperand(_)));
    }
}
