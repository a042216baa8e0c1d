//
// SESSION (evaluate, import, edit)
//

use std::collections::BTreeSet;

use log::{debug, info};

use crate::context::{VarContext, MAX_CELLS};
use crate::error::{Error, Result};
use crate::kmap::{Cell, KMap};
use crate::parser::to_postfix;
use crate::qm::{Form, Minimized};
use crate::token::{tokenize, variables, Token};
use crate::truth_table::{Source, TruthTable};

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub tokens: Vec<Token>,
    pub postfix: Vec<Token>,
    pub table: TruthTable,
    pub minimized: Minimized,
}

/// Result of importing a minterm list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Imported minterms, sorted and deduplicated.
    pub minterms: Vec<usize>,
    /// Don't-cares actually marked; entries also listed as minterms are dropped.
    pub dont_cares: Vec<usize>,
    pub table: TruthTable,
    pub minimized: Minimized,
}

/// Parses a comma and/or whitespace separated list of minterm indices.
///
/// Returns them sorted without duplicates. Any value above 15 is rejected,
/// including digit strings too long to fit a `u64`.
pub fn parse_minterms(text: &str) -> Result<Vec<usize>> {
    let values = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| match part.parse::<u64>() {
            Ok(value) => Ok(value),
            Err(_) if part.bytes().all(|b| b.is_ascii_digit()) => {
                Err(Error::MintermTooLarge(part.to_string()))
            }
            Err(_) => Err(Error::InvalidMinterm(part.to_string())),
        })
        .collect::<Result<Vec<u64>>>()?;
    if let Some(&max) = values.iter().max() {
        if max >= MAX_CELLS as u64 {
            return Err(Error::MintermTooLarge(max.to_string()));
        }
    }
    let set: BTreeSet<usize> = values.into_iter().map(|v| v as usize).collect();
    Ok(set.into_iter().collect())
}

/// Caller-owned state: the current K-Map plus the last compiled expression.
///
/// Every operation either completes and updates the session, or fails and
/// leaves it exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    kmap: KMap,
    postfix: Option<Vec<Token>>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(VarContext::default())
    }
}

impl Session {
    pub fn new(context: VarContext) -> Self {
        Session {
            kmap: KMap::new(context),
            postfix: None,
        }
    }

    pub fn context(&self) -> VarContext {
        self.kmap.context()
    }

    pub fn kmap(&self) -> &KMap {
        &self.kmap
    }

    /// Postfix form of the last evaluated expression, dropped once cells are edited.
    pub fn postfix(&self) -> Option<&[Token]> {
        self.postfix.as_deref()
    }

    /// Evaluates `expr`, deriving the variable count from the variables it uses.
    pub fn evaluate(&mut self, expr: &str) -> Result<Evaluation> {
        let fallback = self.context();
        self.compile(expr, |vars| VarContext::derive(vars, fallback))
    }

    /// Evaluates `expr` over an explicitly chosen context.
    pub fn evaluate_with(&mut self, expr: &str, context: VarContext) -> Result<Evaluation> {
        self.compile(expr, |_| context)
    }

    fn compile(
        &mut self,
        expr: &str,
        choose: impl FnOnce(&[char]) -> VarContext,
    ) -> Result<Evaluation> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(Error::EmptyExpression);
        }
        let tokens = tokenize(expr)?;
        let vars = variables(&tokens);
        let context = choose(&vars);
        debug!("evaluate: variables {:?}, context ({})", vars, context);

        let undeclared: Vec<char> = vars
            .iter()
            .copied()
            .filter(|&v| !context.contains(v))
            .collect();
        if !undeclared.is_empty() {
            return Err(Error::UndeclaredVariables {
                vars: undeclared,
                context,
            });
        }

        let postfix = to_postfix(&tokens)?;
        let table = TruthTable::build(context, Source::Expression(&postfix))?;
        let mut kmap = KMap::new(context);
        kmap.paint(&table.minterms());
        let minimized = kmap.simplify(Form::Sop);
        info!("{} => {}", expr, minimized.expression);

        self.kmap = kmap;
        self.postfix = Some(postfix.clone());
        Ok(Evaluation {
            tokens,
            postfix,
            table,
            minimized,
        })
    }

    /// Imports a minterm list, sizing the map from its largest entry.
    ///
    /// An empty list keeps the current size and clears the map.
    pub fn import(&mut self, text: &str) -> Result<Import> {
        self.import_with_dont_cares(text, "", None)
    }

    /// Imports a minterm list into a map of the given size.
    pub fn import_with(&mut self, text: &str, context: VarContext) -> Result<Import> {
        self.import_with_dont_cares(text, "", Some(context))
    }

    /// Imports minterms and don't-cares together.
    ///
    /// Without an explicit `context` the map is sized from the largest index
    /// in either list. An index in both lists stays a minterm.
    pub fn import_with_dont_cares(
        &mut self,
        minterms: &str,
        dont_cares: &str,
        context: Option<VarContext>,
    ) -> Result<Import> {
        let minterms = parse_minterms(minterms)?;
        let dont_cares: Vec<usize> = parse_minterms(dont_cares)?
            .into_iter()
            .filter(|m| minterms.binary_search(m).is_err())
            .collect();
        let max = minterms.last().into_iter().chain(dont_cares.last()).max().copied();

        let context = match (context, max) {
            (Some(ctx), Some(max)) if max >= ctx.size() => {
                return Err(Error::CellOutOfRange {
                    index: max,
                    size: ctx.size(),
                });
            }
            (Some(ctx), _) => ctx,
            (None, Some(max)) => VarContext::for_minterm(max as u64)?,
            (None, None) => self.context(),
        };

        let mut kmap = KMap::new(context);
        kmap.paint(&minterms);
        for &m in &dont_cares {
            kmap.set(m, Cell::DontCare)?;
        }
        let table = kmap.truth_table()?;
        let minimized = kmap.simplify(Form::Sop);
        info!(
            "import {:?} d{:?} => {}",
            minterms, dont_cares, minimized.expression
        );
        if context != self.context() {
            debug!("import: resizing map to {} variables", context.count());
        }

        self.kmap = kmap;
        self.postfix = None;
        Ok(Import {
            minterms,
            dont_cares,
            table,
            minimized,
        })
    }

    /// Marks the listed OFF cells as don't-care; cells already ON stay minterms.
    ///
    /// Returns the cells that changed. Nothing is marked if any index is
    /// outside the current map.
    pub fn mark_dont_cares(&mut self, text: &str) -> Result<Vec<usize>> {
        let mut kmap = self.kmap.clone();
        let mut marked = Vec::new();
        for m in parse_minterms(text)? {
            if kmap.cell(m)? == Cell::Off {
                kmap.set(m, Cell::DontCare)?;
                marked.push(m);
            }
        }
        if !marked.is_empty() {
            self.kmap = kmap;
            self.postfix = None;
        }
        Ok(marked)
    }

    pub fn simplify(&self, form: Form) -> Minimized {
        self.kmap.simplify(form)
    }

    pub fn truth_table(&self) -> Result<TruthTable> {
        self.kmap.truth_table()
    }

    pub fn toggle(&mut self, index: usize) -> Result<Cell> {
        let cell = self.kmap.toggle(index)?;
        self.postfix = None;
        Ok(cell)
    }

    pub fn set(&mut self, index: usize, cell: Cell) -> Result<()> {
        self.kmap.set(index, cell)?;
        self.postfix = None;
        Ok(())
    }

    /// Clears every cell, keeping the variable count.
    pub fn reset(&mut self) {
        self.kmap.reset();
        self.postfix = None;
    }

    /// Starts over with an empty map of a (possibly) different size.
    pub fn clear(&mut self, context: VarContext) {
        *self = Session::new(context);
    }

    pub fn minterms(&self) -> Vec<usize> {
        self.kmap.minterms()
    }

    pub fn dont_cares(&self) -> Vec<usize> {
        self.kmap.dont_cares()
    }

    /// Minterms and don't-cares as a comma-separated list, e.g. `1,3,4`.
    pub fn export(&self) -> String {
        self.kmap
            .export()
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}
