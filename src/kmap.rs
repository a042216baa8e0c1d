//
// KARNAUGH MAP STATE AND LAYOUT
//

use std::collections::BTreeSet;
use std::fmt;

use crate::context::VarContext;
use crate::error::{Error, Result};
use crate::qm::{minimize_pos, minimize_sop, Form, Minimized};
use crate::truth_table::{Source, TruthTable};

/// Value of one K-Map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Off,
    On,
    DontCare,
}

impl Cell {
    /// Next value in the edit cycle `0 -> 1 -> d -> 0`.
    pub fn cycle(self) -> Cell {
        match self {
            Cell::Off => Cell::On,
            Cell::On => Cell::DontCare,
            Cell::DontCare => Cell::Off,
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Cell::Off),
            1 => Ok(Cell::On),
            2 => Ok(Cell::DontCare),
            _ => Err(Error::InvalidCell(value)),
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        match cell {
            Cell::Off => 0,
            Cell::On => 1,
            Cell::DontCare => 2,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Off => write!(f, "0"),
            Cell::On => write!(f, "1"),
            Cell::DontCare => write!(f, "d"),
        }
    }
}

/// Editable cell state keyed by minterm index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KMap {
    context: VarContext,
    cells: Vec<Cell>,
}

impl KMap {
    pub fn new(context: VarContext) -> Self {
        KMap {
            context,
            cells: vec![Cell::Off; context.size()],
        }
    }

    /// Builds a map from raw `0/1/2` values, one per minterm.
    pub fn from_cells(context: VarContext, values: &[u8]) -> Result<Self> {
        if values.len() != context.size() {
            return Err(Error::CellCount {
                expected: context.size(),
                actual: values.len(),
            });
        }
        let cells = values
            .iter()
            .map(|&v| Cell::try_from(v))
            .collect::<Result<Vec<_>>>()?;
        Ok(KMap { context, cells })
    }

    pub fn context(&self) -> VarContext {
        self.context
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.cells.len() {
            Ok(())
        } else {
            Err(Error::CellOutOfRange {
                index,
                size: self.cells.len(),
            })
        }
    }

    pub fn cell(&self, index: usize) -> Result<Cell> {
        self.check(index)?;
        Ok(self.cells[index])
    }

    pub fn set(&mut self, index: usize, cell: Cell) -> Result<()> {
        self.check(index)?;
        self.cells[index] = cell;
        Ok(())
    }

    /// Advances one cell through its edit cycle and returns the new value.
    pub fn toggle(&mut self, index: usize) -> Result<Cell> {
        self.check(index)?;
        let next = self.cells[index].cycle();
        self.cells[index] = next;
        Ok(next)
    }

    /// Turns the listed cells on and every other cell off.
    ///
    /// Indices outside the map are ignored.
    pub fn paint(&mut self, minterms: &[usize]) {
        self.cells.fill(Cell::Off);
        for &m in minterms {
            if let Some(cell) = self.cells.get_mut(m) {
                *cell = Cell::On;
            }
        }
    }

    pub fn reset(&mut self) {
        self.cells.fill(Cell::Off);
    }

    fn indices_of(&self, value: Cell) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == value)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn minterms(&self) -> Vec<usize> {
        self.indices_of(Cell::On)
    }

    pub fn dont_cares(&self) -> Vec<usize> {
        self.indices_of(Cell::DontCare)
    }

    pub fn maxterms(&self) -> Vec<usize> {
        self.indices_of(Cell::Off)
    }

    /// Minterms and don't-cares together, ascending.
    pub fn export(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell != Cell::Off)
            .map(|(i, _)| i)
            .collect()
    }

    /// Truth table with don't-cares read as 0.
    pub fn truth_table(&self) -> Result<TruthTable> {
        let on: BTreeSet<usize> = self.minterms().into_iter().collect();
        TruthTable::build(self.context, Source::Minterms(&on))
    }

    pub fn simplify(&self, form: Form) -> Minimized {
        let dont_cares = self.dont_cares();
        match form {
            Form::Sop => minimize_sop(&self.minterms(), &dont_cares, self.context),
            Form::Pos => minimize_pos(&self.maxterms(), &dont_cares, self.context),
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.context)
    }

    /// Cell values arranged row by row as they appear on the map.
    pub fn grid(&self) -> Vec<Vec<Cell>> {
        let layout = self.layout();
        (0..layout.rows())
            .map(|r| {
                (0..layout.cols())
                    .map(|c| self.cells[layout.index(r, c)])
                    .collect()
            })
            .collect()
    }
}

const GRAY1: [usize; 2] = [0, 1];
const GRAY2: [usize; 4] = [0, 1, 3, 2];

/// Gray-coded grid placement of a context's minterms.
///
/// Rows carry the leading variables, columns the trailing ones, so any two
/// neighbouring cells differ in exactly one bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    context: VarContext,
    row_vars: usize,
}

impl Layout {
    pub fn new(context: VarContext) -> Self {
        let row_vars = if context.count() == 4 { 2 } else { 1 };
        Layout { context, row_vars }
    }

    fn col_vars(&self) -> usize {
        self.context.count() - self.row_vars
    }

    fn gray(vars: usize) -> &'static [usize] {
        if vars == 2 {
            &GRAY2
        } else {
            &GRAY1
        }
    }

    pub fn rows(&self) -> usize {
        Self::gray(self.row_vars).len()
    }

    pub fn cols(&self) -> usize {
        Self::gray(self.col_vars()).len()
    }

    pub fn row_names(&self) -> &'static [char] {
        &self.context.names()[..self.row_vars]
    }

    pub fn col_names(&self) -> &'static [char] {
        &self.context.names()[self.row_vars..]
    }

    /// Axis labels such as `00, 01, 11, 10`.
    pub fn row_labels(&self) -> Vec<String> {
        Self::labels(self.row_vars)
    }

    pub fn col_labels(&self) -> Vec<String> {
        Self::labels(self.col_vars())
    }

    fn labels(vars: usize) -> Vec<String> {
        Self::gray(vars)
            .iter()
            .map(|&code| format!("{:0width$b}", code, width = vars))
            .collect()
    }

    /// Minterm shown at grid position (`row`, `col`).
    pub fn index(&self, row: usize, col: usize) -> usize {
        let r = Self::gray(self.row_vars)[row];
        let c = Self::gray(self.col_vars())[col];
        (r << self.col_vars()) | c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn ctx(n: usize) -> VarContext {
        VarContext::new(n).unwrap()
    }

    #[test]
    fn test_cell_cycle() {
        assert_eq!(Cell::Off.cycle(), Cell::On);
        assert_eq!(Cell::On.cycle(), Cell::DontCare);
        assert_eq!(Cell::DontCare.cycle(), Cell::Off);
    }

    #[test]
    fn test_cell_conversions() {
        assert_eq!(Cell::try_from(2), Ok(Cell::DontCare));
        assert_eq!(Cell::try_from(3), Err(Error::InvalidCell(3)));
        assert_eq!(u8::from(Cell::On), 1);
    }

    #[test]
    fn test_from_cells_validates() {
        assert_eq!(
            KMap::from_cells(ctx(2), &[0, 1, 2]),
            Err(Error::CellCount {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            KMap::from_cells(ctx(2), &[0, 1, 2, 7]),
            Err(Error::InvalidCell(7))
        );
        let kmap = KMap::from_cells(ctx(2), &[0, 1, 2, 1]).unwrap();
        assert_eq!(kmap.minterms(), vec![1, 3]);
        assert_eq!(kmap.dont_cares(), vec![2]);
        assert_eq!(kmap.maxterms(), vec![0]);
        assert_eq!(kmap.export(), vec![1, 2, 3]);
    }

    #[test]
    fn test_toggle_and_bounds() {
        let mut kmap = KMap::new(ctx(3));
        assert_eq!(kmap.toggle(5), Ok(Cell::On));
        assert_eq!(kmap.toggle(5), Ok(Cell::DontCare));
        assert_eq!(kmap.cell(5), Ok(Cell::DontCare));
        assert_eq!(
            kmap.toggle(8),
            Err(Error::CellOutOfRange { index: 8, size: 8 })
        );
    }

    #[test]
    fn test_paint_clears_dont_cares() {
        let mut kmap = KMap::new(ctx(2));
        kmap.set(0, Cell::DontCare).unwrap();
        kmap.paint(&[1, 2, 9]);
        assert_eq!(kmap.cells(), &[Cell::Off, Cell::On, Cell::On, Cell::Off]);
        kmap.reset();
        assert!(kmap.minterms().is_empty());
    }

    #[test]
    fn test_simplify_both_forms() {
        let kmap = KMap::from_cells(ctx(3), &[1, 1, 1, 1, 2, 2, 0, 0]).unwrap();
        assert_eq!(kmap.simplify(Form::Sop).expression, "A'");
        assert_eq!(kmap.simplify(Form::Pos).expression, "A'");
    }

    #[test]
    fn test_truth_table_ignores_dont_cares() {
        let kmap = KMap::from_cells(ctx(2), &[0, 2, 1, 0]).unwrap();
        assert_eq!(kmap.truth_table().unwrap().minterms(), vec![2]);
    }

    #[test]
    fn test_layout_three_vars() {
        let layout = Layout::new(ctx(3));
        assert_eq!(layout.row_names(), &['A']);
        assert_eq!(layout.col_names(), &['B', 'C']);
        assert_eq!(layout.col_labels(), vec!["00", "01", "11", "10"]);
        let first_row: Vec<usize> = (0..layout.cols()).map(|c| layout.index(0, c)).collect();
        assert_eq!(first_row, vec![0, 1, 3, 2]);
        assert_eq!(layout.index(1, 3), 6);
    }

    #[test]
    fn test_layout_four_vars() {
        let layout = Layout::new(ctx(4));
        assert_eq!((layout.rows(), layout.cols()), (4, 4));
        assert_eq!(layout.row_labels(), vec!["00", "01", "11", "10"]);
        assert_eq!(layout.index(2, 2), 15);
        assert_eq!(layout.index(3, 1), 9);
    }

    #[test]
    fn test_layout_neighbours_differ_by_one_bit() {
        for n in 2..=4 {
            let layout = Layout::new(ctx(n));
            for r in 0..layout.rows() {
                for c in 0..layout.cols() {
                    let here = layout.index(r, c);
                    let right = layout.index(r, (c + 1) % layout.cols());
                    let down = layout.index((r + 1) % layout.rows(), c);
                    if layout.cols() > 1 && right != here {
                        assert_eq!((here ^ right).count_ones(), 1);
                    }
                    if down != here {
                        assert_eq!((here ^ down).count_ones(), 1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_grid_two_vars() {
        let kmap = KMap::from_cells(ctx(2), &[0, 1, 2, 0]).unwrap();
        let grid = kmap.grid();
        assert_eq!(
            grid,
            vec![vec![Cell::Off, Cell::On], vec![Cell::DontCare, Cell::Off]]
        );
    }
}
