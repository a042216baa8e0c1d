//
// QUINE–MCCLUSKEY ALGORITHM
//

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::context::VarContext;

/// Converts a number to a binary string with the specified width.
fn to_binary_string(num: usize, width: usize) -> String {
    format!("{:0width$b}", num, width = width)
}

/// A product term over `{0, 1, -}`, one position per variable.
///
/// `origin` lists the minterms and don't-cares merged into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Implicant {
    term: String,
    origin: Vec<usize>,
}

impl Implicant {
    pub fn from_minterm(m: usize, width: usize) -> Self {
        Implicant {
            term: to_binary_string(m, width),
            origin: vec![m],
        }
    }

    /// The implicant covering every assignment.
    pub fn tautology(width: usize) -> Self {
        Implicant {
            term: "-".repeat(width),
            origin: (0..1 << width).collect(),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn origin(&self) -> &[usize] {
        &self.origin
    }

    pub fn is_tautology(&self) -> bool {
        self.term.bytes().all(|b| b == b'-')
    }

    /// Returns whether every fixed position matches the bits of `m`.
    pub fn covers(&self, m: usize) -> bool {
        let width = self.term.len();
        self.term.bytes().enumerate().all(|(i, b)| {
            let bit = (m >> (width - 1 - i)) & 1;
            match b {
                b'0' => bit == 0,
                b'1' => bit == 1,
                _ => true,
            }
        })
    }

    fn ones(&self) -> usize {
        self.term.bytes().filter(|&b| b == b'1').count()
    }

    /// Attempts to combine two terms; if they differ by exactly one fixed
    /// bit, returns the combined term.
    fn combine(&self, other: &Implicant) -> Option<Implicant> {
        let mut diff_count = 0;
        let mut combined = String::with_capacity(self.term.len());
        for (c1, c2) in self.term.chars().zip(other.term.chars()) {
            if c1 == c2 {
                combined.push(c1);
            } else if c1 != '-' && c2 != '-' {
                diff_count += 1;
                combined.push('-');
            } else {
                return None;
            }
        }
        if diff_count != 1 {
            return None;
        }
        let mut origin = self.origin.clone();
        origin.extend(&other.origin);
        origin.sort_unstable();
        origin.dedup();
        Some(Implicant {
            term: combined,
            origin,
        })
    }

    /// Presentation order: position by position, `0 < 1 < -`.
    fn cmp_terms(&self, other: &Implicant) -> Ordering {
        fn rank(b: u8) -> u8 {
            match b {
                b'0' => 0,
                b'1' => 1,
                _ => 2,
            }
        }
        self.term
            .bytes()
            .map(rank)
            .cmp(other.term.bytes().map(rank))
    }

    /// Fixed positions as `(variable, polarity)` pairs.
    fn literals<'a>(&'a self, context: VarContext) -> impl Iterator<Item = (char, bool)> + 'a {
        self.term
            .chars()
            .zip(context.names())
            .filter_map(|(bit, &name)| match bit {
                '1' => Some((name, true)),
                '0' => Some((name, false)),
                _ => None,
            })
    }
}

impl fmt::Display for Implicant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.term)
    }
}

/// Groups level entries by the number of `1`s, keeping their order.
fn group_by_ones(level: &[Implicant]) -> BTreeMap<usize, Vec<usize>> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, imp) in level.iter().enumerate() {
        groups.entry(imp.ones()).or_default().push(i);
    }
    groups
}

/// Quine–McCluskey algorithm: returns the prime implicants of `terms`
/// (minterms together with don't-cares).
///
/// Terms are processed in ascending order, so the returned list is
/// reproducible: level by level, popcount group by group, discovery order
/// within a group.
pub fn prime_implicants(terms: &[usize], width: usize) -> Vec<Implicant> {
    let terms: BTreeSet<usize> = terms.iter().copied().collect();
    let mut level: Vec<Implicant> = terms
        .iter()
        .map(|&m| Implicant::from_minterm(m, width))
        .collect();
    let mut primes: Vec<Implicant> = Vec::new();

    while !level.is_empty() {
        let groups = group_by_ones(&level);
        let mut used = vec![false; level.len()];
        let mut next: Vec<Implicant> = Vec::new();

        for (&ones, lower) in &groups {
            let Some(upper) = groups.get(&(ones + 1)) else {
                continue;
            };
            for &i in lower {
                for &j in upper {
                    if let Some(merged) = level[i].combine(&level[j]) {
                        trace!("combine {} + {} => {}", level[i], level[j], merged);
                        used[i] = true;
                        used[j] = true;
                        if !next.contains(&merged) {
                            next.push(merged);
                        }
                    }
                }
            }
        }

        // Terms that were not combined become prime implicants
        for &i in groups.values().flatten() {
            if !used[i] && !primes.iter().any(|p| p.term == level[i].term) {
                primes.push(level[i].clone());
            }
        }
        level = next;
    }

    debug!(
        "prime_implicants: [{}]",
        primes
            .iter()
            .map(Implicant::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    primes
}

/// For each minterm, the indices of the primes covering it.
pub fn coverage_chart(primes: &[Implicant], minterms: &[usize]) -> Vec<Vec<usize>> {
    minterms
        .iter()
        .map(|&m| {
            primes
                .iter()
                .enumerate()
                .filter(|(_, imp)| imp.covers(m))
                .map(|(j, _)| j)
                .collect()
        })
        .collect()
}

/// Primes that are the only cover of some minterm, in order of first need.
pub fn essential_indices(chart: &[Vec<usize>]) -> Vec<usize> {
    let mut essential = Vec::new();
    for row in chart {
        if let [only] = row.as_slice() {
            if !essential.contains(only) {
                essential.push(*only);
            }
        }
    }
    essential
}

/// Selects primes covering all `minterms`: essentials first, then greedily
/// the prime covering the most uncovered minterms (earliest index on ties).
///
/// Returns indices into `primes` in selection order.
pub fn select_cover(primes: &[Implicant], minterms: &[usize]) -> Vec<usize> {
    let chart = coverage_chart(primes, minterms);
    let mut chosen = essential_indices(&chart);
    let mut covered: Vec<bool> = chart
        .iter()
        .map(|row| row.iter().any(|j| chosen.contains(j)))
        .collect();
    debug!("select_cover: essential {:?}", chosen);

    while covered.iter().any(|done| !done) {
        let mut best: Option<(usize, usize)> = None;
        for j in (0..primes.len()).filter(|j| !chosen.contains(j)) {
            let gain = chart
                .iter()
                .zip(&covered)
                .filter(|(row, done)| !**done && row.contains(&j))
                .count();
            if gain > best.map_or(0, |(_, g)| g) {
                best = Some((j, gain));
            }
        }
        let Some((j, gain)) = best else {
            warn!(
                "select_cover: {} minterm(s) left uncovered",
                covered.iter().filter(|done| !**done).count()
            );
            break;
        };
        debug!("select_cover: greedy pick {} (+{})", primes[j], gain);
        chosen.push(j);
        for (row, done) in chart.iter().zip(covered.iter_mut()) {
            if row.contains(&j) {
                *done = true;
            }
        }
    }
    chosen
}

/// Which minimized form an expression is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    /// Sum of products, from the ON-set.
    Sop,
    /// Product of sums, from the OFF-set.
    Pos,
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Form::Sop => write!(f, "SOP"),
            Form::Pos => write!(f, "POS"),
        }
    }
}

/// Outcome of one minimization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minimized {
    pub form: Form,
    /// Chosen implicants, in presentation order.
    pub implicants: Vec<Implicant>,
    pub expression: String,
    pub elapsed: Duration,
}

/// Chosen implicants for the function whose ON-set is `on`.
fn solve(on: &[usize], dont_cares: &[usize], width: usize) -> Vec<Implicant> {
    let size = 1 << width;
    let in_range = |m: &usize| {
        if *m < size {
            true
        } else {
            warn!("solve: dropping index {} outside {}-cell map", m, size);
            false
        }
    };
    let on: BTreeSet<usize> = on.iter().copied().filter(in_range).collect();
    if on.is_empty() {
        return Vec::new();
    }
    let dc: BTreeSet<usize> = dont_cares
        .iter()
        .copied()
        .filter(in_range)
        .filter(|m| !on.contains(m))
        .collect();

    let terms: Vec<usize> = on.union(&dc).copied().collect();
    if terms.len() == size {
        return vec![Implicant::tautology(width)];
    }

    let primes = prime_implicants(&terms, width);
    let on: Vec<usize> = on.into_iter().collect();
    let mut chosen: Vec<Implicant> = select_cover(&primes, &on)
        .into_iter()
        .map(|j| primes[j].clone())
        .collect();
    chosen.sort_by(Implicant::cmp_terms);
    chosen
}

/// Minimizes the function with ON-set `minterms` to sum-of-products form.
pub fn minimize_sop(minterms: &[usize], dont_cares: &[usize], context: VarContext) -> Minimized {
    let start = Instant::now();
    let implicants = solve(minterms, dont_cares, context.count());
    let expression = render_sop(&implicants, context);
    debug!("minimize_sop({:?}, {:?}) => {}", minterms, dont_cares, expression);
    Minimized {
        form: Form::Sop,
        implicants,
        expression,
        elapsed: start.elapsed(),
    }
}

/// Minimizes the function with OFF-set `maxterms` to product-of-sums form.
///
/// The implicants returned are those of the complement.
pub fn minimize_pos(maxterms: &[usize], dont_cares: &[usize], context: VarContext) -> Minimized {
    let start = Instant::now();
    let implicants = solve(maxterms, dont_cares, context.count());
    let expression = render_pos(&implicants, context);
    debug!("minimize_pos({:?}, {:?}) => {}", maxterms, dont_cares, expression);
    Minimized {
        form: Form::Pos,
        implicants,
        expression,
        elapsed: start.elapsed(),
    }
}

/// Writes implicants as a sum of products, e.g. `A'B + AC`.
pub fn render_sop(implicants: &[Implicant], context: VarContext) -> String {
    if implicants.is_empty() {
        return "0".to_string();
    }
    if implicants.iter().any(Implicant::is_tautology) {
        return "1".to_string();
    }
    implicants
        .iter()
        .map(|imp| {
            imp.literals(context)
                .map(|(name, positive)| {
                    if positive {
                        name.to_string()
                    } else {
                        format!("{}'", name)
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Writes complement implicants as a product of sums, e.g. `(A + B')C`.
///
/// Each literal is inverted (De Morgan), so a `1` bit becomes a
/// complemented variable.
pub fn render_pos(implicants: &[Implicant], context: VarContext) -> String {
    if implicants.is_empty() {
        return "1".to_string();
    }
    if implicants.iter().any(Implicant::is_tautology) {
        return "0".to_string();
    }
    implicants
        .iter()
        .map(|imp| {
            let literals: Vec<String> = imp
                .literals(context)
                .map(|(name, positive)| {
                    if positive {
                        format!("{}'", name)
                    } else {
                        name.to_string()
                    }
                })
                .collect();
            if literals.len() == 1 {
                literals.join("")
            } else {
                format!("({})", literals.join(" + "))
            }
        })
        .collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn ctx(n: usize) -> VarContext {
        VarContext::new(n).unwrap()
    }

    fn terms(implicants: &[Implicant]) -> Vec<&str> {
        implicants.iter().map(Implicant::term).collect()
    }

    #[test]
    fn test_combine() {
        let a = Implicant::from_minterm(0b010, 3);
        let b = Implicant::from_minterm(0b011, 3);
        let merged = a.combine(&b).unwrap();
        assert_eq!(merged.term(), "01-");
        assert_eq!(merged.origin(), &[2, 3]);

        let far = Implicant::from_minterm(0b101, 3);
        assert_eq!(a.combine(&far), None);
        // a dash never pairs with a fixed bit
        let dashed = Implicant::from_minterm(0b101, 3)
            .combine(&Implicant::from_minterm(0b111, 3))
            .unwrap();
        assert_eq!(dashed.term(), "1-1");
        assert_eq!(merged.combine(&dashed), None);
    }

    #[test]
    fn test_covers() {
        let merged = Implicant::from_minterm(1, 3)
            .combine(&Implicant::from_minterm(5, 3))
            .unwrap();
        assert_eq!(merged.term(), "-01");
        assert!(merged.covers(1));
        assert!(merged.covers(5));
        assert!(!merged.covers(3));
        assert!(Implicant::tautology(4).covers(9));
    }

    #[test]
    fn test_prime_implicants_order() {
        let primes = prime_implicants(&[7, 5, 3, 2], 3);
        assert_eq!(terms(&primes), vec!["01-", "-11", "1-1"]);
    }

    #[test]
    fn test_prime_implicants_with_unmerged_singleton() {
        let primes = prime_implicants(&[0, 7], 3);
        assert_eq!(terms(&primes), vec!["000", "111"]);
    }

    #[test]
    fn test_prime_implicants_deduplicated() {
        let primes = prime_implicants(&[1, 3, 5, 7], 3);
        assert_eq!(terms(&primes), vec!["--1"]);
        assert_eq!(primes[0].origin(), &[1, 3, 5, 7]);
    }

    #[test]
    fn test_essential_indices() {
        let chart = vec![vec![0], vec![0, 1], vec![2], vec![1, 2], vec![2]];
        assert_eq!(essential_indices(&chart), vec![0, 2]);
    }

    #[test]
    fn test_select_cover_greedy_tie_breaks_first() {
        // Cyclic core: every minterm has two covers, no essentials.
        let minterms = [0, 1, 2, 5, 6, 7];
        let primes = prime_implicants(&minterms, 3);
        assert_eq!(primes.len(), 6);
        let chart = coverage_chart(&primes, &minterms);
        assert!(essential_indices(&chart).is_empty());
        let chosen = select_cover(&primes, &minterms);
        assert_eq!(chosen[0], 0);
        for &m in &minterms {
            assert!(chosen.iter().any(|&j| primes[j].covers(m)));
        }
    }

    #[test]
    fn test_minimize_empty() {
        let result = minimize_sop(&[], &[], ctx(3));
        assert!(result.implicants.is_empty());
        assert_eq!(result.expression, "0");
        assert_eq!(result.form, Form::Sop);
    }

    #[test]
    fn test_minimize_only_dont_cares() {
        let result = minimize_sop(&[], &[0, 1, 2, 3], ctx(2));
        assert!(result.implicants.is_empty());
        assert_eq!(result.expression, "0");
    }

    #[test]
    fn test_minimize_tautology() {
        let all: Vec<usize> = (0..8).collect();
        let result = minimize_sop(&all, &[], ctx(3));
        assert_eq!(terms(&result.implicants), vec!["---"]);
        assert_eq!(result.expression, "1");
    }

    #[test]
    fn test_minimize_tautology_through_dont_cares() {
        let result = minimize_sop(&[0], &[1, 2, 3], ctx(2));
        assert_eq!(result.expression, "1");
    }

    #[test]
    fn test_minimize_already_minimal() {
        let result = minimize_sop(&[2, 3, 5, 7], &[], ctx(3));
        assert_eq!(result.expression, "A'B + AC");
    }

    #[test]
    fn test_minimize_distributes() {
        let result = minimize_sop(&[5, 6, 7], &[], ctx(3));
        assert_eq!(result.expression, "AB + AC");
    }

    #[test]
    fn test_minimize_uses_dont_cares() {
        let result = minimize_sop(&[0, 1, 2, 3], &[4, 5], ctx(3));
        assert_eq!(result.expression, "A'");
    }

    #[test]
    fn test_minimize_xor_has_no_merges() {
        let result = minimize_sop(&[1, 2], &[], ctx(2));
        assert_eq!(result.expression, "A'B + AB'");
    }

    #[test]
    fn test_minimize_drops_out_of_range() {
        let result = minimize_sop(&[3, 20], &[], ctx(2));
        assert_eq!(result.expression, "AB");
    }

    #[test]
    fn test_minimize_pos() {
        // F = A(B+C): zeros at 0..=4
        let result = minimize_pos(&[0, 1, 2, 3, 4], &[], ctx(3));
        assert_eq!(result.form, Form::Pos);
        assert_eq!(result.expression, "A(B + C)");
    }

    #[test]
    fn test_pos_boundaries() {
        assert_eq!(minimize_pos(&[], &[], ctx(2)).expression, "1");
        assert_eq!(minimize_pos(&[0, 1, 2, 3], &[], ctx(2)).expression, "0");
    }

    #[test]
    fn test_render_sop_and_pos_literals() {
        let imp = Implicant::from_minterm(0b10, 2);
        assert_eq!(render_sop(&[imp.clone()], ctx(2)), "AB'");
        assert_eq!(render_pos(&[imp], ctx(2)), "(A' + B)");
    }

    #[test]
    fn test_render_tautology_wins() {
        let imps = [Implicant::from_minterm(1, 2), Implicant::tautology(2)];
        assert_eq!(render_sop(&imps, ctx(2)), "1");
        assert_eq!(render_pos(&imps, ctx(2)), "0");
    }
}
