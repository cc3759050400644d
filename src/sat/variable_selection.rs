#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Decision heuristics: which literal to branch on when propagation stalls.
//!
//! Three strategies implement `VariableSelection`. A solve picks one through
//! the `Heuristic` tag, which `to_impl` turns into a `VariableSelectionImpls`
//! value. The controller holds that value and never needs to know which
//! strategy is inside.
//!
//! Ties are always broken towards the smallest literal in `Literal`'s order
//! (variable first, negative before positive).

use crate::sat::assignment::{Assignment, Valuation};
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use clap::ValueEnum;
use rustc_hash::FxHashMap;
use std::fmt;

pub trait VariableSelection {
    /// Picks a literal over an unassigned variable.
    ///
    /// `clauses` is the current simplified formula, non-empty and free of
    /// empty clauses. `last` is the most recently assigned literal on the
    /// current branch. Returns `None` only if no clause has a literal left.
    fn pick(
        &self,
        clauses: &[Clause],
        assignment: &Assignment,
        last: Option<Literal>,
    ) -> Option<Literal>;
}

/// Picks the literal with the highest count, ties going to the smallest literal.
fn most_frequent(counts: &FxHashMap<Literal, usize>) -> Option<Literal> {
    counts
        .iter()
        .max_by(|(la, ca), (lb, cb)| ca.cmp(cb).then_with(|| lb.cmp(la)))
        .map(|(&lit, _)| lit)
}

/// Lexicographic order: the smallest variable still in play, negative polarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedOrder;

impl VariableSelection for FixedOrder {
    fn pick(&self, clauses: &[Clause], assignment: &Assignment, _: Option<Literal>) -> Option<Literal> {
        clauses
            .iter()
            .flat_map(Clause::iter)
            .map(|l| l.variable())
            .filter(|&v| !assignment.is_assigned(v))
            .min()
            .map(|v| Literal::new(v, false))
    }
}

/// The literal occurring most often across the remaining clauses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxOccurrence;

impl VariableSelection for MaxOccurrence {
    fn pick(&self, clauses: &[Clause], assignment: &Assignment, _: Option<Literal>) -> Option<Literal> {
        let mut counts = FxHashMap::default();
        for &lit in clauses.iter().flat_map(Clause::iter) {
            if !assignment.is_assigned(lit.variable()) {
                *counts.entry(lit).or_insert(0usize) += 1;
            }
        }
        most_frequent(&counts)
    }
}

/// Prefers literals that share clauses with the last assignment.
///
/// Looks at the original clauses mentioning the last assigned variable that
/// are not yet satisfied, and counts their other unassigned literals. The
/// most frequent one wins. With no last literal, or when none of those
/// clauses has an open literal left, it falls back to `FixedOrder`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborLocality {
    clauses: Vec<Clause>,
    occurrences: FxHashMap<Variable, Vec<usize>>,
}

impl NeighborLocality {
    #[must_use]
    pub fn new(cnf: &Cnf) -> Self {
        let mut occurrences: FxHashMap<Variable, Vec<usize>> = FxHashMap::default();
        for (i, clause) in cnf.iter().enumerate() {
            for lit in clause.iter() {
                occurrences.entry(lit.variable()).or_default().push(i);
            }
        }

        Self {
            clauses: cnf.clauses.clone(),
            occurrences,
        }
    }

    fn neighbours(&self, assignment: &Assignment, last: Literal) -> FxHashMap<Literal, usize> {
        let mut counts = FxHashMap::default();
        let Some(indices) = self.occurrences.get(&last.variable()) else {
            return counts;
        };

        for clause in indices.iter().map(|&i| &self.clauses[i]) {
            if clause.is_satisfied_by(assignment) {
                continue;
            }
            for &lit in clause.iter() {
                if lit.variable() != last.variable() && !assignment.is_assigned(lit.variable()) {
                    *counts.entry(lit).or_insert(0usize) += 1;
                }
            }
        }
        counts
    }
}

impl VariableSelection for NeighborLocality {
    fn pick(
        &self,
        clauses: &[Clause],
        assignment: &Assignment,
        last: Option<Literal>,
    ) -> Option<Literal> {
        last.and_then(|last| most_frequent(&self.neighbours(assignment, last)))
            .or_else(|| FixedOrder.pick(clauses, assignment, None))
    }
}

/// The heuristic a solve runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Heuristic {
    /// Plain DPLL: branch on the smallest variable.
    #[default]
    #[value(name = "dpll", alias = "lexicographic")]
    Lexicographic,
    /// Branch on the most frequent literal.
    #[value(name = "max-occurrence", alias = "frequency")]
    MaxOccurrence,
    /// Branch next to the last assignment.
    #[value(name = "neighbor", alias = "neighbour")]
    NeighborLocality,
}

impl Heuristic {
    pub const ALL: [Self; 3] = [Self::Lexicographic, Self::MaxOccurrence, Self::NeighborLocality];

    #[must_use]
    pub fn to_impl(self, cnf: &Cnf) -> VariableSelectionImpls {
        match self {
            Self::Lexicographic => VariableSelectionImpls::FixedOrder(FixedOrder),
            Self::MaxOccurrence => VariableSelectionImpls::MaxOccurrence(MaxOccurrence),
            Self::NeighborLocality => {
                VariableSelectionImpls::NeighborLocality(NeighborLocality::new(cnf))
            }
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexicographic => write!(f, "dpll"),
            Self::MaxOccurrence => write!(f, "max-occurrence"),
            Self::NeighborLocality => write!(f, "neighbor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableSelectionImpls {
    FixedOrder(FixedOrder),
    MaxOccurrence(MaxOccurrence),
    NeighborLocality(NeighborLocality),
}

impl VariableSelection for VariableSelectionImpls {
    fn pick(
        &self,
        clauses: &[Clause],
        assignment: &Assignment,
        last: Option<Literal>,
    ) -> Option<Literal> {
        match self {
            Self::FixedOrder(s) => s.pick(clauses, assignment, last),
            Self::MaxOccurrence(s) => s.pick(clauses, assignment, last),
            Self::NeighborLocality(s) => s.pick(clauses, assignment, last),
        }
    }
}
