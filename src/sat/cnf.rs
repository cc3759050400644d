#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The original formula handed to the solver, and the verifier that checks
//! models against it.

use crate::sat::assignment::Valuation;
use crate::sat::clause::Clause;
use crate::sat::literal::Variable;
use crate::sat::targets;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use std::fmt;

/// A formula in conjunctive normal form.
///
/// Construction drops tautologies and collapses duplicate clauses. The
/// variable set still includes variables that only occurred in dropped
/// tautologies, since a model has to cover every variable of the input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    pub clauses: Vec<Clause>,
    /// Every variable of the input, ascending.
    pub variables: Vec<Variable>,
    pub num_vars: usize,
    /// Total number of literals over the kept clauses.
    pub num_literals: usize,
}

impl Cnf {
    pub fn new<I: IntoIterator<Item = Clause>>(clauses: I) -> Self {
        let mut variables = FxHashSet::default();
        let mut seen = FxHashSet::default();
        let mut kept = Vec::new();
        let mut tautologies = 0usize;

        for clause in clauses {
            variables.extend(clause.iter().map(|l| l.variable()));

            if clause.is_tautology() {
                tautologies += 1;
                continue;
            }

            if seen.insert(clause.clone()) {
                kept.push(clause);
            }
        }

        if tautologies > 0 {
            log::debug!(target: targets::DIMACS, "Dropped {tautologies} tautological clauses");
        }

        let variables = variables.into_iter().sorted_unstable().collect_vec();
        let num_literals = kept.iter().map(Clause::len).sum();

        Self {
            num_vars: variables.len(),
            variables,
            clauses: kept,
            num_literals,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn max_variable(&self) -> Variable {
        self.variables.last().copied().unwrap_or(0)
    }

    /// Side length of the puzzle this formula encodes, assuming one variable
    /// per (row, column, value) triple: `round(|variables|^(1/3))`.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn puzzle_dimension(&self) -> usize {
        (self.num_vars as f64).cbrt().round() as usize
    }

    /// Checks that `valuation` satisfies every clause. Unassigned variables
    /// never satisfy a literal.
    pub fn verify<V: Valuation>(&self, valuation: &V) -> bool {
        verify(&self.clauses, valuation)
    }

    /// The clauses `valuation` leaves unsatisfied.
    pub fn unsatisfied_clauses<'a, V: Valuation>(
        &'a self,
        valuation: &'a V,
    ) -> impl Iterator<Item = &'a Clause> + 'a {
        self.clauses
            .iter()
            .filter(move |c| !c.is_satisfied_by(valuation))
    }
}

/// Checks that every clause has at least one literal made true by `valuation`.
pub fn verify<V: Valuation>(clauses: &[Clause], valuation: &V) -> bool {
    clauses.iter().all(|c| c.is_satisfied_by(valuation))
}

impl From<Vec<Vec<i32>>> for Cnf {
    fn from(clauses: Vec<Vec<i32>>) -> Self {
        Self::new(clauses.into_iter().map(Clause::from))
    }
}

impl From<Vec<Clause>> for Cnf {
    fn from(clauses: Vec<Clause>) -> Self {
        Self::new(clauses)
    }
}

impl FromIterator<Clause> for Cnf {
    fn from_iter<T: IntoIterator<Item = Clause>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.max_variable(), self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(f, "{clause}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::{Assignment, Solutions};
    use crate::sat::literal::Literal;

    #[test]
    fn test_new_drops_tautologies_keeps_their_variables() {
        let cnf = Cnf::from(vec![vec![1, -1, 9], vec![2, 3], vec![3, 2]]);
        assert_eq!(cnf.len(), 1);
        assert_eq!(cnf.variables, vec![1, 2, 3, 9]);
        assert_eq!(cnf.num_vars, 4);
        assert_eq!(cnf.num_literals, 2);
    }

    #[test]
    fn test_verify_is_strict() {
        let cnf = Cnf::from(vec![vec![1, 2], vec![-1, 3]]);
        let partial: Assignment = [Literal::from(2)].into_iter().collect();
        assert!(!cnf.verify(&partial));

        let total = Solutions::from_literals([1, -2, 3].into_iter().map(Literal::from))
            .expect("consistent literals");
        assert!(cnf.verify(&total));

        let wrong = Solutions::from_literals([1, 2, -3].into_iter().map(Literal::from))
            .expect("consistent literals");
        assert!(!cnf.verify(&wrong));
        assert_eq!(
            cnf.unsatisfied_clauses(&wrong).cloned().collect_vec(),
            vec![Clause::from(vec![-1, 3])]
        );
    }

    #[test]
    fn test_puzzle_dimension() {
        let clauses = (1..=64).map(|v| vec![v]).collect_vec();
        assert_eq!(Cnf::from(clauses).puzzle_dimension(), 4);

        let clauses = (1..=729).map(|v| vec![v]).collect_vec();
        assert_eq!(Cnf::from(clauses).puzzle_dimension(), 9);
    }

    #[test]
    fn test_display_is_dimacs() {
        let cnf = Cnf::from(vec![vec![1, -2], vec![]]);
        assert_eq!(cnf.to_string(), "p cnf 2 2\n1 -2 0\n0\n");
    }
}
