#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Formula simplification: substitution of an assignment, unit propagation
//! and pure-literal elimination.
//!
//! `simplify` is plain Boolean substitution. A clause with a true literal is
//! dropped, false literals are dropped from their clause, and an all-false
//! clause stays behind as the empty clause so the caller sees the conflict.
//!
//! `Propagator::propagate` repeats unit propagation and pure-literal
//! elimination, re-simplifying after every round, until neither applies or a
//! conflict shows up. Units are exhausted before pure literals are looked at.

use crate::sat::assignment::{Assignment, Valuation};
use crate::sat::clause::Clause;
use crate::sat::literal::Literal;
use crate::sat::targets;
use crate::sat::trail::{Reason, Trail};
use itertools::Itertools;
use rustc_hash::FxHashSet;

/// Substitutes `assignment` into `clauses`.
///
/// Clauses that reduce to the same literal set are collapsed, since a
/// formula is a set of clauses.
#[must_use]
pub fn simplify(clauses: &[Clause], assignment: &Assignment) -> Vec<Clause> {
    clauses
        .iter()
        .filter_map(|c| c.reduce(assignment))
        .unique()
        .collect()
}

/// Literals whose complement occurs in no clause, ascending.
///
/// A variable that does not occur at all yields nothing. Literals over
/// assigned variables are ignored.
#[must_use]
pub fn pure_literals(clauses: &[Clause], assignment: &Assignment) -> Vec<Literal> {
    let occurring: FxHashSet<Literal> = clauses
        .iter()
        .flat_map(|c| c.iter().copied())
        .filter(|l| !assignment.is_assigned(l.variable()))
        .collect();

    occurring
        .iter()
        .copied()
        .filter(|l| !occurring.contains(&l.negated()))
        .sorted()
        .collect()
}

/// The state of the formula once propagation has stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Propagation {
    /// Some clause was falsified.
    Conflict,
    /// No unit clause and no pure literal remain. An empty vector means every
    /// clause is satisfied.
    Stable(Vec<Clause>),
}

/// Runs unit propagation and pure-literal elimination, counting what it assigns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagator {
    pub unit_propagations: usize,
    pub pure_literals: usize,
}

impl Propagator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Propagates to a fixed point.
    ///
    /// Every forced literal is pushed to `trail` at `decision_level`, so the
    /// caller can retract all of them with a single `Trail::backtrack_to`.
    pub fn propagate(
        &mut self,
        clauses: Vec<Clause>,
        assignment: &mut Assignment,
        trail: &mut Trail,
        decision_level: usize,
    ) -> Propagation {
        let mut clauses = clauses;

        loop {
            if clauses.iter().any(Clause::is_empty) {
                log::trace!(target: targets::PROPAGATION, "Empty clause at level {decision_level}");
                return Propagation::Conflict;
            }

            if clauses.is_empty() {
                return Propagation::Stable(clauses);
            }

            if self.assign_units(&clauses, assignment, trail, decision_level) > 0 {
                clauses = simplify(&clauses, assignment);
                continue;
            }

            let pures = pure_literals(&clauses, assignment);
            if pures.is_empty() {
                return Propagation::Stable(clauses);
            }

            for &lit in &pures {
                debug_assert!(
                    !clauses.iter().any(|c| c.contains(lit.negated())),
                    "literal {lit} eliminated as pure but its complement is still present"
                );
                log::trace!(target: targets::PROPAGATION, "Pure literal {lit}");
                trail.push(assignment, lit, decision_level, Reason::Pure);
            }
            self.pure_literals += pures.len();
            clauses = simplify(&clauses, assignment);
        }
    }

    /// Assigns the literal of every unit clause. When two unit clauses
    /// disagree only the first is assigned; the other becomes empty on the
    /// next simplification.
    fn assign_units(
        &mut self,
        clauses: &[Clause],
        assignment: &mut Assignment,
        trail: &mut Trail,
        decision_level: usize,
    ) -> usize {
        let mut assigned = 0;

        for lit in clauses.iter().filter_map(Clause::unit_literal) {
            if assignment.is_assigned(lit.variable()) {
                continue;
            }
            log::trace!(target: targets::PROPAGATION, "Unit {lit}");
            trail.push(assignment, lit, decision_level, Reason::Unit);
            assigned += 1;
        }

        self.unit_propagations += assigned;
        assigned
    }
}
