#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Partial assignments used during search and the total models returned from it.

use crate::sat::literal::{Literal, Variable};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use std::fmt;

/// Anything that can report the truth value of a literal.
///
/// Unassigned variables yield `None`. Both the live `Assignment` and a
/// persisted `Solutions` implement this, so clause checks work on either.
pub trait Valuation {
    fn var_value(&self, var: Variable) -> Option<bool>;

    fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.var_value(lit.variable()).map(|b| lit.evaluate(b))
    }

    fn is_assigned(&self, var: Variable) -> bool {
        self.var_value(var).is_some()
    }
}

/// A partial mapping from variable to truth value.
///
/// The search controller owns exactly one of these and pairs it with a
/// `Trail`, so that retracting a branch restores the parent's view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(FxHashMap<Variable, bool>);

impl Assignment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(n: usize) -> Self {
        Self(FxHashMap::with_capacity_and_hasher(n, Default::default()))
    }

    /// Makes `lit` true.
    pub fn assign(&mut self, lit: Literal) {
        self.0.insert(lit.variable(), lit.polarity());
    }

    pub fn unassign(&mut self, var: Variable) {
        self.0.remove(&var);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (Variable, bool)> + '_ {
        self.0.iter().map(|(&v, &b)| (v, b))
    }
}

impl Valuation for Assignment {
    fn var_value(&self, var: Variable) -> Option<bool> {
        self.0.get(&var).copied()
    }
}

impl FromIterator<Literal> for Assignment {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        let mut assignment = Self::new();
        for lit in iter {
            assignment.assign(lit);
        }
        assignment
    }
}

/// A model: one literal per variable, sorted by variable.
///
/// Produced by a successful search and immutable from then on. It is also
/// what a solution file decodes to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Solutions(Vec<Literal>);

impl Solutions {
    /// Collects `literals` into a model.
    ///
    /// # Errors
    ///
    /// Returns the offending variable if both polarities of it occur.
    pub fn from_literals<I: IntoIterator<Item = Literal>>(literals: I) -> Result<Self, Variable> {
        let mut lits = literals.into_iter().collect_vec();
        lits.sort_unstable();
        lits.dedup();

        if let Some((a, _)) = lits
            .iter()
            .tuple_windows()
            .find(|(a, b)| a.variable() == b.variable())
        {
            return Err(a.variable());
        }

        Ok(Self(lits))
    }

    /// Reads every variable of `variables` from `assignment`, setting the
    /// unassigned ones to false.
    #[must_use]
    pub fn complete(assignment: &Assignment, variables: &[Variable]) -> Self {
        let mut lits = variables
            .iter()
            .map(|&v| Literal::new(v, assignment.var_value(v).unwrap_or(false)))
            .collect_vec();
        lits.sort_unstable();
        lits.dedup();
        Self(lits)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.0.iter()
    }

    /// Variables set to true, in ascending order.
    pub fn positives(&self) -> impl Iterator<Item = Literal> + '_ {
        self.0.iter().copied().filter(|l| l.polarity())
    }

    /// Variables set to false, in ascending order.
    pub fn negatives(&self) -> impl Iterator<Item = Literal> + '_ {
        self.0.iter().copied().filter(|l| l.is_negated())
    }
}

impl Valuation for Solutions {
    fn var_value(&self, var: Variable) -> Option<bool> {
        self.0
            .binary_search_by_key(&var, |l| l.variable())
            .ok()
            .map(|i| self.0[i].polarity())
    }
}

impl fmt::Display for Solutions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}
