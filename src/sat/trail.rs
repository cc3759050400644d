#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The trail: an undo-log of every assignment made on the current branch.
//!
//! Search keeps one `Assignment` and one `Trail`. Before trying a branch the
//! controller records `len()`; abandoning the branch calls `backtrack_to`,
//! which unassigns everything pushed since. Sibling branches therefore never
//! see each other's assignments, without copying the assignment per call.

use crate::sat::assignment::{Assignment, Valuation};
use crate::sat::literal::Literal;
use std::ops::Index;

/// Why a literal was put on the trail.
#[derive(Debug, Clone, PartialEq, Eq, Default, Copy, Hash, PartialOrd, Ord)]
pub enum Reason {
    #[default]
    Decision,
    Unit,
    Pure,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Step {
    pub lit: Literal,
    pub decision_level: usize,
    pub reason: Reason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail {
    t: Vec<Step>,
}

impl Index<usize> for Trail {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.t[index]
    }
}

impl Trail {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.t.iter()
    }

    /// The most recently assigned literal on this branch.
    #[must_use]
    pub fn last_literal(&self) -> Option<Literal> {
        self.t.last().map(|s| s.lit)
    }

    #[must_use]
    pub fn decision_level(&self) -> usize {
        self.t.last().map_or(0, |s| s.decision_level)
    }

    /// Assigns `lit` and records it. The variable must be unassigned.
    pub fn push(
        &mut self,
        assignment: &mut Assignment,
        lit: Literal,
        decision_level: usize,
        reason: Reason,
    ) {
        debug_assert!(
            !assignment.is_assigned(lit.variable()),
            "variable {} assigned twice on one branch",
            lit.variable()
        );

        assignment.assign(lit);
        self.t.push(Step {
            lit,
            decision_level,
            reason,
        });
    }

    /// Unassigns every literal pushed after the trail had length `len`.
    pub fn backtrack_to(&mut self, assignment: &mut Assignment, len: usize) {
        for step in self.t.drain(len.min(self.t.len())..) {
            assignment.unassign(step.lit.variable());
        }
    }

    pub fn clear(&mut self, assignment: &mut Assignment) {
        self.backtrack_to(assignment, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backtrack_only_removes_newer_steps() {
        let mut a = Assignment::new();
        let mut trail = Trail::new();

        trail.push(&mut a, Literal::from(1), 0, Reason::Unit);
        trail.push(&mut a, Literal::from(-2), 1, Reason::Decision);
        let mark = trail.len();
        trail.push(&mut a, Literal::from(3), 1, Reason::Pure);
        trail.push(&mut a, Literal::from(-4), 2, Reason::Decision);

        assert_eq!(trail.last_literal(), Some(Literal::from(-4)));
        assert_eq!(trail.decision_level(), 2);

        trail.backtrack_to(&mut a, mark);

        assert_eq!(trail.len(), 2);
        assert_eq!(a.var_value(1), Some(true));
        assert_eq!(a.var_value(2), Some(false));
        assert_eq!(a.var_value(3), None);
        assert_eq!(a.var_value(4), None);
        assert_eq!(trail.last_literal(), Some(Literal::from(-2)));
        assert_eq!(trail[1].reason, Reason::Decision);
    }

    #[test]
    fn test_clear_empties_assignment() {
        let mut a = Assignment::new();
        let mut trail = Trail::new();
        trail.push(&mut a, Literal::from(5), 0, Reason::Unit);
        trail.clear(&mut a);
        assert!(trail.is_empty());
        assert!(a.is_empty());
    }
}
