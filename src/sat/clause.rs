//! Clauses: disjunctions of literals.
//!
//! A clause is stored as a sorted, duplicate-free list of literals, so two
//! clauses with the same literal set compare equal regardless of the order
//! they were written in.

use crate::sat::assignment::Valuation;
use crate::sat::literal::Literal;
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt;

/// Inline storage for clause literals. Puzzle clauses are short, the long
/// cell clauses of a 16x16 board spill to the heap.
pub type LiteralStorage = SmallVec<[Literal; 8]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Clause {
    literals: LiteralStorage,
}

impl Clause {
    pub fn new<I: IntoIterator<Item = Literal>>(literals: I) -> Self {
        let mut literals: LiteralStorage = literals.into_iter().collect();
        literals.sort_unstable();
        literals.dedup();
        Self { literals }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// The single literal of a unit clause.
    #[must_use]
    pub fn unit_literal(&self) -> Option<Literal> {
        match self.literals.as_slice() {
            [lit] => Some(*lit),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    #[must_use]
    pub fn contains(&self, lit: Literal) -> bool {
        self.literals.binary_search(&lit).is_ok()
    }

    /// A clause holding both a literal and its complement is always true.
    /// Literals are sorted by variable, so complements sit next to each other.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .tuple_windows()
            .any(|(a, b)| a.is_complement_of(*b))
    }

    /// Strict satisfaction: some literal must evaluate to true. Unassigned
    /// literals never count.
    pub fn is_satisfied_by<V: Valuation>(&self, valuation: &V) -> bool {
        self.literals
            .iter()
            .any(|&lit| valuation.literal_value(lit) == Some(true))
    }

    /// Substitutes `valuation` into the clause.
    ///
    /// Returns `None` if the clause is satisfied. Otherwise returns the clause
    /// with every falsified literal removed, which is empty when all of them
    /// were falsified.
    pub fn reduce<V: Valuation>(&self, valuation: &V) -> Option<Self> {
        let mut literals = LiteralStorage::new();
        for &lit in &self.literals {
            match valuation.literal_value(lit) {
                Some(true) => return None,
                Some(false) => {}
                None => literals.push(lit),
            }
        }
        Some(Self { literals })
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<i32>> for Clause {
    fn from(literals: Vec<i32>) -> Self {
        Self::new(literals.into_iter().map(Literal::from))
    }
}

impl From<&[i32]> for Clause {
    fn from(literals: &[i32]) -> Self {
        Self::new(literals.iter().copied().map(Literal::from))
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lit in &self.literals {
            write!(f, "{lit} ")?;
        }
        write!(f, "0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::Assignment;

    fn assignment(lits: &[i32]) -> Assignment {
        lits.iter().copied().map(Literal::from).collect()
    }

    #[test]
    fn test_new_sorts_and_dedups() {
        let clause = Clause::from(vec![3, -1, 3, 2]);
        assert_eq!(clause.len(), 3);
        assert_eq!(clause, Clause::from(vec![2, -1, 3]));
        assert_eq!(clause.to_string(), "-1 2 3 0");
    }

    #[test]
    fn test_unit_and_empty() {
        assert_eq!(Clause::from(vec![-4]).unit_literal(), Some(Literal::from(-4)));
        assert_eq!(Clause::from(vec![-4, 5]).unit_literal(), None);
        assert!(Clause::default().is_empty());
        assert_eq!(Clause::default().to_string(), "0");
    }

    #[test]
    fn test_tautology() {
        assert!(Clause::from(vec![1, 2, -1]).is_tautology());
        assert!(!Clause::from(vec![1, 2, -3]).is_tautology());
    }

    #[test]
    fn test_reduce_drops_satisfied_clause() {
        let clause = Clause::from(vec![1, -2, 3]);
        assert_eq!(clause.reduce(&assignment(&[-2])), None);
    }

    #[test]
    fn test_reduce_removes_falsified_literals_only() {
        let clause = Clause::from(vec![1, -2, 3]);
        assert_eq!(
            clause.reduce(&assignment(&[-1, 2])),
            Some(Clause::from(vec![3]))
        );
        assert_eq!(clause.reduce(&assignment(&[-1, 2, -3])), Some(Clause::default()));
        assert_eq!(clause.reduce(&assignment(&[7])), Some(clause.clone()));
    }

    #[test]
    fn test_strict_satisfaction() {
        let clause = Clause::from(vec![1, 2]);
        assert!(!clause.is_satisfied_by(&assignment(&[])));
        assert!(!clause.is_satisfied_by(&assignment(&[-1])));
        assert!(clause.is_satisfied_by(&assignment(&[-1, 2])));
    }

    #[test]
    fn test_contains_is_polarity_sensitive() {
        let clause = Clause::from(vec![-12, 40]);
        assert!(clause.contains(Literal::from(40)));
        assert!(clause.contains(Literal::from(-12)));
        assert!(!clause.contains(Literal::from(12)));
    }
}
