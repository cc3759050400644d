#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Variables and signed literals.
//!
//! A variable is an opaque positive integer. Puzzle encoders give the digits
//! meaning (row, column, value), but nothing in the search engine looks
//! inside a variable beyond comparing and hashing it.

use core::fmt;
use core::ops::{Neg, Not};

/// A Boolean variable identifier. Always non-zero.
pub type Variable = u32;

/// A variable together with a polarity.
///
/// Literals are ordered by variable first and polarity second, so `-3 < 3 < -4`.
/// Heuristics rely on this order to break ties deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Literal {
    variable: Variable,
    polarity: bool,
}

impl Literal {
    #[must_use]
    pub const fn new(variable: Variable, polarity: bool) -> Self {
        Self { variable, polarity }
    }

    /// Builds a literal from its DIMACS representation. `value` must not be zero.
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        debug_assert!(value != 0, "0 is the DIMACS terminator, not a literal");
        Self::new(value.unsigned_abs(), value.is_positive())
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.variable
    }

    /// `true` for the positive literal `x`, `false` for `-x`.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.polarity
    }

    #[must_use]
    pub const fn is_negated(self) -> bool {
        !self.polarity
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self::new(self.variable, !self.polarity)
    }

    /// Whether `other` is the same variable with the opposite polarity.
    #[must_use]
    pub const fn is_complement_of(self, other: Self) -> bool {
        self.variable == other.variable && self.polarity != other.polarity
    }

    /// The value this literal evaluates to when its variable is set to `value`.
    #[must_use]
    pub const fn evaluate(self, value: bool) -> bool {
        value == self.polarity
    }

    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn to_i32(self) -> i32 {
        let var = self.variable as i32;
        if self.polarity { var } else { -var }
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}

impl From<Literal> for i32 {
    fn from(literal: Literal) -> Self {
        literal.to_i32()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_i32())
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Neg for &Literal {
    type Output = Literal;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}
