#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Sudoku puzzles as SAT problems.

/// Puzzle parsing, the CNF encoding and decoding of solver models.
pub mod solver;
