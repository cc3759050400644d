//! A DPLL SAT solver with pluggable branching heuristics, and a Sudoku
//! encoder that turns N×N puzzles into CNF for it.

/// The `sat` module implements the solver: formulas, simplification,
/// propagation, the branching heuristics and the DPLL search itself.
pub mod sat;

/// The `sudoku` module encodes Sudoku puzzles as CNF and decodes solver
/// models back into filled grids.
pub mod sudoku;
