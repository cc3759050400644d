//! Log targets used across the solver, for filtering with `RUST_LOG`.

pub const PROPAGATION: &str = "propagation";
pub const DECISION: &str = "decision";
pub const SEARCH: &str = "search";
pub const DIMACS: &str = "dimacs";
pub const SUDOKU: &str = "sudoku";
