#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The DPLL solver core and the DIMACS formats it reads and writes.

pub mod assignment;
pub mod clause;
pub mod cnf;
pub mod dimacs;
pub mod dpll;
pub mod literal;
pub mod propagation;
pub mod solver;
pub mod targets;
pub mod trail;
pub mod variable_selection;
