//! Types shared between the search controller and its callers.

use crate::sat::variable_selection::Heuristic;
use std::fmt;
use std::time::Duration;

/// How a solve should run. Chosen once, before search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverOptions {
    pub heuristic: Heuristic,
    /// Abort with `SolveError::DeadlineExceeded` once this much time has passed.
    pub timeout: Option<Duration>,
}

impl SolverOptions {
    #[must_use]
    pub fn new(heuristic: Heuristic) -> Self {
        Self {
            heuristic,
            timeout: None,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Counters collected over one solve. Instrumentation only, search never reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SolutionStats {
    /// Branches that ended in a conflict, plus decision points where both values failed.
    pub backtracks: usize,
    pub decisions: usize,
    pub unit_propagations: usize,
    pub pure_literals: usize,
    /// Deepest decision level reached.
    pub max_depth: usize,
}

/// Ways a solve can fail. An unsatisfiable formula is not one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    DeadlineExceeded(Duration),
    /// A model did not satisfy the original formula. This is a solver bug.
    VerificationMismatch { unsatisfied: usize },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineExceeded(limit) => {
                write!(f, "search exceeded its deadline of {:.3}s", limit.as_secs_f64())
            }
            Self::VerificationMismatch { unsatisfied } => write!(
                f,
                "model leaves {unsatisfied} clause(s) of the formula unsatisfied"
            ),
        }
    }
}

impl std::error::Error for SolveError {}
