//! Defines the DPLL (Davis-Putnam-Logemann-Loveland) search controller.
//!
//! Each search step works on the formula as simplified by every assignment
//! made so far on its branch:
//! 1.  **Propagation:** unit clauses and pure literals are assigned, and the
//!     formula re-simplified, until neither is left. An empty clause is a
//!     conflict and an empty formula is a success.
//! 2.  **Decision:** otherwise the configured heuristic picks a literal. Its
//!     variable is set to false and the search recurses; if that fails the
//!     same variable is set to true and the search recurses again.
//! 3.  **Backtracking:** a failed branch is retracted through the trail, so
//!     the sibling branch starts from exactly the parent's assignment.
//!
//! Every decision assigns a fresh variable, so recursion depth is bounded by
//! the number of variables and the search always terminates.

use crate::sat::assignment::{Assignment, Solutions};
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sat::propagation::{Propagation, Propagator, simplify};
use crate::sat::solver::{SolutionStats, SolveError, SolverOptions};
use crate::sat::targets;
use crate::sat::trail::{Reason, Trail};
use crate::sat::variable_selection::{Heuristic, VariableSelection, VariableSelectionImpls};
use std::time::Instant;

/// A DPLL solver over one formula.
///
/// The solver owns a single `Assignment` paired with a `Trail`. Recursive
/// calls push onto the trail and a failed branch is undone back to the mark
/// taken before it, so siblings never observe each other's assignments.
#[derive(Debug, Clone)]
pub struct Dpll {
    /// The original formula. Never modified by search.
    pub cnf: Cnf,
    pub assignment: Assignment,
    pub trail: Trail,
    pub selector: VariableSelectionImpls,
    pub propagator: Propagator,
    options: SolverOptions,
    stats: SolutionStats,
    solution: Option<Solutions>,
    deadline: Option<Instant>,
}

impl Dpll {
    #[must_use]
    pub fn new(cnf: Cnf, heuristic: Heuristic) -> Self {
        Self::with_options(cnf, SolverOptions::new(heuristic))
    }

    #[must_use]
    pub fn with_options(cnf: Cnf, options: SolverOptions) -> Self {
        let selector = options.heuristic.to_impl(&cnf);
        let assignment = Assignment::with_capacity(cnf.num_vars);

        Self {
            cnf,
            assignment,
            trail: Trail::new(),
            selector,
            propagator: Propagator::new(),
            options,
            stats: SolutionStats::default(),
            solution: None,
            deadline: None,
        }
    }

    /// Runs the search from an empty assignment.
    ///
    /// Returns `Ok(Some(model))` with a value for every variable of the
    /// formula when it is satisfiable, and `Ok(None)` when it is not.
    ///
    /// # Errors
    ///
    /// `SolveError::DeadlineExceeded` if a timeout was configured and ran out,
    /// `SolveError::VerificationMismatch` if the model found does not satisfy
    /// the formula.
    pub fn solve(&mut self) -> Result<Option<Solutions>, SolveError> {
        self.trail.clear(&mut self.assignment);
        self.propagator = Propagator::new();
        self.stats = SolutionStats::default();
        self.solution = None;
        self.deadline = self.options.timeout.map(|t| Instant::now() + t);

        log::debug!(
            target: targets::SEARCH,
            "Solving {} clauses over {} variables with {}",
            self.cnf.len(),
            self.cnf.num_vars,
            self.options.heuristic
        );

        let result = self.search(self.cnf.clauses.clone(), 0);
        self.stats.unit_propagations = self.propagator.unit_propagations;
        self.stats.pure_literals = self.propagator.pure_literals;

        if !result? {
            log::debug!(target: targets::SEARCH, "Unsatisfiable after {} backtracks", self.stats.backtracks);
            return Ok(None);
        }

        let solution = Solutions::complete(&self.assignment, &self.cnf.variables);
        let unsatisfied = self.cnf.unsatisfied_clauses(&solution).count();
        if unsatisfied > 0 {
            log::error!(target: targets::SEARCH, "Model fails {unsatisfied} clause(s) of the formula");
            return Err(SolveError::VerificationMismatch { unsatisfied });
        }

        log::debug!(
            target: targets::SEARCH,
            "Satisfiable after {} decisions and {} backtracks",
            self.stats.decisions,
            self.stats.backtracks
        );
        self.solution = Some(solution.clone());
        Ok(Some(solution))
    }

    /// The model found by the last successful `solve`.
    #[must_use]
    pub const fn solution(&self) -> Option<&Solutions> {
        self.solution.as_ref()
    }

    #[must_use]
    pub const fn stats(&self) -> SolutionStats {
        self.stats
    }

    #[must_use]
    pub const fn heuristic(&self) -> Heuristic {
        self.options.heuristic
    }

    /// One search step on `clauses`, already simplified by the current assignment.
    ///
    /// On success the assignment is left in place. On failure everything
    /// assigned at or below this step has been retracted.
    fn search(&mut self, clauses: Vec<Clause>, depth: usize) -> Result<bool, SolveError> {
        self.check_deadline()?;
        self.stats.max_depth = self.stats.max_depth.max(depth);
        let checkpoint = self.trail.len();

        let clauses = match self.propagator.propagate(
            clauses,
            &mut self.assignment,
            &mut self.trail,
            depth,
        ) {
            Propagation::Conflict => {
                self.stats.backtracks += 1;
                self.trail.backtrack_to(&mut self.assignment, checkpoint);
                return Ok(false);
            }
            Propagation::Stable(clauses) => clauses,
        };

        if clauses.is_empty() {
            return Ok(true);
        }

        // Propagation leaves only unassigned literals, so a pick exists. If it
        // somehow does not, this branch can make no progress and is a dead end.
        let Some(choice) = self
            .selector
            .pick(&clauses, &self.assignment, self.trail.last_literal())
        else {
            log::warn!(target: targets::DECISION, "No literal to branch on with {} clauses left", clauses.len());
            self.stats.backtracks += 1;
            self.trail.backtrack_to(&mut self.assignment, checkpoint);
            return Ok(false);
        };

        self.stats.decisions += 1;

        for value in [false, true] {
            let decision = Literal::new(choice.variable(), value);
            let mark = self.trail.len();

            log::trace!(target: targets::DECISION, "Level {}: {decision} (picked {choice})", depth + 1);
            self.trail
                .push(&mut self.assignment, decision, depth + 1, Reason::Decision);

            let reduced = simplify(&clauses, &self.assignment);
            if self.search(reduced, depth + 1)? {
                return Ok(true);
            }

            self.trail.backtrack_to(&mut self.assignment, mark);
        }

        self.stats.backtracks += 1;
        self.trail.backtrack_to(&mut self.assignment, checkpoint);
        Ok(false)
    }

    fn check_deadline(&self) -> Result<(), SolveError> {
        match (self.deadline, self.options.timeout) {
            (Some(deadline), Some(limit)) if Instant::now() >= deadline => {
                log::debug!(target: targets::SEARCH, "Deadline reached at depth {}", self.trail.decision_level());
                Err(SolveError::DeadlineExceeded(limit))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::Valuation;
    use crate::sat::literal::Variable;
    use std::time::Duration;

    fn solve_with(cnf: &Cnf, heuristic: Heuristic) -> (Option<Solutions>, SolutionStats) {
        let mut solver = Dpll::new(cnf.clone(), heuristic);
        let result = solver.solve().expect("no deadline configured");
        (result, solver.stats())
    }

    /// Exhaustive truth-table check.
    fn brute_force(cnf: &Cnf) -> bool {
        let vars = &cnf.variables;
        (0u32..1 << vars.len()).any(|mask| {
            let lits = vars
                .iter()
                .enumerate()
                .map(|(i, &v)| Literal::new(v, mask & (1 << i) != 0));
            let model = Solutions::from_literals(lits).expect("one literal per variable");
            cnf.verify(&model)
        })
    }

    fn random_cnf(rng: &mut fastrand::Rng, num_vars: Variable) -> Cnf {
        let num_clauses = rng.usize(1..=(num_vars as usize) * 5);
        (0..num_clauses)
            .map(|_| {
                let len = rng.usize(1..=3);
                (0..len)
                    .map(|_| Literal::new(rng.u32(1..=num_vars), rng.bool()))
                    .collect::<Clause>()
            })
            .collect()
    }

    fn pigeonhole(pigeons: i32, holes: i32) -> Cnf {
        let var = |p: i32, h: i32| p * holes + h + 1;
        let mut clauses = Vec::new();
        for p in 0..pigeons {
            clauses.push((0..holes).map(|h| var(p, h)).collect());
        }
        for h in 0..holes {
            for p1 in 0..pigeons {
                for p2 in (p1 + 1)..pigeons {
                    clauses.push(vec![-var(p1, h), -var(p2, h)]);
                }
            }
        }
        Cnf::from(clauses)
    }

    #[test]
    fn test_unit_chain_conflict_is_unsat_without_decisions() {
        let cnf = Cnf::from(vec![vec![1, 2], vec![-1], vec![-2, 3], vec![-3]]);
        for heuristic in Heuristic::ALL {
            let (result, stats) = solve_with(&cnf, heuristic);
            assert_eq!(result, None);
            assert!(stats.backtracks >= 1);
            assert_eq!(stats.decisions, 0);
        }
    }

    #[test]
    fn test_pure_literal_solves_without_decisions() {
        let cnf = Cnf::from(vec![vec![1, 2], vec![-1, 2]]);
        for heuristic in Heuristic::ALL {
            let (result, stats) = solve_with(&cnf, heuristic);
            let model = result.expect("satisfiable");
            assert_eq!(model.var_value(2), Some(true));
            assert_eq!(model.len(), 2);
            assert!(cnf.verify(&model));
            assert_eq!(stats.backtracks, 0);
            assert_eq!(stats.decisions, 0);
            assert_eq!(stats.pure_literals, 1);
        }
    }

    #[test]
    fn test_empty_clause_is_unsat_not_empty_model() {
        let cnf = Cnf::from(vec![vec![]]);
        assert_eq!(solve_with(&cnf, Heuristic::Lexicographic).0, None);
    }

    #[test]
    fn test_empty_formula_is_trivially_sat() {
        let (result, stats) = solve_with(&Cnf::default(), Heuristic::MaxOccurrence);
        assert_eq!(result, Some(Solutions::default()));
        assert_eq!(stats, SolutionStats::default());
    }

    #[test]
    fn test_pigeonhole_needs_backtracking() {
        let cnf = pigeonhole(3, 2);
        for heuristic in Heuristic::ALL {
            let (result, stats) = solve_with(&cnf, heuristic);
            assert_eq!(result, None);
            assert!(stats.backtracks > 0);
            assert!(stats.decisions > 0);
        }
    }

    #[test]
    fn test_branching_tries_false_first() {
        // Both values of 1 work; no units, no pure literals.
        let cnf = Cnf::from(vec![vec![1, 2], vec![-1, -2], vec![-1, 2, 3], vec![1, -2, -3], vec![3, -3, 4]]);
        let (result, stats) = solve_with(&cnf, Heuristic::Lexicographic);
        let model = result.expect("satisfiable");
        assert_eq!(model.var_value(1), Some(false));
        assert_eq!(stats.decisions, 1);
        assert_eq!(stats.backtracks, 0);
    }

    #[test]
    fn test_random_formulas_agree_with_truth_table() {
        let mut rng = fastrand::Rng::with_seed(0x5eed_cafe);

        for _ in 0..150 {
            let num_vars = rng.u32(1..=12);
            let cnf = random_cnf(&mut rng, num_vars);
            let expected = brute_force(&cnf);

            for heuristic in Heuristic::ALL {
                let (result, _) = solve_with(&cnf, heuristic);
                assert_eq!(result.is_some(), expected, "{heuristic} disagrees on\n{cnf}");

                if let Some(model) = result {
                    assert!(cnf.verify(&model), "{heuristic} returned a bad model for\n{cnf}");
                    assert_eq!(model.len(), cnf.num_vars);
                }
            }
        }
    }

    #[test]
    fn test_solve_is_repeatable() {
        let cnf = pigeonhole(4, 4);
        let mut solver = Dpll::new(cnf, Heuristic::NeighborLocality);

        let first = solver.solve().expect("no deadline");
        let first_stats = solver.stats();
        let second = solver.solve().expect("no deadline");

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(first_stats, solver.stats());
        assert_eq!(solver.solution(), second.as_ref());
    }

    #[test]
    fn test_zero_timeout_exceeds_deadline() {
        let options = SolverOptions::new(Heuristic::Lexicographic).with_timeout(Duration::ZERO);
        let mut solver = Dpll::with_options(pigeonhole(5, 4), options);
        assert_eq!(
            solver.solve(),
            Err(SolveError::DeadlineExceeded(Duration::ZERO))
        );
        assert_eq!(solver.solution(), None);
    }

    #[test]
    fn test_failed_search_leaves_no_assignment_behind() {
        let mut solver = Dpll::new(pigeonhole(3, 2), Heuristic::MaxOccurrence);
        assert_eq!(solver.solve(), Ok(None));
        assert!(solver.assignment.is_empty());
        assert!(solver.trail.is_empty());
    }
}
