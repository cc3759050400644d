#![allow(clippy::cast_precision_loss)]

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use sudoku_sat::sat::assignment::Solutions;
use sudoku_sat::sat::cnf::Cnf;
use sudoku_sat::sat::dimacs::{parse_dimacs, parse_file, parse_solution_file, write_solution_file};
use sudoku_sat::sat::dpll::Dpll;
use sudoku_sat::sat::solver::{SolutionStats, SolverOptions};
use sudoku_sat::sat::variable_selection::Heuristic;
use sudoku_sat::sudoku::solver::parse_sudoku_file;
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface for the solver.
#[derive(Parser, Debug)]
#[command(
    name = "sudoku-sat",
    version,
    about = "A DPLL SAT solver for Sudoku puzzles in CNF",
    args_conflicts_with_subcommands = true
)]
pub(crate) struct Cli {
    /// A DIMACS .cnf file, or a directory searched recursively for .cnf files.
    pub path: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub common: CommonOptions,
}

impl Cli {
    /// Whether `--debug` was given, at the top level or to the subcommand.
    pub(crate) fn debug(&self) -> bool {
        match &self.command {
            Some(
                Commands::File { common, .. }
                | Commands::Text { common, .. }
                | Commands::Sudoku { common, .. },
            ) => common.debug,
            _ => self.common.debug,
        }
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// DIMACS input, one clause per line, e.g. "1 -2 0\n2 3 0".
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every puzzle in a Sudoku file.
    ///
    /// Each non-blank line is one puzzle, read row by row: `1`-`9`, `A`-`G`
    /// for 10 to 16, and `.` or `0` for an empty cell.
    Sudoku {
        path: PathBuf,

        /// Also write the generated CNF next to the puzzle file.
        #[arg(short, long, default_value_t = false)]
        export_dimacs: bool,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Check a solution file against a DIMACS puzzle, reporting every clause it leaves unsatisfied.
    Verify { puzzle: PathBuf, solution: PathBuf },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by every solving command.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Log search progress at debug level (`RUST_LOG` takes precedence).
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check the model against the original formula.
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after solving.
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) stats: bool,

    /// Print the model if the formula is satisfiable.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Decision heuristic.
    #[arg(long, value_enum, default_value_t = Heuristic::Lexicographic)]
    pub(crate) heuristic: Heuristic,

    /// Give up after this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub(crate) timeout: Option<u64>,

    /// Write the model to this file in solution format.
    #[arg(short, long)]
    pub(crate) output: Option<PathBuf>,
}

impl CommonOptions {
    fn solver_options(&self) -> SolverOptions {
        let options = SolverOptions::new(self.heuristic);
        match self.timeout {
            Some(secs) => options.with_timeout(Duration::from_secs(secs)),
            None => options,
        }
    }
}

/// Solves `path`, which is either one DIMACS file or a directory of them.
pub(crate) fn solve_path(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if path.is_dir() {
        solve_dir(path, common)
    } else {
        solve_file(path, common)
    }
}

pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Result<(), String> {
    let time = Instant::now();
    let cnf = parse_file(path).map_err(|e| format!("Failed to parse {}: {e}", path.display()))?;
    let parse_time = time.elapsed();

    solve_and_report(&cnf, common, Some(path), parse_time, common.output.as_deref())?;
    Ok(())
}

pub(crate) fn solve_text(input: &str, common: &CommonOptions) -> Result<(), String> {
    let time = Instant::now();
    let cnf = parse_dimacs(input.as_bytes()).map_err(|e| format!("Failed to parse input: {e}"))?;
    let parse_time = time.elapsed();

    solve_and_report(&cnf, common, None, parse_time, common.output.as_deref())?;
    Ok(())
}

/// Solves every `.cnf` file under `path`, recursively.
///
/// `--output` is ignored here, since one file cannot hold every model.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<(), String> {
    if !path.is_dir() {
        return Err(format!("Provided path is not a directory: {}", path.display()));
    }

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }
        if file_path.extension().is_none_or(|ext| ext != "cnf") {
            log::debug!("Skipping non-CNF file: {}", file_path.display());
            continue;
        }

        let time = Instant::now();
        let cnf = parse_file(file_path)
            .map_err(|e| format!("Failed to parse {}: {e}", file_path.display()))?;
        let parse_time = time.elapsed();

        solve_and_report(&cnf, common, Some(file_path), parse_time, None)?;
    }

    Ok(())
}

/// Runs the solver on `cnf`, returning the model, the solve time and the search counters.
pub(crate) fn solve(
    cnf: &Cnf,
    label: Option<&Path>,
    common: &CommonOptions,
) -> Result<(Option<Solutions>, Duration, SolutionStats), String> {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }

    log::debug!(
        "{} variables, {} clauses, {} literals, heuristic {}",
        cnf.num_vars,
        cnf.len(),
        cnf.num_literals,
        common.heuristic
    );

    let time = Instant::now();
    let mut solver = Dpll::with_options(cnf.clone(), common.solver_options());
    let sol = solver.solve().map_err(|e| e.to_string())?;
    let elapsed = time.elapsed();

    log::debug!("Solved in {elapsed:?}");

    Ok((sol, elapsed, solver.stats()))
}

/// Solves `cnf` and prints the verification result and statistics as configured.
///
/// When `output` is given and a model was found, the model is written there.
pub(crate) fn solve_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
    output: Option<&Path>,
) -> Result<Option<Solutions>, String> {
    let _ = epoch::advance();

    let (sol, elapsed, solver_stats) = solve(cnf, label, common)?;

    if common.verify {
        verify_solution(cnf, sol.as_ref())?;
    }

    if common.stats {
        print_stats(
            parse_time,
            elapsed,
            cnf,
            common.heuristic,
            &solver_stats,
            memory_usage(),
            common.print_solution,
            sol.as_ref(),
        );
    } else if common.print_solution {
        if let Some(model) = &sol {
            println!("Solutions: {model}");
        }
    }

    if let (Some(path), Some(model)) = (output, &sol) {
        write_solution_file(path, cnf.num_vars, model)
            .map_err(|e| format!("Unable to write {}: {e}", path.display()))?;
        println!("Solution written to: {}", path.display());
    }

    Ok(sol)
}

/// Checks `sol` against `cnf`. UNSAT is reported, never an error.
pub(crate) fn verify_solution(cnf: &Cnf, sol: Option<&Solutions>) -> Result<(), String> {
    let Some(model) = sol else {
        println!("UNSAT");
        return Ok(());
    };

    let ok = cnf.verify(model);
    println!("Verified: {ok:?}");
    if ok {
        Ok(())
    } else {
        Err("Solution failed verification!".to_string())
    }
}

/// Standalone verify mode: re-reads a puzzle and a solution file and
/// cross-checks them using only the persisted literals.
pub(crate) fn verify_files(puzzle: &Path, solution: &Path) -> Result<(), String> {
    let cnf = parse_file(puzzle).map_err(|e| format!("Failed to parse {}: {e}", puzzle.display()))?;
    let model = parse_solution_file(solution)
        .map_err(|e| format!("Failed to parse {}: {e}", solution.display()))?;

    let unsatisfied = cnf.unsatisfied_clauses(&model).collect::<Vec<_>>();
    for clause in &unsatisfied {
        println!("Unsatisfied: {clause}");
    }

    if unsatisfied.is_empty() {
        println!("Verified: all {} clauses satisfied", cnf.len());
        Ok(())
    } else {
        Err(format!(
            "{} of {} clauses unsatisfied",
            unsatisfied.len(),
            cnf.len()
        ))
    }
}

pub(crate) fn solve_sudoku(
    path: &Path,
    export_dimacs: bool,
    common: &CommonOptions,
) -> Result<(), String> {
    if !path.is_file() {
        return Err(format!("Provided path is not a file: {}", path.display()));
    }

    let time = Instant::now();
    let sudokus =
        parse_sudoku_file(path).map_err(|e| format!("Error parsing Sudoku file: {e}"))?;
    let parse_time = time.elapsed();
    let total = sudokus.len();

    for (i, sudoku) in sudokus.iter().enumerate() {
        println!("Parsed Sudoku:\n{sudoku}");

        let cnf = sudoku.to_cnf();

        if export_dimacs {
            let dimacs_path = numbered(path, "cnf", i, total);
            std::fs::write(&dimacs_path, cnf.to_string())
                .map_err(|e| format!("Unable to write {}: {e}", dimacs_path.display()))?;
            println!("DIMACS written to: {}", dimacs_path.display());
        }

        let output = common
            .output
            .as_deref()
            .map(|out| numbered(out, "", i, total));
        let sol = solve_and_report(&cnf, common, Some(path), parse_time, output.as_deref())?;

        match sol {
            Some(model) => println!("Solution:\n{}", sudoku.decode(&model)),
            None => println!("No solution found"),
        }
    }

    Ok(())
}

pub(crate) fn print_completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

/// `base` with `.ext` appended, numbered when a file holds several puzzles.
fn numbered(base: &Path, ext: &str, i: usize, total: usize) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    if total > 1 {
        name.push(format!(".{}", i + 1));
    }
    if !ext.is_empty() {
        name.push(format!(".{ext}"));
    }
    PathBuf::from(name)
}

/// Allocated and resident memory in MiB, if jemalloc reports them.
fn memory_usage() -> Option<(f64, f64)> {
    const MIB: f64 = 1024.0 * 1024.0;

    epoch::advance().ok()?;
    let allocated = stats::allocated::read().ok()?;
    let resident = stats::resident::read().ok()?;
    Some((allocated as f64 / MIB, resident as f64 / MIB))
}

pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    cnf: &Cnf,
    heuristic: Heuristic,
    s: &SolutionStats,
    memory: Option<(f64, f64)>,
    print_solution: bool,
    solutions: Option<&Solutions>,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars);
    stat_line("Clauses", cnf.len());
    stat_line("Literals", cnf.num_literals);
    stat_line("Puzzle dimension", cnf.puzzle_dimension());

    println!("========================[ Search Statistics ]========================");
    stat_line("Heuristic", heuristic);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Backtracks", s.backtracks, elapsed_secs);
    stat_line_with_rate("Unit propagations", s.unit_propagations, elapsed_secs);
    stat_line("Pure literals", s.pure_literals);
    stat_line("Max depth", s.max_depth);
    match memory {
        Some((allocated, resident)) => {
            stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
            stat_line("Resident memory (MiB)", format!("{resident:.2}"));
        }
        None => stat_line("Memory usage (MiB)", "n/a"),
    }
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");

    if let Some(solutions_values) = solutions {
        if print_solution {
            println!("Solutions: {solutions_values}");
        }
    }

    if solutions.is_some() {
        println!("\nSATISFIABLE");
    } else {
        println!("\nUNSATISFIABLE");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sudoku_sat::sudoku::solver::Sudoku;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "sudoku-sat",
            "sudoku",
            "puzzles.txt",
            "--heuristic",
            "neighbor",
            "--timeout",
            "5",
            "-d",
        ])
        .unwrap();

        assert!(cli.debug());
        let Some(Commands::Sudoku { path, common, export_dimacs }) = cli.command else {
            panic!("expected the sudoku subcommand");
        };
        assert_eq!(path, PathBuf::from("puzzles.txt"));
        assert!(!export_dimacs);
        assert_eq!(common.heuristic, Heuristic::NeighborLocality);
        assert_eq!(common.solver_options().timeout, Some(Duration::from_secs(5)));
        assert!(common.verify);
    }

    #[test]
    fn test_cli_bare_path_and_flags() {
        let cli = Cli::try_parse_from([
            "sudoku-sat",
            "formula.cnf",
            "--heuristic",
            "max-occurrence",
            "--verify",
            "false",
        ])
        .unwrap();

        assert!(cli.command.is_none());
        assert_eq!(cli.path, Some(PathBuf::from("formula.cnf")));
        assert_eq!(cli.common.heuristic, Heuristic::MaxOccurrence);
        assert!(!cli.common.verify);
        assert!(!cli.debug());
    }

    #[test]
    fn test_cli_rejects_unknown_heuristic() {
        assert!(Cli::try_parse_from(["sudoku-sat", "f.cnf", "--heuristic", "vsids"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_numbered_paths() {
        let base = Path::new("puzzles.txt");
        assert_eq!(numbered(base, "cnf", 0, 1), PathBuf::from("puzzles.txt.cnf"));
        assert_eq!(numbered(base, "cnf", 2, 5), PathBuf::from("puzzles.txt.3.cnf"));
        assert_eq!(numbered(Path::new("out.sol"), "", 0, 2), PathBuf::from("out.sol.1"));
    }

    fn quiet_options() -> CommonOptions {
        CommonOptions {
            verify: true,
            ..CommonOptions::default()
        }
    }

    #[test]
    fn test_written_solution_verifies_against_puzzle() {
        let dir = tempfile::tempdir().unwrap();
        let puzzle = dir.path().join("forced.cnf");
        let solution = dir.path().join("forced.sol");
        std::fs::write(&puzzle, "p cnf 3 4\n1 0\n-2 0\n1 2 3 0\n-3 0\n").unwrap();

        let cnf = parse_file(&puzzle).unwrap();
        let (model, _, _) = solve(&cnf, None, &quiet_options()).unwrap();
        let model = model.expect("satisfiable");
        write_solution_file(&solution, cnf.num_vars, &model).unwrap();

        assert_eq!(verify_files(&puzzle, &solution), Ok(()));

        let corrupted = std::fs::read_to_string(&solution)
            .unwrap()
            .lines()
            .map(|line| if line == "1 0" { "-1 0" } else { line })
            .collect::<Vec<_>>()
            .join("\n");
        std::fs::write(&solution, corrupted).unwrap();

        assert_eq!(
            verify_files(&puzzle, &solution),
            Err("2 of 4 clauses unsatisfied".to_string())
        );
    }

    #[test]
    fn test_solve_sudoku_writes_each_model() {
        let dir = tempfile::tempdir().unwrap();
        let puzzles = dir.path().join("puzzles.txt");
        std::fs::write(&puzzles, "1000003004000002\n\n................\n").unwrap();

        let common = CommonOptions {
            output: Some(dir.path().join("out.sol")),
            ..quiet_options()
        };
        solve_sudoku(&puzzles, true, &common).unwrap();

        for (i, line) in ["1000003004000002", "................"].iter().enumerate() {
            let sudoku: Sudoku = line.parse().unwrap();
            let cnf_path = numbered(&puzzles, "cnf", i, 2);
            let sol_path = numbered(&dir.path().join("out.sol"), "", i, 2);

            assert_eq!(verify_files(&cnf_path, &sol_path), Ok(()));
            let model = parse_solution_file(&sol_path).unwrap();
            assert!(sudoku.decode(&model).is_solved());
        }
    }
}
