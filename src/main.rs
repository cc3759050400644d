//! # sudoku-sat
//!
//! A command-line DPLL SAT solver. It reads problems in DIMACS CNF format,
//! either from a file, a directory of `.cnf` files or plain text, and also
//! solves Sudoku puzzles (4×4, 9×9 and 16×16) by encoding them as CNF.
//!
//! ## Usage
//!
//! ```sh
//! sudoku-sat [OPTIONS] <path>
//! sudoku-sat file <path> [OPTIONS]
//! sudoku-sat text --input "1 -2 0\n2 3 0" [OPTIONS]
//! sudoku-sat sudoku <path> [--export-dimacs] [OPTIONS]
//! sudoku-sat verify <puzzle.cnf> <solution>
//! sudoku-sat completions <shell>
//! ```
//!
//! ### Common Options
//!
//! -   `--heuristic <dpll|max-occurrence|neighbor>`: decision heuristic (default: `dpll`).
//! -   `--timeout <SECONDS>`: give up after this long.
//! -   `-v, --verify <bool>`: check the model against the formula (default: `true`).
//! -   `-s, --stats <bool>`: print statistics (default: `true`).
//! -   `-p, --print-solution`: print the model.
//! -   `-o, --output <file>`: write the model as a solution file.
//! -   `-d, --debug`: debug logging. `RUST_LOG` overrides it.
//!
//! ## Example Invocations
//!
//! ```sh
//! # Solve a DIMACS file with the most-frequent-literal heuristic
//! sudoku-sat problem.cnf --heuristic max-occurrence
//!
//! # Solve every puzzle in a file and export the CNF of each
//! sudoku-sat sudoku puzzles.txt --export-dimacs
//!
//! # Solve, save the model, then check it independently
//! sudoku-sat file puzzle.cnf -o puzzle.sol
//! sudoku-sat verify puzzle.cnf puzzle.sol
//! ```

use crate::command_line::cli::{
    Cli, Commands, print_completions, solve_path, solve_sudoku, solve_text, verify_files,
};
use clap::{CommandFactory, Parser};

mod command_line;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Some(Commands::File { path, common }) => solve_path(&path, &common),
        Some(Commands::Text { input, common }) => solve_text(&input, &common),
        Some(Commands::Sudoku {
            path,
            export_dimacs,
            common,
        }) => solve_sudoku(&path, export_dimacs, &common),
        Some(Commands::Verify { puzzle, solution }) => verify_files(&puzzle, &solution),
        Some(Commands::Completions { shell }) => {
            print_completions(shell);
            Ok(())
        }
        None => match cli.path {
            Some(path) => solve_path(&path, &cli.common),
            None => {
                let _ = Cli::command().print_help();
                Ok(())
            }
        },
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug());

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
