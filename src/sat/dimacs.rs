#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Reading and writing the line-oriented DIMACS formats.
//!
//! Formula input:
//! - Lines starting with `c` are comments and the `p cnf ...` header is
//!   skipped. Counts are derived from the clauses themselves.
//! - Every other non-blank line is one clause: signed integers terminated by
//!   a single `0`. A line holding only `0` is the empty clause.
//! - Blank lines are skipped. A `%` line ends the input.
//!
//! Solution files hold a header `p <variables> <assigned>` followed by one
//! `<literal> 0` line per assigned variable, positives first, then negatives.

use crate::sat::assignment::Solutions;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use crate::sat::targets;
use itertools::Itertools;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Ways DIMACS input can be rejected. Line numbers are 1-based.
#[derive(Debug)]
pub enum DimacsError {
    Io(io::Error),
    MalformedLiteral { line: usize, token: String },
    MissingTerminator { line: usize },
    LiteralAfterTerminator { line: usize },
    /// A solution line that is not exactly `<literal> 0`.
    NonUnitSolutionLine { line: usize },
    ContradictorySolution { variable: Variable },
}

impl fmt::Display for DimacsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::MalformedLiteral { line, token } => {
                write!(f, "line {line}: '{token}' is not a literal")
            }
            Self::MissingTerminator { line } => {
                write!(f, "line {line}: clause is not terminated by 0")
            }
            Self::LiteralAfterTerminator { line } => {
                write!(f, "line {line}: literal after terminating 0")
            }
            Self::NonUnitSolutionLine { line } => {
                write!(f, "line {line}: expected a single literal followed by 0")
            }
            Self::ContradictorySolution { variable } => {
                write!(f, "solution assigns variable {variable} both true and false")
            }
        }
    }
}

impl std::error::Error for DimacsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DimacsError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

enum Line<'a> {
    Skip,
    End,
    Data(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    match trimmed.chars().next() {
        None | Some('c' | 'p') => Line::Skip,
        Some('%') => Line::End,
        Some(_) => Line::Data(trimmed),
    }
}

/// Parses one `... 0` line into its literals, without the terminator.
fn parse_terminated(data: &str, line: usize) -> Result<Vec<Literal>, DimacsError> {
    let values = data
        .split_whitespace()
        .map(|token| {
            token
                .parse::<i32>()
                .map_err(|_| DimacsError::MalformedLiteral {
                    line,
                    token: token.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let Some(end) = values.iter().position(|&v| v == 0) else {
        return Err(DimacsError::MissingTerminator { line });
    };
    if end + 1 != values.len() {
        return Err(DimacsError::LiteralAfterTerminator { line });
    }

    Ok(values[..end].iter().copied().map(Literal::from).collect_vec())
}

/// Parses a DIMACS formula from `reader`.
///
/// # Errors
///
/// `DimacsError::Io` if reading fails, otherwise the first malformed clause line.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf, DimacsError> {
    let mut clauses = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        match classify(&line) {
            Line::Skip => {}
            Line::End => break,
            Line::Data(data) => clauses.push(Clause::new(parse_terminated(data, i + 1)?)),
        }
    }

    let cnf = Cnf::new(clauses);
    log::debug!(
        target: targets::DIMACS,
        "Parsed {} clauses over {} variables",
        cnf.len(),
        cnf.num_vars
    );
    Ok(cnf)
}

/// Parses the DIMACS file at `path`.
///
/// # Errors
///
/// See `parse_dimacs`. Failing to open the file is `DimacsError::Io`.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Cnf, DimacsError> {
    let file = File::open(path)?;
    parse_dimacs(BufReader::new(file))
}

/// Parses a solution written by `write_solution`.
///
/// The header is not checked against the body; the literals are what count.
///
/// # Errors
///
/// `DimacsError::NonUnitSolutionLine` for a line that is not one literal,
/// `DimacsError::ContradictorySolution` if a variable appears with both signs.
pub fn parse_solution<R: BufRead>(reader: R) -> Result<Solutions, DimacsError> {
    let mut literals = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        match classify(&line) {
            Line::Skip => {}
            Line::End => break,
            Line::Data(data) => match parse_terminated(data, i + 1)?.as_slice() {
                [lit] => literals.push(*lit),
                _ => return Err(DimacsError::NonUnitSolutionLine { line: i + 1 }),
            },
        }
    }

    Solutions::from_literals(literals)
        .map_err(|variable| DimacsError::ContradictorySolution { variable })
}

/// Parses the solution file at `path`.
///
/// # Errors
///
/// See `parse_solution`.
pub fn parse_solution_file<P: AsRef<Path>>(path: P) -> Result<Solutions, DimacsError> {
    let file = File::open(path)?;
    parse_solution(BufReader::new(file))
}

/// Writes `solution` in solution-file format.
///
/// `num_vars` goes into the header as the formula's variable count.
///
/// # Errors
///
/// Any error from `writer`.
pub fn write_solution<W: Write>(writer: W, num_vars: usize, solution: &Solutions) -> io::Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "p {num_vars} {}", solution.len())?;
    for lit in solution.positives().chain(solution.negatives()) {
        writeln!(writer, "{lit} 0")?;
    }
    writer.flush()
}

/// Writes `solution` to a new file at `path`, replacing any existing one.
///
/// # Errors
///
/// Any error creating or writing the file.
pub fn write_solution_file<P: AsRef<Path>>(
    path: P,
    num_vars: usize,
    solution: &Solutions,
) -> io::Result<()> {
    write_solution(File::create(path)?, num_vars, solution)
}
