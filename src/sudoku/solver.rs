//! Sudoku boards and their CNF encoding.
//!
//! Cell `(row, col)` holding `value` (all 1-based) is the variable
//! `base² · row + base · col + value`, with `base = 10` for boards up to 9×9
//! and `base = N + 1` for 16×16. The 9×9 numbering is therefore the familiar
//! three-digit `rcv` form.

use crate::sat::assignment::Solutions;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{self, Literal};
use crate::sat::targets;
use itertools::Itertools;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug)]
pub enum SudokuError {
    Io(io::Error),
    /// A puzzle line whose length is not 16, 81 or 256.
    InvalidLength { line: usize, length: usize },
    InvalidCell { line: usize, column: usize, symbol: char },
    /// Two givens put the same value in one row, column or box.
    GivenConflict { line: usize, row: usize, col: usize },
}

impl fmt::Display for SudokuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::InvalidLength { line, length } => write!(
                f,
                "line {line}: {length} cells do not form a 4x4, 9x9 or 16x16 board"
            ),
            Self::InvalidCell {
                line,
                column,
                symbol,
            } => write!(f, "line {line}, column {column}: '{symbol}' is not a valid cell"),
            Self::GivenConflict { line, row, col } => write!(
                f,
                "line {line}: given at row {row}, column {col} repeats a value in its row, column or box"
            ),
        }
    }
}

impl std::error::Error for SudokuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SudokuError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Copy, PartialOrd, Ord, Hash)]
pub enum Size {
    Four = 4,
    Nine = 9,
    Sixteen = 16,
}

impl Size {
    #[must_use]
    pub const fn block_size(self) -> usize {
        match self {
            Self::Four => 2,
            Self::Nine => 3,
            Self::Sixteen => 4,
        }
    }

    /// Radix of the variable numbering.
    #[must_use]
    pub const fn base(self) -> u32 {
        match self {
            Self::Four | Self::Nine => 10,
            Self::Sixteen => 17,
        }
    }

    /// The board size whose puzzle line has `cells` cells.
    #[must_use]
    pub const fn from_cells(cells: usize) -> Option<Self> {
        match cells {
            16 => Some(Self::Four),
            81 => Some(Self::Nine),
            256 => Some(Self::Sixteen),
            _ => None,
        }
    }
}

impl TryFrom<usize> for Size {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::Four),
            9 => Ok(Self::Nine),
            16 => Ok(Self::Sixteen),
            _ => Err(()),
        }
    }
}

impl From<Size> for usize {
    fn from(size: Size) -> Self {
        size as Self
    }
}

/// Cell values by row, 0 for blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board(Vec<Vec<usize>>);

impl Board {
    #[must_use]
    pub const fn new(board: Vec<Vec<usize>>) -> Self {
        Self(board)
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> usize {
        self.0[row][col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[usize]> {
        self.0.iter().map(Vec::as_slice)
    }
}

impl<const N: usize> From<[[usize; N]; N]> for Board {
    fn from(board: [[usize; N]; N]) -> Self {
        Self::new(board.iter().map(|r| r.to_vec()).collect())
    }
}

impl From<Board> for Vec<Vec<usize>> {
    fn from(board: Board) -> Self {
        board.0
    }
}

pub const EXAMPLE_FOUR: [[usize; 4]; 4] = [[1, 0, 0, 0], [0, 0, 3, 0], [0, 4, 0, 0], [0, 0, 0, 2]];

pub const EXAMPLE_NINE: [[usize; 9]; 9] = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

pub const EXAMPLE_SIXTEEN: [[usize; 16]; 16] = [
    [0, 11, 0, 0, 0, 2, 3, 14, 0, 0, 9, 12, 0, 0, 0, 16],
    [15, 12, 0, 0, 0, 11, 0, 1, 13, 10, 0, 0, 0, 0, 7, 2],
    [0, 0, 10, 0, 0, 0, 0, 0, 16, 11, 0, 1, 6, 4, 12, 3],
    [0, 16, 14, 1, 0, 4, 0, 6, 0, 3, 0, 15, 0, 8, 0, 0],
    [1, 6, 5, 12, 0, 0, 11, 0, 0, 9, 8, 0, 0, 0, 0, 0],
    [0, 0, 0, 7, 14, 1, 8, 0, 0, 15, 6, 0, 13, 5, 0, 4],
    [4, 15, 8, 0, 9, 13, 0, 0, 0, 0, 7, 16, 3, 0, 0, 0],
    [0, 9, 13, 0, 0, 0, 0, 15, 10, 0, 0, 0, 7, 6, 0, 11],
    [14, 0, 6, 11, 0, 0, 0, 12, 7, 0, 0, 0, 0, 3, 13, 0],
    [0, 0, 0, 5, 8, 14, 0, 0, 0, 0, 13, 11, 0, 1, 2, 6],
    [13, 0, 16, 4, 0, 15, 5, 0, 0, 1, 12, 6, 8, 0, 0, 0],
    [0, 0, 0, 0, 0, 16, 10, 0, 0, 8, 0, 0, 11, 9, 4, 5],
    [0, 0, 11, 0, 1, 0, 14, 0, 5, 0, 3, 0, 15, 7, 16, 0],
    [5, 13, 15, 3, 16, 0, 4, 7, 0, 0, 0, 0, 0, 2, 0, 0],
    [16, 1, 0, 0, 0, 0, 12, 2, 14, 0, 15, 0, 0, 0, 3, 8],
    [9, 0, 0, 0, 13, 5, 0, 0, 8, 6, 16, 0, 0, 0, 10, 0],
];

/// "Cell `(row, col)` holds `num`", 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub num: usize,
}

impl Variable {
    #[must_use]
    pub const fn new(row: usize, col: usize, num: usize) -> Self {
        Self { row, col, num }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn encode(&self, size: Size) -> literal::Variable {
        let base = size.base();
        base * base * self.row as u32 + base * self.col as u32 + self.num as u32
    }

    #[must_use]
    pub const fn literal(&self, size: Size, polarity: bool) -> Literal {
        Literal::new(self.encode(size), polarity)
    }

    /// Inverse of `encode`. `None` for numbers outside the board.
    #[must_use]
    pub fn decode(var: literal::Variable, size: Size) -> Option<Self> {
        let base = size.base();
        let n = size as u32;
        let (num, col, row) = (var % base, (var / base) % base, var / (base * base));
        [row, col, num]
            .iter()
            .all(|x| (1..=n).contains(x))
            .then(|| Self::new(row as usize, col as usize, num as usize))
    }
}

/// Pairwise "not both" clauses over `cells`, all holding `num`.
fn at_most_one(size: Size, cells: &[(usize, usize)], num: usize) -> impl Iterator<Item = Clause> + '_ {
    cells.iter().tuple_combinations().map(move |(&(r1, c1), &(r2, c2))| {
        Clause::new([
            Variable::new(r1, c1, num).literal(size, false),
            Variable::new(r2, c2, num).literal(size, false),
        ])
    })
}

fn generate_cell_clauses(size: Size) -> Vec<Clause> {
    let n = size as usize;
    let mut clauses = Vec::new();
    for (row, col) in (1..=n).cartesian_product(1..=n) {
        clauses.push(Clause::new(
            (1..=n).map(|num| Variable::new(row, col, num).literal(size, true)),
        ));
        clauses.extend((1..=n).tuple_combinations().map(|(a, b)| {
            Clause::new([
                Variable::new(row, col, a).literal(size, false),
                Variable::new(row, col, b).literal(size, false),
            ])
        }));
    }
    clauses
}

fn generate_unit_clauses(size: Size) -> Vec<Clause> {
    let n = size as usize;
    let block = size.block_size();
    let mut units: Vec<Vec<(usize, usize)>> = Vec::with_capacity(3 * n);

    for i in 1..=n {
        units.push((1..=n).map(|c| (i, c)).collect());
        units.push((1..=n).map(|r| (r, i)).collect());
    }
    for (br, bc) in (0..block).cartesian_product(0..block) {
        units.push(
            (1..=block)
                .cartesian_product(1..=block)
                .map(|(r, c)| (br * block + r, bc * block + c))
                .collect(),
        );
    }

    units
        .iter()
        .flat_map(|cells| (1..=n).flat_map(move |num| at_most_one(size, cells, num)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sudoku {
    pub board: Board,
    pub size: Size,
}

impl Sudoku {
    /// Wraps `board`, returning `None` unless it is a square 4, 9 or 16 board
    /// with every value in range.
    #[must_use]
    pub fn new(board: Board) -> Option<Self> {
        let size = Size::try_from(board.0.len()).ok()?;
        let n = size as usize;
        let valid = board.rows().all(|r| r.len() == n && r.iter().all(|&v| v <= n));
        valid.then_some(Self { board, size })
    }

    /// Positions of the givens, row-major.
    pub fn givens(&self) -> impl Iterator<Item = Variable> + '_ {
        self.board.rows().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .map(move |(c, &v)| Variable::new(r + 1, c + 1, v))
        })
    }

    /// First given that repeats a value in its row, column or box.
    #[must_use]
    pub fn conflicting_given(&self) -> Option<Variable> {
        let block = self.size.block_size();
        let givens = self.givens().collect_vec();
        givens.iter().copied().find(|a| {
            givens.iter().any(|b| {
                a != b
                    && a.num == b.num
                    && (a.row == b.row
                        || a.col == b.col
                        || ((a.row - 1) / block == (b.row - 1) / block
                            && (a.col - 1) / block == (b.col - 1) / block))
            })
        })
    }

    /// Whether every cell is filled and no value repeats in a row, column or box.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.givens().count() == self.size as usize * self.size as usize
            && self.conflicting_given().is_none()
    }

    /// The rules for this board size plus one unit clause per given.
    #[must_use]
    pub fn to_cnf(&self) -> Cnf {
        let rules = generate_cell_clauses(self.size)
            .into_iter()
            .chain(generate_unit_clauses(self.size));
        let givens = self
            .givens()
            .map(|v| Clause::new([v.literal(self.size, true)]))
            .collect_vec();

        log::debug!(
            target: targets::SUDOKU,
            "Encoding {0}x{0} board with {1} givens",
            self.size as usize,
            givens.len()
        );
        Cnf::new(rules.chain(givens))
    }

    /// Reads the filled board out of a model of `to_cnf`.
    #[must_use]
    pub fn decode(&self, solutions: &Solutions) -> Self {
        let n = self.size as usize;
        let mut board = vec![vec![0; n]; n];
        for lit in solutions.positives() {
            if let Some(v) = Variable::decode(lit.variable(), self.size) {
                board[v.row - 1][v.col - 1] = v.num;
            }
        }
        Self {
            board: Board::new(board),
            size: self.size,
        }
    }
}

fn cell_symbol(value: usize) -> char {
    match value {
        0 => '.',
        1..=9 => char::from(b'0' + value as u8),
        _ => char::from(b'A' + (value - 10) as u8),
    }
}

fn symbol_value(symbol: char) -> Option<usize> {
    match symbol {
        '.' => Some(0),
        '0'..='9' => symbol.to_digit(10).map(|d| d as usize),
        'A'..='G' | 'a'..='g' => Some(symbol.to_ascii_uppercase() as usize - 'A' as usize + 10),
        _ => None,
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<Sudoku, SudokuError> {
    let symbols = line.chars().collect_vec();
    let size = Size::from_cells(symbols.len()).ok_or(SudokuError::InvalidLength {
        line: line_no,
        length: symbols.len(),
    })?;
    let n = size as usize;

    let mut cells = Vec::with_capacity(symbols.len());
    for (i, &symbol) in symbols.iter().enumerate() {
        match symbol_value(symbol) {
            Some(v) if v <= n => cells.push(v),
            _ => {
                return Err(SudokuError::InvalidCell {
                    line: line_no,
                    column: i + 1,
                    symbol,
                });
            }
        }
    }

    let sudoku = Sudoku {
        board: Board::new(cells.chunks(n).map(<[usize]>::to_vec).collect()),
        size,
    };
    match sudoku.conflicting_given() {
        Some(v) => Err(SudokuError::GivenConflict {
            line: line_no,
            row: v.row,
            col: v.col,
        }),
        None => Ok(sudoku),
    }
}

impl FromStr for Sudoku {
    type Err = SudokuError;

    /// Parses one puzzle line: cells row by row, `.` or `0` for blanks and
    /// `A` to `G` for 10 to 16.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_line(s.trim(), 1)
    }
}

impl fmt::Display for Sudoku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let block = self.size.block_size();
        for (r, row) in self.board.rows().enumerate() {
            if r > 0 && r % block == 0 {
                writeln!(f)?;
            }
            let line = row
                .chunks(block)
                .map(|chunk| chunk.iter().map(|&v| cell_symbol(v)).join(" "))
                .join("  ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Parses every non-blank line of `input` as a puzzle.
///
/// # Errors
///
/// The first line that fails to parse, with its 1-based line number.
pub fn parse_sudokus(input: &str) -> Result<Vec<Sudoku>, SudokuError> {
    input
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
        .map(|(i, l)| parse_line(l, i))
        .collect()
}

/// Reads and parses a puzzle file, one puzzle per line.
///
/// # Errors
///
/// `SudokuError::Io` if the file cannot be read, otherwise see `parse_sudokus`.
pub fn parse_sudoku_file<P: AsRef<Path>>(path: P) -> Result<Vec<Sudoku>, SudokuError> {
    let input = std::fs::read_to_string(path)?;
    let sudokus = parse_sudokus(&input)?;
    log::debug!(target: targets::SUDOKU, "Read {} puzzles", sudokus.len());
    Ok(sudokus)
}
