//! Board model and match detector for the cascade engine.
//!
//! This module defines:
//! - `Tile`: the token kinds that can occupy a cell, plus the empty marker.
//! - `Palette`: the validated set of token kinds new tokens are drawn from.
//! - `Board`: a square grid stored row-major in a flat vector, with pure
//!   queries (`find_matches`, `is_valid_move`) and the in-place mutations the
//!   cascade controller drives (`swap`, `clear`, `gravity_step`).
use crate::error::{ConfigError, EngineError};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of aligned same-kind tiles that form a match.
pub const MIN_RUN: usize = 3;

/// Default grid side length.
pub const DEFAULT_SIDE: usize = 8;

/// Represents the kind of token in a cell.
///
/// Each variant corresponds to a candy color, or the empty state a cell is
/// in between being cleared and being refilled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// A cleared cell waiting for gravity or refill.
    Empty,
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Cyan,
}

impl Tile {
    /// Every non-empty tile, in palette order.
    pub const COLORS: [Tile; 6] = [
        Tile::Red,
        Tile::Green,
        Tile::Blue,
        Tile::Yellow,
        Tile::Purple,
        Tile::Cyan,
    ];

    /// Converts the tile to its character representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use candy_cascade::board::Tile;
    /// assert_eq!(Tile::Red.to_char(), 'R');
    /// assert_eq!(Tile::Empty.to_char(), '.');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Red => 'R',
            Tile::Green => 'G',
            Tile::Blue => 'B',
            Tile::Yellow => 'Y',
            Tile::Purple => 'P',
            Tile::Cyan => 'C',
        }
    }

    /// Parses the character form produced by [`Tile::to_char`].
    pub fn from_char(ch: char) -> Option<Tile> {
        match ch {
            '.' => Some(Tile::Empty),
            'R' => Some(Tile::Red),
            'G' => Some(Tile::Green),
            'B' => Some(Tile::Blue),
            'Y' => Some(Tile::Yellow),
            'P' => Some(Tile::Purple),
            'C' => Some(Tile::Cyan),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Tile::Empty
    }

    /// Returns the ANSI background color code for terminal output.
    fn to_ansi_color_code(&self) -> &'static str {
        match self {
            Tile::Empty => "40",
            Tile::Red => "41",
            Tile::Green => "42",
            Tile::Yellow => "43",
            Tile::Blue => "44",
            Tile::Purple => "45",
            Tile::Cyan => "46",
        }
    }
}

/// The set of token kinds new tiles are sampled from.
///
/// A palette is never empty, never contains `Tile::Empty` and holds each
/// color at most once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    tiles: Vec<Tile>,
}

impl Palette {
    /// Builds a palette from a list of colors.
    ///
    /// # Returns
    /// * `Ok(Palette)` if `tiles` is non-empty, contains no `Tile::Empty`
    ///   and no duplicates.
    /// * `Err(ConfigError::Validation)` otherwise.
    pub fn new(tiles: Vec<Tile>) -> Result<Self, ConfigError> {
        if tiles.is_empty() {
            return Err(ConfigError::Validation("palette must not be empty".into()));
        }
        if tiles.contains(&Tile::Empty) {
            return Err(ConfigError::Validation(
                "palette must not contain Empty".into(),
            ));
        }
        for (i, tile) in tiles.iter().enumerate() {
            if tiles[..i].contains(tile) {
                return Err(ConfigError::Validation(format!(
                    "palette lists {:?} more than once",
                    tile
                )));
            }
        }
        Ok(Palette { tiles })
    }

    /// The first `count` colors of [`Tile::COLORS`].
    pub fn first(count: usize) -> Result<Self, ConfigError> {
        if count > Tile::COLORS.len() {
            return Err(ConfigError::Validation(format!(
                "at most {} colors are available, asked for {}",
                Tile::COLORS.len(),
                count
            )));
        }
        Palette::new(Tile::COLORS[..count].to_vec())
    }

    /// All six colors.
    pub fn standard() -> Self {
        Palette {
            tiles: Tile::COLORS.to_vec(),
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Draws one tile uniformly at random.
    pub fn sample(&self, rng: &mut impl Rng) -> Tile {
        self.tiles[rng.gen_range(0..self.tiles.len())]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::standard()
    }
}

/// Result of a single gravity pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GravityStep {
    /// Tiles that fell one row.
    pub moved: u32,
    /// Fresh tiles generated in the top row.
    pub spawned: u32,
}

impl GravityStep {
    /// True if the pass modified at least one cell.
    pub fn changed(&self) -> bool {
        self.moved > 0 || self.spawned > 0
    }
}

/// A square game board stored as a flat, row-major vector of tiles.
///
/// Cell `index` lives at row `index / side`, column `index % side`. The
/// length of the vector is fixed at `side * side` for the board's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    side: usize,
    cells: Vec<Tile>,
}

impl Board {
    /// Creates a board of the given side with every cell set to `Tile::Empty`.
    ///
    /// # Examples
    /// ```
    /// use candy_cascade::board::{Board, Tile};
    /// let board = Board::new_empty(8);
    /// assert_eq!(board.len(), 64);
    /// assert_eq!(board.get(0), Tile::Empty);
    /// ```
    pub fn new_empty(side: usize) -> Self {
        Board {
            side,
            cells: vec![Tile::Empty; side * side],
        }
    }

    /// Creates a board with every cell independently and uniformly sampled
    /// from `palette`.
    ///
    /// The result may already contain matches.
    pub fn new_random(side: usize, palette: &Palette, rng: &mut impl Rng) -> Self {
        let cells = (0..side * side).map(|_| palette.sample(rng)).collect();
        Board { side, cells }
    }

    /// Same as [`Board::new_random`] with a `SmallRng` seeded from `seed`, so
    /// the same seed always yields the same board.
    pub fn new_random_with_seed(side: usize, palette: &Palette, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        Board::new_random(side, palette, &mut rng)
    }

    /// Creates a board from a row-major list of cells.
    ///
    /// # Returns
    /// `Err(EngineError::CellCount)` if `cells.len() != side * side`.
    pub fn from_cells(side: usize, cells: Vec<Tile>) -> Result<Self, EngineError> {
        let expected = side * side;
        if cells.len() != expected {
            return Err(EngineError::CellCount {
                side,
                expected,
                found: cells.len(),
            });
        }
        Ok(Board { side, cells })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Number of cells, always `side * side`.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// The cells in row-major order, suitable for direct display.
    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    /// Returns the tile at `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn get(&self, index: usize) -> Tile {
        self.cells[index]
    }

    /// Sets the tile at `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn set(&mut self, index: usize, tile: Tile) {
        self.cells[index] = tile;
    }

    pub fn index_of(&self, row: usize, col: usize) -> usize {
        row * self.side + col
    }

    pub fn row_col(&self, index: usize) -> (usize, usize) {
        (index / self.side, index % self.side)
    }

    /// Rejects indices outside the board.
    pub fn check_index(&self, index: usize) -> Result<(), EngineError> {
        if index < self.cells.len() {
            Ok(())
        } else {
            Err(EngineError::IndexOutOfRange {
                index,
                len: self.cells.len(),
            })
        }
    }

    /// True if no cell is empty.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|t| !t.is_empty())
    }

    /// Swaps two cells in place.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.cells.swap(a, b);
    }

    /// Grid adjacency: same row and one column apart, or same column and one
    /// row apart. Indices `side - 1` and `side` differ by one but sit on
    /// different rows, so they are not adjacent.
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        let diff = a.abs_diff(b);
        (diff == 1 && a / self.side == b / self.side) || diff == self.side
    }

    /// Finds every cell that is part of a horizontal or vertical run of at
    /// least [`MIN_RUN`] identical non-empty tiles.
    ///
    /// Each row and each column is scanned once for maximal runs. A cell
    /// that belongs to both a horizontal and a vertical run is reported once.
    ///
    /// # Returns
    /// The matched indices in ascending order, without duplicates. Empty if
    /// the board has no match.
    ///
    /// # Examples
    /// ```
    /// use candy_cascade::utils::board_from_str_array;
    /// let board = board_from_str_array(&["RGG", "RRR", "GGR"]).unwrap();
    /// assert_eq!(board.find_matches(), vec![3, 4, 5]);
    /// ```
    pub fn find_matches(&self) -> Vec<usize> {
        let mut matched = vec![false; self.cells.len()];
        for line in 0..self.side {
            self.mark_runs(line * self.side, 1, &mut matched);
            self.mark_runs(line, self.side, &mut matched);
        }
        matched
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
            .collect()
    }

    /// Marks the members of every run of `MIN_RUN` or more along one line of
    /// `side` cells starting at `start` and advancing by `stride`.
    fn mark_runs(&self, start: usize, stride: usize, matched: &mut [bool]) {
        let at = |k: usize| start + k * stride;
        let mut run_start = 0;
        for k in 1..=self.side {
            let continues = k < self.side && {
                let tile = self.cells[at(k)];
                !tile.is_empty() && tile == self.cells[at(run_start)]
            };
            if continues {
                continue;
            }
            if k - run_start >= MIN_RUN && !self.cells[at(run_start)].is_empty() {
                for j in run_start..k {
                    matched[at(j)] = true;
                }
            }
            run_start = k;
        }
    }

    /// Checks whether swapping `a` and `b` is a legal move.
    ///
    /// A move is legal if the two cells are adjacent (see
    /// [`Board::are_adjacent`]) and the swap, applied to a scratch copy,
    /// produces at least one match. `self` is never modified.
    ///
    /// Swapping two tiles of the same kind leaves the board unchanged, so its
    /// result is whatever the current board's match state is.
    ///
    /// # Returns
    /// `Err(EngineError::IndexOutOfRange)` if either index is off the board.
    pub fn is_valid_move(&self, a: usize, b: usize) -> Result<bool, EngineError> {
        self.check_index(a)?;
        self.check_index(b)?;
        if !self.are_adjacent(a, b) {
            return Ok(false);
        }
        let mut scratch = self.clone();
        scratch.swap(a, b);
        Ok(!scratch.find_matches().is_empty())
    }

    /// Empties the given cells.
    ///
    /// # Returns
    /// The number of cells that held a tile before the call.
    ///
    /// # Panics
    /// Panics if any index is out of range.
    pub fn clear(&mut self, indices: &[usize]) -> u32 {
        let mut cleared = 0;
        for &index in indices {
            if !self.cells[index].is_empty() {
                self.cells[index] = Tile::Empty;
                cleared += 1;
            }
        }
        cleared
    }

    /// Runs one gravity pass from the last cell to the first.
    ///
    /// An empty top-row cell receives a tile sampled from `palette`. Any
    /// other empty cell pulls the tile directly above it down by one row,
    /// leaving the source empty. An empty cell under another empty cell is
    /// left alone; it fills on a later pass.
    pub fn gravity_step(&mut self, palette: &Palette, rng: &mut impl Rng) -> GravityStep {
        let side = self.side;
        let mut step = GravityStep::default();
        for i in (0..self.cells.len()).rev() {
            if !self.cells[i].is_empty() {
                continue;
            }
            if i < side {
                self.cells[i] = palette.sample(rng);
                step.spawned += 1;
            } else if !self.cells[i - side].is_empty() {
                self.cells[i] = self.cells[i - side];
                self.cells[i - side] = Tile::Empty;
                step.moved += 1;
            }
        }
        step
    }

    /// Renders the board with ANSI colors, row and column numbers. If `pos`
    /// is `Some(index)`, that cell is drawn with a marker.
    pub fn to_string_with_highlight(&self, pos: Option<usize>) -> String {
        let mut output = String::new();

        output.push_str("  ");
        for c_idx in 0..self.side {
            output.push_str(&format!("{:<2}", c_idx));
        }
        output.push('\n');

        for r_idx in 0..self.side {
            output.push_str(&format!("{:<2}", r_idx));

            for c_idx in 0..self.side {
                let index = self.index_of(r_idx, c_idx);
                let color_code = self.cells[index].to_ansi_color_code();
                let content = if pos == Some(index) { ".." } else { "  " };
                output.push_str(&format!("\x1b[1;{};m{}\x1b[m", color_code, content));
            }
            if r_idx + 1 < self.side {
                output.push('\n');
            }
        }

        output
    }

    /// One line of tile characters per row, e.g. `"RGB\nYPC\n..."`.
    pub fn to_plain_string(&self) -> String {
        self.cells
            .chunks(self.side.max(1))
            .map(|row| row.iter().map(Tile::to_char).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}
