//! # Candy Cascade Library
//!
//! This library provides the core of a match-3 puzzle: a square grid of
//! colored tiles where swapping two neighbours that lines up three or more
//! of a kind clears them, lets the column above fall, refills the top row
//! and repeats until the board is stable.
//!
//! It is used by two binaries:
//! - `human_player`: Allows interactive gameplay via the command line.
//! - `autoplay`: Plays seeded boards with the strategies from `hints` and
//!   reports their average scores.
//!
//! ## Modules
//! - `board`: Tiles, palettes and the `Board` grid with match detection,
//!   move validation and the one-row gravity pass.
//! - `cascade`: The `Cascade` controller that owns a session and resolves a
//!   move tick by tick.
//! - `driver`: `TickDriver`, the fixed-interval timer that calls the
//!   controller and discards ticks scheduled for a replaced board.
//! - `config`: `EngineConfig`, loadable from TOML.
//! - `hints`: Valid-move enumeration and move-choice strategies.
//! - `error`: Error types.
//! - `utils`: Parsing boards from row strings.

pub mod board;
pub mod cascade;
pub mod config;
pub mod driver;
pub mod error;
pub mod hints;
pub mod utils;
