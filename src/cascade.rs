//! Cascade controller: owns a session's mutable state and resolves moves
//! tick by tick.
//!
//! A committed swap puts the controller in [`Phase::Swapped`]. Each call to
//! [`Cascade::resolve_tick`] then either clears every current match
//! ([`Phase::Cleared`]) or runs one gravity pass ([`Phase::Collapsing`]).
//! A tick that finds no match and moves nothing returns the controller to
//! [`Phase::Idle`], where it accepts input again.
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument, trace};

use crate::board::{Board, Palette};
use crate::config::EngineConfig;
use crate::error::EngineError;

/// Upper bound on re-sampling rounds when a match-free start is requested.
const MAX_REROLL_ROUNDS: usize = 10_000;

/// Where the controller is in its resolution cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Stable board, accepting moves.
    Idle,
    /// A move was just applied; the next tick clears its matches.
    Swapped,
    /// Matches were emptied; the next tick starts the collapse.
    Cleared,
    /// Tiles are falling or being refilled.
    Collapsing,
}

/// What happened to a move request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The swap was legal and is now on the board.
    Applied,
    /// The swap was not adjacent or produced no match. The board is unchanged.
    Rejected,
    /// Nothing to do: no pending selection, or a cascade is in progress.
    Ignored,
}

/// The work a single tick performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickStep {
    /// `cells` matched tiles were emptied; `chain` counts clears since the move.
    Cleared { cells: u32, chain: u32 },
    /// A gravity pass moved or generated tiles.
    Collapsed { moved: u32, spawned: u32 },
    /// Nothing changed; the board is stable.
    Settled,
}

/// Immutable copy of the observable session state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub score: u32,
    pub phase: Phase,
    pub busy: bool,
    pub pending: Option<usize>,
    pub moves: u32,
    pub chain: u32,
}

/// Outcome of [`Cascade::resolve_tick`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub step: TickStep,
    pub snapshot: Snapshot,
}

/// A game session: board, score, pending selection and resolution phase.
///
/// # Examples
/// ```
/// use candy_cascade::cascade::{Cascade, MoveOutcome};
/// use candy_cascade::config::EngineConfig;
///
/// let config = EngineConfig { seed: Some(7), reroll_initial_matches: true, ..EngineConfig::default() };
/// let mut game = Cascade::new(&config).unwrap();
/// assert!(!game.is_busy());
///
/// // Moves that do not produce a match leave the board alone.
/// assert_eq!(game.commit_move(0, 2).unwrap(), MoveOutcome::Rejected);
///
/// // Resolve until the board is stable again.
/// while game.is_busy() {
///     game.resolve_tick();
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Cascade {
    board: Board,
    palette: Palette,
    rng: SmallRng,
    reroll_initial_matches: bool,
    score: u32,
    pending: Option<usize>,
    phase: Phase,
    moves: u32,
    chain: u32,
    generation: u64,
}

impl Cascade {
    /// Starts a session with a freshly generated board.
    ///
    /// Unless `reroll_initial_matches` is set, the board may start with
    /// matches; the session then starts busy and the first ticks clear them,
    /// scoring as usual.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let palette = config.build_palette()?;
        let mut rng = session_rng(config.seed);
        let board = generate_board(
            config.side,
            &palette,
            &mut rng,
            config.reroll_initial_matches,
        )?;
        Ok(Self::assemble(config, board, palette, rng))
    }

    /// Starts a session on a given board, e.g. a parsed fixture.
    ///
    /// A board with matches or empty cells starts busy.
    pub fn with_board(config: &EngineConfig, board: Board) -> Result<Self, EngineError> {
        config.validate()?;
        if board.side() != config.side {
            return Err(EngineError::SideMismatch {
                expected: config.side,
                found: board.side(),
            });
        }
        let palette = config.build_palette()?;
        let rng = session_rng(config.seed);
        Ok(Self::assemble(config, board, palette, rng))
    }

    fn assemble(config: &EngineConfig, board: Board, palette: Palette, rng: SmallRng) -> Self {
        let phase = initial_phase(&board);
        info!(
            side = board.side(),
            colors = palette.len(),
            ?phase,
            "session started"
        );
        Cascade {
            board,
            palette,
            rng,
            reroll_initial_matches: config.reroll_initial_matches,
            score: 0,
            pending: None,
            phase,
            moves: 0,
            chain: 0,
            generation: 0,
        }
    }

    /// Replaces the board with a fresh one and resets score and counters.
    ///
    /// Bumps the generation, so ticks scheduled for the old board are stale.
    pub fn new_session(&mut self) -> Result<(), EngineError> {
        let board = generate_board(
            self.board.side(),
            &self.palette,
            &mut self.rng,
            self.reroll_initial_matches,
        )?;
        self.phase = initial_phase(&board);
        self.board = board;
        self.score = 0;
        self.pending = None;
        self.moves = 0;
        self.chain = 0;
        self.generation += 1;
        info!(generation = self.generation, phase = ?self.phase, "new session");
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn side(&self) -> usize {
        self.board.side()
    }

    /// Total cells cleared this session.
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a cascade is being resolved; input is not accepted.
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// The cell selected by [`Cascade::select`], if any.
    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    /// Number of moves applied this session.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Bumped on every applied move and every board replacement.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            score: self.score,
            phase: self.phase,
            busy: self.is_busy(),
            pending: self.pending,
            moves: self.moves,
            chain: self.chain,
        }
    }

    /// Records `index` as the first cell of a move (drag start).
    ///
    /// # Returns
    /// * `Ok(true)` if the selection was recorded.
    /// * `Ok(false)` if a cascade is in progress; the request is dropped.
    /// * `Err(EngineError::IndexOutOfRange)` for an index off the board.
    pub fn select(&mut self, index: usize) -> Result<bool, EngineError> {
        self.board.check_index(index)?;
        if self.is_busy() {
            trace!(index, "selection ignored while busy");
            return Ok(false);
        }
        self.pending = Some(index);
        Ok(true)
    }

    pub fn cancel_selection(&mut self) {
        self.pending = None;
    }

    /// Completes a move started with [`Cascade::select`] (drop on `target`).
    ///
    /// Returns `MoveOutcome::Ignored` when nothing is selected or a cascade
    /// is in progress; otherwise behaves like [`Cascade::commit_move`].
    pub fn drop_on(&mut self, target: usize) -> Result<MoveOutcome, EngineError> {
        self.board.check_index(target)?;
        let source = match self.pending {
            Some(source) if !self.is_busy() => source,
            _ => return Ok(MoveOutcome::Ignored),
        };
        self.commit_move(source, target)
    }

    /// Swaps `a` and `b` on the live board if the move is valid.
    ///
    /// The pending selection is cleared whether or not the move is applied.
    ///
    /// # Returns
    /// * `Ok(MoveOutcome::Applied)`: the swap is on the board and the
    ///   controller is in [`Phase::Swapped`].
    /// * `Ok(MoveOutcome::Rejected)`: not adjacent or no resulting match.
    /// * `Err(EngineError::Busy)` if called during a cascade.
    /// * `Err(EngineError::IndexOutOfRange)` for an index off the board.
    #[instrument(skip(self), level = "debug")]
    pub fn commit_move(&mut self, a: usize, b: usize) -> Result<MoveOutcome, EngineError> {
        if self.is_busy() {
            return Err(EngineError::Busy);
        }
        let valid = self.board.is_valid_move(a, b)?;
        self.pending = None;
        if !valid {
            debug!("move rejected");
            return Ok(MoveOutcome::Rejected);
        }

        self.board.swap(a, b);
        self.phase = Phase::Swapped;
        self.moves += 1;
        self.chain = 0;
        self.generation += 1;
        debug!(moves = self.moves, "move applied");
        Ok(MoveOutcome::Applied)
    }

    /// Runs one resolution step.
    ///
    /// 1. If the board has matches, empty them, add their count to the score
    ///    and stop; falling waits for the next tick.
    /// 2. Otherwise run one gravity pass (see [`Board::gravity_step`]).
    /// 3. If the pass changed anything the cascade continues, else the
    ///    controller goes idle.
    pub fn resolve_tick(&mut self) -> TickReport {
        let matches = self.board.find_matches();
        let step = if !matches.is_empty() {
            let cleared = self.board.clear(&matches);
            self.score += cleared;
            self.chain += 1;
            self.phase = Phase::Cleared;
            debug!(cleared, chain = self.chain, score = self.score, "matches cleared");
            TickStep::Cleared {
                cells: cleared,
                chain: self.chain,
            }
        } else {
            let gravity = self.board.gravity_step(&self.palette, &mut self.rng);
            if gravity.changed() {
                self.phase = Phase::Collapsing;
                trace!(moved = gravity.moved, spawned = gravity.spawned, "gravity pass");
                TickStep::Collapsed {
                    moved: gravity.moved,
                    spawned: gravity.spawned,
                }
            } else {
                if self.phase != Phase::Idle {
                    debug!(score = self.score, chain = self.chain, "board settled");
                }
                self.phase = Phase::Idle;
                self.chain = 0;
                TickStep::Settled
            }
        };

        TickReport {
            step,
            snapshot: self.snapshot(),
        }
    }
}

fn session_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

/// A board is idle-ready only if it is full and has no match.
fn initial_phase(board: &Board) -> Phase {
    if board.is_full() && board.find_matches().is_empty() {
        Phase::Idle
    } else {
        Phase::Collapsing
    }
}

fn generate_board(
    side: usize,
    palette: &Palette,
    rng: &mut impl Rng,
    reroll_initial_matches: bool,
) -> Result<Board, EngineError> {
    let board = Board::new_random(side, palette, rng);
    if !reroll_initial_matches {
        return Ok(board);
    }
    reroll_matches(board, palette, rng, MAX_REROLL_ROUNDS)
}

/// Re-samples matched cells until the board is match-free, giving up after
/// `max_rounds` rounds.
fn reroll_matches(
    mut board: Board,
    palette: &Palette,
    rng: &mut impl Rng,
    max_rounds: usize,
) -> Result<Board, EngineError> {
    for _ in 0..max_rounds {
        let matches = board.find_matches();
        if matches.is_empty() {
            return Ok(board);
        }
        for index in matches {
            board.set(index, palette.sample(rng));
        }
    }
    if board.find_matches().is_empty() {
        Ok(board)
    } else {
        Err(EngineError::UnstableStart {
            attempts: max_rounds,
        })
    }
}
