//! Constants for board dimensions, search parameters, and playout limits.
//!
//! This module contains the configuration defaults for the engine. Board
//! size is chosen at runtime (see [`crate::board::Board::new`]); everything
//! here is a default that the command line or [`crate::mcts::SearchConfig`]
//! can override.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default board size (NxN).
pub const DEFAULT_DIM: usize = 19;

/// Largest supported board side. Column letters run out past 25 (A-Z minus I).
pub const MAX_DIM: usize = 25;

/// Column letters used for coordinates. 'I' is skipped by Go convention.
pub const COLUMN_LETTERS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

// =============================================================================
// UCT Search Parameters
// =============================================================================

/// Default number of search iterations (one playout each) per move.
pub const DEFAULT_ITERATIONS: usize = 1000;

/// Exploration constant `c` in the confidence bound.
pub const EXPLORATION: f64 = 1.4;

/// Initial win count of a new node.
pub const PRIOR_WINS: u32 = 1;

/// Initial play count of a new node.
pub const PRIOR_PLAYS: u32 = 2;

/// Score a child must beat in `select_for_play` to be preferred over passing.
pub const PASS_BASELINE: f64 = 0.0;

/// Progress report period (number of iterations between log lines).
pub const REPORT_PERIOD: usize = 200;

// =============================================================================
// Playout Limits
// =============================================================================

/// A playout stops after `PLAYOUT_LENGTH_FACTOR * area` plies even without
/// two consecutive passes. Ko fights under the ko-unaware fast check could
/// otherwise cycle for a long time.
pub const PLAYOUT_LENGTH_FACTOR: usize = 3;
