//! Monte Carlo playouts (random game simulation).
//!
//! A playout copies a board and plays it out to the end: each ply asks a
//! [`PlayoutPolicy`] for a move on the current position, places it without
//! strict validation, and hands the turn over. Two consecutive passes end
//! the game. The policy is consulted afresh every ply because move weights
//! depend on the position.

use std::str::FromStr;

use fastrand::Rng;

use crate::board::{Board, Color};
use crate::constants::PLAYOUT_LENGTH_FACTOR;
use crate::policy::{Cached, Light};
use crate::position::Move;
use crate::sampler::{MoveSampler, PrioritySampler, RandomWeighted};

/// Chooses one move per ply for the player to move on `board`.
///
/// Implementations build whatever sampler they need for the position at
/// hand. Returned moves must pass [`Board::check_fast`]; playouts place them
/// unchecked.
pub trait PlayoutPolicy {
    fn choose(&mut self, board: &Board, rng: &mut Rng) -> Move;
}

impl<F> PlayoutPolicy for F
where
    F: FnMut(&Board, &mut Rng) -> Move,
{
    fn choose(&mut self, board: &Board, rng: &mut Rng) -> Move {
        self(board, rng)
    }
}

/// The built-in playout policies. All of them weigh moves with
/// [`Light`]; they differ in how they sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyKind {
    /// Rejection sampling straight from the light weights.
    #[default]
    Light,
    /// Rejection sampling from a cached snapshot of the light weights.
    CachedLight,
    /// First pick of a randomized priority sampler.
    Priority,
}

impl PlayoutPolicy for PolicyKind {
    fn choose(&mut self, board: &Board, rng: &mut Rng) -> Move {
        match self {
            PolicyKind::Light => RandomWeighted::new(Light::new(board)).next_move(rng),
            PolicyKind::CachedLight => {
                RandomWeighted::new(Cached::new(&Light::new(board))).next_move(rng)
            }
            PolicyKind::Priority => {
                PrioritySampler::randomized(&Light::new(board), rng).next_move(rng)
            }
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(PolicyKind::Light),
            "cached" | "cached-light" => Ok(PolicyKind::CachedLight),
            "priority" => Ok(PolicyKind::Priority),
            other => Err(format!("unknown policy '{other}' (light, cached, priority)")),
        }
    }
}

/// Play `start` out to the end and return the final board.
///
/// `start` is left untouched. The game ends after two consecutive passes,
/// or after `PLAYOUT_LENGTH_FACTOR * area` plies.
pub fn playout<P: PlayoutPolicy + ?Sized>(start: &Board, policy: &mut P, rng: &mut Rng) -> Board {
    let mut board = start.clone();
    let max_plies = PLAYOUT_LENGTH_FACTOR * board.area();
    let mut passes = 0;
    let mut plies = 0;

    while passes < 2 {
        if plies >= max_plies {
            log::trace!("playout cut off after {plies} plies");
            break;
        }
        let mv = policy.choose(&board, rng);
        let player = board.player();
        board.place_unchecked(mv, player);
        board.set_player(-player);

        passes = if mv.is_pass() { passes + 1 } else { 0 };
        plies += 1;
    }
    board
}

/// Winner of one playout from `start`.
pub fn playout_winner<P: PlayoutPolicy + ?Sized>(
    start: &Board,
    policy: &mut P,
    rng: &mut Rng,
) -> Color {
    playout(start, policy, rng).score().winner()
}

/// Fraction of `tries` playouts from `board` won by `player`.
pub fn winrate<P: PlayoutPolicy + ?Sized>(
    board: &Board,
    player: Color,
    tries: usize,
    policy: &mut P,
    rng: &mut Rng,
) -> f64 {
    if tries == 0 {
        return 0.0;
    }
    let wins = (0..tries)
        .filter(|_| playout_winner(board, policy, rng) == player)
        .count();
    wins as f64 / tries as f64
}
