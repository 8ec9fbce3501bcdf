//! Calico: a small Go engine built on UCT search.
//!
//! The board tracks groups with a union-find forest, so liberty counts and
//! captures are maintained incrementally. Moves are evaluated by Monte Carlo
//! playouts whose move choice comes from pluggable weightings and samplers,
//! and a UCT tree aggregates those playouts into a move decision.
//!
//! ## Modules
//!
//! - [`constants`] - Default board size and search parameters
//! - [`position`] - Points, moves and coordinate text
//! - [`board`] - Rules engine: groups, liberties, captures, ko, scoring
//! - [`policy`] - Move weightings for playouts
//! - [`sampler`] - Drawing moves from a weighting
//! - [`playout`] - Random game simulation for position evaluation
//! - [`mcts`] - UCT search tree
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use calico::board::Board;
//! use calico::mcts::{SearchConfig, Tree};
//! use calico::position::parse_move;
//!
//! // Create a new game and play a move
//! let mut board = Board::new(9);
//! board.play(parse_move("E5")?)?;
//!
//! // Search for White's reply
//! let config = SearchConfig { iterations: 100, seed: Some(7), ..SearchConfig::default() };
//! let mut tree = Tree::new(board.clone(), config);
//! let reply = tree.search();
//! board.play(reply)?;
//! println!("White plays {reply}\n{board}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod board;
pub mod constants;
pub mod gtp;
pub mod mcts;
pub mod playout;
pub mod policy;
pub mod position;
pub mod sampler;
