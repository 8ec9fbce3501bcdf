//! Go Text Protocol (GTP) front end.
//!
//! Implements the subset of GTP version 2 needed to play a game from a
//! graphical client such as Sabaki or GoGui.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <size>` - any size from 1 to 25
//! - `clear_board`
//! - `play <color> <vertex>`
//! - `genmove <color>` - search with a fresh tree, then play the result
//! - `showboard`
//! - `final_score`
//!
//! ## Example
//!
//! ```no_run
//! use calico::gtp::GtpEngine;
//! use calico::mcts::SearchConfig;
//!
//! let mut engine = GtpEngine::new(19, SearchConfig::default());
//! engine.run(std::io::stdin().lock(), std::io::stdout())?;
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, BufRead, Write};

use fastrand::Rng;

use crate::board::{Board, Color};
use crate::constants::MAX_DIM;
use crate::mcts::{SearchConfig, Tree};
use crate::playout::PolicyKind;
use crate::position::parse_move;

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "final_score",
    "genmove",
    "known_command",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// GTP engine state.
pub struct GtpEngine {
    board: Board,
    config: SearchConfig,
    policy: PolicyKind,
    /// Draws one seed per search, so a seeded engine replays the same game.
    rng: Rng,
}

impl Default for GtpEngine {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_DIM, SearchConfig::default())
    }
}

impl GtpEngine {
    pub fn new(size: usize, config: SearchConfig) -> Self {
        Self::with_policy(size, config, PolicyKind::default())
    }

    pub fn with_policy(size: usize, config: SearchConfig, policy: PolicyKind) -> Self {
        let rng = config.seed.map_or_else(Rng::new, Rng::with_seed);
        Self {
            board: Board::new(size),
            config,
            policy,
            rng,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Run the command loop until `quit` or end of input.
    ///
    /// # Errors
    /// Only I/O errors on `input` or `output`; command failures are reported
    /// to the client as `?` responses.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);

            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    fn parse_color(arg: &str) -> Option<Color> {
        match arg.to_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&arg.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<usize>() {
                    Ok(size) if (1..=MAX_DIM).contains(&size) => {
                        self.board = Board::new(size);
                        (true, String::new())
                    }
                    Ok(_) => (false, "unacceptable size".to_string()),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => {
                self.board = Board::new(self.board.xdim());
                (true, String::new())
            }

            "play" => {
                let [color, vertex, ..] = args else {
                    return (false, "missing arguments".to_string());
                };
                let Some(color) = Self::parse_color(color) else {
                    return (false, "invalid color".to_string());
                };
                let mv = match parse_move(vertex) {
                    Ok(mv) => mv,
                    Err(e) => return (false, format!("invalid vertex: {e}")),
                };
                match self.board.place(mv, color) {
                    Ok(_) => {
                        self.board.set_player(-color);
                        (true, String::new())
                    }
                    Err(e) => (false, format!("illegal move {e}")),
                }
            }

            "genmove" => {
                let Some(color) = args.first().and_then(|a| Self::parse_color(a)) else {
                    return (false, "invalid color".to_string());
                };
                self.board.set_player(color);

                let config = SearchConfig {
                    seed: Some(self.rng.u64(..)),
                    ..self.config
                };
                let mut tree = Tree::with_policy(self.board.clone(), config, self.policy);
                let mv = tree.search();

                match self.board.play(mv) {
                    Ok(_) => {
                        log::info!("{color} plays {mv}");
                        (true, mv.to_string())
                    }
                    Err(e) => (false, format!("engine chose an illegal move {e}")),
                }
            }

            "showboard" => (true, format!("\n{}", self.board)),

            "final_score" => {
                let score = self.board.score();
                let result = match score.winner() {
                    Color::Black => format!("B+{}", score.net),
                    _ => format!("W+{}", -score.net),
                };
                (true, result)
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
