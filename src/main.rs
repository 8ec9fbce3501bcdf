//! Calico: a Go engine driven by UCT search over light playouts.
//!
//! ## Usage
//!
//! - `calico` - Play against the engine in the terminal (same as `calico play`)
//! - `calico play --color white` - Let the engine open
//! - `calico gtp` - Start a GTP server for GUI integration
//! - `calico selfplay` - Watch the engine play itself
//!
//! Global options (`--size`, `--iterations`, `--seed`, `--policy`) apply to
//! every mode. Logging goes to stderr; set `RUST_LOG=debug` for search
//! statistics.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand, ValueEnum};
use flexi_logger::Logger;

use calico::board::{Board, Color};
use calico::constants::{DEFAULT_DIM, DEFAULT_ITERATIONS, MAX_DIM};
use calico::gtp::GtpEngine;
use calico::mcts::{SearchConfig, Tree};
use calico::playout::PolicyKind;
use calico::position::{Move, parse_move};

/// Calico: a Go engine with UCT search
#[derive(Parser)]
#[command(name = "calico")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Board size (NxN)
    #[arg(long, global = true, default_value_t = DEFAULT_DIM)]
    size: usize,

    /// Search iterations (playouts) per engine move
    #[arg(long, global = true, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Seed for reproducible games
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Playout policy: light, cached or priority
    #[arg(long, global = true, default_value = "light")]
    policy: PolicyKind,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the engine in the terminal
    Play {
        /// Color the human plays
        #[arg(long, value_enum, default_value_t = Side::Black)]
        color: Side,
    },
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Let the engine play both sides
    Selfplay {
        /// Stop after this many moves even if nobody passes
        #[arg(long, default_value_t = 400)]
        max_moves: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Black,
    White,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::Black => Color::Black,
            Side::White => Color::White,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _logger = Logger::try_with_env_or_str("info")?
        .format(flexi_logger::colored_default_format)
        .start()
        .context("failed to start logger")?;

    ensure!(
        (1..=MAX_DIM).contains(&cli.size),
        "board size must be between 1 and {MAX_DIM}, got {}",
        cli.size
    );

    let config = SearchConfig {
        iterations: cli.iterations,
        seed: cli.seed,
        ..SearchConfig::default()
    };

    match cli.command {
        Some(Commands::Gtp) => {
            let mut engine = GtpEngine::with_policy(cli.size, config, cli.policy);
            engine
                .run(io::stdin().lock(), io::stdout())
                .context("GTP session failed")?;
        }
        Some(Commands::Selfplay { max_moves }) => {
            run_selfplay(cli.size, config, cli.policy, max_moves)?;
        }
        Some(Commands::Play { color }) => {
            run_game(cli.size, config, cli.policy, color.into())?;
        }
        None => {
            run_game(cli.size, config, cli.policy, Color::Black)?;
        }
    }
    Ok(())
}

/// Seeds for successive searches: derived from the user's seed if given.
fn seeds(seed: Option<u64>) -> impl FnMut() -> Option<u64> {
    let mut rng = seed.map(fastrand::Rng::with_seed);
    move || rng.as_mut().map(|r| r.u64(..))
}

fn engine_move(board: &Board, config: SearchConfig, policy: PolicyKind) -> Move {
    let mut tree = Tree::with_policy(board.clone(), config, policy);
    let mv = tree.search();
    log::info!(
        "{} plays {mv} ({} nodes)",
        board.player(),
        tree.node_count()
    );
    mv
}

fn print_board(board: &Board) {
    let score = board.score();
    println!("{board}");
    println!(
        "score: {} (black {}, white {})\n",
        score.net, score.black, score.white
    );
}

/// Human versus engine in the terminal.
fn run_game(size: usize, config: SearchConfig, policy: PolicyKind, human: Color) -> Result<()> {
    let mut board = Board::new(size);
    let mut next_seed = seeds(config.seed);
    let mut passes = 0;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    print_board(&board);
    while passes < 2 {
        let mv = if board.player() == human {
            print!("enter a move: ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                return Ok(());
            };
            let line = line.context("failed to read move")?;
            let input = line.trim();
            if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
                return Ok(());
            }
            let mv = match parse_move(input) {
                Ok(mv) => mv,
                Err(e) => {
                    println!("illegal input: {e}");
                    continue;
                }
            };
            if let Err(e) = board.check(mv, human) {
                println!("illegal move: {e}");
                continue;
            }
            mv
        } else {
            let config = SearchConfig {
                seed: next_seed(),
                ..config
            };
            engine_move(&board, config, policy)
        };

        board.play(mv).context("move was checked before playing")?;
        passes = if mv.is_pass() { passes + 1 } else { 0 };
        print_board(&board);
    }

    announce_result(&board);
    Ok(())
}

/// Engine versus itself.
fn run_selfplay(
    size: usize,
    config: SearchConfig,
    policy: PolicyKind,
    max_moves: usize,
) -> Result<()> {
    let mut board = Board::new(size);
    let mut next_seed = seeds(config.seed);
    let mut passes = 0;

    for _ in 0..max_moves {
        let config = SearchConfig {
            seed: next_seed(),
            ..config
        };
        let mv = engine_move(&board, config, policy);
        board.play(mv).context("engine chose an illegal move")?;
        passes = if mv.is_pass() { passes + 1 } else { 0 };
        print_board(&board);
        if passes >= 2 {
            break;
        }
    }

    announce_result(&board);
    Ok(())
}

fn announce_result(board: &Board) {
    let score = board.score();
    let winner = score.winner();
    println!("{winner} wins by {}", score.net.abs());
}
