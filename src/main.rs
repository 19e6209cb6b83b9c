//! Gomoku match runner
//!
//! Plays games between two agents and prints each final board.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use gomoku::{build_agent, load_config, play_game, AgentKind, Stone};

#[derive(Debug, Parser)]
#[command(name = "gomoku", about = "Play Gomoku games between engine agents")]
struct Cli {
    /// Agent playing black (moves first)
    #[arg(long, value_enum, default_value_t = AgentKind::Mcts)]
    black: AgentKind,

    /// Agent playing white
    #[arg(long, value_enum, default_value_t = AgentKind::Minimax)]
    white: AgentKind,

    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// MCTS time budget per move in milliseconds
    #[arg(long)]
    budget_ms: Option<i64>,

    /// Minimax search depth
    #[arg(long)]
    depth: Option<u8>,

    /// Square board size
    #[arg(long)]
    size: Option<u8>,

    /// Seed for the random agent
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("loading configuration")?;
    if let Some(ms) = cli.budget_ms {
        config.mcts.duration_ms = ms;
    }
    if let Some(depth) = cli.depth {
        config.minimax.max_depth = depth;
    }
    if let Some(size) = cli.size {
        config.board.width = size;
        config.board.height = size;
    }
    config.validate().context("validating configuration")?;

    init_tracing(&config.log_level)?;
    info!(black = %cli.black, white = %cli.white, games = cli.games, "starting match");

    let mut score = [0u32; 3];
    for game in 0..cli.games {
        let mut black = build_agent(cli.black, &config, cli.seed.wrapping_add(u64::from(game)));
        let mut white = build_agent(
            cli.white,
            &config,
            cli.seed.wrapping_add(u64::from(game)).wrapping_add(1),
        );

        let record = play_game(config.board, black.as_mut(), white.as_mut())
            .with_context(|| format!("game {}", game + 1))?;

        println!("{}", record.board.render());
        let result = match record.winner {
            Some(Stone::Black) => {
                score[0] += 1;
                format!("{} (black) wins", black.name())
            }
            Some(_) => {
                score[1] += 1;
                format!("{} (white) wins", white.name())
            }
            None => {
                score[2] += 1;
                "draw".to_string()
            }
        };
        println!(
            "game {}: {} after {} moves",
            game + 1,
            result,
            record.moves().len()
        );
    }

    if cli.games > 1 {
        println!(
            "black {} / white {} / draws {}",
            score[0], score[1], score[2]
        );
    }
    Ok(())
}
