//! HEXGO CLI - Command-line interface
//!
//! Commands:
//! - play: Play against the engine on stdin/stdout
//! - board: Print the standard opening position

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hexgo_cli::play::{self, PlayArgs};
use hexgo_cli::render::render;
use hexgo_core::{BoardPool, Growth, PoolConfig};

#[derive(Parser)]
#[command(name = "hexgo")]
#[command(about = "HEXGO move recommender")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the engine
    Play(PlayArgs),
    /// Print the standard opening position
    Board,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the game
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play::run(args),
        Commands::Board => {
            let pool = BoardPool::new(PoolConfig::default().with_capacity(1).with_growth(Growth::OnDemand))?;
            let mut board = pool.acquire();
            board.setup_standard();
            print!("{}", render(&board));
            pool.release(board);
            Ok(())
        }
    }
}
