use std::net::SocketAddr;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use itertools::Itertools;
use stronkchess::chess::position::Position;
use stronkchess::{perft, server};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDRESS: &str = "0.0.0.0:8080";

/// Bitboard chess engine evaluating move sequences over HTTP.
#[derive(Parser, Debug)]
#[command(version, long_version = stronkchess::build::CLAP_LONG_VERSION, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serves evaluations of move sequences over HTTP (default).
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = DEFAULT_ADDRESS)]
        bind: SocketAddr,
    },
    /// Counts the leaf nodes of the legal move tree.
    Perft {
        /// Depth of the tree.
        depth: u8,
        /// Root position, the starting position by default.
        #[arg(long)]
        fen: Option<String>,
        /// Print the node count below each root move.
        #[arg(long)]
        divide: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Command::Perft { depth, fen, divide }) => run_perft(depth, fen.as_deref(), divide),
        Some(Command::Serve { bind }) => run_server(bind),
        None => run_server(DEFAULT_ADDRESS.parse()?),
    }
}

fn run_server(address: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("stronkchess {}", stronkchess::engine_version());
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting the runtime")?
        .block_on(server::serve(address))
}

fn run_perft(depth: u8, fen: Option<&str>, divide: bool) -> anyhow::Result<()> {
    let mut position = match fen {
        Some(fen) => Position::try_from(fen)?,
        None => Position::starting(),
    };
    let start = Instant::now();
    let nodes = if divide {
        let divide = perft::perft_divide(&mut position, depth);
        println!(
            "{}",
            divide
                .iter()
                .map(|(root_move, nodes)| format!("{root_move}: {nodes}"))
                .join("\n")
        );
        println!();
        divide.iter().map(|(_, nodes)| nodes).sum()
    } else {
        perft::perft(&mut position, depth)
    };
    let elapsed = start.elapsed();
    println!("Nodes: {nodes}");
    println!("Time: {} ms", elapsed.as_millis());
    println!(
        "NPS: {:.0}",
        nodes as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    Ok(())
}
