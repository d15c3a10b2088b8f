//! Command-line surface of `alea`.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "alea",
    version,
    about = "Poker dice against the house",
    propagate_version = true
)]
pub struct AleaCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play interactively, one command per line on stdin
    Play {
        #[arg(long)]
        table: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        /// House strategy
        #[arg(long)]
        ai: Option<String>,
    },
    /// Play rounds automatically, the player using the house strategy too
    Sim {
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        rounds: u64,
        #[arg(long)]
        table: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        ai: Option<String>,
        /// Write one JSON round record per line
        #[arg(long)]
        output: Option<String>,
    },
    /// Summarize round records from a JSONL file or directory
    Stats {
        #[arg(long)]
        input: String,
    },
    /// Rank five faces (or fewer with --partial), e.g. `alea eval A A K K 9`
    Eval {
        #[arg(required = true, num_args = 1..)]
        faces: Vec<String>,
        /// Report the pattern among held dice instead of a full hand
        #[arg(long)]
        partial: bool,
    },
    /// Print the resolved configuration and where each value came from
    Cfg,
}
