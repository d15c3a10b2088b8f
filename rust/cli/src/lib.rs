//! # Alea CLI Library
//!
//! Terminal front end for the `alea-engine` poker dice engine. Dice are
//! thrown on the engine's headless table, so every command runs without a
//! graphics or physics stack.
//!
//! ## Main Entry Point
//!
//! [`run`] parses the arguments, dispatches to a subcommand and returns the
//! process exit code.
//!
//! ```
//! let mut out = Vec::new();
//! let mut err = Vec::new();
//! let code = alea_cli::run(["alea", "eval", "K", "K", "K", "9", "9"], &mut out, &mut err);
//! assert_eq!(code, 0);
//! assert!(String::from_utf8_lossy(&out).contains("full-house"));
//! ```
//!
//! ## Available Subcommands
//!
//! - `play`: Interactive rounds against the house on stdin
//! - `sim`: Automated rounds, optionally logged as JSONL
//! - `stats`: Summaries of JSONL round logs
//! - `eval`: Rank a set of faces
//! - `cfg`: Show the resolved configuration

use clap::Parser;
use std::io::Write;

pub mod cli;
pub mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod io_utils;
pub mod logging;
pub mod ui;

use cli::{AleaCli, Commands};
use commands::{
    handle_cfg_command, handle_eval_command, handle_play_command, handle_sim_command,
    handle_stats_command,
};

pub use error::CliError;

const COMMANDS: &[&str] = &["play", "sim", "stats", "eval", "cfg"];

/// Parses `args` and runs the selected subcommand.
///
/// Returns [`exit_code::SUCCESS`], [`exit_code::ERROR`] or
/// [`exit_code::INTERRUPTED`].
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match AleaCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return report_usage_error(e, out, err),
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Play { table, seed, ai } => {
            let stdin = std::io::stdin();
            let mut stdin_lock = stdin.lock();
            handle_play_command(table, seed, ai, out, err, &mut stdin_lock)
        }
        Commands::Sim {
            rounds,
            table,
            seed,
            ai,
            output,
        } => handle_sim_command(rounds, table, seed, ai, output, out, err),
        Commands::Stats { input } => handle_stats_command(input, out, err),
        Commands::Eval { faces, partial } => handle_eval_command(&faces, partial, out),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(msg)) => {
            tracing::info!(reason = %msg, "command interrupted");
            let _ = writeln!(err, "Interrupted: {}", msg);
            exit_code::INTERRUPTED
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            let _ = writeln!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}

fn report_usage_error(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // help and version go to stdout and succeed
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return match write!(out, "{}", e) {
            Ok(()) => exit_code::SUCCESS,
            Err(_) => exit_code::ERROR,
        };
    }
    let _ = writeln!(err, "{}", e);
    let _ = writeln!(err, "Usage: alea <command> [options]\n");
    let _ = writeln!(err, "Commands:");
    for c in COMMANDS {
        let _ = writeln!(err, "  {}", c);
    }
    let _ = writeln!(err, "\nFor full help, run: alea --help");
    exit_code::ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(args, &mut out, &mut err);
        (
            code,
            String::from_utf8_lossy(&out).into_owned(),
            String::from_utf8_lossy(&err).into_owned(),
        )
    }

    #[test]
    fn test_help_goes_to_stdout() {
        let (code, out, _) = run_args(&["alea", "--help"]);
        assert_eq!(code, exit_code::SUCCESS);
        assert!(out.contains("Usage"));
    }

    #[test]
    fn test_unknown_command_lists_commands() {
        let (code, _, err) = run_args(&["alea", "deal"]);
        assert_eq!(code, exit_code::ERROR);
        for c in COMMANDS {
            assert!(err.contains(c), "missing {c} in {err}");
        }
    }

    #[test]
    fn test_eval_errors_map_to_exit_two() {
        let (code, _, err) = run_args(&["alea", "eval", "A", "A"]);
        assert_eq!(code, exit_code::ERROR);
        assert!(err.contains("exactly 5 faces"));
    }
}
