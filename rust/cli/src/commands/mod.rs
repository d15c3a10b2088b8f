//! Command handlers for the `alea` CLI.
//!
//! Each subcommand lives in its own module and exposes
//! `handle_COMMAND_command(...) -> Result<(), CliError>`. Output streams are
//! passed in so tests can capture them.

pub mod cfg;
pub mod eval;
pub mod play;
pub mod sim;
pub mod stats;

pub use cfg::handle_cfg_command;
pub use eval::handle_eval_command;
pub use play::handle_play_command;
pub use sim::handle_sim_command;
pub use stats::handle_stats_command;

use alea_engine::round::{RoundConfig, RoundMachine};

use crate::config;
use crate::error::CliError;

/// Physics step used by the headless table.
pub const STEP_SECONDS: f32 = 1.0 / 60.0;
/// Simulated time a single roll may take before the command gives up.
pub const MAX_ROLL_SECONDS: f32 = 30.0;

/// Values a game command runs with after config, env and flags are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub seed: u64,
    pub bankroll: u32,
    pub table: String,
    pub ai: String,
}

/// Applies command-line flags on top of the loaded configuration.
/// A missing seed is drawn at random.
pub fn resolve_settings(
    table: Option<String>,
    seed: Option<u64>,
    ai: Option<String>,
) -> Result<Settings, CliError> {
    let cfg = config::load_with_sources()?.config;
    Ok(Settings {
        seed: seed.or(cfg.seed).unwrap_or_else(rand::random),
        bankroll: cfg.bankroll,
        table: table.unwrap_or(cfg.table),
        ai: ai.unwrap_or(cfg.ai),
    })
}

pub fn build_machine(settings: &Settings) -> Result<RoundMachine, CliError> {
    let strategy = alea_ai::create_ai(&settings.ai)?;
    let config = RoundConfig {
        seed: settings.seed,
        initial_bankroll: settings.bankroll,
        ..RoundConfig::default()
    };
    Ok(RoundMachine::new(config, strategy))
}
