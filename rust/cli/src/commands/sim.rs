//! `alea sim`: plays rounds without a human.
//!
//! The player's holds are chosen by the same strategy the house uses, so a
//! simulation measures the table's edge against a sensible player. Rounds are
//! rolled on the headless table with the configured seed, so a run is
//! reproducible.
//!
//! # Environment Variables
//!
//! - `ALEA_SIM_BREAK_AFTER`: stop after N rounds and exit as interrupted

use std::io::Write;
use std::path::PathBuf;

use alea_engine::headless::HeadlessTable;
use alea_engine::impulse::RollRequest;
use alea_engine::logger::{RoundLogger, RoundRecord};
use alea_engine::round::{Phase, RoundMachine};
use alea_engine::strategy::HoldStrategy;

use super::{MAX_ROLL_SECONDS, STEP_SECONDS, build_machine, resolve_settings};
use crate::commands::stats::RoundTally;
use crate::error::CliError;
use crate::io_utils::ensure_parent_dir;
use crate::ui;

pub const BREAK_AFTER_ENV: &str = "ALEA_SIM_BREAK_AFTER";

pub fn handle_sim_command(
    rounds: u64,
    table: Option<String>,
    seed: Option<u64>,
    ai: Option<String>,
    output: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if rounds == 0 {
        ui::write_error(err, "rounds must be >= 1")?;
        return Err(CliError::InvalidInput("rounds must be >= 1".to_string()));
    }
    let settings = resolve_settings(table, seed, ai)?;
    let mut machine = build_machine(&settings)?;
    let player = alea_ai::create_ai(&settings.ai)?;
    let mut headless = HeadlessTable::new();

    if !machine.select_table(&settings.table)? {
        let msg = format!(
            "bankroll {} cannot cover the {} table",
            settings.bankroll, settings.table
        );
        ui::write_error(err, &msg)?;
        return Err(CliError::InvalidInput(msg));
    }

    let mut logger = match output.as_ref() {
        Some(p) => {
            let path = PathBuf::from(p);
            ensure_parent_dir(&path).map_err(CliError::Config)?;
            Some(RoundLogger::create(&path)?)
        }
        None => None,
    };

    let break_after = std::env::var(BREAK_AFTER_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok());

    writeln!(
        out,
        "sim: rounds={} table={} seed={} ai={}",
        rounds, settings.table, settings.seed, settings.ai
    )?;

    let mut tally = RoundTally::default();
    let mut interrupted = false;
    for i in 0..rounds {
        if break_after == Some(i) {
            interrupted = true;
            break;
        }
        if i > 0 {
            machine.new_round();
        }
        let affordable = machine
            .selected_table()
            .is_some_and(|t| t.can_afford(machine.state().bankroll.balance()));
        if !affordable {
            ui::display_warning(
                err,
                &format!("Bankroll exhausted after {} round(s)", tally.rounds),
            )?;
            break;
        }

        let rec = play_round(&mut machine, &mut headless, player.as_ref())?;
        tally.add(&rec);
        if let Some(l) = logger.as_mut() {
            l.write(&rec)?;
        }
    }

    let mut summary = tally.to_json();
    summary["seed"] = settings.seed.into();
    summary["table"] = settings.table.clone().into();
    summary["bankroll"] = machine.state().bankroll.balance().into();
    writeln!(
        out,
        "{}",
        serde_json::to_string_pretty(&summary).map_err(std::io::Error::other)?
    )?;

    if interrupted {
        return Err(CliError::Interrupted(format!(
            "stopped after {} round(s)",
            tally.rounds
        )));
    }
    Ok(())
}

/// Plays one round to scoring, holding what `player` would hold.
pub fn play_round(
    machine: &mut RoundMachine,
    headless: &mut HeadlessTable,
    player: &dyn HoldStrategy,
) -> Result<RoundRecord, CliError> {
    while machine.state().phase != Phase::Scoring {
        if !machine.place_bet_and_roll(RollRequest::default()) {
            return Err(CliError::Engine(format!(
                "roll rejected in round {}",
                machine.state().round_id
            )));
        }
        if !headless.run_until_idle(machine, STEP_SECONDS, MAX_ROLL_SECONDS) {
            return Err(CliError::Engine("dice never came to rest".to_string()));
        }
        if machine.state().rolls_remaining > 0 {
            let wanted = player.decide_holds(&machine.state().player_faces());
            let current = machine.state().held();
            for (die, (want, have)) in wanted.into_iter().zip(current).enumerate() {
                if want != have {
                    machine.toggle_hold(die);
                }
            }
        }
    }
    machine
        .last_record()
        .cloned()
        .ok_or_else(|| CliError::Engine("round scored without a record".to_string()))
}
