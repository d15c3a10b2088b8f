//! # Play Command
//!
//! Interactive poker dice against the house, one command per line:
//!
//! | input                    | effect                                   |
//! |--------------------------|------------------------------------------|
//! | `roll [INTENSITY]`       | pay the bet (first roll) and roll        |
//! | `throw DX DY [INTENSITY]`| roll with a flick direction              |
//! | `hold N`                 | toggle the hold on die N (1-5)           |
//! | `new`                    | start another round at the same table    |
//! | `table ID`               | sit at another table (between rounds)    |
//! | `lobby`                  | leave the table                          |
//! | `state`                  | show the table                           |
//! | `help`                   | list commands                            |
//! | `q` / `quit`             | leave                                    |
//!
//! Dice are thrown on the headless table, so a seed replays the same game
//! for the same inputs.

use std::io::{BufRead, Write};

use alea_engine::dice::DICE_PER_HAND;
use alea_engine::events::EventSubscription;
use alea_engine::headless::HeadlessTable;
use alea_engine::impulse::{DEFAULT_INTENSITY, RollRequest};
use alea_engine::round::{Phase, RoundMachine};

use super::{MAX_ROLL_SECONDS, STEP_SECONDS, build_machine, resolve_settings};
use crate::error::CliError;
use crate::io_utils::read_stdin_line;
use crate::ui;

const HELP: &str = "Commands: roll [intensity] | throw DX DY [intensity] | hold N | new | table ID | lobby | state | q";

#[derive(Debug, Clone, PartialEq)]
pub enum PlayInput {
    Roll(RollRequest),
    Hold(usize),
    NewRound,
    Table(String),
    Lobby,
    State,
    Help,
    Quit,
    Empty,
}

fn parse_number(token: &str, what: &str) -> Result<f32, String> {
    token
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{} must be a number, got '{}'", what, token))
}

/// Parses one line of player input.
pub fn parse_play_input(line: &str) -> Result<PlayInput, String> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(PlayInput::Empty);
    };
    let args: Vec<&str> = parts.collect();
    let cmd = cmd.to_ascii_lowercase();
    match (cmd.as_str(), args.as_slice()) {
        ("roll" | "r", []) => Ok(PlayInput::Roll(RollRequest::toss(DEFAULT_INTENSITY))),
        ("roll" | "r", [i]) => Ok(PlayInput::Roll(RollRequest::toss(parse_number(
            i,
            "intensity",
        )?))),
        ("throw", [dx, dy]) | ("throw", [dx, dy, _]) => {
            let intensity = match args.get(2) {
                Some(i) => parse_number(i, "intensity")?,
                None => DEFAULT_INTENSITY,
            };
            Ok(PlayInput::Roll(RollRequest::throw(
                intensity,
                parse_number(dx, "dx")?,
                parse_number(dy, "dy")?,
            )))
        }
        ("hold" | "h", [n]) => match n.parse::<usize>() {
            Ok(die) if (1..=DICE_PER_HAND).contains(&die) => Ok(PlayInput::Hold(die - 1)),
            _ => Err(format!("die must be 1-{}, got '{}'", DICE_PER_HAND, n)),
        },
        ("new", []) => Ok(PlayInput::NewRound),
        ("table", [id]) => Ok(PlayInput::Table(id.to_string())),
        ("lobby", []) => Ok(PlayInput::Lobby),
        ("state" | "s", []) => Ok(PlayInput::State),
        ("help" | "?", []) => Ok(PlayInput::Help),
        ("q" | "quit" | "exit", []) => Ok(PlayInput::Quit),
        _ => Err(format!("unrecognized input '{}'", line.trim())),
    }
}

pub fn handle_play_command(
    table: Option<String>,
    seed: Option<u64>,
    ai: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<(), CliError> {
    let settings = resolve_settings(table, seed, ai)?;
    let mut machine = build_machine(&settings)?;
    let mut events = machine.subscribe();
    let mut headless = HeadlessTable::new();

    writeln!(
        out,
        "play: table={} seed={} ai={} bankroll={}",
        settings.table, settings.seed, settings.ai, settings.bankroll
    )?;
    writeln!(out, "{}", HELP)?;
    if !machine.select_table(&settings.table)? {
        ui::display_warning(
            err,
            &format!("Cannot afford the {} table; pick another with `table ID`", settings.table),
        )?;
    }
    print_events(&mut events, out)?;

    let mut rounds_scored = 0u32;
    while let Some(line) = read_stdin_line(stdin) {
        let input = match parse_play_input(&line) {
            Ok(i) => i,
            Err(e) => {
                ui::write_error(err, &e)?;
                continue;
            }
        };
        match input {
            PlayInput::Empty => continue,
            PlayInput::Quit => break,
            PlayInput::Help => writeln!(out, "{}", HELP)?,
            PlayInput::State => ui::render_state(out, machine.state())?,
            PlayInput::Roll(request) => {
                if !machine.place_bet_and_roll(request) {
                    ui::write_error(err, &roll_refusal(&machine))?;
                    continue;
                }
                if !headless.run_until_idle(&mut machine, STEP_SECONDS, MAX_ROLL_SECONDS) {
                    return Err(CliError::Engine("dice never came to rest".to_string()));
                }
                writeln!(out, "You:   {}", ui::format_dice(&machine.state().dice))?;
                if machine.state().phase == Phase::Scoring {
                    rounds_scored += 1;
                }
            }
            PlayInput::Hold(die) => {
                if !machine.toggle_hold(die) {
                    ui::write_error(err, "dice can be held between rolls only")?;
                } else if let Some(pattern) = machine.held_hand() {
                    writeln!(out, "Holding: {}", pattern.display_name())?;
                }
            }
            PlayInput::NewRound => machine.new_round(),
            PlayInput::Table(id) => match machine.select_table(&id) {
                Ok(true) => {}
                Ok(false) => ui::write_error(
                    err,
                    "table can be changed before the first roll only, and the bet must be covered",
                )?,
                Err(e) => ui::write_error(err, &e.to_string())?,
            },
            PlayInput::Lobby => machine.return_to_lobby(),
        }
        print_events(&mut events, out)?;
    }

    writeln!(
        out,
        "Rounds played: {} | Bankroll: {}",
        rounds_scored,
        machine.state().bankroll.balance()
    )?;
    Ok(())
}

fn roll_refusal(machine: &RoundMachine) -> String {
    let s = machine.state();
    if s.phase == Phase::Scoring || s.rolls_remaining == 0 {
        "no rolls left; type `new` for another round".to_string()
    } else if s.selected_table.is_none() {
        "pick a table first with `table ID`".to_string()
    } else {
        format!("bankroll {} does not cover the bet", s.bankroll.balance())
    }
}

fn print_events(events: &mut EventSubscription, out: &mut dyn Write) -> Result<(), CliError> {
    for ev in events.drain() {
        if let Some(line) = ui::describe_event(&ev) {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roll_and_throw() {
        assert_eq!(
            parse_play_input("roll"),
            Ok(PlayInput::Roll(RollRequest::toss(DEFAULT_INTENSITY)))
        );
        assert_eq!(
            parse_play_input("ROLL 0.9"),
            Ok(PlayInput::Roll(RollRequest::toss(0.9)))
        );
        assert_eq!(
            parse_play_input("throw 0.5 -1 1"),
            Ok(PlayInput::Roll(RollRequest::throw(1.0, 0.5, -1.0)))
        );
        assert!(parse_play_input("roll hard").is_err());
        assert!(parse_play_input("roll inf").is_err());
    }

    #[test]
    fn test_parse_hold_is_one_based() {
        assert_eq!(parse_play_input("hold 1"), Ok(PlayInput::Hold(0)));
        assert_eq!(parse_play_input("h 5"), Ok(PlayInput::Hold(4)));
        assert!(parse_play_input("hold 0").is_err());
        assert!(parse_play_input("hold 6").is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_play_input("   "), Ok(PlayInput::Empty));
        assert_eq!(parse_play_input("q"), Ok(PlayInput::Quit));
        assert_eq!(
            parse_play_input("table gold"),
            Ok(PlayInput::Table("gold".into()))
        );
        assert!(parse_play_input("fold").is_err());
    }
}
