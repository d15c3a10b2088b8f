//! Terminal rendering for dice, hands and round events.

use std::io::Write;

use alea_engine::dice::{DICE_PER_HAND, DieView, Face};
use alea_engine::events::RoundEvent;
use alea_engine::hand::Outcome;
use alea_engine::round::{Phase, RoundState};

pub fn write_error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "Error: {}", msg)
}

/// Display a warning message to stderr with "WARNING:" prefix
pub fn display_warning(err: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(err, "WARNING: {}", message)
}

pub fn format_faces(faces: &[Face]) -> String {
    faces
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Dice in a row; held dice are bracketed.
pub fn format_dice(dice: &[DieView; DICE_PER_HAND]) -> String {
    dice.iter()
        .map(|d| {
            if d.held {
                format!("[{}]", d.face)
            } else {
                d.face.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "You win",
        Outcome::Lose => "House wins",
        Outcome::Tie => "Push",
    }
}

/// One line per event worth showing; `None` for events that need no text.
pub fn describe_event(event: &RoundEvent) -> Option<String> {
    match event {
        RoundEvent::TableSelected { table_id, bet } => {
            Some(format!("Table: {} (bet {})", table_id, bet))
        }
        RoundEvent::ReturnedToLobby => Some("Back in the lobby".to_string()),
        RoundEvent::BankrollReset { bankroll } => Some(format!("Bankroll reset to {}", bankroll)),
        RoundEvent::RollStarted {
            rolls_remaining,
            dice,
            ..
        } => Some(format!(
            "Rolling {} {} ({} roll{} left before this one)",
            dice.len(),
            if dice.len() == 1 { "die" } else { "dice" },
            rolls_remaining,
            if *rolls_remaining == 1 { "" } else { "s" }
        )),
        RoundEvent::DieSettled { .. } => None,
        RoundEvent::HoldToggled { die, held } => Some(format!(
            "Die {} {}",
            die + 1,
            if *held { "held" } else { "released" }
        )),
        RoundEvent::PlayerHandEvaluated {
            hand,
            rolls_remaining,
        } => Some(format!(
            "Your hand: {} ({} roll{} left)",
            hand.display_name(),
            rolls_remaining,
            if *rolls_remaining == 1 { "" } else { "s" }
        )),
        RoundEvent::OpponentRevealed { faces, hand, holds } => {
            let shown: Vec<String> = faces
                .iter()
                .zip(holds)
                .map(|(f, &h)| if h { format!("[{}]", f) } else { f.to_string() })
                .collect();
            Some(format!("House: {}  {}", shown.join(" "), hand.display_name()))
        }
        RoundEvent::RoundScored {
            outcome,
            payout,
            bankroll,
        } => Some(format!(
            "{}! paid {} | bankroll {}",
            outcome_label(*outcome),
            payout,
            bankroll
        )),
        RoundEvent::RoundReset { round_id } => Some(format!("Round {}", round_id)),
    }
}

pub fn render_state(out: &mut dyn Write, state: &RoundState) -> std::io::Result<()> {
    let phase = match state.phase {
        Phase::Betting => "betting",
        Phase::Rolling => "rolling",
        Phase::Scoring => "scoring",
    };
    writeln!(
        out,
        "Round {} | {} | table {} | bet {} | bankroll {} | rolls left {}",
        state.round_id,
        phase,
        state.selected_table.as_deref().unwrap_or("-"),
        state.current_bet,
        state.bankroll.balance(),
        state.rolls_remaining
    )?;
    writeln!(out, "You:   {}", format_dice(&state.dice))?;
    writeln!(out, "House: {}", format_dice(&state.opponent_dice))?;
    if let Some(hand) = &state.current_hand {
        writeln!(out, "Your hand: {}", hand.display_name())?;
    }
    Ok(())
}
