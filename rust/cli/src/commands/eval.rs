//! `alea eval`: ranks a set of faces and prints the result as JSON.

use std::io::Write;

use alea_engine::dice::{DICE_PER_HAND, parse_faces};
use alea_engine::hand::{evaluate_hand, evaluate_partial};

use crate::error::CliError;

pub fn handle_eval_command(
    faces: &[String],
    partial: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let parsed = parse_faces(&faces.join(" ")).map_err(CliError::InvalidInput)?;
    let hand = if partial {
        if parsed.is_empty() || parsed.len() > DICE_PER_HAND {
            return Err(CliError::InvalidInput(format!(
                "--partial takes 1 to {} faces, got {}",
                DICE_PER_HAND,
                parsed.len()
            )));
        }
        evaluate_partial(&parsed)
    } else {
        if parsed.len() != DICE_PER_HAND {
            return Err(CliError::InvalidInput(format!(
                "a hand needs exactly {} faces, got {}",
                DICE_PER_HAND,
                parsed.len()
            )));
        }
        Some(evaluate_hand(&parsed))
    };

    let report = serde_json::json!({
        "faces": parsed,
        "name": hand.as_ref().map(|h| h.display_name()),
        "hand": hand,
    });
    let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json)?;
    Ok(())
}
