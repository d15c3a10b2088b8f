//! `alea stats`: aggregates round records from JSONL logs.
//!
//! Accepts a single file (plain or `.zst`) or a directory, which is searched
//! recursively for `.jsonl` / `.jsonl.zst` files. Lines that fail to parse are
//! counted as corrupted; an unterminated final line is treated as an
//! interrupted write and discarded.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use alea_engine::hand::{HandRank, Outcome};
use alea_engine::logger::RoundRecord;

use crate::error::CliError;
use crate::io_utils::{read_text_auto, round_log_files};
use crate::ui;

/// Running totals over scored rounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundTally {
    pub rounds: u64,
    pub wins: u64,
    pub losses: u64,
    pub ties: u64,
    /// Sum of payout minus bet
    pub net: i64,
    pub player_hands: BTreeMap<HandRank, u64>,
}

impl RoundTally {
    pub fn add(&mut self, rec: &RoundRecord) {
        self.rounds += 1;
        match rec.outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Lose => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
        self.net += rec.net();
        *self.player_hands.entry(rec.player_hand).or_default() += 1;
    }

    pub fn to_json(&self) -> serde_json::Value {
        let hands: serde_json::Map<String, serde_json::Value> = HandRank::all()
            .into_iter()
            .rev()
            .map(|rank| {
                let n = self.player_hands.get(&rank).copied().unwrap_or(0);
                (rank_key(rank), serde_json::Value::from(n))
            })
            .collect();
        serde_json::json!({
            "rounds": self.rounds,
            "wins": self.wins,
            "losses": self.losses,
            "ties": self.ties,
            "net": self.net,
            "player_hands": hands,
        })
    }
}

fn rank_key(rank: HandRank) -> String {
    serde_json::to_value(rank)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", rank))
}

pub fn handle_stats_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let path = Path::new(&input);
    let mut state = StatsState::default();

    if path.is_dir() {
        for file in round_log_files(path) {
            match read_text_auto(&file) {
                Ok(content) => state.consume(&content),
                Err(e) => {
                    tracing::warn!(file = %file.display(), error = %e, "unreadable round log");
                    state.corrupted += 1;
                }
            }
        }
    } else {
        match read_text_auto(path) {
            Ok(content) => state.consume(&content),
            Err(e) => {
                ui::write_error(err, &format!("Failed to read {}: {}", input, e))?;
                return Err(CliError::InvalidInput(format!(
                    "Failed to read {}: {}",
                    input, e
                )));
            }
        }
    }

    if state.corrupted > 0 {
        ui::write_error(
            err,
            &format!("Skipped {} corrupted record(s)", state.corrupted),
        )?;
    }
    if state.skipped > 0 {
        ui::display_warning(
            err,
            &format!("Discarded {} incomplete final line(s)", state.skipped),
        )?;
    }
    if !path.is_dir() && state.tally.rounds == 0 && (state.corrupted > 0 || state.skipped > 0) {
        ui::write_error(err, "Invalid record")?;
        return Err(CliError::InvalidInput("Invalid record".to_string()));
    }

    let json_output = serde_json::to_string_pretty(&state.tally.to_json())
        .map_err(|e| CliError::InvalidInput(format!("Failed to serialize stats: {}", e)))?;
    writeln!(out, "{}", json_output)?;
    Ok(())
}

#[derive(Default)]
struct StatsState {
    tally: RoundTally,
    skipped: u64,
    corrupted: u64,
}

impl StatsState {
    fn consume(&mut self, content: &str) {
        let has_trailing_nl = content.ends_with('\n');
        let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
        for (i, line) in lines.iter().enumerate() {
            match serde_json::from_str::<RoundRecord>(line) {
                Ok(rec) => self.tally.add(&rec),
                Err(_) if i == lines.len() - 1 && !has_trailing_nl => self.skipped += 1,
                Err(_) => self.corrupted += 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_error() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = handle_stats_command("nonexistent.jsonl".to_string(), &mut out, &mut err);
        assert!(result.is_err());
        assert!(String::from_utf8_lossy(&err).contains("Failed to read"));
    }

    #[test]
    fn test_tally_lists_every_rank() {
        let json = RoundTally::default().to_json();
        let hands = json["player_hands"].as_object().unwrap();
        assert_eq!(hands.len(), 8);
        assert_eq!(hands["five-of-a-kind"], 0);
        assert_eq!(hands["high-card"], 0);
    }
}
