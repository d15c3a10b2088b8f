use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::dice::{DICE_PER_HAND, Face};
use crate::hand::{HandRank, Outcome};

/// Complete record of one scored round.
/// Serialized to JSONL, one round per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Stable identifier (format: YYYYMMDD-NNNNNN), assigned by the logger when missing
    #[serde(default)]
    pub id: Option<String>,
    /// Round counter of the state machine that played it
    pub round: u64,
    /// Seed of the machine's random streams
    pub seed: Option<u64>,
    pub table: String,
    pub bet: u32,
    /// Player faces after each roll, in order
    pub rolls: Vec<[Face; DICE_PER_HAND]>,
    pub player: [Face; DICE_PER_HAND],
    pub opponent: [Face; DICE_PER_HAND],
    pub player_hand: HandRank,
    pub opponent_hand: HandRank,
    pub outcome: Outcome,
    /// Amount credited at scoring (win payout or refunded bet)
    pub payout: u32,
    pub bankroll_after: u32,
    /// Timestamp when the round was written (RFC3339)
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

impl RoundRecord {
    /// Bankroll change over the round: payout minus the bet.
    pub fn net(&self) -> i64 {
        i64::from(self.payout) - i64::from(self.bet)
    }
}

pub fn format_round_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

pub struct RoundLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
}

impl RoundLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        })
    }

    /// A logger that only hands out ids; writes go nowhere.
    pub fn detached(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_round_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &RoundRecord) -> std::io::Result<()> {
        let mut rec = record.clone();
        if rec.id.is_none() {
            rec.id = Some(self.next_id());
        }
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}
