use serde::{Deserialize, Serialize};

/// Number of dice on each side of the table.
pub const DICE_PER_HAND: usize = 5;

/// Represents the symbol printed on one face of a poker die.
/// Numeric values are assigned low to high for hand evaluation and tiebreaks.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Face {
    /// Nine (lowest)
    #[serde(rename = "9")]
    Nine = 0,
    /// Ten
    #[serde(rename = "10")]
    Ten,
    /// Jack
    #[serde(rename = "J")]
    Jack,
    /// Queen
    #[serde(rename = "Q")]
    Queen,
    /// King
    #[serde(rename = "K")]
    King,
    /// Ace (highest)
    #[serde(rename = "A")]
    Ace,
}

/// Face shown by a die after a reset, before it has ever been rolled.
pub const DEFAULT_FACE: Face = Face::Ace;

impl Face {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(v: u8) -> Face {
        match v {
            0 => Face::Nine,
            1 => Face::Ten,
            2 => Face::Jack,
            3 => Face::Queen,
            4 => Face::King,
            _ => Face::Ace,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Face::Nine => "9",
            Face::Ten => "10",
            Face::Jack => "J",
            Face::Queen => "Q",
            Face::King => "K",
            Face::Ace => "A",
        }
    }

    /// Parses a face label. Accepts `T` as an alias for ten and is case-insensitive.
    pub fn from_label(s: &str) -> Option<Face> {
        match s.trim().to_ascii_uppercase().as_str() {
            "9" => Some(Face::Nine),
            "10" | "T" => Some(Face::Ten),
            "J" => Some(Face::Jack),
            "Q" => Some(Face::Queen),
            "K" => Some(Face::King),
            "A" => Some(Face::Ace),
            _ => None,
        }
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn all_faces() -> [Face; 6] {
    [
        Face::Nine,
        Face::Ten,
        Face::Jack,
        Face::Queen,
        Face::King,
        Face::Ace,
    ]
}

/// Read-model entry for one die, as exposed to the presentation layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DieView {
    /// Die index (0-4)
    pub id: usize,
    /// Face currently showing up
    pub face: Face,
    /// Excluded from the next roll
    pub held: bool,
    /// Came to rest since the last roll started
    pub settled: bool,
}

impl DieView {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            face: DEFAULT_FACE,
            held: false,
            settled: false,
        }
    }

    /// Return to the canonical unheld state used between rounds.
    pub fn reset(&mut self) {
        self.face = DEFAULT_FACE;
        self.held = false;
        self.settled = false;
    }
}

pub fn fresh_dice() -> [DieView; DICE_PER_HAND] {
    std::array::from_fn(DieView::new)
}

pub fn faces_of(dice: &[DieView; DICE_PER_HAND]) -> [Face; DICE_PER_HAND] {
    std::array::from_fn(|i| dice[i].face)
}

/// Parses a whitespace or comma separated list of face labels.
pub fn parse_faces(input: &str) -> Result<Vec<Face>, String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| Face::from_label(s).ok_or_else(|| format!("unknown face: {}", s)))
        .collect()
}
