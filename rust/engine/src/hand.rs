use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::dice::{DICE_PER_HAND, Face};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandRank {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    FullHouse = 5,
    FourOfAKind = 6,
    FiveOfAKind = 7,
}

impl HandRank {
    pub fn strength(self) -> u8 {
        self as u8
    }

    /// Payout multiplier printed on the table for this rank.
    pub fn payout_multiplier(self) -> u32 {
        match self {
            HandRank::FiveOfAKind => 100,
            HandRank::FourOfAKind => 25,
            HandRank::FullHouse => 10,
            HandRank::Straight => 8,
            HandRank::ThreeOfAKind => 5,
            HandRank::TwoPair => 3,
            HandRank::OnePair => 1,
            HandRank::HighCard => 0,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            HandRank::FiveOfAKind => "Five of a Kind!",
            HandRank::FourOfAKind => "Four of a Kind!",
            HandRank::FullHouse => "Full House!",
            HandRank::Straight => "Straight!",
            HandRank::ThreeOfAKind => "Three of a Kind",
            HandRank::TwoPair => "Two Pair",
            HandRank::OnePair => "One Pair",
            HandRank::HighCard => "High Card",
        }
    }

    pub fn all() -> [HandRank; 8] {
        [
            HandRank::HighCard,
            HandRank::OnePair,
            HandRank::TwoPair,
            HandRank::ThreeOfAKind,
            HandRank::Straight,
            HandRank::FullHouse,
            HandRank::FourOfAKind,
            HandRank::FiveOfAKind,
        ]
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    pub rank: HandRank,
    pub payout_multiplier: u32,
    // distinct faces by multiplicity desc, then face desc; tiebreak only
    pub primary_cards: Vec<Face>,
}

impl HandResult {
    fn new(rank: HandRank, primary_cards: Vec<Face>) -> Self {
        Self {
            rank,
            payout_multiplier: rank.payout_multiplier(),
            primary_cards,
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.rank.display_name()
    }
}

/// Result of comparing the player's hand against the opponent's.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Lose,
    Tie,
}

impl Outcome {
    pub fn reversed(self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Lose,
            Outcome::Lose => Outcome::Win,
            Outcome::Tie => Outcome::Tie,
        }
    }
}

fn count_faces(faces: &[Face]) -> [u8; 6] {
    let mut counts = [0u8; 6];
    for &f in faces {
        counts[f.value() as usize] += 1;
    }
    counts
}

/// Multiplicities of present faces, largest first.
fn multiplicities(counts: &[u8; 6]) -> Vec<u8> {
    let mut m: Vec<u8> = counts.iter().copied().filter(|&c| c > 0).collect();
    m.sort_unstable_by(|a, b| b.cmp(a));
    m
}

fn primary_cards(counts: &[u8; 6]) -> Vec<Face> {
    let mut present: Vec<(u8, Face)> = (0..6u8)
        .filter(|&v| counts[v as usize] > 0)
        .map(|v| (counts[v as usize], Face::from_value(v)))
        .collect();
    present.sort_unstable_by(|a, b| b.cmp(a));
    present.into_iter().map(|(_, f)| f).collect()
}

fn is_straight(counts: &[u8; 6]) -> bool {
    let present: Vec<usize> = (0..6).filter(|&v| counts[v] > 0).collect();
    if present.len() != DICE_PER_HAND || counts.iter().any(|&c| c > 1) {
        return false;
    }
    present.windows(2).all(|w| w[1] == w[0] + 1)
}

/// Classifies exactly five faces into a poker-dice hand.
///
/// # Panics
///
/// Panics if `faces` does not hold exactly five values. Callers inside the
/// engine always pass a full hand; anything else is a programming error.
pub fn evaluate_hand(faces: &[Face]) -> HandResult {
    assert_eq!(
        faces.len(),
        DICE_PER_HAND,
        "a hand must have exactly {} dice",
        DICE_PER_HAND
    );
    let counts = count_faces(faces);
    let m = multiplicities(&counts);
    let primary = primary_cards(&counts);

    let rank = if m[0] == 5 {
        HandRank::FiveOfAKind
    } else if m[0] == 4 {
        HandRank::FourOfAKind
    } else if m[0] == 3 && m[1] == 2 {
        HandRank::FullHouse
    } else if is_straight(&counts) {
        HandRank::Straight
    } else if m[0] == 3 {
        HandRank::ThreeOfAKind
    } else if m[0] == 2 && m[1] == 2 {
        HandRank::TwoPair
    } else if m[0] == 2 {
        HandRank::OnePair
    } else {
        HandRank::HighCard
    };
    HandResult::new(rank, primary)
}

/// Recognizes a pattern among the dice held so far, for live display.
///
/// Reports pair, three and four of a kind and full house. Two pairs show as
/// a pair. Straights and five of a kind need all five dice. Returns `None`
/// for fewer than two dice or when nothing is recognized. Never used for
/// scoring.
pub fn evaluate_partial(faces: &[Face]) -> Option<HandResult> {
    if faces.len() < 2 || faces.len() > DICE_PER_HAND {
        return None;
    }
    let counts = count_faces(faces);
    let m = multiplicities(&counts);
    let second = m.get(1).copied().unwrap_or(0);
    let rank = match (m[0], second) {
        (5, _) => HandRank::FiveOfAKind,
        (4, _) => HandRank::FourOfAKind,
        (3, 2) => HandRank::FullHouse,
        (3, _) => HandRank::ThreeOfAKind,
        (2, _) => HandRank::OnePair,
        _ if is_straight(&counts) => HandRank::Straight,
        _ => return None,
    };
    Some(HandResult::new(rank, primary_cards(&counts)))
}

pub fn compare_hands(a: &HandResult, b: &HandResult) -> Ordering {
    match a.rank.cmp(&b.rank) {
        Ordering::Equal => a.primary_cards.cmp(&b.primary_cards),
        ord => ord,
    }
}

/// Scores the player's hand against the opponent's.
pub fn compare_player_vs_opponent(player: &HandResult, opponent: &HandResult) -> Outcome {
    match compare_hands(player, opponent) {
        Ordering::Greater => Outcome::Win,
        Ordering::Less => Outcome::Lose,
        Ordering::Equal => Outcome::Tie,
    }
}
