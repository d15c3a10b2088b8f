//! The house opponent's hold heuristic.
//!
//! Decides which dice to keep from the current values alone, with no
//! lookahead. The ladder is evaluated top to bottom and the first matching
//! pattern wins.

use alea_engine::dice::{DICE_PER_HAND, Face};
use alea_engine::strategy::HoldStrategy;

/// Rule-based opponent used by the casino tables.
///
/// | pattern                 | holds                  |
/// |-------------------------|------------------------|
/// | four or five of a kind  | that group             |
/// | full house              | all five               |
/// | straight                | all five               |
/// | three of a kind         | the three              |
/// | two pair                | both pairs             |
/// | one pair                | the pair               |
/// | anything else           | nothing                |
///
/// # Example
///
/// ```rust
/// use alea_ai::house::HouseAI;
/// use alea_engine::dice::Face::*;
/// use alea_engine::strategy::HoldStrategy;
///
/// let ai = HouseAI::new();
/// let holds = ai.decide_holds(&[Nine, Nine, Ten, Jack, Queen]);
/// assert_eq!(holds, [true, true, false, false, false]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HouseAI;

impl HouseAI {
    pub fn new() -> Self {
        Self
    }

    fn counts(faces: &[Face; DICE_PER_HAND]) -> [u8; 6] {
        let mut counts = [0u8; 6];
        for f in faces {
            counts[f.value() as usize] += 1;
        }
        counts
    }

    /// Face values appearing exactly `n` times.
    fn groups_of(counts: &[u8; 6], n: u8) -> Vec<u8> {
        (0..6u8).filter(|&v| counts[v as usize] == n).collect()
    }

    fn is_straight(counts: &[u8; 6]) -> bool {
        // five distinct values out of six are consecutive unless the gap is inside
        counts.iter().all(|&c| c <= 1) && (counts[0] == 0 || counts[5] == 0)
    }

    fn hold_values(faces: &[Face; DICE_PER_HAND], values: &[u8]) -> [bool; DICE_PER_HAND] {
        std::array::from_fn(|i| values.contains(&faces[i].value()))
    }
}

impl HoldStrategy for HouseAI {
    fn decide_holds(&self, faces: &[Face; DICE_PER_HAND]) -> [bool; DICE_PER_HAND] {
        let counts = Self::counts(faces);
        let largest = counts.iter().copied().max().unwrap_or(0);
        let triples = Self::groups_of(&counts, 3);
        let pairs = Self::groups_of(&counts, 2);

        if largest >= 4 {
            let big: Vec<u8> = (0..6u8).filter(|&v| counts[v as usize] >= 4).collect();
            return Self::hold_values(faces, &big);
        }
        if triples.len() == 1 && pairs.len() == 1 {
            return [true; DICE_PER_HAND];
        }
        if Self::is_straight(&counts) {
            return [true; DICE_PER_HAND];
        }
        if triples.len() == 1 {
            return Self::hold_values(faces, &triples);
        }
        if pairs.len() == 2 {
            return Self::hold_values(faces, &pairs);
        }
        if pairs.len() == 1 {
            return Self::hold_values(faces, &pairs);
        }
        [false; DICE_PER_HAND]
    }

    fn name(&self) -> &str {
        "HouseAI"
    }
}
