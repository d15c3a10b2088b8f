//! Seams for the opponent's decisions and dice.
//!
//! The round state machine asks a [`HoldStrategy`] which opponent dice to
//! keep between rolls, and draws the opponent's fresh values from a
//! [`FaceRoller`]. Concrete strategies live in the `alea-ai` crate.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::dice::{DICE_PER_HAND, Face};

pub trait HoldStrategy: Send + Sync {
    /// Chooses which of the current opponent dice to keep for the next roll.
    fn decide_holds(&self, faces: &[Face; DICE_PER_HAND]) -> [bool; DICE_PER_HAND];

    fn name(&self) -> &str;
}

/// Source of opponent face values. The opponent's dice are not simulated.
pub trait FaceRoller: Send {
    fn roll_face(&mut self) -> Face;
}

impl<F> FaceRoller for F
where
    F: FnMut() -> Face + Send,
{
    fn roll_face(&mut self) -> Face {
        self()
    }
}

/// Uniform face rolls from a seeded ChaCha20 stream.
#[derive(Debug, Clone)]
pub struct SeededRoller {
    rng: ChaCha20Rng,
}

impl SeededRoller {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl FaceRoller for SeededRoller {
    fn roll_face(&mut self) -> Face {
        Face::from_value(self.rng.random_range(0..6u8))
    }
}

/// Rerolls every die that is not held, leaving held dice untouched.
pub fn roll_unheld(
    current: &[Face; DICE_PER_HAND],
    held: &[bool; DICE_PER_HAND],
    roller: &mut dyn FaceRoller,
) -> [Face; DICE_PER_HAND] {
    let mut next = *current;
    for (face, &keep) in next.iter_mut().zip(held.iter()) {
        if !keep {
            *face = roller.roll_face();
        }
    }
    next
}
