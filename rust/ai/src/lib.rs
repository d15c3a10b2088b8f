//! # alea-ai: House Opponents for Poker Dice
//!
//! Hold strategies that decide which of the opponent's dice to keep between
//! rolls. Every strategy implements [`HoldStrategy`] from `alea-engine`, so the
//! round state machine can drive any of them.
//!
//! ## Core Components
//!
//! - [`house`] - The rule-based house opponent
//! - [`create_ai`] - Factory function for creating strategies by name
//! - [`AiError`] - Error returned for unknown strategy names
//!
//! ## Quick Start
//!
//! ```rust
//! use alea_ai::create_ai;
//! use alea_engine::dice::Face::*;
//!
//! let ai = create_ai("house").expect("known strategy");
//! let holds = ai.decide_holds(&[Ace, Ace, Ace, Nine, Ten]);
//! assert_eq!(holds, [true, true, true, false, false]);
//! ```
//!
//! ## AI Types
//!
//! Currently supported AI types:
//! - `"house"` - The casino opponent (alias `"baseline"`)

use alea_engine::strategy::HoldStrategy;
use thiserror::Error;

pub mod house;

/// Names accepted by [`create_ai`].
pub const AI_TYPES: [&str; 2] = ["house", "baseline"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AiError {
    #[error("Unknown AI type: {name} (expected one of: {})", AI_TYPES.join(", "))]
    UnknownType { name: String },
}

/// Factory function to create hold strategies by type string.
///
/// Names are matched case-insensitively.
///
/// # Errors
///
/// Returns [`AiError::UnknownType`] when `ai_type` names no strategy.
///
/// # Example
///
/// ```rust
/// use alea_ai::{create_ai, AiError};
///
/// let ai = create_ai("house").unwrap();
/// assert_eq!(ai.name(), "HouseAI");
/// assert!(matches!(create_ai("oracle"), Err(AiError::UnknownType { .. })));
/// ```
pub fn create_ai(ai_type: &str) -> Result<Box<dyn HoldStrategy>, AiError> {
    match ai_type.trim().to_ascii_lowercase().as_str() {
        "house" | "baseline" => {
            tracing::debug!(ai_type, "creating house opponent");
            Ok(Box::new(house::HouseAI::new()))
        }
        _ => Err(AiError::UnknownType {
            name: ai_type.to_string(),
        }),
    }
}
