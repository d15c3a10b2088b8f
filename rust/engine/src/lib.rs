//! # alea-engine: Poker Dice Roll and Round Engine
//!
//! Core of a five-dice poker game played against a house opponent. The
//! engine turns physical dice motion into face values, ranks hands, and runs
//! the betting / rolling / scoring cycle with bankroll bookkeeping.
//!
//! ## Core Modules
//!
//! - [`faces`] - Orientation to face mapping
//! - [`roll`] - Per-die launch, settle watchdog and pose transitions
//! - [`hand`] - Hand ranking, tiebreaks and partial-hand patterns
//! - [`round`] - The round state machine and its read model
//! - [`strategy`] - Seams for opponent hold decisions and opponent dice
//! - [`physics`] - The rigid-body interface consumed from a physics engine
//! - [`headless`] - A small deterministic body used without a real engine
//! - [`table`] / [`bankroll`] - Table catalog and chip accounting
//! - [`events`] - Change notifications for observers
//! - [`logger`] - Round records and JSONL logging
//!
//! ## Quick Start
//!
//! ```rust
//! use alea_engine::dice::Face::*;
//! use alea_engine::hand::{compare_player_vs_opponent, evaluate_hand, HandRank, Outcome};
//!
//! let player = evaluate_hand(&[Ace, Ace, Ace, King, King]);
//! let house = evaluate_hand(&[Nine, Nine, Nine, Nine, Ten]);
//! assert_eq!(player.rank, HandRank::FullHouse);
//! assert_eq!(compare_player_vs_opponent(&player, &house), Outcome::Lose);
//! ```
//!
//! ## Reading a Die
//!
//! ```rust
//! use alea_engine::dice::Face;
//! use alea_engine::faces::resolve_face;
//! use alea_engine::math::{Quat, Vec3};
//!
//! assert_eq!(resolve_face(Quat::IDENTITY), Face::Nine);
//! let flipped = Quat::from_axis_angle(Vec3::X, std::f32::consts::PI);
//! assert_eq!(resolve_face(flipped), Face::Ace);
//! ```

pub mod bankroll;
pub mod dice;
pub mod errors;
pub mod events;
pub mod faces;
pub mod hand;
pub mod headless;
pub mod impulse;
pub mod logger;
pub mod math;
pub mod physics;
pub mod roll;
pub mod round;
pub mod scheduler;
pub mod strategy;
pub mod table;
