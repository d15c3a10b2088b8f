//! Shared fixtures for the engine's integration tests.
//!
//! `ScriptedBody` stands in for a physics body: once launched it stays in the
//! air for a few ticks and then lands flat on the next face from its queue,
//! so a round can be played with exactly the dice a test wants.
#![allow(dead_code)]

use std::collections::VecDeque;

use alea_engine::dice::{DICE_PER_HAND, Face};
use alea_engine::faces::orientation_for;
use alea_engine::impulse::RollRequest;
use alea_engine::math::{Quat, Vec3};
use alea_engine::physics::{BodyState, DieBody};
use alea_engine::roll::DIE_SIZE;
use alea_engine::round::{RoundConfig, RoundMachine};
use alea_engine::strategy::{FaceRoller, HoldStrategy};

pub const DT: f32 = 1.0 / 60.0;
pub const FLIGHT_TICKS: u32 = 10;

#[derive(Debug, Clone)]
pub struct ScriptedBody {
    state: BodyState,
    faces: VecDeque<Face>,
    remaining: u32,
    pub launches: u32,
}

impl ScriptedBody {
    pub fn new() -> Self {
        Self {
            state: BodyState::default(),
            faces: VecDeque::new(),
            remaining: 0,
            launches: 0,
        }
    }

    pub fn push(&mut self, face: Face) {
        self.faces.push_back(face);
    }

    pub fn queued(&self) -> usize {
        self.faces.len()
    }

    pub fn advance(&mut self) {
        if self.remaining == 0 {
            return;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            let face = self.faces.pop_front().unwrap_or(Face::Nine);
            self.state.position = Vec3::new(self.state.position.x, DIE_SIZE / 2.0, 0.0);
            self.state.orientation = orientation_for(face);
            self.state.linear_velocity = Vec3::ZERO;
            self.state.angular_velocity = Vec3::ZERO;
        }
    }
}

impl DieBody for ScriptedBody {
    fn state(&self) -> BodyState {
        self.state
    }

    fn set_position(&mut self, position: Vec3) {
        self.state.position = position;
    }

    fn set_orientation(&mut self, orientation: Quat) {
        self.state.orientation = orientation;
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.state.linear_velocity = velocity;
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.state.angular_velocity = velocity;
    }

    fn apply_linear_impulse(&mut self, impulse: Vec3) {
        self.state.linear_velocity = self.state.linear_velocity + impulse;
        self.remaining = FLIGHT_TICKS;
        self.launches += 1;
    }

    fn apply_angular_impulse(&mut self, impulse: Vec3) {
        self.state.angular_velocity = self.state.angular_velocity + impulse;
    }

    fn wake(&mut self) {}
}

/// Opponent strategy that rerolls everything.
pub struct HoldNothing;

impl HoldStrategy for HoldNothing {
    fn decide_holds(&self, _faces: &[Face; DICE_PER_HAND]) -> [bool; DICE_PER_HAND] {
        [false; DICE_PER_HAND]
    }

    fn name(&self) -> &str {
        "hold-nothing"
    }
}

/// Opponent strategy that keeps every die.
pub struct HoldAll;

impl HoldStrategy for HoldAll {
    fn decide_holds(&self, _faces: &[Face; DICE_PER_HAND]) -> [bool; DICE_PER_HAND] {
        [true; DICE_PER_HAND]
    }

    fn name(&self) -> &str {
        "hold-all"
    }
}

pub fn queued_roller(faces: &[Face]) -> Box<dyn FaceRoller> {
    let mut queue: VecDeque<Face> = faces.iter().copied().collect();
    Box::new(move || queue.pop_front().unwrap_or(Face::Nine))
}

pub fn parse(hand: &str) -> [Face; DICE_PER_HAND] {
    let faces = alea_engine::dice::parse_faces(hand).expect("valid faces");
    faces.try_into().expect("five faces")
}

pub struct Rig {
    pub machine: RoundMachine,
    pub bodies: [ScriptedBody; DICE_PER_HAND],
}

impl Rig {
    pub fn new(strategy: Box<dyn HoldStrategy>, opponent: &[Face]) -> Self {
        Self::with_config(RoundConfig::default(), strategy, opponent)
    }

    pub fn with_config(
        config: RoundConfig,
        strategy: Box<dyn HoldStrategy>,
        opponent: &[Face],
    ) -> Self {
        let machine = RoundMachine::new(config, strategy).with_opponent_roller(queued_roller(opponent));
        Self {
            machine,
            bodies: std::array::from_fn(|_| ScriptedBody::new()),
        }
    }

    /// Queues one roll's worth of player faces; `None` entries are skipped
    /// (dice expected to be held).
    pub fn queue(&mut self, faces: [Option<Face>; DICE_PER_HAND]) {
        for (body, face) in self.bodies.iter_mut().zip(faces) {
            if let Some(f) = face {
                body.push(f);
            }
        }
    }

    pub fn queue_all(&mut self, faces: [Face; DICE_PER_HAND]) {
        self.queue(faces.map(Some));
    }

    pub fn step(&mut self) {
        for b in self.bodies.iter_mut() {
            b.advance();
        }
        self.machine.tick(&mut self.bodies, DT);
    }

    pub fn run_for(&mut self, seconds: f32) {
        let ticks = (seconds / DT).ceil() as usize;
        for _ in 0..ticks {
            self.step();
        }
    }

    pub fn run_until_idle(&mut self) -> bool {
        for _ in 0..(60 * 20) {
            if self.machine.is_idle() {
                return true;
            }
            self.step();
        }
        false
    }

    /// Requests a roll and plays it through the opponent reveal.
    pub fn roll(&mut self) {
        assert!(
            self.machine.place_bet_and_roll(RollRequest::default()),
            "roll request was rejected"
        );
        assert!(self.run_until_idle(), "roll never finished");
    }

    /// Plays three rolls with no player holds.
    pub fn play_round(&mut self, rolls: [[Face; DICE_PER_HAND]; 3]) {
        for faces in rolls {
            self.queue_all(faces);
            self.roll();
        }
    }
}
