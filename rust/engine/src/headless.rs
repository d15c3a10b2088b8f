//! A tiny deterministic rigid-body stand-in used when no real physics engine
//! is attached (terminal front end, tests, batch simulation).
//!
//! It integrates gravity, bounces off the floor and the table rails, and
//! damps motion while in contact with the floor. It does not model die-die
//! collisions or tipping under gravity, which is why the roll controller's
//! corrective torque and flight failsafe matter here.

use crate::dice::DICE_PER_HAND;
use crate::math::{Quat, Vec3};
use crate::physics::{BodyState, DieBody};
use crate::roll::{DIE_SIZE, TABLE_HALF_EXTENT};
use crate::round::RoundMachine;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessParams {
    pub gravity: f32,
    pub restitution: f32,
    /// Per-second exponential damping applied to horizontal speed on the floor
    pub floor_friction: f32,
    /// Per-second exponential damping applied to spin on the floor
    pub floor_spin_damping: f32,
    pub air_linear_damping: f32,
    pub air_angular_damping: f32,
}

impl Default for HeadlessParams {
    fn default() -> Self {
        Self {
            gravity: -55.0,
            restitution: 0.4,
            floor_friction: 6.0,
            floor_spin_damping: 6.0,
            air_linear_damping: 0.15,
            air_angular_damping: 0.4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessBody {
    state: BodyState,
    params: HeadlessParams,
    awake: bool,
}

impl HeadlessBody {
    pub fn new(position: Vec3) -> Self {
        Self::with_params(position, HeadlessParams::default())
    }

    pub fn with_params(position: Vec3, params: HeadlessParams) -> Self {
        Self {
            state: BodyState {
                position,
                ..BodyState::default()
            },
            params,
            awake: false,
        }
    }

    /// One body per die, spread across the table.
    pub fn row() -> [HeadlessBody; 5] {
        std::array::from_fn(|i| HeadlessBody::new(Vec3::new((i as f32 - 2.0) * 0.9, 2.5, 0.0)))
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    /// Advances the body by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if !self.awake || dt <= 0.0 {
            return;
        }
        let p = self.params;
        let s = &mut self.state;
        let rest_height = DIE_SIZE / 2.0;

        s.linear_velocity.y += p.gravity * dt;
        s.linear_velocity = s.linear_velocity * (-p.air_linear_damping * dt).exp();
        s.angular_velocity = s.angular_velocity * (-p.air_angular_damping * dt).exp();
        s.position = s.position + s.linear_velocity * dt;
        s.orientation = s.orientation.integrate(s.angular_velocity, dt);

        if s.position.y <= rest_height {
            s.position.y = rest_height;
            if s.linear_velocity.y < 0.0 {
                s.linear_velocity.y = -s.linear_velocity.y * p.restitution;
                if s.linear_velocity.y < 0.5 {
                    s.linear_velocity.y = 0.0;
                }
            }
            let friction = (-p.floor_friction * dt).exp();
            s.linear_velocity.x *= friction;
            s.linear_velocity.z *= friction;
            s.angular_velocity = s.angular_velocity * (-p.floor_spin_damping * dt).exp();
        }

        let rail = TABLE_HALF_EXTENT - rest_height;
        if s.position.x.abs() > rail {
            s.position.x = s.position.x.clamp(-rail, rail);
            s.linear_velocity.x = -s.linear_velocity.x * p.restitution;
        }
        if s.position.z.abs() > rail {
            s.position.z = s.position.z.clamp(-rail, rail);
            s.linear_velocity.z = -s.linear_velocity.z * p.restitution;
        }

        if s.linear_velocity.length() < 1e-3 && s.angular_velocity.length() < 1e-3 {
            s.linear_velocity = Vec3::ZERO;
            s.angular_velocity = Vec3::ZERO;
        }
    }
}

impl DieBody for HeadlessBody {
    fn state(&self) -> BodyState {
        self.state
    }

    fn set_position(&mut self, position: Vec3) {
        self.state.position = position;
    }

    fn set_orientation(&mut self, orientation: Quat) {
        self.state.orientation = orientation.normalized();
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.state.linear_velocity = velocity;
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        self.state.angular_velocity = velocity;
    }

    // Unit mass and unit inertia: impulses map directly onto velocities.
    fn apply_linear_impulse(&mut self, impulse: Vec3) {
        self.state.linear_velocity = self.state.linear_velocity + impulse;
        self.awake = true;
    }

    fn apply_angular_impulse(&mut self, impulse: Vec3) {
        self.state.angular_velocity = self.state.angular_velocity + impulse;
        self.awake = true;
    }

    fn wake(&mut self) {
        self.awake = true;
    }
}

/// Five headless bodies stepped in lockstep with a round machine.
#[derive(Debug, Clone)]
pub struct HeadlessTable {
    bodies: [HeadlessBody; DICE_PER_HAND],
}

impl Default for HeadlessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessTable {
    pub fn new() -> Self {
        Self {
            bodies: HeadlessBody::row(),
        }
    }

    pub fn bodies(&self) -> &[HeadlessBody; DICE_PER_HAND] {
        &self.bodies
    }

    /// Steps the bodies, then lets the machine react to the new state.
    pub fn step(&mut self, machine: &mut RoundMachine, dt: f32) {
        for body in self.bodies.iter_mut() {
            body.step(dt);
        }
        machine.tick(&mut self.bodies, dt);
    }

    /// Steps until the machine has nothing in flight or `max_seconds` of
    /// simulated time pass. Returns whether the machine went idle.
    pub fn run_until_idle(&mut self, machine: &mut RoundMachine, dt: f32, max_seconds: f32) -> bool {
        let mut elapsed = 0.0;
        while !machine.is_idle() {
            if elapsed >= max_seconds {
                return false;
            }
            self.step(machine, dt);
            elapsed += dt;
        }
        true
    }
}
