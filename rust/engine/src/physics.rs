use crate::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Snapshot of a rigid body as read from the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BodyState {
    pub position: Vec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl BodyState {
    pub fn linear_speed(&self) -> f32 {
        self.linear_velocity.length()
    }

    pub fn angular_speed(&self) -> f32 {
        self.angular_velocity.length()
    }
}

/// A position plus orientation a die can be placed at or eased toward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

/// The per-die rigid body handle supplied by the external physics engine.
///
/// The engine is stepped by its owner; the roll controller only reads state
/// and issues commands between steps.
pub trait DieBody {
    fn state(&self) -> BodyState;
    fn set_position(&mut self, position: Vec3);
    fn set_orientation(&mut self, orientation: Quat);
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn set_angular_velocity(&mut self, velocity: Vec3);
    fn apply_linear_impulse(&mut self, impulse: Vec3);
    fn apply_angular_impulse(&mut self, impulse: Vec3);
    fn wake(&mut self);

    /// Teleports the body to `pose` and stops it.
    fn place(&mut self, pose: Pose) {
        self.set_position(pose.position);
        self.set_orientation(pose.orientation);
        self.set_linear_velocity(Vec3::ZERO);
        self.set_angular_velocity(Vec3::ZERO);
    }
}
