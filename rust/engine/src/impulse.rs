use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::Vec3;

pub const MIN_ANGULAR_VELOCITY: f32 = 30.0;
pub const MAX_ANGULAR_VELOCITY: f32 = 55.0;
pub const BASE_IMPULSE: f32 = 22.0;
pub const IMPULSE_VARIANCE: f32 = 0.35;
/// Weakest intensity a roll is allowed to have
pub const MIN_INTENSITY: f32 = 0.3;
pub const DEFAULT_INTENSITY: f32 = 0.7;

/// A roll request coming from the input collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollRequest {
    /// Gesture strength in [0, 1]
    pub intensity: f32,
    /// Screen-space flick direction (x right, y down), normalized when the
    /// impulse is computed; `None` for a random toss
    pub direction: Option<(f32, f32)>,
}

impl Default for RollRequest {
    fn default() -> Self {
        Self::toss(DEFAULT_INTENSITY)
    }
}

impl RollRequest {
    pub fn toss(intensity: f32) -> Self {
        Self {
            intensity,
            direction: None,
        }
    }

    pub fn throw(intensity: f32, dx: f32, dy: f32) -> Self {
        Self {
            intensity,
            direction: Some((dx, dy)),
        }
    }

    /// Flick direction scaled to unit length. A zero or non-finite vector
    /// counts as no direction, so the request falls back to a random toss.
    pub fn unit_direction(&self) -> Option<(f32, f32)> {
        let (dx, dy) = self.direction?;
        let len = (dx * dx + dy * dy).sqrt();
        if !len.is_finite() || len <= f32::EPSILON {
            return None;
        }
        Some((dx / len, dy / len))
    }

    pub fn clamped_intensity(&self) -> f32 {
        if self.intensity.is_nan() {
            return MIN_INTENSITY;
        }
        self.intensity.clamp(MIN_INTENSITY, 1.0)
    }
}

/// Launch parameters for one die.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollImpulse {
    pub linear: Vec3,
    pub angular: Vec3,
    pub start_position: Vec3,
}

/// Signed uniform sample in (-0.5, 0.5).
fn centered<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random::<f32>() - 0.5
}

fn random_spin<R: Rng + ?Sized>(rng: &mut R, intensity: f32) -> Vec3 {
    let magnitude =
        MIN_ANGULAR_VELOCITY + (MAX_ANGULAR_VELOCITY - MIN_ANGULAR_VELOCITY) * intensity;
    Vec3::new(
        centered(rng) * 2.0 * magnitude,
        centered(rng) * 2.0 * magnitude,
        centered(rng) * 2.0 * magnitude,
    )
}

/// Computes launch parameters for die `die_index` from a roll request.
pub fn calculate_impulse<R: Rng + ?Sized>(
    request: &RollRequest,
    die_index: usize,
    rng: &mut R,
) -> RollImpulse {
    let intensity = request.clamped_intensity();
    let angular = random_spin(rng, intensity);
    let base = BASE_IMPULSE * intensity;
    let variance = 1.0 + centered(rng) * IMPULSE_VARIANCE;
    let lane = (die_index as f32 - 2.0) * 0.8;

    match request.unit_direction() {
        None => {
            let linear = Vec3::new(
                centered(rng) * base * 0.5,
                base * 0.35,
                -(rng.random::<f32>() * 0.5 + 0.3) * base,
            ) * variance;
            let start_position = Vec3::new(
                lane + centered(rng) * 0.4,
                2.5 + rng.random::<f32>() * 0.5,
                1.0 + rng.random::<f32>() * 0.5,
            );
            RollImpulse {
                linear,
                angular,
                start_position,
            }
        }
        Some((dx, dy)) => {
            let linear = Vec3::new(dx * base, base * 0.45, dy * base * 1.1) * variance;
            let start_position = Vec3::new(lane + centered(rng) * 0.3, 2.0, 1.2);
            RollImpulse {
                linear,
                angular,
                start_position,
            }
        }
    }
}
