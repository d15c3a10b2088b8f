//! Orientation to face mapping.
//!
//! Each die carries six fixed local face normals, one per symbol. The face
//! reading "up" is the normal that, once rotated into world space, points
//! most nearly along world up. The mapping is total: every orientation
//! yields exactly one face, with ties resolved in [`FACE_AXES`] order.

use crate::dice::Face;
use crate::math::{Quat, Vec3};

/// World up direction.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Local face normals and the symbol printed on each.
pub const FACE_AXES: [(Vec3, Face); 6] = [
    (Vec3::new(0.0, 1.0, 0.0), Face::Nine),
    (Vec3::new(0.0, -1.0, 0.0), Face::Ace),
    (Vec3::new(1.0, 0.0, 0.0), Face::Ten),
    (Vec3::new(-1.0, 0.0, 0.0), Face::King),
    (Vec3::new(0.0, 0.0, 1.0), Face::Jack),
    (Vec3::new(0.0, 0.0, -1.0), Face::Queen),
];

/// Returns the face pointing up for a die with the given orientation.
pub fn resolve_face(orientation: Quat) -> Face {
    let mut best = FACE_AXES[0].1;
    let mut best_dot = f32::NEG_INFINITY;
    for (axis, face) in FACE_AXES {
        let dot = orientation.rotate(axis).dot(WORLD_UP);
        if dot > best_dot {
            best_dot = dot;
            best = face;
        }
    }
    best
}

/// Local face normal closest to world up, and its alignment (1.0 = flat).
///
/// Works in the die's frame: world up is inverse-rotated into local space
/// and compared against the six axes.
pub fn nearest_face_axis(orientation: Quat) -> (Vec3, f32) {
    let up_local = orientation.inverse().rotate(WORLD_UP);
    let mut best_axis = FACE_AXES[0].0;
    let mut best_dot = f32::NEG_INFINITY;
    for (axis, _) in FACE_AXES {
        let dot = axis.dot(up_local);
        if dot > best_dot {
            best_dot = dot;
            best_axis = axis;
        }
    }
    (best_axis, best_dot)
}

/// Orientation that shows `face` up with no yaw.
pub fn orientation_for(face: Face) -> Quat {
    use std::f32::consts::{FRAC_PI_2, PI};
    match face {
        Face::Nine => Quat::IDENTITY,
        Face::Ace => Quat::from_axis_angle(Vec3::X, PI),
        Face::Ten => Quat::from_axis_angle(Vec3::Z, FRAC_PI_2),
        Face::King => Quat::from_axis_angle(Vec3::Z, -FRAC_PI_2),
        Face::Jack => Quat::from_axis_angle(Vec3::X, -FRAC_PI_2),
        Face::Queen => Quat::from_axis_angle(Vec3::X, FRAC_PI_2),
    }
}

/// Rotates `orientation` the shortest way so its nearest face lies flat.
pub fn snap_to_nearest_face(orientation: Quat) -> Quat {
    let (axis, _) = nearest_face_axis(orientation);
    let world_axis = orientation.rotate(axis);
    (Quat::from_rotation_arc(world_axis, WORLD_UP) * orientation).normalized()
}
