//! Minimal 3-D vector and quaternion types.
//!
//! Only the operations needed to read die orientation, compute corrective
//! torque and ease between poses are provided. Quaternions are expected to be
//! unit length; constructors normalize where it matters.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const X: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    pub const Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len <= f32::EPSILON {
            Vec3::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    pub fn lerp(self, to: Vec3, t: f32) -> Vec3 {
        self + (to - self) * t
    }

    /// Any unit vector perpendicular to `self`.
    pub fn any_orthogonal(self) -> Vec3 {
        let candidate = if self.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
        self.cross(candidate).normalized()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Unit quaternion stored as w + xi + yj + zk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Quat {
        let axis = axis.normalized();
        let (s, c) = (angle * 0.5).sin_cos();
        Quat::new(c, axis.x * s, axis.y * s, axis.z * s)
    }

    /// Applies rotations about X, then Y, then Z.
    pub fn from_euler_xyz(x: f32, y: f32, z: f32) -> Quat {
        Quat::from_axis_angle(Vec3::Z, z)
            * Quat::from_axis_angle(Vec3::Y, y)
            * Quat::from_axis_angle(Vec3::X, x)
    }

    /// Shortest rotation taking unit vector `from` onto unit vector `to`.
    pub fn from_rotation_arc(from: Vec3, to: Vec3) -> Quat {
        let from = from.normalized();
        let to = to.normalized();
        let d = from.dot(to);
        if d >= 1.0 - 1e-6 {
            return Quat::IDENTITY;
        }
        if d <= -1.0 + 1e-6 {
            return Quat::from_axis_angle(from.any_orthogonal(), std::f32::consts::PI);
        }
        let c = from.cross(to);
        Quat::new(1.0 + d, c.x, c.y, c.z).normalized()
    }

    pub fn dot(self, rhs: Quat) -> f32 {
        self.w * rhs.w + self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalized(self) -> Quat {
        let n = self.length();
        if n <= f32::EPSILON {
            Quat::IDENTITY
        } else {
            Quat::new(self.w / n, self.x / n, self.y / n, self.z / n)
        }
    }

    pub fn conjugate(self) -> Quat {
        Quat::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Inverse of a unit quaternion.
    pub fn inverse(self) -> Quat {
        self.conjugate()
    }

    /// Rotates `v` from the local frame into the frame this quaternion describes.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let t = u.cross(v) * 2.0;
        v + t * self.w + u.cross(t)
    }

    /// Spherical interpolation along the shorter arc.
    pub fn slerp(self, to: Quat, t: f32) -> Quat {
        let mut to = to;
        let mut cos = self.dot(to);
        if cos < 0.0 {
            to = Quat::new(-to.w, -to.x, -to.y, -to.z);
            cos = -cos;
        }
        if cos > 0.9995 {
            return Quat::new(
                self.w + (to.w - self.w) * t,
                self.x + (to.x - self.x) * t,
                self.y + (to.y - self.y) * t,
                self.z + (to.z - self.z) * t,
            )
            .normalized();
        }
        let theta = cos.acos();
        let sin = theta.sin();
        let a = ((1.0 - t) * theta).sin() / sin;
        let b = (t * theta).sin() / sin;
        Quat::new(
            self.w * a + to.w * b,
            self.x * a + to.x * b,
            self.y * a + to.y * b,
            self.z * a + to.z * b,
        )
    }

    /// Integrates an angular velocity over `dt` seconds.
    pub fn integrate(self, omega: Vec3, dt: f32) -> Quat {
        let spin = Quat::new(0.0, omega.x, omega.y, omega.z) * self;
        Quat::new(
            self.w + 0.5 * dt * spin.w,
            self.x + 0.5 * dt * spin.x,
            self.y + 0.5 * dt * spin.y,
            self.z + 0.5 * dt * spin.z,
        )
        .normalized()
    }
}

impl Mul for Quat {
    type Output = Quat;

    fn mul(self, rhs: Quat) -> Quat {
        Quat::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }
}
