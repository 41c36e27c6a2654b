//! Rotation with lazily converted representations.
//!
//! A [`Rotation`] always holds a normalized quaternion. The Euler-angle and
//! 3×3-matrix forms are caches: writing one representation replaces the
//! quaternion and invalidates the other cache, and reading a stale form
//! recomputes it from the quaternion.
//!
//! # Conventions
//!
//! - Euler angles are degrees, `x` = pitch, `y` = yaw, `z` = roll.
//! - The quaternion is composed as `Ry(yaw) * Rx(pitch) * Rz(roll)`.
//! - Column vectors (`matrix * v`), right-handed, +Y up, +Z forward.

use std::cell::Cell;
use std::fmt;
use std::ops::Mul;

use glam::{Mat3, Quat, Vec3};

use super::angle::Angle;

/// Below this squared length a direction is treated as zero.
const DIRECTION_EPSILON: f32 = 1e-12;

/// Dot product above which slerp falls back to normalized lerp.
const SLERP_LINEAR_THRESHOLD: f32 = 0.9995;

#[derive(Clone)]
pub struct Rotation {
    quat: Quat,
    euler: Cell<Option<Vec3>>,
    matrix: Cell<Option<Mat3>>,
}

impl Rotation {
    #[must_use]
    pub fn identity() -> Self {
        Self {
            quat: Quat::IDENTITY,
            euler: Cell::new(Some(Vec3::ZERO)),
            matrix: Cell::new(Some(Mat3::IDENTITY)),
        }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Builds a rotation from pitch/yaw/roll in degrees.
    #[must_use]
    pub fn from_euler(pitch: f32, yaw: f32, roll: f32) -> Self {
        let mut r = Self::identity();
        r.set_euler_angles(Vec3::new(pitch, yaw, roll));
        r
    }

    #[must_use]
    pub fn from_quaternion(q: Quat) -> Self {
        let mut r = Self::identity();
        r.set_quaternion(q);
        r
    }

    #[must_use]
    pub fn from_matrix(m: Mat3) -> Self {
        let mut r = Self::identity();
        r.set_matrix(m);
        r
    }

    /// Rotation of `angle` about `axis`. A zero axis yields identity.
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, angle: Angle) -> Self {
        match axis.try_normalize() {
            Some(axis) => Self::from_quaternion(Quat::from_axis_angle(axis, angle.radians())),
            None => Self::identity(),
        }
    }

    /// Rotation whose +Z axis points along `forward`, with +Y as the up hint.
    #[must_use]
    pub fn from_direction(forward: Vec3) -> Self {
        Self::from_direction_with_up(forward, Vec3::Y)
    }

    /// Rotation whose +Z axis points along `forward`.
    ///
    /// When `forward` is parallel to `up` the up hint is swapped for +Z (or +X
    /// if `forward` is itself along Z) so the basis never degenerates. A zero
    /// `forward` yields identity.
    #[must_use]
    pub fn from_direction_with_up(forward: Vec3, up: Vec3) -> Self {
        if forward.length_squared() <= DIRECTION_EPSILON {
            return Self::identity();
        }
        let z = forward.normalize();
        let mut up = up.try_normalize().unwrap_or(Vec3::Y);
        if z.cross(up).length_squared() < 1e-6 {
            up = if z.z.abs() < 0.9 { Vec3::Z } else { Vec3::X };
        }
        let x = up.cross(z).normalize();
        let y = z.cross(x);
        Self::from_matrix(Mat3::from_cols(x, y, z))
    }

    /// Rotation that turns +Z from `eye` toward `target`.
    #[must_use]
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self::from_direction_with_up(target - eye, up)
    }

    /// Spherical interpolation along the shorter arc.
    ///
    /// `t` is not clamped: values outside `[0, 1]` extrapolate with the same
    /// formula.
    #[must_use]
    pub fn slerp(a: &Self, b: &Self, t: f32) -> Self {
        let qa = a.quat;
        let mut qb = b.quat;
        let mut dot = qa.dot(qb);
        if dot < 0.0 {
            qb = -qb;
            dot = -dot;
        }

        let q = if dot > SLERP_LINEAR_THRESHOLD {
            qa + (qb - qa) * t
        } else {
            let theta = dot.clamp(-1.0, 1.0).acos();
            let sin_theta = theta.sin();
            let wa = ((1.0 - t) * theta).sin() / sin_theta;
            let wb = (t * theta).sin() / sin_theta;
            qa * wa + qb * wb
        };
        Self::from_quaternion(q)
    }

    // ========================================================================
    // Representations
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn quaternion(&self) -> Quat {
        self.quat
    }

    /// Euler angles in degrees (pitch, yaw, roll), each in `[0, 360)`.
    ///
    /// If Euler angles were the last representation written they are
    /// returned as written (normalized); otherwise they are extracted from
    /// the quaternion.
    #[must_use]
    pub fn euler_angles(&self) -> Vec3 {
        if let Some(e) = self.euler.get() {
            return e;
        }
        let e = euler_from_quat(self.quat);
        self.euler.set(Some(e));
        e
    }

    #[must_use]
    pub fn matrix(&self) -> Mat3 {
        if let Some(m) = self.matrix.get() {
            return m;
        }
        let m = Mat3::from_quat(self.quat);
        self.matrix.set(Some(m));
        m
    }

    /// Replaces the rotation. A zero-length quaternion resets to identity.
    pub fn set_quaternion(&mut self, q: Quat) {
        self.quat = normalize_or_identity(q);
        self.euler.set(None);
        self.matrix.set(None);
    }

    pub fn set_euler_angles(&mut self, degrees: Vec3) {
        self.quat = quat_from_euler(degrees);
        self.euler.set(Some(normalize_euler(degrees)));
        self.matrix.set(None);
    }

    /// Replaces the rotation from an orthonormal basis.
    pub fn set_matrix(&mut self, m: Mat3) {
        self.quat = normalize_or_identity(Quat::from_mat3(&m));
        self.euler.set(None);
        self.matrix.set(Some(m));
    }

    // ========================================================================
    // Algebra
    // ========================================================================

    #[must_use]
    pub fn inverse(&self) -> Self {
        Self::from_quaternion(self.quat.conjugate())
    }

    /// Smallest angle that rotates `self` onto `other`.
    #[must_use]
    pub fn angle_to(&self, other: &Self) -> Angle {
        let dot = self.quat.dot(other.quat).abs().min(1.0);
        Angle::from_radians(2.0 * dot.acos())
    }

    #[inline]
    #[must_use]
    pub fn rotate_vector(&self, v: Vec3) -> Vec3 {
        self.quat * v
    }

    #[inline]
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.quat * Vec3::Z
    }

    #[inline]
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.quat * Vec3::Y
    }

    #[inline]
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.quat * Vec3::X
    }
}

fn normalize_or_identity(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if len_sq <= f32::EPSILON || !len_sq.is_finite() {
        log::debug!("Degenerate quaternion {q:?} replaced with identity");
        Quat::IDENTITY
    } else {
        q.normalize()
    }
}

fn quat_from_euler(degrees: Vec3) -> Quat {
    let pitch = degrees.x.to_radians();
    let yaw = degrees.y.to_radians();
    let roll = degrees.z.to_radians();
    (Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch) * Quat::from_rotation_z(roll))
        .normalize()
}

/// Extracts (pitch, yaw, roll) for `Ry * Rx * Rz`, computed in f64.
fn euler_from_quat(q: Quat) -> Vec3 {
    let (x, y, z, w) = (
        f64::from(q.x),
        f64::from(q.y),
        f64::from(q.z),
        f64::from(q.w),
    );

    // Row-major elements of the rotation matrix
    let m00 = 1.0 - 2.0 * (y * y + z * z);
    let m01 = 2.0 * (x * y - w * z);
    let m10 = 2.0 * (x * y + w * z);
    let m11 = 1.0 - 2.0 * (x * x + z * z);
    let m12 = 2.0 * (y * z - w * x);
    let m20 = 2.0 * (x * z - w * y);
    let m21 = 2.0 * (y * z + w * x);

    let cos_pitch = m10.hypot(m11);
    let sin_pitch = -m12;
    let pitch = sin_pitch.atan2(cos_pitch);

    // Gimbal lock: yaw and roll share an axis, fold everything into yaw
    let roll = if cos_pitch > 1e-5 { m10.atan2(m11) } else { 0.0 };

    // Near a pole only yaw - roll (pitch up) or yaw + roll (pitch down) is
    // well-conditioned; the pair is scaled by (1 + sin) and (1 - sin).
    let yaw = if sin_pitch >= 0.0 {
        (m01 - m20).atan2(m00 + m21) + roll
    } else {
        (-(m01 + m20)).atan2(m00 - m21) - roll
    };

    normalize_euler(Vec3::new(
        pitch.to_degrees() as f32,
        yaw.to_degrees() as f32,
        roll.to_degrees() as f32,
    ))
}

fn normalize_euler(degrees: Vec3) -> Vec3 {
    let wrap = |d: f32| Angle::from_degrees(d).clamped().degrees();
    Vec3::new(wrap(degrees.x), wrap(degrees.y), wrap(degrees.z))
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rotation")
            .field("quat", &self.quat)
            .field("euler", &self.euler.get())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Rotation {
    fn eq(&self, other: &Self) -> bool {
        self.quat == other.quat
    }
}

impl From<Quat> for Rotation {
    fn from(q: Quat) -> Self {
        Self::from_quaternion(q)
    }
}

impl From<Rotation> for Quat {
    fn from(r: Rotation) -> Self {
        r.quat
    }
}

impl From<&Rotation> for Quat {
    fn from(r: &Rotation) -> Self {
        r.quat
    }
}

impl From<&Rotation> for Rotation {
    fn from(r: &Rotation) -> Self {
        r.clone()
    }
}

impl Mul for Rotation {
    type Output = Rotation;
    fn mul(self, rhs: Rotation) -> Rotation {
        Rotation::from_quaternion(self.quat * rhs.quat)
    }
}

impl Mul<&Rotation> for &Rotation {
    type Output = Rotation;
    fn mul(self, rhs: &Rotation) -> Rotation {
        Rotation::from_quaternion(self.quat * rhs.quat)
    }
}

impl Mul<Vec3> for &Rotation {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.quat * rhs
    }
}

impl Mul<Vec3> for Rotation {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.quat * rhs
    }
}
