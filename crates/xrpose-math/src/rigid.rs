//! Rotation + translation transforms with a cheap inverse.

use std::ops::Mul;

use serde::Serialize;

use crate::matrix::Mat4;
use crate::types::Pose;

/// A matrix known to hold only rotation and translation.
///
/// The only ways to build one are from a pose or by composing other rigid
/// transforms, so [`RigidTransform::invert`] can skip the general adjugate.
/// Rigidity still assumes the source quaternion is unit length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RigidTransform(Mat4);

impl RigidTransform {
    pub const IDENTITY: RigidTransform = RigidTransform(Mat4::IDENTITY);

    pub fn from_pose(pose: &Pose) -> Self {
        Self(Mat4::from_pose(pose))
    }

    pub fn from_rotation_translation(orientation: [f32; 4], position: [f32; 3]) -> Self {
        Self::from_pose(&Pose::new(position, orientation))
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.0
    }

    pub fn into_matrix(self) -> Mat4 {
        self.0
    }

    pub fn translation(&self) -> [f32; 3] {
        self.0.translation_part()
    }

    /// Inverse by transposing the rotation block and rotating the negated
    /// translation back into the local frame.
    pub fn invert(&self) -> RigidTransform {
        let m = &self.0 .0;
        let tx = m[12];
        let ty = m[13];
        let tz = m[14];

        let mut out = [0.0f32; 16];
        out[0] = m[0];
        out[1] = m[4];
        out[2] = m[8];

        out[4] = m[1];
        out[5] = m[5];
        out[6] = m[9];

        out[8] = m[2];
        out[9] = m[6];
        out[10] = m[10];

        out[12] = -(m[0] * tx + m[1] * ty + m[2] * tz);
        out[13] = -(m[4] * tx + m[5] * ty + m[6] * tz);
        out[14] = -(m[8] * tx + m[9] * ty + m[10] * tz);
        out[15] = 1.0;

        RigidTransform(Mat4(out))
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Pose> for RigidTransform {
    fn from(pose: Pose) -> Self {
        Self::from_pose(&pose)
    }
}

impl From<RigidTransform> for Mat4 {
    fn from(rigid: RigidTransform) -> Self {
        rigid.0
    }
}

impl Mul for RigidTransform {
    type Output = RigidTransform;

    fn mul(self, rhs: RigidTransform) -> RigidTransform {
        RigidTransform(Mat4::multiply(&self.0, &rhs.0))
    }
}

impl Mul<Mat4> for RigidTransform {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        Mat4::multiply(&self.0, &rhs)
    }
}
