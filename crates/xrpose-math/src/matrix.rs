//! Column-major 4x4 matrices.

use std::ops::{Mul, MulAssign};

use serde::{Deserialize, Serialize};

use crate::types::Pose;

/// `try_inverse` treats any matrix with `|det|` at or below this as singular.
///
/// Absolute, not relative: transforms in this crate are in meters with
/// unit-scale rotations, so determinants of usable view matrices sit near 1.
pub const DETERMINANT_EPSILON: f32 = 1e-12;

/// 4x4 matrix, column-major: element `row` of column `col` lives at `col * 4 + row`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mat4(pub [f32; 16]);

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    pub const ZERO: Mat4 = Mat4([0.0; 16]);

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[col * 4 + row]
    }

    pub fn translation(offset: [f32; 3]) -> Self {
        let mut m = Self::IDENTITY;
        m.0[12] = offset[0];
        m.0[13] = offset[1];
        m.0[14] = offset[2];
        m
    }

    pub fn scale(factors: [f32; 3]) -> Self {
        let mut m = Self::IDENTITY;
        m.0[0] = factors[0];
        m.0[5] = factors[1];
        m.0[10] = factors[2];
        m
    }

    /// Rotation matrix for the quaternion `[x, y, z, w]`.
    ///
    /// The quaternion is used as given. A non-unit quaternion yields a
    /// rotation block that also scales and skews.
    pub fn from_quat(q: [f32; 4]) -> Self {
        let mut m = Self::IDENTITY;
        m.write_rotation(q);
        m
    }

    /// Rigid transform `translation(position) * from_quat(orientation)`,
    /// computed in one pass.
    pub fn from_pose(pose: &Pose) -> Self {
        let mut m = Self::IDENTITY;
        m.write_rotation(pose.orientation);
        m.0[12] = pose.position[0];
        m.0[13] = pose.position[1];
        m.0[14] = pose.position[2];
        m
    }

    fn write_rotation(&mut self, q: [f32; 4]) {
        let [x, y, z, w] = q;
        let x2 = x + x;
        let y2 = y + y;
        let z2 = z + z;

        let xx = x * x2;
        let yy = y * y2;
        let zz = z * z2;
        let xy = x * y2;
        let xz = x * z2;
        let yz = y * z2;
        let wx = w * x2;
        let wy = w * y2;
        let wz = w * z2;

        let m = &mut self.0;
        m[0] = 1.0 - yy - zz;
        m[1] = xy + wz;
        m[2] = xz - wy;
        m[3] = 0.0;

        m[4] = xy - wz;
        m[5] = 1.0 - xx - zz;
        m[6] = yz + wx;
        m[7] = 0.0;

        m[8] = xz + wy;
        m[9] = yz - wx;
        m[10] = 1.0 - xx - yy;
        m[11] = 0.0;
    }

    /// `a * b`: the transform that applies `b` first, then `a`.
    pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
        let a = &a.0;
        let b = &b.0;
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = a[row] * b[col * 4]
                    + a[4 + row] * b[col * 4 + 1]
                    + a[8 + row] * b[col * 4 + 2]
                    + a[12 + row] * b[col * 4 + 3];
            }
        }
        Mat4(out)
    }

    /// Replaces `self` with `lhs * self`.
    ///
    /// The product is accumulated into a temporary before it is written
    /// back, so `self` may be read freely during the computation.
    pub fn premultiply(&mut self, lhs: &Mat4) {
        let product = Mat4::multiply(lhs, self);
        *self = product;
    }

    pub fn transpose(&self) -> Mat4 {
        let m = &self.0;
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[row * 4 + col] = m[col * 4 + row];
            }
        }
        Mat4(out)
    }

    pub fn determinant(&self) -> f32 {
        self.adjugate().1
    }

    /// General inverse via the adjugate matrix.
    ///
    /// Valid for any invertible matrix. There is no singularity check: a
    /// singular input produces infinite or NaN entries. Use [`Mat4::try_inverse`]
    /// when the input is not known to be invertible.
    pub fn inverse(&self) -> Mat4 {
        let (adj, det) = self.adjugate();
        let inv_det = 1.0 / det;
        let mut out = [0.0f32; 16];
        for (dst, src) in out.iter_mut().zip(adj.iter()) {
            *dst = src * inv_det;
        }
        Mat4(out)
    }

    /// Like [`Mat4::inverse`], but `None` when `|det| <= DETERMINANT_EPSILON`
    /// or the determinant is not finite.
    pub fn try_inverse(&self) -> Option<Mat4> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() <= DETERMINANT_EPSILON {
            return None;
        }
        Some(self.inverse())
    }

    // Cofactor expansion; works unchanged for either storage order since
    // inverse(transpose(M)) == transpose(inverse(M)).
    fn adjugate(&self) -> ([f32; 16], f32) {
        let m = &self.0;
        let mut inv = [0.0f32; 16];

        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14]
            + m[13] * m[6] * m[11]
            - m[13] * m[7] * m[10];
        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14]
            - m[12] * m[6] * m[11]
            + m[12] * m[7] * m[10];
        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13]
            + m[12] * m[5] * m[11]
            - m[12] * m[7] * m[9];
        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13]
            - m[12] * m[5] * m[10]
            + m[12] * m[6] * m[9];

        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14]
            - m[13] * m[2] * m[11]
            + m[13] * m[3] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14]
            + m[12] * m[2] * m[11]
            - m[12] * m[3] * m[10];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13]
            - m[12] * m[1] * m[11]
            + m[12] * m[3] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13]
            + m[12] * m[1] * m[10]
            - m[12] * m[2] * m[9];

        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14]
            + m[13] * m[2] * m[7]
            - m[13] * m[3] * m[6];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14]
            - m[12] * m[2] * m[7]
            + m[12] * m[3] * m[6];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13]
            + m[12] * m[1] * m[7]
            - m[12] * m[3] * m[5];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13]
            - m[12] * m[1] * m[6]
            + m[12] * m[2] * m[5];

        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10]
            - m[9] * m[2] * m[7]
            + m[9] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10]
            + m[8] * m[2] * m[7]
            - m[8] * m[3] * m[6];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9]
            - m[8] * m[1] * m[7]
            + m[8] * m[3] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9]
            + m[8] * m[1] * m[6]
            - m[8] * m[2] * m[5];

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        (inv, det)
    }

    /// Transforms a point (`w = 1`) without the perspective divide.
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let v = self.transform_vec4([p[0], p[1], p[2], 1.0]);
        [v[0], v[1], v[2]]
    }

    pub fn transform_vec4(&self, v: [f32; 4]) -> [f32; 4] {
        let m = &self.0;
        let mut out = [0.0f32; 4];
        for (row, dst) in out.iter_mut().enumerate() {
            *dst = m[row] * v[0] + m[4 + row] * v[1] + m[8 + row] * v[2] + m[12 + row] * v[3];
        }
        out
    }

    pub fn translation_part(&self) -> [f32; 3] {
        [self.0[12], self.0[13], self.0[14]]
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    pub fn abs_diff_eq(&self, other: &Mat4, eps: f32) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        Mat4::multiply(&self, &rhs)
    }
}

impl Mul<&Mat4> for &Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: &Mat4) -> Mat4 {
        Mat4::multiply(self, rhs)
    }
}

impl MulAssign for Mat4 {
    /// `self = self * rhs`, accumulated through a temporary.
    fn mul_assign(&mut self, rhs: Mat4) {
        let product = Mat4::multiply(self, &rhs);
        *self = product;
    }
}

impl From<Pose> for Mat4 {
    fn from(pose: Pose) -> Self {
        Mat4::from_pose(&pose)
    }
}
