use serde::{Deserialize, Serialize};

/// Orientation plus position of a tracked node.
///
/// `orientation` is `[x, y, z, w]` and is expected to be unit length. Nothing
/// in this crate normalizes it for you; see [`Pose::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: [f32; 3],
    pub orientation: [f32; 4],
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: [0.0; 3],
        orientation: [0.0, 0.0, 0.0, 1.0],
    };

    pub fn new(position: [f32; 3], orientation: [f32; 4]) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_position(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Same pose with a unit-length orientation. A zero quaternion becomes identity.
    pub fn normalized(self) -> Self {
        Self {
            position: self.position,
            orientation: quat_normalize(self.orientation),
        }
    }

    /// `rotate(orientation, point) + position`.
    pub fn transform_point(&self, point: [f32; 3]) -> [f32; 3] {
        let r = quat_rotate(self.orientation, point);
        [
            r[0] + self.position[0],
            r[1] + self.position[1],
            r[2] + self.position[2],
        ]
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-eye field of view as four half-angles in radians.
///
/// Left and down are normally negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Fov {
    pub angle_left: f32,
    pub angle_right: f32,
    pub angle_up: f32,
    pub angle_down: f32,
}

impl Fov {
    pub fn new(angle_left: f32, angle_right: f32, angle_up: f32, angle_down: f32) -> Self {
        Self {
            angle_left,
            angle_right,
            angle_up,
            angle_down,
        }
    }

    /// Symmetric frustum with the given horizontal and vertical half-angles.
    pub fn symmetric(half_horizontal: f32, half_vertical: f32) -> Self {
        Self::new(-half_horizontal, half_horizontal, half_vertical, -half_vertical)
    }
}

pub fn quat_length(q: [f32; 4]) -> f32 {
    (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt()
}

pub fn quat_normalize(q: [f32; 4]) -> [f32; 4] {
    let len = quat_length(q);
    if len <= f32::EPSILON || !len.is_finite() {
        return [0.0, 0.0, 0.0, 1.0];
    }
    [q[0] / len, q[1] / len, q[2] / len, q[3] / len]
}

/// Rotates `v` by the unit quaternion `q` (`q * v * q^-1`).
pub fn quat_rotate(q: [f32; 4], v: [f32; 3]) -> [f32; 3] {
    let [qx, qy, qz, qw] = q;
    // t = 2 * cross(q.xyz, v)
    let tx = 2.0 * (qy * v[2] - qz * v[1]);
    let ty = 2.0 * (qz * v[0] - qx * v[2]);
    let tz = 2.0 * (qx * v[1] - qy * v[0]);
    // v + w * t + cross(q.xyz, t)
    [
        v[0] + qw * tx + (qy * tz - qz * ty),
        v[1] + qw * ty + (qz * tx - qx * tz),
        v[2] + qw * tz + (qx * ty - qy * tx),
    ]
}
