//! Off-axis perspective projections for per-eye rendering.
//!
//! Headsets report a separate, usually asymmetric, frustum for each eye, so
//! the optical center is not the middle of the image. These builders take
//! the four half-angles (or their tangents) directly.

use serde::{Deserialize, Serialize};

use crate::matrix::Mat4;
use crate::types::Fov;
use crate::{MathError, MathResult};

/// Clip-space depth convention of the target graphics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthRange {
    /// OpenGL / GLES: near maps to -1, far to +1.
    #[default]
    NegativeOneToOne,
    /// Vulkan / D3D: near maps to 0, far to 1.
    ZeroToOne,
}

/// OpenGL projection for the frustum bounded by four half-angles in radians.
///
/// Fails with [`MathError::InvalidFrustum`] unless `near < far`.
pub fn proj_opengl(
    left: f32,
    right: f32,
    up: f32,
    down: f32,
    near: f32,
    far: f32,
) -> MathResult<Mat4> {
    proj_from_tangents(
        left.tan(),
        right.tan(),
        up.tan(),
        down.tan(),
        near,
        far,
        DepthRange::NegativeOneToOne,
    )
}

/// Projection for an eye's field of view.
///
/// Fields map straight across: `angle_up` is the top edge and `angle_down`
/// the bottom edge, giving +Y up in clip space.
pub fn proj_from_fov(fov: &Fov, near: f32, far: f32, depth: DepthRange) -> MathResult<Mat4> {
    proj_from_tangents(
        fov.angle_left.tan(),
        fov.angle_right.tan(),
        fov.angle_up.tan(),
        fov.angle_down.tan(),
        near,
        far,
        depth,
    )
}

pub fn proj_from_tangents(
    tan_left: f32,
    tan_right: f32,
    tan_up: f32,
    tan_down: f32,
    near: f32,
    far: f32,
    depth: DepthRange,
) -> MathResult<Mat4> {
    // Negated so NaN bounds are rejected too.
    if !(near < far) {
        return Err(MathError::InvalidFrustum { near, far });
    }

    let tan_width = tan_right - tan_left;
    let tan_height = tan_up - tan_down;
    let depth_span = far - near;

    let mut m = [0.0f32; 16];
    m[0] = 2.0 / tan_width;
    m[5] = 2.0 / tan_height;
    m[8] = (tan_right + tan_left) / tan_width;
    m[9] = (tan_up + tan_down) / tan_height;
    m[11] = -1.0;

    match depth {
        DepthRange::NegativeOneToOne => {
            m[10] = -(far + near) / depth_span;
            m[14] = -(2.0 * far * near) / depth_span;
        }
        DepthRange::ZeroToOne => {
            m[10] = -far / depth_span;
            m[14] = -(far * near) / depth_span;
        }
    }

    Ok(Mat4(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn ndc_depth(proj: &Mat4, view_z: f32) -> f32 {
        let clip = proj.transform_vec4([0.0, 0.0, view_z, 1.0]);
        clip[2] / clip[3]
    }

    #[test]
    fn test_ninety_degree_symmetric() {
        let m = proj_opengl(-0.785398, 0.785398, 0.785398, -0.785398, 0.1, 100.0).unwrap();
        assert!((m.0[0] - 1.0).abs() < EPS);
        assert!((m.0[5] - 1.0).abs() < EPS);
        assert!(m.0[8].abs() < EPS);
        assert!(m.0[9].abs() < EPS);
        assert_eq!(m.0[11], -1.0);
        assert_eq!(m.0[15], 0.0);
    }

    #[test]
    fn test_rejects_degenerate_depth() {
        assert_eq!(
            proj_opengl(-0.5, 0.5, 0.5, -0.5, 1.0, 1.0),
            Err(MathError::InvalidFrustum {
                near: 1.0,
                far: 1.0
            })
        );
        assert!(proj_opengl(-0.5, 0.5, 0.5, -0.5, 2.0, 1.0).is_err());
        assert!(proj_opengl(-0.5, 0.5, 0.5, -0.5, f32::NAN, 1.0).is_err());
    }

    #[test]
    fn test_opengl_depth_maps_to_minus_one_one() {
        let m = proj_opengl(-0.6, 0.6, 0.5, -0.5, 0.1, 100.0).unwrap();
        assert!((ndc_depth(&m, -0.1) + 1.0).abs() < 1e-4);
        assert!((ndc_depth(&m, -100.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_to_one_depth() {
        let fov = Fov::symmetric(0.6, 0.5);
        let m = proj_from_fov(&fov, 0.1, 100.0, DepthRange::ZeroToOne).unwrap();
        assert!(ndc_depth(&m, -0.1).abs() < 1e-4);
        assert!((ndc_depth(&m, -100.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_asymmetric_center_offset() {
        // Typical left eye: wider towards the temple.
        let m = proj_opengl(-0.9, 0.7, 0.8, -0.8, 0.05, 50.0).unwrap();
        let (tl, tr) = ((-0.9f32).tan(), (0.7f32).tan());
        assert!((m.0[8] - (tr + tl) / (tr - tl)).abs() < EPS);
        assert!(m.0[8] < 0.0);
        assert!(m.0[9].abs() < EPS);
    }

    #[test]
    fn test_fov_matches_angle_form() {
        let fov = Fov::new(-0.8, 0.75, 0.7, -0.9);
        let a = proj_from_fov(&fov, 0.1, 10.0, DepthRange::NegativeOneToOne).unwrap();
        let b = proj_opengl(-0.8, 0.75, 0.7, -0.9, 0.1, 10.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_swapped_vertical_flips_image() {
        let upright = proj_opengl(-0.5, 0.5, 0.6, -0.4, 0.1, 10.0).unwrap();
        let flipped = proj_opengl(-0.5, 0.5, -0.4, 0.6, 0.1, 10.0).unwrap();
        assert!(upright.0[5] > 0.0);
        assert!((flipped.0[5] + upright.0[5]).abs() < EPS);
    }
}
