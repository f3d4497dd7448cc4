//! Pose and projection math for stereo XR rendering.
//!
//! All matrices are column-major `[f32; 16]`, matching what OpenGL ES expects
//! from `glUniformMatrix4fv(.., GL_FALSE, ..)`. `a * b` applies `b` first.

#![forbid(unsafe_code)]

pub mod matrix;
pub mod projection;
pub mod rigid;
pub mod types;

pub use matrix::{Mat4, DETERMINANT_EPSILON};
pub use projection::{proj_from_fov, proj_from_tangents, proj_opengl, DepthRange};
pub use rigid::RigidTransform;
pub use types::{quat_length, quat_normalize, quat_rotate, Fov, Pose};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MathError {
    #[error("invalid frustum bounds: near ({near}) must be less than far ({far})")]
    InvalidFrustum { near: f32, far: f32 },
}

pub type MathResult<T> = Result<T, MathError>;
