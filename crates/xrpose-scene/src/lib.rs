//! Frame planning for a two-cube, ground-grid stereo scene.
//!
//! Everything here works on plain pose, field-of-view and action data, so the
//! render loop can hand over what the runtime reported and get back the
//! matrices to upload.

#![forbid(unsafe_code)]

pub mod config;
pub mod frame;
pub mod input;

#[cfg(feature = "openxr")]
pub mod xr;

pub use config::{FovMapping, ReferenceSpace, SceneConfig};
pub use frame::{
    plan_frame, DrawCall, DrawKind, EyeMatrices, EyePlan, EyeView, FrameInput, FramePlan, Hand,
    HandInput,
};
pub use input::{ActionReading, ControllerSnapshot, RawControllerState};
