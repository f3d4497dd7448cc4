//! Conversions from OpenXR runtime types.

use openxr as xr;
use xrpose_math::{Fov, Pose};

use crate::frame::EyeView;
use crate::input::ActionReading;

pub fn to_pose(pose: xr::Posef) -> Pose {
    Pose {
        position: [pose.position.x, pose.position.y, pose.position.z],
        orientation: [
            pose.orientation.x,
            pose.orientation.y,
            pose.orientation.z,
            pose.orientation.w,
        ],
    }
}

pub fn to_fov(fov: xr::Fovf) -> Fov {
    Fov {
        angle_left: fov.angle_left,
        angle_right: fov.angle_right,
        angle_up: fov.angle_up,
        angle_down: fov.angle_down,
    }
}

pub fn to_eye_view(view: &xr::View) -> EyeView {
    EyeView {
        pose: to_pose(view.pose),
        fov: to_fov(view.fov),
    }
}

/// Pose of a located space, if the runtime reports both parts as valid.
pub fn located_pose(location: &xr::SpaceLocation) -> Option<Pose> {
    let valid = xr::SpaceLocationFlags::POSITION_VALID | xr::SpaceLocationFlags::ORIENTATION_VALID;
    if location.location_flags.contains(valid) {
        Some(to_pose(location.pose))
    } else {
        None
    }
}

pub fn reading_f32(state: xr::ActionState<f32>) -> ActionReading<f32> {
    ActionReading {
        is_active: state.is_active,
        current_state: state.current_state,
    }
}

pub fn reading_bool(state: xr::ActionState<bool>) -> ActionReading<bool> {
    ActionReading {
        is_active: state.is_active,
        current_state: state.current_state,
    }
}

pub fn reading_vec2(state: xr::ActionState<xr::Vector2f>) -> ActionReading<[f32; 2]> {
    ActionReading {
        is_active: state.is_active,
        current_state: [state.current_state.x, state.current_state.y],
    }
}
