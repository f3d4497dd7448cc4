//! Per-frame matrices for the eyes, the hand cubes and the ground grid.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xrpose_common::{Error, Result};
use xrpose_math::{proj_from_fov, Fov, Mat4, Pose, RigidTransform};

use crate::config::{ReferenceSpace, SceneConfig};
use crate::input::{ControllerSnapshot, RawControllerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn index(self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }
}

/// One view as reported by the runtime for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeView {
    pub pose: Pose,
    pub fov: Fov,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandInput {
    pub pose: Pose,
    /// Analog trigger in `[0, 1]`. Ignored when `controller` is present.
    #[serde(default)]
    pub trigger: f32,
    /// Action readings synced for this hand this frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<RawControllerState>,
}

impl HandInput {
    pub fn new(pose: Pose, trigger: f32) -> Self {
        Self {
            pose,
            trigger,
            controller: None,
        }
    }

    pub fn from_snapshot(pose: Pose, snapshot: &ControllerSnapshot) -> Self {
        Self::new(pose, snapshot.trigger())
    }

    pub fn from_raw(pose: Pose, raw: RawControllerState) -> Self {
        Self {
            pose,
            trigger: ControllerSnapshot::from_raw(&raw).trigger(),
            controller: Some(raw),
        }
    }

    /// Trigger value driving the cube, reduced from the controller readings when present.
    pub fn trigger_value(&self) -> f32 {
        match &self.controller {
            Some(raw) => ControllerSnapshot::from_raw(raw).trigger(),
            None => self.trigger,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    #[serde(default)]
    pub head: Pose,
    pub views: Vec<EyeView>,
    /// Indexed by [`Hand::index`]; `None` when the controller is not tracked.
    #[serde(default)]
    pub hands: [Option<HandInput>; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EyeMatrices {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    /// `None` if the view-projection could not be inverted.
    pub inverse_view_projection: Option<Mat4>,
    /// Eye position in the reference space, fed to the grid's fog.
    pub camera_position: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawKind {
    Grid,
    Cube { hand: Hand },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawCall {
    #[serde(flatten)]
    pub kind: DrawKind,
    pub model: Mat4,
    pub mvp: Mat4,
}

impl DrawCall {
    fn new(kind: DrawKind, model: Mat4, view_projection: &Mat4) -> Self {
        Self {
            kind,
            model,
            mvp: Mat4::multiply(view_projection, &model),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EyePlan {
    pub index: usize,
    pub matrices: EyeMatrices,
    pub draws: Vec<DrawCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FramePlan {
    pub head: Mat4,
    pub eyes: Vec<EyePlan>,
}

/// Builds every matrix the renderer uploads for one frame.
///
/// Draw order per eye is the grid first, then one cube per tracked hand.
pub fn plan_frame(input: &FrameInput, config: &SceneConfig) -> Result<FramePlan> {
    if input.views.is_empty() {
        return Err(Error::config("frame has no views"));
    }

    let head = RigidTransform::from_pose(&input.head);
    let grid = grid_model(config);

    let mut cubes = Vec::with_capacity(2);
    for hand in Hand::ALL {
        match &input.hands[hand.index()] {
            Some(state) => cubes.push((hand, cube_model(state, config))),
            None => debug!(?hand, "hand not tracked, skipping cube"),
        }
    }

    let mut eyes = Vec::with_capacity(input.views.len());
    for (index, view) in input.views.iter().enumerate() {
        let matrices = eye_matrices(view, &head, config)?;
        if matrices.inverse_view_projection.is_none() {
            warn!(eye = index, "view-projection is singular, no fog position");
        }

        let mut draws = Vec::with_capacity(1 + cubes.len());
        draws.push(DrawCall::new(DrawKind::Grid, grid, &matrices.view_projection));
        for (hand, model) in &cubes {
            draws.push(DrawCall::new(
                DrawKind::Cube { hand: *hand },
                *model,
                &matrices.view_projection,
            ));
        }

        eyes.push(EyePlan {
            index,
            matrices,
            draws,
        });
    }

    debug!(eyes = eyes.len(), cubes = cubes.len(), "planned frame");

    Ok(FramePlan {
        head: head.into_matrix(),
        eyes,
    })
}

/// View, projection and derived matrices for a single eye.
pub fn eye_matrices(
    view: &EyeView,
    head: &RigidTransform,
    config: &SceneConfig,
) -> Result<EyeMatrices> {
    let eye = RigidTransform::from_pose(&view.pose);
    let eye_world = match config.reference_space {
        ReferenceSpace::Stage => eye,
        ReferenceSpace::View => *head * eye,
    };

    let fov = config.fov_mapping.apply(view.fov);
    let projection = proj_from_fov(&fov, config.near, config.far, config.depth_range)?;
    let view_matrix = eye_world.invert().into_matrix();
    let view_projection = projection * view_matrix;

    Ok(EyeMatrices {
        view: view_matrix,
        projection,
        view_projection,
        inverse_view_projection: view_projection.try_inverse(),
        camera_position: eye_world.translation(),
    })
}

/// Cube at the controller pose, grown by the trigger.
pub fn cube_model(hand: &HandInput, config: &SceneConfig) -> Mat4 {
    let trigger = hand.trigger_value().clamp(0.0, 1.0);
    let size = config.cube_size * (1.0 + config.trigger_growth * trigger);
    Mat4::from_pose(&hand.pose) * Mat4::scale([size, size, size])
}

pub fn grid_model(config: &SceneConfig) -> Mat4 {
    Mat4::translation([0.0, config.floor_height, 0.0])
        * Mat4::scale([config.grid_extent, 1.0, config.grid_extent])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FovMapping;
    use crate::input::ActionReading;

    const EPS: f32 = 1e-5;

    fn stereo_views(ipd: f32, height: f32) -> Vec<EyeView> {
        let fov = Fov::new(-0.9, 0.75, 0.8, -0.85);
        let mirrored = Fov::new(-0.75, 0.9, 0.8, -0.85);
        vec![
            EyeView {
                pose: Pose::from_position([-ipd / 2.0, height, 0.0]),
                fov,
            },
            EyeView {
                pose: Pose::from_position([ipd / 2.0, height, 0.0]),
                fov: mirrored,
            },
        ]
    }

    fn sample_input() -> FrameInput {
        FrameInput {
            head: Pose::from_position([0.0, 1.6, 0.0]),
            views: stereo_views(0.064, 1.6),
            hands: [
                Some(HandInput::new(Pose::from_position([-0.2, 1.2, -0.3]), 0.0)),
                None,
            ],
        }
    }

    #[test]
    fn test_grid_first_then_tracked_cubes() {
        let plan = plan_frame(&sample_input(), &SceneConfig::default()).unwrap();
        assert_eq!(plan.eyes.len(), 2);
        for eye in &plan.eyes {
            assert_eq!(eye.draws.len(), 2);
            assert_eq!(eye.draws[0].kind, DrawKind::Grid);
            assert_eq!(eye.draws[1].kind, DrawKind::Cube { hand: Hand::Left });
        }
    }

    #[test]
    fn test_camera_position_and_view() {
        let plan = plan_frame(&sample_input(), &SceneConfig::default()).unwrap();
        let left = &plan.eyes[0].matrices;
        assert_eq!(left.camera_position, [-0.032, 1.6, 0.0]);
        // The eye sits at the view-space origin.
        let origin = left.view.transform_point(left.camera_position);
        assert!(origin.iter().all(|v| v.abs() < EPS));
    }

    #[test]
    fn test_mvp_is_view_projection_times_model() {
        let plan = plan_frame(&sample_input(), &SceneConfig::default()).unwrap();
        let eye = &plan.eyes[1];
        for draw in &eye.draws {
            let expected = eye.matrices.view_projection * draw.model;
            assert!(draw.mvp.abs_diff_eq(&expected, EPS));
        }
    }

    #[test]
    fn test_inverse_view_projection_recovers_camera() {
        let plan = plan_frame(&sample_input(), &SceneConfig::default()).unwrap();
        let m = &plan.eyes[0].matrices;
        let inv = m.inverse_view_projection.expect("regular frustum");
        let h = inv.transform_vec4([0.0, 0.0, -1.0, 0.0]);
        let camera = [h[0] / h[3], h[1] / h[3], h[2] / h[3]];
        for (got, want) in camera.iter().zip(m.camera_position.iter()) {
            assert!((got - want).abs() < 1e-3);
        }
    }

    #[test]
    fn test_view_space_composes_head() {
        let config = SceneConfig {
            reference_space: ReferenceSpace::View,
            ..SceneConfig::default()
        };
        let mut input = sample_input();
        input.views = stereo_views(0.064, 0.0);
        let plan = plan_frame(&input, &config).unwrap();
        let camera = plan.eyes[1].matrices.camera_position;
        assert!((camera[0] - 0.032).abs() < EPS);
        assert!((camera[1] - 1.6).abs() < EPS);
        assert!(plan.head.abs_diff_eq(&Mat4::translation([0.0, 1.6, 0.0]), 0.0));
    }

    #[test]
    fn test_stage_space_ignores_head() {
        let mut input = sample_input();
        input.head = Pose::from_position([10.0, 10.0, 10.0]);
        let plan = plan_frame(&input, &SceneConfig::default()).unwrap();
        assert_eq!(plan.eyes[0].matrices.camera_position, [-0.032, 1.6, 0.0]);
    }

    #[test]
    fn test_swap_vertical_flips_projection() {
        let canonical = plan_frame(&sample_input(), &SceneConfig::default()).unwrap();
        let swapped = plan_frame(
            &sample_input(),
            &SceneConfig {
                fov_mapping: FovMapping::SwapVertical,
                ..SceneConfig::default()
            },
        )
        .unwrap();
        let a = canonical.eyes[0].matrices.projection.0[5];
        let b = swapped.eyes[0].matrices.projection.0[5];
        assert!(a > 0.0);
        assert!((a + b).abs() < EPS);
    }

    #[test]
    fn test_trigger_grows_cube() {
        let config = SceneConfig::default();
        let mut hand = HandInput::new(Pose::default(), 0.0);
        assert!((cube_model(&hand, &config).0[0] - 0.1).abs() < EPS);
        hand.trigger = 1.0;
        assert!((cube_model(&hand, &config).0[0] - 0.15).abs() < EPS);
        hand.trigger = 4.0;
        assert!((cube_model(&hand, &config).0[0] - 0.15).abs() < EPS);
    }

    #[test]
    fn test_grid_sits_on_floor() {
        let config = SceneConfig {
            floor_height: -1.5,
            ..SceneConfig::default()
        };
        let corner = grid_model(&config).transform_point([1.0, 0.0, 1.0]);
        assert_eq!(corner, [20.0, -1.5, 20.0]);
    }

    #[test]
    fn test_no_views_is_an_error() {
        let mut input = sample_input();
        input.views.clear();
        assert!(matches!(
            plan_frame(&input, &SceneConfig::default()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_invalid_depth_is_a_math_error() {
        let config = SceneConfig {
            near: 5.0,
            far: 1.0,
            ..SceneConfig::default()
        };
        assert!(matches!(
            plan_frame(&sample_input(), &config),
            Err(Error::Math(_))
        ));
    }

    fn cube_scale(plan: &FramePlan, hand: Hand) -> f32 {
        let draw = plan.eyes[0]
            .draws
            .iter()
            .find(|d| d.kind == DrawKind::Cube { hand })
            .expect("cube for tracked hand");
        draw.model.0[0]
    }

    #[test]
    fn test_clicked_trigger_grows_cube_through_plan() {
        let raw = RawControllerState {
            trigger: Some(ActionReading::active(0.1)),
            trigger_click: Some(ActionReading::active(true)),
            ..RawControllerState::default()
        };
        let mut input = sample_input();
        input.hands[Hand::Left.index()] = Some(HandInput::from_raw(Pose::default(), raw));

        let plan = plan_frame(&input, &SceneConfig::default()).unwrap();
        assert!((cube_scale(&plan, Hand::Left) - 0.15).abs() < EPS);
    }

    #[test]
    fn test_snapshot_trigger_reaches_cube() {
        let raw = RawControllerState {
            trigger: Some(ActionReading::active(0.5)),
            ..RawControllerState::default()
        };
        let snapshot = ControllerSnapshot::from_raw(&raw);
        let mut input = sample_input();
        input.hands[Hand::Right.index()] =
            Some(HandInput::from_snapshot(Pose::default(), &snapshot));

        let plan = plan_frame(&input, &SceneConfig::default()).unwrap();
        assert!((cube_scale(&plan, Hand::Right) - 0.125).abs() < EPS);
        assert!((cube_scale(&plan, Hand::Left) - 0.1).abs() < EPS);
    }

    #[test]
    fn test_controller_readings_override_trigger_field() {
        let hand = HandInput {
            pose: Pose::default(),
            trigger: 1.0,
            controller: Some(RawControllerState::default()),
        };
        // Inactive controller reads as released.
        assert_eq!(hand.trigger_value(), 0.0);
    }

    #[test]
    fn test_controller_readings_from_json() {
        let json = r#"{
            "views": [
                { "pose": { "position": [0, 1.6, 0], "orientation": [0, 0, 0, 1] },
                  "fov": { "angle_left": -0.8, "angle_right": 0.8, "angle_up": 0.8, "angle_down": -0.8 } }
            ],
            "hands": [{
                "pose": { "position": [0, 1.2, -0.3], "orientation": [0, 0, 0, 1] },
                "controller": { "trigger_click": { "is_active": true, "current_state": true } }
            }, null]
        }"#;
        let input: FrameInput = serde_json::from_str(json).unwrap();
        let plan = plan_frame(&input, &SceneConfig::default()).unwrap();
        assert!((cube_scale(&plan, Hand::Left) - 0.15).abs() < EPS);
    }

    #[test]
    fn test_frame_input_from_json() {
        let json = r#"{
            "views": [
                { "pose": { "position": [0, 1.6, 0], "orientation": [0, 0, 0, 1] },
                  "fov": { "angle_left": -0.8, "angle_right": 0.8, "angle_up": 0.8, "angle_down": -0.8 } }
            ],
            "hands": [null, { "pose": { "position": [0.2, 1.2, -0.3], "orientation": [0, 0, 0, 1] }, "trigger": 1.0 }]
        }"#;
        let input: FrameInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.head, Pose::default());
        let plan = plan_frame(&input, &SceneConfig::default()).unwrap();
        assert_eq!(plan.eyes[0].draws[1].kind, DrawKind::Cube { hand: Hand::Right });

        let out = serde_json::to_value(&plan).unwrap();
        assert_eq!(out["eyes"][0]["draws"][0]["kind"], "grid");
        assert_eq!(out["eyes"][0]["draws"][1]["hand"], "right");
    }
}
