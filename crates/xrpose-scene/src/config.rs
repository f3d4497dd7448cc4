//! Scene configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use xrpose_common::{Error, Result};
use xrpose_math::{DepthRange, Fov};

/// Space the runtime reports eye poses in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSpace {
    /// Eye poses are already in world (floor-origin) space.
    #[default]
    Stage,
    /// Eye poses are relative to the head; they are composed with the head pose.
    View,
}

/// How a runtime field of view is handed to the projection builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FovMapping {
    /// `angle_up` is the top edge, `angle_down` the bottom edge.
    #[default]
    Canonical,
    /// Up and down exchanged. Renders the image upside down.
    SwapVertical,
}

impl FovMapping {
    pub fn apply(self, fov: Fov) -> Fov {
        match self {
            FovMapping::Canonical => fov,
            FovMapping::SwapVertical => Fov {
                angle_up: fov.angle_down,
                angle_down: fov.angle_up,
                ..fov
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Near clip plane in meters.
    pub near: f32,
    /// Far clip plane in meters.
    pub far: f32,
    pub depth_range: DepthRange,
    pub reference_space: ReferenceSpace,
    pub fov_mapping: FovMapping,
    /// Edge length of the hand cubes in meters.
    pub cube_size: f32,
    /// Extra cube scale at full trigger, as a fraction of `cube_size`.
    pub trigger_growth: f32,
    /// Height of the ground grid in the reference space.
    pub floor_height: f32,
    /// Half-size of the square ground grid in meters.
    pub grid_extent: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            near: 0.05,
            far: 100.0,
            depth_range: DepthRange::NegativeOneToOne,
            reference_space: ReferenceSpace::Stage,
            fov_mapping: FovMapping::Canonical,
            cube_size: 0.1,
            trigger_growth: 0.5,
            floor_height: 0.0,
            grid_extent: 20.0,
        }
    }
}

impl SceneConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: SceneConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), ?config, "loaded scene config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.near,
            self.far,
            self.cube_size,
            self.trigger_growth,
            self.floor_height,
            self.grid_extent,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(Error::config("scene values must be finite"));
        }
        if self.near <= 0.0 {
            return Err(Error::config("near plane must be positive"));
        }
        if self.near >= self.far {
            return Err(Error::config(format!(
                "near plane ({}) must be closer than far plane ({})",
                self.near, self.far
            )));
        }
        if self.cube_size <= 0.0 || self.grid_extent <= 0.0 {
            return Err(Error::config("cube_size and grid_extent must be positive"));
        }
        if self.trigger_growth < 0.0 {
            return Err(Error::config("trigger_growth must not be negative"));
        }
        Ok(())
    }
}
