//! xrpose CLI: inspect pose, projection and per-frame matrices.
//!
//! Results are printed to stdout as JSON; logs go to stderr.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use xrpose_math::{quat_length, DepthRange, Fov, Mat4, Pose, RigidTransform};
use xrpose_scene::{plan_frame, FrameInput, SceneConfig};

/// Quaternions further than this from unit length get a warning.
const UNIT_QUAT_TOLERANCE: f32 = 1e-3;

#[derive(Parser, Debug)]
#[command(name = "xrpose")]
#[command(about = "Pose, projection and frame matrix tools")]
struct Args {
    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the transform for a pose
    Pose {
        /// Position as x,y,z
        #[arg(
            short,
            long,
            value_delimiter = ',',
            allow_hyphen_values = true,
            default_values_t = [0.0f32, 0.0, 0.0]
        )]
        position: Vec<f32>,

        /// Orientation quaternion as x,y,z,w
        #[arg(
            short,
            long,
            value_delimiter = ',',
            allow_hyphen_values = true,
            default_values_t = [0.0f32, 0.0, 0.0, 1.0]
        )]
        orientation: Vec<f32>,

        /// Normalize the quaternion before building the matrix
        #[arg(long)]
        normalize: bool,

        /// Also print the inverse (the view matrix for this pose)
        #[arg(long)]
        rigid_inverse: bool,
    },

    /// Build an off-axis projection from four half-angles in radians
    Project {
        #[arg(long, allow_hyphen_values = true)]
        left: f32,
        #[arg(long, allow_hyphen_values = true)]
        right: f32,
        #[arg(long, allow_hyphen_values = true)]
        up: f32,
        #[arg(long, allow_hyphen_values = true)]
        down: f32,
        #[arg(long, default_value_t = 0.05)]
        near: f32,
        #[arg(long, default_value_t = 100.0)]
        far: f32,
        /// Clip-space depth convention
        #[arg(long, value_enum, default_value_t = DepthArg::Gl)]
        depth: DepthArg,
    },

    /// Invert a column-major 4x4 matrix
    Invert {
        /// Sixteen comma-separated values, column-major
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        matrix: Vec<f32>,
    },

    /// Plan every matrix for one frame described in a JSON file
    Frame {
        /// Frame description (head, views, hands)
        #[arg(short, long)]
        input: PathBuf,

        /// Scene configuration file
        #[arg(short, long, env = "XRPOSE_SCENE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DepthArg {
    /// [-1, 1] (OpenGL / GLES)
    Gl,
    /// [0, 1] (Vulkan / D3D)
    ZeroToOne,
}

impl From<DepthArg> for DepthRange {
    fn from(arg: DepthArg) -> Self {
        match arg {
            DepthArg::Gl => DepthRange::NegativeOneToOne,
            DepthArg::ZeroToOne => DepthRange::ZeroToOne,
        }
    }
}

#[derive(Serialize)]
struct PoseOutput {
    pose: Pose,
    matrix: Mat4,
    #[serde(skip_serializing_if = "Option::is_none")]
    inverse: Option<Mat4>,
}

#[derive(Serialize)]
struct InvertOutput {
    determinant: f32,
    inverse: Mat4,
}

fn main() -> Result<()> {
    let args = Args::parse();
    xrpose_common::init_tracing_with_default(&args.log_level);

    match args.command {
        Command::Pose {
            position,
            orientation,
            normalize,
            rigid_inverse,
        } => {
            let mut pose = Pose::new(
                to_array(&position, "position")?,
                to_array(&orientation, "orientation")?,
            );
            if normalize {
                pose = pose.normalized();
            }
            let len = quat_length(pose.orientation);
            let unit = (len - 1.0).abs() <= UNIT_QUAT_TOLERANCE;
            if !unit {
                warn!(
                    length = len,
                    "orientation is not unit length, matrix will not be rigid"
                );
            }

            let matrix = Mat4::from_pose(&pose);
            // The rigid shortcut is only valid for a unit quaternion.
            let inverse = rigid_inverse.then(|| {
                if unit {
                    RigidTransform::from_pose(&pose).invert().into_matrix()
                } else {
                    matrix.inverse()
                }
            });
            print_json(&PoseOutput {
                pose,
                matrix,
                inverse,
            })?;
        }
        Command::Project {
            left,
            right,
            up,
            down,
            near,
            far,
            depth,
        } => {
            let fov = Fov::new(left, right, up, down);
            let proj = xrpose_math::proj_from_fov(&fov, near, far, depth.into())?;
            print_json(&proj)?;
        }
        Command::Invert { matrix } => {
            let m = Mat4(to_array(&matrix, "matrix")?);
            let Some(inverse) = m.try_inverse() else {
                bail!("matrix is singular (determinant {})", m.determinant());
            };
            print_json(&InvertOutput {
                determinant: m.determinant(),
                inverse,
            })?;
        }
        Command::Frame { input, config } => {
            let config = match config {
                Some(path) => SceneConfig::load(&path)?,
                None => SceneConfig::default(),
            };
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let frame: FrameInput = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", input.display()))?;
            let plan = plan_frame(&frame, &config)?;
            info!(eyes = plan.eyes.len(), "frame planned");
            print_json(&plan)?;
        }
        Command::Version => {
            println!("xrpose {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn to_array<const N: usize>(values: &[f32], name: &str) -> Result<[f32; N]> {
    values
        .try_into()
        .map_err(|_| anyhow::anyhow!("{name} needs {N} values, got {}", values.len()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_array_checks_length() {
        let ok: [f32; 3] = to_array(&[1.0, 2.0, 3.0], "position").unwrap();
        assert_eq!(ok, [1.0, 2.0, 3.0]);
        let err = to_array::<4>(&[1.0, 2.0, 3.0], "orientation").unwrap_err();
        assert_eq!(err.to_string(), "orientation needs 4 values, got 3");
    }

    #[test]
    fn test_parses_negative_lists() {
        let args = Args::try_parse_from([
            "xrpose",
            "pose",
            "--position",
            "-1,2,-3",
            "--orientation",
            "0,0,0,1",
        ])
        .unwrap();
        match args.command {
            Command::Pose { position, .. } => assert_eq!(position, vec![-1.0, 2.0, -3.0]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parses_project_with_depth() {
        let args = Args::try_parse_from([
            "xrpose", "project", "--left", "-0.8", "--right", "0.8", "--up", "0.7", "--down",
            "-0.7", "--depth", "zero-to-one",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::Project {
                depth: DepthArg::ZeroToOne,
                ..
            }
        ));
    }

    #[test]
    fn test_command_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
