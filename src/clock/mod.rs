mod dot;
mod encoder;
mod segment;
mod view;

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::gpu::GpuError;
use crate::mesh::{save_obj, MeshError};

pub use dot::{colon_transforms, dot_mesh, DOT_HEIGHTS, RADIUS, SLICES};
pub use encoder::{SevenSegment, SEGMENT_COUNT};
pub use segment::{
    digit_transforms, segment_mesh, segment_transform, GREEN, SEGMENT_ROTATIONS, SEGMENT_TRANSLATIONS,
};
pub use view::{
    clock_attributes, colon_offsets, digit_offsets, dot_transforms, hhmmss, local_utc_offset_minutes,
    now_hhmmss, projection, segment_transforms, ClockView, MAX_DRAWS,
};

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("{0} is not a decimal digit")]
    InvalidDigit(u32),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Gpu(#[from] GpuError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// Window size at startup; the clock keeps this aspect when resized.
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Fixed offset from UTC; `None` follows the system time zone.
    pub utc_offset_minutes: Option<i32>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            width: 750,
            height: 450,
            fps: 60,
            utc_offset_minutes: None,
        }
    }
}

impl ClockConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

/// Writes the segment and dot meshes as `segment.obj` and `dot.obj` under
/// `dir`, creating it if needed.
pub fn dump_meshes(dir: &Path) -> Result<Vec<PathBuf>, MeshError> {
    std::fs::create_dir_all(dir)?;

    let segment_path = dir.join("segment.obj");
    save_obj(&segment_mesh()?, &segment_path)?;
    let dot_path = dir.join("dot.obj");
    save_obj(&dot_mesh()?, &dot_path)?;

    Ok(vec![segment_path, dot_path])
}
