use std::rc::Rc;

use glam::Mat4;

use crate::gpu::{ObjectInstance, ShaderAttributeMap, ShaderProgram, TransformBuffer, TransformUniform};
use crate::mesh::ColorVertex;

use super::dot::{colon_transforms, dot_mesh};
use super::encoder::{SevenSegment, SEGMENT_COUNT};
use super::segment::{digit_transforms, segment_mesh};
use super::{ClockConfig, ClockError};

const SHADER_SOURCE: &str = include_str!("../shaders/clock.wgsl");

const ORTHO_VERTICAL: f32 = 900.0;
const ORTHO_HORIZONTAL: f32 = 1500.0;

const FIRST_DIGIT_OFFSET: f32 = 975.0;
const DIGIT_STEP: f32 = 410.0;
const GROUP_GAP: f32 = 50.0;
const FIRST_COLON_OFFSET: f32 = -525.0;
const COLON_STEP: f32 = 850.0;

/// Every segment of six digits lit, plus two dots for each colon.
pub const MAX_DRAWS: usize = 6 * SEGMENT_COUNT + 2 * 2;

/// Horizontal centre of each digit, rightmost (seconds units) first.
pub fn digit_offsets() -> [f32; 6] {
    let mut offsets = [0.0; 6];
    let mut offset = FIRST_DIGIT_OFFSET;
    for (i, slot) in offsets.iter_mut().enumerate() {
        *slot = offset;
        offset -= DIGIT_STEP;
        if i % 2 == 1 {
            offset -= GROUP_GAP;
        }
    }
    offsets
}

pub fn colon_offsets() -> [f32; 2] {
    [FIRST_COLON_OFFSET, FIRST_COLON_OFFSET + COLON_STEP]
}

/// Orthographic projection that keeps the clock's proportions when the
/// window no longer matches `reference` (the size it was opened at).
pub fn projection(width: u32, height: u32, reference: (u32, u32)) -> Mat4 {
    let ratio = width.max(1) as f32 / height.max(1) as f32;
    let reference_ratio = reference.0.max(1) as f32 / reference.1.max(1) as f32;

    if ratio > reference_ratio {
        let half_width = ORTHO_VERTICAL * ratio;
        Mat4::orthographic_rh(-half_width, half_width, -ORTHO_VERTICAL, ORTHO_VERTICAL, -1.0, 1.0)
    } else {
        let half_height = ORTHO_HORIZONTAL / ratio;
        Mat4::orthographic_rh(-ORTHO_HORIZONTAL, ORTHO_HORIZONTAL, -half_height, half_height, -1.0, 1.0)
    }
}

/// Time of day as the number HHMMSS, e.g. 93005 for 09:30:05.
pub fn hhmmss(unix_seconds: i64, utc_offset_minutes: i32) -> u32 {
    let local = unix_seconds + i64::from(utc_offset_minutes) * 60;
    let seconds = local.rem_euclid(86_400) as u32;
    (seconds / 3600) * 10_000 + (seconds / 60 % 60) * 100 + seconds % 60
}

/// The system's current offset from UTC, in minutes.
pub fn local_utc_offset_minutes() -> i32 {
    chrono::Local::now().offset().local_minus_utc() / 60
}

/// Current time of day in the system time zone, or at `utc_offset_minutes`
/// from UTC when given.
pub fn now_hhmmss(utc_offset_minutes: Option<i32>) -> u32 {
    let now = chrono::Local::now();
    let offset = utc_offset_minutes.unwrap_or_else(|| now.offset().local_minus_utc() / 60);
    hhmmss(now.timestamp(), offset)
}

/// Model-view matrices for every lit segment of the six digits of `time`.
pub fn segment_transforms(time: u32) -> Result<Vec<Mat4>, ClockError> {
    let mut remaining = time;
    let mut transforms = Vec::new();
    for offset in digit_offsets() {
        let code = SevenSegment::encode(remaining % 10)?;
        transforms.extend(digit_transforms(code, offset));
        remaining /= 10;
    }
    Ok(transforms)
}

pub fn dot_transforms() -> Vec<Mat4> {
    colon_offsets().into_iter().flat_map(colon_transforms).collect()
}

pub fn clock_attributes() -> ShaderAttributeMap {
    ShaderAttributeMap::new()
        .bind("vPosition", "position")
        .bind("vColor", "color")
}

/// The clock scene: one segment and one dot object, drawn many times with
/// different model-view matrices.
pub struct ClockView {
    segment: ObjectInstance<ColorVertex>,
    dot: ObjectInstance<ColorVertex>,
    transforms: TransformBuffer,
    projection: Mat4,
    reference_size: (u32, u32),
    utc_offset_minutes: Option<i32>,
}

impl ClockView {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        config: &ClockConfig,
    ) -> Result<Self, ClockError> {
        let program = ShaderProgram::new(device, SHADER_SOURCE, "clock", format)?;
        let attributes = clock_attributes();

        let segment = ObjectInstance::new(device, &program, &attributes, Rc::new(segment_mesh()?), "segment")?;
        let dot = ObjectInstance::new(device, &program, &attributes, Rc::new(dot_mesh()?), "dot")?;
        let transforms = TransformBuffer::new(device, &program, MAX_DRAWS);

        let reference_size = (config.width, config.height);
        log::info!("Clock view ready at {}x{}", config.width, config.height);

        Ok(Self {
            segment,
            dot,
            transforms,
            projection: projection(config.width, config.height, reference_size),
            reference_size,
            utc_offset_minutes: config.utc_offset_minutes,
        })
    }

    pub fn reshape(&mut self, width: u32, height: u32) {
        self.projection = projection(width, height, self.reference_size);
        log::debug!("Viewport {}x{}", width, height);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn draw(&self, queue: &wgpu::Queue, render_pass: &mut wgpu::RenderPass<'_>) {
        if let Err(e) = self.draw_time(queue, render_pass, now_hhmmss(self.utc_offset_minutes)) {
            log::error!("Failed to draw clock: {}", e);
        }
    }

    /// Writes this frame's transforms into the shared uniform buffer and
    /// records one draw per lit segment and per dot.
    pub fn draw_time(
        &self,
        queue: &wgpu::Queue,
        render_pass: &mut wgpu::RenderPass<'_>,
        time: u32,
    ) -> Result<(), ClockError> {
        let segments = segment_transforms(time)?;
        let dots = dot_transforms();

        let draws: Vec<_> = segments
            .iter()
            .map(|m| (&self.segment, *m))
            .chain(dots.iter().map(|m| (&self.dot, *m)))
            .collect();
        let uniforms: Vec<_> = draws
            .iter()
            .map(|(_, modelview)| TransformUniform::new(self.projection, *modelview))
            .collect();
        self.transforms.write(queue, &uniforms)?;

        for (i, (object, _)) in draws.iter().enumerate() {
            object.draw(render_pass, self.transforms.bind_group(), self.transforms.offset(i));
        }
        Ok(())
    }
}
