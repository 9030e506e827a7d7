use glam::{Mat4, Vec3, Vec4};

use crate::mesh::{ColorVertex, MeshError, PolygonMesh, PrimitiveType};

use super::encoder::{SevenSegment, SEGMENT_COUNT};

pub const GREEN: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);

/// Where each segment a to g sits relative to the digit centre.
pub const SEGMENT_TRANSLATIONS: [(f32, f32); SEGMENT_COUNT] = [
    (0.0, 245.0),
    (125.0, 120.0),
    (125.0, -120.0),
    (0.0, -245.0),
    (-125.0, -120.0),
    (-125.0, 120.0),
    (0.0, 0.0),
];

/// Degrees about z; horizontal segments are the vertical bar turned.
pub const SEGMENT_ROTATIONS: [f32; SEGMENT_COUNT] = [90.0, 0.0, 0.0, 90.0, 0.0, 0.0, 90.0];

/// A vertical bar with pointed ends, 30 wide and 230 tall, centred on the
/// origin.
pub fn segment_mesh() -> Result<PolygonMesh<ColorVertex>, MeshError> {
    let corners = [
        (-15.0, -100.0),
        (0.0, -115.0),
        (15.0, -100.0),
        (15.0, 100.0),
        (0.0, 115.0),
        (-15.0, 100.0),
    ];
    let vertices = corners
        .iter()
        .map(|&(x, y)| ColorVertex::new(Vec4::new(x, y, 0.0, 1.0), GREEN))
        .collect();
    let indices = vec![0, 1, 2, 0, 2, 3, 0, 3, 5, 3, 4, 5];

    PolygonMesh::from_parts(vertices, indices, PrimitiveType::Triangles, 3)
}

/// Rotate in place, then move to the segment's slot in the digit at `offset`.
pub fn segment_transform(segment: usize, offset: f32) -> Mat4 {
    let (x, y) = SEGMENT_TRANSLATIONS[segment];
    Mat4::from_translation(Vec3::new(x + offset, y, 0.0))
        * Mat4::from_rotation_z(SEGMENT_ROTATIONS[segment].to_radians())
}

pub fn digit_transforms(code: SevenSegment, offset: f32) -> Vec<Mat4> {
    code.lit().map(|segment| segment_transform(segment, offset)).collect()
}
