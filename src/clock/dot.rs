use std::f32::consts::TAU;

use glam::{Mat4, Vec3, Vec4};

use crate::mesh::{ColorVertex, MeshError, PolygonMesh, PrimitiveType};

use super::segment::GREEN;

pub const SLICES: usize = 50;
pub const RADIUS: f32 = 25.0;

/// Heights of the lower and upper dot of a colon.
pub const DOT_HEIGHTS: [f32; 2] = [-120.0, 120.0];

/// Unit disc as a fan: the centre, `SLICES` rim points, then the first rim
/// point again to close it.
pub fn dot_mesh() -> Result<PolygonMesh<ColorVertex>, MeshError> {
    let mut positions = Vec::with_capacity(SLICES + 2);
    positions.push(Vec4::new(0.0, 0.0, 0.0, 1.0));
    for i in 0..SLICES {
        let theta = i as f32 * TAU / SLICES as f32;
        positions.push(Vec4::new(theta.cos(), theta.sin(), 0.0, 1.0));
    }
    positions.push(Vec4::new(1.0, 0.0, 0.0, 1.0));

    let indices = (0..positions.len() as u32).collect();
    let vertices = positions
        .into_iter()
        .map(|p| ColorVertex::new(p, GREEN))
        .collect();

    PolygonMesh::from_parts(vertices, indices, PrimitiveType::TriangleFan, 3)
}

/// Both dots of the colon at `offset`: scale to radius, then translate.
pub fn colon_transforms(offset: f32) -> [Mat4; 2] {
    DOT_HEIGHTS.map(|y| {
        Mat4::from_translation(Vec3::new(offset, y, 0.0)) * Mat4::from_scale(Vec3::splat(RADIUS))
    })
}
