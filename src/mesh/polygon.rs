use glam::{Vec3, Vec4};

use super::vertex::{homogeneous, NORMAL, POSITION};
use super::{MeshError, VertexData};

/// How the index list of a mesh is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveType {
    /// List topologies consume `primitive_size` fresh indices per primitive.
    pub fn is_list(self) -> bool {
        matches!(self, Self::Points | Self::Lines | Self::Triangles)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub min: Vec4,
    pub max: Vec4,
}

impl BoundingBox {
    pub fn center(&self) -> Vec3 {
        (self.min.truncate() + self.max.truncate()) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max.truncate() - self.min.truncate()
    }
}

/// An indexed polygon mesh over any vertex representation.
///
/// Vertices and indices are only replaced wholesale through the setters,
/// which validate the index list against the vertex count and keep the
/// bounding box in sync with the positions.
#[derive(Debug, Clone)]
pub struct PolygonMesh<V> {
    vertices: Vec<V>,
    primitives: Vec<u32>,
    primitive_type: PrimitiveType,
    primitive_size: usize,
    bounds: BoundingBox,
}

impl<V: VertexData> Default for PolygonMesh<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: VertexData> PolygonMesh<V> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            primitives: Vec::new(),
            primitive_type: PrimitiveType::Triangles,
            primitive_size: 3,
            bounds: BoundingBox::default(),
        }
    }

    pub fn from_parts(
        vertices: Vec<V>,
        primitives: Vec<u32>,
        primitive_type: PrimitiveType,
        primitive_size: usize,
    ) -> Result<Self, MeshError> {
        let mut mesh = Self::new();
        mesh.set_vertex_data(vertices)?;
        mesh.set_primitives(primitives, primitive_type, primitive_size)?;
        Ok(mesh)
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        self.primitive_type
    }

    pub fn primitive_size(&self) -> usize {
        self.primitive_size
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn primitive_count(&self) -> usize {
        let n = self.primitives.len();
        match self.primitive_type {
            PrimitiveType::TriangleFan | PrimitiveType::TriangleStrip => n.saturating_sub(2),
            PrimitiveType::LineStrip => n.saturating_sub(1),
            _ => n / self.primitive_size.max(1),
        }
    }

    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    pub fn primitives(&self) -> &[u32] {
        &self.primitives
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounds
    }

    pub fn min_bounds(&self) -> Vec4 {
        self.bounds.min
    }

    pub fn max_bounds(&self) -> Vec4 {
        self.bounds.max
    }

    /// Replaces all vertices and recomputes the bounding box. Fails, leaving
    /// the mesh untouched, if the current indices would point past the new
    /// vertex list.
    pub fn set_vertex_data(&mut self, vertices: Vec<V>) -> Result<(), MeshError> {
        check_indices(&self.primitives, vertices.len())?;
        self.vertices = vertices;
        self.compute_bounding_box();
        Ok(())
    }

    pub fn set_primitives(
        &mut self,
        primitives: Vec<u32>,
        primitive_type: PrimitiveType,
        primitive_size: usize,
    ) -> Result<(), MeshError> {
        if primitive_size == 0 {
            return Err(MeshError::ZeroPrimitiveSize);
        }
        if primitive_type.is_list() && primitives.len() % primitive_size != 0 {
            return Err(MeshError::PartialPrimitive {
                len: primitives.len(),
                size: primitive_size,
            });
        }
        check_indices(&primitives, self.vertices.len())?;

        self.primitives = primitives;
        self.primitive_type = primitive_type;
        self.primitive_size = primitive_size;
        Ok(())
    }

    /// The index list split into individual polygons. Strips and fans are
    /// split into the triangles they describe.
    pub fn polygons(&self) -> Vec<Vec<u32>> {
        let idx = &self.primitives;
        match self.primitive_type {
            PrimitiveType::TriangleFan => (2..idx.len())
                .map(|i| vec![idx[0], idx[i - 1], idx[i]])
                .collect(),
            PrimitiveType::TriangleStrip => (2..idx.len())
                .map(|i| {
                    if i % 2 == 0 {
                        vec![idx[i - 2], idx[i - 1], idx[i]]
                    } else {
                        vec![idx[i - 1], idx[i - 2], idx[i]]
                    }
                })
                .collect(),
            PrimitiveType::LineStrip => idx.windows(2).map(|w| w.to_vec()).collect(),
            _ => idx
                .chunks_exact(self.primitive_size.max(1))
                .map(|c| c.to_vec())
                .collect(),
        }
    }

    /// Recomputes the bounding box from the "position" attribute. Leaves the
    /// box alone when there are no vertices or they carry no position.
    pub fn compute_bounding_box(&mut self) {
        match self.vertices.first() {
            Some(first) if first.has_data(POSITION) => {}
            _ => return,
        }

        let positions: Vec<Vec4> = self
            .vertices
            .iter()
            .filter_map(|v| v.get_data(POSITION).ok())
            .map(|data| homogeneous(&data))
            .collect();
        let Some(first) = positions.first().copied() else {
            return;
        };

        let (min, max) = positions.iter().fold(
            (first.truncate(), first.truncate()),
            |(min, max), p| (min.min(p.truncate()), max.max(p.truncate())),
        );

        self.bounds = BoundingBox {
            min: min.extend(first.w),
            max: max.extend(first.w),
        };
    }

    /// Recomputes per-vertex normals in place with Newell's method.
    ///
    /// Every polygon's unit face normal is added to each of its vertices and
    /// the sums are normalized at the end, so faces are weighted by count and
    /// not by area. Degenerate polygons contribute nothing and a vertex with
    /// no usable contribution ends up with a zero normal.
    ///
    /// Does nothing unless the vertices have both a position and a normal.
    pub fn compute_normals(&mut self) -> Result<(), MeshError> {
        match self.vertices.first() {
            Some(first) if first.has_data(POSITION) && first.has_data(NORMAL) => {}
            _ => return Ok(()),
        }

        let positions = self
            .vertices
            .iter()
            .map(|v| v.get_data(POSITION).map(|data| homogeneous(&data).truncate()))
            .collect::<Result<Vec<Vec3>, _>>()?;

        let mut normals = vec![Vec3::ZERO; positions.len()];
        for polygon in self.polygons() {
            let points: Vec<Vec3> = polygon.iter().map(|&i| positions[i as usize]).collect();
            let face = newell_normal(&points);
            for &i in &polygon {
                normals[i as usize] += face;
            }
        }

        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            let n = normal.normalize_or_zero();
            vertex.set_data(NORMAL, &[n.x, n.y, n.z, 0.0])?;
        }
        Ok(())
    }
}

/// Unit normal of a polygon by Newell's method, or zero for a polygon
/// without area.
pub fn newell_normal(points: &[Vec3]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for (k, p) in points.iter().enumerate() {
        let q = points[(k + 1) % points.len()];
        n.x += (p.y - q.y) * (p.z + q.z);
        n.y += (p.z - q.z) * (p.x + q.x);
        n.z += (p.x - q.x) * (p.y + q.y);
    }
    n.normalize_or_zero()
}

fn check_indices(indices: &[u32], vertex_count: usize) -> Result<(), MeshError> {
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(MeshError::IndexOutOfRange {
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}
