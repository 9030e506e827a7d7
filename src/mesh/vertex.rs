use glam::Vec4;

use super::MeshError;

pub const POSITION: &str = "position";
pub const NORMAL: &str = "normal";
pub const TEXCOORD: &str = "texcoord";
pub const COLOR: &str = "color";

/// Per-vertex attribute storage addressed by name.
///
/// `has_data` is a capability query: it reports whether this kind of vertex
/// carries the attribute at all, not whether a value was ever written.
/// Asking for or writing an attribute outside that set is an error.
pub trait VertexData {
    fn has_data(&self, name: &str) -> bool;

    fn get_data(&self, name: &str) -> Result<Vec<f32>, MeshError>;

    /// Overwrites the attribute. `data` may hold 1 to 4 values; missing
    /// trailing components take the attribute's default.
    fn set_data(&mut self, name: &str, data: &[f32]) -> Result<(), MeshError>;

    fn attribute_names(&self) -> &'static [&'static str];
}

/// Vertex with position, normal and texture coordinates. This is what the
/// OBJ importer produces by default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec4,
    pub normal: Vec4,
    pub tex_coords: Vec4,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec4::W,
            normal: Vec4::ZERO,
            tex_coords: Vec4::W,
        }
    }
}

impl VertexData for Vertex {
    fn has_data(&self, name: &str) -> bool {
        matches!(name, POSITION | NORMAL | TEXCOORD)
    }

    fn get_data(&self, name: &str) -> Result<Vec<f32>, MeshError> {
        match name {
            POSITION => Ok(self.position.to_array().to_vec()),
            NORMAL => Ok(self.normal.to_array().to_vec()),
            TEXCOORD => Ok(self.tex_coords.to_array().to_vec()),
            _ => Err(MeshError::UnknownAttribute(name.to_string())),
        }
    }

    fn set_data(&mut self, name: &str, data: &[f32]) -> Result<(), MeshError> {
        match name {
            POSITION => self.position = padded(name, data, Vec4::W)?,
            NORMAL => self.normal = padded(name, data, Vec4::ZERO)?,
            TEXCOORD => self.tex_coords = padded(name, data, Vec4::W)?,
            _ => return Err(MeshError::UnknownAttribute(name.to_string())),
        }
        Ok(())
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &[POSITION, NORMAL, TEXCOORD]
    }
}

/// Vertex with a position and an RGBA color, for flat-shaded 2D shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorVertex {
    pub position: Vec4,
    pub color: Vec4,
}

impl ColorVertex {
    pub fn new(position: Vec4, color: Vec4) -> Self {
        Self { position, color }
    }
}

impl Default for ColorVertex {
    fn default() -> Self {
        Self {
            position: Vec4::W,
            color: Vec4::W,
        }
    }
}

impl VertexData for ColorVertex {
    fn has_data(&self, name: &str) -> bool {
        matches!(name, POSITION | COLOR)
    }

    fn get_data(&self, name: &str) -> Result<Vec<f32>, MeshError> {
        match name {
            POSITION => Ok(self.position.to_array().to_vec()),
            COLOR => Ok(self.color.to_array().to_vec()),
            _ => Err(MeshError::UnknownAttribute(name.to_string())),
        }
    }

    fn set_data(&mut self, name: &str, data: &[f32]) -> Result<(), MeshError> {
        match name {
            POSITION => self.position = padded(name, data, Vec4::W)?,
            COLOR => self.color = padded(name, data, Vec4::W)?,
            _ => return Err(MeshError::UnknownAttribute(name.to_string())),
        }
        Ok(())
    }

    fn attribute_names(&self) -> &'static [&'static str] {
        &[POSITION, COLOR]
    }
}

fn padded(name: &str, data: &[f32], default: Vec4) -> Result<Vec4, MeshError> {
    if data.is_empty() || data.len() > 4 {
        return Err(MeshError::AttributeLength {
            name: name.to_string(),
            len: data.len(),
        });
    }
    let mut out = default.to_array();
    out[..data.len()].copy_from_slice(data);
    Ok(Vec4::from_array(out))
}

/// Reads a point stored with any number of components as (x, y, z, w),
/// with missing components as 0 and a missing w as 1.
pub(crate) fn homogeneous(data: &[f32]) -> Vec4 {
    let mut out = Vec4::W.to_array();
    let n = data.len().min(4);
    out[..n].copy_from_slice(&data[..n]);
    Vec4::from_array(out)
}
