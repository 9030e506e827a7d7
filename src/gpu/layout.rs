use crate::mesh::{PolygonMesh, VertexData};

use super::shader::ShaderLocations;
use super::GpuError;

/// Ordered mapping from shader input names to mesh attribute names.
/// The order decides where each attribute lands in the interleaved buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderAttributeMap {
    entries: Vec<(String, String)>,
}

impl ShaderAttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, shader_var: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.insert(shader_var, attribute);
        self
    }

    /// Binds `shader_var` to `attribute`. Re-binding an input keeps its
    /// place in the order.
    pub fn insert(&mut self, shader_var: impl Into<String>, attribute: impl Into<String>) {
        let shader_var = shader_var.into();
        let attribute = attribute.into();
        match self.entries.iter_mut().find(|(var, _)| *var == shader_var) {
            Some(entry) => entry.1 = attribute,
            None => self.entries.push((shader_var, attribute)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(var, attr)| (var.as_str(), attr.as_str()))
    }
}

impl<S: Into<String>, A: Into<String>> FromIterator<(S, A)> for ShaderAttributeMap {
    fn from_iter<I: IntoIterator<Item = (S, A)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (var, attr) in iter {
            map.insert(var, attr);
        }
        map
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSlot {
    pub shader_var: String,
    pub attribute: String,
    pub components: usize,
    /// In floats from the start of a vertex.
    pub offset: usize,
}

/// Where each bound attribute sits inside one interleaved vertex, in floats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterleavedLayout {
    slots: Vec<AttributeSlot>,
    vertex_size: usize,
    stride: usize,
}

impl InterleavedLayout {
    /// Attribute widths are read from `sample`; every vertex laid out later
    /// must match them.
    pub fn new<V: VertexData>(sample: &V, attributes: &ShaderAttributeMap) -> Result<Self, GpuError> {
        if attributes.is_empty() {
            return Err(GpuError::NoBindings);
        }

        let mut slots = Vec::with_capacity(attributes.len());
        let mut vertex_size = 0;
        for (shader_var, attribute) in attributes.iter() {
            let components = sample.get_data(attribute)?.len();
            if !(1..=4).contains(&components) {
                return Err(GpuError::UnsupportedWidth {
                    attribute: attribute.to_string(),
                    components,
                });
            }
            slots.push(AttributeSlot {
                shader_var: shader_var.to_string(),
                attribute: attribute.to_string(),
                components,
                offset: vertex_size,
            });
            vertex_size += components;
        }

        // A lone attribute is tightly packed and reports no stride
        let stride = if slots.len() > 1 { vertex_size } else { 0 };

        Ok(Self {
            slots,
            vertex_size,
            stride,
        })
    }

    pub fn for_mesh<V: VertexData>(
        mesh: &PolygonMesh<V>,
        attributes: &ShaderAttributeMap,
    ) -> Result<Self, GpuError> {
        let sample = mesh.vertices().first().ok_or(GpuError::EmptyMesh)?;
        Self::new(sample, attributes)
    }

    pub fn slots(&self) -> &[AttributeSlot] {
        &self.slots
    }

    pub fn offset_of(&self, shader_var: &str) -> Option<usize> {
        self.slots
            .iter()
            .find(|slot| slot.shader_var == shader_var)
            .map(|slot| slot.offset)
    }

    /// Floats per vertex.
    pub fn vertex_size(&self) -> usize {
        self.vertex_size
    }

    /// Floats between consecutive vertices, or 0 when only one attribute is
    /// bound and the data is tightly packed.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Byte stride for the vertex buffer. A stride of 0 means tightly packed
    /// here, which in wgpu has to be spelled out as the vertex size.
    pub fn array_stride(&self) -> wgpu::BufferAddress {
        let floats = if self.stride == 0 { self.vertex_size } else { self.stride };
        (floats * std::mem::size_of::<f32>()) as wgpu::BufferAddress
    }

    /// Flattens `vertices` into one buffer: vertex by vertex, and within a
    /// vertex in binding order.
    pub fn interleave<V: VertexData>(&self, vertices: &[V]) -> Result<Vec<f32>, GpuError> {
        let mut data = Vec::with_capacity(self.vertex_size * vertices.len());
        for (i, v) in vertices.iter().enumerate() {
            for slot in &self.slots {
                let values = v.get_data(&slot.attribute)?;
                if values.len() != slot.components {
                    return Err(GpuError::InconsistentWidth {
                        vertex: i,
                        attribute: slot.attribute.clone(),
                        expected: slot.components,
                        found: values.len(),
                    });
                }
                data.extend_from_slice(&values);
            }
        }
        Ok(data)
    }

    /// Fails on the lowest shader input location that no attribute is bound
    /// to. The pipeline would otherwise read a buffer that is not there.
    pub fn check_shader_inputs(&self, locations: &ShaderLocations) -> Result<(), GpuError> {
        let unbound = locations
            .iter()
            .filter(|(name, _)| self.offset_of(name).is_none())
            .min_by_key(|(_, location)| *location);
        match unbound {
            Some((input, location)) => Err(GpuError::UnboundInput {
                input: input.to_string(),
                location,
            }),
            None => Ok(()),
        }
    }

    /// Vertex attributes for every bound input the shader declares. Inputs
    /// the shader does not have are left out.
    pub fn vertex_attributes(&self, locations: &ShaderLocations) -> Vec<wgpu::VertexAttribute> {
        self.slots
            .iter()
            .filter_map(|slot| {
                let Some(shader_location) = locations.get_location(&slot.shader_var) else {
                    log::warn!("Shader has no input named {}, not binding {}", slot.shader_var, slot.attribute);
                    return None;
                };
                Some(wgpu::VertexAttribute {
                    format: vertex_format(slot.components)?,
                    offset: (slot.offset * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
                    shader_location,
                })
            })
            .collect()
    }
}

fn vertex_format(components: usize) -> Option<wgpu::VertexFormat> {
    match components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}
