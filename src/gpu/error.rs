use thiserror::Error;

use crate::mesh::MeshError;

#[derive(Debug, Error)]
pub enum GpuError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("Cannot build a vertex layout for a mesh without vertices")]
    EmptyMesh,

    #[error("No shader inputs are bound to mesh attributes")]
    NoBindings,

    #[error("Attribute {attribute} has {components} components, GPU attributes take 1 to 4")]
    UnsupportedWidth { attribute: String, components: usize },

    #[error("Vertex {vertex} has {found} components for {attribute}, expected {expected}")]
    InconsistentWidth {
        vertex: usize,
        attribute: String,
        expected: usize,
        found: usize,
    },

    #[error("Shader input {input} at location {location} is not bound to a mesh attribute")]
    UnboundInput { input: String, location: u32 },

    #[error("{requested} transforms do not fit in a buffer of {capacity}")]
    TooManyTransforms { requested: usize, capacity: usize },

    #[error("Shader {label} failed: {message}")]
    Shader { label: String, message: String },
}
