mod error;
mod layout;
mod object;
mod shader;

pub use error::GpuError;
pub use layout::{AttributeSlot, InterleavedLayout, ShaderAttributeMap};
pub use object::{topology_for, upload_indices, ObjectInstance};
pub use shader::{
    compile_wgsl, pack_transforms, transform_stride, ShaderLocations, ShaderProgram, TransformBuffer,
    TransformUniform, FRAGMENT_ENTRY, VERTEX_ENTRY,
};
