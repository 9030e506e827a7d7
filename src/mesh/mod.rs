mod error;
mod exporter;
mod loader;
mod polygon;
pub mod vertex;

pub use error::MeshError;
pub use exporter::{export_obj, save_obj};
pub use loader::{center_and_scale, import_obj, load_obj, scale_and_center_matrix};
pub use polygon::{newell_normal, BoundingBox, PolygonMesh, PrimitiveType};
pub use vertex::{ColorVertex, Vertex, VertexData};

#[cfg(test)]
mod tests;
