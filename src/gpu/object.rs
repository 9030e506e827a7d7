use std::rc::Rc;

use glam::Vec4;
use wgpu::util::DeviceExt;

use crate::mesh::{PolygonMesh, PrimitiveType, VertexData};

use super::layout::{InterleavedLayout, ShaderAttributeMap};
use super::shader::ShaderProgram;
use super::GpuError;

/// A mesh uploaded to the GPU together with the pipeline that draws it.
/// The CPU-side mesh is shared, so several instances can point at one mesh.
pub struct ObjectInstance<V> {
    name: String,
    mesh: Rc<PolygonMesh<V>>,
    layout: InterleavedLayout,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_elements: u32,
    pipeline: wgpu::RenderPipeline,
}

impl<V: VertexData> ObjectInstance<V> {
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        attributes: &ShaderAttributeMap,
        mesh: Rc<PolygonMesh<V>>,
        name: &str,
    ) -> Result<Self, GpuError> {
        let layout = InterleavedLayout::for_mesh(&mesh, attributes)?;
        layout.check_shader_inputs(program.locations())?;
        let vertex_data = layout.interleave(mesh.vertices())?;
        let indices = upload_indices(&mesh);
        let (topology, strip_index_format) = topology_for(mesh.primitive_type());
        let vertex_attributes = layout.vertex_attributes(program.locations());

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&vertex_data),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", name)),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let pipeline = program.create_pipeline(
            device,
            name,
            wgpu::VertexBufferLayout {
                array_stride: layout.array_stride(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &vertex_attributes,
            },
            topology,
            strip_index_format,
        )?;

        log::debug!(
            "Uploaded {}: {} vertices of {} floats, {} indices as {:?}",
            name,
            mesh.vertex_count(),
            layout.vertex_size(),
            indices.len(),
            topology
        );

        Ok(Self {
            name: name.to_string(),
            mesh,
            layout,
            vertex_buffer,
            index_buffer,
            num_elements: indices.len() as u32,
            pipeline,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn mesh(&self) -> &Rc<PolygonMesh<V>> {
        &self.mesh
    }

    pub fn layout(&self) -> &InterleavedLayout {
        &self.layout
    }

    pub fn num_elements(&self) -> u32 {
        self.num_elements
    }

    pub fn min_bounds(&self) -> Vec4 {
        self.mesh.min_bounds()
    }

    pub fn max_bounds(&self) -> Vec4 {
        self.mesh.max_bounds()
    }

    /// Records the draw. `uniforms` is bound at group 0 at `offset`.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        uniforms: &wgpu::BindGroup,
        offset: wgpu::DynamicOffset,
    ) {
        if self.num_elements == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, uniforms, &[offset]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.num_elements, 0, 0..1);
    }
}

impl<V> Drop for ObjectInstance<V> {
    fn drop(&mut self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

/// Index list as the GPU will read it. Triangle lists and fans are emitted
/// as plain triangles, splitting larger polygons as fans around their
/// first corner.
pub fn upload_indices<V: VertexData>(mesh: &PolygonMesh<V>) -> Vec<u32> {
    match mesh.primitive_type() {
        PrimitiveType::Triangles | PrimitiveType::TriangleFan => mesh
            .polygons()
            .iter()
            .flat_map(|polygon| {
                (2..polygon.len()).flat_map(move |i| [polygon[0], polygon[i - 1], polygon[i]])
            })
            .collect(),
        _ => mesh.primitives().to_vec(),
    }
}

pub fn topology_for(primitive: PrimitiveType) -> (wgpu::PrimitiveTopology, Option<wgpu::IndexFormat>) {
    match primitive {
        PrimitiveType::Points => (wgpu::PrimitiveTopology::PointList, None),
        PrimitiveType::Lines => (wgpu::PrimitiveTopology::LineList, None),
        PrimitiveType::LineStrip => (
            wgpu::PrimitiveTopology::LineStrip,
            Some(wgpu::IndexFormat::Uint32),
        ),
        PrimitiveType::Triangles | PrimitiveType::TriangleFan => {
            (wgpu::PrimitiveTopology::TriangleList, None)
        }
        PrimitiveType::TriangleStrip => (
            wgpu::PrimitiveTopology::TriangleStrip,
            Some(wgpu::IndexFormat::Uint32),
        ),
    }
}
