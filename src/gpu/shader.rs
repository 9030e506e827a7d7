use std::collections::HashMap;

use glam::Mat4;

use super::GpuError;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

const TRANSFORM_SIZE: wgpu::BufferAddress = std::mem::size_of::<TransformUniform>() as wgpu::BufferAddress;

/// Input locations of a vertex entry point, keyed by input name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderLocations {
    inputs: HashMap<String, u32>,
}

impl ShaderLocations {
    pub fn add(&mut self, name: impl Into<String>, location: u32) {
        self.inputs.insert(name.into(), location);
    }

    pub fn get_location(&self, name: &str) -> Option<u32> {
        self.inputs.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.inputs.iter().map(|(name, location)| (name.as_str(), *location))
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Collects `@location` inputs of the vertex entry point `entry`, both
    /// plain arguments and members of an input struct.
    pub fn reflect(module: &naga::Module, entry: &str) -> Self {
        let mut locations = Self::default();
        let Some(entry_point) = module
            .entry_points
            .iter()
            .find(|ep| ep.stage == naga::ShaderStage::Vertex && ep.name == entry)
        else {
            return locations;
        };

        for arg in &entry_point.function.arguments {
            match (&arg.binding, &module.types[arg.ty].inner) {
                (Some(naga::Binding::Location { location, .. }), _) => {
                    if let Some(name) = &arg.name {
                        locations.add(name.as_str(), *location);
                    }
                }
                (None, naga::TypeInner::Struct { members, .. }) => {
                    for member in members {
                        if let (Some(name), Some(naga::Binding::Location { location, .. })) =
                            (&member.name, &member.binding)
                        {
                            locations.add(name.as_str(), *location);
                        }
                    }
                }
                _ => {}
            }
        }
        locations
    }
}

/// Parses and validates WGSL. Failures are logged with the shader label.
pub fn compile_wgsl(source: &str, label: &str) -> Result<naga::Module, GpuError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| {
        let message = e.emit_to_string(source);
        log::error!("Shader {} failed to compile:\n{}", label, message);
        GpuError::Shader {
            label: label.to_string(),
            message,
        }
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator.validate(&module).map_err(|e| {
        let message = format!("Validation error: {}", e);
        log::error!("Shader {} failed to validate: {}", label, message);
        GpuError::Shader {
            label: label.to_string(),
            message,
        }
    })?;

    Ok(module)
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub projection: [[f32; 4]; 4],
    pub modelview: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn new(projection: Mat4, modelview: Mat4) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            modelview: modelview.to_cols_array_2d(),
        }
    }
}

impl Default for TransformUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

/// A compiled vertex/fragment pair with one uniform block at group 0,
/// binding 0 holding a [`TransformUniform`] at a dynamic offset.
pub struct ShaderProgram {
    label: String,
    module: wgpu::ShaderModule,
    locations: ShaderLocations,
    uniform_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    target_format: wgpu::TextureFormat,
}

impl ShaderProgram {
    pub fn new(
        device: &wgpu::Device,
        source: &str,
        label: &str,
        target_format: wgpu::TextureFormat,
    ) -> Result<Self, GpuError> {
        let ir = compile_wgsl(source, label)?;
        let locations = ShaderLocations::reflect(&ir, VERTEX_ENTRY);
        if locations.is_empty() {
            log::warn!("Shader {} declares no vertex inputs for {}", label, VERTEX_ENTRY);
        }

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Transform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(TRANSFORM_SIZE),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", label)),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        log::debug!("Compiled shader {} with {} vertex inputs", label, locations.len());

        Ok(Self {
            label: label.to_string(),
            module,
            locations,
            uniform_layout,
            pipeline_layout,
            target_format,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn locations(&self) -> &ShaderLocations {
        &self.locations
    }

    pub fn get_location(&self, name: &str) -> Option<u32> {
        self.locations.get_location(name)
    }

    pub(crate) fn create_pipeline(
        &self,
        device: &wgpu::Device,
        label: &str,
        buffer: wgpu::VertexBufferLayout<'_>,
        topology: wgpu::PrimitiveTopology,
        strip_index_format: Option<wgpu::IndexFormat>,
    ) -> Result<wgpu::RenderPipeline, GpuError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Pipeline", label)),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.module,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[buffer],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.module,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        match pollster::block_on(device.pop_error_scope()) {
            Some(e) => {
                log::error!("Pipeline {} rejected: {}", label, e);
                Err(GpuError::Shader {
                    label: self.label.clone(),
                    message: e.to_string(),
                })
            }
            None => Ok(pipeline),
        }
    }
}

/// Byte offsets of packed transforms must be multiples of `alignment`.
pub fn transform_stride(alignment: u32) -> wgpu::BufferAddress {
    wgpu::util::align_to(TRANSFORM_SIZE, wgpu::BufferAddress::from(alignment.max(1)))
}

/// Lays `uniforms` out back to back, each starting `stride` bytes after the
/// previous one.
pub fn pack_transforms(uniforms: &[TransformUniform], stride: wgpu::BufferAddress) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; stride * uniforms.len()];
    for (chunk, uniform) in bytes.chunks_exact_mut(stride).zip(uniforms) {
        chunk[..TRANSFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(uniform));
    }
    bytes
}

/// One uniform buffer holding the transforms of every draw in a frame.
/// Draw `i` binds it at `offset(i)`; the contents are replaced by `write`.
pub struct TransformBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: wgpu::BufferAddress,
    capacity: usize,
}

impl TransformBuffer {
    pub fn new(device: &wgpu::Device, program: &ShaderProgram, capacity: usize) -> Self {
        let stride = transform_stride(device.limits().min_uniform_buffer_offset_alignment);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Transform Buffer"),
            size: stride * capacity.max(1) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform Bind Group"),
            layout: &program.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(TRANSFORM_SIZE),
                }),
            }],
        });

        Self {
            buffer,
            bind_group,
            stride,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn offset(&self, index: usize) -> wgpu::DynamicOffset {
        (self.stride * index as wgpu::BufferAddress) as wgpu::DynamicOffset
    }

    pub fn write(&self, queue: &wgpu::Queue, uniforms: &[TransformUniform]) -> Result<(), GpuError> {
        if uniforms.len() > self.capacity {
            return Err(GpuError::TooManyTransforms {
                requested: uniforms.len(),
                capacity: self.capacity,
            });
        }
        if !uniforms.is_empty() {
            queue.write_buffer(&self.buffer, 0, &pack_transforms(uniforms, self.stride));
        }
        Ok(())
    }
}

impl Drop for TransformBuffer {
    fn drop(&mut self) {
        self.buffer.destroy();
    }
}
