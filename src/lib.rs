use std::sync::Arc;

use anyhow::{Context, Result};
use winit::window::Window;

pub mod clock;
pub mod gpu;
pub mod mesh;
pub mod renderer;

pub use clock::ClockConfig;
use renderer::Renderer;

pub struct State {
    window: Arc<Window>,
    renderer: Renderer<'static>,
    config: ClockConfig,
}

impl State {
    pub fn new(window: Window, config: ClockConfig) -> Result<Self> {
        let window = Arc::new(window);
        let size = window.inner_size();

        log::info!("Creating WGPU instance...");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("Failed to find appropriate adapter")?;

        let info = adapter.get_info();
        log::info!("Using adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Primary Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("Failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface reports no formats")?;
        log::debug!("Selected surface format: {:?}", surface_format);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let renderer = Renderer::new(surface, device, queue, surface_config, &config);

        Ok(Self {
            window,
            renderer,
            config,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.renderer.resize(new_size);
    }

    pub fn render(&mut self) -> Result<()> {
        self.renderer.render()
    }
}
