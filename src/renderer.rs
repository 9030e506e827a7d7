use anyhow::Result;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use crate::clock::{ClockConfig, ClockView};

pub struct Renderer<'a> {
    surface: Surface<'a>,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    view: Option<ClockView>,
}

impl<'a> Renderer<'a> {
    /// Builds the clock scene on `device`. If that fails the error is logged
    /// and frames are still cleared, just with nothing drawn on them.
    pub fn new(
        surface: Surface<'a>,
        device: Device,
        queue: Queue,
        config: SurfaceConfiguration,
        clock: &ClockConfig,
    ) -> Self {
        surface.configure(&device, &config);

        let view = match ClockView::new(&device, config.format, clock) {
            Ok(mut view) => {
                view.reshape(config.width, config.height);
                Some(view)
            }
            Err(e) => {
                log::error!("Failed to set up clock view: {}", e);
                None
            }
        };

        Self {
            surface,
            device,
            queue,
            config,
            view,
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn config(&self) -> &SurfaceConfiguration {
        &self.config
    }

    pub fn has_view(&self) -> bool {
        self.view.is_some()
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            if let Some(view) = &mut self.view {
                view.reshape(new_size.width, new_size.height);
            }
        }
    }

    pub fn render(&mut self) -> Result<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let target = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clock Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(view) = &self.view {
                view.draw(&self.queue, &mut render_pass);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
