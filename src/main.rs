use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use segment_clock::{clock, ClockConfig, State};
use winit::{
    dpi::PhysicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Initial window width; the clock keeps this window's aspect ratio
    #[arg(long, default_value_t = 750)]
    width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 450)]
    height: u32,

    /// Frames drawn per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Show the time at this offset from UTC instead of the system time zone
    #[arg(long, allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,

    /// Write the segment and dot meshes as OBJ files into DIR and exit
    #[arg(long, value_name = "DIR")]
    dump_meshes: Option<PathBuf>,
}

impl Args {
    fn clock_config(&self) -> ClockConfig {
        ClockConfig {
            width: self.width.max(1),
            height: self.height.max(1),
            fps: self.fps.max(1),
            utc_offset_minutes: self.utc_offset_minutes,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = args.clock_config();

    if let Some(dir) = &args.dump_meshes {
        for path in clock::dump_meshes(dir).context("Failed to write meshes")? {
            log::info!("Wrote {}", path.display());
        }
        return Ok(());
    }

    match config.utc_offset_minutes {
        Some(minutes) => log::info!("Showing time at UTC{:+} minutes", minutes),
        None => log::info!(
            "Showing local time (UTC{:+} minutes)",
            clock::local_utc_offset_minutes()
        ),
    }

    let event_loop = EventLoop::new().context("Failed to create event loop")?;

    let window = WindowBuilder::new()
        .with_title("Digital Clock")
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .build(&event_loop)
        .context("Failed to create window")?;

    let mut state = State::new(window, config)?;
    let frame_interval = config.frame_interval();
    let mut next_frame = Instant::now();

    event_loop.run(move |event, window_target| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => window_target.exit(),
            WindowEvent::Resized(new_size) => state.resize(new_size),
            WindowEvent::RedrawRequested => {
                if let Err(e) = state.render() {
                    log::error!("Render error: {}", e);
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            if now >= next_frame {
                state.window().request_redraw();
                next_frame = now + frame_interval;
            }
            window_target.set_control_flow(ControlFlow::WaitUntil(next_frame));
        }
        _ => {}
    })?;

    Ok(())
}
