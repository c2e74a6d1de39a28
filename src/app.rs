use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::camera::Camera;
use crate::config::SimulationParameters;
use crate::gpu::{GpuContext, HeightBuffers, SurfaceRenderer, WaveCompute};
use crate::simulation::{
    Domain, ForcingController, HeightGrid, NoiseField, PointerPhase, PointerState, StepScheduler,
};

/// Everything allocated on the GPU for one session
struct GpuState {
    gpu: GpuContext,
    height_buffers: HeightBuffers,
    wave_compute: WaveCompute,
    surface_renderer: SurfaceRenderer,
}

/// Application state
pub struct App {
    params: SimulationParameters,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    camera: Camera,
    pointer: PointerState,
    cursor: Vec2,
    forcing: ForcingController,
    scheduler: StepScheduler,
    steps: u64,
    rates: RateCounter,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(params: SimulationParameters) -> Self {
        let domain = Domain::new(params.width, params.bounds);
        Self {
            window: None,
            gpu_state: None,
            camera: Camera::default(),
            pointer: PointerState::default(),
            cursor: Vec2::ZERO,
            forcing: ForcingController::new(domain, params.cooldown),
            scheduler: StepScheduler::new(params.speed),
            steps: 0,
            rates: RateCounter::new(Instant::now()),
            error: None,
            params,
        }
    }

    /// The error that ended the session, if any
    pub fn into_result(self) -> anyhow::Result<()> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        log::info!("Initializing water surface...");
        log::info!(
            "Grid size: {}x{}, bounds {}",
            self.params.width,
            self.params.width,
            self.params.bounds
        );

        let window_attrs = Window::default_attributes()
            .with_title("Ripple Pond - Initializing...")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("failed to create window")?,
        );

        log::info!("Creating GPU context...");
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;
        let (width, height) = gpu.size();
        self.camera.set_viewport(width, height);

        log::info!("Generating initial surface (seed {})...", self.params.seed);
        let grid = HeightGrid::seeded(
            self.params.width,
            self.params.edge_mode,
            &NoiseField::new(self.params.seed),
        );

        log::info!("Creating GPU buffers...");
        let height_buffers =
            HeightBuffers::new(&gpu.device, &gpu.queue, &self.params, grid.cells())?;

        log::info!("Creating compute pipeline...");
        let wave_compute = WaveCompute::new(&gpu.device)?;

        log::info!("Creating render pipeline...");
        let surface_renderer =
            SurfaceRenderer::new(&gpu.device, gpu.format(), self.params.width, gpu.size())?;

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Click/drag or touch: Disturb the water");
        log::info!("  Escape: Quit");

        self.window = Some(window);
        self.gpu_state = Some(GpuState {
            gpu,
            height_buffers,
            wave_compute,
            surface_renderer,
        });
        Ok(())
    }

    /// Release GPU resources before the event loop exits
    fn teardown(&mut self) {
        if self.gpu_state.take().is_some() {
            log::info!("Released GPU resources after {} steps", self.steps);
        }
        self.window = None;
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        self.teardown();
        event_loop.exit();
    }

    fn viewport(&self) -> Vec2 {
        match &self.gpu_state {
            Some(state) => {
                let (width, height) = state.gpu.size();
                Vec2::new(width as f32, height as f32)
            }
            None => Vec2::ONE,
        }
    }

    fn pointer_event(&mut self, phase: PointerPhase, position: Vec2) {
        self.cursor = position;
        let viewport = self.viewport();
        self.pointer.handle(phase, position, viewport);
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let Some(state) = self.gpu_state.as_mut() else {
            return Ok(());
        };

        // Input is sampled once per frame, before any step is scheduled
        let input = self.pointer.snapshot();
        let forcing = self.forcing.update(input, &self.camera, Instant::now());
        self.scheduler.latch(forcing);

        // A frame that cannot be presented neither counts toward nor consumes a step
        let output = match state.gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                state.gpu.surface.configure(&state.gpu.device, &state.gpu.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                anyhow::bail!("GPU out of memory while acquiring a frame");
            }
            Err(e) => {
                log::warn!("Surface error: {:?}", e);
                return Ok(());
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let step = self.scheduler.frame();
        if let Some(forcing) = step {
            state
                .height_buffers
                .update_params(&state.gpu.queue, forcing.position());
        }
        state
            .height_buffers
            .update_surface(&state.gpu.queue, self.camera.view_proj(), self.camera.eye);

        let mut encoder = state
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        if step.is_some() {
            // 1. Advance the simulation by one step
            let (input_buf, output_buf) = state.height_buffers.io_buffers();
            let bind_group = state.wave_compute.create_bind_group(
                &state.gpu.device,
                input_buf,
                output_buf,
                &state.height_buffers.params_buffer,
            );
            state
                .wave_compute
                .dispatch(&mut encoder, &bind_group, state.height_buffers.width());

            // 2. Output becomes input for the next step and the source for drawing
            state.height_buffers.swap();
        }

        // 3. Draw the latest completed step
        let render_bind_group = state.surface_renderer.create_bind_group(
            &state.gpu.device,
            state.height_buffers.current(),
            &state.height_buffers.surface_buffer,
        );
        state
            .surface_renderer
            .draw(&mut encoder, &view, &render_bind_group);

        state.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if step.is_some() {
            self.scheduler.committed();
            self.steps += 1;
        }

        if let Some(rates) = self.rates.tick(Instant::now(), step.is_some()) {
            if let Some(window) = &self.window {
                window.set_title(&format!(
                    "Ripple Pond - {:.0} FPS - {:.0} steps/s - {} steps",
                    rates.fps, rates.steps_per_second, self.steps
                ));
            }
        }

        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.error.is_some() {
            return;
        }

        if let Err(error) = self.init(event_loop) {
            self.fail(event_loop, error.context("initialization failed"));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed()
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    log::info!("Escape pressed, exiting...");
                    self.teardown();
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(state) = &mut self.gpu_state {
                    log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                    state.gpu.resize(new_size);
                    let size = state.gpu.size();
                    state.surface_renderer.resize(&state.gpu.device, size);
                    self.camera.set_viewport(size.0, size.1);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                self.pointer_event(PointerPhase::Move, position);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let phase = match state {
                    ElementState::Pressed => PointerPhase::Down,
                    ElementState::Released => PointerPhase::Up,
                };
                self.pointer_event(phase, self.cursor);
            }
            WindowEvent::Touch(touch) => {
                let phase = match touch.phase {
                    TouchPhase::Started => PointerPhase::Down,
                    TouchPhase::Moved => PointerPhase::Move,
                    TouchPhase::Ended | TouchPhase::Cancelled => PointerPhase::Up,
                };
                let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                self.pointer_event(phase, position);
            }
            WindowEvent::RedrawRequested => {
                if let Err(error) = self.render() {
                    self.fail(event_loop, error);
                    return;
                }
                // Request another frame immediately
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

/// Frames and simulation steps presented over the last second
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rates {
    fps: f64,
    steps_per_second: f64,
}

/// Once-per-second frame and step rate counter for the window title
struct RateCounter {
    window_start: Instant,
    frames: u32,
    steps: u32,
}

impl RateCounter {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            steps: 0,
        }
    }

    /// Count a presented frame; returns the rates when a second has elapsed
    fn tick(&mut self, now: Instant, stepped: bool) -> Option<Rates> {
        self.frames += 1;
        self.steps += u32::from(stepped);

        let elapsed = now.duration_since(self.window_start).as_secs_f64();
        if elapsed < 1.0 {
            return None;
        }

        let rates = Rates {
            fps: self.frames as f64 / elapsed,
            steps_per_second: self.steps as f64 / elapsed,
        };
        *self = Self::new(now);
        Some(rates)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_rates_reported_once_per_second() {
        let start = Instant::now();
        let mut counter = RateCounter::new(start);
        let frame = Duration::from_millis(10);

        let mut reported = None;
        for n in 1..=100u32 {
            let result = counter.tick(start + frame * n, n % 2 == 0);
            if n < 100 {
                assert_eq!(result, None);
            } else {
                reported = result;
            }
        }

        let rates = reported.expect("a report after one second");
        assert!((rates.fps - 100.0).abs() < 1e-9);
        assert!((rates.steps_per_second - 50.0).abs() < 1e-9);
        assert_eq!(counter.tick(start + frame * 101, true), None);
    }
}
