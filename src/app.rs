use std::sync::Arc;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use crate::config::Config;
use crate::controller::{Controller, Frame};
use crate::debug::timer::FramePhase;
use crate::debug::{DebugOverlay, PetStats, Tuning};
use crate::error::{BubblesError, Result};
use crate::input::Gesture;
use crate::render::instance::{self, ShapeInstance};
use crate::render::GpuState;
use crate::sound::Sounds;

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// Shapes per frame before the instance buffer has to grow.
const INSTANCE_CAPACITY: usize = 256;

fn to_vec2(p: PhysicalPosition<f64>) -> Vec2 {
    Vec2::new(p.x as f32, p.y as f32)
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    config: Config,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    debug: Option<DebugOverlay>,

    controller: Controller,
    sounds: Sounds,

    // Fixed timestep
    last_frame_time: Option<Instant>,
    accumulator: f64,
    tick_count: u64,

    // Screen dimensions
    screen_w: u32,
    screen_h: u32,

    // Reused every frame
    frame: Frame,
    instance_buf: Vec<ShapeInstance>,

    /// Startup failure from `resumed`, handed back by `run`.
    fatal: Option<BubblesError>,
}

impl App {
    fn new(config: Config) -> Self {
        let center = Vec2::new(config.window.width as f32, config.window.height as f32) / 2.0;
        let controller = Controller::new(&config, center);
        let sounds = Sounds::open(&config.sound);
        Self {
            window: None,
            gpu: None,
            debug: None,
            controller,
            sounds,
            last_frame_time: None,
            accumulator: 0.0,
            tick_count: 0,
            screen_w: config.window.width,
            screen_h: config.window.height,
            frame: Frame::new(),
            instance_buf: Vec::with_capacity(INSTANCE_CAPACITY),
            fatal: None,
            config,
        }
    }

    /// Create the window, GPU state and overlay.
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let wc = &self.config.window;
        let level = if wc.always_on_top {
            WindowLevel::AlwaysOnTop
        } else {
            WindowLevel::Normal
        };
        // Start hidden so the first visible frame is a drawn one.
        let attrs = WindowAttributes::default()
            .with_title(wc.title.clone())
            .with_visible(false)
            .with_window_level(level)
            .with_inner_size(PhysicalSize::new(wc.width, wc.height));

        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        self.screen_w = size.width;
        self.screen_h = size.height;
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = GpuState::new(window.clone(), wc.background)?;
        log::info!("wgpu + shape pipeline initialized");

        let tuning = Tuning::new(&self.controller.pet.physics, !self.sounds.enabled);
        let mut debug = DebugOverlay::new(&window, &gpu, &wc.title, tuning);
        debug.visible = self.config.debug.overlay;

        // Continuous game loop
        event_loop.set_control_flow(ControlFlow::Poll);
        window.set_visible(true);

        self.gpu = Some(gpu);
        self.debug = Some(debug);
        self.window = Some(window);
        Ok(())
    }

    fn route(&mut self, gesture: Option<Gesture>) {
        if let Some(gesture) = gesture {
            self.controller.handle(gesture, &mut self.sounds);
        }
    }

    /// Run fixed-timestep simulation ticks.
    fn run_fixed_update(&mut self, dt: f64) {
        self.accumulator += dt;

        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        while self.accumulator >= TICK_RATE {
            self.controller.tick(TICK_RATE, &mut self.sounds);
            self.accumulator -= TICK_RATE;
            self.tick_count += 1;
        }
    }

    /// Interpolation alpha for rendering between ticks.
    fn interpolation_alpha(&self) -> f32 {
        (self.accumulator / TICK_RATE) as f32
    }

    /// Build the instance buffer, back to front: sparkles, pet, cursor ring.
    fn build_instances(&mut self) {
        self.controller
            .frame(self.interpolation_alpha(), &mut self.frame);

        self.instance_buf.clear();
        for sparkle in &self.frame.sparkles {
            instance::compose_sparkle(sparkle, &mut self.instance_buf);
        }
        instance::compose_pet(&self.frame.pet, &mut self.instance_buf);
        instance::compose_cursor(self.frame.cursor, &mut self.instance_buf);
    }

    /// Pull overlay edits into the simulation.
    fn apply_overlay_controls(&mut self) {
        let (Some(debug), Some(gpu)) = (&mut self.debug, &mut self.gpu) else {
            return;
        };
        if debug.tuning_changed {
            debug.tuning_changed = false;
            debug.tuning.apply(&mut self.controller.pet.physics);
            self.sounds.enabled = !debug.tuning.muted;
            log::debug!("Tuning applied: {:?}", debug.tuning);
        }
        if debug.present_mode_changed {
            debug.present_mode_changed = false;
            gpu.set_present_mode(debug.selected_present_mode());
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = self
            .last_frame_time
            .map(|last| now.duration_since(last).as_secs_f64());
        self.last_frame_time = Some(now);

        let paused = self.debug.as_ref().is_some_and(|d| d.paused);

        if let Some(debug) = &mut self.debug {
            debug.timers.begin();
        }
        if let Some(dt) = dt {
            if let Some(debug) = &mut self.debug {
                debug.record_frame(dt);
            }
            if !paused {
                self.run_fixed_update(dt);
            }
        }
        if let Some(debug) = &mut self.debug {
            debug.timers.end(FramePhase::Simulation);
            debug.timers.begin();
        }

        self.build_instances();

        let (Some(window), Some(gpu), Some(debug)) = (&self.window, &mut self.gpu, &mut self.debug)
        else {
            return;
        };
        debug.timers.end(FramePhase::BuildInstances);

        let pet = &self.controller.pet;
        debug.pet = PetStats {
            mood: pet.mood(),
            distance: pet.last_distance(),
            speed: pet.velocity().length(),
            stretch: pet.stretch(),
            blink_interval: pet.blink_interval(),
            dragging: pet.is_dragging(),
            sparkles: self.controller.sparkle_count(),
            sim_time: self.controller.now(),
        };
        debug.tick_count = self.tick_count;

        debug.timers.begin();
        gpu.update_instances(&self.instance_buf);
        debug.timers.end(FramePhase::GpuUpload);

        debug.timers.begin();
        let Some(mut ctx) = gpu.begin_frame() else {
            return;
        };
        gpu.draw_shapes(&mut ctx.encoder, &ctx.view);

        let (primitives, textures_delta, screen) =
            debug.run_frame(window, self.screen_w, self.screen_h);
        let extra = debug.prepare_egui(
            &gpu.device,
            &gpu.queue,
            &mut ctx.encoder,
            &primitives,
            &textures_delta,
            &screen,
        );
        {
            let mut pass = GpuState::begin_egui_pass(&mut ctx.encoder, &ctx.view);
            debug.render_egui(&mut pass, &primitives, &screen);
        }
        gpu.finish_frame(ctx.encoder, ctx.output, extra);
        debug.free_textures(&textures_delta);
        debug.timers.end(FramePhase::Render);

        self.apply_overlay_controls();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // egui sees everything first; the pet only gets what it leaves alone.
        let consumed = match (&self.window, &mut self.debug) {
            (Some(window), Some(debug)) => debug.on_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    self.screen_w = new_size.width;
                    self.screen_h = new_size.height;
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                match event.logical_key {
                    Key::Named(NamedKey::Escape) => {
                        log::info!("ESC pressed, exiting");
                        event_loop.exit();
                    }
                    Key::Named(NamedKey::F12) => {
                        if let Some(debug) = &mut self.debug {
                            debug.toggle();
                        }
                    }
                    _ => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } if !consumed => {
                let gesture = self.controller.pointer.cursor_moved(to_vec2(position));
                self.route(Some(gesture));
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                // A release always goes through so a drag can't get stuck.
                if !(pressed && consumed) {
                    let gesture = self.controller.pointer.mouse_button(pressed);
                    self.route(gesture);
                }
            }
            WindowEvent::Touch(touch) if !consumed => {
                let gesture =
                    self.controller
                        .pointer
                        .touch(touch.id, touch.phase, to_vec2(touch.location));
                self.route(gesture);
            }
            WindowEvent::CursorLeft { .. } => {
                let gesture = self.controller.pointer.cursor_left();
                self.route(gesture);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        log::info!(
            "Shutting down after {} ticks ({:.1}s simulated)",
            self.tick_count,
            self.controller.now()
        );
    }
}

/// Entry point: create the event loop and run until the window closes.
pub fn run(config: Config) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
