pub mod ring;
pub mod timer;

use winit::window::Window;

use self::ring::RingBuffer;
use self::timer::{FramePhase, PhaseTimers};

use crate::config::PhysicsConfig;
use crate::pet::Mood;
use crate::render::GpuState;

/// Number of frame times to keep in the histogram.
const FRAME_HISTORY_LEN: usize = 300;
/// How often the FPS line goes to the log (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;
/// 60 Hz frame budget, drawn as the target line.
const FRAME_BUDGET: f64 = 1.0 / 60.0;
/// Caption sits in the top-left corner, inset from both edges.
const TITLE_ANCHOR: egui::Align2 = egui::Align2::LEFT_TOP;
const TITLE_OFFSET: [f32; 2] = [32.0, 32.0];
/// Debug window opens below the caption.
const PANEL_POS: [f32; 2] = [10.0, 90.0];

/// Live pet readout, refreshed by the app every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct PetStats {
    pub mood: Mood,
    pub distance: f32,
    pub speed: f32,
    pub stretch: f32,
    pub blink_interval: f64,
    pub dragging: bool,
    pub sparkles: usize,
    pub sim_time: f64,
}

/// Values the panel can edit. The app copies these in before a frame and
/// applies them back when `tuning_changed` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub spring: f32,
    pub friction: f32,
    pub drag_snap: f32,
    pub muted: bool,
}

impl Tuning {
    pub fn new(physics: &PhysicsConfig, muted: bool) -> Self {
        Self {
            spring: physics.spring,
            friction: physics.friction,
            drag_snap: physics.drag_snap,
            muted,
        }
    }

    pub fn apply(&self, physics: &mut PhysicsConfig) {
        physics.spring = self.spring;
        physics.friction = self.friction;
        physics.drag_snap = self.drag_snap;
    }
}

/// Debug overlay powered by egui. The window caption is drawn every frame;
/// the stats panel only while `visible`.
pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    pub visible: bool,
    title: String,

    /// Rolling window of frame times (seconds).
    pub frame_times: RingBuffer<f64>,

    pub fps: f64,
    pub frame_time_avg: f64,
    pub frame_time_min: f64,
    pub frame_time_max: f64,

    pub timers: PhaseTimers,
    pub pet: PetStats,
    pub tick_count: u64,

    /// UI controls.
    pub paused: bool,
    pub tuning: Tuning,
    pub tuning_changed: bool,
    pub present_mode_index: usize,
    pub present_mode_changed: bool,

    frame_count: u64,
    log_timer: f64,
    log_frame_count: u32,
    log_frame_sum: f64,
    log_frame_min: f64,
    log_frame_max: f64,
}

const PRESENT_MODES: [wgpu::PresentMode; 3] = [
    wgpu::PresentMode::Mailbox,
    wgpu::PresentMode::Fifo,
    wgpu::PresentMode::Immediate,
];

const PRESENT_MODE_LABELS: [&str; 3] = ["Mailbox", "Fifo (vsync)", "Immediate"];

fn present_mode_index(mode: wgpu::PresentMode) -> usize {
    PRESENT_MODES.iter().position(|m| *m == mode).unwrap_or(1)
}

impl DebugOverlay {
    pub fn new(window: &Window, gpu: &GpuState, title: &str, tuning: Tuning) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            visible: false,
            title: title.to_string(),
            frame_times: RingBuffer::new(FRAME_HISTORY_LEN),
            fps: 0.0,
            frame_time_avg: 0.0,
            frame_time_min: 0.0,
            frame_time_max: 0.0,
            timers: PhaseTimers::new(),
            pet: PetStats::default(),
            tick_count: 0,
            paused: false,
            tuning,
            tuning_changed: false,
            present_mode_index: present_mode_index(gpu.present_mode()),
            present_mode_changed: false,
            frame_count: 0,
            log_timer: 0.0,
            log_frame_count: 0,
            log_frame_sum: 0.0,
            log_frame_min: f64::MAX,
            log_frame_max: 0.0,
        }
    }

    /// Record a frame time, update rolling stats, and periodically log.
    pub fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frame_times.push(dt);

        if !self.frame_times.is_empty() {
            let mut sum = 0.0;
            let mut min = f64::MAX;
            let mut max = 0.0f64;
            for &t in self.frame_times.iter() {
                sum += t;
                min = min.min(t);
                max = max.max(t);
            }
            self.frame_time_avg = sum / self.frame_times.len() as f64;
            self.frame_time_min = min;
            self.frame_time_max = max;
            self.fps = if self.frame_time_avg > 0.0 {
                1.0 / self.frame_time_avg
            } else {
                0.0
            };
        }

        self.log_frame_count += 1;
        self.log_frame_sum += dt;
        self.log_frame_min = self.log_frame_min.min(dt);
        self.log_frame_max = self.log_frame_max.max(dt);
        self.log_timer += dt;

        if self.log_timer >= FPS_LOG_INTERVAL {
            let avg_ms = (self.log_frame_sum / self.log_frame_count as f64) * 1000.0;
            let fps = self.log_frame_count as f64 / self.log_timer;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.log_frame_min * 1000.0,
                self.log_frame_max * 1000.0,
                self.frame_count,
            );
            self.log_timer = 0.0;
            self.log_frame_count = 0;
            self.log_frame_sum = 0.0;
            self.log_frame_min = f64::MAX;
            self.log_frame_max = 0.0;
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay {}", if self.visible { "shown" } else { "hidden" });
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        response.consumed
    }

    /// The selected present mode.
    pub fn selected_present_mode(&self) -> wgpu::PresentMode {
        PRESENT_MODES[self.present_mode_index]
    }

    /// Run the egui frame and produce paint output.
    /// Returns (clipped_primitives, textures_delta, screen_descriptor).
    pub fn run_frame(
        &mut self,
        window: &Window,
        screen_w: u32,
        screen_h: u32,
    ) -> (
        Vec<egui::epaint::ClippedPrimitive>,
        egui::TexturesDelta,
        egui_wgpu::ScreenDescriptor,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);

        let ui_state = UiSnapshot {
            visible: self.visible,
            title: self.title.clone(),
            fps: self.fps,
            frame_time_avg: self.frame_time_avg,
            frame_time_min: self.frame_time_min,
            frame_time_max: self.frame_time_max,
            frame_times: self.frame_times.iter().copied().collect(),
            phase_durations: self.timers.durations_us,
            phase_total_us: self.timers.total_us(),
            pet: self.pet,
            tick_count: self.tick_count,
        };

        // Mutable controls, written back after run().
        let mut paused = self.paused;
        let mut tuning = self.tuning;
        let mut present_mode_index = self.present_mode_index;

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            draw_ui(ctx, &ui_state, &mut paused, &mut tuning, &mut present_mode_index);
        });

        if paused != self.paused {
            log::info!("Simulation {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
        if tuning != self.tuning {
            self.tuning_changed = true;
        }
        self.tuning = tuning;
        if present_mode_index != self.present_mode_index {
            self.present_mode_changed = true;
        }
        self.present_mode_index = present_mode_index;

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_w, screen_h],
            pixels_per_point,
        };

        (clipped_primitives, full_output.textures_delta, screen_descriptor)
    }

    /// Upload egui textures and buffers. Call before the egui render pass.
    pub fn prepare_egui(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::epaint::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor)
    }

    /// Render egui into the given render pass.
    pub fn render_egui(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::epaint::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for &id in &textures_delta.free {
            self.egui_renderer.free_texture(&id);
        }
    }
}

// ---------------------------------------------------------------------------
// UI snapshot + free-function draw (avoids borrow conflicts with egui_ctx)
// ---------------------------------------------------------------------------

struct UiSnapshot {
    visible: bool,
    title: String,
    fps: f64,
    frame_time_avg: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frame_times: Vec<f64>,
    phase_durations: [f64; 4],
    phase_total_us: f64,
    pet: PetStats,
    tick_count: u64,
}

fn draw_ui(
    ctx: &egui::Context,
    s: &UiSnapshot,
    paused: &mut bool,
    tuning: &mut Tuning,
    present_mode_index: &mut usize,
) {
    egui::Area::new(egui::Id::new("title"))
        .anchor(TITLE_ANCHOR, TITLE_OFFSET)
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(&s.title)
                    .size(32.0)
                    .strong()
                    .color(egui::Color32::from_rgb(191, 219, 254)),
            );
        });

    if !s.visible {
        return;
    }

    let panel_frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(20, 20, 20, 220))
        .corner_radius(6.0)
        .inner_margin(10.0);

    egui::Window::new("Debug")
        .default_pos(PANEL_POS)
        .default_width(320.0)
        .resizable(true)
        .frame(panel_frame)
        .show(ctx, |ui| {
            ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(220));

            // --- Performance ---
            ui.heading("Performance");
            ui.label(format!("FPS: {:.1}", s.fps));
            ui.label(format!(
                "Frame: {:.2}ms avg | {:.2} min | {:.2} max",
                s.frame_time_avg * 1000.0,
                s.frame_time_min * 1000.0,
                s.frame_time_max * 1000.0,
            ));
            ui.add_space(4.0);

            // --- Frame time histogram ---
            ui.heading("Frame Time History");
            if !s.frame_times.is_empty() {
                let max_time = s
                    .frame_times
                    .iter()
                    .copied()
                    .fold(0.0f64, f64::max)
                    .max(0.020);

                let (response, painter) =
                    ui.allocate_painter(egui::vec2(300.0, 60.0), egui::Sense::hover());
                let rect = response.rect;

                let bar_width = rect.width() / s.frame_times.len() as f32;
                let target_y = rect.bottom() - (FRAME_BUDGET / max_time) as f32 * rect.height();

                for (i, &t) in s.frame_times.iter().enumerate() {
                    let h = (t / max_time) as f32 * rect.height();
                    let x = rect.left() + i as f32 * bar_width;
                    let color = if t > FRAME_BUDGET {
                        egui::Color32::from_rgb(255, 100, 80)
                    } else {
                        egui::Color32::from_rgb(80, 200, 120)
                    };
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(x, rect.bottom() - h),
                            egui::pos2(x + bar_width - 1.0, rect.bottom()),
                        ),
                        0.0,
                        color,
                    );
                }

                painter.line_segment(
                    [
                        egui::pos2(rect.left(), target_y),
                        egui::pos2(rect.right(), target_y),
                    ],
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(255, 255, 100)),
                );
            }
            ui.add_space(4.0);

            // --- Phase timers ---
            ui.heading("Frame Phases");
            let total = s.phase_total_us.max(1.0);
            let max_us = s
                .phase_durations
                .iter()
                .copied()
                .fold(0.0f64, f64::max)
                .max(1.0);

            for phase in FramePhase::ALL {
                let us = s.phase_durations[phase as usize];
                let pct = us / total * 100.0;
                let bar_frac = (us / max_us) as f32;

                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(format!("{:<12}", phase.label())).monospace());
                    ui.label(
                        egui::RichText::new(format!("{:>5.0}us ({:>2.0}%)", us, pct)).monospace(),
                    );

                    let (response, painter) =
                        ui.allocate_painter(egui::vec2(80.0, 12.0), egui::Sense::hover());
                    let r = response.rect;
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            r.left_top(),
                            egui::pos2(r.left() + r.width() * bar_frac, r.bottom()),
                        ),
                        2.0,
                        egui::Color32::from_rgb(100, 180, 255),
                    );
                });
            }
            ui.label(
                egui::RichText::new(format!(
                    "Total: {:.0}us ({:.2}ms)",
                    s.phase_total_us,
                    s.phase_total_us / 1000.0
                ))
                .monospace(),
            );
            ui.add_space(4.0);

            // --- Pet ---
            ui.heading("Pet");
            let p = &s.pet;
            ui.label(format!(
                "Mood: {}{}",
                p.mood.label(),
                if p.dragging { " (held)" } else { "" }
            ));
            ui.label(format!(
                "Dist: {:.1}px | Speed: {:.2}px/tick | Stretch: {:.3}",
                p.distance, p.speed, p.stretch
            ));
            ui.label(format!("Blink every {:.2}s", p.blink_interval));
            ui.label(format!("Sparkles: {}", p.sparkles));
            ui.add_space(4.0);

            // --- Controls ---
            ui.heading("Controls");
            ui.checkbox(paused, "Pause Simulation");
            ui.checkbox(&mut tuning.muted, "Mute");
            ui.horizontal(|ui| {
                ui.label("Spring:");
                ui.add(egui::Slider::new(&mut tuning.spring, 0.005..=0.2));
            });
            ui.horizontal(|ui| {
                ui.label("Friction:");
                ui.add(egui::Slider::new(&mut tuning.friction, 0.5..=1.0));
            });
            ui.horizontal(|ui| {
                ui.label("Drag snap:");
                ui.add(egui::Slider::new(&mut tuning.drag_snap, 0.05..=1.0));
            });

            ui.horizontal(|ui| {
                ui.label("Present:");
                egui::ComboBox::from_id_salt("present_mode")
                    .selected_text(PRESENT_MODE_LABELS[*present_mode_index])
                    .show_ui(ui, |ui| {
                        for (i, label) in PRESENT_MODE_LABELS.iter().enumerate() {
                            ui.selectable_value(present_mode_index, i, *label);
                        }
                    });
            });
            ui.add_space(4.0);

            // --- Info ---
            ui.heading("Info");
            ui.label(format!(
                "Sim time: {:.1}s | Ticks: {}",
                s.pet.sim_time, s.tick_count
            ));
            ui.label("F12: Toggle | ESC: Quit");
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuning_round_trips_through_physics() {
        let mut physics = PhysicsConfig::default();
        let mut tuning = Tuning::new(&physics, false);
        tuning.spring = 0.1;
        tuning.drag_snap = 0.9;
        tuning.apply(&mut physics);
        assert_eq!(physics.spring, 0.1);
        assert_eq!(physics.drag_snap, 0.9);
        assert_eq!(physics.friction, PhysicsConfig::default().friction);
        assert_eq!(Tuning::new(&physics, false), tuning);
    }

    #[test]
    fn caption_is_inset_top_left() {
        assert_eq!(TITLE_ANCHOR, egui::Align2::LEFT_TOP);
        assert_eq!(TITLE_OFFSET, [32.0, 32.0]);
        // Caption is 32 px text; the panel must start below it.
        assert!(PANEL_POS[1] > TITLE_OFFSET[1] + 32.0);
    }

    #[test]
    fn present_mode_lookup() {
        assert_eq!(present_mode_index(wgpu::PresentMode::Mailbox), 0);
        assert_eq!(present_mode_index(wgpu::PresentMode::Fifo), 1);
        assert_eq!(present_mode_index(wgpu::PresentMode::AutoVsync), 1);
    }
}
