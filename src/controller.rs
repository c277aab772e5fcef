use glam::Vec2;

use crate::config::Config;
use crate::ecs::systems::sparkle::{self, SparkleIds, SparkleView};
use crate::ecs::systems::{self, SystemBuffers};
use crate::input::{Gesture, PointerTracker};
use crate::pet::{Pet, PetView};
use crate::sound::SoundBoard;

/// Expected live sparkles; buffers are sized for this.
const SPARKLE_CAPACITY: usize = 64;

/// Everything the renderer needs for one frame.
pub struct Frame {
    pub pet: PetView,
    /// Decorative cursor ring position (latest target).
    pub cursor: Vec2,
    pub sparkles: Vec<SparkleView>,
}

impl Frame {
    pub fn new() -> Self {
        Self {
            pet: PetView {
                pos: Vec2::ZERO,
                mood: Default::default(),
                scale: Vec2::ONE,
                blinking: false,
                time: 0.0,
            },
            cursor: Vec2::ZERO,
            sparkles: Vec::with_capacity(SPARKLE_CAPACITY),
        }
    }
}

/// Owns the simulation clock, the pet, the pointer and the sparkle list.
pub struct Controller {
    pub pet: Pet,
    pub pointer: PointerTracker,
    sparkles: hecs::World,
    sparkle_ids: SparkleIds,
    bufs: SystemBuffers,
    /// Simulation time in seconds. Advanced only by `tick`.
    now: f64,
}

impl Controller {
    pub fn new(config: &Config, start: Vec2) -> Self {
        let rng = match config.debug.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            pet: Pet::new(start, 0.0, config.physics.clone(), config.mood.clone(), rng),
            pointer: PointerTracker::new(start, config.mood.click_slop),
            sparkles: hecs::World::new(),
            sparkle_ids: SparkleIds::default(),
            bufs: SystemBuffers::new(SPARKLE_CAPACITY),
            now: 0.0,
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Apply one gesture at the current simulation time.
    pub fn handle(&mut self, gesture: Gesture, sounds: &mut dyn SoundBoard) {
        let now = self.now;
        match gesture {
            Gesture::Moved(pos) => self.pet.pointer_moved(pos, now),
            Gesture::Pressed(pos) => {
                // Presses don't reset the sleepy timer; only moves do.
                self.pet.retarget(pos);
                self.pet.drag_start(sounds);
            }
            Gesture::Released { pos, click } => {
                self.pet.drag_end(now, sounds);
                if click {
                    sounds.play_click();
                    let id = sparkle::spawn(&mut self.sparkles, &mut self.sparkle_ids, pos, now);
                    log::debug!("sparkle {id} at ({:.0}, {:.0})", pos.x, pos.y);
                }
            }
        }
    }

    /// Advance the clock by `dt` and run one simulation step.
    pub fn tick(&mut self, dt: f64, sounds: &mut dyn SoundBoard) {
        self.now += dt;
        self.pet.update(self.now, sounds);
        systems::tick(&mut self.sparkles, self.now, &mut self.bufs);
    }

    /// Fill `frame` with the current render snapshot.
    pub fn frame(&self, alpha: f32, frame: &mut Frame) {
        frame.pet = self.pet.view(alpha);
        frame.cursor = self.pet.target();
        sparkle::collect_visible(&self.sparkles, self.now, &mut frame.sparkles);
    }

    /// Live sparkle entries, including ones whose visual already hid.
    pub fn sparkle_count(&self) -> usize {
        self.sparkles.len() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::Mood;
    use crate::sound::{Cue, RecordingSounds};

    const DT: f64 = 1.0 / 60.0;

    fn controller() -> (Controller, RecordingSounds) {
        let mut config = Config::default();
        config.debug.seed = Some(1);
        (
            Controller::new(&config, Vec2::new(500.0, 500.0)),
            RecordingSounds::default(),
        )
    }

    #[test]
    fn click_spawns_sparkle_for_its_lifetime() {
        let (mut c, mut sounds) = controller();
        let mut frame = Frame::new();
        c.tick(DT, &mut sounds);

        let at = Vec2::new(320.0, 240.0);
        c.handle(Gesture::Pressed(at), &mut sounds);
        c.handle(Gesture::Released { pos: at, click: true }, &mut sounds);
        assert_eq!(
            sounds.played,
            vec![Cue::Drag, Cue::Pop, Cue::Click],
            "press, release, then click"
        );

        let clicked = c.now();
        c.frame(1.0, &mut frame);
        assert_eq!(frame.sparkles.len(), 1);
        assert_eq!(frame.sparkles[0].pos, at);

        while c.now() < clicked + 0.55 {
            c.tick(DT, &mut sounds);
        }
        c.frame(1.0, &mut frame);
        assert_eq!(frame.sparkles.len(), 1);

        while c.now() < clicked + 0.65 {
            c.tick(DT, &mut sounds);
        }
        c.frame(1.0, &mut frame);
        assert!(frame.sparkles.is_empty());
        assert_eq!(c.sparkle_count(), 1);

        while c.now() < clicked + 1.05 {
            c.tick(DT, &mut sounds);
        }
        assert_eq!(c.sparkle_count(), 0);
    }

    #[test]
    fn drag_release_without_click_spawns_nothing() {
        let (mut c, mut sounds) = controller();
        c.handle(Gesture::Pressed(Vec2::new(500.0, 500.0)), &mut sounds);
        c.handle(Gesture::Moved(Vec2::new(700.0, 500.0)), &mut sounds);
        c.tick(DT, &mut sounds);
        assert_eq!(c.pet.mood(), Mood::Dragging);
        c.handle(
            Gesture::Released {
                pos: Vec2::new(700.0, 500.0),
                click: false,
            },
            &mut sounds,
        );
        assert_eq!(c.sparkle_count(), 0);
        assert_eq!(sounds.count(Cue::Click), 0);
        assert_eq!(sounds.count(Cue::Pop), 1);
    }

    #[test]
    fn press_retargets_pet() {
        let (mut c, mut sounds) = controller();
        c.handle(Gesture::Pressed(Vec2::new(100.0, 100.0)), &mut sounds);
        let mut frame = Frame::new();
        c.frame(1.0, &mut frame);
        assert_eq!(frame.cursor, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn click_in_place_does_not_wake_sleepy_pet() {
        let (mut c, mut sounds) = controller();
        while c.now() < 4.5 {
            c.tick(DT, &mut sounds);
        }
        assert_eq!(c.pet.mood(), Mood::Sleepy);

        if let Some(g) = c.pointer.mouse_button(true) {
            c.handle(g, &mut sounds);
        }
        if let Some(g) = c.pointer.mouse_button(false) {
            c.handle(g, &mut sounds);
        }
        c.tick(DT, &mut sounds);
        assert_eq!(c.pet.mood(), Mood::Sleepy);
        assert_eq!(sounds.count(Cue::Sleepy), 1, "latched, no second yawn");
    }

    #[test]
    fn tracker_and_controller_end_to_end() {
        let (mut c, mut sounds) = controller();
        let g = c.pointer.cursor_moved(Vec2::new(505.0, 500.0));
        c.handle(g, &mut sounds);
        if let Some(g) = c.pointer.mouse_button(true) {
            c.handle(g, &mut sounds);
        }
        if let Some(g) = c.pointer.mouse_button(false) {
            c.handle(g, &mut sounds);
        }
        assert_eq!(c.sparkle_count(), 1);
    }

    #[test]
    fn frame_interpolates_between_ticks() {
        let (mut c, mut sounds) = controller();
        c.handle(Gesture::Moved(Vec2::new(700.0, 500.0)), &mut sounds);
        c.tick(DT, &mut sounds);
        let mut frame = Frame::new();
        c.frame(0.0, &mut frame);
        assert_eq!(frame.pet.pos, Vec2::new(500.0, 500.0));
        c.frame(1.0, &mut frame);
        assert_eq!(frame.pet.pos, c.pet.position());
    }
}
