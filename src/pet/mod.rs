pub mod blink;
pub mod mood;
pub mod motion;

use glam::Vec2;

use crate::config::{MoodConfig, PhysicsConfig};
use crate::sound::SoundBoard;

use self::blink::BlinkTimer;
use self::mood::{classify, MoodRule};
use self::motion::{Motion, DRAG_SCALE, RELEASE_SCALE};

pub use self::mood::Mood;

/// Read-only view of the pet handed to the renderer each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PetView {
    pub pos: Vec2,
    pub mood: Mood,
    pub scale: Vec2,
    pub blinking: bool,
    /// Simulation time, drives idle wobble and Z float.
    pub time: f32,
}

/// The pet: follow physics, mood state machine, drag lifecycle and blink.
///
/// Input handlers only touch `target`, `last_move` and the drag flag.
/// Position and velocity are written by `update` alone.
pub struct Pet {
    pub physics: PhysicsConfig,
    pub moods: MoodConfig,

    target: Vec2,
    motion: Motion,
    mood: Mood,
    scale: Vec2,
    dragging: bool,
    last_move: f64,
    /// Set when the sleepy sound has played; cleared once the pointer is far.
    sleepy_latch: bool,
    /// Release squash is held until this time.
    bounce_until: Option<f64>,
    blink: BlinkTimer,
    /// Distance measured on the last tick (debug overlay).
    last_dist: f32,
    now: f64,
}

impl Pet {
    pub fn new(
        start: Vec2,
        now: f64,
        physics: PhysicsConfig,
        moods: MoodConfig,
        rng: fastrand::Rng,
    ) -> Self {
        let blink = BlinkTimer::new(rng, &moods, now, Mood::Idle);
        Self {
            physics,
            moods,
            target: start,
            motion: Motion::at(start),
            mood: Mood::Idle,
            scale: Vec2::ONE,
            dragging: false,
            last_move: now,
            sleepy_latch: false,
            bounce_until: None,
            blink,
            last_dist: 0.0,
            now,
        }
    }

    // -----------------------------------------------------------------------
    // Input side
    // -----------------------------------------------------------------------

    /// Pointer moved: new target, and the pet is no longer idle-timed-out.
    pub fn pointer_moved(&mut self, pos: Vec2, now: f64) {
        self.target = pos;
        self.last_move = now;
    }

    /// Move the target without counting as pointer activity.
    pub fn retarget(&mut self, pos: Vec2) {
        self.target = pos;
    }

    pub fn drag_start(&mut self, sounds: &mut dyn SoundBoard) {
        self.dragging = true;
        self.bounce_until = None;
        self.set_mood(Mood::Dragging);
        self.scale = DRAG_SCALE;
        sounds.play_drag();
    }

    /// End a drag. Does nothing if no drag is in progress.
    pub fn drag_end(&mut self, now: f64, sounds: &mut dyn SoundBoard) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.scale = RELEASE_SCALE;
        self.bounce_until = Some(now + self.physics.bounce_secs);
        sounds.play_pop();
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance one simulation tick at time `now`.
    pub fn update(&mut self, now: f64, sounds: &mut dyn SoundBoard) {
        self.now = now;
        let dist = self.target.distance(self.motion.pos);
        self.last_dist = dist;

        if self.dragging {
            self.motion.snap(self.target, &self.physics);
        } else {
            self.motion.follow(self.target, &self.physics);
            self.derive_mood(dist, now, sounds);
        }

        match self.bounce_until {
            Some(until) if now >= until => {
                self.scale = Vec2::ONE;
                self.bounce_until = None;
            }
            Some(_) => {}
            None if !self.dragging => {
                self.scale = self.motion.stretch_scale(&self.physics);
            }
            None => {}
        }

        self.blink.update(now, self.mood);
    }

    fn derive_mood(&mut self, dist: f32, now: f64, sounds: &mut dyn SoundBoard) {
        match classify(dist, now - self.last_move, &self.moods) {
            MoodRule::Asleep => {
                if self.set_mood(Mood::Sleepy) && !self.sleepy_latch {
                    sounds.play_sleepy();
                    self.sleepy_latch = true;
                }
            }
            MoodRule::Near => {
                if self.set_mood(Mood::Happy) {
                    sounds.play_hover();
                }
            }
            MoodRule::Far => {
                self.set_mood(Mood::Idle);
                self.sleepy_latch = false;
            }
            MoodRule::DeadZone => {
                if self.mood == Mood::Sleepy {
                    self.set_mood(Mood::Idle);
                }
            }
        }
    }

    /// Returns true when the mood actually changed.
    fn set_mood(&mut self, mood: Mood) -> bool {
        if self.mood == mood {
            return false;
        }
        log::debug!("mood: {} -> {}", self.mood.label(), mood.label());
        self.mood = mood;
        true
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    pub fn view(&self, alpha: f32) -> PetView {
        PetView {
            pos: self.motion.interpolated(alpha),
            mood: self.mood,
            scale: self.scale,
            blinking: self.blink.is_blinking(self.now),
            time: self.now as f32,
        }
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    #[cfg(test)]
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    #[cfg(test)]
    pub fn position(&self) -> Vec2 {
        self.motion.pos
    }

    pub fn velocity(&self) -> Vec2 {
        self.motion.vel
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn last_distance(&self) -> f32 {
        self.last_dist
    }

    pub fn stretch(&self) -> f32 {
        self.motion.stretch(&self.physics)
    }

    pub fn blink_interval(&self) -> f64 {
        self.blink.interval()
    }
}
