use glam::Vec2;

use crate::config::PhysicsConfig;

/// Squash applied the instant a drag starts.
pub const DRAG_SCALE: Vec2 = Vec2::new(1.2, 0.8);
/// Squash applied the instant a drag ends (held for the bounce duration).
pub const RELEASE_SCALE: Vec2 = Vec2::new(0.8, 1.2);

/// Pet position integrator. Only the pet's tick writes to it.
#[derive(Debug, Clone, Copy)]
pub struct Motion {
    pub pos: Vec2,
    /// Previous tick's position, for render interpolation.
    pub prev: Vec2,
    /// Pixels per tick.
    pub vel: Vec2,
}

impl Motion {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            prev: pos,
            vel: Vec2::ZERO,
        }
    }

    /// Spring toward `target`, then damp. Discrete, one step per tick.
    pub fn follow(&mut self, target: Vec2, cfg: &PhysicsConfig) {
        self.prev = self.pos;
        let accel = (target - self.pos) * cfg.spring;
        self.vel += accel;
        self.vel *= cfg.friction;
        self.pos += self.vel;
    }

    /// Cover a fixed fraction of the remaining gap. Velocity is untouched.
    pub fn snap(&mut self, target: Vec2, cfg: &PhysicsConfig) {
        self.prev = self.pos;
        self.pos += (target - self.pos) * cfg.drag_snap;
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Stretch factor from current speed, clamped to `[0, max_stretch]`.
    pub fn stretch(&self, cfg: &PhysicsConfig) -> f32 {
        (self.speed() / cfg.stretch_divisor).min(cfg.max_stretch)
    }

    /// Wide and flat in motion, round at rest.
    pub fn stretch_scale(&self, cfg: &PhysicsConfig) -> Vec2 {
        let s = self.stretch(cfg);
        Vec2::new(1.0 + s, 1.0 - s)
    }

    /// Render position between the last two ticks.
    pub fn interpolated(&self, alpha: f32) -> Vec2 {
        self.prev.lerp(self.pos, alpha.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    #[test]
    fn follow_first_step_matches_hand_math() {
        let mut m = Motion::at(Vec2::new(500.0, 500.0));
        m.follow(Vec2::new(700.0, 500.0), &cfg());
        // accel = 200 * 0.04 = 8, damped by 0.88
        assert!((m.vel.x - 7.04).abs() < 1e-4);
        assert!((m.pos.x - 507.04).abs() < 1e-3);
        assert_eq!(m.prev, Vec2::new(500.0, 500.0));
        assert_eq!(m.vel.y, 0.0);
    }

    #[test]
    fn follow_settles_on_target() {
        let target = Vec2::new(120.0, -40.0);
        let mut m = Motion::at(Vec2::ZERO);
        for _ in 0..600 {
            m.follow(target, &cfg());
        }
        assert!(m.pos.distance(target) < 0.01);
        assert!(m.speed() < 0.01);
    }

    #[test]
    fn snap_covers_forty_percent() {
        let mut m = Motion::at(Vec2::ZERO);
        m.vel = Vec2::new(3.0, 3.0);
        m.snap(Vec2::new(100.0, 50.0), &cfg());
        assert!((m.pos.x - 40.0).abs() < 1e-4);
        assert!((m.pos.y - 20.0).abs() < 1e-4);
        assert_eq!(m.vel, Vec2::new(3.0, 3.0));
    }

    #[test]
    fn stretch_is_capped() {
        let mut m = Motion::at(Vec2::ZERO);
        for v in [0.0, 5.0, 19.9, 20.0, 80.0, 10_000.0] {
            m.vel = Vec2::new(v, 0.0);
            let s = m.stretch(&cfg());
            assert!((0.0..=0.2).contains(&s), "stretch {s} for speed {v}");
        }
        m.vel = Vec2::new(0.0, 10.0);
        assert!((m.stretch(&cfg()) - 0.1).abs() < 1e-6);
        assert!((m.stretch_scale(&cfg()) - Vec2::new(1.1, 0.9)).length() < 1e-6);
    }

    #[test]
    fn interpolation_clamps_alpha() {
        let mut m = Motion::at(Vec2::ZERO);
        m.pos = Vec2::new(10.0, 0.0);
        assert_eq!(m.interpolated(0.5), Vec2::new(5.0, 0.0));
        assert_eq!(m.interpolated(3.0), Vec2::new(10.0, 0.0));
    }
}
