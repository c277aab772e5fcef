use glam::Vec2;

/// Screen position in window pixels.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec2);

/// A click sparkle. Identity is the creation time in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct Sparkle {
    pub id: u64,
    /// Simulation time at creation (seconds).
    pub born: f64,
    /// Cleared by the sparkle's own timer before the entity is removed.
    pub visible: bool,
}
