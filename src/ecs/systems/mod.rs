pub mod sparkle;

/// Scratch buffers reused across ticks so the hot path never allocates.
pub struct SystemBuffers {
    pub dead: Vec<hecs::Entity>,
}

impl SystemBuffers {
    pub fn new(capacity: usize) -> Self {
        Self {
            dead: Vec::with_capacity(capacity),
        }
    }
}

/// Run all entity systems for one fixed tick.
pub fn tick(world: &mut hecs::World, now: f64, bufs: &mut SystemBuffers) {
    sparkle::update(world, now, &mut bufs.dead);
}
