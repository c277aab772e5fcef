use crate::config::MoodConfig;

/// The pet's interaction mood. Exactly one is active per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Mood {
    #[default]
    Idle,
    Happy,
    Sleepy,
    Dragging,
}

impl Mood {
    #[cfg(test)]
    pub const ALL: [Mood; 4] = [Mood::Idle, Mood::Happy, Mood::Sleepy, Mood::Dragging];

    pub fn label(self) -> &'static str {
        match self {
            Mood::Idle => "Idle",
            Mood::Happy => "Happy",
            Mood::Sleepy => "Sleepy",
            Mood::Dragging => "Dragging",
        }
    }
}

/// Which mood rule matched this tick, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodRule {
    /// Pointer has not moved for longer than the sleepy delay.
    Asleep,
    /// Pet is hovering just off the pointer.
    Near,
    /// Pointer is far away.
    Far,
    /// Between the happy band and the far threshold (or inside the happy
    /// band's inner edge). Holds the current mood except sleepy.
    DeadZone,
}

/// Pick the rule for a non-dragging tick.
pub fn classify(dist: f32, idle_secs: f64, cfg: &MoodConfig) -> MoodRule {
    if idle_secs > cfg.sleepy_after_secs {
        MoodRule::Asleep
    } else if dist > cfg.happy_min_dist && dist < cfg.happy_max_dist {
        MoodRule::Near
    } else if dist > cfg.idle_dist {
        MoodRule::Far
    } else {
        MoodRule::DeadZone
    }
}
