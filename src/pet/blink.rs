use super::mood::Mood;
use crate::config::MoodConfig;

/// Randomized blink timer.
///
/// Fires every `interval` seconds, where `interval` is drawn from
/// `[blink_min_secs, blink_max_secs]`. Each firing opens a short blink
/// window unless the pet is sleepy. A mood change throws the interval away
/// and draws a new one starting from the change.
pub struct BlinkTimer {
    rng: fastrand::Rng,
    min: f64,
    max: f64,
    duration: f64,
    interval: f64,
    next_at: f64,
    blink_until: f64,
    mood: Mood,
}

impl BlinkTimer {
    pub fn new(rng: fastrand::Rng, cfg: &MoodConfig, now: f64, mood: Mood) -> Self {
        let mut timer = Self {
            rng,
            min: cfg.blink_min_secs,
            max: cfg.blink_max_secs,
            duration: cfg.blink_duration_secs,
            interval: cfg.blink_min_secs,
            next_at: now,
            blink_until: f64::NEG_INFINITY,
            mood,
        };
        timer.restart(now);
        timer
    }

    fn restart(&mut self, now: f64) {
        self.interval = self.min + self.rng.f64() * (self.max - self.min);
        self.next_at = now + self.interval;
    }

    /// Advance to `now`. Call once per tick after the mood is settled.
    pub fn update(&mut self, now: f64, mood: Mood) {
        if mood != self.mood {
            self.mood = mood;
            self.restart(now);
            return;
        }

        if now >= self.next_at {
            if mood != Mood::Sleepy {
                self.blink_until = now + self.duration;
            }
            self.next_at += self.interval;
            // Long stall (paused, dragged window): don't fire a backlog.
            if self.next_at <= now {
                self.next_at = now + self.interval;
            }
        }
    }

    pub fn is_blinking(&self, now: f64) -> bool {
        now < self.blink_until
    }

    /// Current period, for the debug overlay.
    pub fn interval(&self) -> f64 {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    fn timer(seed: u64) -> BlinkTimer {
        BlinkTimer::new(
            fastrand::Rng::with_seed(seed),
            &MoodConfig::default(),
            0.0,
            Mood::Idle,
        )
    }

    #[test]
    fn interval_within_bounds() {
        for seed in 0..50 {
            let t = timer(seed);
            assert!((3.0..=7.0).contains(&t.interval()), "seed {seed}: {}", t.interval());
        }
    }

    #[test]
    fn blinks_once_per_interval_for_150ms() {
        let mut t = timer(1);
        let first = t.interval();
        let mut now = 0.0;
        let mut blink_started = None;
        while now < first + 0.5 {
            now += DT;
            t.update(now, Mood::Idle);
            if t.is_blinking(now) && blink_started.is_none() {
                blink_started = Some(now);
            }
        }
        let started = blink_started.expect("should have blinked");
        assert!(started >= first && started < first + DT * 1.5);
        assert!(t.is_blinking(started + 0.1));
        assert!(!t.is_blinking(started + 0.16));
    }

    #[test]
    fn never_blinks_while_sleepy() {
        let mut t = timer(2);
        let mut now = 0.0;
        t.update(now, Mood::Sleepy);
        while now < 30.0 {
            now += DT;
            t.update(now, Mood::Sleepy);
            assert!(!t.is_blinking(now));
        }
    }

    #[test]
    fn mood_change_resets_phase() {
        let mut t = timer(3);
        let first = t.interval();
        // Change mood just before the first blink would fire.
        let change_at = first - 0.05;
        t.update(change_at, Mood::Happy);
        t.update(first + 0.01, Mood::Happy);
        assert!(!t.is_blinking(first + 0.01));
        // Next blink is a full new interval after the change.
        let mut now = first + 0.01;
        while !t.is_blinking(now) {
            now += DT;
            t.update(now, Mood::Happy);
        }
        assert!(now >= change_at + t.interval() - 1e-9);
    }

    #[test]
    fn stall_does_not_fire_backlog() {
        let mut t = timer(4);
        t.update(100.0, Mood::Idle);
        assert!(t.is_blinking(100.0));
        t.update(100.0 + DT, Mood::Idle);
        t.update(100.2, Mood::Idle);
        assert!(!t.is_blinking(100.2));
    }
}
