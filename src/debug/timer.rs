use instant::Instant;

/// Which part of a frame is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FramePhase {
    Simulation = 0,
    BuildInstances = 1,
    GpuUpload = 2,
    Render = 3,
}

const PHASE_COUNT: usize = 4;

impl FramePhase {
    pub const ALL: [FramePhase; PHASE_COUNT] = [
        Self::Simulation,
        Self::BuildInstances,
        Self::GpuUpload,
        Self::Render,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Simulation => "Simulation",
            Self::BuildInstances => "Build Inst.",
            Self::GpuUpload => "GPU Upload",
            Self::Render => "Render",
        }
    }
}

/// Per-phase timing with exponential moving average smoothing.
pub struct PhaseTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; PHASE_COUNT],
    start: Instant,
}

const EMA_ALPHA: f64 = 0.1;

impl PhaseTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; PHASE_COUNT],
            start: Instant::now(),
        }
    }

    /// Call before a phase runs.
    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Call after a phase finishes. Records elapsed time for `phase`.
    pub fn end(&mut self, phase: FramePhase) {
        let elapsed_us = self.start.elapsed().as_secs_f64() * 1_000_000.0;
        self.record(phase, elapsed_us);
    }

    fn record(&mut self, phase: FramePhase, elapsed_us: f64) {
        let idx = phase as usize;
        self.durations_us[idx] =
            self.durations_us[idx] * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    /// Sum of all phase durations (microseconds).
    pub fn total_us(&self) -> f64 {
        self.durations_us.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_moves_toward_sample() {
        let mut t = PhaseTimers::new();
        t.record(FramePhase::Render, 100.0);
        assert!((t.durations_us[FramePhase::Render as usize] - 10.0).abs() < 1e-9);
        for _ in 0..200 {
            t.record(FramePhase::Render, 100.0);
        }
        assert!((t.durations_us[FramePhase::Render as usize] - 100.0).abs() < 1e-3);
        assert_eq!(t.durations_us[FramePhase::Simulation as usize], 0.0);
    }

    #[test]
    fn total_sums_phases() {
        let mut t = PhaseTimers::new();
        t.record(FramePhase::Simulation, 50.0);
        t.record(FramePhase::GpuUpload, 30.0);
        assert!((t.total_us() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn labels_are_distinct() {
        let mut labels: Vec<_> = FramePhase::ALL.iter().map(|p| p.label()).collect();
        labels.dedup();
        assert_eq!(labels.len(), FramePhase::ALL.len());
    }
}
