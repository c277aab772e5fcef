//! Sound effects for pet reactions.
//!
//! Playback is fire-and-forget: nothing here returns an error to the caller.
//! A failed cue is logged and dropped.

use crate::config::SoundConfig;

/// One of the pet's reaction sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Sleepy,
    Hover,
    Drag,
    Pop,
    Click,
}

impl Cue {
    /// Tone sequence as (frequency Hz, duration ms, relative volume).
    #[cfg(any(test, feature = "audio"))]
    pub fn tones(self) -> &'static [(f32, u64, f32)] {
        match self {
            // Slow descending yawn
            Cue::Sleepy => &[(523.0, 180, 0.5), (440.0, 200, 0.4), (349.0, 260, 0.3)],
            // Quick rising chirp
            Cue::Hover => &[(880.0, 40, 0.5), (1175.0, 40, 0.6), (1568.0, 60, 0.5)],
            // Low grab blip
            Cue::Drag => &[(330.0, 50, 0.6), (392.0, 60, 0.5)],
            // Bubble pop
            Cue::Pop => &[(1046.0, 30, 0.7), (659.0, 50, 0.4)],
            // Tiny tick
            Cue::Click => &[(1760.0, 25, 0.5)],
        }
    }
}

/// The capability the pet controller plays its reactions through.
pub trait SoundBoard {
    fn play(&mut self, cue: Cue);

    fn play_sleepy(&mut self) {
        self.play(Cue::Sleepy);
    }

    fn play_hover(&mut self) {
        self.play(Cue::Hover);
    }

    fn play_drag(&mut self) {
        self.play(Cue::Drag);
    }

    fn play_pop(&mut self) {
        self.play(Cue::Pop);
    }

    fn play_click(&mut self) {
        self.play(Cue::Click);
    }
}

/// Backend that only logs. Used when muted, when built without `audio`,
/// or when no output device could be opened.
pub struct SilentSounds;

impl SoundBoard for SilentSounds {
    fn play(&mut self, cue: Cue) {
        log::trace!("sound (silent): {cue:?}");
    }
}

/// Synthesized tones through rodio, one detached sink per cue.
#[cfg(feature = "audio")]
pub struct RodioSounds {
    // Dropping the stream stops all playback, so it lives as long as we do.
    _stream: rodio::OutputStream,
    handle: rodio::OutputStreamHandle,
    volume: f32,
}

#[cfg(feature = "audio")]
impl RodioSounds {
    pub fn new(volume: f32) -> Result<Self, rodio::StreamError> {
        let (stream, handle) = rodio::OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            volume,
        })
    }
}

#[cfg(feature = "audio")]
impl SoundBoard for RodioSounds {
    fn play(&mut self, cue: Cue) {
        use rodio::Source;
        use std::time::Duration;

        let sink = match rodio::Sink::try_new(&self.handle) {
            Ok(sink) => sink,
            Err(e) => {
                log::debug!("dropping {cue:?}: {e}");
                return;
            }
        };
        sink.set_volume(self.volume);
        for &(freq, ms, vol) in cue.tones() {
            let tone = rodio::source::SineWave::new(freq)
                .take_duration(Duration::from_millis(ms))
                .amplify(vol)
                .fade_in(Duration::from_millis(5));
            sink.append(tone);
        }
        sink.detach();
        log::trace!("sound: {cue:?}");
    }
}

/// Mute gate in front of whichever backend is active.
pub struct Sounds {
    backend: Box<dyn SoundBoard>,
    pub enabled: bool,
}

impl Sounds {
    /// Open the best available backend for this build and config.
    pub fn open(config: &SoundConfig) -> Self {
        Self {
            backend: open_backend(config),
            enabled: config.enabled,
        }
    }

    #[cfg(test)]
    pub fn with_backend(backend: Box<dyn SoundBoard>, enabled: bool) -> Self {
        Self { backend, enabled }
    }
}

impl SoundBoard for Sounds {
    fn play(&mut self, cue: Cue) {
        if self.enabled {
            self.backend.play(cue);
        }
    }
}

#[cfg(feature = "audio")]
fn open_backend(config: &SoundConfig) -> Box<dyn SoundBoard> {
    match RodioSounds::new(config.volume) {
        Ok(sounds) => {
            log::info!("Audio output opened (volume {:.2})", config.volume);
            Box::new(sounds)
        }
        Err(e) => {
            log::warn!("No audio output ({e}), continuing silently");
            Box::new(SilentSounds)
        }
    }
}

#[cfg(not(feature = "audio"))]
fn open_backend(_config: &SoundConfig) -> Box<dyn SoundBoard> {
    log::info!("Built without the `audio` feature, sound effects are silent");
    Box::new(SilentSounds)
}

/// Test double that records every cue it is asked to play.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSounds {
    pub played: Vec<Cue>,
}

#[cfg(test)]
impl RecordingSounds {
    pub fn count(&self, cue: Cue) -> usize {
        self.played.iter().filter(|&&c| c == cue).count()
    }
}

#[cfg(test)]
impl SoundBoard for RecordingSounds {
    fn play(&mut self, cue: Cue) {
        self.played.push(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Shared(Rc<RefCell<Vec<Cue>>>);

    impl SoundBoard for Shared {
        fn play(&mut self, cue: Cue) {
            self.0.borrow_mut().push(cue);
        }
    }

    #[test]
    fn named_methods_map_to_cues() {
        let mut rec = RecordingSounds::default();
        rec.play_sleepy();
        rec.play_hover();
        rec.play_drag();
        rec.play_pop();
        rec.play_click();
        assert_eq!(
            rec.played,
            vec![Cue::Sleepy, Cue::Hover, Cue::Drag, Cue::Pop, Cue::Click]
        );
    }

    #[test]
    fn disabled_gate_swallows_cues() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut sounds = Sounds::with_backend(Box::new(Shared(log.clone())), false);
        sounds.play_pop();
        assert!(log.borrow().is_empty());

        sounds.enabled = true;
        sounds.play_pop();
        assert_eq!(*log.borrow(), vec![Cue::Pop]);
    }

    #[test]
    fn every_cue_has_audible_tones() {
        for cue in [Cue::Sleepy, Cue::Hover, Cue::Drag, Cue::Pop, Cue::Click] {
            let tones = cue.tones();
            assert!(!tones.is_empty());
            assert!(tones.iter().all(|&(f, ms, v)| f > 20.0 && ms > 0 && v > 0.0 && v <= 1.0));
        }
    }
}
