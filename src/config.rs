use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BubblesError, Result};

/// Config file picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "bubbles.toml";

/// Top-level configuration. Every section and field falls back to its default,
/// so an empty file is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub physics: PhysicsConfig,
    pub mood: MoodConfig,
    pub sound: SoundConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub always_on_top: bool,
    /// Clear color as 0xRRGGBB.
    pub background: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Bubbles".to_string(),
            width: 1280,
            height: 800,
            always_on_top: false,
            background: 0x1E2A44,
        }
    }
}

/// Follow/drag integrator coefficients. Applied once per simulation tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Acceleration per pixel of displacement.
    pub spring: f32,
    /// Velocity multiplier per tick.
    pub friction: f32,
    /// Fraction of the remaining displacement covered per tick while dragged.
    pub drag_snap: f32,
    /// Speed (px/tick) that maps to a stretch of 1.0.
    pub stretch_divisor: f32,
    /// Upper bound on stretch.
    pub max_stretch: f32,
    /// How long the release squash is held (seconds).
    pub bounce_secs: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            spring: 0.04,
            friction: 0.88,
            drag_snap: 0.4,
            stretch_divisor: 100.0,
            max_stretch: 0.2,
            bounce_secs: 0.15,
        }
    }
}

/// Mood thresholds. Distances in pixels, times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodConfig {
    pub sleepy_after_secs: f64,
    pub happy_min_dist: f32,
    pub happy_max_dist: f32,
    pub idle_dist: f32,
    pub blink_min_secs: f64,
    pub blink_max_secs: f64,
    pub blink_duration_secs: f64,
    /// Max pointer travel between press and release that still counts as a click.
    pub click_slop: f32,
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            sleepy_after_secs: 4.0,
            happy_min_dist: 5.0,
            happy_max_dist: 40.0,
            idle_dist: 150.0,
            blink_min_secs: 3.0,
            blink_max_secs: 7.0,
            blink_duration_secs: 0.15,
            click_slop: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub enabled: bool,
    /// Master volume in [0, 1].
    pub volume: f32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Show the F12 overlay on startup.
    pub overlay: bool,
    /// Fixed seed for the blink RNG. Random when unset.
    pub seed: Option<u64>,
}

impl Config {
    /// Resolve the config: explicit path (must exist), else `bubbles.toml` in
    /// the working directory if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(&local);
        }

        log::info!("No {DEFAULT_CONFIG_FILE} found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| BubblesError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| BubblesError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values that would make the integrator or the window nonsensical.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(BubblesError::ConfigInvalid(msg.to_string()));

        if self.window.width == 0 || self.window.height == 0 {
            return fail("window.width and window.height must be positive");
        }
        let p = &self.physics;
        if p.spring <= 0.0 {
            return fail("physics.spring must be > 0");
        }
        if !(p.friction > 0.0 && p.friction <= 1.0) {
            return fail("physics.friction must be in (0, 1]");
        }
        if !(p.drag_snap > 0.0 && p.drag_snap <= 1.0) {
            return fail("physics.drag_snap must be in (0, 1]");
        }
        if p.stretch_divisor <= 0.0 {
            return fail("physics.stretch_divisor must be > 0");
        }
        if !(0.0..1.0).contains(&p.max_stretch) {
            return fail("physics.max_stretch must be in [0, 1)");
        }
        if p.bounce_secs < 0.0 {
            return fail("physics.bounce_secs must be >= 0");
        }
        let m = &self.mood;
        if m.happy_min_dist >= m.happy_max_dist {
            return fail("mood.happy_min_dist must be below mood.happy_max_dist");
        }
        if m.idle_dist < m.happy_max_dist {
            return fail("mood.idle_dist must not be below mood.happy_max_dist");
        }
        if m.sleepy_after_secs <= 0.0 {
            return fail("mood.sleepy_after_secs must be > 0");
        }
        if m.blink_min_secs <= 0.0 || m.blink_min_secs > m.blink_max_secs {
            return fail("mood.blink_min_secs must be > 0 and <= mood.blink_max_secs");
        }
        if !(0.0..=1.0).contains(&self.sound.volume) {
            return fail("sound.volume must be in [0, 1]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        config.validate().unwrap();
    }

    #[test]
    fn defaults_survive_toml_round_trip() {
        let text = toml::to_string(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, Config::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [physics]
            spring = 0.08

            [sound]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.physics.spring, 0.08);
        assert_eq!(config.physics.friction, 0.88);
        assert!(!config.sound.enabled);
        assert_eq!(config.mood, MoodConfig::default());
    }

    #[test]
    fn rejects_friction_above_one() {
        let mut config = Config::default();
        config.physics.friction = 1.5;
        assert!(matches!(config.validate(), Err(BubblesError::ConfigInvalid(_))));
    }

    #[test]
    fn rejects_inverted_happy_band() {
        let mut config = Config::default();
        config.mood.happy_min_dist = 50.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_loud_volume() {
        let mut config = Config::default();
        config.sound.volume = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_explicit_file_is_read_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, BubblesError::ConfigRead { .. }));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let path = std::env::temp_dir().join(format!("bubbles-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[physics\nspring = ").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, BubblesError::ConfigParse { .. }));
    }
}
