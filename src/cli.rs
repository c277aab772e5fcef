use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Bubbles - a desktop pet that chases your cursor.
#[derive(Parser, Debug)]
#[command(name = "bubbles")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (defaults to ./bubbles.toml when present)
    #[arg(short = 'c', long, env = "BUBBLES_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Start with sound effects off
    #[arg(short = 'm', long)]
    pub mute: bool,

    /// Show the debug overlay on startup (toggle with F12)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Seed for the blink timer RNG
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}

impl Args {
    /// Command-line flags win over the config file.
    pub fn apply(&self, config: &mut Config) {
        if self.mute {
            config.sound.enabled = false;
        }
        if self.debug {
            config.debug.overlay = true;
        }
        if self.seed.is_some() {
            config.debug.seed = self.seed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from(["bubbles", "--mute", "--debug", "--seed", "7"]);
        let mut config = Config::default();
        args.apply(&mut config);
        assert!(!config.sound.enabled);
        assert!(config.debug.overlay);
        assert_eq!(config.debug.seed, Some(7));
    }

    #[test]
    fn no_flags_leave_config_alone() {
        let args = Args::parse_from(["bubbles"]);
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn config_path_is_parsed() {
        let args = Args::parse_from(["bubbles", "-c", "pet.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("pet.toml")));
    }
}
