mod app;
mod cli;
mod config;
mod controller;
mod debug;
mod ecs;
mod error;
mod input;
mod pet;
mod render;
mod sound;

use clap::Parser;

use crate::cli::Args;
use crate::config::Config;

fn main() {
    env_logger::init();
    let args = Args::parse();
    log::info!("Bubbles {} starting up", env!("CARGO_PKG_VERSION"));

    let result = Config::load(args.config.as_deref()).and_then(|mut config| {
        args.apply(&mut config);
        config.validate()?;
        app::run(config)
    });

    if let Err(e) = result {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
