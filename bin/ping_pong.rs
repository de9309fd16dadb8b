//! Ping-pong executor.

use std::env;

use pingpong::{ConsoleSink, GameConfig, SinkWrapper};

/// Accepts optional argument from the command line.
/// * config_file: json game config, defaults are used without it
fn main() -> Result<(), String> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = env::args().collect::<Vec<String>>();
    if args.len() > 2 {
        return Err(format!("Usage: {} [config_file]", args[0]));
    }

    let config = match args.get(1) {
        Some(file) => GameConfig::from_file(file).map_err(|info| info.to_string())?,
        None => GameConfig::default(),
    };

    let sink = SinkWrapper::new(ConsoleSink::new(config.format));
    pingpong::run(&config, sink)
        .and_then(|outcome| outcome.into_result())
        .map(|_| ())
        .map_err(|info| info.to_string())
}
