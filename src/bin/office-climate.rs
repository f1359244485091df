//! Show the office climate on the LCD until Enter is pressed.
//!
//! Usage: `office-climate [CONFIG.toml]`
use std::path::PathBuf;

use anyhow::Context;
use office_climate::{Config, Station};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load {}", path.display()),
        None => "Failed to load default configuration".to_owned(),
    })?;
    let (host, port) = (config.host.clone(), config.port);

    let station = Station::new(config)?;
    station
        .start()
        .with_context(|| format!("Failed to start against {host}:{port}"))?;

    println!("Press Enter to exit");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;

    station.stop()?;
    Ok(())
}
