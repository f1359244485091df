use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, bon::Builder)]
#[serde(default)]
pub struct Uids {
    #[builder(into, default = "ocV".to_owned())]
    pub lcd: String,
    #[builder(into, default = "q9U".to_owned())]
    pub temperature: String,
    #[builder(into, default = "nxe".to_owned())]
    pub humidity: String,
    #[builder(into, default = "mrz".to_owned())]
    pub dual_button: String,
    #[builder(into, default = "mfx".to_owned())]
    pub ambient_light: String,
}

impl Default for Uids {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Where the hub daemon listens and which bricklets to talk to.
///
/// Every key is optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, bon::Builder)]
#[serde(default)]
pub struct Config {
    #[builder(into, default = "localhost".to_owned())]
    pub host: String,
    #[builder(default = 4223)]
    pub port: u16,
    #[builder(default = 2500)]
    pub timeout_ms: u64,
    #[builder(default = 1000)]
    pub callback_period_ms: u32,
    #[builder(into, default = "Office Climate".to_owned())]
    pub footer: String,
    #[builder(default)]
    pub uids: Uids,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Config {
    /// Read a TOML file, or fall back to the defaults without one.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::parse(&std::fs::read_to_string(path)?),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(toml: &str) -> Result<Self, Error> {
        Ok(toml::from_str(toml)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
