//! Office climate display: temperature, humidity and illuminance bricklets
//! rendered on a 20x4 LCD bricklet, with a dual button bricklet choosing
//! between Celsius and Fahrenheit.
//!
//! Devices are reached through the hub daemon's TCP protocol.

pub mod app;
pub mod bricklets;
mod config;
pub mod display;
mod error;
pub mod format;
mod ipconnection;
pub mod packet;
mod station;
pub mod uid;

pub use app::Climate;
pub use config::{Config, Uids};
pub use error::Error;
pub use format::TemperatureUnit;
pub use ipconnection::{IpConnection, DEFAULT_TIMEOUT};
pub use station::{OfficeClimate, Station};
