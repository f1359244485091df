use std::sync::Arc;

use log::{error, info};

use crate::app::{Climate, HUMIDITY_LINE, ILLUMINANCE_LINE, TEMPERATURE_LINE};
use crate::bricklets::{
    AmbientLightBricklet, Device, DualButtonBricklet, HumidityBricklet, Lcd20x4Bricklet,
    TemperatureBricklet,
};
use crate::format::{self, TemperatureUnit};
use crate::{Config, Error, IpConnection};

pub type OfficeClimate = Climate<Lcd20x4Bricklet, TemperatureBricklet, DualButtonBricklet>;

/// The five bricklets on one connection.
pub struct Station {
    config: Config,
    ipcon: IpConnection,
    lcd: Lcd20x4Bricklet,
    temperature: TemperatureBricklet,
    humidity: HumidityBricklet,
    ambient_light: AmbientLightBricklet,
    dual_button: DualButtonBricklet,
    climate: Arc<OfficeClimate>,
}

fn log_failure(what: &str, result: Result<(), Error>) {
    if let Err(e) = result {
        error!("{what} failed: {e}");
    }
}

fn verify<D: Device>(device: &D) -> Result<(), Error> {
    let identity = device.verify_identity()?;
    let [major, minor, patch] = identity.firmware_version;
    info!(
        "Found {} {} at position {} (firmware {major}.{minor}.{patch})",
        D::DEVICE_DISPLAY_NAME,
        identity.uid,
        identity.position,
    );
    Ok(())
}

impl Station {
    /// Set up proxies for the configured UIDs. Nothing is sent yet.
    pub fn new(config: Config) -> Result<Self, Error> {
        let ipcon = IpConnection::new(config.timeout());
        let lcd = Lcd20x4Bricklet::new(&config.uids.lcd, &ipcon)?;
        let temperature = TemperatureBricklet::new(&config.uids.temperature, &ipcon)?;
        let humidity = HumidityBricklet::new(&config.uids.humidity, &ipcon)?;
        let ambient_light = AmbientLightBricklet::new(&config.uids.ambient_light, &ipcon)?;
        let dual_button = DualButtonBricklet::new(&config.uids.dual_button, &ipcon)?;
        let climate = Arc::new(Climate::new(
            lcd.clone(),
            temperature.clone(),
            dual_button.clone(),
        ));

        Ok(Self {
            config,
            ipcon,
            lcd,
            temperature,
            humidity,
            ambient_light,
            dual_button,
            climate,
        })
    }

    pub fn climate(&self) -> &Arc<OfficeClimate> {
        &self.climate
    }

    pub fn connection(&self) -> &IpConnection {
        &self.ipcon
    }

    /// Connect, draw every line once, then hand over to the callbacks.
    ///
    /// Fails if the hub is unreachable or a UID belongs to the wrong kind of
    /// device. Anything that goes wrong after that is only logged.
    pub fn start(&self) -> Result<(), Error> {
        self.ipcon.connect(&self.config.host, self.config.port)?;

        verify(&self.lcd)?;
        verify(&self.temperature)?;
        verify(&self.humidity)?;
        verify(&self.ambient_light)?;
        verify(&self.dual_button)?;

        log_failure("Backlight on", self.lcd.backlight_on());
        log_failure("Clearing display", self.lcd.clear_display());
        log_failure(
            "Uploading degree sign",
            self.lcd
                .set_custom_character(format::DEGREE_SIGN_INDEX, format::DEGREE_SIGN),
        );

        self.climate.select_unit(TemperatureUnit::Celsius);
        self.climate.refresh_temperature();
        match self.humidity.get_humidity() {
            Ok(raw) => self.climate.on_humidity(raw),
            Err(e) => error!("Reading humidity failed: {e}"),
        }
        match self.ambient_light.get_illuminance() {
            Ok(raw) => self.climate.on_illuminance(raw),
            Err(e) => error!("Reading illuminance failed: {e}"),
        }
        self.climate.show_footer(&self.config.footer);

        self.register_handlers();

        let period = self.config.callback_period_ms;
        log_failure(
            "Setting temperature callback period",
            self.temperature.set_temperature_callback_period(period),
        );
        log_failure(
            "Setting humidity callback period",
            self.humidity.set_humidity_callback_period(period),
        );
        log_failure(
            "Setting illuminance callback period",
            self.ambient_light.set_illuminance_callback_period(period),
        );
        info!("Updating every {period} ms");
        Ok(())
    }

    fn register_handlers(&self) {
        let climate = Arc::clone(&self.climate);
        self.temperature
            .on_temperature(move |raw| climate.on_temperature(raw));

        let climate = Arc::clone(&self.climate);
        self.humidity.on_humidity(move |raw| climate.on_humidity(raw));

        let climate = Arc::clone(&self.climate);
        self.ambient_light
            .on_illuminance(move |raw| climate.on_illuminance(raw));

        let climate = Arc::clone(&self.climate);
        self.dual_button
            .on_state_changed(move |event| climate.on_state_changed(event));
    }

    /// Blank the sensor lines and disconnect.
    pub fn stop(&self) -> Result<(), Error> {
        for line in [TEMPERATURE_LINE, HUMIDITY_LINE, ILLUMINANCE_LINE] {
            self.climate.display().blank(line);
        }
        self.ipcon.disconnect()
    }
}
