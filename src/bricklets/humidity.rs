use super::{impl_device, DeviceCore};
use crate::Error;

pub const FUNCTION_GET_HUMIDITY: u8 = 1;
pub const FUNCTION_SET_HUMIDITY_CALLBACK_PERIOD: u8 = 3;
pub const FUNCTION_GET_HUMIDITY_CALLBACK_PERIOD: u8 = 4;
pub const CALLBACK_HUMIDITY: u8 = 13;

#[derive(Clone)]
pub struct HumidityBricklet {
    core: DeviceCore,
}

impl_device!(HumidityBricklet, 27, "Humidity Bricklet");

impl HumidityBricklet {
    /// Relative humidity in tenths of a percent.
    pub fn get_humidity(&self) -> Result<u16, Error> {
        self.core
            .get(FUNCTION_GET_HUMIDITY, &[], 2, |payload| payload.u16())
    }

    pub fn set_humidity_callback_period(&self, period_ms: u32) -> Result<(), Error> {
        self.core.set(
            FUNCTION_SET_HUMIDITY_CALLBACK_PERIOD,
            &period_ms.to_le_bytes(),
            true,
        )
    }

    pub fn get_humidity_callback_period(&self) -> Result<u32, Error> {
        self.core.get(
            FUNCTION_GET_HUMIDITY_CALLBACK_PERIOD,
            &[],
            4,
            |payload| payload.u32(),
        )
    }

    pub fn on_humidity(&self, handler: impl Fn(u16) + Send + Sync + 'static) {
        self.core
            .on(CALLBACK_HUMIDITY, 2, |payload| payload.u16(), handler);
    }
}
