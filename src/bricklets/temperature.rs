use super::{impl_device, DeviceCore};
use crate::Error;

pub const FUNCTION_GET_TEMPERATURE: u8 = 1;
pub const FUNCTION_SET_TEMPERATURE_CALLBACK_PERIOD: u8 = 2;
pub const FUNCTION_GET_TEMPERATURE_CALLBACK_PERIOD: u8 = 3;
pub const CALLBACK_TEMPERATURE: u8 = 8;

#[derive(Clone)]
pub struct TemperatureBricklet {
    core: DeviceCore,
}

impl_device!(TemperatureBricklet, 216, "Temperature Bricklet");

impl TemperatureBricklet {
    /// Temperature in hundredths of a degree Celsius.
    pub fn get_temperature(&self) -> Result<i16, Error> {
        self.core
            .get(FUNCTION_GET_TEMPERATURE, &[], 2, |payload| payload.i16())
    }

    /// Push a reading every `period_ms` while it changes. Zero turns the
    /// callback off.
    pub fn set_temperature_callback_period(&self, period_ms: u32) -> Result<(), Error> {
        self.core.set(
            FUNCTION_SET_TEMPERATURE_CALLBACK_PERIOD,
            &period_ms.to_le_bytes(),
            true,
        )
    }

    pub fn get_temperature_callback_period(&self) -> Result<u32, Error> {
        self.core.get(
            FUNCTION_GET_TEMPERATURE_CALLBACK_PERIOD,
            &[],
            4,
            |payload| payload.u32(),
        )
    }

    pub fn on_temperature(&self, handler: impl Fn(i16) + Send + Sync + 'static) {
        self.core
            .on(CALLBACK_TEMPERATURE, 2, |payload| payload.i16(), handler);
    }
}
