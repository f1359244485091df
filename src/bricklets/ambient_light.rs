use super::{impl_device, DeviceCore};
use crate::Error;

pub const FUNCTION_GET_ILLUMINANCE: u8 = 1;
pub const FUNCTION_SET_ILLUMINANCE_CALLBACK_PERIOD: u8 = 3;
pub const FUNCTION_GET_ILLUMINANCE_CALLBACK_PERIOD: u8 = 4;
pub const CALLBACK_ILLUMINANCE: u8 = 13;

#[derive(Clone)]
pub struct AmbientLightBricklet {
    core: DeviceCore,
}

impl_device!(AmbientLightBricklet, 21, "Ambient Light Bricklet");

impl AmbientLightBricklet {
    /// Illuminance in tenths of a lux.
    pub fn get_illuminance(&self) -> Result<u16, Error> {
        self.core
            .get(FUNCTION_GET_ILLUMINANCE, &[], 2, |payload| payload.u16())
    }

    pub fn set_illuminance_callback_period(&self, period_ms: u32) -> Result<(), Error> {
        self.core.set(
            FUNCTION_SET_ILLUMINANCE_CALLBACK_PERIOD,
            &period_ms.to_le_bytes(),
            true,
        )
    }

    pub fn get_illuminance_callback_period(&self) -> Result<u32, Error> {
        self.core.get(
            FUNCTION_GET_ILLUMINANCE_CALLBACK_PERIOD,
            &[],
            4,
            |payload| payload.u32(),
        )
    }

    pub fn on_illuminance(&self, handler: impl Fn(u16) + Send + Sync + 'static) {
        self.core
            .on(CALLBACK_ILLUMINANCE, 2, |payload| payload.u16(), handler);
    }
}
