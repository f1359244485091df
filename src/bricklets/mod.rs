//! Proxies for the bricklets attached to the hub.

use log::warn;

use crate::packet::{Payload, Request};
use crate::{uid, Error, IpConnection};

pub mod ambient_light;
pub mod dual_button;
pub mod humidity;
pub mod lcd_20x4;
pub mod temperature;

pub use ambient_light::AmbientLightBricklet;
pub use dual_button::{ButtonState, DualButtonBricklet, LedState, StateChanged};
pub use humidity::HumidityBricklet;
pub use lcd_20x4::Lcd20x4Bricklet;
pub use temperature::TemperatureBricklet;

pub const FUNCTION_GET_IDENTITY: u8 = 255;

mod sealed {
    pub trait Sealed {}
}

/// What every device reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub connected_uid: String,
    pub position: char,
    pub hardware_version: [u8; 3],
    pub firmware_version: [u8; 3],
    pub device_identifier: u16,
}

impl Identity {
    const RESPONSE_LEN: usize = 25;

    fn decode(payload: &mut Payload<'_>) -> Result<Self, Error> {
        Ok(Self {
            uid: payload.string::<8>()?,
            connected_uid: payload.string::<8>()?,
            position: payload.u8()? as char,
            hardware_version: payload.take()?,
            firmware_version: payload.take()?,
            device_identifier: payload.u16()?,
        })
    }
}

pub trait Device: sealed::Sealed {
    const DEVICE_IDENTIFIER: u16;
    const DEVICE_DISPLAY_NAME: &'static str;

    fn uid(&self) -> u32;

    fn get_identity(&self) -> Result<Identity, Error>;

    /// Fail with [`Error::WrongDeviceType`] unless the device at this UID is
    /// of the proxy's type.
    fn verify_identity(&self) -> Result<Identity, Error> {
        let identity = self.get_identity()?;
        if identity.device_identifier != Self::DEVICE_IDENTIFIER {
            return Err(Error::WrongDeviceType {
                uid: uid::encode(self.uid()),
                expected: Self::DEVICE_IDENTIFIER,
                actual: identity.device_identifier,
            });
        }
        Ok(identity)
    }
}

macro_rules! impl_device {
    ($device:ident, $identifier:expr, $name:expr) => {
        impl $crate::bricklets::sealed::Sealed for $device {}

        impl $crate::bricklets::Device for $device {
            const DEVICE_IDENTIFIER: u16 = $identifier;
            const DEVICE_DISPLAY_NAME: &'static str = $name;

            fn uid(&self) -> u32 {
                self.core.uid()
            }

            fn get_identity(&self) -> Result<$crate::bricklets::Identity, $crate::Error> {
                self.core.get_identity()
            }
        }

        impl $device {
            /// Create a proxy for the device with base58 `uid`.
            pub fn new(uid: &str, ipcon: &$crate::IpConnection) -> Result<Self, $crate::Error> {
                Ok(Self {
                    core: $crate::bricklets::DeviceCore::new(uid, ipcon)?,
                })
            }
        }
    };
}
pub(crate) use impl_device;

/// State shared by all proxies: the numeric UID and the connection.
#[derive(Clone)]
pub(crate) struct DeviceCore {
    uid: u32,
    ipcon: IpConnection,
}

impl DeviceCore {
    pub(crate) fn new(uid: &str, ipcon: &IpConnection) -> Result<Self, Error> {
        Ok(Self {
            uid: uid::decode(uid)?,
            ipcon: ipcon.clone(),
        })
    }

    pub(crate) fn uid(&self) -> u32 {
        self.uid
    }

    pub(crate) fn set(
        &self,
        function_id: u8,
        payload: &[u8],
        response_expected: bool,
    ) -> Result<(), Error> {
        let request = Request::builder()
            .uid(self.uid)
            .function_id(function_id)
            .payload(payload)
            .response_expected(response_expected)
            .build();
        self.ipcon.send(request).map(drop)
    }

    pub(crate) fn get<T>(
        &self,
        function_id: u8,
        payload: &[u8],
        response_len: usize,
        decode: impl FnOnce(&mut Payload<'_>) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let request = Request::builder()
            .uid(self.uid)
            .function_id(function_id)
            .payload(payload)
            .response_expected(true)
            .build();
        let response = self.ipcon.send(request)?.unwrap_or_default();
        decode(&mut Payload::new(function_id, &response, response_len)?)
    }

    /// Route callback `function_id` through `decode` into `handler`.
    /// Malformed callback packets are logged and dropped.
    pub(crate) fn on<T, D, H>(&self, function_id: u8, payload_len: usize, decode: D, handler: H)
    where
        D: Fn(&mut Payload<'_>) -> Result<T, Error> + Send + Sync + 'static,
        H: Fn(T) + Send + Sync + 'static,
    {
        let uid = self.uid;
        self.ipcon
            .register_callback(uid, function_id, move |bytes: &[u8]| {
                match Payload::new(function_id, bytes, payload_len).and_then(|mut p| decode(&mut p)) {
                    Ok(value) => handler(value),
                    Err(e) => warn!("Dropping callback {function_id} from {uid}: {e}"),
                }
            });
    }

    fn get_identity(&self) -> Result<Identity, Error> {
        self.get(
            FUNCTION_GET_IDENTITY,
            &[],
            Identity::RESPONSE_LEN,
            Identity::decode,
        )
    }
}
