use super::{impl_device, DeviceCore};
use crate::packet::Payload;
use crate::Error;

pub const FUNCTION_SET_LED_STATE: u8 = 1;
pub const FUNCTION_GET_LED_STATE: u8 = 2;
pub const FUNCTION_GET_BUTTON_STATE: u8 = 3;
pub const CALLBACK_STATE_CHANGED: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LedState {
    /// On, and toggled by the button next to it.
    AutoToggleOn = 0,
    AutoToggleOff = 1,
    On = 2,
    Off = 3,
}

impl LedState {
    fn decode(payload: &mut Payload<'_>) -> Result<Self, Error> {
        Ok(match payload.u8()? {
            0 => Self::AutoToggleOn,
            1 => Self::AutoToggleOff,
            2 => Self::On,
            3 => Self::Off,
            value => {
                return Err(Error::UnexpectedValue {
                    function_id: payload.function_id(),
                    value,
                })
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ButtonState {
    Pressed = 0,
    Released = 1,
}

impl ButtonState {
    fn decode(payload: &mut Payload<'_>) -> Result<Self, Error> {
        Ok(match payload.u8()? {
            0 => Self::Pressed,
            1 => Self::Released,
            value => {
                return Err(Error::UnexpectedValue {
                    function_id: payload.function_id(),
                    value,
                })
            }
        })
    }

    #[must_use]
    pub fn is_pressed(&self) -> bool {
        matches!(self, Self::Pressed)
    }
}

/// Payload of the state-changed callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChanged {
    pub button_l: ButtonState,
    pub button_r: ButtonState,
    pub led_l: LedState,
    pub led_r: LedState,
}

#[derive(Clone)]
pub struct DualButtonBricklet {
    core: DeviceCore,
}

impl_device!(DualButtonBricklet, 230, "Dual Button Bricklet");

impl DualButtonBricklet {
    pub fn set_led_state(&self, led_l: LedState, led_r: LedState) -> Result<(), Error> {
        self.core
            .set(FUNCTION_SET_LED_STATE, &[led_l as u8, led_r as u8], false)
    }

    pub fn get_led_state(&self) -> Result<(LedState, LedState), Error> {
        self.core.get(FUNCTION_GET_LED_STATE, &[], 2, |payload| {
            Ok((LedState::decode(payload)?, LedState::decode(payload)?))
        })
    }

    pub fn get_button_state(&self) -> Result<(ButtonState, ButtonState), Error> {
        self.core.get(FUNCTION_GET_BUTTON_STATE, &[], 2, |payload| {
            Ok((ButtonState::decode(payload)?, ButtonState::decode(payload)?))
        })
    }

    /// Called whenever a button is pressed or released.
    pub fn on_state_changed(&self, handler: impl Fn(StateChanged) + Send + Sync + 'static) {
        self.core.on(
            CALLBACK_STATE_CHANGED,
            4,
            |payload| {
                Ok(StateChanged {
                    button_l: ButtonState::decode(payload)?,
                    button_r: ButtonState::decode(payload)?,
                    led_l: LedState::decode(payload)?,
                    led_r: LedState::decode(payload)?,
                })
            },
            handler,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_states() {
        let mut payload = Payload::new(CALLBACK_STATE_CHANGED, &[0, 1, 2, 3], 4).unwrap();
        assert!(ButtonState::decode(&mut payload).unwrap().is_pressed());
        assert!(!ButtonState::decode(&mut payload).unwrap().is_pressed());
        assert_eq!(LedState::decode(&mut payload).unwrap(), LedState::On);
        assert_eq!(LedState::decode(&mut payload).unwrap(), LedState::Off);
    }

    #[test]
    fn rejects_out_of_range_states() {
        let mut payload = Payload::new(FUNCTION_GET_BUTTON_STATE, &[2], 1).unwrap();
        assert!(matches!(
            ButtonState::decode(&mut payload),
            Err(Error::UnexpectedValue {
                function_id: FUNCTION_GET_BUTTON_STATE,
                value: 2
            })
        ));

        let mut payload = Payload::new(FUNCTION_GET_LED_STATE, &[7], 1).unwrap();
        assert!(matches!(
            LedState::decode(&mut payload),
            Err(Error::UnexpectedValue {
                function_id: FUNCTION_GET_LED_STATE,
                value: 7
            })
        ));
    }
}
