use super::{impl_device, DeviceCore};
use crate::Error;

pub const FUNCTION_WRITE_LINE: u8 = 1;
pub const FUNCTION_CLEAR_DISPLAY: u8 = 2;
pub const FUNCTION_BACKLIGHT_ON: u8 = 3;
pub const FUNCTION_BACKLIGHT_OFF: u8 = 4;
pub const FUNCTION_IS_BACKLIGHT_ON: u8 = 5;
pub const FUNCTION_SET_CUSTOM_CHARACTER: u8 = 11;

pub const LINES: u8 = 4;
pub const COLUMNS: usize = 20;
pub const CUSTOM_CHARACTERS: u8 = 8;

/// Code that prints custom character `index`.
pub const fn custom_character_code(index: u8) -> char {
    (0x08 + index) as char
}

/// Map `text` onto the display's character ROM, one byte per character.
///
/// The result is cut to [`COLUMNS`] and NUL padded. Characters the ROM has no
/// glyph for become spaces. So do `\` and `~`, which the ROM prints as a yen
/// sign and an arrow.
pub fn encode_text(text: &str) -> [u8; COLUMNS] {
    let mut line = [0u8; COLUMNS];
    for (slot, c) in line.iter_mut().zip(text.chars()) {
        *slot = match c {
            ' '..='[' | ']'..='}' => c as u8,
            '\u{8}'..='\u{f}' => c as u8,
            '°' => 0xDF,
            'ä' => 0xE1,
            'ß' => 0xE2,
            'µ' => 0xE4,
            'ö' => 0xEF,
            'ü' => 0xF5,
            _ => b' ',
        };
    }
    line
}

#[derive(Clone)]
pub struct Lcd20x4Bricklet {
    core: DeviceCore,
}

impl_device!(Lcd20x4Bricklet, 212, "LCD 20x4 Bricklet");

impl Lcd20x4Bricklet {
    /// Write `text` at `line`/`position`. Cells after the text keep their
    /// content.
    pub fn write_line(&self, line: u8, position: u8, text: &str) -> Result<(), Error> {
        let mut payload = [0u8; 2 + COLUMNS];
        payload[0] = line;
        payload[1] = position;
        payload[2..].copy_from_slice(&encode_text(text));
        self.core.set(FUNCTION_WRITE_LINE, &payload, false)
    }

    pub fn clear_display(&self) -> Result<(), Error> {
        self.core.set(FUNCTION_CLEAR_DISPLAY, &[], false)
    }

    pub fn backlight_on(&self) -> Result<(), Error> {
        self.core.set(FUNCTION_BACKLIGHT_ON, &[], false)
    }

    pub fn backlight_off(&self) -> Result<(), Error> {
        self.core.set(FUNCTION_BACKLIGHT_OFF, &[], false)
    }

    pub fn is_backlight_on(&self) -> Result<bool, Error> {
        self.core
            .get(FUNCTION_IS_BACKLIGHT_ON, &[], 1, |payload| {
                payload.u8().map(|on| on != 0)
            })
    }

    /// Upload a 5x8 glyph, one row per byte with the lower five bits used.
    pub fn set_custom_character(&self, index: u8, character: [u8; 8]) -> Result<(), Error> {
        if index >= CUSTOM_CHARACTERS {
            return Err(Error::InvalidParameter);
        }
        let mut payload = [0u8; 9];
        payload[0] = index;
        payload[1..].copy_from_slice(&character);
        self.core
            .set(FUNCTION_SET_CUSTOM_CHARACTER, &payload, false)
    }
}
