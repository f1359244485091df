use log::{debug, error};

use crate::bricklets::lcd_20x4::LINES;
use crate::bricklets::Lcd20x4Bricklet;
use crate::Error;

const BLANK_LINE: &str = "                    ";

/// Character display addressed by line and column.
pub trait LineDisplay {
    fn write_line(&self, line: u8, position: u8, text: &str) -> Result<(), Error>;
}

impl LineDisplay for Lcd20x4Bricklet {
    fn write_line(&self, line: u8, position: u8, text: &str) -> Result<(), Error> {
        Lcd20x4Bricklet::write_line(self, line, position, text)
    }
}

/// Whole-line writes that never fail the caller.
pub struct DisplayWriter<D> {
    display: D,
}

impl<D: LineDisplay> DisplayWriter<D> {
    pub fn new(display: D) -> Self {
        Self { display }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Blank `line`, then write `text` from its first column.
    ///
    /// # Panics
    ///
    /// If `line` is not a row of the display.
    pub fn write(&self, line: u8, text: &str) {
        assert!(line < LINES, "Line must be in range 0..{LINES}");
        debug!("Line {line}: {text:?}");
        let result = self
            .display
            .write_line(line, 0, BLANK_LINE)
            .and_then(|()| self.display.write_line(line, 0, text));
        if let Err(e) = result {
            error!("Writing display line {line} failed: {e}");
        }
    }

    pub fn blank(&self, line: u8) {
        assert!(line < LINES, "Line must be in range 0..{LINES}");
        if let Err(e) = self.display.write_line(line, 0, BLANK_LINE) {
            error!("Blanking display line {line} failed: {e}");
        }
    }
}
