//! Text for the display lines.

use crate::bricklets::lcd_20x4::custom_character_code;

/// Custom character slot holding the degree sign.
pub const DEGREE_SIGN_INDEX: u8 = 0;

/// Small raised circle, narrower than the ROM's own degree sign.
pub const DEGREE_SIGN: [u8; 8] = [
    0b00110, 0b01001, 0b01001, 0b00110, 0b00000, 0b00000, 0b00000, 0b00000,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn suffix(&self) -> char {
        match self {
            Self::Celsius => 'C',
            Self::Fahrenheit => 'F',
        }
    }

    /// Convert a raw reading in hundredths of a degree Celsius.
    pub fn convert(&self, raw: i16) -> f64 {
        let celsius = f64::from(raw) / 100.0;
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 1.8 + 32.0,
        }
    }
}

pub fn temperature_line(raw: i16, unit: TemperatureUnit) -> String {
    format!(
        "Temp.:     {:.1} {}{}",
        unit.convert(raw),
        custom_character_code(DEGREE_SIGN_INDEX),
        unit.suffix()
    )
}

/// `raw` is in tenths of a percent.
pub fn humidity_line(raw: u16) -> String {
    format!("Rel. Hum.: {:.1} %", f64::from(raw) / 10.0)
}

/// `raw` is in tenths of a lux.
pub fn illuminance_line(raw: u16) -> String {
    format!("Illum.:    {:.1} lx", f64::from(raw) / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius() {
        assert_eq!(
            temperature_line(2150, TemperatureUnit::Celsius),
            "Temp.:     21.5 \u{8}C"
        );
        assert_eq!(
            temperature_line(-1000, TemperatureUnit::Celsius),
            "Temp.:     -10.0 \u{8}C"
        );
        assert_eq!(
            temperature_line(0, TemperatureUnit::Celsius),
            "Temp.:     0.0 \u{8}C"
        );
    }

    #[test]
    fn fahrenheit() {
        assert_eq!(
            temperature_line(2150, TemperatureUnit::Fahrenheit),
            "Temp.:     70.7 \u{8}F"
        );
        assert_eq!(
            temperature_line(2000, TemperatureUnit::Fahrenheit),
            "Temp.:     68.0 \u{8}F"
        );
        assert_eq!(
            temperature_line(-4000, TemperatureUnit::Fahrenheit),
            "Temp.:     -40.0 \u{8}F"
        );
    }

    #[test]
    fn same_reading_in_both_units() {
        let raw = 2437;
        let celsius = temperature_line(raw, TemperatureUnit::Celsius);
        let fahrenheit = temperature_line(raw, TemperatureUnit::Fahrenheit);
        assert!(celsius.ends_with("24.4 \u{8}C"), "{celsius}");
        assert!(fahrenheit.ends_with("75.9 \u{8}F"), "{fahrenheit}");
    }

    #[test]
    fn humidity_and_illuminance() {
        assert_eq!(humidity_line(453), "Rel. Hum.: 45.3 %");
        assert_eq!(humidity_line(1000), "Rel. Hum.: 100.0 %");
        assert_eq!(illuminance_line(1234), "Illum.:    123.4 lx");
        assert_eq!(illuminance_line(0), "Illum.:    0.0 lx");
    }

    #[test]
    fn lines_fit_the_display() {
        use crate::bricklets::lcd_20x4::COLUMNS;
        assert!(temperature_line(i16::MIN, TemperatureUnit::Fahrenheit).chars().count() <= COLUMNS);
        assert!(humidity_line(u16::MAX).chars().count() <= COLUMNS);
        assert!(illuminance_line(u16::MAX).chars().count() <= COLUMNS);
    }
}
