//! Sensor and button handlers that keep the display up to date.

use std::sync::{Mutex, PoisonError};

use log::{error, info, warn};

use crate::bricklets::{DualButtonBricklet, LedState, StateChanged, TemperatureBricklet};
use crate::display::{DisplayWriter, LineDisplay};
use crate::format::{self, TemperatureUnit};
use crate::Error;

pub const TEMPERATURE_LINE: u8 = 0;
pub const HUMIDITY_LINE: u8 = 1;
pub const ILLUMINANCE_LINE: u8 = 2;
pub const FOOTER_LINE: u8 = 3;

pub trait TemperatureSource {
    /// Hundredths of a degree Celsius.
    fn read_temperature(&self) -> Result<i16, Error>;
}

impl TemperatureSource for TemperatureBricklet {
    fn read_temperature(&self) -> Result<i16, Error> {
        self.get_temperature()
    }
}

/// The pair of LEDs next to the unit buttons.
pub trait UnitLeds {
    fn set_leds(&self, left: LedState, right: LedState) -> Result<(), Error>;
}

impl UnitLeds for DualButtonBricklet {
    fn set_leds(&self, left: LedState, right: LedState) -> Result<(), Error> {
        self.set_led_state(left, right)
    }
}

/// Left LED marks Celsius, right LED marks Fahrenheit.
pub fn unit_leds(unit: TemperatureUnit) -> (LedState, LedState) {
    match unit {
        TemperatureUnit::Celsius => (LedState::On, LedState::Off),
        TemperatureUnit::Fahrenheit => (LedState::Off, LedState::On),
    }
}

#[derive(Debug, Default)]
struct State {
    unit: TemperatureUnit,
    last_temperature: Option<i16>,
}

/// Handler context shared by every callback.
///
/// Display writes are not serialized: the temperature callback and the
/// button callback may race on the temperature line and the last write wins.
pub struct Climate<D, T, L> {
    display: DisplayWriter<D>,
    temperature: T,
    leds: L,
    state: Mutex<State>,
}

impl<D, T, L> Climate<D, T, L>
where
    D: LineDisplay,
    T: TemperatureSource,
    L: UnitLeds,
{
    pub fn new(display: D, temperature: T, leds: L) -> Self {
        Self {
            display: DisplayWriter::new(display),
            temperature,
            leds,
            state: Mutex::default(),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn display(&self) -> &DisplayWriter<D> {
        &self.display
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.state().unit
    }

    pub fn last_temperature(&self) -> Option<i16> {
        self.state().last_temperature
    }

    pub fn on_temperature(&self, raw: i16) {
        let unit = {
            let mut state = self.state();
            state.last_temperature = Some(raw);
            state.unit
        };
        self.display
            .write(TEMPERATURE_LINE, &format::temperature_line(raw, unit));
    }

    pub fn on_humidity(&self, raw: u16) {
        self.display.write(HUMIDITY_LINE, &format::humidity_line(raw));
    }

    pub fn on_illuminance(&self, raw: u16) {
        self.display
            .write(ILLUMINANCE_LINE, &format::illuminance_line(raw));
    }

    /// Switch units and light the matching LED.
    pub fn select_unit(&self, unit: TemperatureUnit) {
        self.state().unit = unit;
        let (left, right) = unit_leds(unit);
        if let Err(e) = self.leds.set_leds(left, right) {
            error!("Setting unit LEDs failed: {e}");
        }
    }

    /// Left selects Celsius, right selects Fahrenheit. The temperature line is
    /// redrawn on every change, releases included.
    pub fn on_state_changed(&self, event: StateChanged) {
        if event.button_l.is_pressed() {
            info!("Switching to Celsius");
            self.select_unit(TemperatureUnit::Celsius);
        } else if event.button_r.is_pressed() {
            info!("Switching to Fahrenheit");
            self.select_unit(TemperatureUnit::Fahrenheit);
        }
        self.refresh_temperature();
    }

    /// Redraw the temperature line in the current unit.
    ///
    /// Uses the last reading, or reads the sensor once if nothing has arrived yet.
    pub fn refresh_temperature(&self) {
        let raw = match self.last_temperature() {
            Some(raw) => raw,
            None => match self.temperature.read_temperature() {
                Ok(raw) => raw,
                Err(e) => {
                    error!("Reading temperature failed: {e}");
                    return;
                }
            },
        };
        self.on_temperature(raw);
    }

    pub fn show_footer(&self, footer: &str) {
        if footer.chars().count() > crate::bricklets::lcd_20x4::COLUMNS {
            warn!("Footer {footer:?} is cut to the display width");
        }
        self.display.write(FOOTER_LINE, footer);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::bricklets::ButtonState;
    use crate::display::tests::FakeDisplay;

    struct FakeSensor {
        reading: Result<i16, ()>,
        reads: AtomicUsize,
    }

    impl FakeSensor {
        fn new(reading: Result<i16, ()>) -> Self {
            Self {
                reading,
                reads: AtomicUsize::new(0),
            }
        }
    }

    impl TemperatureSource for FakeSensor {
        fn read_temperature(&self) -> Result<i16, Error> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.reading.map_err(|()| Error::Timeout)
        }
    }

    #[derive(Default)]
    struct FakeLeds(Mutex<Vec<(LedState, LedState)>>);

    impl UnitLeds for FakeLeds {
        fn set_leds(&self, left: LedState, right: LedState) -> Result<(), Error> {
            self.0.lock().unwrap().push((left, right));
            Ok(())
        }
    }

    impl FakeLeds {
        fn last(&self) -> Option<(LedState, LedState)> {
            self.0.lock().unwrap().last().copied()
        }
    }

    fn climate(reading: Result<i16, ()>) -> Climate<FakeDisplay, FakeSensor, FakeLeds> {
        Climate::new(FakeDisplay::default(), FakeSensor::new(reading), FakeLeds::default())
    }

    fn event(left: ButtonState, right: ButtonState) -> StateChanged {
        StateChanged {
            button_l: left,
            button_r: right,
            led_l: LedState::Off,
            led_r: LedState::Off,
        }
    }

    fn last_text(climate: &Climate<FakeDisplay, FakeSensor, FakeLeds>, line: u8) -> Option<String> {
        climate
            .display()
            .display()
            .writes()
            .into_iter()
            .filter(|(l, _, _)| *l == line)
            .map(|(_, _, text)| text)
            .last()
    }

    #[test]
    fn defaults_to_celsius() {
        let climate = climate(Ok(0));
        assert_eq!(climate.unit(), TemperatureUnit::Celsius);
        assert_eq!(climate.last_temperature(), None);
    }

    #[test]
    fn sensor_callbacks_write_their_lines() {
        let climate = climate(Ok(0));
        climate.on_temperature(2150);
        climate.on_humidity(453);
        climate.on_illuminance(1234);
        assert_eq!(last_text(&climate, 0).unwrap(), "Temp.:     21.5 \u{8}C");
        assert_eq!(last_text(&climate, 1).unwrap(), "Rel. Hum.: 45.3 %");
        assert_eq!(last_text(&climate, 2).unwrap(), "Illum.:    123.4 lx");
        assert_eq!(climate.last_temperature(), Some(2150));
    }

    #[test]
    fn right_press_selects_fahrenheit_from_any_state() {
        for start in [TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit] {
            let climate = climate(Ok(0));
            climate.select_unit(start);
            climate.on_temperature(2150);
            climate.on_state_changed(event(ButtonState::Released, ButtonState::Pressed));
            assert_eq!(climate.unit(), TemperatureUnit::Fahrenheit);
            assert_eq!(climate.leds.last(), Some((LedState::Off, LedState::On)));
            assert_eq!(last_text(&climate, 0).unwrap(), "Temp.:     70.7 \u{8}F");
        }
    }

    #[test]
    fn left_press_selects_celsius_from_any_state() {
        for start in [TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit] {
            let climate = climate(Ok(0));
            climate.select_unit(start);
            climate.on_temperature(2150);
            climate.on_state_changed(event(ButtonState::Pressed, ButtonState::Released));
            assert_eq!(climate.unit(), TemperatureUnit::Celsius);
            assert_eq!(climate.leds.last(), Some((LedState::On, LedState::Off)));
            assert_eq!(last_text(&climate, 0).unwrap(), "Temp.:     21.5 \u{8}C");
        }
    }

    #[test]
    fn left_wins_when_both_are_pressed() {
        let climate = climate(Ok(0));
        climate.select_unit(TemperatureUnit::Fahrenheit);
        climate.on_state_changed(event(ButtonState::Pressed, ButtonState::Pressed));
        assert_eq!(climate.unit(), TemperatureUnit::Celsius);
    }

    #[test]
    fn release_keeps_unit_but_redraws() {
        let climate = climate(Ok(0));
        climate.select_unit(TemperatureUnit::Fahrenheit);
        climate.on_temperature(2000);
        let writes_before = climate.display().display().writes().len();
        climate.on_state_changed(event(ButtonState::Released, ButtonState::Released));
        assert_eq!(climate.unit(), TemperatureUnit::Fahrenheit);
        assert_eq!(climate.display().display().writes().len(), writes_before + 2);
        assert_eq!(last_text(&climate, 0).unwrap(), "Temp.:     68.0 \u{8}F");
    }

    #[test]
    fn redraw_reads_sensor_only_without_cached_value() {
        let climate = climate(Ok(1000));
        climate.refresh_temperature();
        climate.refresh_temperature();
        assert_eq!(climate.temperature.reads.load(Ordering::SeqCst), 1);
        assert_eq!(last_text(&climate, 0).unwrap(), "Temp.:     10.0 \u{8}C");
    }

    #[test]
    fn failed_read_leaves_line_alone() {
        let climate = climate(Err(()));
        climate.on_state_changed(event(ButtonState::Released, ButtonState::Pressed));
        assert_eq!(climate.unit(), TemperatureUnit::Fahrenheit);
        assert_eq!(last_text(&climate, 0), None);
    }

    #[test]
    fn footer_goes_to_last_line() {
        let climate = climate(Ok(0));
        climate.show_footer("Office Climate");
        assert_eq!(last_text(&climate, 3).unwrap(), "Office Climate");
    }
}
