//! Hardware configuration types
//!
//! These types define the board wiring, the stepper driver's electrical
//! settings and the control loop timing. The firmware build script fills a
//! [`BoardConfig`] from `board.toml` and rejects it at compile time if
//! [`BoardConfig::validate`] fails.

use super::timing::{TimerChannel, TimerPeriods};

/// Number of GPIO pins on RP2040
pub const GPIO_COUNT: u8 = 30;

/// Highest RMS current accepted for the driver, in mA
pub const MAX_RMS_CURRENT_MA: u16 = 3000;

/// GPIO assignment for every signal the firmware drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardPins {
    /// Status LED
    pub led: u8,
    /// Driver STEP input
    pub step: u8,
    /// Driver DIR input (held low; direction comes from the shaft bit)
    pub dir: u8,
    /// Driver enable, active low
    pub enable: u8,
    /// SPI clock
    pub spi_sck: u8,
    /// SPI controller out (driver SDI)
    pub spi_mosi: u8,
    /// SPI controller in (driver SDO)
    pub spi_miso: u8,
    /// Driver chip select, active low
    pub spi_cs: u8,
    /// Diagnostic serial TX
    pub uart_tx: u8,
}

impl BoardPins {
    /// Raspberry Pi Pico wiring
    pub const PICO: Self = Self {
        led: 25,
        step: 8,
        dir: 9,
        enable: 6,
        spi_sck: 2,
        spi_mosi: 3,
        spi_miso: 4,
        spi_cs: 5,
        uart_tx: 0,
    };

    /// All pins with their signal names, in a fixed order
    pub const fn named(&self) -> [(&'static str, u8); 9] {
        [
            ("led", self.led),
            ("step", self.step),
            ("dir", self.dir),
            ("enable", self.enable),
            ("spi_sck", self.spi_sck),
            ("spi_mosi", self.spi_mosi),
            ("spi_miso", self.spi_miso),
            ("spi_cs", self.spi_cs),
            ("uart_tx", self.uart_tx),
        ]
    }
}

/// Stepper driver electrical settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverSettings {
    /// Current sense resistor in milliohms
    pub r_sense_mohm: u16,
    /// Target RMS motor current in mA
    pub rms_current_ma: u16,
    /// Microstep resolution (4 = quarter step)
    pub microsteps: u16,
    /// Chopper off time; any non-zero value enables the power stage
    pub toff: u8,
    /// Hold current as a percentage of run current
    pub hold_multiplier_pct: u8,
    /// Delay before dropping to hold current (IHOLDDELAY, 0-15)
    pub hold_delay: u8,
    /// SPI clock frequency in Hz
    pub spi_frequency_hz: u32,
}

impl DriverSettings {
    pub const DEFAULT: Self = Self {
        r_sense_mohm: 75,
        rms_current_ma: 500,
        microsteps: 4,
        toff: 5,
        hold_multiplier_pct: 50,
        hold_delay: 0,
        spi_frequency_hz: 2_000_000,
    };
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    pub pins: BoardPins,
    pub driver: DriverSettings,
    pub timers: TimerPeriods,
    /// Time between flash mode switches, in ms
    pub mode_switch_interval_ms: u32,
    /// Diagnostic serial baud rate
    pub serial_baud: u32,
}

impl BoardConfig {
    pub const DEFAULT: Self = Self {
        pins: BoardPins::PICO,
        driver: DriverSettings::DEFAULT,
        timers: TimerPeriods::DEFAULT,
        mode_switch_interval_ms: 5000,
        serial_baud: 9600,
    };

    /// Check the configuration for wiring and range errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = self.pins.named();
        for (i, &(_, pin)) in pins.iter().enumerate() {
            if pin >= GPIO_COUNT {
                return Err(ConfigError::InvalidPin(pin));
            }
            if pins[..i].iter().any(|&(_, other)| other == pin) {
                return Err(ConfigError::DuplicatePin(pin));
            }
        }

        for channel in TimerChannel::ALL {
            if self.timers.period_us(channel) == 0 {
                return Err(ConfigError::ZeroPeriod(channel));
            }
        }

        let driver = &self.driver;
        if !driver.microsteps.is_power_of_two() || driver.microsteps > 256 {
            return Err(ConfigError::InvalidMicrosteps(driver.microsteps));
        }
        if driver.rms_current_ma == 0 || driver.rms_current_ma > MAX_RMS_CURRENT_MA {
            return Err(ConfigError::CurrentOutOfRange(driver.rms_current_ma));
        }
        if driver.r_sense_mohm == 0 {
            return Err(ConfigError::ZeroSenseResistor);
        }
        if driver.toff == 0 || driver.toff > 15 {
            return Err(ConfigError::InvalidToff(driver.toff));
        }
        if driver.hold_multiplier_pct > 100 {
            return Err(ConfigError::InvalidHoldMultiplier(driver.hold_multiplier_pct));
        }
        if driver.hold_delay > 15 {
            return Err(ConfigError::InvalidHoldDelay(driver.hold_delay));
        }
        if driver.spi_frequency_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }

        if self.mode_switch_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.serial_baud == 0 {
            return Err(ConfigError::ZeroBaudRate);
        }

        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Board configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin assigned to more than one signal
    DuplicatePin(u8),
    /// Timer channel with a zero period
    ZeroPeriod(TimerChannel),
    /// Microsteps not a power of two up to 256
    InvalidMicrosteps(u16),
    /// RMS current outside 1..=MAX_RMS_CURRENT_MA
    CurrentOutOfRange(u16),
    /// Sense resistor of zero ohms
    ZeroSenseResistor,
    /// TOFF outside 1..=15
    InvalidToff(u8),
    /// Hold multiplier above 100 %
    InvalidHoldMultiplier(u8),
    /// IHOLDDELAY above 15
    InvalidHoldDelay(u8),
    /// SPI clock of zero
    ZeroFrequency,
    /// Mode switch interval of zero
    ZeroInterval,
    /// Serial baud rate of zero
    ZeroBaudRate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(BoardConfig::DEFAULT.validate(), Ok(()));
    }

    #[test]
    fn test_default_values() {
        let config = BoardConfig::default();
        assert_eq!(config.driver.r_sense_mohm, 75);
        assert_eq!(config.driver.rms_current_ma, 500);
        // Quarter stepping
        assert_eq!(config.driver.microsteps, 4);
        assert_eq!(config.driver.toff, 5);
        assert_eq!(config.mode_switch_interval_ms, 5000);
        assert_eq!(config.serial_baud, 9600);
    }

    #[test]
    fn test_pin_out_of_range() {
        let mut config = BoardConfig::DEFAULT;
        config.pins.led = 30;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPin(30)));
    }

    #[test]
    fn test_duplicate_pin() {
        let mut config = BoardConfig::DEFAULT;
        config.pins.dir = config.pins.step;
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePin(8)));
    }

    #[test]
    fn test_zero_period() {
        let mut config = BoardConfig::DEFAULT;
        config.timers.step_us = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroPeriod(TimerChannel::Step))
        );
    }

    #[test]
    fn test_invalid_microsteps() {
        let mut config = BoardConfig::DEFAULT;

        config.driver.microsteps = 3;
        assert_eq!(config.validate(), Err(ConfigError::InvalidMicrosteps(3)));

        config.driver.microsteps = 512;
        assert_eq!(config.validate(), Err(ConfigError::InvalidMicrosteps(512)));

        config.driver.microsteps = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidMicrosteps(0)));

        config.driver.microsteps = 256;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_current_range() {
        let mut config = BoardConfig::DEFAULT;

        config.driver.rms_current_ma = 0;
        assert_eq!(config.validate(), Err(ConfigError::CurrentOutOfRange(0)));

        config.driver.rms_current_ma = MAX_RMS_CURRENT_MA + 1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::CurrentOutOfRange(MAX_RMS_CURRENT_MA + 1))
        );
    }

    #[test]
    fn test_driver_enable_requires_toff() {
        let mut config = BoardConfig::DEFAULT;
        config.driver.toff = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidToff(0)));
    }
}
