//! TMC5160 stepper driver (SPI mode)
//!
//! The TMC5160 is a high-current stepper driver configured over SPI. In
//! this firmware it runs in STEP/DIR mode: pulses arrive on the STEP pin
//! from a timer channel, and SPI is used only to configure the chopper,
//! the motor current and the microstep resolution, and to flip the shaft
//! direction bit.
//!
//! # SPI Protocol
//!
//! Every access is a 40-bit datagram in SPI mode 3:
//! - Address byte, bit 7 set for a write
//! - Data (4 bytes, big-endian)
//!
//! The chip answers each datagram with an SPI_STATUS byte followed by the
//! 32-bit result of the previous read.
//!
//! # Shadow Registers
//!
//! Registers are only ever written, never read back. The driver keeps a
//! copy of each register it manages and rewrites the whole value whenever
//! one field changes.

use embedded_hal::spi::SpiDevice;
use pendulum_core::config::DriverSettings;
use pendulum_core::traits::{Direction, ShaftControl};

/// TMC5160 Register addresses
pub mod reg {
    /// General configuration
    pub const GCONF: u8 = 0x00;
    /// Global current scaler
    pub const GLOBAL_SCALER: u8 = 0x0B;
    /// Hold/run current settings
    pub const IHOLD_IRUN: u8 = 0x10;
    /// Power down delay
    pub const TPOWERDOWN: u8 = 0x11;
    /// Chopper configuration
    pub const CHOPCONF: u8 = 0x6C;
    /// CoolStep configuration
    pub const COOLCONF: u8 = 0x6D;
    /// StealthChop PWM configuration
    pub const PWMCONF: u8 = 0x70;
}

/// Address bit marking a write access
const WRITE_BIT: u8 = 0x80;

/// Datagram length in bytes
pub const DATAGRAM_LEN: usize = 5;

/// GCONF bit inverting the motor direction
const GCONF_SHAFT: u32 = 1 << 4;

/// CHOPCONF off time field (bits 0-3)
const CHOPCONF_TOFF_MASK: u32 = 0x0F;

/// CHOPCONF microstep resolution field (bits 24-27)
const CHOPCONF_MRES_SHIFT: u32 = 24;
const CHOPCONF_MRES_MASK: u32 = 0x0F << CHOPCONF_MRES_SHIFT;

/// Power-on CHOPCONF: TOFF=0 (bridge off), HSTRT=5, HEND=2, TBL=2, TPFD=4, intpol
const CHOPCONF_DEFAULT: u32 = 0x1041_0150;

/// Power-on PWMCONF: PWM_OFS=30, PWM_FREQ=0, autoscale, autograd, PWM_REG=4, PWM_LIM=12
const PWMCONF_DEFAULT: u32 = 0xC40C_001E;

/// Power-on TPOWERDOWN
const TPOWERDOWN_DEFAULT: u32 = 10;

/// Full scale sense voltage in mV
const V_FS_MV: u64 = 325;

/// 32 * sqrt(2) * 1000, for RMS current scaling in integer math
const SQRT2_X32_X1000: u64 = 45_255;

/// TMC5160 driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tmc5160Config {
    /// Sense resistor in milliohms
    pub r_sense_mohm: u16,
    /// RMS run current in mA
    pub rms_current_ma: u16,
    /// Microstepping (1, 2, 4, 8, 16, 32, 64, 128, 256)
    pub microsteps: u16,
    /// Chopper off time (1-15, 0 disables the power stage)
    pub toff: u8,
    /// Hold current as a percentage of run current
    pub hold_multiplier_pct: u8,
    /// IHOLDDELAY (0-15)
    pub hold_delay: u8,
}

impl Default for Tmc5160Config {
    fn default() -> Self {
        Self::from(&DriverSettings::DEFAULT)
    }
}

impl From<&DriverSettings> for Tmc5160Config {
    fn from(settings: &DriverSettings) -> Self {
        Self {
            r_sense_mohm: settings.r_sense_mohm,
            rms_current_ma: settings.rms_current_ma,
            microsteps: settings.microsteps,
            toff: settings.toff,
            hold_multiplier_pct: settings.hold_multiplier_pct,
            hold_delay: settings.hold_delay,
        }
    }
}

/// Convert microsteps to MRES register value
pub fn mres(microsteps: u16) -> Option<u8> {
    match microsteps {
        256 => Some(0),
        128 => Some(1),
        64 => Some(2),
        32 => Some(3),
        16 => Some(4),
        8 => Some(5),
        4 => Some(6),
        2 => Some(7),
        1 => Some(8),
        _ => None,
    }
}

/// Current scaling register values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CurrentScale {
    /// GLOBAL_SCALER (0 = 256, otherwise 32-255)
    pub global_scaler: u8,
    /// Run current scale IRUN (0-31)
    pub cs: u8,
}

/// Compute GLOBAL_SCALER and IRUN for an RMS current
///
/// `I_rms = (GLOBAL_SCALER / 256) * ((CS + 1) / 32) * (V_fs / R_sense) / sqrt(2)`
///
/// Picks the smallest global scaler that reaches the target with CS at its
/// maximum, which keeps the full CS range available for the hold current.
pub fn current_scale(rms_current_ma: u16, r_sense_mohm: u16) -> CurrentScale {
    // (CS + 1) * GLOBAL_SCALER = numerator / unit
    let numerator = SQRT2_X32_X1000 * rms_current_ma as u64 * r_sense_mohm as u64 * 256;
    let unit = V_FS_MV * 1_000_000;

    let scaler = numerator.div_ceil(unit * 32).clamp(32, 256);
    let cs = (numerator / (unit * scaler)).saturating_sub(1).min(31);

    CurrentScale {
        global_scaler: if scaler >= 256 { 0 } else { scaler as u8 },
        cs: cs as u8,
    }
}

/// Build a write datagram for TMC5160
pub fn build_write_datagram(reg: u8, data: u32) -> [u8; DATAGRAM_LEN] {
    let [b3, b2, b1, b0] = data.to_be_bytes();
    [reg | WRITE_BIT, b3, b2, b1, b0]
}

/// SPI_STATUS byte returned with every datagram
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiStatus {
    raw: u8,
}

impl SpiStatus {
    pub const fn from_bits(raw: u8) -> Self {
        Self { raw }
    }

    #[inline]
    pub fn raw(&self) -> u8 {
        self.raw
    }

    /// Chip reset since GSTAT was last cleared
    #[inline]
    pub fn reset_flag(&self) -> bool {
        (self.raw & (1 << 0)) != 0
    }

    /// Driver shut down (overtemperature or short)
    #[inline]
    pub fn driver_error(&self) -> bool {
        (self.raw & (1 << 1)) != 0
    }

    /// StallGuard flag
    #[inline]
    pub fn stallguard(&self) -> bool {
        (self.raw & (1 << 2)) != 0
    }

    /// Motor standstill
    #[inline]
    pub fn standstill(&self) -> bool {
        (self.raw & (1 << 3)) != 0
    }
}

/// TMC5160 communication errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// SPI transfer failed
    Spi(E),
    /// Microstep setting not supported by the chip
    InvalidMicrosteps(u16),
}

/// Driver-side copies of the write-only registers
#[derive(Debug, Clone, Copy)]
struct Shadow {
    gconf: u32,
    global_scaler: u32,
    ihold_irun: u32,
    tpowerdown: u32,
    chopconf: u32,
    coolconf: u32,
    pwmconf: u32,
}

impl Shadow {
    fn new(hold_delay: u8) -> Self {
        Self {
            gconf: 0,
            global_scaler: 0,
            ihold_irun: ihold_irun(0, 0, hold_delay),
            tpowerdown: TPOWERDOWN_DEFAULT,
            chopconf: CHOPCONF_DEFAULT,
            coolconf: 0,
            pwmconf: PWMCONF_DEFAULT,
        }
    }
}

/// Pack the IHOLD_IRUN register
fn ihold_irun(ihold: u8, irun: u8, hold_delay: u8) -> u32 {
    ((hold_delay as u32 & 0x0F) << 16) | ((irun as u32 & 0x1F) << 8) | (ihold as u32 & 0x1F)
}

/// TMC5160 driver
///
/// Owns the SPI device (with its chip select) and the shadow registers.
pub struct Tmc5160<SPI> {
    spi: SPI,
    config: Tmc5160Config,
    shadow: Shadow,
    last_status: Option<SpiStatus>,
}

impl<SPI: SpiDevice> Tmc5160<SPI> {
    /// Create a new TMC5160 driver
    ///
    /// Nothing is sent until [`initialize`](Self::initialize) or
    /// [`begin`](Self::begin) is called.
    pub fn new(spi: SPI, config: Tmc5160Config) -> Self {
        Self {
            spi,
            shadow: Shadow::new(config.hold_delay),
            config,
            last_status: None,
        }
    }

    /// Status byte from the most recent transfer
    pub fn last_status(&self) -> Option<SpiStatus> {
        self.last_status
    }

    /// Current GCONF shadow value
    pub fn gconf(&self) -> u32 {
        self.shadow.gconf
    }

    /// Current CHOPCONF shadow value
    pub fn chopconf(&self) -> u32 {
        self.shadow.chopconf
    }

    /// Current IHOLD_IRUN shadow value
    pub fn ihold_irun(&self) -> u32 {
        self.shadow.ihold_irun
    }

    /// Write one register
    pub fn write_register(&mut self, reg: u8, value: u32) -> Result<SpiStatus, Error<SPI::Error>> {
        let mut datagram = build_write_datagram(reg, value);
        self.spi.transfer_in_place(&mut datagram).map_err(Error::Spi)?;

        let status = SpiStatus::from_bits(datagram[0]);
        self.last_status = Some(status);
        Ok(status)
    }

    /// Bring up the configured driver
    ///
    /// Pushes the power-on register set, enables the power stage, sets the
    /// motor current and the microstep resolution. Nothing is read back.
    pub fn initialize(&mut self) -> Result<(), Error<SPI::Error>> {
        self.begin()?;
        self.set_toff(self.config.toff)?;
        self.set_rms_current(self.config.rms_current_ma)?;
        self.set_microsteps(self.config.microsteps)?;
        Ok(())
    }

    /// Push every shadow register to the chip
    ///
    /// With the power-on CHOPCONF (TOFF=0) this leaves the power stage off.
    pub fn begin(&mut self) -> Result<(), Error<SPI::Error>> {
        let s = self.shadow;
        self.write_register(reg::GCONF, s.gconf)?;
        self.write_register(reg::GLOBAL_SCALER, s.global_scaler)?;
        self.write_register(reg::IHOLD_IRUN, s.ihold_irun)?;
        self.write_register(reg::TPOWERDOWN, s.tpowerdown)?;
        self.write_register(reg::CHOPCONF, s.chopconf)?;
        self.write_register(reg::COOLCONF, s.coolconf)?;
        self.write_register(reg::PWMCONF, s.pwmconf)?;
        Ok(())
    }

    /// Set the chopper off time; 0 disables the power stage
    pub fn set_toff(&mut self, toff: u8) -> Result<(), Error<SPI::Error>> {
        let chopconf = (self.shadow.chopconf & !CHOPCONF_TOFF_MASK) | (toff as u32 & CHOPCONF_TOFF_MASK);
        self.write_register(reg::CHOPCONF, chopconf)?;
        self.shadow.chopconf = chopconf;
        Ok(())
    }

    /// Set the RMS run current in mA
    ///
    /// Hold current follows at the configured percentage of run current.
    pub fn set_rms_current(&mut self, rms_current_ma: u16) -> Result<CurrentScale, Error<SPI::Error>> {
        let scale = current_scale(rms_current_ma, self.config.r_sense_mohm);
        let ihold = (scale.cs as u16 * self.config.hold_multiplier_pct as u16 / 100) as u8;
        let value = ihold_irun(ihold, scale.cs, self.config.hold_delay);

        self.write_register(reg::GLOBAL_SCALER, scale.global_scaler as u32)?;
        self.shadow.global_scaler = scale.global_scaler as u32;
        self.write_register(reg::IHOLD_IRUN, value)?;
        self.shadow.ihold_irun = value;
        Ok(scale)
    }

    /// Set the microstep resolution
    pub fn set_microsteps(&mut self, microsteps: u16) -> Result<(), Error<SPI::Error>> {
        let mres = mres(microsteps).ok_or(Error::InvalidMicrosteps(microsteps))?;
        let chopconf =
            (self.shadow.chopconf & !CHOPCONF_MRES_MASK) | ((mres as u32) << CHOPCONF_MRES_SHIFT);
        self.write_register(reg::CHOPCONF, chopconf)?;
        self.shadow.chopconf = chopconf;
        Ok(())
    }

    /// Set or clear the shaft (direction inversion) bit
    pub fn set_shaft(&mut self, shaft: bool) -> Result<(), Error<SPI::Error>> {
        let gconf = if shaft {
            self.shadow.gconf | GCONF_SHAFT
        } else {
            self.shadow.gconf & !GCONF_SHAFT
        };
        self.write_register(reg::GCONF, gconf)?;
        self.shadow.gconf = gconf;
        Ok(())
    }
}

impl<SPI: SpiDevice> ShaftControl for Tmc5160<SPI> {
    type Error = Error<SPI::Error>;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.set_shaft(direction.shaft())
    }
}
