//! Build script for pendulum-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time and embeds it as a `BoardConfig`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use pendulum_core::config::{BoardConfig, ConfigError};

fn main() {
    setup_linker();
    let board = load_board_config();
    write_board_config(&board);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read, parse and validate board.toml
fn load_board_config() -> BoardConfig {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        fail(
            "board.toml not found!",
            &[
                "The firmware requires a board.toml configuration file.".to_string(),
                "Please create one in the pendulum-firmware directory.".to_string(),
            ],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read board.toml", &[e.to_string()]),
    };

    let value: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in board.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    let board = parse_board(&value, &mut errors);

    if !errors.is_empty() {
        fail("Invalid board configuration", &errors);
    }

    if let Err(e) = board.validate() {
        fail("Invalid board configuration", &[describe(e)]);
    }

    println!("cargo:warning=board.toml validated successfully");
    board
}

/// Fill a `BoardConfig` from the parsed TOML, starting from the defaults
///
/// Missing keys keep their default value; keys of the wrong type or out of
/// range are collected into `errors`.
fn parse_board(value: &toml::Value, errors: &mut Vec<String>) -> BoardConfig {
    let mut board = BoardConfig::DEFAULT;

    if let Some(pins) = section(value, "pins", errors) {
        let p = &mut board.pins;
        read(pins, "pins", "led", &mut p.led, errors);
        read(pins, "pins", "step", &mut p.step, errors);
        read(pins, "pins", "dir", &mut p.dir, errors);
        read(pins, "pins", "enable", &mut p.enable, errors);
        read(pins, "pins", "spi_sck", &mut p.spi_sck, errors);
        read(pins, "pins", "spi_mosi", &mut p.spi_mosi, errors);
        read(pins, "pins", "spi_miso", &mut p.spi_miso, errors);
        read(pins, "pins", "spi_cs", &mut p.spi_cs, errors);
        read(pins, "pins", "uart_tx", &mut p.uart_tx, errors);
    }

    if let Some(driver) = section(value, "driver", errors) {
        let d = &mut board.driver;
        read(driver, "driver", "r_sense_mohm", &mut d.r_sense_mohm, errors);
        read(driver, "driver", "rms_current_ma", &mut d.rms_current_ma, errors);
        read(driver, "driver", "microsteps", &mut d.microsteps, errors);
        read(driver, "driver", "toff", &mut d.toff, errors);
        read(driver, "driver", "hold_multiplier_pct", &mut d.hold_multiplier_pct, errors);
        read(driver, "driver", "hold_delay", &mut d.hold_delay, errors);
        read(driver, "driver", "spi_frequency_hz", &mut d.spi_frequency_hz, errors);
    }

    if let Some(timers) = section(value, "timers", errors) {
        let t = &mut board.timers;
        read(timers, "timers", "slow_flash_us", &mut t.slow_flash_us, errors);
        read(timers, "timers", "fast_flash_us", &mut t.fast_flash_us, errors);
        read(timers, "timers", "step_us", &mut t.step_us, errors);
        read(timers, "timers", "aux_us", &mut t.aux_us, errors);
    }

    if let Some(control) = section(value, "control", errors) {
        read(
            control,
            "control",
            "mode_switch_interval_ms",
            &mut board.mode_switch_interval_ms,
            errors,
        );
        read(control, "control", "serial_baud", &mut board.serial_baud, errors);
    }

    board
}

/// Look up an optional `[name]` table
fn section<'a>(
    value: &'a toml::Value,
    name: &str,
    errors: &mut Vec<String>,
) -> Option<&'a toml::value::Table> {
    match value.get(name) {
        None => None,
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
    }
}

/// Read an optional integer key into `out`
fn read<T>(table: &toml::value::Table, section: &str, key: &str, out: &mut T, errors: &mut Vec<String>)
where
    T: TryFrom<i64>,
{
    match table.get(key) {
        None => {}
        Some(toml::Value::Integer(n)) => match T::try_from(*n) {
            Ok(v) => *out = v,
            Err(_) => errors.push(format!("[{}] {} = {} is out of range", section, key, n)),
        },
        Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
    }
}

/// Human-readable text for a validation error
fn describe(error: ConfigError) -> String {
    match error {
        ConfigError::InvalidPin(pin) => format!("GPIO{} does not exist (0-29 valid)", pin),
        ConfigError::DuplicatePin(pin) => format!("GPIO{} is assigned more than once", pin),
        ConfigError::ZeroPeriod(channel) => {
            format!("[timers] {} period must be non-zero", channel.name())
        }
        ConfigError::InvalidMicrosteps(m) => {
            format!("[driver] microsteps = {} must be a power of two up to 256", m)
        }
        ConfigError::CurrentOutOfRange(ma) => {
            format!("[driver] rms_current_ma = {} must be 1-3000", ma)
        }
        ConfigError::ZeroSenseResistor => "[driver] r_sense_mohm must be non-zero".to_string(),
        ConfigError::InvalidToff(t) => format!("[driver] toff = {} must be 1-15", t),
        ConfigError::InvalidHoldMultiplier(p) => {
            format!("[driver] hold_multiplier_pct = {} must be 0-100", p)
        }
        ConfigError::InvalidHoldDelay(d) => format!("[driver] hold_delay = {} must be 0-15", d),
        ConfigError::ZeroFrequency => "[driver] spi_frequency_hz must be non-zero".to_string(),
        ConfigError::ZeroInterval => {
            "[control] mode_switch_interval_ms must be non-zero".to_string()
        }
        ConfigError::ZeroBaudRate => "[control] serial_baud must be non-zero".to_string(),
    }
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|line| format!("║  • {:<62} ║", truncate(line, 62)))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Shorten `line` to at most `width` characters, marking the cut with `...`
fn truncate(line: &str, width: usize) -> String {
    if line.chars().count() > width {
        let kept: String = line.chars().take(width - 3).collect();
        format!("{}...", kept)
    } else {
        line.to_string()
    }
}

/// Write the validated config as Rust source into OUT_DIR
fn write_board_config(board: &BoardConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let p = &board.pins;
    let d = &board.driver;
    let t = &board.timers;

    let source = format!(
        "// Generated from board.toml\n\
        pub const BOARD: BoardConfig = BoardConfig {{\n\
        \x20   pins: BoardPins {{\n\
        \x20       led: {led},\n\
        \x20       step: {step},\n\
        \x20       dir: {dir},\n\
        \x20       enable: {enable},\n\
        \x20       spi_sck: {sck},\n\
        \x20       spi_mosi: {mosi},\n\
        \x20       spi_miso: {miso},\n\
        \x20       spi_cs: {cs},\n\
        \x20       uart_tx: {tx},\n\
        \x20   }},\n\
        \x20   driver: DriverSettings {{\n\
        \x20       r_sense_mohm: {r_sense},\n\
        \x20       rms_current_ma: {current},\n\
        \x20       microsteps: {microsteps},\n\
        \x20       toff: {toff},\n\
        \x20       hold_multiplier_pct: {hold_pct},\n\
        \x20       hold_delay: {hold_delay},\n\
        \x20       spi_frequency_hz: {spi_hz},\n\
        \x20   }},\n\
        \x20   timers: TimerPeriods {{\n\
        \x20       slow_flash_us: {slow},\n\
        \x20       fast_flash_us: {fast},\n\
        \x20       step_us: {step_us},\n\
        \x20       aux_us: {aux},\n\
        \x20   }},\n\
        \x20   mode_switch_interval_ms: {interval},\n\
        \x20   serial_baud: {baud},\n\
        }};\n",
        led = p.led,
        step = p.step,
        dir = p.dir,
        enable = p.enable,
        sck = p.spi_sck,
        mosi = p.spi_mosi,
        miso = p.spi_miso,
        cs = p.spi_cs,
        tx = p.uart_tx,
        r_sense = d.r_sense_mohm,
        current = d.rms_current_ma,
        microsteps = d.microsteps,
        toff = d.toff,
        hold_pct = d.hold_multiplier_pct,
        hold_delay = d.hold_delay,
        spi_hz = d.spi_frequency_hz,
        slow = t.slow_flash_us,
        fast = t.fast_flash_us,
        step_us = t.step_us,
        aux = t.aux_us,
        interval = board.mode_switch_interval_ms,
        baud = board.serial_baud,
    );

    fs::write(out_dir.join("board_config.rs"), source).unwrap();
}
