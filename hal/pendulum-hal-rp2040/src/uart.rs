//! UART configuration conversion
//!
//! RP2040 has two UART peripherals (UART0 and UART1). The diagnostic
//! stream uses UART0 TX on GPIO0.

use embassy_rp::uart;
use pendulum_hal::uart::{DataBits, Parity, StopBits, UartConfig};

/// Convert shared UART settings into an embassy-rp UART config
pub fn to_rp_config(config: &UartConfig) -> uart::Config {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    rp.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    rp
}
