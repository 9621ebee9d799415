//! Board configuration embedded from board.toml

use pendulum_core::config::{BoardConfig, BoardPins, DriverSettings, TimerPeriods};

include!(concat!(env!("OUT_DIR"), "/board_config.rs"));

// Peripherals are bound to fixed pins in main.rs
const _: () = {
    let pins = BOARD.pins;
    assert!(pins.led == 25, "board.toml: led must be GPIO25");
    assert!(pins.step == 8, "board.toml: step must be GPIO8");
    assert!(pins.dir == 9, "board.toml: dir must be GPIO9");
    assert!(pins.enable == 6, "board.toml: enable must be GPIO6");
    assert!(pins.spi_sck == 2, "board.toml: spi_sck must be GPIO2 (SPI0 SCK)");
    assert!(pins.spi_mosi == 3, "board.toml: spi_mosi must be GPIO3 (SPI0 TX)");
    assert!(pins.spi_miso == 4, "board.toml: spi_miso must be GPIO4 (SPI0 RX)");
    assert!(pins.spi_cs == 5, "board.toml: spi_cs must be GPIO5");
    assert!(pins.uart_tx == 0, "board.toml: uart_tx must be GPIO0 (UART0 TX)");
};
