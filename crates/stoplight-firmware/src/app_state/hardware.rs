//! Hardware initialization for the stoplight SAO
//!
//! The SAO connector provides VCC, GND, the I2C pair and two GPIOs. The I2C
//! pair goes to the SCD4x; the two GPIOs carry the encoded CO2 status to the
//! badge.

use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::peripherals::{GPIO8, GPIO9, GPIO14, GPIO15, I2C0};
use esp_hal::time::Rate;
use esp_hal::Async;
use log::info;
use stoplight_core::PinPair;

pub type SensorBus = I2c<'static, Async>;
pub type StatusPins = PinPair<Output<'static>, Output<'static>>;

/// Initialize the I2C bus to the sensor at 400 kHz
pub fn create_i2c_bus(
    i2c0: I2C0<'static>,
    sda: GPIO8<'static>,
    scl: GPIO9<'static>,
) -> Result<SensorBus, esp_hal::i2c::master::ConfigError> {
    let bus = I2c::new(
        i2c0,
        I2cConfig::default().with_frequency(Rate::from_khz(400)),
    )?
    .with_sda(sda)
    .with_scl(scl)
    .into_async();

    info!("I2C bus ready (SDA GPIO8, SCL GPIO9, 400 kHz)");
    Ok(bus)
}

/// The two SAO status lines, both driven low until the first reading.
pub fn create_status_pins(bit0: GPIO14<'static>, bit1: GPIO15<'static>) -> StatusPins {
    PinPair::new(
        Output::new(bit0, Level::Low, OutputConfig::default()),
        Output::new(bit1, Level::Low, OutputConfig::default()),
    )
}
