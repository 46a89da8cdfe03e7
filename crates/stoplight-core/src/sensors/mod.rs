//! Sensor collaborator interface
//!
//! The sampling loop only needs two things from a CO2 sensor: whether a new
//! measurement is ready, and the measurement itself. [`Co2Sensor`] is that
//! narrow interface; [`Scd4x`] adapts the `scd4x` driver crate to it and
//! the simulator provides a synthetic implementation.

mod scd4x;

pub use scd4x::*;

use embedded_hal_async::delay::DelayNs;
use thiserror_no_std::Error;

/// Backoff between "data ready" polls.
pub const DATA_READY_RETRY_MS: u32 = 1000;

/// Sample delays above this run the sensor in low-power periodic mode.
pub const LOW_POWER_MIN_SAMPLE_DELAY_SECS: u32 = 30;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("sensor command {operation} failed")]
    Bus { operation: &'static str },
    #[error("CRC mismatch in {operation} response")]
    Crc { operation: &'static str },
}

/// One measurement from a CO2/temperature/humidity sensor.
///
/// Only `co2_ppm` drives the stoplight; temperature and humidity are carried
/// through for logging and publishing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Co2Readings {
    pub co2_ppm: f32,
    pub temperature_c: f32,
    pub humidity_rh: f32,
}

impl Co2Readings {
    pub fn temperature_f(&self) -> f32 {
        celsius_to_fahrenheit(self.temperature_c)
    }
}

pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}

/// Trait for CO2 sensors polled by the sampling loop.
pub trait Co2Sensor {
    /// Whether a new measurement can be read. Not being ready is not an error.
    fn data_ready(&mut self) -> impl Future<Output = Result<bool, SensorError>>;

    /// Read the latest measurement.
    fn read(&mut self) -> impl Future<Output = Result<Co2Readings, SensorError>>;
}

impl<T: Co2Sensor + ?Sized> Co2Sensor for &mut T {
    async fn data_ready(&mut self) -> Result<bool, SensorError> {
        (**self).data_ready().await
    }

    async fn read(&mut self) -> Result<Co2Readings, SensorError> {
        (**self).read().await
    }
}

/// Periodic measurement mode of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementMode {
    /// Standard cadence (one sample every 5 s on the SCD4x)
    Periodic,
    /// Low-power cadence (one sample every 30 s on the SCD4x)
    LowPowerPeriodic,
}

impl MeasurementMode {
    /// Choose the mode for a sampling loop cadence. Decided once at start-up.
    pub const fn for_sample_delay(sample_delay_secs: u32) -> Self {
        if sample_delay_secs > LOW_POWER_MIN_SAMPLE_DELAY_SECS {
            Self::LowPowerPeriodic
        } else {
            Self::Periodic
        }
    }
}

/// Settings handed verbatim to the sensor before measurement starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSettings {
    pub altitude_m: u16,
    pub temperature_offset_c: f32,
    pub mode: MeasurementMode,
}

/// Block until `sensor` has a measurement, then read it.
///
/// Polls `data_ready` every `retry_ms` with no upper bound: the sensor's own
/// cadence decides when data shows up. Bus errors end the wait.
pub async fn wait_for_reading<S, D>(
    sensor: &mut S,
    delay: &mut D,
    retry_ms: u32,
) -> Result<Co2Readings, SensorError>
where
    S: Co2Sensor,
    D: DelayNs,
{
    while !sensor.data_ready().await? {
        delay.delay_ms(retry_ms).await;
    }

    sensor.read().await
}
