use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use log::{error, info, warn};
use scd4x::Scd4xAsync;

use super::{Co2Readings, Co2Sensor, MeasurementMode, SensorError, SensorSettings};

/// Fixed I2C address of the SCD40/SCD41.
pub const SCD4X_ADDRESS: u8 = 0x62;

/// Log a driver failure and fold it into [`SensorError`].
fn sensor_error<E: core::fmt::Debug>(
    operation: &'static str,
) -> impl FnOnce(scd4x::Error<E>) -> SensorError {
    move |e| {
        error!("SCD4x {} failed: {:?}", operation, e);
        match e {
            scd4x::Error::Crc => SensorError::Crc { operation },
            _ => SensorError::Bus { operation },
        }
    }
}

/// SCD40/SCD41 CO2 sensor.
///
/// Call [`configure`](Self::configure) once during start-up. Afterwards the
/// sensor samples on its own cadence and is polled through [`Co2Sensor`].
pub struct Scd4x<I, D> {
    sensor: Scd4xAsync<I, D>,
}

impl<I: I2c, D: DelayNs> Scd4x<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self {
            sensor: Scd4xAsync::new(i2c, delay),
        }
    }

    /// Stop any running measurement, apply `settings` and start the
    /// selected periodic mode. Returns the sensor serial number.
    ///
    /// The serial number, offset and altitude are only reachable while
    /// measurement is stopped.
    pub async fn configure(&mut self, settings: &SensorSettings) -> Result<u64, SensorError> {
        self.sensor
            .stop_periodic_measurement()
            .await
            .map_err(sensor_error("stop_periodic_measurement"))?;

        let serial = self.serial_number().await?;

        let mut offset_c = settings.temperature_offset_c;
        if offset_c < 0.0 {
            warn!(
                "SCD4x: temperature offset {} C is negative, using 0 C",
                offset_c
            );
            offset_c = 0.0;
        }

        self.sensor
            .set_temperature_offset(offset_c)
            .await
            .map_err(sensor_error("set_temperature_offset"))?;
        self.sensor
            .set_altitude(settings.altitude_m)
            .await
            .map_err(sensor_error("set_sensor_altitude"))?;

        match settings.mode {
            MeasurementMode::LowPowerPeriodic => self
                .sensor
                .start_low_power_periodic_measurements()
                .await
                .map_err(sensor_error("start_low_power_periodic_measurement"))?,
            MeasurementMode::Periodic => self
                .sensor
                .start_periodic_measurement()
                .await
                .map_err(sensor_error("start_periodic_measurement"))?,
        }

        info!(
            "SCD4x: {:?} measurement started (altitude {} m, offset {} C)",
            settings.mode, settings.altitude_m, offset_c
        );
        Ok(serial)
    }

    /// 48-bit serial number. Measurement must be stopped.
    pub async fn serial_number(&mut self) -> Result<u64, SensorError> {
        self.sensor
            .serial_number()
            .await
            .map_err(sensor_error("get_serial_number"))
    }

    /// Whether a measurement is waiting to be read.
    pub async fn get_data_ready_status(&mut self) -> Result<bool, SensorError> {
        self.sensor
            .data_ready_status()
            .await
            .map_err(sensor_error("get_data_ready_status"))
    }

    pub async fn read_measurement(&mut self) -> Result<Co2Readings, SensorError> {
        let data = self
            .sensor
            .measurement()
            .await
            .map_err(sensor_error("read_measurement"))?;

        Ok(Co2Readings {
            co2_ppm: f32::from(data.co2),
            temperature_c: data.temperature,
            humidity_rh: data.humidity,
        })
    }
}

impl<I: I2c, D: DelayNs> Co2Sensor for Scd4x<I, D> {
    async fn data_ready(&mut self) -> Result<bool, SensorError> {
        self.get_data_ready_status().await
    }

    async fn read(&mut self) -> Result<Co2Readings, SensorError> {
        self.read_measurement().await
    }
}
