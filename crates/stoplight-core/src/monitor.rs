//! The sample-classify-output loop
//!
//! [`Monitor`] owns one instance of every collaborator and runs them in
//! sequence: wait for a reading, fold it into the running statistics,
//! classify it, update the stoplight and optionally publish it. There are no
//! globals; whatever builds the monitor decides which sensor, lines, delay
//! and publisher it gets.

use embedded_hal_async::delay::DelayNs;
use log::{debug, error, info, warn};

use crate::config::MonitorConfig;
use crate::measure::Measure;
use crate::publish::{Payload, PublishError, Publisher};
use crate::sensors::{Co2Readings, Co2Sensor, DATA_READY_RETRY_MS, SensorError, wait_for_reading};
use crate::status::Co2Status;
use crate::stoplight::{StatusLines, Stoplight};

/// Placeholder publisher for builds without a network.
pub struct NoPublisher;

impl Publisher for NoPublisher {
    async fn publish(&mut self, _payload: &Payload) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Outcome of one successful loop iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cycle {
    /// 1-based reading number since start-up
    pub sample: u32,
    pub readings: Co2Readings,
    pub status: Co2Status,
    /// Whether the status lines were written
    pub changed: bool,
}

pub struct Monitor<S, L, D, P = NoPublisher> {
    sensor: S,
    stoplight: Stoplight<L>,
    delay: D,
    publisher: Option<P>,
    config: MonitorConfig,
    samples: u32,
    co2: Measure,
    temperature: Measure,
    humidity: Measure,
}

impl<S, L, D> Monitor<S, L, D>
where
    S: Co2Sensor,
    L: StatusLines,
    D: DelayNs,
{
    /// Build a monitor without publishing. Drives the lines to OFF and logs
    /// any configuration warnings.
    pub fn new(sensor: S, lines: L, delay: D, config: MonitorConfig) -> Self {
        for warning in config.warnings() {
            warn!("Configuration: {}", warning);
        }

        Self {
            sensor,
            stoplight: Stoplight::new(lines),
            delay,
            publisher: None,
            config,
            samples: 0,
            co2: Measure::new(),
            temperature: Measure::new(),
            humidity: Measure::new(),
        }
    }
}

impl<S, L, D, P> Monitor<S, L, D, P>
where
    S: Co2Sensor,
    L: StatusLines,
    D: DelayNs,
    P: Publisher,
{
    /// Publish every reading through `publisher`.
    pub fn with_publisher<Q: Publisher>(self, publisher: Q) -> Monitor<S, L, D, Q> {
        Monitor {
            sensor: self.sensor,
            stoplight: self.stoplight,
            delay: self.delay,
            publisher: Some(publisher),
            config: self.config,
            samples: self.samples,
            co2: self.co2,
            temperature: self.temperature,
            humidity: self.humidity,
        }
    }

    /// Run one sample-classify-output pass.
    ///
    /// Blocks until the sensor has data. A failed publish is logged and does
    /// not fail the step.
    pub async fn step(&mut self) -> Result<Cycle, SensorError> {
        let readings =
            wait_for_reading(&mut self.sensor, &mut self.delay, DATA_READY_RETRY_MS).await?;

        self.samples = self.samples.wrapping_add(1);
        self.co2.include(readings.co2_ppm);
        self.temperature.include(readings.temperature_c);
        self.humidity.include(readings.humidity_rh);

        let status = self.config.thresholds.classify(readings.co2_ppm);
        let changed = self.stoplight.apply(status);

        info!(
            "#{}: {:.0} ppm CO2, {:.1} *F, {:.1} %RH -> {} (CO2: {:.0}->{:.0}->{:.0})",
            self.samples,
            readings.co2_ppm,
            readings.temperature_f(),
            readings.humidity_rh,
            status,
            self.co2.minimum(),
            self.co2.average(),
            self.co2.maximum()
        );
        if changed {
            debug!("Stoplight lines set to {:#04b}", status.bits());
        }

        if let Some(publisher) = self.publisher.as_mut() {
            if let Err(e) = publisher.publish(&Payload::from(&readings)).await {
                warn!("Publish failed, dropping reading: {}", e);
            }
        }

        self.roll_average_window();

        Ok(Cycle {
            sample: self.samples,
            readings,
            status,
            changed,
        })
    }

    /// [`step`](Self::step), then sleep for the configured sample delay.
    ///
    /// Sensor errors are logged; the next cycle starts from scratch.
    pub async fn cycle(&mut self) -> Option<Cycle> {
        let outcome = match self.step().await {
            Ok(cycle) => Some(cycle),
            Err(e) => {
                error!("Sensor read failed: {}", e);
                None
            }
        };

        self.delay
            .delay_ms(self.config.sample_delay_secs.saturating_mul(1000))
            .await;
        outcome
    }

    /// Loop for the life of the process.
    pub async fn run(&mut self) -> ! {
        info!(
            "Monitoring CO2 every {} s (warning {} ppm, alarm {} ppm)",
            self.config.sample_delay_secs,
            self.config.thresholds.warning,
            self.config.thresholds.alarm
        );

        loop {
            self.cycle().await;
        }
    }

    fn roll_average_window(&mut self) {
        let window = self.config.average_window;
        if window == 0 || self.co2.count() < window {
            return;
        }

        info!(
            "CO2 over last {} samples: avg {:.0}, min {:.0}, max {:.0} ppm",
            self.co2.count(),
            self.co2.average(),
            self.co2.minimum(),
            self.co2.maximum()
        );

        self.co2.reset_average();
        self.temperature.reset_average();
        self.humidity.reset_average();
    }

    /// Readings taken since start-up. Not affected by the averaging window.
    pub const fn samples(&self) -> u32 {
        self.samples
    }

    pub const fn co2(&self) -> &Measure {
        &self.co2
    }

    pub const fn temperature(&self) -> &Measure {
        &self.temperature
    }

    pub const fn humidity(&self) -> &Measure {
        &self.humidity
    }

    pub const fn stoplight(&self) -> &Stoplight<L> {
        &self.stoplight
    }

    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
