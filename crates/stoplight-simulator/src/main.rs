//! Desktop simulator for the CO2 stoplight.
//!
//! Runs the real `stoplight-core` sampling loop against a synthetic SCD4x,
//! prints the two SAO status lines instead of driving GPIOs, and logs the
//! dweet request it would send instead of touching the network.
//!
//! # Environment
//!
//! | Variable                        | Meaning                                   |
//! |---------------------------------|-------------------------------------------|
//! | `STOPLIGHT_<KEY>`               | Any key from `stoplight_core::config::KEYS` |
//! | `STOPLIGHT_THING`               | dweet thing name, enables publishing      |
//! | `STOPLIGHT_SIM_LINK_DOWN`       | Set to make the simulated Wi-Fi never associate |
//! | `STOPLIGHT_CYCLES`              | Stop after this many cycles               |
//! | `STOPLIGHT_SPEEDUP`             | Divide every sleep by this factor         |
//!
//! A `.env` file in the working directory is loaded first.

use std::env;
use std::process;
use std::time::Duration;

use embassy_futures::block_on;
use embedded_hal_async::delay::DelayNs;
use log::{error, info, warn};

use stoplight_core::config::{KEYS, MonitorConfig};
use stoplight_core::network::{NetworkError, WifiLink, associate};
use stoplight_core::publish::{Payload, PublishError, Publisher, dweet_path};
use stoplight_core::sensors::{Co2Readings, Co2Sensor, SensorError, SensorSettings};
use stoplight_core::{Co2Status, Monitor, StatusLines};

const ENV_PREFIX: &str = "STOPLIGHT_";

/// Default speed-up so a 40 s cadence is watchable.
const DEFAULT_SPEEDUP: u32 = 20;

// ---------------------------------------------------------------------------
// Simulated collaborators
// ---------------------------------------------------------------------------

/// Synthetic SCD4x producing slowly varying readings.
///
/// CO2 swings between roughly 420 and 1280 ppm so every stoplight band is
/// visited. The first poll after each read reports "not ready" to exercise
/// the retry path.
struct SimulatedScd4x {
    elapsed_secs: f64,
    step_secs: f64,
    ready: bool,
}

impl SimulatedScd4x {
    fn new(settings: &SensorSettings, sample_delay_secs: u32) -> Self {
        info!(
            "Simulated SCD4x: {:?} measurement (altitude {} m, offset {} C)",
            settings.mode, settings.altitude_m, settings.temperature_offset_c
        );
        Self {
            elapsed_secs: 0.0,
            step_secs: f64::from(sample_delay_secs.max(1)),
            ready: false,
        }
    }
}

impl Co2Sensor for SimulatedScd4x {
    async fn data_ready(&mut self) -> Result<bool, SensorError> {
        let ready = self.ready;
        self.ready = !self.ready;
        Ok(ready)
    }

    async fn read(&mut self) -> Result<Co2Readings, SensorError> {
        self.elapsed_secs += self.step_secs;
        let t = self.elapsed_secs;

        // CO₂: 850 ppm baseline, 400 ppm swing over ~1 h
        let co2 = 850.0 + 400.0 * (t / 600.0).sin() + 30.0 * (t / 97.0).cos();
        // Temperature: 20–24 °C
        let temperature = 22.0 + 2.0 * (t / 900.0).sin();
        // Humidity: 40–50 %
        let humidity = 45.0 + 5.0 * (t / 1300.0).cos();

        Ok(Co2Readings {
            co2_ppm: co2.round() as f32,
            temperature_c: temperature as f32,
            humidity_rh: humidity as f32,
        })
    }
}

/// Prints the SAO lines instead of driving pins.
struct ConsoleLines;

impl StatusLines for ConsoleLines {
    fn set_lines(&mut self, bit0: bool, bit1: bool) {
        info!(
            "SAO lines: GPIO1={} GPIO2={} ({})",
            u8::from(bit0),
            u8::from(bit1),
            Co2Status::from_lines(bit0, bit1)
        );
    }
}

/// Logs the dweet request that would be sent.
struct LogPublisher {
    thing: String,
}

impl Publisher for LogPublisher {
    async fn publish(&mut self, payload: &Payload) -> Result<(), PublishError> {
        let path = dweet_path(&self.thing, payload)?;
        info!("Publish: GET http://dweet.io{}", path);
        Ok(())
    }
}

/// Wi-Fi stand-in that associates after a couple of polls, or never.
struct SimulatedLink {
    down: bool,
    polls: u32,
}

impl WifiLink for SimulatedLink {
    async fn begin_connect(&mut self) -> Result<(), NetworkError> {
        info!("Simulated Wi-Fi: associating");
        Ok(())
    }

    async fn is_connected(&mut self) -> bool {
        self.polls += 1;
        !self.down && self.polls > 2
    }
}

/// Thread-sleep delay, optionally sped up.
struct StdDelay {
    speedup: u32,
}

impl DelayNs for StdDelay {
    async fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns / self.speedup)));
    }

    async fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms / self.speedup)));
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn prefixed(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}{name}")).ok()
}

/// Build the monitor configuration from `STOPLIGHT_<KEY>` variables.
fn load_config() -> Result<MonitorConfig, String> {
    let mut config = MonitorConfig::default();

    for key in KEYS {
        if let Some(value) = prefixed(key) {
            config
                .set(key, &value)
                .map_err(|e| format!("{ENV_PREFIX}{key}={value}: {e}"))?;
        }
    }

    Ok(config)
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, String> {
    prefixed(name)
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| format!("{ENV_PREFIX}{name}: invalid value {v:?}"))
        })
        .transpose()
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = block_on(simulate()) {
        error!("{}", e);
        process::exit(1);
    }

    info!("Simulator exiting");
}

async fn simulate() -> Result<(), String> {
    let config = load_config()?;
    let cycles: Option<u32> = parse_var("CYCLES")?;
    let speedup = parse_var::<u32>("SPEEDUP")?
        .unwrap_or(DEFAULT_SPEEDUP)
        .max(1);

    info!("Starting CO2 stoplight simulator (sleeps sped up {}x)", speedup);

    let mut delay = StdDelay { speedup };
    let thing = prefixed("THING").filter(|t| !t.is_empty());

    let publish = match &thing {
        Some(_) => {
            let mut link = SimulatedLink {
                down: prefixed("SIM_LINK_DOWN").is_some(),
                polls: 0,
            };
            associate(
                &mut link,
                &mut delay,
                config.wifi_timeout_secs,
                config.network_policy,
            )
            .await
            .map_err(|e| format!("Network setup failed: {e}"))?
        }
        None => false,
    };

    let sensor = SimulatedScd4x::new(&config.sensor_settings(), config.sample_delay_secs);
    let monitor = Monitor::new(sensor, ConsoleLines, delay, config);

    match thing {
        Some(thing) if publish => {
            info!("Publishing readings as dweet thing '{}'", thing);
            drive(monitor.with_publisher(LogPublisher { thing }), cycles).await
        }
        _ => {
            warn!("Publishing disabled");
            drive(monitor, cycles).await
        }
    }
}

async fn drive<S, L, D, P>(mut monitor: Monitor<S, L, D, P>, cycles: Option<u32>) -> Result<(), String>
where
    S: Co2Sensor,
    L: StatusLines,
    D: DelayNs,
    P: Publisher,
{
    let Some(cycles) = cycles else {
        monitor.run().await
    };

    for _ in 0..cycles {
        monitor.cycle().await;
    }

    let co2 = monitor.co2();
    info!(
        "{} samples: avg {:.0}, min {:.0}, max {:.0} ppm CO2",
        co2.count(),
        co2.average(),
        co2.minimum(),
        co2.maximum()
    );
    Ok(())
}
