//! Runtime configuration
//!
//! Every tunable starts from the stock value and can be overridden by name
//! with [`MonitorConfig::set`]. The simulator feeds it environment variables;
//! the firmware feeds it values captured from `.env` at build time.

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::network::{DEFAULT_CONNECT_TIMEOUT_SECS, NetworkPolicy};
use crate::sensors::{MeasurementMode, SensorSettings};
use crate::status::Thresholds;

pub const DEFAULT_SAMPLE_DELAY_SECS: u32 = 40;
pub const DEFAULT_ALTITUDE_M: u16 = 400;
pub const DEFAULT_TEMPERATURE_OFFSET_C: f32 = 0.0;

/// Keys accepted by [`MonitorConfig::set`].
pub const KEYS: [&str; 8] = [
    "WARNING_PPM",
    "ALARM_PPM",
    "SAMPLE_DELAY_SECS",
    "ALTITUDE_M",
    "TEMPERATURE_OFFSET_C",
    "AVERAGE_WINDOW",
    "NETWORK_POLICY",
    "WIFI_TIMEOUT_SECS",
];

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown configuration key")]
    UnknownKey,
    #[error("invalid value for {0}")]
    InvalidValue(&'static str),
}

/// Suspicious but accepted settings, reported once at start-up.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigWarning {
    #[error("warning threshold {warning} ppm is not below alarm threshold {alarm} ppm")]
    InvertedThresholds { warning: f32, alarm: f32 },
    #[error("sample delay is zero, the loop will poll the sensor back to back")]
    ZeroSampleDelay,
    #[error("temperature offset {0} C is negative, the sensor will use 0 C")]
    NegativeTemperatureOffset(f32),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    pub thresholds: Thresholds,
    pub sample_delay_secs: u32,
    /// Passed through to the sensor
    pub altitude_m: u16,
    /// Passed through to the sensor, which only accepts values >= 0
    pub temperature_offset_c: f32,
    /// Samples per averaging window, 0 keeps one running average forever
    pub average_window: u32,
    pub network_policy: NetworkPolicy,
    pub wifi_timeout_secs: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            sample_delay_secs: DEFAULT_SAMPLE_DELAY_SECS,
            altitude_m: DEFAULT_ALTITUDE_M,
            temperature_offset_c: DEFAULT_TEMPERATURE_OFFSET_C,
            average_window: 0,
            network_policy: NetworkPolicy::default(),
            wifi_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

fn parse<T: core::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key))
}

impl MonitorConfig {
    /// Override one setting by key name (see [`KEYS`]).
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "WARNING_PPM" => self.thresholds.warning = parse("WARNING_PPM", value)?,
            "ALARM_PPM" => self.thresholds.alarm = parse("ALARM_PPM", value)?,
            "SAMPLE_DELAY_SECS" => self.sample_delay_secs = parse("SAMPLE_DELAY_SECS", value)?,
            "ALTITUDE_M" => self.altitude_m = parse("ALTITUDE_M", value)?,
            "TEMPERATURE_OFFSET_C" => {
                self.temperature_offset_c = parse("TEMPERATURE_OFFSET_C", value)?
            }
            "AVERAGE_WINDOW" => self.average_window = parse("AVERAGE_WINDOW", value)?,
            "NETWORK_POLICY" => self.network_policy = parse("NETWORK_POLICY", value)?,
            "WIFI_TIMEOUT_SECS" => self.wifi_timeout_secs = parse("WIFI_TIMEOUT_SECS", value)?,
            _ => return Err(ConfigError::UnknownKey),
        }
        Ok(())
    }

    /// Settings that are accepted but probably wrong.
    pub fn warnings(&self) -> heapless::Vec<ConfigWarning, 3> {
        let mut warnings = heapless::Vec::new();
        if !self.thresholds.is_ordered() {
            let _ = warnings.push(ConfigWarning::InvertedThresholds {
                warning: self.thresholds.warning,
                alarm: self.thresholds.alarm,
            });
        }
        if self.sample_delay_secs == 0 {
            let _ = warnings.push(ConfigWarning::ZeroSampleDelay);
        }
        if self.temperature_offset_c < 0.0 {
            let _ = warnings.push(ConfigWarning::NegativeTemperatureOffset(
                self.temperature_offset_c,
            ));
        }
        warnings
    }

    pub const fn measurement_mode(&self) -> MeasurementMode {
        MeasurementMode::for_sample_delay(self.sample_delay_secs)
    }

    pub const fn sensor_settings(&self) -> SensorSettings {
        SensorSettings {
            altitude_m: self.altitude_m,
            temperature_offset_c: self.temperature_offset_c,
            mode: self.measurement_mode(),
        }
    }
}

/// Full device configuration.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct Config<'a> {
    pub monitor: MonitorConfig,
    pub internet: InternetConfig<'a>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct InternetConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
    /// dweet thing name; publishing is off when empty
    pub thing: &'a str,
}

impl InternetConfig<'_> {
    pub fn publish_enabled(&self) -> bool {
        !self.ssid.is_empty() && !self.thing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = MonitorConfig::default();

        assert_eq!(c.thresholds, Thresholds::new(800.0, 1000.0));
        assert_eq!(c.sample_delay_secs, 40);
        assert_eq!(c.altitude_m, 400);
        assert_eq!(c.temperature_offset_c, 0.0);
        assert_eq!(c.network_policy, NetworkPolicy::BestEffort);
        assert_eq!(c.wifi_timeout_secs, 10);
        assert_eq!(c.measurement_mode(), MeasurementMode::LowPowerPeriodic);
        assert!(c.warnings().is_empty());
    }

    #[test]
    fn test_set_every_key() {
        let mut c = MonitorConfig::default();
        let values = ["700", "900", "20", "1200", "2.0", "90", "fail-fast", "30"];

        for (key, value) in KEYS.iter().zip(values) {
            c.set(key, value).unwrap();
        }

        assert_eq!(c.thresholds, Thresholds::new(700.0, 900.0));
        assert_eq!(c.sample_delay_secs, 20);
        assert_eq!(c.altitude_m, 1200);
        assert_eq!(c.temperature_offset_c, 2.0);
        assert_eq!(c.average_window, 90);
        assert_eq!(c.network_policy, NetworkPolicy::FailFast);
        assert_eq!(c.wifi_timeout_secs, 30);

        let settings = c.sensor_settings();
        assert_eq!(settings.mode, MeasurementMode::Periodic);
        assert_eq!(settings.altitude_m, 1200);
        assert_eq!(settings.temperature_offset_c, 2.0);
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut c = MonitorConfig::default();

        assert_eq!(c.set("COLOR", "red"), Err(ConfigError::UnknownKey));
        assert_eq!(
            c.set("ALTITUDE_M", "-5"),
            Err(ConfigError::InvalidValue("ALTITUDE_M"))
        );
        assert_eq!(
            c.set("NETWORK_POLICY", "maybe"),
            Err(ConfigError::InvalidValue("NETWORK_POLICY"))
        );
        assert_eq!(c, MonitorConfig::default());
    }

    #[test]
    fn test_set_trims_whitespace() {
        let mut c = MonitorConfig::default();
        c.set("WARNING_PPM", " 750 ").unwrap();
        assert_eq!(c.thresholds.warning, 750.0);
    }

    #[test]
    fn test_inverted_thresholds_warn_but_are_kept() {
        let mut c = MonitorConfig::default();
        c.set("WARNING_PPM", "1200").unwrap();
        c.set("SAMPLE_DELAY_SECS", "0").unwrap();

        let warnings = c.warnings();
        assert_eq!(
            warnings.as_slice(),
            &[
                ConfigWarning::InvertedThresholds {
                    warning: 1200.0,
                    alarm: 1000.0
                },
                ConfigWarning::ZeroSampleDelay
            ]
        );
        assert_eq!(c.thresholds.warning, 1200.0);
    }

    #[test]
    fn test_negative_offset_warns() {
        let mut c = MonitorConfig::default();
        c.set("TEMPERATURE_OFFSET_C", "-1.5").unwrap();

        assert_eq!(
            c.warnings().as_slice(),
            &[ConfigWarning::NegativeTemperatureOffset(-1.5)]
        );
        // Kept as written; the sensor driver clamps it
        assert_eq!(c.sensor_settings().temperature_offset_c, -1.5);
    }

    #[test]
    fn test_every_warning_fits() {
        let mut c = MonitorConfig::default();
        c.set("WARNING_PPM", "1200").unwrap();
        c.set("SAMPLE_DELAY_SECS", "0").unwrap();
        c.set("TEMPERATURE_OFFSET_C", "-4").unwrap();

        assert_eq!(c.warnings().len(), 3);
    }

    #[test]
    fn test_config_round_trips_through_postcard() {
        let mut monitor = MonitorConfig::default();
        monitor.set("ALARM_PPM", "1400").unwrap();
        monitor.set("NETWORK_POLICY", "fail-fast").unwrap();
        let config = Config {
            monitor,
            internet: InternetConfig {
                ssid: "Supercon",
                password: "hunter2",
                thing: "co2sao",
            },
        };

        let mut buf = [0u8; 128];
        let bytes = postcard::to_slice(&config, &mut buf).unwrap();
        let decoded: Config<'_> = postcard::from_bytes(bytes).unwrap();

        assert_eq!(decoded.monitor, config.monitor);
        assert_eq!(decoded.internet.ssid, "Supercon");
        assert_eq!(decoded.internet.password, "hunter2");
        assert_eq!(decoded.internet.thing, "co2sao");
        assert!(decoded.internet.publish_enabled());
    }

    #[test]
    fn test_publish_enabled() {
        let mut internet = InternetConfig::default();
        assert!(!internet.publish_enabled());

        internet.ssid = "Supercon";
        internet.thing = "co2sao";
        assert!(internet.publish_enabled());

        let config = Config {
            internet,
            ..Default::default()
        };
        assert_eq!(config.monitor, MonitorConfig::default());
    }
}
