//! Build-time settings captured from `.env` by `build.rs`

use log::{error, warn};
use stoplight_core::config::{Config, InternetConfig, MonitorConfig};

const OVERRIDES: [(&str, &str); 8] = [
    ("WARNING_PPM", env!("STOPLIGHT_WARNING_PPM")),
    ("ALARM_PPM", env!("STOPLIGHT_ALARM_PPM")),
    ("SAMPLE_DELAY_SECS", env!("STOPLIGHT_SAMPLE_DELAY_SECS")),
    ("ALTITUDE_M", env!("STOPLIGHT_ALTITUDE_M")),
    ("TEMPERATURE_OFFSET_C", env!("STOPLIGHT_TEMPERATURE_OFFSET_C")),
    ("AVERAGE_WINDOW", env!("STOPLIGHT_AVERAGE_WINDOW")),
    ("NETWORK_POLICY", env!("STOPLIGHT_NETWORK_POLICY")),
    ("WIFI_TIMEOUT_SECS", env!("STOPLIGHT_WIFI_TIMEOUT_SECS")),
];

/// Device configuration with every non-empty override applied.
///
/// A value that fails to parse is logged and the stock value is kept.
pub fn load() -> Config<'static> {
    let mut monitor = MonitorConfig::default();

    for (key, value) in OVERRIDES {
        if value.is_empty() {
            continue;
        }
        if let Err(e) = monitor.set(key, value) {
            error!("Ignoring STOPLIGHT_{}={:?}: {}", key, value, e);
        }
    }

    let internet = InternetConfig {
        ssid: env!("STOPLIGHT_SSID"),
        password: env!("STOPLIGHT_PASSWORD"),
        thing: env!("STOPLIGHT_THING"),
    };

    if !internet.publish_enabled() {
        warn!("STOPLIGHT_SSID or STOPLIGHT_THING not set, publishing disabled");
    }

    Config { monitor, internet }
}
