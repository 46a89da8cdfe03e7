//! Captures `.env` settings at build time.
//!
//! Every `STOPLIGHT_*` variable the firmware reads is exported to rustc, empty
//! when unset, so `env!` always resolves.

const VARS: [&str; 11] = [
    "STOPLIGHT_SSID",
    "STOPLIGHT_PASSWORD",
    "STOPLIGHT_THING",
    "STOPLIGHT_WARNING_PPM",
    "STOPLIGHT_ALARM_PPM",
    "STOPLIGHT_SAMPLE_DELAY_SECS",
    "STOPLIGHT_ALTITUDE_M",
    "STOPLIGHT_TEMPERATURE_OFFSET_C",
    "STOPLIGHT_AVERAGE_WINDOW",
    "STOPLIGHT_NETWORK_POLICY",
    "STOPLIGHT_WIFI_TIMEOUT_SECS",
];

fn main() {
    if let Ok(path) = dotenvy::dotenv() {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    for var in VARS {
        println!("cargo:rerun-if-env-changed={var}");
        let value = std::env::var(var).unwrap_or_default();
        println!("cargo:rustc-env={var}={value}");
    }

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
