//! ESP32-S3 firmware-specific modules for the CO2 stoplight
//!
//! This crate contains the code that cannot compile on desktop targets:
//! peripheral initialization, the Wi-Fi station and the TCP transport for
//! dweet publishing. Everything else lives in `stoplight_core`.

#![no_std]

extern crate alloc;

pub mod app_state;
pub mod dweet;
pub mod settings;
pub mod wifi;
