//! Hardware-independent core library for the CO2 stoplight
//!
//! This crate contains all platform-agnostic logic for the stoplight SAO
//! add-on: running statistics, CO2 status classification, the debounced
//! two-line status output, the SCD4x sensor driver, network/publish
//! collaborator traits and the sampling loop that ties them together.
//!
//! It is `#![no_std]` so it compiles on both embedded targets (ESP32-S3) and
//! desktop hosts (for the simulator). Unit tests link `std` for proptest.

#![cfg_attr(not(test), no_std)]

pub mod bus;
pub mod config;
pub mod measure;
pub mod monitor;
pub mod network;
pub mod publish;
pub mod sensors;
pub mod status;
pub mod stoplight;

pub use measure::Measure;
pub use monitor::{Cycle, Monitor};
pub use status::{Co2Status, Thresholds};
pub use stoplight::{PinPair, StatusLines, Stoplight};
