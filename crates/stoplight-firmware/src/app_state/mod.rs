//! Application-wide state and error types for the stoplight firmware

mod hardware;

pub use hardware::*;

use thiserror_no_std::Error;

use stoplight_core::network::NetworkError;
use stoplight_core::sensors::SensorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRunState {
    Uninitialized,
    WifiConnecting,
    WifiConnected,
    SensorStarting,
    Sampling,
    Error,
}

/// What the device has done so far, logged on every transition.
#[derive(Debug)]
pub struct AppState {
    pub run_state: AppRunState,
    pub wifi_connected: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub const fn new() -> Self {
        Self {
            run_state: AppRunState::Uninitialized,
            wifi_connected: false,
        }
    }

    pub fn transition(&mut self, next: AppRunState) {
        log::info!("State: {:?} -> {:?}", self.run_state, next);
        self.run_state = next;
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("WiFi connection failed: {0}")]
    Wifi(NetworkError),
    #[error("Sensor error: {0}")]
    Sensor(SensorError),
    #[error("No SCD4x found at 0x62")]
    SensorMissing,
}

impl From<NetworkError> for AppError {
    fn from(e: NetworkError) -> Self {
        Self::Wifi(e)
    }
}

impl From<SensorError> for AppError {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}
