//! CO2 air quality status and classification
//!
//! Maps a CO2 reading onto the stoplight levels using two ordered thresholds.

use serde::{Deserialize, Serialize};

/// Default warning level in ppm.
///
/// US NIOSH (1987): 600-1000 ppm is "less clearly interpreted", so the yellow
/// band starts somewhere inside it.
pub const DEFAULT_WARNING_PPM: f32 = 800.0;

/// Default alarm level in ppm. 1000 ppm indicates inadequate ventilation.
pub const DEFAULT_ALARM_PPM: f32 = 1000.0;

/// Stoplight status driven onto the two SAO GPIO lines.
///
/// The discriminants are wired to the logic on the stoplight board and must
/// not change. GREEN <-> YELLOW and YELLOW <-> RED flip a single bit; only the
/// unlikely GREEN <-> RED jump flips both.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Co2Status {
    /// Both lines low
    Off = 0,
    /// bit0 high
    Green = 1,
    /// bit0 and bit1 high
    Yellow = 3,
    /// bit1 high
    Red = 2,
}

impl Co2Status {
    /// Classify a reading against `warning` and `alarm`.
    ///
    /// A value equal to a threshold belongs to the band above it.
    pub fn classify(value: f32, warning: f32, alarm: f32) -> Self {
        if value < warning {
            Self::Green
        } else if value < alarm {
            Self::Yellow
        } else {
            Self::Red
        }
    }

    /// Two-bit line encoding.
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Level of the low-order line (GPIO1 on the SAO header).
    pub const fn bit0(self) -> bool {
        self.bits() & 1 != 0
    }

    /// Level of the high-order line (GPIO2 on the SAO header).
    pub const fn bit1(self) -> bool {
        self.bits() & 2 != 0
    }

    /// Decode the status shown by a pair of line levels.
    pub const fn from_lines(bit0: bool, bit1: bool) -> Self {
        match (bit0, bit1) {
            (false, false) => Self::Off,
            (true, false) => Self::Green,
            (true, true) => Self::Yellow,
            (false, true) => Self::Red,
        }
    }

    /// Get the display label for this status
    pub const fn label(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }
}

impl core::fmt::Display for Co2Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Warning and alarm levels, in the same unit as the readings (ppm).
///
/// `warning < alarm` is expected but not enforced. With inverted thresholds
/// the classifier never reports YELLOW.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warning: f32,
    pub alarm: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: DEFAULT_WARNING_PPM,
            alarm: DEFAULT_ALARM_PPM,
        }
    }
}

impl Thresholds {
    pub const fn new(warning: f32, alarm: f32) -> Self {
        Self { warning, alarm }
    }

    pub fn classify(&self, value: f32) -> Co2Status {
        Co2Status::classify(value, self.warning, self.alarm)
    }

    pub fn is_ordered(&self) -> bool {
        self.warning < self.alarm
    }
}
