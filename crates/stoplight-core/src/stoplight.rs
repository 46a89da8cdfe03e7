//! Debounced stoplight output
//!
//! [`Stoplight`] remembers the last status it drove and only touches the two
//! output lines when the status changes, which avoids redundant pin writes
//! and LED flicker.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::status::Co2Status;

/// Sink for the two status lines.
///
/// Writes are infallible at this layer; hardware faults are the
/// implementation's concern.
pub trait StatusLines {
    /// Drive both lines. `bit0` is the low-order line.
    fn set_lines(&mut self, bit0: bool, bit1: bool);
}

impl<T: StatusLines + ?Sized> StatusLines for &mut T {
    fn set_lines(&mut self, bit0: bool, bit1: bool) {
        (**self).set_lines(bit0, bit1);
    }
}

/// Two GPIO output pins acting as the status lines.
pub struct PinPair<P0, P1> {
    bit0: P0,
    bit1: P1,
}

impl<P0: OutputPin, P1: OutputPin> PinPair<P0, P1> {
    pub const fn new(bit0: P0, bit1: P1) -> Self {
        Self { bit0, bit1 }
    }

    pub fn release(self) -> (P0, P1) {
        (self.bit0, self.bit1)
    }
}

impl<P0: OutputPin, P1: OutputPin> StatusLines for PinPair<P0, P1> {
    fn set_lines(&mut self, bit0: bool, bit1: bool) {
        if let Err(e) = self.bit0.set_state(PinState::from(bit0)) {
            warn!("Failed to drive status bit0: {:?}", e);
        }
        if let Err(e) = self.bit1.set_state(PinState::from(bit1)) {
            warn!("Failed to drive status bit1: {:?}", e);
        }
    }
}

/// Status output driver with change-only writes.
///
/// State machine over OFF/GREEN/YELLOW/RED. Every transition is allowed and
/// there is no terminal state; applying the current status is a no-op.
pub struct Stoplight<L> {
    lines: L,
    status: Co2Status,
}

impl<L: StatusLines> Stoplight<L> {
    /// Take ownership of the lines and drive them to the idle (OFF) state.
    pub fn new(mut lines: L) -> Self {
        lines.set_lines(false, false);
        Self {
            lines,
            status: Co2Status::Off,
        }
    }

    /// Show `status`. Returns `true` if the lines were written.
    pub fn apply(&mut self, status: Co2Status) -> bool {
        if status == self.status {
            return false;
        }

        self.lines.set_lines(status.bit0(), status.bit1());
        self.status = status;
        true
    }

    /// Status currently shown on the lines.
    pub const fn status(&self) -> Co2Status {
        self.status
    }

    pub const fn lines(&self) -> &L {
        &self.lines
    }

    pub fn release(self) -> L {
        self.lines
    }
}
