//! I2C bus discovery
//!
//! Used once at start-up to report what is attached to the SAO connector.

use embedded_hal_async::i2c::I2c;
use log::{info, warn};

/// First non-reserved 7-bit address.
pub const FIRST_ADDRESS: u8 = 0x08;
/// Last non-reserved 7-bit address.
pub const LAST_ADDRESS: u8 = 0x77;

/// Number of addresses probed by [`scan`].
pub const SCAN_CAPACITY: usize = (LAST_ADDRESS - FIRST_ADDRESS + 1) as usize;

pub type Devices = heapless::Vec<u8, SCAN_CAPACITY>;

/// Probe every non-reserved address with a one-byte read and collect the
/// ones that acknowledge.
pub async fn scan<I: I2c>(i2c: &mut I) -> Devices {
    let mut found = Devices::new();
    let mut byte = [0u8; 1];

    for address in FIRST_ADDRESS..=LAST_ADDRESS {
        if i2c.read(address, &mut byte).await.is_ok() {
            // Capacity covers the whole probed range
            let _ = found.push(address);
        }
    }

    found
}

/// Log the scan result the way the start-up banner shows it.
pub fn log_devices(devices: &[u8]) {
    if devices.is_empty() {
        warn!("No I2C device found");
        return;
    }

    info!("Number of I2C devices found = {}", devices.len());
    for address in devices {
        info!("    I2C device at address = {:#04x}", address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    struct FakeBus<'a> {
        present: &'a [u8],
        probes: u32,
    }

    impl ErrorType for FakeBus<'_> {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus<'_> {
        async fn transaction(
            &mut self,
            address: u8,
            _operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            self.probes += 1;
            if self.present.contains(&address) {
                Ok(())
            } else {
                Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
            }
        }
    }

    #[test]
    fn test_scan_finds_sensor() {
        let mut bus = FakeBus {
            present: &[0x62, 0x10],
            probes: 0,
        };

        let found = block_on(scan(&mut bus));

        assert_eq!(found.as_slice(), &[0x10, 0x62]);
        assert_eq!(bus.probes as usize, SCAN_CAPACITY);
    }

    #[test]
    fn test_scan_skips_reserved_addresses() {
        let mut bus = FakeBus {
            present: &[0x00, 0x07, 0x78, 0x7F],
            probes: 0,
        };

        assert!(block_on(scan(&mut bus)).is_empty());
    }
}
