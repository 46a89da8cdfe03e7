//! Wireless association with a configurable failure policy
//!
//! Whether a failed association halts start-up or is merely logged is a
//! deployment choice, so it is expressed as a [`NetworkPolicy`] rather than
//! hard-coded.

use core::str::FromStr;

use embedded_hal_async::delay::DelayNs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Seconds to wait for the link to come up.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u32 = 10;

/// What to do when the network cannot be brought up.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkPolicy {
    /// Abort start-up with an error
    FailFast,
    /// Log the failure and keep running without the network
    #[default]
    BestEffort,
}

impl FromStr for NetworkPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail-fast" => Ok(Self::FailFast),
            "best-effort" => Ok(Self::BestEffort),
            _ => Err(()),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    #[error("failed to start association: {0}")]
    Start(&'static str),
    #[error("link did not come up within {0} s")]
    Timeout(u32),
}

/// Wireless link collaborator.
pub trait WifiLink {
    /// Kick off association with the configured access point.
    fn begin_connect(&mut self) -> impl Future<Output = Result<(), NetworkError>>;

    /// Whether the link is associated and usable.
    fn is_connected(&mut self) -> impl Future<Output = bool>;
}

/// Bring the link up, polling once per second for up to `timeout_secs`.
///
/// Returns `Ok(true)` when connected. On failure, [`NetworkPolicy::FailFast`]
/// returns the error and [`NetworkPolicy::BestEffort`] logs it and returns
/// `Ok(false)`.
pub async fn associate<W, D>(
    link: &mut W,
    delay: &mut D,
    timeout_secs: u32,
    policy: NetworkPolicy,
) -> Result<bool, NetworkError>
where
    W: WifiLink,
    D: DelayNs,
{
    let outcome = connect(link, delay, timeout_secs).await;

    match (outcome, policy) {
        (Ok(()), _) => {
            info!("WiFi connected");
            Ok(true)
        }
        (Err(e), NetworkPolicy::FailFast) => Err(e),
        (Err(e), NetworkPolicy::BestEffort) => {
            warn!("Failed to establish a network connection: {}", e);
            Ok(false)
        }
    }
}

async fn connect<W, D>(link: &mut W, delay: &mut D, timeout_secs: u32) -> Result<(), NetworkError>
where
    W: WifiLink,
    D: DelayNs,
{
    link.begin_connect().await?;

    let mut remaining = timeout_secs;
    while remaining > 0 {
        if link.is_connected().await {
            return Ok(());
        }
        remaining -= 1;
        info!("Waiting for Wi-Fi connection...");
        delay.delay_ms(1000).await;
    }

    if link.is_connected().await {
        Ok(())
    } else {
        Err(NetworkError::Timeout(timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    /// Link that comes up after a number of status polls.
    struct ScriptedLink {
        polls_until_up: Option<u32>,
        polls: u32,
        refuse_start: bool,
    }

    impl WifiLink for ScriptedLink {
        async fn begin_connect(&mut self) -> Result<(), NetworkError> {
            if self.refuse_start {
                Err(NetworkError::Start("radio not initialized"))
            } else {
                Ok(())
            }
        }

        async fn is_connected(&mut self) -> bool {
            self.polls += 1;
            matches!(self.polls_until_up, Some(n) if self.polls > n)
        }
    }

    #[derive(Default)]
    struct NoDelay {
        sleeps: u32,
    }

    impl DelayNs for NoDelay {
        async fn delay_ns(&mut self, _ns: u32) {
            self.sleeps += 1;
        }

        async fn delay_ms(&mut self, _ms: u32) {
            self.sleeps += 1;
        }
    }

    fn link(polls_until_up: Option<u32>) -> ScriptedLink {
        ScriptedLink {
            polls_until_up,
            polls: 0,
            refuse_start: false,
        }
    }

    #[test]
    fn test_connects_after_waiting() {
        let mut l = link(Some(3));
        let mut delay = NoDelay::default();

        let up = block_on(associate(&mut l, &mut delay, 10, NetworkPolicy::FailFast));

        assert_eq!(up, Ok(true));
        assert_eq!(delay.sleeps, 3);
    }

    #[test]
    fn test_timeout_fail_fast() {
        let mut l = link(None);
        let mut delay = NoDelay::default();

        let result = block_on(associate(&mut l, &mut delay, 10, NetworkPolicy::FailFast));

        assert_eq!(result, Err(NetworkError::Timeout(10)));
        assert_eq!(delay.sleeps, 10);
    }

    #[test]
    fn test_timeout_best_effort() {
        let mut l = link(None);
        let mut delay = NoDelay::default();

        let result = block_on(associate(
            &mut l,
            &mut delay,
            10,
            NetworkPolicy::BestEffort,
        ));

        assert_eq!(result, Ok(false));
    }

    #[test]
    fn test_start_failure_respects_policy() {
        let mut l = link(Some(0));
        l.refuse_start = true;
        let mut delay = NoDelay::default();

        assert_eq!(
            block_on(associate(&mut l, &mut delay, 10, NetworkPolicy::FailFast)),
            Err(NetworkError::Start("radio not initialized"))
        );
        assert_eq!(
            block_on(associate(&mut l, &mut delay, 10, NetworkPolicy::BestEffort)),
            Ok(false)
        );
        assert_eq!(delay.sleeps, 0);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("fail-fast".parse::<NetworkPolicy>(), Ok(NetworkPolicy::FailFast));
        assert_eq!("best-effort".parse::<NetworkPolicy>(), Ok(NetworkPolicy::BestEffort));
        assert_eq!("sometimes".parse::<NetworkPolicy>(), Err(()));
        assert_eq!(NetworkPolicy::default(), NetworkPolicy::BestEffort);
    }
}
