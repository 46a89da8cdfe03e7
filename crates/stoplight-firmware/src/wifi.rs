//! Wi-Fi station on top of `esp-radio` and `embassy-net`

use embassy_net::{Runner, Stack};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice};
use log::{info, warn};
use stoplight_core::network::{NetworkError, WifiLink};

/// Station link; "connected" means associated and holding a DHCP lease.
pub struct EspWifi<'a> {
    controller: WifiController<'a>,
    stack: Stack<'a>,
    ssid: &'a str,
    password: &'a str,
}

impl<'a> EspWifi<'a> {
    pub fn new(
        controller: WifiController<'a>,
        stack: Stack<'a>,
        ssid: &'a str,
        password: &'a str,
    ) -> Self {
        Self {
            controller,
            stack,
            ssid,
            password,
        }
    }

    pub fn stack(&self) -> Stack<'a> {
        self.stack
    }
}

impl WifiLink for EspWifi<'_> {
    async fn begin_connect(&mut self) -> Result<(), NetworkError> {
        let config = ModeConfig::Client(
            ClientConfig::default()
                .with_ssid(self.ssid.into())
                .with_password(self.password.into()),
        );

        self.controller.set_config(&config).map_err(|e| {
            warn!("Wi-Fi config rejected: {:?}", e);
            NetworkError::Start("config rejected")
        })?;

        self.controller.start_async().await.map_err(|e| {
            warn!("Wi-Fi start failed: {:?}", e);
            NetworkError::Start("radio did not start")
        })?;

        info!("Associating with '{}'", self.ssid);
        self.controller.connect().map_err(|e| {
            warn!("Wi-Fi connect failed: {:?}", e);
            NetworkError::Start("connect refused")
        })
    }

    async fn is_connected(&mut self) -> bool {
        self.stack.is_link_up() && self.stack.config_v4().is_some()
    }
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
