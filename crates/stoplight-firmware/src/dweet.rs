//! dweet.io transport: one short-lived HTTP/1.1 connection per reading

use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpEndpoint, Stack};
use embassy_time::Duration;
use embedded_io_async::Write;
use log::debug;
use stoplight_core::publish::{
    DWEET_HOST, Payload, PublishError, Publisher, check_status, dweet_path, get_request,
};

const HTTP_PORT: u16 = 80;
const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);
const BUFFER_SIZE: usize = 1024;

pub struct DweetPublisher<'a> {
    stack: Stack<'a>,
    thing: &'a str,
    rx_buffer: [u8; BUFFER_SIZE],
    tx_buffer: [u8; BUFFER_SIZE],
}

impl<'a> DweetPublisher<'a> {
    pub fn new(stack: Stack<'a>, thing: &'a str) -> Self {
        Self {
            stack,
            thing,
            rx_buffer: [0; BUFFER_SIZE],
            tx_buffer: [0; BUFFER_SIZE],
        }
    }

    async fn resolve(&self) -> Result<IpEndpoint, PublishError> {
        let addresses = self
            .stack
            .dns_query(DWEET_HOST, DnsQueryType::A)
            .await
            .map_err(|_| PublishError::Transport("DNS lookup failed"))?;
        let address = addresses
            .first()
            .copied()
            .ok_or(PublishError::Transport("no address for host"))?;
        Ok(IpEndpoint::new(address, HTTP_PORT))
    }
}

impl Publisher for DweetPublisher<'_> {
    async fn publish(&mut self, payload: &Payload) -> Result<(), PublishError> {
        let path = dweet_path(self.thing, payload)?;
        let request = get_request(DWEET_HOST, &path)?;
        let endpoint = self.resolve().await?;

        let mut socket = TcpSocket::new(self.stack, &mut self.rx_buffer, &mut self.tx_buffer);
        socket.set_timeout(Some(SOCKET_TIMEOUT));

        socket
            .connect(endpoint)
            .await
            .map_err(|_| PublishError::Transport("connect failed"))?;
        socket
            .write_all(request.as_bytes())
            .await
            .map_err(|_| PublishError::Transport("write failed"))?;

        // The status line is all we need
        let mut response = [0u8; 64];
        let n = socket
            .read(&mut response)
            .await
            .map_err(|_| PublishError::Transport("read failed"))?;
        socket.close();

        debug!("GET http://{}{} -> {} bytes", DWEET_HOST, path, n);
        check_status(&response[..n])
    }
}
