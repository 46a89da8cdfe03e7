//! Best-effort publishing of the latest reading
//!
//! Only the publish-enabled firmware variant wires a real [`Publisher`]; the
//! sampling loop treats every publish as at-most-once and never retries.

use core::fmt::Write;

use thiserror_no_std::Error;

use crate::sensors::Co2Readings;

pub const DWEET_HOST: &str = "dweet.io";

/// Capacity of a formatted request path.
pub const PATH_CAPACITY: usize = 128;

/// Capacity of a full request head.
pub const REQUEST_CAPACITY: usize = 256;

pub type RequestPath = heapless::String<PATH_CAPACITY>;
pub type Request = heapless::String<REQUEST_CAPACITY>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    #[error("thing name must be non-empty and URL safe")]
    InvalidThing,
    #[error("request does not fit the path buffer")]
    Overflow,
    #[error("transport failed: {0}")]
    Transport(&'static str),
    #[error("endpoint answered with HTTP status {0}")]
    Status(u16),
}

/// Flat key/value payload sent for each reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payload {
    pub co2: f32,
    pub temperature_f: f32,
    pub humidity: f32,
}

impl From<&Co2Readings> for Payload {
    fn from(readings: &Co2Readings) -> Self {
        Self {
            co2: readings.co2_ppm,
            temperature_f: readings.temperature_f(),
            humidity: readings.humidity_rh,
        }
    }
}

impl Payload {
    /// Field names as seen by the remote endpoint.
    pub fn fields(&self) -> [(&'static str, f32); 3] {
        [
            ("co2", self.co2),
            ("temperatureF", self.temperature_f),
            ("humidity", self.humidity),
        ]
    }
}

/// Remote publish sink.
pub trait Publisher {
    fn publish(&mut self, payload: &Payload) -> impl Future<Output = Result<(), PublishError>>;
}

/// Build the dweet request path `/dweet/for/<thing>?co2=..&temperatureF=..&humidity=..`.
pub fn dweet_path(thing: &str, payload: &Payload) -> Result<RequestPath, PublishError> {
    let url_safe = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
    if thing.is_empty() || !thing.chars().all(url_safe) {
        return Err(PublishError::InvalidThing);
    }

    let mut path = RequestPath::new();
    write!(path, "/dweet/for/{}", thing).map_err(|_| PublishError::Overflow)?;

    for (i, (key, value)) in payload.fields().iter().enumerate() {
        let sep = if i == 0 { '?' } else { '&' };
        // CO2 is an integer ppm count; the rest keep one decimal
        let written = if *key == "co2" {
            write!(path, "{}{}={:.0}", sep, key, value)
        } else {
            write!(path, "{}{}={:.1}", sep, key, value)
        };
        written.map_err(|_| PublishError::Overflow)?;
    }

    Ok(path)
}

/// HTTP/1.1 `GET` request head for `path` on `host`.
pub fn get_request(host: &str, path: &str) -> Result<Request, PublishError> {
    let mut request = Request::new();
    write!(
        request,
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, host
    )
    .map_err(|_| PublishError::Overflow)?;
    Ok(request)
}

/// Status code from the first line of an HTTP response.
pub fn status_code(response: &[u8]) -> Option<u16> {
    let line = response.split(|&b| b == b'\n').next()?;
    let line = core::str::from_utf8(line).ok()?;
    let mut parts = line.split_ascii_whitespace();

    if !parts.next()?.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

/// Map a response to `Ok` for any 2xx status.
pub fn check_status(response: &[u8]) -> Result<(), PublishError> {
    match status_code(response) {
        Some(code) if (200..300).contains(&code) => Ok(()),
        Some(code) => Err(PublishError::Status(code)),
        None => Err(PublishError::Transport("malformed response")),
    }
}
