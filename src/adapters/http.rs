//! Blocking HTTP client adapter.
//!
//! Implements [`HttpPort`] for both targets:
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::http::client::EspHttpConnection`
//!   wrapped in an `embedded_svc` [`Client`](embedded_svc::http::client::Client).
//! - **`not(target_os = "espidf")`**: `ureq` agent.
//!
//! Every request opens a fresh connection and closes it when the response
//! has been read.  Non-2xx statuses are returned as responses; only
//! failures to get a response become [`TransportError`]s.

use core::time::Duration;

use log::debug;

use crate::app::ports::{HttpPort, HttpResponse};
use crate::error::TransportError;

/// Upper bound on a response body kept in memory.
pub const MAX_BODY_BYTES: usize = 8 * 1024;

pub struct HttpClient {
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout: Duration::from_millis(u64::from(timeout_ms)),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Keep at most [`MAX_BODY_BYTES`] without splitting a character at the
/// cut; any other invalid UTF-8 becomes U+FFFD.
fn decode_body(mut bytes: Vec<u8>) -> String {
    if bytes.len() >= MAX_BODY_BYTES {
        bytes.truncate(MAX_BODY_BYTES);
        if let Err(e) = core::str::from_utf8(&bytes) {
            // Incomplete sequence at the very end.
            if e.error_len().is_none() {
                bytes.truncate(e.valid_up_to());
            }
        }
    }
    match String::from_utf8(bytes) {
        Ok(body) => body,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

fn check_url(url: &str) -> Result<(), TransportError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(TransportError::InvalidUrl)
    }
}

// ── Host implementation (ureq) ───────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl HttpClient {
    fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(self.timeout)
            .max_idle_connections(0)
            .build()
    }

    fn finish(result: Result<ureq::Response, ureq::Error>) -> Result<HttpResponse, TransportError> {
        let resp = match result {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(t)) => return Err(map_transport(&t)),
        };
        let status = resp.status();
        let mut body = Vec::new();
        use std::io::Read;
        resp.into_reader()
            .take(MAX_BODY_BYTES as u64)
            .read_to_end(&mut body)
            .map_err(|e| map_io(&e))?;
        Ok(HttpResponse {
            status,
            body: decode_body(body),
        })
    }
}

#[cfg(not(target_os = "espidf"))]
fn map_io(e: &std::io::Error) -> TransportError {
    match e.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => TransportError::Timeout,
        _ => TransportError::Io,
    }
}

#[cfg(not(target_os = "espidf"))]
fn map_transport(t: &ureq::Transport) -> TransportError {
    use std::error::Error as _;
    match t.kind() {
        ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => TransportError::InvalidUrl,
        ureq::ErrorKind::Dns | ureq::ErrorKind::ConnectionFailed => TransportError::Connect,
        _ => match t.source().and_then(|s| s.downcast_ref::<std::io::Error>()) {
            Some(io) => map_io(io),
            None => TransportError::Io,
        },
    }
}

#[cfg(not(target_os = "espidf"))]
impl HttpPort for HttpClient {
    fn get(&mut self, url: &str) -> Result<HttpResponse, TransportError> {
        check_url(url)?;
        debug!("HTTP: GET {}", url);
        Self::finish(self.agent().get(url).call())
    }

    fn put(&mut self, url: &str, body: &str) -> Result<HttpResponse, TransportError> {
        check_url(url)?;
        debug!("HTTP: PUT {} {}", url, body);
        Self::finish(
            self.agent()
                .put(url)
                .set("Content-Type", "application/json")
                .send_string(body),
        )
    }
}

// ── ESP-IDF implementation ───────────────────────────────────

#[cfg(target_os = "espidf")]
impl HttpClient {
    fn client(
        &self,
    ) -> Result<embedded_svc::http::client::Client<esp_idf_svc::http::client::EspHttpConnection>, TransportError>
    {
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let conn = EspHttpConnection::new(&Configuration {
            timeout: Some(self.timeout),
            ..Default::default()
        })
        .map_err(|_| TransportError::Connect)?;
        Ok(embedded_svc::http::client::Client::wrap(conn))
    }

    fn read_body<R: embedded_svc::io::Read>(resp: &mut R) -> Result<String, TransportError> {
        let mut body = Vec::new();
        let mut buf = [0u8; 512];
        loop {
            let n = resp.read(&mut buf).map_err(|_| TransportError::Io)?;
            if n == 0 || body.len() >= MAX_BODY_BYTES {
                break;
            }
            body.extend_from_slice(&buf[..n]);
        }
        Ok(decode_body(body))
    }
}

#[cfg(target_os = "espidf")]
impl HttpPort for HttpClient {
    fn get(&mut self, url: &str) -> Result<HttpResponse, TransportError> {
        check_url(url)?;
        debug!("HTTP: GET {}", url);
        let mut client = self.client()?;
        let req = client.get(url).map_err(|_| TransportError::Connect)?;
        let mut resp = req.submit().map_err(|_| TransportError::Timeout)?;
        let status = resp.status();
        let body = Self::read_body(&mut resp)?;
        Ok(HttpResponse { status, body })
    }

    fn put(&mut self, url: &str, body: &str) -> Result<HttpResponse, TransportError> {
        use embedded_svc::http::Method;
        use embedded_svc::io::Write;

        check_url(url)?;
        debug!("HTTP: PUT {} {}", url, body);
        let len = body.len().to_string();
        let headers = [("Content-Type", "application/json"), ("Content-Length", len.as_str())];
        let mut client = self.client()?;
        let mut req = client
            .request(Method::Put, url, &headers)
            .map_err(|_| TransportError::Connect)?;
        req.write_all(body.as_bytes()).map_err(|_| TransportError::Io)?;
        req.flush().map_err(|_| TransportError::Io)?;
        let mut resp = req.submit().map_err(|_| TransportError::Timeout)?;
        let status = resp.status();
        let body = Self::read_body(&mut resp)?;
        Ok(HttpResponse { status, body })
    }
}
