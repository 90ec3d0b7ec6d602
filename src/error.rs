//! Unified error types for the WeatherNode firmware.
//!
//! One small `Copy` enum per concern, each convertible into the top-level
//! [`Error`].  None of these are fatal: sensor errors drop a field for one
//! cycle, transport and actuation errors are logged and retried on the next
//! cycle, configuration errors are reported once at start-up.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned implausible data.
    Sensor(SensorError),
    /// An HTTP exchange failed below the application layer.
    Transport(TransportError),
    /// The remote lighting bridge could not be driven to the desired state.
    Actuation(ActuationError),
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Actuation(e) => write!(f, "actuation: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The driver reported NaN (no reading this cycle).
    NotANumber,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// I²C / one-wire bus transaction failed.
    BusError,
    /// DHT frame checksum did not match.
    ChecksumMismatch,
    /// The sensor did not answer within its protocol window.
    Timeout,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber => write!(f, "reading is NaN"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::BusError => write!(f, "bus transaction failed"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::Timeout => write!(f, "sensor timed out"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// TCP connect / DNS failed.
    Connect,
    /// The request exceeded the configured timeout.
    Timeout,
    /// Reading or writing the body failed mid-exchange.
    Io,
    /// The URL could not be parsed by the client.
    InvalidUrl,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connection failed"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Io => write!(f, "I/O error"),
            Self::InvalidUrl => write!(f, "invalid URL"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Bridge actuation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationError {
    /// GET or PUT never produced an HTTP response.
    Transport(TransportError),
    /// The bridge answered with a non-2xx status.
    Status(u16),
    /// The group state body had no boolean `action.on`.
    MalformedState,
    /// The bridge accepted the request but reported an `error` entry.
    Rejected,
}

impl fmt::Display for ActuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "bridge unreachable: {e}"),
            Self::Status(code) => write!(f, "bridge returned HTTP {code}"),
            Self::MalformedState => write!(f, "bridge state body malformed"),
            Self::Rejected => write!(f, "bridge rejected the action"),
        }
    }
}

impl From<TransportError> for ActuationError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<ActuationError> for Error {
    fn from(e: ActuationError) -> Self {
        Self::Actuation(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
