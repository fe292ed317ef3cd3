//! Error types for the XOAP weather client
//!
//! Every fetch-class operation returns either a fully populated record or
//! exactly one `XoapError`. XoapError implements Serialize so pollers can
//! report failures as JSON.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error codes reported by the provider inside an `<error>` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApiError {
    /// An unknown error has occurred (code 0, or any unlisted code)
    UnknownError,
    /// No location provided (code 1)
    NoLocation,
    /// Invalid location (code 2)
    InvalidLocation,
    /// Invalid partner id (code 100)
    InvalidPartnerId,
    /// Invalid product code (code 101)
    InvalidProductCode,
    /// Invalid license key (code 102)
    InvalidLicenseKey,
}

impl ApiError {
    /// Map a provider error code onto an `ApiError`.
    ///
    /// Codes outside the published set map to `UnknownError`.
    ///
    /// # Examples
    /// ```
    /// use xoap_core::ApiError;
    ///
    /// assert_eq!(ApiError::from_code(102), ApiError::InvalidLicenseKey);
    /// assert_eq!(ApiError::from_code(7), ApiError::UnknownError);
    /// ```
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => ApiError::NoLocation,
            2 => ApiError::InvalidLocation,
            100 => ApiError::InvalidPartnerId,
            101 => ApiError::InvalidProductCode,
            102 => ApiError::InvalidLicenseKey,
            _ => ApiError::UnknownError,
        }
    }

    /// Provider code for this error.
    pub fn code(&self) -> i64 {
        match self {
            ApiError::UnknownError => 0,
            ApiError::NoLocation => 1,
            ApiError::InvalidLocation => 2,
            ApiError::InvalidPartnerId => 100,
            ApiError::InvalidProductCode => 101,
            ApiError::InvalidLicenseKey => 102,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ApiError::UnknownError => "unknown error",
            ApiError::NoLocation => "no location provided",
            ApiError::InvalidLocation => "invalid location",
            ApiError::InvalidPartnerId => "invalid partner id",
            ApiError::InvalidProductCode => "invalid product code",
            ApiError::InvalidLicenseKey => "invalid license key",
        };
        f.write_str(text)
    }
}

/// Why a single network round trip failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The request deadline expired
    Timeout,
    /// The server answered with a non-success HTTP status
    Status(u16),
    /// Connection, protocol or body read error
    Request(String),
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportFailure::Timeout => f.write_str("request timed out"),
            TransportFailure::Status(code) => write!(f, "HTTP status {}", code),
            TransportFailure::Request(reason) => f.write_str(reason),
        }
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportFailure::Timeout
        } else if let Some(status) = err.status() {
            TransportFailure::Status(status.as_u16())
        } else {
            TransportFailure::Request(err.to_string())
        }
    }
}

/// Error type for XOAP weather operations
#[derive(Error, Debug)]
pub enum XoapError {
    /// Partner id or license key is empty, or the session was released
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// Unrecognized session option or option value
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// No location id set on the session
    #[error("No location id set on the session")]
    MissingLocation,

    /// Network round trip failed
    #[error("Transport failure: {0}")]
    Transport(TransportFailure),

    /// Response body is not a usable XML document
    #[error("Failed to parse XML document: {0}")]
    DocumentParse(String),

    /// Provider reported an error envelope
    #[error("Provider error: {0}")]
    Api(ApiError),

    /// A forecast day index falls outside the requested depth
    #[error("Forecast day index {index} out of range for {len} requested days")]
    IndexOutOfRange { index: i64, len: usize },

    /// Rain lookup found neither an airport nor a personal weather station
    #[error("No weather station found near location")]
    NoStationFound,
}

impl From<TransportFailure> for XoapError {
    fn from(failure: TransportFailure) -> Self {
        XoapError::Transport(failure)
    }
}

impl From<ApiError> for XoapError {
    fn from(err: ApiError) -> Self {
        XoapError::Api(err)
    }
}

/// Serialize XoapError as its display string
impl Serialize for XoapError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for XOAP weather operations
pub type Result<T> = std::result::Result<T, XoapError>;
