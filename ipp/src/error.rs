//!
//! IPP error
//!
use std::io;

use http::uri::InvalidUri;

use crate::{model::StatusCode, parser::IppParseError};

/// Encoding error
#[derive(Debug, thiserror::Error)]
pub enum IppEncodeError {
    #[error("Attribute name is {0} bytes long, maximum is 65535")]
    NameTooLong(usize),

    #[error("Value of attribute '{name}' is {len} bytes long, maximum is 65535")]
    ValueTooLong { name: String, len: usize },

    #[error("Invalid UTC direction '{0}' in date-time value, expected '+' or '-'")]
    InvalidUtcDirection(char),
}

/// IPP error
#[allow(clippy::large_enum_variant)]
#[derive(Debug, thiserror::Error)]
pub enum IppError {
    #[error(transparent)]
    /// HTTP protocol error
    HttpError(#[from] http::Error),

    #[error("HTTP request error: {0}")]
    /// Server answered with a non-success HTTP status
    RequestError(u16),

    #[error(transparent)]
    /// Network or file I/O error
    IoError(#[from] io::Error),

    #[error("IPP status error: {0}")]
    /// IPP status error
    StatusError(StatusCode),

    #[error("Printer not ready")]
    PrinterNotReady,

    #[error(transparent)]
    /// Malformed message
    ParseError(#[from] IppParseError),

    #[error(transparent)]
    /// Message could not be encoded
    EncodeError(#[from] IppEncodeError),

    #[error("Invalid value: {0}")]
    /// Value does not fit the attribute tag or list rules
    InvalidValue(String),

    #[error("Missing attribute in response")]
    /// Missing attribute in response
    MissingAttribute,

    #[error(transparent)]
    /// Invalid URI
    InvalidUri(#[from] InvalidUri),

    #[error(transparent)]
    #[cfg(feature = "client")]
    /// Client error
    ClientError(#[from] ureq::Error),
}

impl IppError {
    /// True for errors raised while moving bytes to or from the server
    pub fn is_transport_error(&self) -> bool {
        match self {
            IppError::HttpError(_) | IppError::RequestError(_) | IppError::IoError(_) => true,
            #[cfg(feature = "client")]
            IppError::ClientError(_) => true,
            _ => false,
        }
    }
}
