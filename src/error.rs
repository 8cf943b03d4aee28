//! Error types for the purchasekit SDK

use thiserror::Error;

/// Stable error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseErrorCode {
    /// Network request failed (DNS, connect, timeout, TLS)
    NetworkError,
    /// Response body was not the expected JSON document
    ParseError,
    /// Invalid input or client configuration
    ValidationError,
    /// Remote endpoint returned 404
    NotFound,
    /// Remote endpoint returned a 5xx status
    ServerError,
}

/// Error returned by purchasekit operations
#[derive(Error, Debug)]
#[error("{message}")]
pub struct PurchaseError {
    /// Stable error code
    pub code: PurchaseErrorCode,
    /// Human-readable message
    pub message: String,
    /// HTTP status, when the error came from a response
    pub status: Option<u16>,
}

impl PurchaseError {
    pub fn new(code: PurchaseErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PurchaseErrorCode::NetworkError, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(PurchaseErrorCode::ParseError, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(PurchaseErrorCode::ValidationError, message)
    }

    pub fn with_status(code: PurchaseErrorCode, message: impl Into<String>, status: u16) -> Self {
        Self {
            code,
            message: message.into(),
            status: Some(status),
        }
    }
}

/// Map an HTTP status to an error code
pub fn map_status_to_error_code(status: u16) -> PurchaseErrorCode {
    match status {
        404 => PurchaseErrorCode::NotFound,
        500..=599 => PurchaseErrorCode::ServerError,
        _ => PurchaseErrorCode::NetworkError,
    }
}

pub type Result<T> = std::result::Result<T, PurchaseError>;
