//! Outcome classification
//!
//! Every transport result maps to exactly one [`FetchOutcome`].
//!
//! | Input | Outcome | Ledger message |
//! |-------|---------|----------------|
//! | HTTP 200 | `Success` | - |
//! | Any other status | `HttpError` | `HTTP {code}` |
//! | Timeout | `Timeout` | `Request timeout` |
//! | DNS, refused, reset | `ConnectionFailure` | `Connection error` |
//! | Anything else | `OtherFailure` | the failure's own description |

use crate::fetcher::transport::{TransportError, TransportResult};

/// Content type recorded when the response declares none
pub const UNKNOWN_CONTENT_TYPE: &str = "unknown";

/// Classified result of one fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// HTTP 200
    Success {
        payload: Vec<u8>,
        content_type: String,
    },

    /// Any status other than 200
    HttpError { status_code: u16 },

    /// The request exceeded its timeout
    Timeout,

    /// The connection could not be established or was dropped
    ConnectionFailure,

    /// Any other failure
    OtherFailure { message: String },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Ledger message for failures, `None` for success
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status_code } => Some(format!("HTTP {}", status_code)),
            Self::Timeout => Some("Request timeout".to_string()),
            Self::ConnectionFailure => Some("Connection error".to_string()),
            Self::OtherFailure { message } => Some(message.clone()),
        }
    }
}

/// Maps a transport result to its outcome
pub fn classify(result: TransportResult) -> FetchOutcome {
    match result {
        Ok(response) if response.status == 200 => FetchOutcome::Success {
            payload: response.body,
            content_type: response
                .content_type
                .unwrap_or_else(|| UNKNOWN_CONTENT_TYPE.to_string()),
        },
        Ok(response) => FetchOutcome::HttpError {
            status_code: response.status,
        },
        Err(TransportError::Timeout) => FetchOutcome::Timeout,
        Err(TransportError::Connect(_)) => FetchOutcome::ConnectionFailure,
        Err(TransportError::Other(message)) => FetchOutcome::OtherFailure { message },
    }
}
