// ── Core error types ──
//
// Errors surfaced by the device facade and the batch poller. The
// `From<fitelnet_api::Error>` impl translates transport-layer errors
// into these variants; the poller adds its own timeout and cancellation
// outcomes on top.

use fitelnet_api::ClisId;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Caller errors (raised before any I/O) ───────────────────────
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── Device errors ────────────────────────────────────────────────
    /// Non-2xx answer from the device.
    #[error("HTTP {status} : {message}")]
    Api { status: u16, message: String },

    #[error("Cannot connect to device at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    // ── Batch polling ────────────────────────────────────────────────
    /// Every poll attempt saw `Processing`. The result record is still on
    /// the device under `clis_id`.
    #[error("Batch {clis_id} did not complete within {attempts} poll attempts")]
    Timeout { clis_id: ClisId, attempts: u32 },

    /// The caller cancelled the wait. `clis_id` is `None` when the
    /// cancellation arrived before the device accepted the batch.
    #[error("Batch wait cancelled{}", handle_suffix(.clis_id))]
    Cancelled { clis_id: Option<ClisId> },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

#[allow(clippy::ref_option)]
fn handle_suffix(clis_id: &Option<ClisId>) -> String {
    clis_id.as_ref().map(|id| format!(" (clis_id {id})")).unwrap_or_default()
}

impl CoreError {
    /// The batch handle left behind on the device, if any.
    pub fn stranded_batch(&self) -> Option<&ClisId> {
        match self {
            Self::Timeout { clis_id, .. } => Some(clis_id),
            Self::Cancelled { clis_id } => clis_id.as_ref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fitelnet_api::Error> for CoreError {
    fn from(err: fitelnet_api::Error) -> Self {
        match err {
            fitelnet_api::Error::Configuration { message } => CoreError::Configuration { message },
            fitelnet_api::Error::Validation { message } => CoreError::Validation { message },
            fitelnet_api::Error::Api { status, message } => CoreError::Api { status, message },
            fitelnet_api::Error::Transport(ref e) => {
                if let Some(status) = e.status() {
                    CoreError::Api {
                        status: status.as_u16(),
                        message: e.to_string(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            fitelnet_api::Error::InvalidUrl(e) => CoreError::Configuration {
                message: format!("Invalid URL: {e}"),
            },
            fitelnet_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            fitelnet_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
