use thiserror::Error;

/// Top-level error type for the `fitelnet-api` crate.
///
/// Covers every failure mode of the raw API surface: caller-side
/// configuration and validation mistakes (raised before any I/O),
/// transport failures, and non-2xx answers from the device.
/// `fitelnet-core` maps these into its own `CoreError`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Caller errors (no I/O performed) ────────────────────────────
    /// Missing or unusable authentication inputs.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Request arguments violate an API invariant (e.g. batch size).
    #[error("Validation error: {message}")]
    Validation { message: String },

    // ── Device ──────────────────────────────────────────────────────
    /// Non-2xx response. `message` is the body's `error` field when the
    /// body is a JSON object carrying one, otherwise the raw body text.
    #[error("HTTP {status} : {message}")]
    Api { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status of an [`Api`](Self::Api) error, or of a transport
    /// error that carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the device rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Returns `true` if this is a "not found" error (e.g. an expired `clis_id`).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if this is a transient transport error.
    ///
    /// Nothing in this crate retries on its own; callers decide.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }
}
