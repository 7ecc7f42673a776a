//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use fitelnet_config::ConfigError;
use fitelnet_core::CoreError;

/// Process exit codes. Success is 0.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to device at {url}")]
    #[diagnostic(
        code(fitelnet::connection_failed),
        help(
            "Check that the device is reachable and the HTTP API is enabled.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fitelnet::auth_failed),
        help(
            "Verify the profile's credentials.\n\
             Run: fitelnet profile set-secret <NAME>"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(fitelnet::no_credentials),
        help(
            "{reason}\n\
             Store one with: fitelnet profile set-secret {profile}\n\
             Or set FITELNET_PASSWORD / FITELNET_TOKEN."
        )
    )]
    NoCredentials { profile: String, reason: String },

    // ── Device answers ───────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(
        code(fitelnet::not_found),
        help("Run: fitelnet results list to see batch ids held by the device")
    )]
    NotFound { message: String },

    #[error("Device returned HTTP {status}: {message}")]
    #[diagnostic(code(fitelnet::api_error))]
    ApiError { status: u16, message: String },

    // ── Batch polling ────────────────────────────────────────────────
    #[error("Batch {clis_id} still processing after {attempts} polls")]
    #[diagnostic(
        code(fitelnet::batch_timeout),
        help(
            "The result stays on the device. Fetch it later with:\n\
             fitelnet results get {clis_id}\n\
             Or wait longer with --retries / --interval-ms."
        )
    )]
    BatchTimeout { clis_id: String, attempts: u32 },

    #[error("Cancelled{}", stranded_suffix(.clis_id.as_deref()))]
    #[diagnostic(code(fitelnet::cancelled))]
    Cancelled { clis_id: Option<String> },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fitelnet::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fitelnet::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: fitelnet profile add <NAME> --address <HOST>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No device configured")]
    #[diagnostic(
        code(fitelnet::no_config),
        help(
            "Pass --host, or create a profile with: fitelnet profile add <NAME> --address <HOST>\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(fitelnet::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(fitelnet::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal / IO ────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(fitelnet::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn stranded_suffix(clis_id: Option<&str>) -> String {
    clis_id
        .map(|id| format!(" (batch {id} left on the device)"))
        .unwrap_or_default()
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::BatchTimeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Configuration { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Api {
                status: 401 | 403,
                message,
            } => CliError::AuthFailed { message },
            CoreError::Api {
                status: 404,
                message,
            } => CliError::NotFound { message },
            CoreError::Api { status, message } => CliError::ApiError { status, message },
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout { clis_id, attempts } => CliError::BatchTimeout {
                clis_id: clis_id.to_string(),
                attempts,
            },
            CoreError::Cancelled { clis_id } => CliError::Cancelled {
                clis_id: clis_id.map(|id| id.to_string()),
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile, reason } => {
                CliError::NoCredentials { profile, reason }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use fitelnet_core::ClisId;

    use super::*;

    #[test]
    fn poll_outcomes_map_to_exit_codes() {
        let timeout = CliError::from(CoreError::Timeout {
            clis_id: ClisId::Number(7),
            attempts: 6,
        });
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
        assert_eq!(timeout.to_string(), "Batch 7 still processing after 6 polls");

        let cancelled = CliError::from(CoreError::Cancelled {
            clis_id: Some(ClisId::Number(7)),
        });
        assert_eq!(cancelled.exit_code(), exit_code::GENERAL);
        assert_eq!(cancelled.to_string(), "Cancelled (batch 7 left on the device)");
    }

    #[test]
    fn http_status_selects_variant() {
        let unauthorized = CliError::from(CoreError::Api {
            status: 401,
            message: "Unauthorized".into(),
        });
        assert_eq!(unauthorized.exit_code(), exit_code::AUTH);

        let missing = CliError::from(CoreError::Api {
            status: 404,
            message: "no such job".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let busy = CliError::from(CoreError::Api {
            status: 503,
            message: "busy".into(),
        });
        assert_eq!(busy.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn validation_is_usage_error() {
        let err = CliError::from(CoreError::Validation {
            message: "A maximum of 10 commands can be executed at once.".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
