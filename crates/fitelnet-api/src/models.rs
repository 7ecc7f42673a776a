// Wire models for the FITELnet management API.
//
// Field names follow the device's JSON exactly (`cmd`, `on_fail`, `clis_id`,
// `list`, `total`, `contents`); Rust-side accessors use clearer names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Upper bound on commands per batch submission.
pub const MAX_BATCH_SIZE: usize = 10;

// ── Commands ────────────────────────────────────────────────────────

/// What the device does when a command inside a batch fails.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OnFailAction {
    /// Keep executing the rest of the batch.
    #[default]
    Continue,
    /// Abort the batch at this command.
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OnFail {
    pub action: OnFailAction,
}

/// One CLI command as submitted in a batch.
///
/// Serializes to `{"cmd": "...", "on_fail": {"action": "continue"}}`.
/// Plain strings coerce into a command with [`OnFailAction::Continue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliCommand {
    cmd: String,
    on_fail: OnFail,
}

impl CliCommand {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self::with_action(cmd, OnFailAction::Continue)
    }

    /// A command that stops the batch when it fails.
    pub fn exit_on_fail(cmd: impl Into<String>) -> Self {
        Self::with_action(cmd, OnFailAction::Exit)
    }

    pub fn with_action(cmd: impl Into<String>, action: OnFailAction) -> Self {
        Self {
            cmd: cmd.into(),
            on_fail: OnFail { action },
        }
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    pub fn on_fail(&self) -> OnFailAction {
        self.on_fail.action
    }
}

impl From<&str> for CliCommand {
    fn from(cmd: &str) -> Self {
        Self::new(cmd)
    }
}

impl From<String> for CliCommand {
    fn from(cmd: String) -> Self {
        Self::new(cmd)
    }
}

/// Request body for `POST /api/v1/clis`.
#[derive(Debug, Serialize)]
pub(crate) struct BatchSubmission<'a> {
    pub list: &'a [CliCommand],
    pub total: usize,
}

// ── Batch handle ────────────────────────────────────────────────────

/// Device-assigned batch identifier (`clis_id`).
///
/// Opaque to the client. Devices have been seen returning it both as a JSON
/// integer and as a string, so both are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClisId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ClisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for ClisId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Only canonical integers become numbers; "007" stays text.
        Ok(match s.parse::<u64>() {
            Ok(n) if n.to_string() == s => Self::Number(n),
            _ => Self::Text(s.to_owned()),
        })
    }
}

impl From<u64> for ClisId {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ClisId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// Response body of a batch submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAccepted {
    pub clis_id: ClisId,
    /// Seconds until the device discards the result record.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

// ── Batch result ────────────────────────────────────────────────────

/// Classification of a batch status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Processing,
    Success,
    Failure,
    PartialFailure,
    /// A status string this client does not know about.
    Other,
}

impl StatusKind {
    fn classify(raw: &str) -> Self {
        let folded: String = raw
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "processing" => Self::Processing,
            "success" => Self::Success,
            "failure" => Self::Failure,
            "partialfailure" => Self::PartialFailure,
            _ => Self::Other,
        }
    }
}

/// Execution state of a batch, as reported by the device.
///
/// The device's string is kept as-is and is what serializes back out;
/// [`kind`](Self::kind) is a case-insensitive reading of it. Only
/// [`StatusKind::Processing`] is non-terminal. Interpreting partial failure
/// is the caller's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BatchStatus {
    kind: StatusKind,
    raw: String,
}

impl BatchStatus {
    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    pub fn is_terminal(&self) -> bool {
        self.kind != StatusKind::Processing
    }

    /// The status string exactly as the device sent it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl From<String> for BatchStatus {
    fn from(raw: String) -> Self {
        Self {
            kind: StatusKind::classify(&raw),
            raw,
        }
    }
}

impl From<&str> for BatchStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<BatchStatus> for String {
    fn from(status: BatchStatus) -> Self {
        status.raw
    }
}

impl PartialEq<StatusKind> for BatchStatus {
    fn eq(&self, other: &StatusKind) -> bool {
        self.kind == *other
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Per-command entry of a batch result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub cmd: String,
    #[serde(default)]
    pub on_fail: Option<OnFail>,
    /// Per-command result keyword (e.g. `"success"`).
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Captured output lines.
    #[serde(default)]
    pub contents: Vec<String>,
}

impl CommandOutcome {
    pub fn succeeded(&self) -> bool {
        self.result
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("success"))
    }

    /// Output lines joined back into a single block.
    pub fn output(&self) -> String {
        self.contents.join("\n")
    }
}

/// `GET /api/v1/clis/{id}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clis_id: Option<ClisId>,
    pub status: BatchStatus,
    #[serde(default, rename = "list")]
    pub entries: Vec<CommandOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl BatchResult {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// ── Tokens ──────────────────────────────────────────────────────────

/// `POST /api/v1/token` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

fn default_token_type() -> String {
    "Bearer".into()
}
