// Device configuration push endpoints
//
// `PUT /api/v1/config` replaces the running configuration, `PATCH` applies
// an incremental change. Both send the raw configuration text as the body.

use bytes::Bytes;
use tracing::debug;

use crate::auth::Auth;
use crate::client::FitelnetClient;
use crate::error::Error;

const CONFIG_PATH: &str = "/api/v1/config";

/// How a pushed configuration is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConfigMode {
    /// Replace the whole configuration (`PUT`).
    Replace,
    /// Add, remove or change only the given lines (`PATCH`).
    Merge,
}

/// Configuration text in whatever form the caller has it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigPayload {
    /// Raw bytes, sent unchanged.
    Bytes(Bytes),
    /// Text, sent UTF-8 encoded.
    Text(String),
    /// One configuration line per element, joined with `\n`.
    Lines(Vec<String>),
}

impl ConfigPayload {
    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::Bytes(b) => b,
            Self::Text(s) => Bytes::from(s),
            Self::Lines(lines) => Bytes::from(lines.join("\n")),
        }
    }
}

impl From<Vec<u8>> for ConfigPayload {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(b))
    }
}

impl From<&[u8]> for ConfigPayload {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<String> for ConfigPayload {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ConfigPayload {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<Vec<String>> for ConfigPayload {
    fn from(lines: Vec<String>) -> Self {
        Self::Lines(lines)
    }
}

impl FitelnetClient {
    /// Replace the device configuration. Returns the device's answer text.
    ///
    /// `PUT /api/v1/config`
    pub async fn replace_config(
        &self,
        auth: &Auth,
        payload: impl Into<ConfigPayload>,
    ) -> Result<String, Error> {
        debug!("replacing device configuration");
        self.put_bytes(CONFIG_PATH, auth, payload.into().into_bytes())
            .await
    }

    /// Apply an incremental configuration change. Returns the device's
    /// answer text.
    ///
    /// `PATCH /api/v1/config`
    pub async fn merge_config(
        &self,
        auth: &Auth,
        payload: impl Into<ConfigPayload>,
    ) -> Result<String, Error> {
        debug!("merging device configuration");
        self.patch_bytes(CONFIG_PATH, auth, payload.into().into_bytes())
            .await
    }

    /// Push configuration using the given mode.
    pub async fn push_config(
        &self,
        auth: &Auth,
        mode: ConfigMode,
        payload: impl Into<ConfigPayload>,
    ) -> Result<String, Error> {
        match mode {
            ConfigMode::Replace => self.replace_config(auth, payload).await,
            ConfigMode::Merge => self.merge_config(auth, payload).await,
        }
    }
}
