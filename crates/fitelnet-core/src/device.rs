// ── Device facade ──
//
// One `FitelnetDevice` per router. It owns the HTTP client and the
// credentials, and exposes the command, batch, config and token operations
// with `CoreError` as the single error type.

use fitelnet_api::{
    Auth, BatchAccepted, BatchResult, CliCommand, ClisId, ConfigMode, ConfigPayload,
    FitelnetClient, TokenInfo, TransportConfig,
};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{DeviceConfig, PollSettings};
use crate::error::CoreError;
use crate::poller::{self, BatchApi};

/// Command sent after a config push to make it persistent.
const COMMIT_COMMAND: &str = "commit";

/// High-level handle to a single FITELnet device.
///
/// Cheaply cloneable; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct FitelnetDevice {
    client: FitelnetClient,
    auth: Auth,
    poll: PollSettings,
}

impl FitelnetDevice {
    pub fn new(config: &DeviceConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config.tls.clone(),
            timeout: config.timeout,
        };
        let client = FitelnetClient::new(config.url.as_str(), &transport)?;
        debug!(url = %config.url, scheme = %config.auth.scheme(), "device handle created");
        Ok(Self {
            client,
            auth: config.auth.clone(),
            poll: config.poll.clone(),
        })
    }

    /// Wrap an existing client. Used by tests and callers that build their
    /// own `reqwest::Client`.
    pub fn from_client(client: FitelnetClient, auth: Auth, poll: PollSettings) -> Self {
        Self { client, auth, poll }
    }

    /// A copy of this handle that authenticates with `auth` instead.
    #[must_use]
    pub fn with_auth(&self, auth: Auth) -> Self {
        Self {
            client: self.client.clone(),
            auth,
            poll: self.poll.clone(),
        }
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn poll_settings(&self) -> &PollSettings {
        &self.poll
    }

    pub fn client(&self) -> &FitelnetClient {
        &self.client
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run one CLI command synchronously and return the device's text.
    pub async fn command(&self, cmd: &str) -> Result<String, CoreError> {
        Ok(self.client.exec_command(&self.auth, cmd).await?)
    }

    /// Submit a batch and wait for it using the handle's poll defaults.
    pub async fn commands_wait(&self, commands: &[CliCommand]) -> Result<BatchResult, CoreError> {
        self.commands_wait_with(commands, &self.poll, &CancellationToken::new())
            .await
    }

    /// Submit a batch and wait for it with explicit settings and a
    /// cancellation token.
    pub async fn commands_wait_with(
        &self,
        commands: &[CliCommand],
        settings: &PollSettings,
        cancel: &CancellationToken,
    ) -> Result<BatchResult, CoreError> {
        poller::wait_for_batch(self, commands, settings, cancel).await
    }

    /// Submit a batch without waiting.
    pub async fn submit(&self, commands: &[CliCommand]) -> Result<BatchAccepted, CoreError> {
        Ok(self.client.submit_batch(&self.auth, commands).await?)
    }

    pub async fn result(&self, clis_id: &ClisId) -> Result<BatchResult, CoreError> {
        Ok(self.client.fetch_result(&self.auth, clis_id).await?)
    }

    pub async fn delete_result(&self, clis_id: &ClisId) -> Result<(), CoreError> {
        Ok(self.client.delete_result(&self.auth, clis_id).await?)
    }

    /// Handles of all result records currently held by the device.
    pub async fn list_batches(&self) -> Result<Vec<ClisId>, CoreError> {
        Ok(self.client.list_batch_ids(&self.auth).await?)
    }

    /// Delete every result record on the device.
    pub async fn clear_results(&self) -> Result<(), CoreError> {
        Ok(self.client.delete_all_results(&self.auth).await?)
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Push configuration, then optionally `commit` it.
    ///
    /// Returns the device's answer to the push, or to the commit when one
    /// was issued.
    pub async fn push_config(
        &self,
        mode: ConfigMode,
        payload: impl Into<ConfigPayload>,
        commit_after: bool,
    ) -> Result<String, CoreError> {
        let answer = self.client.push_config(&self.auth, mode, payload).await?;
        if !commit_after {
            return Ok(answer);
        }
        let committed = self.command(COMMIT_COMMAND).await?;
        info!(%mode, "configuration pushed and committed");
        Ok(committed)
    }

    /// Merge `payload` into the running configuration and commit.
    pub async fn config(&self, payload: impl Into<ConfigPayload>) -> Result<String, CoreError> {
        self.push_config(ConfigMode::Merge, payload, true).await
    }

    // ── Tokens ───────────────────────────────────────────────────────

    /// Issue an access token using this handle's BASIC credentials.
    pub async fn issue_token(&self) -> Result<TokenInfo, CoreError> {
        let Auth::Basic { user, password } = &self.auth else {
            return Err(CoreError::Configuration {
                message: "issuing a token requires basic credentials (user and password)".into(),
            });
        };
        Ok(self.client.publish_token(user, password).await?)
    }

    pub async fn revoke_token(&self, token: &SecretString) -> Result<(), CoreError> {
        Ok(self.client.revoke_token(token).await?)
    }
}

impl BatchApi for FitelnetDevice {
    async fn submit_batch(&self, commands: &[CliCommand]) -> Result<BatchAccepted, CoreError> {
        self.submit(commands).await
    }

    async fn fetch_result(&self, clis_id: &ClisId) -> Result<BatchResult, CoreError> {
        self.result(clis_id).await
    }

    async fn delete_result(&self, clis_id: &ClisId) -> Result<(), CoreError> {
        FitelnetDevice::delete_result(self, clis_id).await
    }
}
