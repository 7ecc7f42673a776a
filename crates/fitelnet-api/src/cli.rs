// CLI command endpoints
//
// Single command execution (`/api/v1/cli`) and asynchronous batch
// execution (`/api/v1/clis`): submit, fetch, list and delete results.

use serde_json::{Value, json};
use tracing::debug;

use crate::auth::Auth;
use crate::client::FitelnetClient;
use crate::error::Error;
use crate::models::{BatchAccepted, BatchResult, BatchSubmission, CliCommand, ClisId, MAX_BATCH_SIZE};

const CLI_PATH: &str = "/api/v1/cli";
const CLIS_PATH: &str = "/api/v1/clis";

/// Check the batch size invariant (`1..=MAX_BATCH_SIZE`).
pub fn validate_batch_size(len: usize) -> Result<(), Error> {
    if len == 0 {
        return Err(Error::Validation {
            message: "At least one command must be provided.".into(),
        });
    }
    if len > MAX_BATCH_SIZE {
        return Err(Error::Validation {
            message: format!("A maximum of {MAX_BATCH_SIZE} commands can be executed at once."),
        });
    }
    Ok(())
}

impl FitelnetClient {
    /// Run one operational command and return its text output.
    ///
    /// `POST /api/v1/cli` with `{"cmd": "..."}`
    pub async fn exec_command(&self, auth: &Auth, cmd: &str) -> Result<String, Error> {
        debug!(cmd, "executing command");
        self.post_text(CLI_PATH, auth, Some(&json!({ "cmd": cmd })))
            .await
    }

    /// Submit up to [`MAX_BATCH_SIZE`] commands for asynchronous execution.
    ///
    /// `POST /api/v1/clis` with `{"list": [...], "total": n}`. The size is
    /// validated before any request is sent.
    pub async fn submit_batch(
        &self,
        auth: &Auth,
        commands: &[CliCommand],
    ) -> Result<BatchAccepted, Error> {
        validate_batch_size(commands.len())?;

        debug!(total = commands.len(), "submitting command batch");
        let body = BatchSubmission {
            list: commands,
            total: commands.len(),
        };
        self.post_json(CLIS_PATH, auth, Some(&body)).await
    }

    /// Fetch the current status and entries of a batch.
    ///
    /// `GET /api/v1/clis/{clis_id}`
    pub async fn fetch_result(&self, auth: &Auth, clis_id: &ClisId) -> Result<BatchResult, Error> {
        self.get(&format!("{CLIS_PATH}/{clis_id}"), auth).await
    }

    /// Remove a batch result record from the device.
    ///
    /// `DELETE /api/v1/clis/{clis_id}`
    pub async fn delete_result(&self, auth: &Auth, clis_id: &ClisId) -> Result<(), Error> {
        debug!(%clis_id, "deleting batch result");
        self.delete(&format!("{CLIS_PATH}/{clis_id}"), auth).await
    }

    /// List the ids of every batch result held by the device.
    ///
    /// `GET /api/v1/clis`
    pub async fn list_batch_ids(&self, auth: &Auth) -> Result<Vec<ClisId>, Error> {
        let raw: Value = self.get(CLIS_PATH, auth).await?;
        parse_batch_ids(raw)
    }

    /// Remove every batch result record from the device.
    ///
    /// `DELETE /api/v1/clis`
    pub async fn delete_all_results(&self, auth: &Auth) -> Result<(), Error> {
        debug!("deleting all batch results");
        self.delete(CLIS_PATH, auth).await
    }
}

/// Accepts a bare array or an object wrapping one under `clis_id` or `list`.
/// Elements may be ids or objects carrying a `clis_id` field.
fn parse_batch_ids(raw: Value) -> Result<Vec<ClisId>, Error> {
    let items = match raw {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("clis_id").or_else(|| map.remove("list")) {
            Some(Value::Array(items)) => items,
            Some(single @ (Value::Number(_) | Value::String(_))) => vec![single],
            Some(Value::Null) | None => Vec::new(),
            Some(other) => return Err(unexpected_listing(&other)),
        },
        Value::Null => Vec::new(),
        other => return Err(unexpected_listing(&other)),
    };

    items
        .into_iter()
        .map(|item| {
            let id = match item {
                Value::Object(mut obj) => obj.remove("clis_id").unwrap_or(Value::Null),
                scalar => scalar,
            };
            serde_json::from_value::<ClisId>(id.clone()).map_err(|e| Error::Deserialization {
                message: format!("invalid clis_id in listing: {e}"),
                body: id.to_string(),
            })
        })
        .collect()
}

fn unexpected_listing(value: &Value) -> Error {
    Error::Deserialization {
        message: "unexpected shape for batch listing".into(),
        body: value.to_string(),
    }
}
