// ── Runtime device configuration ──
//
// These types describe *how* to talk to one FITELnet device. They carry
// credential data and tuning, but never touch disk. The CLI (or any other
// consumer) builds a `DeviceConfig` and hands it in.

use std::time::Duration;

use fitelnet_api::{Auth, FitelnetClient, TlsMode};
use url::Url;

use crate::error::CoreError;

/// Schedule and cleanup policy for waiting on a command batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    /// Sleep before the first poll.
    pub initial_delay: Duration,
    /// Extra polls after the first one. Must be `>= 0`; the total number of
    /// fetches is `max_retries + 1`.
    pub max_retries: i32,
    /// Sleep between polls that still report `Processing`.
    pub interval: Duration,
    /// Delete the result record from the device once it is terminal.
    pub delete_on_completion: bool,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_retries: 5,
            interval: Duration::from_secs(1),
            delete_on_completion: true,
        }
    }
}

impl PollSettings {
    /// Number of fetch attempts allowed, or a validation error for a
    /// negative retry count.
    pub fn attempts(&self) -> Result<u32, CoreError> {
        u32::try_from(self.max_retries)
            .ok()
            .and_then(|r| r.checked_add(1))
            .ok_or_else(|| CoreError::Validation {
                message: format!("retries must be 0 or more (got {})", self.max_retries),
            })
    }
}

/// Configuration for connecting to a single device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Device root URL (e.g. `http://192.168.1.1:55443/`).
    pub url: Url,
    /// Credentials used for every request made through the facade.
    pub auth: Auth,
    /// TLS verification strategy.
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Defaults for `commands_wait`.
    pub poll: PollSettings,
}

impl DeviceConfig {
    pub fn new(url: Url, auth: Auth) -> Self {
        Self {
            url,
            auth,
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
            poll: PollSettings::default(),
        }
    }

    /// Build from host, port and scheme selector: `http[s]://host:port/`.
    pub fn for_host(host: &str, port: u16, tls: bool, auth: Auth) -> Result<Self, CoreError> {
        let url = FitelnetClient::device_url(host, port, tls)?;
        Ok(Self::new(url, auth))
    }
}
