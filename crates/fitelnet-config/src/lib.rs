//! Shared configuration for FITELnet tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `fitelnet_core::DeviceConfig`. The CLI layers its
//! `GlobalOpts` overrides on top of this crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use fitelnet_core::{Auth, AuthScheme, DeviceConfig, PollSettings, TlsMode};

/// Service name under which secrets are stored in the system keyring.
pub const KEYRING_SERVICE: &str = "fitelnet";

/// Overrides the config file location when set.
pub const CONFIG_PATH_ENV: &str = "FITELNET_CONFIG";

pub const USERNAME_ENV: &str = "FITELNET_USERNAME";
pub const PASSWORD_ENV: &str = "FITELNET_PASSWORD";
pub const TOKEN_ENV: &str = "FITELNET_TOKEN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}': {reason}")]
    NoCredentials { profile: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }

    /// Profile names in sorted order.
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named device profile.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Device hostname or IP address.
    pub host: String,

    /// Management API port. Defaults to 443 with TLS, 80 without.
    pub port: Option<u16>,

    /// Use `https://`.
    #[serde(default)]
    pub tls: bool,

    /// Auth scheme: "basic" or "bearer".
    #[serde(default)]
    pub auth: AuthScheme,

    pub username: Option<String>,

    /// Password (plaintext, prefer keyring or FITELNET_PASSWORD).
    pub password: Option<String>,

    /// Bearer token (plaintext, prefer keyring or FITELNET_TOKEN).
    pub token: Option<String>,

    /// Name of an environment variable holding the bearer token.
    pub token_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    /// Per-request timeout in seconds.
    pub timeout: Option<u64>,

    #[serde(default)]
    pub poll: PollProfile,
}

impl Profile {
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.tls { 443 } else { 80 })
    }
}

/// `[profiles.<name>.poll]`: batch wait schedule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollProfile {
    #[serde(default = "default_wait_ms")]
    pub wait_ms: u64,

    /// Negative values are rejected by `to_settings`.
    #[serde(default = "default_retries")]
    pub retries: i32,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_delete")]
    pub delete: bool,
}

impl Default for PollProfile {
    fn default() -> Self {
        Self {
            wait_ms: default_wait_ms(),
            retries: default_retries(),
            interval_ms: default_interval_ms(),
            delete: default_delete(),
        }
    }
}

fn default_wait_ms() -> u64 {
    500
}
fn default_retries() -> i32 {
    5
}
fn default_interval_ms() -> u64 {
    1000
}
fn default_delete() -> bool {
    true
}

impl PollProfile {
    pub fn to_settings(&self) -> Result<PollSettings, ConfigError> {
        if self.retries < 0 {
            return Err(ConfigError::Validation {
                field: "poll.retries".into(),
                reason: format!("retries must be 0 or more (got {})", self.retries),
            });
        }
        Ok(PollSettings {
            initial_delay: Duration::from_millis(self.wait_ms),
            max_retries: self.retries,
            interval: Duration::from_millis(self.interval_ms),
            delete_on_completion: self.delete,
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `FITELNET_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "fitelnet", "fitelnet").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fitelnet");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, merged with `FITELNET_` environment
/// variables (`__` separates nesting, e.g. `FITELNET_DEFAULTS__OUTPUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FITELNET_").split("__"));

    Ok(figment.extract()?)
}

/// Parse config from a TOML string, without the environment layer.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::string(toml));
    Ok(figment.extract()?)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

// ── Keyring ─────────────────────────────────────────────────────────

/// Kind of secret stored per profile in the keyring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    Password,
    Token,
}

impl SecretKind {
    /// Keyring entry name: `{profile}/password` or `{profile}/token`.
    pub fn keyring_key(self, profile_name: &str) -> String {
        match self {
            Self::Password => format!("{profile_name}/password"),
            Self::Token => format!("{profile_name}/token"),
        }
    }
}

fn keyring_secret(profile_name: &str, kind: SecretKind) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_key(profile_name)).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

/// Store a secret for `profile_name` in the system keyring.
pub fn store_secret(
    profile_name: &str,
    kind: SecretKind,
    secret: &str,
) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_key(profile_name))?;
    entry.set_password(secret)?;
    Ok(())
}

/// Remove both keyring secrets of a profile. Missing entries are ignored.
pub fn delete_secrets(profile_name: &str) -> Result<(), ConfigError> {
    for kind in [SecretKind::Password, SecretKind::Token] {
        let entry = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_key(profile_name))?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the credentials a profile's auth scheme needs.
///
/// Each secret is taken from the first source that has it: environment,
/// then keyring, then plaintext in the profile.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<Auth, ConfigError> {
    resolve_auth_with(profile, profile_name, |name| std::env::var(name).ok())
}

fn resolve_auth_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Auth, ConfigError> {
    let resolved = match profile.auth {
        AuthScheme::Basic => {
            let user = env(USERNAME_ENV).or_else(|| profile.username.clone());
            let password = env(PASSWORD_ENV)
                .map(SecretString::from)
                .or_else(|| keyring_secret(profile_name, SecretKind::Password))
                .or_else(|| profile.password.clone().map(SecretString::from));
            Auth::resolve(AuthScheme::Basic, user.as_deref(), password.as_ref(), None)
        }
        AuthScheme::Bearer => {
            let token = profile
                .token_env
                .as_deref()
                .and_then(&env)
                .or_else(|| env(TOKEN_ENV))
                .map(SecretString::from)
                .or_else(|| keyring_secret(profile_name, SecretKind::Token))
                .or_else(|| profile.token.clone().map(SecretString::from));
            Auth::resolve(AuthScheme::Bearer, None, None, token.as_ref())
        }
    };

    resolved.map_err(|e| ConfigError::NoCredentials {
        profile: profile_name.into(),
        reason: match e {
            fitelnet_api::Error::Configuration { message } => message,
            other => other.to_string(),
        },
    })
}

/// Build a `DeviceConfig` from a profile, with `defaults` filling what the
/// profile leaves unset. No CLI flag overrides.
pub fn profile_to_device_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<DeviceConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("profile '{profile_name}' has no host"),
        });
    }

    let auth = resolve_auth(profile, profile_name)?;
    build_device_config(profile, auth, defaults)
}

/// Build a `DeviceConfig` from a profile and already-resolved credentials.
pub fn build_device_config(
    profile: &Profile,
    auth: Auth,
    defaults: &Defaults,
) -> Result<DeviceConfig, ConfigError> {
    let mut config =
        DeviceConfig::for_host(&profile.host, profile.effective_port(), profile.tls, auth)
            .map_err(|e| ConfigError::Validation {
                field: "host".into(),
                reason: e.to_string(),
            })?;

    config.tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.poll = profile.poll.to_settings()?;
    Ok(config)
}
