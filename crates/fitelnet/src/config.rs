//! CLI configuration: layers `GlobalOpts` flag overrides over the shared
//! `fitelnet-config` profiles and produces a `DeviceConfig`.
//!
//! Precedence per field: flag > env var (via clap `env`) > profile > default.

use std::time::Duration;

use clap::parser::ValueSource;
use clap::{ArgMatches, ValueEnum};
use secrecy::SecretString;

use fitelnet_config::{Config, Defaults, Profile};
use fitelnet_core::{Auth, AuthScheme, DeviceConfig, TlsMode};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use fitelnet_config::{config_path, load_config, load_config_or_default, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the `DeviceConfig` for this invocation.
pub fn build_device_config(global: &GlobalOpts) -> Result<DeviceConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let base = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // An explicitly named profile must exist.
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: cfg.profile_names().join(", "),
            });
        }
        // No profile: flags and env vars alone must name the device.
        None if global.host.is_some() => Profile::default(),
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    let profile = apply_overrides(base, global);
    tracing::debug!(profile = %profile_name, host = %profile.host, "resolved device profile");

    let auth = match global.token {
        Some(ref token) => Auth::Bearer {
            token: SecretString::from(token.clone()),
        },
        None => fitelnet_config::resolve_auth(&profile, &profile_name)?,
    };

    let mut device = fitelnet_config::build_device_config(&profile, auth, &cfg.defaults)?;
    if global.insecure {
        device.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        device.timeout = Duration::from_secs(secs);
    }
    Ok(device)
}

/// Take `--output` and `--color` from `[defaults]` when neither a flag nor
/// an env var set them.
pub fn apply_output_defaults(global: &mut GlobalOpts, matches: &ArgMatches) {
    let from_default = |id: &str| matches.value_source(id) == Some(ValueSource::DefaultValue);
    if !from_default("output") && !from_default("color") {
        return;
    }
    // A broken config file is reported by the command that needs it.
    match load_config() {
        Ok(cfg) => apply_defaults(global, &cfg.defaults, from_default),
        Err(e) => tracing::debug!(error = %e, "config defaults not applied"),
    }
}

fn apply_defaults(
    global: &mut GlobalOpts,
    defaults: &Defaults,
    from_default: impl Fn(&str) -> bool,
) {
    if from_default("output") {
        match OutputFormat::from_str(&defaults.output, true) {
            Ok(format) => global.output = format,
            Err(_) => tracing::warn!(value = %defaults.output, "ignoring unknown defaults.output"),
        }
    }
    if from_default("color") {
        match ColorMode::from_str(&defaults.color, true) {
            Ok(mode) => global.color = mode,
            Err(_) => tracing::warn!(value = %defaults.color, "ignoring unknown defaults.color"),
        }
    }
}

/// Apply connection flag overrides to a profile.
fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if global.port.is_some() {
        profile.port = global.port;
    }
    if global.tls {
        profile.tls = true;
    }
    if global.user.is_some() {
        profile.username.clone_from(&global.user);
        profile.auth = AuthScheme::Basic;
    }
    if global.token.is_some() {
        profile.auth = AuthScheme::Bearer;
    }
    profile
}
