//! Profile subcommand handlers. These never contact a device.

use std::fmt::Write as _;

use serde::Serialize;
use tabled::Tabled;

use fitelnet_config::{Config, Profile, SecretKind};
use fitelnet_core::AuthScheme;

use crate::cli::{AuthArg, GlobalOpts, ProfileAddArgs, ProfileArgs, ProfileCommand, SecretArg};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

const MASK: &str = "****";

// ── Table row ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct ProfileSummary {
    name: String,
    host: String,
    port: u16,
    tls: bool,
    auth: AuthScheme,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "TLS")]
    tls: bool,
    #[tabled(rename = "Auth")]
    auth: String,
    #[tabled(rename = "Default")]
    default: String,
}

impl From<&ProfileSummary> for ProfileRow {
    fn from(p: &ProfileSummary) -> Self {
        Self {
            name: p.name.clone(),
            host: p.host.clone(),
            port: p.port,
            tls: p.tls,
            auth: p.auth.to_string(),
            default: if p.default { "*".into() } else { String::new() },
        }
    }
}

fn summaries(cfg: &Config) -> Vec<ProfileSummary> {
    cfg.profile_names()
        .into_iter()
        .filter_map(|name| cfg.profiles.get(name).map(|p| (name, p)))
        .map(|(name, p)| ProfileSummary {
            name: name.to_owned(),
            host: p.host.clone(),
            port: p.effective_port(),
            tls: p.tls,
            auth: p.auth,
            default: cfg.default_profile.as_deref() == Some(name),
        })
        .collect()
}

// ── Redaction ───────────────────────────────────────────────────────

fn redacted(profile: &Profile) -> Profile {
    let mut p = profile.clone();
    if p.password.is_some() {
        p.password = Some(MASK.into());
    }
    if p.token.is_some() {
        p.token = Some(MASK.into());
    }
    p
}

fn format_profile(name: &str, p: &Profile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[profiles.{name}]");
    let _ = writeln!(out, "host = \"{}\"", p.host);
    let _ = writeln!(out, "port = {}", p.effective_port());
    let _ = writeln!(out, "tls = {}", p.tls);
    let _ = writeln!(out, "auth = \"{}\"", p.auth);
    if let Some(ref u) = p.username {
        let _ = writeln!(out, "username = \"{u}\"");
    }
    if p.password.is_some() {
        let _ = writeln!(out, "password = \"{MASK}\"");
    }
    if p.token.is_some() {
        let _ = writeln!(out, "token = \"{MASK}\"");
    }
    if let Some(ref env) = p.token_env {
        let _ = writeln!(out, "token_env = \"{env}\"");
    }
    if let Some(ref ca) = p.ca_cert {
        let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
    }
    if let Some(insecure) = p.insecure {
        let _ = writeln!(out, "insecure = {insecure}");
    }
    if let Some(timeout) = p.timeout {
        let _ = writeln!(out, "timeout = {timeout}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[profiles.{name}.poll]");
    let _ = writeln!(out, "wait_ms = {}", p.poll.wait_ms);
    let _ = writeln!(out, "retries = {}", p.poll.retries);
    let _ = writeln!(out, "interval_ms = {}", p.poll.interval_ms);
    let _ = write!(out, "delete = {}", p.poll.delete);
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ProfileCommand::List => {
            let cfg = config::load_config_or_default();
            let rows = summaries(&cfg);
            let out = output::render_list(
                global.output,
                &rows,
                |p| ProfileRow::from(p),
                |p| p.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::Show { name } => {
            let cfg = config::load_config_or_default();
            let name = name.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            let profile = cfg
                .profiles
                .get(&name)
                .ok_or_else(|| CliError::ProfileNotFound {
                    name: name.clone(),
                    available: cfg.profile_names().join(", "),
                })?;
            let shown = redacted(profile);
            let out = output::render_single(
                global.output,
                &shown,
                |p| format_profile(&name, p),
                |p| p.host.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::Add(add) => add_profile(add, global),

        ProfileCommand::Remove { name } => {
            let mut cfg = config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: cfg.profile_names().join(", "),
                    name,
                });
            }
            if !util::confirm(
                "profile remove",
                &format!("Remove profile '{name}' and its keyring secrets?"),
                global.yes,
            )? {
                return Ok(());
            }

            cfg.profiles.remove(&name);
            if cfg.default_profile.as_deref() == Some(name.as_str()) {
                cfg.default_profile = cfg.profile_names().first().map(|n| (*n).to_owned());
            }
            config::save_config(&cfg)?;
            if let Err(e) = fitelnet_config::delete_secrets(&name) {
                tracing::warn!(profile = %name, error = %e, "could not remove keyring secrets");
            }
            output::notice(&format!("Profile '{name}' removed"), global.quiet);
            Ok(())
        }

        ProfileCommand::SetSecret { name, kind } => {
            let kind = match kind {
                SecretArg::Password => SecretKind::Password,
                SecretArg::Token => SecretKind::Token,
            };
            let label = match kind {
                SecretKind::Password => "Password",
                SecretKind::Token => "Token",
            };
            let secret = rpassword::prompt_password(format!("{label} for '{name}': "))?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "secret".into(),
                    reason: format!("{label} cannot be empty"),
                });
            }
            fitelnet_config::store_secret(&name, kind, &secret)?;
            output::notice(
                &format!("{label} stored in system keyring as '{}'", kind.keyring_key(&name)),
                global.quiet,
            );
            Ok(())
        }

        ProfileCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}

fn add_profile(args: ProfileAddArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.address.trim().is_empty() {
        return Err(CliError::Validation {
            field: "address".into(),
            reason: "host cannot be empty".into(),
        });
    }

    let mut cfg = config::load_config()?;
    let profile = Profile {
        host: args.address,
        port: args.api_port,
        tls: args.https,
        auth: match args.auth {
            AuthArg::Basic => AuthScheme::Basic,
            AuthArg::Bearer => AuthScheme::Bearer,
        },
        username: args.username,
        token_env: args.token_env,
        insecure: args.accept_invalid_certs.then_some(true),
        ..Profile::default()
    };

    let replaced = cfg.profiles.insert(args.name.clone(), profile).is_some();
    let first = cfg.profiles.len() == 1;
    if args.default || first {
        cfg.default_profile = Some(args.name.clone());
    }
    let path = config::save_config(&cfg)?;

    let verb = if replaced { "updated" } else { "added" };
    output::notice(
        &format!("Profile '{}' {verb} in {}", args.name, path.display()),
        global.quiet,
    );
    Ok(())
}
