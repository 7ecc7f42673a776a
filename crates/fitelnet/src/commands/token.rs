//! Access token handlers.

use secrecy::SecretString;

use fitelnet_core::{FitelnetDevice, TokenInfo};

use crate::cli::{GlobalOpts, TokenArgs, TokenCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

fn detail(info: &TokenInfo) -> String {
    let expires = info
        .expires_in
        .map_or_else(|| "-".into(), |s| format!("{s}s"));
    format!(
        "Token:   {}\nType:    {}\nExpires: {expires}",
        info.access_token, info.token_type
    )
}

pub async fn handle(
    device: &FitelnetDevice,
    args: TokenArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TokenCommand::Issue { save } => {
            let info = device.issue_token().await?;

            if save {
                let cfg = config::load_config_or_default();
                let profile = config::active_profile_name(global, &cfg);
                fitelnet_config::store_secret(
                    &profile,
                    fitelnet_config::SecretKind::Token,
                    &info.access_token,
                )?;
                output::notice(
                    &format!("Token stored in keyring for profile '{profile}'"),
                    global.quiet,
                );
            }

            let out = output::render_single(global.output, &info, detail, |i| {
                i.access_token.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TokenCommand::Revoke { token } => {
            device.revoke_token(&SecretString::from(token)).await?;
            output::notice("Token revoked", global.quiet);
            Ok(())
        }
    }
}
