//! Configuration push handler.

use fitelnet_core::{ConfigMode, FitelnetDevice};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    device: &FitelnetDevice,
    args: ConfigArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Push {
            file,
            replace,
            no_commit,
        } => {
            let payload = util::read_input(&file)?;
            if payload.is_empty() {
                return Err(CliError::Validation {
                    field: "file".into(),
                    reason: format!("{} is empty", file.display()),
                });
            }

            let mode = if replace {
                if !util::confirm(
                    "config push --replace",
                    "Replace the whole device configuration?",
                    global.yes,
                )? {
                    return Ok(());
                }
                ConfigMode::Replace
            } else {
                ConfigMode::Merge
            };

            let answer = device.push_config(mode, payload, !no_commit).await?;
            output::print_output(answer.trim_end(), global.quiet);
            let verb = if no_commit { "pushed" } else { "pushed and committed" };
            output::notice(&format!("Configuration {verb} ({mode})"), global.quiet);
            Ok(())
        }
    }
}
