//! Command dispatch: bridges CLI args -> device facade -> output formatting.

pub mod batch;
pub mod config_push;
pub mod exec;
pub mod man;
pub mod profile;
pub mod results;
pub mod token;
pub mod util;

use fitelnet_core::FitelnetDevice;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    device: &FitelnetDevice,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Exec(args) => exec::handle(device, args, global).await,
        Command::Batch(args) => batch::handle(device, args, global).await,
        Command::Results(args) => results::handle(device, args, global).await,
        Command::Config(args) => config_push::handle(device, args, global).await,
        Command::Token(args) => token::handle(device, args, global).await,
        // Local commands are handled before a device is built
        Command::Profile(_) | Command::Completions(_) | Command::Man(_) => Err(CliError::Internal(
            "local command routed to device dispatch".into(),
        )),
    }
}
