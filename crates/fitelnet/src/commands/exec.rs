//! Single command execution.

use serde::Serialize;

use fitelnet_core::FitelnetDevice;

use crate::cli::{ExecArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ExecOutput {
    cmd: String,
    output: String,
}

pub async fn handle(
    device: &FitelnetDevice,
    args: ExecArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cmd = args.command.join(" ");
    let text = device.command(&cmd).await?;

    let result = ExecOutput { cmd, output: text };
    let out = output::render_single(
        global.output,
        &result,
        |r| r.output.trim_end().to_owned(),
        |r| r.output.trim_end().to_owned(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
