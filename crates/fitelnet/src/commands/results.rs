//! Batch result record handlers.

use tabled::Tabled;

use fitelnet_core::{ClisId, FitelnetDevice};

use crate::cli::{GlobalOpts, ResultsArgs, ResultsCommand};
use crate::error::CliError;
use crate::output;

use super::{batch, util};

#[derive(Tabled)]
struct BatchIdRow {
    #[tabled(rename = "Batch ID")]
    id: String,
}

pub async fn handle(
    device: &FitelnetDevice,
    args: ResultsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ResultsCommand::List => {
            let ids = device.list_batches().await?;
            let out = output::render_list(
                global.output,
                &ids,
                |id| BatchIdRow { id: id.to_string() },
                ToString::to_string,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResultsCommand::Get { id } => {
            let result = device.result(&parse_id(&id)).await?;
            batch::print_result(&result, global);
            Ok(())
        }

        ResultsCommand::Delete { id } => {
            device.delete_result(&parse_id(&id)).await?;
            output::notice(&format!("Batch {id} deleted"), global.quiet);
            Ok(())
        }

        ResultsCommand::Clear => {
            if !util::confirm(
                "results clear",
                "Delete every batch result on the device?",
                global.yes,
            )? {
                return Ok(());
            }
            device.clear_results().await?;
            output::notice("All batch results deleted", global.quiet);
            Ok(())
        }
    }
}

fn parse_id(raw: &str) -> ClisId {
    let Ok(id) = raw.parse::<ClisId>();
    id
}
