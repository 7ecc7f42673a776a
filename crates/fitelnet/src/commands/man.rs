//! Man page rendering.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;

use crate::cli::{Cli, GlobalOpts, ManArgs};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ManArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cmd = Cli::command();
    match args.dir {
        None => {
            let mut stdout = io::stdout().lock();
            clap_mangen::Man::new(cmd).render(&mut stdout)?;
            stdout.flush()?;
        }
        Some(ref dir) => {
            fs::create_dir_all(dir)?;
            let written = write_pages(&cmd, dir)?;
            output::notice(
                &format!("Wrote {written} man pages to {}", dir.display()),
                global.quiet,
            );
        }
    }
    Ok(())
}

/// Write `<name>.1` for `cmd` and each visible subcommand, returning the
/// number of pages written.
fn write_pages(cmd: &clap::Command, dir: &Path) -> io::Result<usize> {
    let name = cmd.get_name().to_owned();
    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut page)?;
    fs::write(dir.join(format!("{name}.1")), page)?;

    let mut written = 1;
    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let sub = sub.clone().name(format!("{name}-{}", sub.get_name()));
        written += write_pages(&sub, dir)?;
    }
    Ok(written)
}
