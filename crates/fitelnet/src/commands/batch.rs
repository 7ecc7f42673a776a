//! Batch submission with polling, and batch result rendering.

use std::fmt::Write as _;
use std::time::Duration;

use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use fitelnet_core::{
    BatchResult, CliCommand, CommandOutcome, FitelnetDevice, OnFailAction, PollSettings,
};

use crate::cli::{BatchArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Command")]
    cmd: String,
    #[tabled(rename = "On fail")]
    on_fail: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl EntryRow {
    fn new(index: usize, entry: &CommandOutcome) -> Self {
        Self {
            index,
            cmd: entry.cmd.clone(),
            on_fail: entry
                .on_fail
                .map(|f| f.action.to_string())
                .unwrap_or_default(),
            result: entry.result.clone().unwrap_or_default(),
            message: entry.message.clone().unwrap_or_default(),
        }
    }
}

// ── Rendering ───────────────────────────────────────────────────────

/// Summary table followed by each command's captured output.
fn detail(result: &BatchResult, color: bool) -> String {
    let mut out = String::new();
    let id = result
        .clis_id
        .as_ref()
        .map_or_else(|| "-".into(), ToString::to_string);
    let _ = writeln!(
        out,
        "Batch {id}: {} ({} commands)",
        output::paint_status(&result.status, color),
        result.total.unwrap_or(result.entries.len()),
    );

    if result.entries.is_empty() {
        return out.trim_end().to_owned();
    }

    let rows: Vec<EntryRow> = result
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| EntryRow::new(i + 1, e))
        .collect();
    let _ = writeln!(out, "{}", output::render_table(&rows));

    for (i, entry) in result.entries.iter().enumerate() {
        if entry.contents.is_empty() {
            continue;
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}",
            output::heading(&format!("[{}] {}", i + 1, entry.cmd), color)
        );
        let _ = writeln!(out, "{}", entry.output().trim_end());
    }
    out.trim_end().to_owned()
}

/// Captured output only, one block per command.
fn plain(result: &BatchResult) -> String {
    result
        .entries
        .iter()
        .map(|e| e.output().trim_end().to_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn print_result(result: &BatchResult, global: &GlobalOpts) {
    let color = output::should_color(global.color);
    let out = output::render_single(global.output, result, |r| detail(r, color), plain);
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    device: &FitelnetDevice,
    args: BatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let action = if args.exit_on_fail {
        OnFailAction::Exit
    } else {
        OnFailAction::Continue
    };
    let commands: Vec<CliCommand> = collect_commands(&args)?
        .into_iter()
        .map(|cmd| CliCommand::with_action(cmd, action))
        .collect();
    let settings = poll_settings(device.poll_settings(), &args);

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, cancelling batch wait");
                cancel.cancel();
            }
        })
    };

    let result = device
        .commands_wait_with(&commands, &settings, &cancel)
        .await;
    watcher.abort();

    print_result(&result?, global);
    Ok(())
}

fn collect_commands(args: &BatchArgs) -> Result<Vec<String>, CliError> {
    match args.from_file {
        Some(ref path) => {
            let raw = util::read_input(path)?;
            let text = String::from_utf8(raw).map_err(|e| CliError::Validation {
                field: "from-file".into(),
                reason: format!("not UTF-8: {e}"),
            })?;
            Ok(util::command_lines(&text))
        }
        None => Ok(args.commands.clone()),
    }
}

/// Device defaults with per-invocation flag overrides.
fn poll_settings(defaults: &PollSettings, args: &BatchArgs) -> PollSettings {
    let mut settings = defaults.clone();
    if let Some(ms) = args.wait_ms {
        settings.initial_delay = Duration::from_millis(ms);
    }
    if let Some(retries) = args.retries {
        settings.max_retries = retries;
    }
    if let Some(ms) = args.interval_ms {
        settings.interval = Duration::from_millis(ms);
    }
    if args.keep {
        settings.delete_on_completion = false;
    }
    settings
}
