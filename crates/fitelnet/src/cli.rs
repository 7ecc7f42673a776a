//! Clap derive structures for the `fitelnet` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fitelnet -- command-line client for the FITELnet router HTTP API
#[derive(Debug, Parser)]
#[command(
    name = "fitelnet",
    version,
    about = "Manage FITELnet routers from the command line",
    long_about = "Run CLI commands, command batches and configuration pushes against\n\
        FITELnet routers through their HTTP management API.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "FITELNET_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device hostname or IP (overrides profile)
    #[arg(long, env = "FITELNET_HOST", global = true)]
    pub host: Option<String>,

    /// Management API port (overrides profile)
    #[arg(long, env = "FITELNET_PORT", global = true)]
    pub port: Option<u16>,

    /// Use https (overrides profile)
    #[arg(long, env = "FITELNET_TLS", global = true)]
    pub tls: bool,

    /// Username for basic auth (password from FITELNET_PASSWORD or keyring)
    #[arg(long, short = 'u', env = "FITELNET_USERNAME", global = true)]
    pub user: Option<String>,

    /// Bearer token (switches to bearer auth)
    #[arg(long, env = "FITELNET_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FITELNET_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "FITELNET_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "FITELNET_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one CLI command and print the device's output
    #[command(alias = "x")]
    Exec(ExecArgs),

    /// Submit a command batch and wait for its result
    #[command(alias = "b")]
    Batch(BatchArgs),

    /// Inspect and delete batch results held by the device
    #[command(alias = "res")]
    Results(ResultsArgs),

    /// Push configuration to the device
    Config(ConfigArgs),

    /// Issue and revoke access tokens
    Token(TokenArgs),

    /// Manage device profiles
    Profile(ProfileArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Render man pages (one per command) or print the top-level page
    Man(ManArgs),
}

// ── Exec ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Command text; multiple words are joined with spaces
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub command: Vec<String>,
}

// ── Batch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Commands to run, one per argument (at most 10)
    #[arg(required_unless_present = "from_file")]
    pub commands: Vec<String>,

    /// Read commands from a file, one per line ("-" for stdin)
    #[arg(long, short = 'f', conflicts_with = "commands")]
    pub from_file: Option<PathBuf>,

    /// Stop the batch at the first failing command
    #[arg(long)]
    pub exit_on_fail: bool,

    /// Delay before the first poll, in milliseconds
    #[arg(long)]
    pub wait_ms: Option<u64>,

    /// Extra polls after the first one
    #[arg(long, allow_negative_numbers = true)]
    pub retries: Option<i32>,

    /// Delay between polls, in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Keep the result record on the device after completion
    #[arg(long)]
    pub keep: bool,
}

// ── Results ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ResultsArgs {
    #[command(subcommand)]
    pub command: ResultsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResultsCommand {
    /// List the batch ids the device holds results for
    #[command(alias = "ls")]
    List,

    /// Show one batch result
    Get {
        /// Batch id (clis_id)
        id: String,
    },

    /// Delete one batch result
    #[command(alias = "rm")]
    Delete {
        /// Batch id (clis_id)
        id: String,
    },

    /// Delete every batch result on the device
    Clear,
}

// ── Config push ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Merge (default) or replace the device configuration
    Push {
        /// Configuration file ("-" for stdin)
        file: PathBuf,

        /// Replace the whole configuration instead of merging
        #[arg(long)]
        replace: bool,

        /// Do not run `commit` after the push
        #[arg(long)]
        no_commit: bool,
    },
}

// ── Token ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Issue an access token with the profile's basic credentials
    Issue {
        /// Store the token in the keyring for the active profile
        #[arg(long)]
        save: bool,
    },

    /// Revoke an access token
    Revoke {
        /// Token to revoke
        token: String,
    },
}

// ── Profile ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// List configured profiles
    #[command(alias = "ls")]
    List,

    /// Show a profile with secrets masked
    Show {
        /// Profile name (default: active profile)
        name: Option<String>,
    },

    /// Add or replace a profile
    Add(ProfileAddArgs),

    /// Remove a profile and its keyring secrets
    #[command(alias = "rm")]
    Remove {
        /// Profile name
        name: String,
    },

    /// Store a password or token for a profile in the system keyring
    SetSecret {
        /// Profile name
        name: String,

        /// Which secret to store
        #[arg(long, value_enum, default_value = "password")]
        kind: SecretArg,
    },

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct ProfileAddArgs {
    /// Profile name
    pub name: String,

    /// Device hostname or IP
    #[arg(long = "address", short = 'a', value_name = "HOST")]
    pub address: String,

    /// Management API port
    #[arg(long = "api-port", value_name = "PORT")]
    pub api_port: Option<u16>,

    /// Use https
    #[arg(long = "https")]
    pub https: bool,

    /// Auth scheme
    #[arg(long, value_enum, default_value = "basic")]
    pub auth: AuthArg,

    /// Username for basic auth
    #[arg(long)]
    pub username: Option<String>,

    /// Environment variable holding the bearer token
    #[arg(long)]
    pub token_env: Option<String>,

    /// Accept self-signed certificates for this profile
    #[arg(long = "accept-invalid-certs")]
    pub accept_invalid_certs: bool,

    /// Make this the default profile
    #[arg(long)]
    pub default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthArg {
    Basic,
    Bearer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecretArg {
    Password,
    Token,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

// ── Man pages ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ManArgs {
    /// Write `fitelnet.1`, `fitelnet-batch.1`, ... into this directory
    /// instead of printing `fitelnet.1` to stdout
    pub dir: Option<PathBuf>,
}
