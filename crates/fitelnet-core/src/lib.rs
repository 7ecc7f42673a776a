//! Device facade and batch polling for FITELnet routers.
//!
//! Sits between the raw HTTP client (`fitelnet-api`) and consumers such as
//! the `fitelnet` CLI:
//!
//! - **[`FitelnetDevice`]**: one handle per router, holding the HTTP client,
//!   the credentials and the default poll schedule.
//! - **[`wait_for_batch`]**: the submit / poll / delete state machine behind
//!   [`FitelnetDevice::commands_wait`], generic over [`BatchApi`].
//! - **[`DeviceConfig`] / [`PollSettings`]**: runtime configuration built by
//!   the caller; this crate never reads files or the environment.

pub mod config;
pub mod device;
pub mod error;
pub mod poller;

pub use config::{DeviceConfig, PollSettings};
pub use device::FitelnetDevice;
pub use error::CoreError;
pub use poller::{BatchApi, wait_for_batch};

// Wire types consumers need alongside the facade.
pub use fitelnet_api::{
    Auth, AuthScheme, BatchAccepted, BatchResult, BatchStatus, CliCommand, ClisId,
    CommandOutcome, ConfigMode, ConfigPayload, MAX_BATCH_SIZE, OnFailAction, StatusKind, TlsMode,
    TokenInfo,
};
