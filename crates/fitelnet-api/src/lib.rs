// fitelnet-api: Async Rust client for the FITELnet router HTTP management API

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod token;
pub mod transport;

pub use auth::{Auth, AuthScheme};
pub use client::FitelnetClient;
pub use config::{ConfigMode, ConfigPayload};
pub use error::Error;
pub use models::{
    BatchAccepted, BatchResult, BatchStatus, CliCommand, ClisId, CommandOutcome, MAX_BATCH_SIZE,
    OnFail, OnFailAction, StatusKind, TokenInfo,
};
pub use transport::{TlsMode, TransportConfig};
