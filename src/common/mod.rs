//! Common utilities and types shared across dstripe

pub mod config;
pub mod error;
pub mod proto;
pub mod utils;

pub use config::{AgentConfig, CoordinatorConfig, Policy, DEFAULT_COORD_PORT};
pub use error::{Error, Result};
pub use proto::{
    AgentDescriptor, DiskEndpoint, DssDescriptor, Request, Response, FAILURE, MAX_DATAGRAM,
    SUCCESS,
};
pub use utils::new_txid;
