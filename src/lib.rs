//! # dstripe
//!
//! A minimal control plane for distributed striped storage arrays (DSS):
//! - Central coordinator owning the authoritative user/disk/array registry
//! - UDP/JSON request-response control protocol, one message per datagram
//! - Random allocation of free disks into named striped arrays
//! - Disk and user agent processes that register with the coordinator
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────────────────────┐
//!                │        Coordinator           │
//!                │  (users, disks, arrays,      │
//!                │   port ledger, in memory)    │
//!                └──────────────┬───────────────┘
//!                               │ UDP/JSON
//!        ┌──────────────┬───────┴──────┬──────────────┐
//!        │              │              │              │
//!   ┌────▼─────┐  ┌─────▼────┐   ┌────▼─────┐   ┌────▼─────┐
//!   │ Disk D1  │  │ Disk D2  │   │ Disk D3  │   │ User U1  │
//!   │ (Free)   │  │ (InDSS)  │   │ (Free)   │   │          │
//!   └──────────┘  └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! The coordinator processes one datagram at a time on a single control
//! loop; a `configure-dss` request therefore sees a consistent snapshot of
//! free disks and commits its selection atomically. The data plane is out of
//! scope: once an array is configured, the requester talks to the member
//! disks directly using the endpoints returned in the response.
//!
//! ## Usage
//!
//! ### Start the coordinator
//! ```bash
//! dstripe-coord serve --bind 127.0.0.1:2500
//! ```
//!
//! ### Start a disk agent
//! ```bash
//! dstripe-disk --name d1 --mport 2501 --cport 2502 --coordinator 127.0.0.1:2500
//! ```
//!
//! ### Run a user agent (interactive)
//! ```bash
//! dstripe --name alice --mport 2600 --cport 2601 --coordinator 127.0.0.1:2500
//! # then at the prompt:
//! #   configure-dss arrayA 3 4096
//! #   deregister
//! ```

pub mod agent;
pub mod common;
pub mod coordinator;

// Re-export commonly used types
pub use agent::{CoordClient, DiskAgent, UserAgent};
pub use common::{CoordinatorConfig, Error, Policy, Result};
pub use coordinator::{Coordinator, Registry};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
