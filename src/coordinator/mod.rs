//! Coordinator implementation
//!
//! The coordinator is responsible for:
//! - Agent registration (users and disks)
//! - Port bookkeeping across all registrants
//! - Array assembly (free-disk selection + striping parameters)
//! - One response per decodable request, over a single UDP socket

pub mod allocator;
pub mod dispatcher;
pub mod ports;
pub mod registry;
pub mod server;

pub use registry::Registry;
pub use server::Coordinator;
