//! Disk and user agents
//!
//! Agents are the coordinator's clients:
//! - A disk agent contributes one disk to the free pool
//! - A user agent requests arrays interactively
//! - Both hold their advertised ports open for the array's data path

pub mod client;
pub mod disk;
pub mod listener;
pub mod user;

pub use client::CoordClient;
pub use disk::DiskAgent;
pub use user::UserAgent;
