//! Authoritative in-memory registry of users, disks and storage arrays
//!
//! The registry owns every piece of coordinator state: the user map, the
//! disk map, the array map and the port ledger. All five command operations
//! are synchronous functions of (current state, payload) and report their
//! outcome as a `Result`; nothing here aborts. Uniqueness and lifecycle
//! invariants are enforced at the registry boundary:
//! - user/disk/array names are unique within their namespace
//! - each (ip, port) pair is claimed by at most one registrant
//! - a disk is `InDSS` exactly when it belongs to an array, and a disk in an
//!   array can neither be deregistered nor selected again

use crate::common::config::Policy;
use crate::common::proto::{
    ConfigureDssPayload, DeregisterDiskPayload, DeregisterUserPayload, DiskEndpoint,
    DssDescriptor, RegisterDiskPayload, RegisterUserPayload,
};
use crate::common::{Error, Result};
use crate::coordinator::allocator::DiskAllocator;
use crate::coordinator::ports::PortLedger;
use std::collections::HashMap;
use std::fmt;

/// A registered user
#[derive(Debug, Clone)]
pub struct UserEntry {
    pub ip: String,
    pub mport: u16,
    pub cport: u16,
}

/// A registered disk
#[derive(Debug, Clone)]
pub struct DiskEntry {
    pub ip: String,
    pub mport: u16,
    pub cport: u16,
    pub state: DiskState,
    /// Owning array, set exactly when `state == InDss`
    pub dss: Option<String>,
    /// Striping unit of the owning array
    pub striping_unit: Option<u32>,
}

impl DiskEntry {
    pub fn is_free(&self) -> bool {
        self.state == DiskState::Free
    }

    /// Commit this disk to an array. The state, owning array and striping
    /// unit change together so the lifecycle invariant holds at every step.
    pub(crate) fn join_dss(&mut self, dss: &str, striping_unit: u32) {
        self.state = DiskState::InDss;
        self.dss = Some(dss.to_string());
        self.striping_unit = Some(striping_unit);
    }
}

/// Disk lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskState {
    /// Eligible for allocation into a new array
    Free,
    /// Committed to exactly one array; no operation in scope reverts this
    InDss,
}

impl fmt::Display for DiskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskState::Free => write!(f, "Free"),
            DiskState::InDss => write!(f, "InDSS"),
        }
    }
}

/// A configured storage array; immutable once created
#[derive(Debug, Clone)]
pub struct DssEntry {
    pub n: usize,
    pub striping_unit: u32,
    pub disks: Vec<String>,
}

/// Coordinator registry. One instance per coordinator process, constructed
/// explicitly with no ambient state, so tests run as many independent
/// registries as they like.
pub struct Registry {
    policy: Policy,
    users: HashMap<String, UserEntry>,
    disks: HashMap<String, DiskEntry>,
    arrays: HashMap<String, DssEntry>,
    ports: PortLedger,
    allocator: DiskAllocator,
}

impl Registry {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            users: HashMap::new(),
            disks: HashMap::new(),
            arrays: HashMap::new(),
            ports: PortLedger::new(),
            allocator: DiskAllocator::new(),
        }
    }

    // === User operations ===

    pub fn register_user(&mut self, payload: RegisterUserPayload) -> Result<()> {
        self.validate_endpoint(&payload.user_name, &payload.ip, payload.mport, payload.cport)?;
        if self.users.contains_key(&payload.user_name) {
            return Err(Error::DuplicateName(payload.user_name));
        }
        if self.ports.conflicts(&payload.ip, payload.mport, payload.cport) {
            return Err(Error::PortConflict {
                ip: payload.ip,
                mport: payload.mport,
                cport: payload.cport,
            });
        }

        self.ports.reserve(&payload.ip, payload.mport, payload.cport);
        self.users.insert(
            payload.user_name,
            UserEntry {
                ip: payload.ip,
                mport: payload.mport,
                cport: payload.cport,
            },
        );
        Ok(())
    }

    pub fn deregister_user(&mut self, payload: DeregisterUserPayload) -> Result<()> {
        let user = self
            .users
            .remove(&payload.user_name)
            .ok_or(Error::UserNotFound(payload.user_name))?;
        self.ports.release(&user.ip, user.mport, user.cport);
        Ok(())
    }

    // === Disk operations ===

    pub fn register_disk(&mut self, payload: RegisterDiskPayload) -> Result<()> {
        self.validate_endpoint(&payload.disk_name, &payload.ip, payload.mport, payload.cport)?;
        if self.disks.contains_key(&payload.disk_name) {
            return Err(Error::DuplicateName(payload.disk_name));
        }
        if self.ports.conflicts(&payload.ip, payload.mport, payload.cport) {
            return Err(Error::PortConflict {
                ip: payload.ip,
                mport: payload.mport,
                cport: payload.cport,
            });
        }

        self.ports.reserve(&payload.ip, payload.mport, payload.cport);
        self.disks.insert(
            payload.disk_name,
            DiskEntry {
                ip: payload.ip,
                mport: payload.mport,
                cport: payload.cport,
                state: DiskState::Free,
                dss: None,
                striping_unit: None,
            },
        );
        Ok(())
    }

    pub fn deregister_disk(&mut self, payload: DeregisterDiskPayload) -> Result<()> {
        let disk = self
            .disks
            .get(&payload.disk_name)
            .ok_or_else(|| Error::DiskNotFound(payload.disk_name.clone()))?;
        if let Some(dss) = &disk.dss {
            return Err(Error::DiskInDss {
                disk: payload.disk_name.clone(),
                dss: dss.clone(),
            });
        }

        if let Some(disk) = self.disks.remove(&payload.disk_name) {
            self.ports.release(&disk.ip, disk.mport, disk.cport);
        }
        Ok(())
    }

    // === Array operations ===

    /// Create a storage array: validate the request, pick `n` free disks and
    /// commit them, then record the array. Selection and commit happen under
    /// this `&mut` borrow, so no other operation can interleave.
    pub fn configure_dss(&mut self, payload: ConfigureDssPayload) -> Result<DssDescriptor> {
        if payload.dss_name.is_empty() {
            return Err(Error::InvalidParams("dss name must be non-empty".into()));
        }
        if payload.n < self.policy.min_disks {
            return Err(Error::InvalidParams(format!(
                "array needs at least {} disks",
                self.policy.min_disks
            )));
        }
        if !self.policy.valid_striping_unit(payload.striping_unit) {
            return Err(Error::InvalidParams(format!(
                "striping unit must be a power of two in {}..={}",
                self.policy.striping_unit_min, self.policy.striping_unit_max
            )));
        }
        if self.arrays.contains_key(&payload.dss_name) {
            return Err(Error::DssExists(payload.dss_name));
        }

        let members = self.allocator.allocate(
            &mut self.disks,
            &payload.dss_name,
            payload.n,
            payload.striping_unit,
        )?;

        let endpoints: Vec<DiskEndpoint> = members
            .iter()
            .map(|name| {
                let disk = &self.disks[name];
                DiskEndpoint {
                    disk_name: name.clone(),
                    ip: disk.ip.clone(),
                    cport: disk.cport,
                }
            })
            .collect();

        self.arrays.insert(
            payload.dss_name.clone(),
            DssEntry {
                n: payload.n,
                striping_unit: payload.striping_unit,
                disks: members,
            },
        );

        Ok(DssDescriptor {
            dss_name: payload.dss_name,
            n: payload.n,
            striping_unit: payload.striping_unit,
            disks: endpoints,
        })
    }

    // === Queries ===

    pub fn user(&self, name: &str) -> Option<&UserEntry> {
        self.users.get(name)
    }

    pub fn disk(&self, name: &str) -> Option<&DiskEntry> {
        self.disks.get(name)
    }

    pub fn dss(&self, name: &str) -> Option<&DssEntry> {
        self.arrays.get(name)
    }

    pub fn free_disk_count(&self) -> usize {
        self.disks.values().filter(|d| d.is_free()).count()
    }

    fn validate_endpoint(&self, name: &str, ip: &str, mport: u16, cport: u16) -> Result<()> {
        if name.is_empty() || ip.is_empty() {
            return Err(Error::InvalidParams("name and ip must be non-empty".into()));
        }
        if !self.policy.valid_port(mport) || !self.policy.valid_port(cport) {
            return Err(Error::InvalidParams(format!(
                "ports must lie in {}..={}",
                self.policy.port_min, self.policy.port_max
            )));
        }
        Ok(())
    }
}
