//! Array allocator: picks the member disks for a new storage array
//!
//! Selection is uniform random without replacement over the disks that are
//! currently free. Selection and the flip to `InDss` happen in one call
//! under the registry's exclusive borrow, so no other operation can observe
//! a half-committed array.

use crate::common::{Error, Result};
use crate::coordinator::registry::DiskEntry;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

pub struct DiskAllocator {
    rng: StdRng,
}

impl DiskAllocator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Select `n` free disks at random and commit them to `dss_name` with the
    /// array's striping unit. Returns the selected names, or
    /// [`Error::InsufficientDisks`] with every disk left untouched.
    pub fn allocate(
        &mut self,
        disks: &mut HashMap<String, DiskEntry>,
        dss_name: &str,
        n: usize,
        striping_unit: u32,
    ) -> Result<Vec<String>> {
        let free: Vec<String> = disks
            .iter()
            .filter(|(_, disk)| disk.is_free())
            .map(|(name, _)| name.clone())
            .collect();

        if free.len() < n {
            return Err(Error::InsufficientDisks {
                needed: n,
                available: free.len(),
            });
        }

        let selected: Vec<String> = free.choose_multiple(&mut self.rng, n).cloned().collect();

        for name in &selected {
            if let Some(disk) = disks.get_mut(name) {
                disk.join_dss(dss_name, striping_unit);
            }
        }

        Ok(selected)
    }
}

impl Default for DiskAllocator {
    fn default() -> Self {
        Self::new()
    }
}
