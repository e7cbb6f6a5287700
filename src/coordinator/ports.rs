//! Port ledger: which (ip, port) pairs are currently claimed
//!
//! Users and disks draw from the same port space, so one set covers both.
//! The ledger tracks membership only, with no per-owner bookkeeping; a
//! crashed agent's ports are freed by its own deregister path, not here.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct PortLedger {
    claimed: HashSet<(String, u16)>,
}

impl PortLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim both ports for a registrant. The caller checks
    /// [`conflicts`](Self::conflicts) first; reserve itself is unconditional.
    pub fn reserve(&mut self, ip: &str, mport: u16, cport: u16) {
        self.claimed.insert((ip.to_string(), mport));
        self.claimed.insert((ip.to_string(), cport));
    }

    /// Free both ports. Idempotent: releasing an unclaimed pair is a no-op.
    pub fn release(&mut self, ip: &str, mport: u16, cport: u16) {
        self.claimed.remove(&(ip.to_string(), mport));
        self.claimed.remove(&(ip.to_string(), cport));
    }

    /// True if either port is already claimed by anyone at this address.
    pub fn conflicts(&self, ip: &str, mport: u16, cport: u16) -> bool {
        self.claimed.contains(&(ip.to_string(), mport))
            || self.claimed.contains(&(ip.to_string(), cport))
    }

    /// Number of claimed (ip, port) pairs.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_and_conflict() {
        let mut ledger = PortLedger::new();
        assert!(!ledger.conflicts("127.0.0.1", 2500, 2501));

        ledger.reserve("127.0.0.1", 2500, 2501);
        assert_eq!(ledger.len(), 2);

        // Either port colliding is a conflict
        assert!(ledger.conflicts("127.0.0.1", 2500, 2600));
        assert!(ledger.conflicts("127.0.0.1", 2600, 2501));
        assert!(ledger.conflicts("127.0.0.1", 2500, 2501));
        assert!(!ledger.conflicts("127.0.0.1", 2600, 2601));
    }

    #[test]
    fn test_same_port_different_address() {
        let mut ledger = PortLedger::new();
        ledger.reserve("10.0.0.1", 2500, 2501);

        // The pair is (ip, port); another address may claim the same ports
        assert!(!ledger.conflicts("10.0.0.2", 2500, 2501));
    }

    #[test]
    fn test_release_idempotent() {
        let mut ledger = PortLedger::new();
        ledger.reserve("127.0.0.1", 2500, 2501);

        ledger.release("127.0.0.1", 2500, 2501);
        assert!(ledger.is_empty());
        assert!(!ledger.conflicts("127.0.0.1", 2500, 2501));

        // Releasing again is a no-op, not an error
        ledger.release("127.0.0.1", 2500, 2501);
        assert!(ledger.is_empty());
    }
}
