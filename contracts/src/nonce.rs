//! Per-address replay nonces.
//!
//! Every authorized (relayed) action consumes exactly one nonce for the
//! authorizing address. A presented nonce must equal the stored counter —
//! no gaps, no reuse — so two relayers racing the same signature resolve
//! deterministically: one consumes the nonce, the other gets
//! [`NonceError::NonceMismatch`].
//!
//! The registry that owns this table is responsible for ordering: check
//! with [`NonceRegistry::expect`] alongside the action's other
//! preconditions, and [`advance`](NonceRegistry::advance) only at commit
//! time, so a rejected action never burns a nonce.

use std::collections::HashMap;
use thiserror::Error;

use quill_protocol::crypto::LedgerAddress;

/// Rejection of a stale or premature nonce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("nonce mismatch for {address}: expected {expected}, presented {presented}")]
pub struct NonceError {
    pub address: LedgerAddress,
    pub expected: u64,
    pub presented: u64,
}

/// Monotonic per-address counters, starting at 0 for unseen addresses.
#[derive(Debug, Default, Clone)]
pub struct NonceRegistry {
    counters: HashMap<LedgerAddress, u64>,
}

impl NonceRegistry {
    /// An empty registry: every address starts at nonce 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// The next nonce expected from `address`.
    pub fn current(&self, address: &LedgerAddress) -> u64 {
        self.counters.get(address).copied().unwrap_or(0)
    }

    /// Check that `presented` is the expected nonce, without consuming it.
    pub fn expect(&self, address: &LedgerAddress, presented: u64) -> Result<(), NonceError> {
        let expected = self.current(address);
        if presented != expected {
            return Err(NonceError {
                address: *address,
                expected,
                presented,
            });
        }
        Ok(())
    }

    /// Unconditionally advance the counter by one.
    ///
    /// Only call after [`expect`](Self::expect) and the action's other
    /// preconditions have all passed — this is the commit half.
    pub fn advance(&mut self, address: &LedgerAddress) {
        *self.counters.entry(*address).or_insert(0) += 1;
    }

    /// Check and consume in one step.
    pub fn consume(&mut self, address: &LedgerAddress, presented: u64) -> Result<(), NonceError> {
        self.expect(address, presented)?;
        self.advance(address);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> LedgerAddress {
        LedgerAddress::new([byte; 20])
    }

    #[test]
    fn unseen_address_starts_at_zero() {
        let nonces = NonceRegistry::new();
        assert_eq!(nonces.current(&addr(1)), 0);
    }

    #[test]
    fn consume_increments_by_exactly_one() {
        let mut nonces = NonceRegistry::new();
        nonces.consume(&addr(1), 0).unwrap();
        assert_eq!(nonces.current(&addr(1)), 1);
        nonces.consume(&addr(1), 1).unwrap();
        assert_eq!(nonces.current(&addr(1)), 2);
    }

    #[test]
    fn replay_is_rejected() {
        let mut nonces = NonceRegistry::new();
        nonces.consume(&addr(1), 0).unwrap();
        let err = nonces.consume(&addr(1), 0).unwrap_err();
        assert_eq!(err.expected, 1);
        assert_eq!(err.presented, 0);
    }

    #[test]
    fn future_nonce_is_rejected() {
        let mut nonces = NonceRegistry::new();
        assert!(nonces.consume(&addr(1), 5).is_err());
        // A failed consume leaves the counter untouched.
        assert_eq!(nonces.current(&addr(1)), 0);
    }

    #[test]
    fn counters_are_independent_per_address() {
        let mut nonces = NonceRegistry::new();
        nonces.consume(&addr(1), 0).unwrap();
        nonces.consume(&addr(1), 1).unwrap();
        assert_eq!(nonces.current(&addr(2)), 0);
    }

    #[test]
    fn expect_does_not_consume() {
        let nonces = NonceRegistry::new();
        nonces.expect(&addr(1), 0).unwrap();
        assert_eq!(nonces.current(&addr(1)), 0);
    }
}
