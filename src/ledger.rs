//! Slot accounting for a ring
//!
//! The kernel frees an SQE as soon as it consumes the submission, long before
//! the matching completion is released. The ledger instead counts a slot as
//! busy from acquisition until its completion is marked seen, so the number
//! of operations in flight never exceeds the ring depth and the CQ can never
//! overflow.

use crate::error::{Error, Result};

/// Free-running head/tail counters over `capacity` slots
///
/// `tail` advances on reserve, `head` on release. Both wrap mod 2^32 and
/// `tail - head <= capacity` always holds.
#[derive(Debug, Clone)]
pub(crate) struct SlotLedger {
    capacity: u32,
    head: u32,
    tail: u32,
}

impl SlotLedger {
    pub(crate) fn new(capacity: u32) -> Self {
        Self::starting_at(capacity, 0)
    }

    fn starting_at(capacity: u32, index: u32) -> Self {
        Self {
            capacity,
            head: index,
            tail: index,
        }
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Slots reserved and not yet released
    pub(crate) fn outstanding(&self) -> u32 {
        self.tail.wrapping_sub(self.head)
    }

    pub(crate) fn free(&self) -> u32 {
        self.capacity - self.outstanding()
    }

    /// Claim one slot, failing without side effects when none is free
    pub(crate) fn reserve(&mut self) -> Result<()> {
        if self.free() == 0 {
            return Err(Error::QueueFull);
        }
        self.tail = self.tail.wrapping_add(1);
        Ok(())
    }

    /// Give back a slot claimed by [`reserve`](Self::reserve)
    ///
    /// Returns `false`, leaving the counters untouched, when nothing is
    /// outstanding: a completion was released twice.
    pub(crate) fn release(&mut self) -> bool {
        if self.outstanding() == 0 {
            return false;
        }
        self.head = self.head.wrapping_add(1);
        true
    }
}
