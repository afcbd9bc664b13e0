//! Shared, exhaustible source of identifiers

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out each identifier of `[start, end]` exactly once, in ascending order
///
/// Callers must ensure `end < u64::MAX`.
#[derive(Debug)]
pub struct IdRange {
    start: u64,
    end: u64,
    next: AtomicU64,
}

impl IdRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end,
            next: AtomicU64::new(start),
        }
    }

    /// Claims the next identifier, or `None` once the range is exhausted
    pub fn next_id(&self) -> Option<u64> {
        self.next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (next <= self.end).then_some(next + 1)
            })
            .ok()
    }

    pub fn is_exhausted(&self) -> bool {
        self.next.load(Ordering::Acquire) > self.end
    }

    /// Number of identifiers handed out so far
    pub fn dispatched(&self) -> u64 {
        self.next.load(Ordering::Acquire) - self.start
    }

    /// Number of identifiers in the range
    pub fn total(&self) -> u64 {
        self.end - self.start + 1
    }
}
