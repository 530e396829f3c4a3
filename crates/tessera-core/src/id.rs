//! Arena identity and allocation lifetimes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`ArenaId`] allocation.
static ARENA_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for an arena.
///
/// Allocated from a monotonic atomic counter via [`ArenaId::next`]. Every
/// handle records the id of the arena that allocated it, so operators can
/// reject operands that come from two different arenas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId(u64);

impl ArenaId {
    /// Allocate a fresh, unique arena ID. Thread-safe.
    pub fn next() -> Self {
        Self(ARENA_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How long an allocation is expected to live.
///
/// There is no in-place transition between the two: moving data from a
/// temporary to a persistent container means allocating a new persistent
/// container and copying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lifetime {
    /// Caller-owned state, reclaimed by `clear_persistent`, `clear` or
    /// `dispose`.
    Persistent,
    /// Operator results, reclaimed in bulk by `clear_temp`.
    Temp,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persistent => write!(f, "persistent"),
            Self::Temp => write!(f, "temp"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_ids_are_unique() {
        let a = ArenaId::next();
        let b = ArenaId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn lifetime_display() {
        assert_eq!(Lifetime::Persistent.to_string(), "persistent");
        assert_eq!(Lifetime::Temp.to_string(), "temp");
    }
}
