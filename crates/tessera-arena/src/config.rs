//! Arena configuration parameters.

use crate::error::ArenaError;

/// How an arena sources and releases element buffers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AllocatorPolicy {
    /// Every allocation is a fresh heap buffer, dropped when its slot is
    /// cleared.
    #[default]
    Heap,
    /// Cleared buffers are kept per element type and handed back out for
    /// allocations of exactly the same length. [`Init::Uninit`] skips
    /// re-initialising a recycled buffer, so it may contain stale values.
    ///
    /// [`Init::Uninit`]: crate::Init::Uninit
    Recycling,
}

/// Configuration for an [`Arena`](crate::Arena).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Buffer sourcing policy.
    pub policy: AllocatorPolicy,

    /// Upper bound on retained buffers per element type under
    /// [`AllocatorPolicy::Recycling`]. Buffers released beyond this bound
    /// are dropped.
    ///
    /// Default: 64. Must be non-zero when recycling.
    pub max_recycled_buffers: usize,

    /// Slot-table capacity reserved for each pool when an element type is
    /// first used.
    ///
    /// Default: 16. Must not exceed
    /// [`ArenaConfig::MAX_INITIAL_SLOT_CAPACITY`]; pools grow past it on
    /// demand.
    pub initial_slot_capacity: usize,
}

impl ArenaConfig {
    /// Default retained-buffer bound for recycling arenas.
    pub const DEFAULT_MAX_RECYCLED_BUFFERS: usize = 64;

    /// Default per-pool slot reservation.
    pub const DEFAULT_INITIAL_SLOT_CAPACITY: usize = 16;

    /// Upper bound on the per-pool slot reservation. Four pools are
    /// reserved for every element type, so this caps the up-front table
    /// allocation per type.
    pub const MAX_INITIAL_SLOT_CAPACITY: usize = 1 << 16;

    /// Create a config for the given policy with default limits.
    pub fn new(policy: AllocatorPolicy) -> Self {
        Self {
            policy,
            max_recycled_buffers: Self::DEFAULT_MAX_RECYCLED_BUFFERS,
            initial_slot_capacity: Self::DEFAULT_INITIAL_SLOT_CAPACITY,
        }
    }

    /// Check field invariants.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.policy == AllocatorPolicy::Recycling && self.max_recycled_buffers == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_recycled_buffers must be > 0 with the Recycling policy".into(),
            });
        }
        if self.initial_slot_capacity > Self::MAX_INITIAL_SLOT_CAPACITY {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "initial_slot_capacity must be <= {} (got {})",
                    Self::MAX_INITIAL_SLOT_CAPACITY,
                    self.initial_slot_capacity,
                ),
            });
        }
        Ok(())
    }

    /// Whether released buffers are retained for reuse.
    pub fn recycles(&self) -> bool {
        self.policy == AllocatorPolicy::Recycling
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(AllocatorPolicy::default())
    }
}
