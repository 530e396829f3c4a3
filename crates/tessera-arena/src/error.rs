//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use tessera_core::ArenaId;

use crate::handle::SlotKey;

/// Errors raised by arena lifecycle and bookkeeping operations.
///
/// Handle accessors cannot return these (they have no error channel in the
/// operator signatures), so a disposed arena or stale handle panics with the
/// `Display` text of the corresponding variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The arena was disposed (or dropped) and can no longer be used.
    Disposed {
        /// The disposed arena.
        arena: ArenaId,
    },
    /// A handle whose slot has been cleared since it was issued.
    StaleHandle {
        /// The key carried by the handle.
        key: SlotKey,
        /// Generation currently stored in the slot, if the slot exists.
        current_generation: Option<u32>,
    },
    /// The persistent allocation count differs from the recorded watermark.
    PersistentCountMismatch {
        /// Count recorded by `set_expected_persistent_allocation_count`
        /// (zero if never recorded).
        expected: usize,
        /// Count observed now.
        actual: usize,
    },
    /// An [`ArenaConfig`](crate::ArenaConfig) failed validation.
    InvalidConfig {
        /// Human-readable description of the invalid field.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disposed { arena } => write!(f, "arena {arena} used after dispose"),
            Self::StaleHandle {
                key,
                current_generation,
            } => {
                write!(f, "stale handle {key}")?;
                match current_generation {
                    Some(current) => write!(f, ": slot is at generation {current}"),
                    None => write!(f, ": slot does not exist"),
                }
            }
            Self::PersistentCountMismatch { expected, actual } => {
                write!(
                    f,
                    "persistent allocation count mismatch: expected {expected}, found {actual}"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_mismatch_display() {
        let err = ArenaError::PersistentCountMismatch {
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "persistent allocation count mismatch: expected 2, found 3"
        );
    }

    #[test]
    fn disposed_display_mentions_dispose() {
        let id = ArenaId::next();
        let err = ArenaError::Disposed { arena: id };
        assert!(err.to_string().contains("used after dispose"));
    }
}
