//! Structural self-checks over the arena's slot tables.
//!
//! For every element type and container kind the audit walks the temporary
//! and persistent pools together and verifies:
//!
//! - every live slot carries exactly the flag of its pool's lifetime,
//! - no two live slots share a buffer (zero-length buffers are exempt),
//! - every free-listed slot is marked disposed,
//! - the recorded live count matches the slots actually live.
//!
//! Violations are collected into an [`IntegrityReport`]; the audit itself
//! never panics.

use std::fmt;

use indexmap::IndexSet;
use smallvec::SmallVec;
use tessera_core::{Lifetime, ShapeKind};

use crate::handle::BufferId;
use crate::pool::{SlotFlags, SlotPool};

/// Whether integrity diagnostics run in this build.
///
/// On in debug builds and with the `integrity-checks` feature; otherwise
/// `check_integrity` and `check_valid` return `true` without inspecting
/// anything.
pub const INTEGRITY_CHECKS: bool = cfg!(any(debug_assertions, feature = "integrity-checks"));

/// A single structural inconsistency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// A live slot whose flags do not match its pool.
    WrongFlags {
        /// Element type name.
        element: &'static str,
        /// Container kind of the pool.
        kind: ShapeKind,
        /// Lifetime of the pool.
        lifetime: Lifetime,
        /// Slot index.
        index: u32,
        /// Flags found on the slot.
        flags: SlotFlags,
    },
    /// Two live slots of the same element type and kind share a buffer.
    DuplicateBuffer {
        /// Element type name.
        element: &'static str,
        /// Container kind.
        kind: ShapeKind,
        /// Lifetime of the pool holding the second occurrence.
        lifetime: Lifetime,
        /// Index of the second occurrence.
        index: u32,
        /// The shared buffer.
        buffer: BufferId,
    },
    /// A slot on the free list that is not marked disposed.
    FreeSlotNotDisposed {
        /// Element type name.
        element: &'static str,
        /// Container kind of the pool.
        kind: ShapeKind,
        /// Lifetime of the pool.
        lifetime: Lifetime,
        /// Slot index.
        index: u32,
    },
    /// The pool's live counter disagrees with its slots.
    LiveCountMismatch {
        /// Element type name.
        element: &'static str,
        /// Container kind of the pool.
        kind: ShapeKind,
        /// Lifetime of the pool.
        lifetime: Lifetime,
        /// Live slots found by the walk.
        counted: usize,
        /// Value of the live counter.
        recorded: usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongFlags {
                element,
                kind,
                lifetime,
                index,
                flags,
            } => write!(
                f,
                "{lifetime} {element} {kind} slot {index} has flags {flags:?}"
            ),
            Self::DuplicateBuffer {
                element,
                kind,
                lifetime,
                index,
                buffer,
            } => write!(
                f,
                "{lifetime} {element} {kind} slot {index} shares buffer {:#x} with another live slot",
                buffer.0
            ),
            Self::FreeSlotNotDisposed {
                element,
                kind,
                lifetime,
                index,
            } => write!(
                f,
                "{lifetime} {element} {kind} slot {index} is on the free list but not disposed"
            ),
            Self::LiveCountMismatch {
                element,
                kind,
                lifetime,
                counted,
                recorded,
            } => write!(
                f,
                "{lifetime} {element} {kind} pool records {recorded} live slots, found {counted}"
            ),
        }
    }
}

/// Outcome of an integrity audit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    violations: SmallVec<[Violation; 4]>,
    slots_checked: usize,
}

impl IntegrityReport {
    /// No violations were found.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Every violation found, in walk order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of live slots inspected.
    pub fn slots_checked(&self) -> usize {
        self.slots_checked
    }

    pub(crate) fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }
}

/// What the audit needs to know about one slot.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SlotView {
    pub(crate) index: u32,
    pub(crate) flags: SlotFlags,
    pub(crate) buffer: BufferId,
    pub(crate) len: usize,
}

/// Audit one pool, sharing `seen` with the other pool of the same kind.
#[allow(clippy::too_many_arguments)]
pub(crate) fn audit_slots(
    element: &'static str,
    kind: ShapeKind,
    lifetime: Lifetime,
    slots: impl IntoIterator<Item = SlotView>,
    free_list: &[u32],
    recorded_live: usize,
    seen: &mut IndexSet<BufferId>,
    report: &mut IntegrityReport,
) {
    let mut counted = 0;
    let mut disposed = IndexSet::new();
    for view in slots {
        if view.flags.is_disposed() {
            disposed.insert(view.index);
            continue;
        }
        counted += 1;
        if !view.flags.is_live_for(lifetime) {
            report.push(Violation::WrongFlags {
                element,
                kind,
                lifetime,
                index: view.index,
                flags: view.flags,
            });
        }
        if view.len > 0 && !seen.insert(view.buffer) {
            report.push(Violation::DuplicateBuffer {
                element,
                kind,
                lifetime,
                index: view.index,
                buffer: view.buffer,
            });
        }
    }
    for &index in free_list {
        if !disposed.contains(&index) {
            report.push(Violation::FreeSlotNotDisposed {
                element,
                kind,
                lifetime,
                index,
            });
        }
    }
    if counted != recorded_live {
        report.push(Violation::LiveCountMismatch {
            element,
            kind,
            lifetime,
            counted,
            recorded: recorded_live,
        });
    }
    report.slots_checked += counted;
}

/// Audit a live [`SlotPool`].
pub(crate) fn audit_pool<T>(
    element: &'static str,
    pool: &SlotPool<T>,
    seen: &mut IndexSet<BufferId>,
    report: &mut IntegrityReport,
) {
    let views = pool.iter().map(|(index, slot)| SlotView {
        index,
        flags: slot.flags,
        buffer: BufferId(slot.buffer.as_ptr() as usize),
        len: slot.buffer.len(),
    });
    audit_slots(
        element,
        pool.kind(),
        pool.lifetime(),
        views,
        &pool.free_list,
        pool.live(),
        seen,
        report,
    );
}
