//! The capability trait shared by [`Vector`](crate::Vector) and
//! [`Matrix`](crate::Matrix).
//!
//! The operator layer is written once against [`Container`] and picks up
//! both container kinds through blanket impls.

use std::fmt;

use tessera_core::{ArenaId, Element, Lifetime, LinalgError, Shape};
use tracing::{error, warn};

use crate::handle::{BufferId, RawHandle, SlotKey};
use crate::integrity::INTEGRITY_CHECKS;
use crate::raw;

pub(crate) mod sealed {
    use crate::handle::RawHandle;

    /// Restricts [`Container`](super::Container) to this crate's types and
    /// keeps handle construction internal.
    pub trait Sealed<T> {
        fn from_raw(raw: RawHandle<T>) -> Self;
    }
}

/// A handle onto an arena buffer of `T` elements.
///
/// Handles are cheap to clone; a clone is an alias of the same buffer.
/// Every method panics if the owning arena has been disposed or the handle
/// is stale (its slot was released by a clear).
pub trait Container<T: Element>: Clone + fmt::Debug + sealed::Sealed<T> {
    /// The same container kind over a different element type (comparison
    /// results are `Self::Rebind<bool>`).
    type Rebind<U: Element>: Container<U>;

    /// The underlying handle.
    fn raw(&self) -> &RawHandle<T>;

    /// Slot key of the buffer.
    fn key(&self) -> SlotKey {
        self.raw().key
    }

    /// Fixed shape.
    fn shape(&self) -> Shape {
        self.raw().shape
    }

    /// Number of elements.
    fn len(&self) -> usize {
        self.shape().len()
    }

    /// Whether the container has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifetime tag the buffer was allocated with.
    fn lifetime(&self) -> Lifetime {
        self.raw().key.lifetime
    }

    /// Allocated by a `temp_*` factory or an operator.
    fn is_temp(&self) -> bool {
        self.lifetime() == Lifetime::Temp
    }

    /// Allocated by a persistent factory.
    fn is_persistent(&self) -> bool {
        self.lifetime() == Lifetime::Persistent
    }

    /// Id of the owning arena.
    fn arena_id(&self) -> ArenaId {
        self.raw().arena.id
    }

    /// Identity of the underlying buffer.
    fn buffer_id(&self) -> BufferId {
        self.with_slice(|s| BufferId(s.as_ptr() as usize))
    }

    /// Run `f` over the elements.
    ///
    /// `f` must not touch the arena or any of its containers; doing so
    /// panics with a `RefCell` borrow error.
    fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.raw().with_slice(f)
    }

    /// Run `f` over the elements mutably. The same restriction as
    /// [`Container::with_slice`] applies.
    fn with_slice_mut<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> R {
        self.raw().with_slice_mut(f)
    }

    /// Copy the elements out.
    fn to_vec(&self) -> Vec<T> {
        self.with_slice(|s| s.to_vec())
    }

    /// Set every element to `value`.
    fn fill(&self, value: T) {
        raw::scal(self.raw(), tessera_kernel::fill::<T>, value);
    }

    /// Overwrite the elements with `values`, which must have exactly
    /// `len()` elements.
    fn copy_from_slice(&self, values: &[T]) -> Result<(), LinalgError> {
        if values.len() != self.len() {
            return Err(LinalgError::DimensionMismatch {
                op: "copy_from_slice",
                dimension: "element count",
                expected: self.len(),
                actual: values.len(),
            });
        }
        self.with_slice_mut(|dst| dst.copy_from_slice(values));
        Ok(())
    }

    /// Overwrite the elements with those of `src` (same arena and shape).
    fn copy_inpl(&self, src: &Self) -> Result<(), LinalgError> {
        crate::ops::check_arena("copy_inpl", self.raw(), src.raw())?;
        crate::ops::check_shape("copy_inpl", self.shape(), src.shape())?;
        raw::comp(self.raw(), src.raw(), tessera_kernel::copy::<T>);
        Ok(())
    }

    /// Same shape and element-wise equal.
    fn equals_by_value(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.to_vec() == other.to_vec()
    }

    /// Debug diagnostic: the handle resolves to a live slot whose flags
    /// match its lifetime. Logs a warning (without failing) when every
    /// element is NaN. Returns `true` without checking when integrity
    /// checks are compiled out.
    fn check_valid(&self) -> bool {
        if !INTEGRITY_CHECKS {
            return true;
        }
        let raw = self.raw();
        if !raw.arena.is_live() {
            error!(arena = %raw.arena.id, key = %raw.key, "container outlived its arena");
            return false;
        }
        let (valid, all_nan) = raw.arena.with_state(|state| {
            if !state.is_valid::<T>(raw.key) {
                return (false, false);
            }
            let buffer = state.buffer::<T>(raw.key, raw.shape.len());
            (true, !buffer.is_empty() && buffer.iter().all(|v| v.is_nan()))
        });
        if !valid {
            error!(arena = %raw.arena.id, key = %raw.key, "container failed validity check");
            return false;
        }
        if all_nan {
            warn!(arena = %raw.arena.id, key = %raw.key, "container holds only NaN values");
        }
        true
    }
}
