//! The arena: factories, lifecycle and bookkeeping.

use std::any::TypeId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tessera_core::{ArenaId, Element, LinalgError, Lifetime, Shape};
use tracing::{debug, error, warn};

use crate::bucket::{ErasedBuckets, TypedBuckets};
use crate::config::{AllocatorPolicy, ArenaConfig};
use crate::container::sealed::Sealed;
use crate::container::Container;
use crate::error::ArenaError;
use crate::handle::{ArenaRef, RawHandle, SlotKey};
use crate::init::Init;
use crate::integrity::{IntegrityReport, INTEGRITY_CHECKS};
use crate::matrix::Matrix;
use crate::pool::Slot;
use crate::vector::Vector;

/// Mutable arena state shared (weakly) with every handle.
pub(crate) struct ArenaState {
    id: ArenaId,
    config: ArenaConfig,
    buckets: IndexMap<TypeId, Box<dyn ErasedBuckets>>,
    disposed: bool,
    expected_persistent: Option<usize>,
}

impl ArenaState {
    fn new(id: ArenaId, config: ArenaConfig) -> Self {
        Self {
            id,
            config,
            buckets: IndexMap::new(),
            disposed: false,
            expected_persistent: None,
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// # Panics
    ///
    /// If the arena has been disposed.
    pub(crate) fn ensure_live(&self) {
        if self.disposed {
            panic!("{}", ArenaError::Disposed { arena: self.id });
        }
    }

    fn typed<T: Element>(&self) -> Option<&TypedBuckets<T>> {
        self.buckets
            .get(&TypeId::of::<T>())
            .and_then(|b| b.as_any().downcast_ref::<TypedBuckets<T>>())
    }

    /// Buckets for `T`, created on first use.
    pub(crate) fn typed_mut<T: Element>(&mut self) -> &mut TypedBuckets<T> {
        let config = &self.config;
        let buckets = self
            .buckets
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                Box::new(TypedBuckets::<T>::new(config)) as Box<dyn ErasedBuckets>
            });
        match buckets.as_any_mut().downcast_mut::<TypedBuckets<T>>() {
            Some(typed) => typed,
            None => unreachable!("bucket map entry for {} has a foreign type", T::NAME),
        }
    }

    pub(crate) fn alloc<T: Element>(
        &mut self,
        lifetime: Lifetime,
        shape: Shape,
        init: Init<T>,
    ) -> SlotKey {
        self.ensure_live();
        self.typed_mut::<T>()
            .alloc(lifetime, shape.kind(), shape.len(), init)
    }

    fn slot<T: Element>(&self, key: SlotKey) -> Result<&Slot<T>, ArenaError> {
        match self.typed::<T>() {
            Some(typed) => typed.pool(key.lifetime, key.kind).get(key),
            None => Err(ArenaError::StaleHandle {
                key,
                current_generation: None,
            }),
        }
    }

    fn slot_mut<T: Element>(&mut self, key: SlotKey) -> Result<&mut Slot<T>, ArenaError> {
        self.typed_mut::<T>()
            .pool_mut(key.lifetime, key.kind)
            .get_mut(key)
    }

    /// The live buffer behind `key`.
    ///
    /// # Panics
    ///
    /// If the key is stale or the buffer does not hold `len` elements.
    pub(crate) fn buffer<T: Element>(&self, key: SlotKey, len: usize) -> &[T] {
        let slot = self.slot::<T>(key).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(slot.buffer.len(), len, "buffer length disagrees with handle shape");
        &slot.buffer
    }

    /// The live buffer behind `key`, mutably.
    ///
    /// # Panics
    ///
    /// As [`ArenaState::buffer`].
    pub(crate) fn buffer_mut<T: Element>(&mut self, key: SlotKey, len: usize) -> &mut [T] {
        let slot = self.slot_mut::<T>(key).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(slot.buffer.len(), len, "buffer length disagrees with handle shape");
        &mut slot.buffer
    }

    /// Base pointer of the live buffer behind `key`.
    ///
    /// Goes through `Vec::as_mut_ptr`, which never materialises a slice
    /// reference, so pointers fetched for several keys stay usable together
    /// even when two keys name the same slot.
    ///
    /// # Panics
    ///
    /// As [`ArenaState::buffer`].
    pub(crate) fn buffer_ptr<T: Element>(&mut self, key: SlotKey, len: usize) -> *mut T {
        let slot = self.slot_mut::<T>(key).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(slot.buffer.len(), len, "buffer length disagrees with handle shape");
        slot.buffer.as_mut_ptr()
    }

    /// Whether `key` resolves to a live slot flagged for its own lifetime.
    pub(crate) fn is_valid<T: Element>(&self, key: SlotKey) -> bool {
        self.slot::<T>(key)
            .is_ok_and(|slot| slot.flags.is_live_for(key.lifetime))
    }

    fn live(&self, lifetime: Lifetime) -> usize {
        self.buckets.values().map(|b| b.live(lifetime)).sum()
    }

    fn clear(&mut self, lifetime: Lifetime) -> usize {
        self.buckets.values_mut().map(|b| b.clear(lifetime)).sum()
    }

    /// Release everything and mark disposed. `None` if already disposed.
    fn dispose(&mut self) -> Option<(usize, usize)> {
        if self.disposed {
            return None;
        }
        let persistent = self.clear(Lifetime::Persistent);
        let temp = self.clear(Lifetime::Temp);
        self.buckets.clear();
        self.expected_persistent = None;
        self.disposed = true;
        Some((persistent, temp))
    }
}

/// Owner of every vector and matrix buffer.
///
/// ```text
/// Arena
/// └── IndexMap<TypeId, TypedBuckets<T>>   (one entry per element type used)
///     ├── temp_vectors / temp_matrices               SlotPool<T>
///     ├── persistent_vectors / persistent_matrices   SlotPool<T>
///     └── recycled buffers (Recycling policy only)
/// ```
///
/// Persistent containers live until [`clear_persistent`](Arena::clear_persistent),
/// [`clear`](Arena::clear) or [`dispose`](Arena::dispose); temporaries (every
/// operator result) until [`clear_temp`](Arena::clear_temp). Handles hold a
/// weak reference back to the arena, so operators allocate their results
/// without the arena being passed in.
///
/// An `Arena` is `!Send` and `!Sync`. Dropping it disposes it.
pub struct Arena {
    id: ArenaId,
    state: Rc<RefCell<ArenaState>>,
}

impl Arena {
    /// Create an arena with the given policy and default limits.
    pub fn new(policy: AllocatorPolicy) -> Self {
        Self::from_valid_config(ArenaConfig::new(policy))
    }

    /// Create an arena from a validated configuration.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: ArenaConfig) -> Self {
        let id = ArenaId::next();
        debug!(arena = %id, policy = ?config.policy, "arena created");
        Self {
            id,
            state: Rc::new(RefCell::new(ArenaState::new(id, config))),
        }
    }

    /// Unique id of this arena.
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// The configuration this arena was created with.
    pub fn config(&self) -> ArenaConfig {
        self.state.borrow().config.clone()
    }

    /// Whether [`dispose`](Arena::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    fn arena_ref(&self) -> ArenaRef {
        ArenaRef::new(self.id, &self.state)
    }

    fn alloc_raw<T: Element>(&self, lifetime: Lifetime, shape: Shape, init: Init<T>) -> RawHandle<T> {
        let key = self.state.borrow_mut().alloc(lifetime, shape, init);
        RawHandle::new(self.arena_ref(), key, shape)
    }

    fn alloc_from<T: Element>(&self, lifetime: Lifetime, shape: Shape, values: &[T]) -> RawHandle<T> {
        let raw = self.alloc_raw(lifetime, shape, Init::Uninit);
        raw.with_slice_mut(|dst| dst.copy_from_slice(values));
        raw
    }

    // ── Lifetime-parameterized entry points ──────────────────────

    /// Allocate a vector of `len` elements with the given lifetime.
    ///
    /// # Panics
    ///
    /// If the arena has been disposed.
    pub fn alloc_vector<T: Element>(&self, lifetime: Lifetime, len: usize, init: Init<T>) -> Vector<T> {
        Vector::from_raw(self.alloc_raw(lifetime, Shape::vector(len), init))
    }

    /// Allocate a `rows × cols` matrix with the given lifetime.
    ///
    /// # Panics
    ///
    /// If the arena has been disposed.
    pub fn alloc_matrix<T: Element>(
        &self,
        lifetime: Lifetime,
        rows: usize,
        cols: usize,
        init: Init<T>,
    ) -> Matrix<T> {
        Matrix::from_raw(self.alloc_raw(lifetime, Shape::matrix(rows, cols), init))
    }

    /// Copy `values` into a new vector with the given lifetime.
    pub fn alloc_vector_from<T: Element>(&self, lifetime: Lifetime, values: &[T]) -> Vector<T> {
        Vector::from_raw(self.alloc_from(lifetime, Shape::vector(values.len()), values))
    }

    /// Copy row-major `values` into a new `rows × cols` matrix with the
    /// given lifetime.
    pub fn alloc_matrix_from<T: Element>(
        &self,
        lifetime: Lifetime,
        rows: usize,
        cols: usize,
        values: &[T],
    ) -> Result<Matrix<T>, LinalgError> {
        let shape = Shape::matrix(rows, cols);
        if values.len() != shape.len() {
            return Err(LinalgError::DimensionMismatch {
                op: "Arena::mat_from",
                dimension: "element count",
                expected: shape.len(),
                actual: values.len(),
            });
        }
        Ok(Matrix::from_raw(self.alloc_from(lifetime, shape, values)))
    }

    // ── Persistent factories ─────────────────────────────────────

    /// Persistent vector of `len` elements.
    pub fn vec<T: Element>(&self, len: usize, init: Init<T>) -> Vector<T> {
        self.alloc_vector(Lifetime::Persistent, len, init)
    }

    /// Persistent copy of `values` (fixed-size inputs are passed as arrays).
    pub fn vec_from<T: Element>(&self, values: &[T]) -> Vector<T> {
        self.alloc_vector_from(Lifetime::Persistent, values)
    }

    /// Persistent deep copy of `src`.
    pub fn vec_copy<T: Element>(&self, src: &Vector<T>) -> Vector<T> {
        self.vec_from(&src.to_vec())
    }

    /// Persistent `rows × cols` matrix.
    pub fn mat<T: Element>(&self, rows: usize, cols: usize, init: Init<T>) -> Matrix<T> {
        self.alloc_matrix(Lifetime::Persistent, rows, cols, init)
    }

    /// Persistent matrix from a fixed-size array of rows.
    pub fn mat_from_rows<T: Element, const R: usize, const C: usize>(
        &self,
        rows: &[[T; C]; R],
    ) -> Matrix<T> {
        Matrix::from_raw(self.alloc_from(
            Lifetime::Persistent,
            Shape::matrix(R, C),
            rows.as_flattened(),
        ))
    }

    /// Persistent matrix from row-major `values`; the length must be
    /// `rows * cols`.
    pub fn mat_from<T: Element>(
        &self,
        rows: usize,
        cols: usize,
        values: &[T],
    ) -> Result<Matrix<T>, LinalgError> {
        self.alloc_matrix_from(Lifetime::Persistent, rows, cols, values)
    }

    /// Persistent deep copy of `src`.
    pub fn mat_copy<T: Element>(&self, src: &Matrix<T>) -> Matrix<T> {
        Matrix::from_raw(self.alloc_from(Lifetime::Persistent, src.shape(), &src.to_vec()))
    }

    // ── Temporary factories ──────────────────────────────────────

    /// Temporary vector of `len` elements.
    pub fn temp_vec<T: Element>(&self, len: usize, init: Init<T>) -> Vector<T> {
        self.alloc_vector(Lifetime::Temp, len, init)
    }

    /// Temporary copy of `values`.
    pub fn temp_vec_from<T: Element>(&self, values: &[T]) -> Vector<T> {
        self.alloc_vector_from(Lifetime::Temp, values)
    }

    /// Temporary deep copy of `src`.
    pub fn temp_vec_copy<T: Element>(&self, src: &Vector<T>) -> Vector<T> {
        self.temp_vec_from(&src.to_vec())
    }

    /// Temporary `rows × cols` matrix.
    pub fn temp_mat<T: Element>(&self, rows: usize, cols: usize, init: Init<T>) -> Matrix<T> {
        self.alloc_matrix(Lifetime::Temp, rows, cols, init)
    }

    /// Temporary matrix from a fixed-size array of rows.
    pub fn temp_mat_from_rows<T: Element, const R: usize, const C: usize>(
        &self,
        rows: &[[T; C]; R],
    ) -> Matrix<T> {
        Matrix::from_raw(self.alloc_from(Lifetime::Temp, Shape::matrix(R, C), rows.as_flattened()))
    }

    /// Temporary matrix from row-major `values`.
    pub fn temp_mat_from<T: Element>(
        &self,
        rows: usize,
        cols: usize,
        values: &[T],
    ) -> Result<Matrix<T>, LinalgError> {
        self.alloc_matrix_from(Lifetime::Temp, rows, cols, values)
    }

    /// Temporary deep copy of `src`.
    pub fn temp_mat_copy<T: Element>(&self, src: &Matrix<T>) -> Matrix<T> {
        Matrix::from_raw(self.alloc_from(Lifetime::Temp, src.shape(), &src.to_vec()))
    }

    // ── Lifecycle ────────────────────────────────────────────────

    fn clear_lifetime(&self, lifetime: Lifetime) -> usize {
        let mut state = self.state.borrow_mut();
        state.ensure_live();
        state.clear(lifetime)
    }

    /// Release every temporary allocation of every element type.
    ///
    /// Handles to released slots go stale. Idempotent.
    pub fn clear_temp(&self) {
        let released = self.clear_lifetime(Lifetime::Temp);
        debug!(arena = %self.id, released, "cleared temporary allocations");
    }

    /// Release every persistent allocation of every element type.
    pub fn clear_persistent(&self) {
        let released = self.clear_lifetime(Lifetime::Persistent);
        debug!(arena = %self.id, released, "cleared persistent allocations");
    }

    /// Release everything; the arena stays usable.
    pub fn clear(&self) {
        let persistent = self.clear_lifetime(Lifetime::Persistent);
        let temp = self.clear_lifetime(Lifetime::Temp);
        debug!(arena = %self.id, persistent, temp, "cleared all allocations");
    }

    /// Release everything and drop all bucket storage. Any later use of
    /// the arena or its handles panics. Idempotent.
    pub fn dispose(&self) {
        if let Some((persistent, temp)) = self.state.borrow_mut().dispose() {
            debug!(arena = %self.id, persistent, temp, "arena disposed");
        }
    }

    // ── Counters ─────────────────────────────────────────────────

    /// Live persistent allocations across all element types.
    pub fn allocations_count(&self) -> usize {
        self.state.borrow().live(Lifetime::Persistent)
    }

    /// Live temporary allocations across all element types.
    pub fn temp_allocations_count(&self) -> usize {
        self.state.borrow().live(Lifetime::Temp)
    }

    /// Live allocations of either lifetime.
    pub fn all_allocations_count(&self) -> usize {
        let state = self.state.borrow();
        state.live(Lifetime::Persistent) + state.live(Lifetime::Temp)
    }

    /// Buffers held for reuse across all element types.
    pub fn recycled_buffer_count(&self) -> usize {
        self.state.borrow().buckets.values().map(|b| b.recycled()).sum()
    }

    /// Names of the element types this arena has allocated, in first-use
    /// order.
    pub fn element_types(&self) -> Vec<&'static str> {
        self.state
            .borrow()
            .buckets
            .values()
            .map(|b| b.element_name())
            .collect()
    }

    // ── Leak detection ───────────────────────────────────────────

    /// Record the current persistent count as the expected watermark.
    pub fn set_expected_persistent_allocation_count(&self) {
        let mut state = self.state.borrow_mut();
        state.ensure_live();
        let count = state.live(Lifetime::Persistent);
        state.expected_persistent = Some(count);
    }

    /// Compare the persistent count with the recorded watermark (zero if
    /// none was recorded).
    pub fn check_persistent_allocation_count(&self) -> Result<(), ArenaError> {
        let state = self.state.borrow();
        state.ensure_live();
        let expected = state.expected_persistent.unwrap_or(0);
        let actual = state.live(Lifetime::Persistent);
        if expected != actual {
            warn!(arena = %self.id, expected, actual, "persistent allocation count mismatch");
            return Err(ArenaError::PersistentCountMismatch { expected, actual });
        }
        Ok(())
    }

    // ── Integrity ────────────────────────────────────────────────

    /// Audit every slot table and return the violations found.
    pub fn integrity_report(&self) -> IntegrityReport {
        let state = self.state.borrow();
        state.ensure_live();
        let mut report = IntegrityReport::default();
        for buckets in state.buckets.values() {
            buckets.audit(&mut report);
        }
        report
    }

    /// Audit the arena, logging each violation at `error`. Returns `true`
    /// when clean, and always `true` when integrity checks are compiled out.
    pub fn check_integrity(&self) -> bool {
        if !INTEGRITY_CHECKS {
            return true;
        }
        let report = self.integrity_report();
        for violation in report.violations() {
            error!(arena = %self.id, %violation, "arena integrity violation");
        }
        report.is_clean()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(AllocatorPolicy::default())
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            if let Some((persistent, temp)) = state.dispose() {
                debug!(arena = %self.id, persistent, temp, "arena disposed on drop");
            }
        }
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Arena")
            .field("id", &self.id)
            .field("policy", &state.config.policy)
            .field("disposed", &state.disposed)
            .field("persistent", &state.live(Lifetime::Persistent))
            .field("temp", &state.live(Lifetime::Temp))
            .finish()
    }
}
