//! Per-element-type storage.
//!
//! Each element type an arena has seen gets one [`TypedBuckets`]: four slot
//! pools (temp/persistent × vector/matrix) plus, under the recycling policy,
//! a list of released buffers reused by exact length. The arena stores them
//! type-erased behind [`ErasedBuckets`] and materialises a type's buckets on
//! its first allocation.

use std::any::Any;

use indexmap::IndexSet;
use tessera_core::{Element, Lifetime, ShapeKind};

use crate::config::ArenaConfig;
use crate::handle::SlotKey;
use crate::init::Init;
use crate::integrity::{audit_pool, IntegrityReport};
use crate::pool::SlotPool;

/// The four pools and recycle list of one element type.
pub(crate) struct TypedBuckets<T> {
    pub(crate) temp_vectors: SlotPool<T>,
    pub(crate) temp_matrices: SlotPool<T>,
    pub(crate) persistent_vectors: SlotPool<T>,
    pub(crate) persistent_matrices: SlotPool<T>,
    recycled: Vec<Vec<T>>,
    recycle: bool,
    max_recycled: usize,
}

impl<T: Element> TypedBuckets<T> {
    pub(crate) fn new(config: &ArenaConfig) -> Self {
        let cap = config.initial_slot_capacity;
        Self {
            temp_vectors: SlotPool::new(Lifetime::Temp, ShapeKind::Vector, cap),
            temp_matrices: SlotPool::new(Lifetime::Temp, ShapeKind::Matrix, cap),
            persistent_vectors: SlotPool::new(Lifetime::Persistent, ShapeKind::Vector, cap),
            persistent_matrices: SlotPool::new(Lifetime::Persistent, ShapeKind::Matrix, cap),
            recycled: Vec::new(),
            recycle: config.recycles(),
            max_recycled: config.max_recycled_buffers,
        }
    }

    pub(crate) fn pool(&self, lifetime: Lifetime, kind: ShapeKind) -> &SlotPool<T> {
        match (lifetime, kind) {
            (Lifetime::Temp, ShapeKind::Vector) => &self.temp_vectors,
            (Lifetime::Temp, ShapeKind::Matrix) => &self.temp_matrices,
            (Lifetime::Persistent, ShapeKind::Vector) => &self.persistent_vectors,
            (Lifetime::Persistent, ShapeKind::Matrix) => &self.persistent_matrices,
        }
    }

    pub(crate) fn pool_mut(&mut self, lifetime: Lifetime, kind: ShapeKind) -> &mut SlotPool<T> {
        match (lifetime, kind) {
            (Lifetime::Temp, ShapeKind::Vector) => &mut self.temp_vectors,
            (Lifetime::Temp, ShapeKind::Matrix) => &mut self.temp_matrices,
            (Lifetime::Persistent, ShapeKind::Vector) => &mut self.persistent_vectors,
            (Lifetime::Persistent, ShapeKind::Matrix) => &mut self.persistent_matrices,
        }
    }

    /// Allocate a buffer of `len` elements into the (lifetime, kind) pool.
    pub(crate) fn alloc(
        &mut self,
        lifetime: Lifetime,
        kind: ShapeKind,
        len: usize,
        init: Init<T>,
    ) -> SlotKey {
        let buffer = self.acquire(len, init);
        self.pool_mut(lifetime, kind).insert(buffer)
    }

    /// A buffer of exactly `len` elements, recycled when possible.
    fn acquire(&mut self, len: usize, init: Init<T>) -> Vec<T> {
        if self.recycle && len > 0 {
            if let Some(pos) = self.recycled.iter().position(|b| b.len() == len) {
                let mut buffer = self.recycled.swap_remove(pos);
                init.reapply(&mut buffer);
                return buffer;
            }
        }
        init.fresh(len)
    }

    /// Release both pools of `lifetime`. Returns the number of slots freed.
    pub(crate) fn clear(&mut self, lifetime: Lifetime) -> usize {
        let Self {
            temp_vectors,
            temp_matrices,
            persistent_vectors,
            persistent_matrices,
            recycled,
            recycle,
            max_recycled,
        } = self;
        let mut release = |buffer: Vec<T>| {
            if *recycle && !buffer.is_empty() && recycled.len() < *max_recycled {
                recycled.push(buffer);
            }
        };
        match lifetime {
            Lifetime::Temp => temp_vectors.clear(&mut release) + temp_matrices.clear(&mut release),
            Lifetime::Persistent => {
                persistent_vectors.clear(&mut release) + persistent_matrices.clear(&mut release)
            }
        }
    }

    fn live(&self, lifetime: Lifetime) -> usize {
        self.pool(lifetime, ShapeKind::Vector).live() + self.pool(lifetime, ShapeKind::Matrix).live()
    }
}

/// Type-erased view of a [`TypedBuckets`].
pub(crate) trait ErasedBuckets: Any {
    /// Element type name, for diagnostics.
    fn element_name(&self) -> &'static str;
    /// Live slots of `lifetime` across both kinds.
    fn live(&self, lifetime: Lifetime) -> usize;
    /// Release every slot of `lifetime`.
    fn clear(&mut self, lifetime: Lifetime) -> usize;
    /// Buffers currently held for reuse.
    fn recycled(&self) -> usize;
    /// Append structural violations to `report`.
    fn audit(&self, report: &mut IntegrityReport);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Element> ErasedBuckets for TypedBuckets<T> {
    fn element_name(&self) -> &'static str {
        T::NAME
    }

    fn live(&self, lifetime: Lifetime) -> usize {
        TypedBuckets::live(self, lifetime)
    }

    fn clear(&mut self, lifetime: Lifetime) -> usize {
        TypedBuckets::clear(self, lifetime)
    }

    fn recycled(&self) -> usize {
        self.recycled.len()
    }

    fn audit(&self, report: &mut IntegrityReport) {
        for kind in [ShapeKind::Vector, ShapeKind::Matrix] {
            let mut seen = IndexSet::new();
            for lifetime in [Lifetime::Temp, Lifetime::Persistent] {
                audit_pool(T::NAME, self.pool(lifetime, kind), &mut seen, report);
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AllocatorPolicy;

    fn buckets(policy: AllocatorPolicy) -> TypedBuckets<i32> {
        TypedBuckets::new(&ArenaConfig::new(policy))
    }

    #[test]
    fn heap_policy_drops_released_buffers() {
        let mut b = buckets(AllocatorPolicy::Heap);
        b.alloc(Lifetime::Temp, ShapeKind::Vector, 4, Init::Zeroed);
        assert_eq!(b.clear(Lifetime::Temp), 1);
        assert_eq!(ErasedBuckets::recycled(&b), 0);
    }

    #[test]
    fn recycling_reuses_exact_length_only() {
        let mut b = buckets(AllocatorPolicy::Recycling);
        let key = b.alloc(Lifetime::Temp, ShapeKind::Vector, 4, Init::Fill(5));
        let ptr = b.temp_vectors.get(key).unwrap().buffer.as_ptr();
        b.clear(Lifetime::Temp);
        assert_eq!(ErasedBuckets::recycled(&b), 1);

        let other = b.alloc(Lifetime::Temp, ShapeKind::Vector, 3, Init::Uninit);
        assert_ne!(b.temp_vectors.get(other).unwrap().buffer.as_ptr(), ptr);
        assert_eq!(ErasedBuckets::recycled(&b), 1);

        let same = b.alloc(Lifetime::Persistent, ShapeKind::Vector, 4, Init::Uninit);
        let slot = b.persistent_vectors.get(same).unwrap();
        assert_eq!(slot.buffer.as_ptr(), ptr);
        assert_eq!(slot.buffer, [5, 5, 5, 5]);
        assert_eq!(ErasedBuckets::recycled(&b), 0);
    }

    #[test]
    fn recycled_buffer_is_reinitialised_on_request() {
        let mut b = buckets(AllocatorPolicy::Recycling);
        b.alloc(Lifetime::Temp, ShapeKind::Matrix, 2, Init::Fill(9));
        b.clear(Lifetime::Temp);
        let key = b.alloc(Lifetime::Temp, ShapeKind::Matrix, 2, Init::Zeroed);
        assert_eq!(b.temp_matrices.get(key).unwrap().buffer, [0, 0]);
    }

    #[test]
    fn recycle_list_is_bounded() {
        let mut config = ArenaConfig::new(AllocatorPolicy::Recycling);
        config.max_recycled_buffers = 2;
        let mut b = TypedBuckets::<f64>::new(&config);
        for _ in 0..5 {
            b.alloc(Lifetime::Temp, ShapeKind::Vector, 8, Init::Zeroed);
        }
        assert_eq!(b.clear(Lifetime::Temp), 5);
        assert_eq!(ErasedBuckets::recycled(&b), 2);
    }

    #[test]
    fn clear_touches_only_one_lifetime() {
        let mut b = buckets(AllocatorPolicy::Heap);
        b.alloc(Lifetime::Temp, ShapeKind::Vector, 1, Init::Zeroed);
        b.alloc(Lifetime::Temp, ShapeKind::Matrix, 1, Init::Zeroed);
        b.alloc(Lifetime::Persistent, ShapeKind::Vector, 1, Init::Zeroed);
        assert_eq!(b.clear(Lifetime::Temp), 2);
        assert_eq!(ErasedBuckets::live(&b, Lifetime::Temp), 0);
        assert_eq!(ErasedBuckets::live(&b, Lifetime::Persistent), 1);
    }

    #[test]
    fn audit_of_fresh_buckets_is_clean() {
        let mut b = buckets(AllocatorPolicy::Recycling);
        b.alloc(Lifetime::Temp, ShapeKind::Vector, 3, Init::Zeroed);
        b.alloc(Lifetime::Persistent, ShapeKind::Vector, 3, Init::Zeroed);
        b.clear(Lifetime::Temp);
        b.alloc(Lifetime::Temp, ShapeKind::Vector, 3, Init::Zeroed);
        let mut report = IntegrityReport::default();
        b.audit(&mut report);
        assert!(report.is_clean(), "{:?}", report.violations());
        assert_eq!(report.slots_checked(), 2);
    }
}
