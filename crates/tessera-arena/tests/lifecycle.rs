//! Integration test: arena lifecycle.
//!
//! Covers clear/dispose idempotence, stale-handle detection after a clear,
//! use-after-dispose panics, scope-based disposal, the persistent watermark
//! and buffer recycling.

use tessera_arena::{
    AllocatorPolicy, Arena, ArenaConfig, ArenaError, Container, Elementwise, Init, INTEGRITY_CHECKS,
};
use tessera_core::Lifetime;

fn populated(policy: AllocatorPolicy) -> Arena {
    let arena = Arena::new(policy);
    let _ = arena.vec(8, Init::Fill(1.0f32));
    let _ = arena.mat(2, 2, Init::Fill(1i32));
    let _ = arena.temp_vec(4, Init::Fill(true));
    let _ = arena.temp_mat(3, 3, Init::Fill(2.0f64));
    arena
}

#[test]
fn clear_temp_is_idempotent() {
    let arena = populated(AllocatorPolicy::Heap);
    assert_eq!(arena.allocations_count(), 2);
    assert_eq!(arena.temp_allocations_count(), 2);

    arena.clear_temp();
    arena.clear_temp();
    assert_eq!(arena.temp_allocations_count(), 0);
    assert_eq!(arena.allocations_count(), 2);
}

#[test]
fn clear_releases_both_lifetimes_and_keeps_the_arena_usable() {
    let arena = populated(AllocatorPolicy::Heap);
    arena.clear();
    arena.clear();
    assert_eq!(arena.all_allocations_count(), 0);
    assert!(!arena.is_disposed());

    let v = arena.vec(3, Init::Fill(5i64));
    assert_eq!(v.to_vec(), [5, 5, 5]);
    assert_eq!(arena.allocations_count(), 1);
}

#[test]
fn clear_persistent_leaves_temporaries() {
    let arena = populated(AllocatorPolicy::Heap);
    arena.clear_persistent();
    assert_eq!(arena.allocations_count(), 0);
    assert_eq!(arena.temp_allocations_count(), 2);
}

#[test]
fn dispose_is_idempotent_and_counts_read_zero() {
    let arena = populated(AllocatorPolicy::Recycling);
    arena.dispose();
    arena.dispose();
    assert!(arena.is_disposed());
    assert_eq!(arena.allocations_count(), 0);
    assert_eq!(arena.temp_allocations_count(), 0);
    assert_eq!(arena.all_allocations_count(), 0);
}

#[test]
#[should_panic(expected = "used after dispose")]
fn allocation_after_dispose_panics() {
    let arena = Arena::default();
    arena.dispose();
    let _ = arena.vec(1, Init::Fill(0.0f32));
}

#[test]
#[should_panic(expected = "used after dispose")]
fn clear_after_dispose_panics() {
    let arena = Arena::default();
    arena.dispose();
    arena.clear_temp();
}

#[test]
#[should_panic(expected = "used after dispose")]
fn handle_access_after_dispose_panics() {
    let arena = Arena::default();
    let v = arena.vec(2, Init::Fill(1i16));
    arena.dispose();
    let _ = v.get(0);
}

#[test]
#[should_panic(expected = "used after dispose")]
fn handle_outliving_its_arena_panics() {
    let v = {
        let arena = Arena::default();
        arena.vec(2, Init::Fill(1.0f64))
    };
    let _ = v.to_vec();
}

#[test]
#[should_panic(expected = "stale handle")]
fn temporary_handle_is_stale_after_clear_temp() {
    let arena = Arena::default();
    let a = arena.vec(4, Init::Fill(1.0f32));
    let t = &a * 2.0;
    arena.clear_temp();
    let _ = t.get(0);
}

#[test]
fn stale_temporary_does_not_see_its_slot_reused() {
    let arena = Arena::default();
    let first = arena.temp_vec(2, Init::Fill(1i32));
    arena.clear_temp();
    let second = arena.temp_vec(2, Init::Fill(7i32));

    // Same slot index, newer generation.
    assert_eq!(first.key().index(), second.key().index());
    assert!(second.key().generation() > first.key().generation());
    if INTEGRITY_CHECKS {
        assert!(!first.check_valid());
        assert!(second.check_valid());
    }
    assert_eq!(second.to_vec(), [7, 7]);
}

#[test]
fn check_valid_is_false_once_the_arena_is_gone() {
    if !INTEGRITY_CHECKS {
        return;
    }
    let v = {
        let arena = Arena::default();
        let v = arena.vec(2, Init::Fill(0.5f32));
        assert!(v.check_valid());
        v
    };
    assert!(!v.check_valid());
}

#[test]
fn copies_are_independent_and_aliases_are_shared() {
    let arena = Arena::default();
    let a = arena.vec_from(&[1i32, 2, 3]);
    let alias = a.clone();
    let copy = arena.vec_copy(&a);
    let temp_copy = arena.temp_vec_copy(&a);

    a.mul_inpl(10);
    assert_eq!(alias.to_vec(), [10, 20, 30]);
    assert_eq!(copy.to_vec(), [1, 2, 3]);
    assert_eq!(temp_copy.to_vec(), [1, 2, 3]);
    assert_eq!(alias.buffer_id(), a.buffer_id());
    assert_ne!(copy.buffer_id(), a.buffer_id());
    assert!(copy.is_persistent());
    assert!(temp_copy.is_temp());
}

#[test]
fn lifetime_parameterized_allocation() {
    let arena = Arena::default();
    let p = arena.alloc_vector(Lifetime::Persistent, 3, Init::Fill(1i16));
    let t = arena.alloc_matrix(Lifetime::Temp, 2, 3, Init::<f32>::Zeroed);
    assert_eq!(p.lifetime(), Lifetime::Persistent);
    assert_eq!(t.lifetime(), Lifetime::Temp);
    assert_eq!((t.rows(), t.cols()), (2, 3));
    assert_eq!(arena.allocations_count(), 1);
    assert_eq!(arena.temp_allocations_count(), 1);
}

// ── Watermark ───────────────────────────────────────────────────

#[test]
fn watermark_detects_persistent_leaks() {
    let arena = Arena::default();
    let _ = arena.vec(4, Init::Fill(0i32));
    arena.set_expected_persistent_allocation_count();

    // Temporaries never count against the watermark.
    let _ = arena.temp_vec(4, Init::Fill(0i32));
    assert_eq!(arena.check_persistent_allocation_count(), Ok(()));

    let _ = arena.mat(2, 2, Init::Fill(0.0f64));
    assert_eq!(
        arena.check_persistent_allocation_count(),
        Err(ArenaError::PersistentCountMismatch {
            expected: 1,
            actual: 2,
        })
    );
}

#[test]
fn unset_watermark_expects_zero() {
    let arena = Arena::default();
    assert!(arena.check_persistent_allocation_count().is_ok());
    let _ = arena.vec(1, Init::Fill(0i64));
    assert!(arena.check_persistent_allocation_count().is_err());
}

// ── Recycling ───────────────────────────────────────────────────

#[test]
fn recycling_reuses_exact_length_buffers() {
    let arena = Arena::new(AllocatorPolicy::Recycling);
    let a = arena.temp_vec(16, Init::Fill(3.0f32));
    let before = a.buffer_id();
    arena.clear_temp();
    assert_eq!(arena.recycled_buffer_count(), 1);

    // Different length: fresh buffer.
    let b = arena.temp_vec(8, Init::Fill(0.0f32));
    assert_eq!(arena.recycled_buffer_count(), 1);

    // Same length: reused, and `Uninit` keeps the stale contents.
    let c = arena.temp_vec::<f32>(16, Init::Uninit);
    assert_eq!(c.buffer_id(), before);
    assert_eq!(c.to_vec(), vec![3.0; 16]);
    assert_eq!(arena.recycled_buffer_count(), 0);
    assert_ne!(b.buffer_id(), before);
}

#[test]
fn recycled_buffers_are_reinitialised_when_asked() {
    let arena = Arena::new(AllocatorPolicy::Recycling);
    let _ = arena.temp_vec(4, Init::Fill(9i32));
    arena.clear_temp();
    let zeroed = arena.temp_vec(4, Init::<i32>::Zeroed);
    assert_eq!(zeroed.to_vec(), [0; 4]);
}

#[test]
fn recycle_pool_is_bounded() {
    let config = ArenaConfig {
        max_recycled_buffers: 2,
        ..ArenaConfig::new(AllocatorPolicy::Recycling)
    };
    let arena = Arena::with_config(config).unwrap();
    for _ in 0..5 {
        let _ = arena.temp_vec(4, Init::Fill(1.0f64));
    }
    arena.clear_temp();
    assert_eq!(arena.recycled_buffer_count(), 2);
}

#[test]
fn heap_policy_never_recycles() {
    let arena = Arena::new(AllocatorPolicy::Heap);
    let _ = arena.temp_vec(4, Init::Fill(1i32));
    arena.clear_temp();
    assert_eq!(arena.recycled_buffer_count(), 0);
}

#[test]
fn invalid_config_is_rejected() {
    let config = ArenaConfig {
        max_recycled_buffers: 0,
        ..ArenaConfig::new(AllocatorPolicy::Recycling)
    };
    assert!(matches!(
        Arena::with_config(config),
        Err(ArenaError::InvalidConfig { .. })
    ));
}

#[test]
fn element_types_materialize_lazily() {
    let arena = Arena::default();
    assert!(arena.element_types().is_empty());
    let _ = arena.vec(1, Init::Fill(1i16));
    let _ = arena.vec(1, Init::Fill(false));
    let _ = arena.vec(1, Init::Fill(2i16));
    assert_eq!(arena.element_types(), ["i16", "bool"]);
}
