//! Tessera: arena-based linear algebra with lifetime-tagged vectors and
//! matrices.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Tessera sub-crates. For most users, adding `tessera` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! let arena = Arena::new(AllocatorPolicy::Recycling);
//!
//! // Persistent state survives `clear_temp`.
//! let a = tessera::build::rotation(&arena, Lifetime::Persistent, 2, 0, 1, 0.5f64).unwrap();
//! let x = arena.vec_from(&[1.0f64, 0.0]);
//!
//! for _ in 0..4 {
//!     // Every operator result is a temporary in `arena`.
//!     let ax = a.dot_vec(&x).unwrap();
//!     let next = &ax * 1.0;
//!     x.copy_inpl(&next).unwrap();
//!     arena.clear_temp();
//! }
//!
//! // Four half-radian rotations.
//! assert!((x.get(0) - 2.0f64.cos()).abs() < 1e-12);
//! assert_eq!(arena.temp_allocations_count(), 0);
//! assert_eq!(arena.allocations_count(), 2);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tessera-core` | element traits, shapes, ids, `LinalgError` |
//! | [`kernel`] | `tessera-kernel` | raw pointer-level kernels |
//! | [`arena`] | `tessera-arena` | `Arena`, `Vector`, `Matrix`, operator traits |
//! | [`build`] | `tessera-build` | identity, rotations, permutations, random fills |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Element traits, shapes, ids and errors (`tessera-core`).
pub use tessera_core as types;

/// Raw numeric kernels (`tessera-kernel`).
///
/// Every function is `unsafe` and works on raw pointers; most users want
/// the operator methods on [`arena::Vector`] and [`arena::Matrix`] instead.
pub use tessera_kernel as kernel;

/// Arena, containers and the operator layer (`tessera-arena`).
pub use tessera_arena as arena;

/// Construction helpers (`tessera-build`).
pub use tessera_build as build;

/// Common imports for typical Tessera usage.
///
/// ```rust
/// use tessera::prelude::*;
/// ```
///
/// Brings in the arena and its containers, the operator traits whose
/// methods every container carries, the element traits needed to write
/// generic code, and the error types.
pub mod prelude {
    // Arena and containers
    pub use tessera_arena::{AllocatorPolicy, Arena, ArenaConfig, Container, Init, Matrix, Vector};

    // Operator traits
    pub use tessera_arena::{BitwiseOps, Elementwise, MaskOps};

    // Core types and traits
    pub use tessera_core::{Bitwise, Element, Float, Integer, Lifetime, Scalar, Shape};

    // Errors
    pub use tessera_arena::ArenaError;
    pub use tessera_core::LinalgError;

    // Construction
    pub use tessera_build::RandomSource;
}
