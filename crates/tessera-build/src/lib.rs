//! Construction helpers for Tessera containers.
//!
//! Every helper takes the target [`Arena`](tessera_arena::Arena) and the
//! [`Lifetime`](tessera_core::Lifetime) the result should be allocated
//! with, validates its arguments, and only then allocates.
//!
//! | Helper | Result |
//! |--------|--------|
//! | [`identity`], [`diagonal`], [`hilbert`] | structured square matrices |
//! | [`linspace`], [`basis`] | structured vectors |
//! | [`rotation`] | Givens plane rotation |
//! | [`permutation`], [`permutation_from`] | permutation matrices |
//! | [`householder`] | Householder reflection |
//! | [`RandomSource`] | seeded uniform and normal fills |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod random;
pub mod structured;
pub mod transform;

pub use random::RandomSource;
pub use structured::{basis, diagonal, hilbert, identity, linspace};
pub use transform::{householder, permutation, permutation_from, rotation};
