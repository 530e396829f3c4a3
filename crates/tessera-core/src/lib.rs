//! Core types and traits for the Tessera linear-algebra arena.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! element capability traits every container and kernel is generic over,
//! the [`Shape`] of an allocation, arena identity, and the error type
//! returned by the operator layer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod element;
pub mod error;
pub mod id;
pub mod shape;

pub use element::{Bitwise, Element, Float, Integer, Scalar};
pub use error::LinalgError;
pub use id::{ArenaId, Lifetime};
pub use shape::{Shape, ShapeKind};
