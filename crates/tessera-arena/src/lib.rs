//! Lifetime-tagged vector/matrix arena and the generic operator layer.
//!
//! Every [`Vector`] and [`Matrix`] lives in an [`Arena`], which sorts
//! allocations into persistent and temporary pools per element type.
//! Operators return their results as temporaries in the operands' arena, so
//! a computation loop allocates freely and reclaims its intermediates in
//! bulk with [`Arena::clear_temp`].
//!
//! # Architecture
//!
//! ```text
//! Arena ── Rc<RefCell<ArenaState>> ◄── Weak ── Vector<T> / Matrix<T>
//!            └── IndexMap<TypeId, Box<dyn ErasedBuckets>>
//!                  └── TypedBuckets<T>
//!                        ├── SlotPool<T> × 4  (temp/persistent × vector/matrix)
//!                        └── recycled Vec<T>s (Recycling policy)
//! ```
//!
//! Handles are generation-checked slot keys, so a handle whose buffer was
//! released by a clear panics on use instead of reading a recycled buffer.
//!
//! # Safety
//!
//! The numeric kernels in `tessera-kernel` work on raw pointers. This crate
//! denies `unsafe` everywhere except the private `raw` module, whose safe
//! wrappers resolve handles to pointers and assert every length and
//! aliasing precondition before dispatching.
//!
//! # Example
//!
//! ```
//! use tessera_arena::{AllocatorPolicy, Arena, Container, Init};
//!
//! let arena = Arena::new(AllocatorPolicy::Heap);
//! let a = arena.vec(4, Init::Fill(10.0f32));
//! let b = arena.vec(4, Init::Fill(1.0f32));
//!
//! let c = &a + &b;
//! assert_eq!(c.to_vec(), [11.0; 4]);
//! assert!(c.is_temp());
//! assert_eq!(arena.temp_allocations_count(), 1);
//!
//! arena.clear_temp();
//! assert_eq!(arena.temp_allocations_count(), 0);
//! assert_eq!(arena.allocations_count(), 2);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
mod bucket;
pub mod config;
pub mod container;
pub mod error;
pub mod handle;
pub mod init;
pub mod integrity;
pub mod matrix;
pub mod ops;
pub mod pool;
mod raw;
pub mod vector;

pub use arena::Arena;
pub use config::{AllocatorPolicy, ArenaConfig};
pub use container::Container;
pub use error::ArenaError;
pub use handle::{BufferId, RawHandle, SlotKey};
pub use init::Init;
pub use integrity::{IntegrityReport, Violation, INTEGRITY_CHECKS};
pub use matrix::Matrix;
pub use ops::{BitwiseOps, Elementwise, MaskOps};
pub use pool::SlotFlags;
pub use vector::Vector;
