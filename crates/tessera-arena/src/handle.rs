//! Slot keys and the untyped handle shared by every container.
//!
//! A [`SlotKey`] names one slot in one pool of one arena. It is
//! generation-scoped: clearing a slot bumps its generation, so a key issued
//! before the clear fails the O(1) staleness check instead of silently
//! reading a recycled buffer.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use tessera_core::{ArenaId, Element, Lifetime, Shape, ShapeKind};

use crate::arena::ArenaState;
use crate::error::ArenaError;

/// Location of an allocation: pool (lifetime × kind), slot index and the
/// slot generation at allocation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub(crate) lifetime: Lifetime,
    pub(crate) kind: ShapeKind,
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl SlotKey {
    /// Lifetime of the pool holding the slot.
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Container kind of the pool holding the slot.
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Slot index within its pool.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation when the allocation was made.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}#{}@{}",
            self.lifetime, self.kind, self.index, self.generation
        )
    }
}

/// Identity of an element buffer: its base address.
///
/// Two live containers alias exactly when their buffer ids are equal (and
/// non-empty). Only meaningful while both containers are live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub(crate) usize);

/// Weak back-reference from a handle to its arena.
///
/// The arena owns the only strong reference, so dropping the arena makes
/// every outstanding handle unusable rather than keeping buffers alive.
#[derive(Clone)]
pub(crate) struct ArenaRef {
    pub(crate) id: ArenaId,
    pub(crate) state: Weak<RefCell<ArenaState>>,
}

impl ArenaRef {
    pub(crate) fn new(id: ArenaId, state: &Rc<RefCell<ArenaState>>) -> Self {
        Self {
            id,
            state: Rc::downgrade(state),
        }
    }

    /// Run `f` against the live arena state.
    ///
    /// # Panics
    ///
    /// If the arena has been disposed or dropped, or if called re-entrantly
    /// from inside another `with_state` closure.
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut ArenaState) -> R) -> R {
        let Some(state) = self.state.upgrade() else {
            panic!("{}", ArenaError::Disposed { arena: self.id });
        };
        let mut state = state.borrow_mut();
        state.ensure_live();
        f(&mut state)
    }

    /// Whether the arena is still alive and not disposed.
    pub(crate) fn is_live(&self) -> bool {
        self.state
            .upgrade()
            .is_some_and(|state| !state.borrow().is_disposed())
    }
}

/// Untyped-storage handle carried by [`Vector`](crate::Vector) and
/// [`Matrix`](crate::Matrix).
///
/// Cloning a handle creates an alias of the same buffer, never a copy.
pub struct RawHandle<T> {
    pub(crate) arena: ArenaRef,
    pub(crate) key: SlotKey,
    pub(crate) shape: Shape,
    _element: PhantomData<fn() -> T>,
}

impl<T: Element> RawHandle<T> {
    pub(crate) fn new(arena: ArenaRef, key: SlotKey, shape: Shape) -> Self {
        debug_assert_eq!(key.kind, shape.kind());
        Self {
            arena,
            key,
            shape,
            _element: PhantomData,
        }
    }

    /// The slot key.
    pub fn key(&self) -> SlotKey {
        self.key
    }

    /// The container shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Id of the owning arena.
    pub fn arena_id(&self) -> ArenaId {
        self.arena.id
    }

    /// A handle to a fresh temporary allocation in the same arena.
    pub(crate) fn alloc_temp<U: Element>(&self, shape: Shape) -> RawHandle<U> {
        let key = self
            .arena
            .with_state(|state| state.alloc::<U>(Lifetime::Temp, shape, crate::Init::Uninit));
        RawHandle::new(self.arena.clone(), key, shape)
    }

    /// Borrow the element buffer.
    pub(crate) fn with_slice<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.arena
            .with_state(|state| f(state.buffer::<T>(self.key, self.shape.len())))
    }

    /// Mutably borrow the element buffer.
    pub(crate) fn with_slice_mut<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> R {
        self.arena
            .with_state(|state| f(state.buffer_mut::<T>(self.key, self.shape.len())))
    }
}

impl<T> Clone for RawHandle<T> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            key: self.key,
            shape: self.shape,
            _element: PhantomData,
        }
    }
}

impl<T: Element> fmt::Debug for RawHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawHandle")
            .field("element", &T::NAME)
            .field("arena", &self.arena.id)
            .field("key", &self.key)
            .field("shape", &self.shape)
            .finish()
    }
}
