//! Generation-checked slot pools.
//!
//! A [`SlotPool`] owns the buffers of one (lifetime, kind) bucket. Slots are
//! never removed from the table: releasing a slot drops (or hands back) its
//! buffer, marks it [`SlotFlags::DISPOSED`], bumps its generation and puts
//! its index on the free list, so outstanding keys go stale in O(1) and
//! indices are reused without growing the table.

use std::fmt;

use tessera_core::{Lifetime, ShapeKind};

use crate::error::ArenaError;
use crate::handle::SlotKey;

/// Lifecycle flag bits stored on every slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotFlags(u8);

impl SlotFlags {
    /// Allocated in a persistent pool.
    pub const PERSISTENT: u8 = 1;
    /// Allocated in a temporary pool.
    pub const TEMP: u8 = 2;
    /// Released; the slot holds no buffer.
    pub const DISPOSED: u8 = 4;

    pub(crate) fn live(lifetime: Lifetime) -> Self {
        match lifetime {
            Lifetime::Persistent => Self(Self::PERSISTENT),
            Lifetime::Temp => Self(Self::TEMP),
        }
    }

    /// Raw flag bits.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// `PERSISTENT` is set.
    pub fn is_persistent(self) -> bool {
        self.0 & Self::PERSISTENT != 0
    }

    /// `TEMP` is set.
    pub fn is_temp(self) -> bool {
        self.0 & Self::TEMP != 0
    }

    /// `DISPOSED` is set.
    pub fn is_disposed(self) -> bool {
        self.0 & Self::DISPOSED != 0
    }

    /// Exactly the live flag for `lifetime`, nothing else.
    pub fn is_live_for(self, lifetime: Lifetime) -> bool {
        self == Self::live(lifetime)
    }

    pub(crate) fn disposed(self) -> Self {
        Self(self.0 | Self::DISPOSED)
    }
}

impl fmt::Debug for SlotFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.is_persistent() {
            names.push("PERSISTENT");
        }
        if self.is_temp() {
            names.push("TEMP");
        }
        if self.is_disposed() {
            names.push("DISPOSED");
        }
        if names.is_empty() {
            write!(f, "SlotFlags(empty)")
        } else {
            write!(f, "SlotFlags({})", names.join(" | "))
        }
    }
}

/// A single allocation slot.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    pub(crate) generation: u32,
    pub(crate) flags: SlotFlags,
    pub(crate) buffer: Vec<T>,
}

/// Slot table for one (lifetime, kind) bucket of one element type.
pub(crate) struct SlotPool<T> {
    lifetime: Lifetime,
    kind: ShapeKind,
    pub(crate) slots: Vec<Slot<T>>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) live: usize,
}

impl<T> SlotPool<T> {
    pub(crate) fn new(lifetime: Lifetime, kind: ShapeKind, capacity: usize) -> Self {
        Self {
            lifetime,
            kind,
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub(crate) fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Number of live slots.
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Store `buffer` in a free slot (or a new one) and return its key.
    pub(crate) fn insert(&mut self, buffer: Vec<T>) -> SlotKey {
        let flags = SlotFlags::live(self.lifetime);
        let (index, generation) = if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.flags = flags;
            slot.buffer = buffer;
            (index, slot.generation)
        } else {
            let index = u32::try_from(self.slots.len())
                .unwrap_or_else(|_| panic!("{} {} pool exhausted", self.lifetime, self.kind));
            self.slots.push(Slot {
                generation: 0,
                flags,
                buffer,
            });
            (index, 0)
        };
        self.live += 1;
        SlotKey {
            lifetime: self.lifetime,
            kind: self.kind,
            index,
            generation,
        }
    }

    /// Resolve a key to its live slot.
    pub(crate) fn get(&self, key: SlotKey) -> Result<&Slot<T>, ArenaError> {
        let slot = self.slots.get(key.index as usize);
        match slot {
            Some(slot) if slot.generation == key.generation && !slot.flags.is_disposed() => {
                Ok(slot)
            }
            _ => Err(ArenaError::StaleHandle {
                key,
                current_generation: slot.map(|s| s.generation),
            }),
        }
    }

    /// Resolve a key to its live slot, mutably.
    pub(crate) fn get_mut(&mut self, key: SlotKey) -> Result<&mut Slot<T>, ArenaError> {
        let slot = self.slots.get_mut(key.index as usize);
        match slot {
            Some(slot) if slot.generation == key.generation && !slot.flags.is_disposed() => {
                Ok(slot)
            }
            Some(slot) => Err(ArenaError::StaleHandle {
                key,
                current_generation: Some(slot.generation),
            }),
            None => Err(ArenaError::StaleHandle {
                key,
                current_generation: None,
            }),
        }
    }

    /// Release every live slot, handing each buffer to `release`.
    ///
    /// Each release bumps the slot's generation. A slot released at
    /// generation `u32::MAX` is retired instead of being reused.
    ///
    /// Returns the number of slots released. Already-released slots are
    /// skipped, so calling this twice is a no-op the second time.
    pub(crate) fn clear(&mut self, mut release: impl FnMut(Vec<T>)) -> usize {
        let mut released = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.flags.is_disposed() {
                continue;
            }
            release(std::mem::take(&mut slot.buffer));
            slot.flags = slot.flags.disposed();
            released += 1;
            // A slot whose generation is exhausted is retired: it stays
            // disposed and off the free list, so no key can match it again.
            if let Some(generation) = slot.generation.checked_add(1) {
                slot.generation = generation;
                // Table length is bounded by u32 in `insert`.
                self.free_list.push(index as u32);
            }
        }
        self.live -= released;
        released
    }

    /// Iterate `(index, slot)` over every slot, live or released.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (u32, &Slot<T>)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (index as u32, slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> SlotPool<f32> {
        SlotPool::new(Lifetime::Temp, ShapeKind::Vector, 4)
    }

    #[test]
    fn insert_then_get() {
        let mut p = pool();
        let key = p.insert(vec![1.0, 2.0]);
        assert_eq!(key.index, 0);
        assert_eq!(key.generation, 0);
        assert_eq!(p.live(), 1);
        let slot = p.get(key).unwrap();
        assert_eq!(slot.buffer, [1.0, 2.0]);
        assert!(slot.flags.is_live_for(Lifetime::Temp));
    }

    #[test]
    fn clear_makes_keys_stale() {
        let mut p = pool();
        let a = p.insert(vec![0.0; 3]);
        let b = p.insert(vec![0.0; 5]);
        let mut lens = Vec::new();
        assert_eq!(p.clear(|buf| lens.push(buf.len())), 2);
        assert_eq!(lens, [3, 5]);
        assert_eq!(p.live(), 0);
        assert!(matches!(
            p.get(a),
            Err(ArenaError::StaleHandle {
                current_generation: Some(1),
                ..
            })
        ));
        assert!(p.get(b).is_err());
    }

    #[test]
    fn exhausted_generation_retires_slot() {
        let mut p = pool();
        p.insert(vec![0.0; 2]);
        p.slots[0].generation = u32::MAX - 1;
        p.clear(drop);
        let last = p.insert(vec![1.0; 2]);
        assert_eq!((last.index, last.generation), (0, u32::MAX));

        assert_eq!(p.clear(drop), 1);
        assert!(p.free_list.is_empty());
        assert!(p.slots[0].flags.is_disposed());
        assert!(matches!(
            p.get(last),
            Err(ArenaError::StaleHandle {
                current_generation: Some(u32::MAX),
                ..
            })
        ));

        let fresh = p.insert(vec![2.0; 2]);
        assert_eq!((fresh.index, fresh.generation), (1, 0));
        assert_eq!(p.live(), 1);
        assert!(p.get(last).is_err());
    }

    #[test]
    fn clear_twice_is_noop() {
        let mut p = pool();
        p.insert(vec![0.0; 2]);
        assert_eq!(p.clear(drop), 1);
        assert_eq!(p.clear(drop), 0);
        assert_eq!(p.free_list.len(), 1);
    }

    #[test]
    fn freed_slots_are_reused_with_new_generation() {
        let mut p = pool();
        let old = p.insert(vec![0.0; 2]);
        p.clear(drop);
        let new = p.insert(vec![9.0; 2]);
        assert_eq!(new.index, old.index);
        assert_eq!(new.generation, old.generation + 1);
        assert_eq!(p.slots.len(), 1);
        assert!(p.get(old).is_err());
        assert_eq!(p.get(new).unwrap().buffer, [9.0, 9.0]);
    }

    #[test]
    fn unknown_index_is_stale() {
        let p = pool();
        let key = SlotKey {
            lifetime: Lifetime::Temp,
            kind: ShapeKind::Vector,
            index: 10,
            generation: 0,
        };
        assert!(matches!(
            p.get(key),
            Err(ArenaError::StaleHandle {
                current_generation: None,
                ..
            })
        ));
    }

    #[test]
    fn flags_debug_lists_bits() {
        let flags = SlotFlags::live(Lifetime::Persistent).disposed();
        assert_eq!(format!("{flags:?}"), "SlotFlags(PERSISTENT | DISPOSED)");
        assert!(!flags.is_live_for(Lifetime::Persistent));
    }
}
