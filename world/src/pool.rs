//! Fixed-capacity slot storage for pooled entities.
//!
//! Slots are allocated once at construction and recycled afterwards, so
//! steady-state play never allocates. Entities refer to each other through
//! [`Handle`] values that carry the slot generation; a handle stops resolving
//! as soon as its slot is released or re-acquired.

use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// Generation-checked reference to a pooled item.
pub struct Handle<T> {
    index: u32,
    generation: u32,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            marker: PhantomData,
        }
    }

    /// Slot index inside the owning pool.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    fn slot(&self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Verdict returned by the callback of [`Pool::retain_active`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retain {
    /// Leave the slot active.
    Keep,
    /// Return the slot to the free list.
    Release,
}

#[derive(Debug)]
struct Slot<T> {
    item: T,
    active: bool,
    generation: u32,
}

/// Fixed-capacity collection of reusable items.
#[derive(Debug)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Pool<T> {
    /// Creates a pool by calling `factory` once per slot.
    #[must_use]
    pub fn new(capacity: usize, mut factory: impl FnMut() -> T) -> Self {
        let slots: Vec<Slot<T>> = (0..capacity)
            .map(|_| Slot {
                item: factory(),
                active: false,
                generation: 0,
            })
            .collect();
        let free = (0..slots.len())
            .rev()
            .filter_map(|index| u32::try_from(index).ok())
            .collect();
        Self { slots, free }
    }

    /// Marks an inactive slot active and returns it.
    ///
    /// Falls back to scanning for an inactive slot when the free list is
    /// empty. Returns `None` when every slot is in use.
    pub fn acquire(&mut self) -> Option<(Handle<T>, &mut T)> {
        let index = self.take_free().or_else(|| self.scan_inactive())?;
        let slot = self.slots.get_mut(index as usize)?;
        slot.active = true;
        slot.generation = slot.generation.wrapping_add(1);
        Some((Handle::new(index, slot.generation), &mut slot.item))
    }

    fn take_free(&mut self) -> Option<u32> {
        while let Some(index) = self.free.pop() {
            if self
                .slots
                .get(index as usize)
                .is_some_and(|slot| !slot.active)
            {
                return Some(index);
            }
        }
        None
    }

    fn scan_inactive(&self) -> Option<u32> {
        self.slots
            .iter()
            .position(|slot| !slot.active)
            .and_then(|index| u32::try_from(index).ok())
    }

    /// Returns the slot behind `handle` to the free list.
    ///
    /// Stale handles and already released slots are ignored. Reports whether
    /// a slot was released.
    pub fn release(&mut self, handle: Handle<T>) -> bool {
        match self.slots.get_mut(handle.slot()) {
            Some(slot) if slot.active && slot.generation == handle.generation => {
                slot.active = false;
                self.free.push(handle.index);
                true
            }
            _ => false,
        }
    }

    /// Resolves a handle to its item while the slot is still the one it named.
    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slots
            .get(handle.slot())
            .filter(|slot| slot.active && slot.generation == handle.generation)
            .map(|slot| &slot.item)
    }

    /// Mutable counterpart of [`Pool::get`].
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.slot())
            .filter(|slot| slot.active && slot.generation == handle.generation)
            .map(|slot| &mut slot.item)
    }

    /// Iterates active items in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let index = u32::try_from(index).ok()?;
            slot.active
                .then(|| (Handle::new(index, slot.generation), &slot.item))
        })
    }

    /// Iterates active items mutably in slot order.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| {
                let index = u32::try_from(index).ok()?;
                if slot.active {
                    Some((Handle::new(index, slot.generation), &mut slot.item))
                } else {
                    None
                }
            })
    }

    /// Visits every active slot once and releases those the callback rejects.
    ///
    /// Slots released by the callback are never visited again during the same
    /// pass. Returns how many slots were released.
    pub fn retain_active(&mut self, mut visit: impl FnMut(Handle<T>, &mut T) -> Retain) -> usize {
        let Self { slots, free } = self;
        let mut released = 0;
        for (index, slot) in slots.iter_mut().enumerate() {
            if !slot.active {
                continue;
            }
            let Ok(index) = u32::try_from(index) else {
                continue;
            };
            let handle = Handle::new(index, slot.generation);
            if visit(handle, &mut slot.item) == Retain::Release {
                slot.active = false;
                free.push(index);
                released += 1;
            }
        }
        released
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently in use.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    /// Number of slots available for acquisition.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.capacity() - self.active_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_fails_once_capacity_is_exhausted() {
        let mut pool = Pool::new(3, || 0_u8);
        for _ in 0..3 {
            assert!(pool.acquire().is_some());
        }

        assert!(pool.acquire().is_none());
        assert_eq!(pool.active_count(), 3);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn released_handles_go_stale() {
        let mut pool = Pool::new(1, || 0_u32);
        let (first, item) = pool.acquire().expect("slot available");
        *item = 7;

        assert!(pool.release(first));
        assert!(!pool.release(first), "double release is a no-op");
        assert!(pool.get(first).is_none());

        let (second, _) = pool.acquire().expect("slot recycled");
        assert_eq!(second.index(), first.index());
        assert_ne!(second, first);
        assert!(pool.get(first).is_none());
        assert!(pool.get(second).is_some());
        assert!(!pool.release(first), "stale release must not free the new owner");
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn slots_are_handed_out_in_index_order() {
        let mut pool = Pool::new(3, || ());
        let indices: Vec<u32> = (0..3)
            .filter_map(|_| pool.acquire().map(|(handle, _)| handle.index()))
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn retain_releases_rejected_items() {
        let mut pool = Pool::new(4, || 0_i32);
        for value in 1..=4 {
            let (_, item) = pool.acquire().expect("slot available");
            *item = value;
        }

        let released = pool.retain_active(|_, item| {
            if *item % 2 == 0 {
                Retain::Release
            } else {
                Retain::Keep
            }
        });

        assert_eq!(released, 2);
        let remaining: Vec<i32> = pool.iter_active().map(|(_, item)| *item).collect();
        assert_eq!(remaining, vec![1, 3]);
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn iteration_skips_inactive_slots() {
        let mut pool = Pool::new(3, || 0_u8);
        let (a, _) = pool.acquire().expect("slot available");
        let (b, _) = pool.acquire().expect("slot available");
        assert!(pool.release(a));

        let active: Vec<Handle<u8>> = pool.iter_active().map(|(handle, _)| handle).collect();
        assert_eq!(active, vec![b]);

        for (_, item) in pool.iter_active_mut() {
            *item = 9;
        }
        assert_eq!(pool.get(b), Some(&9));
    }
}
