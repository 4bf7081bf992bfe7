use crate::profiling::profile_function;
use std::fmt;
use std::num::NonZeroU64;

/// Generational index into a [`SparseSet`].
///
/// The high 32 bits hold the generation, the low 32 bits the slot index plus
/// one, so the value is never zero and `Option<IndexSlot>` costs nothing.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexSlot(NonZeroU64);

impl IndexSlot {
    pub fn new(generation: u32, idx: u32) -> Self {
        let raw = ((generation as u64) << 32) | (idx as u64 + 1);
        // SAFETY: the low half is `idx + 1` computed in 64 bits, so `raw >= 1`.
        Self(unsafe { NonZeroU64::new_unchecked(raw) })
    }

    pub fn generation(&self) -> u32 {
        (self.0.get() >> 32) as u32
    }

    pub fn index(&self) -> u32 {
        ((self.0.get() & u32::MAX as u64) - 1) as u32
    }
}

impl fmt::Debug for IndexSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

struct Entry<T> {
    generation: u32,
    data: Option<T>,
}

/// Slot storage with generational handles.
///
/// Removing a value bumps the slot's generation, so handles to the removed
/// value never alias whatever is stored in the slot afterwards.
pub struct SparseSet<T> {
    vec: Vec<Entry<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> SparseSet<T> {
    pub const fn new() -> Self {
        Self {
            vec: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vec: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn push(&mut self, data: T) -> IndexSlot {
        profile_function!();
        self.len += 1;
        if let Some(idx) = self.free.pop() {
            let entry = &mut self.vec[idx as usize];
            entry.data = Some(data);
            IndexSlot::new(entry.generation, idx)
        } else {
            let idx = self.vec.len() as u32;
            self.vec.push(Entry {
                generation: 0,
                data: Some(data),
            });
            IndexSlot::new(0, idx)
        }
    }

    /// Get a value, panicking on a stale or foreign handle.
    pub fn get(&self, idx: IndexSlot) -> &T {
        match self.try_get(idx) {
            Some(data) => data,
            None => panic!("invalid generation, use after free! ({:?})", idx),
        }
    }

    /// Get a value mutably, panicking on a stale or foreign handle.
    pub fn get_mut(&mut self, idx: IndexSlot) -> &mut T {
        match self.try_get_mut(idx) {
            Some(data) => data,
            None => panic!("invalid generation, use after free! ({:?})", idx),
        }
    }

    pub fn try_get(&self, idx: IndexSlot) -> Option<&T> {
        self.vec
            .get(idx.index() as usize)
            .filter(|entry| entry.generation == idx.generation())
            .and_then(|entry| entry.data.as_ref())
    }

    pub fn try_get_mut(&mut self, idx: IndexSlot) -> Option<&mut T> {
        self.vec
            .get_mut(idx.index() as usize)
            .filter(|entry| entry.generation == idx.generation())
            .and_then(|entry| entry.data.as_mut())
    }

    pub fn contains(&self, idx: IndexSlot) -> bool {
        self.try_get(idx).is_some()
    }

    /// Remove a value, panicking on a stale or foreign handle.
    pub fn remove(&mut self, idx: IndexSlot) -> T {
        match self.try_remove(idx) {
            Some(data) => data,
            None => panic!("invalid generation, use after free! ({:?})", idx),
        }
    }

    pub fn try_remove(&mut self, idx: IndexSlot) -> Option<T> {
        profile_function!();
        let index = idx.index();
        let entry = self.vec.get_mut(index as usize)?;
        if entry.generation != idx.generation() {
            return None;
        }
        let data = entry.data.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
        Some(data)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every value. Outstanding handles become stale.
    pub fn clear(&mut self) {
        for (index, entry) in self.vec.iter_mut().enumerate() {
            if entry.data.take().is_some() {
                entry.generation = entry.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.vec.iter().filter_map(|entry| entry.data.as_ref())
    }

    /// Iterate live values together with their current handles.
    pub fn iter_slots(&self) -> impl Iterator<Item = (IndexSlot, &T)> + '_ {
        self.vec.iter().enumerate().filter_map(|(index, entry)| {
            entry
                .data
                .as_ref()
                .map(|data| (IndexSlot::new(entry.generation, index as u32), data))
        })
    }
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_eq_size!(IndexSlot, Option<IndexSlot>);
