//! Generic slot+generation handle table.
//!
//! Prevents use-after-free across the native boundary: released handles
//! have stale generation counters and safely return `None` instead of
//! resolving to reused storage. Double-remove is a safe no-op.
//!
//! Generation 0 is never issued, so the encoded handle `0` can never be
//! live and is free to mean "null".

/// Handle encoding: upper 32 bits = slot index, lower 32 bits = generation.
fn encode(slot: u32, generation: u32) -> u64 {
    ((slot as u64) << 32) | (generation as u64)
}

fn decode(handle: u64) -> (u32, u32) {
    let slot = (handle >> 32) as u32;
    let generation = handle as u32;
    (slot, generation)
}

struct Slot<T> {
    generation: u32,
    data: Option<T>,
}

/// A slot+generation handle table mapping `u64` handles to owned values.
///
/// Reuses slots via a free list. Generation counters increment on removal,
/// making stale handles detectable.
pub struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    live: usize,
}

impl<T> HandleTable<T> {
    /// Create an empty handle table.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Insert a value and return its handle. The handle is never `0`.
    pub fn insert(&mut self, value: T) -> u64 {
        self.live += 1;
        if let Some(slot_idx) = self.free_list.pop() {
            let slot = &mut self.slots[slot_idx as usize];
            slot.data = Some(value);
            encode(slot_idx, slot.generation)
        } else {
            let slot_idx = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 1,
                data: Some(value),
            });
            encode(slot_idx, 1)
        }
    }

    /// Get an immutable reference to the value behind a handle.
    ///
    /// Returns `None` if the handle is stale or was never valid.
    pub fn get(&self, handle: u64) -> Option<&T> {
        let (slot_idx, generation) = decode(handle);
        let slot = self.slots.get(slot_idx as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.data.as_ref()
    }

    /// Whether `handle` currently resolves to a value.
    pub fn contains(&self, handle: u64) -> bool {
        self.get(handle).is_some()
    }

    /// Remove the value behind a handle, returning it.
    ///
    /// Increments the generation counter and adds the slot to the free list.
    /// A slot whose generation wraps back to 0 is retired instead of
    /// recycled, so handles from its first epoch can never resolve again.
    /// Returns `None` if the handle is stale (double-remove is safe).
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let (slot_idx, generation) = decode(handle);
        let slot = self.slots.get_mut(slot_idx as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.data.take()?;
        self.live -= 1;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != 0 {
            self.free_list.push(slot_idx);
        }
        Some(value)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the table holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate over `(handle, value)` for every live entry.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.data
                .as_ref()
                .map(|data| (encode(idx as u32, slot.generation), data))
        })
    }
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_round_trip() {
        let mut table = HandleTable::new();
        let h = table.insert(42i32);
        assert_ne!(h, 0);
        assert_eq!(table.get(h), Some(&42));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn stale_handle_after_remove() {
        let mut table = HandleTable::new();
        let h = table.insert(1i32);
        assert_eq!(table.remove(h), Some(1));
        assert_eq!(table.get(h), None);
        assert!(!table.contains(h));
        assert!(table.is_empty());
    }

    #[test]
    fn double_remove_returns_none() {
        let mut table = HandleTable::new();
        let h = table.insert(1i32);
        assert_eq!(table.remove(h), Some(1));
        assert_eq!(table.remove(h), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn null_handle_never_resolves() {
        let mut table = HandleTable::new();
        table.insert(5i32);
        assert_eq!(table.get(0), None);
        assert_eq!(table.remove(0), None);
    }

    #[test]
    fn free_list_reuses_slots_with_new_generation() {
        let mut table = HandleTable::new();
        let h1 = table.insert(1i32);
        table.remove(h1);
        let h2 = table.insert(2i32);
        let (slot1, gen1) = decode(h1);
        let (slot2, gen2) = decode(h2);
        assert_eq!(slot1, slot2);
        assert_eq!(gen2, gen1 + 1);
        assert_eq!(table.get(h2), Some(&2));
        assert_eq!(table.get(h1), None);
    }

    #[test]
    fn iter_visits_live_entries_only() {
        let mut table = HandleTable::new();
        let a = table.insert('a');
        let b = table.insert('b');
        table.remove(a);
        let seen: Vec<_> = table.iter().collect();
        assert_eq!(seen, vec![(b, &'b')]);
    }

    #[test]
    fn wrapped_generation_retires_slot() {
        let mut table = HandleTable::new();
        let h = table.insert(1i32);
        table.remove(h);

        table.slots[0].generation = u32::MAX;
        let h2 = table.insert(2i32);
        assert_eq!(decode(h2), (0, u32::MAX));

        // Wraps to 0: the slot must be retired, not recycled.
        table.remove(h2);
        assert_eq!(table.slots[0].generation, 0);
        assert!(!table.free_list.contains(&0));

        let h3 = table.insert(3i32);
        let (slot3, _) = decode(h3);
        assert_ne!(slot3, 0, "retired slot must not be reused");
        assert_eq!(table.get(encode(0, 0)), None);
    }
}
