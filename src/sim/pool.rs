//! Free-list arena with generational handles
//!
//! Short-lived cosmetic entities are recycled instead of reallocated. A
//! handle stays valid until its slot is freed; a later occupant of the same
//! slot gets a new generation, so stale handles resolve to `None`.

use serde::Serialize;

/// Stable reference to a pooled value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Handle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Fixed-capacity pool
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    capacity: usize,
    len: usize,
}

impl<T> Pool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            capacity,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Change the cap. Live values above the new cap are kept until freed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Insert a value, reusing a freed slot when possible.
    /// Returns `None` when the pool is full.
    pub fn insert(&mut self, value: T) -> Option<Handle> {
        if self.len >= self.capacity {
            return None;
        }
        let index = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(value);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                (self.slots.len() - 1) as u32
            }
        };
        self.len += 1;
        Some(Handle {
            index,
            generation: self.slots[index as usize].generation,
        })
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.value.as_ref())
    }

    /// Keep only the values for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let drop_it = match slot.value.as_mut() {
                Some(value) => !keep(value),
                None => false,
            };
            if drop_it {
                slot.value = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                self.len -= 1;
            }
        }
    }

    /// Free every slot (allocations are kept for reuse)
    pub fn clear(&mut self) {
        self.retain(|_| false);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|v| {
                (
                    Handle {
                        index: i as u32,
                        generation: s.generation,
                    },
                    v,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|s| s.value.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_insert_get_retain() {
        let mut pool = Pool::with_capacity(4);
        let a = pool.insert("a").expect("room");
        let b = pool.insert("b").expect("room");
        assert_eq!(pool.get(a), Some(&"a"));
        assert_eq!(pool.len(), 2);
        pool.retain(|v| *v != "a");
        assert_eq!(pool.get(a), None);
        assert_eq!(pool.get(b), Some(&"b"));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_slot_reuse_invalidates_old_handle() {
        let mut pool = Pool::with_capacity(1);
        let a = pool.insert(1).expect("room");
        pool.clear();
        let b = pool.insert(2).expect("room");
        assert_ne!(a, b);
        assert_eq!(pool.get(a), None);
        assert_eq!(pool.get(b), Some(&2));
        // the underlying storage was recycled
        assert_eq!(pool.slots.len(), 1);
    }

    #[test]
    fn test_capacity_limit() {
        let mut pool = Pool::with_capacity(2);
        assert!(pool.insert(0).is_some());
        assert!(pool.insert(1).is_some());
        assert!(pool.insert(2).is_none());
        pool.retain(|v| *v != 0);
        assert_eq!(pool.len(), 1);
        assert!(pool.insert(3).is_some());
    }

    #[test]
    fn test_iter_reports_live_handles() {
        let mut pool = Pool::with_capacity(3);
        let a = pool.insert(10).expect("room");
        let b = pool.insert(20).expect("room");
        pool.retain(|v| *v != 10);
        let c = pool.insert(30).expect("room");
        let mut seen: Vec<_> = pool.iter().map(|(h, v)| (h, *v)).collect();
        seen.sort_by_key(|(_, v)| *v);
        assert_eq!(seen, vec![(b, 20), (c, 30)]);
        assert_ne!(a, c);
    }

    proptest! {
        #[test]
        fn prop_len_matches_live_values(ops in proptest::collection::vec(any::<(bool, u8)>(), 0..200)) {
            let mut pool = Pool::with_capacity(32);
            let mut live: Vec<(Handle, u32)> = Vec::new();
            let mut freed = Vec::new();
            for (next, (insert, n)) in (0u32..).zip(ops) {
                if insert {
                    if let Some(h) = pool.insert(next) {
                        live.push((h, next));
                    }
                } else if !live.is_empty() {
                    let (h, value) = live.remove(n as usize % live.len());
                    pool.retain(|v| *v != value);
                    freed.push(h);
                }
                prop_assert_eq!(pool.len(), live.len());
                prop_assert_eq!(pool.iter().count(), live.len());
                for (h, value) in &live {
                    prop_assert_eq!(pool.get(*h), Some(value));
                }
                for h in &freed {
                    prop_assert!(pool.get(*h).is_none());
                }
            }
        }
    }
}
