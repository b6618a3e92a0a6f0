//! Bounded least-recently-used map.
//!
//! Entries live in a slab of slots threaded onto a doubly linked recency
//! list; the hash map points from key to slot. Lookups through [`get`] and
//! [`get_mut`] move the entry to the front, [`put`] inserts at the front, and
//! once `capacity` entries are held the back entry is evicted and its slot
//! reused.
//!
//! [`get`]: TranspositionCache::get
//! [`get_mut`]: TranspositionCache::get_mut
//! [`put`]: TranspositionCache::put

use std::collections::HashMap;
use std::hash::Hash;

struct Slot<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Position-keyed cache with LRU eviction, sized by entry count.
///
/// Not synchronized; one search owns one cache.
pub struct TranspositionCache<K, V> {
    map: HashMap<K, usize>,
    slots: Vec<Slot<K, V>>,
    /// Most recently used.
    head: Option<usize>,
    /// Least recently used.
    tail: Option<usize>,
    capacity: usize,
    evictions: u64,
}

impl<K: Hash + Eq + Clone, V> TranspositionCache<K, V> {
    /// Creates an empty cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        TranspositionCache {
            map: HashMap::with_capacity(capacity.min(1 << 16)),
            slots: Vec::with_capacity(capacity.min(1 << 16)),
            head: None,
            tail: None,
            capacity,
            evictions: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries evicted since creation or the last [`clear`](Self::clear).
    #[inline]
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let index = *self.map.get(key)?;
        self.touch(index);
        Some(&self.slots[index].value)
    }

    /// Mutable lookup; marks the entry most recently used.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let index = *self.map.get(key)?;
        self.touch(index);
        Some(&mut self.slots[index].value)
    }

    /// Looks up `key` without changing recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key).map(|&index| &self.slots[index].value)
    }

    /// Inserts or replaces `key`, making it most recently used.
    ///
    /// Returns the entry pushed out to make room, if any. Replacing an
    /// existing key never evicts.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&index) = self.map.get(&key) {
            self.slots[index].value = value;
            self.touch(index);
            return None;
        }

        if self.map.len() < self.capacity {
            let index = self.slots.len();
            self.slots.push(Slot {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.map.insert(key, index);
            self.push_front(index);
            return None;
        }

        // Full: recycle the least recently used slot.
        let index = self.tail?;
        self.unlink(index);
        let old_key = std::mem::replace(&mut self.slots[index].key, key.clone());
        let old_value = std::mem::replace(&mut self.slots[index].value, value);
        self.map.remove(&old_key);
        self.map.insert(key, index);
        self.push_front(index);
        self.evictions += 1;
        Some((old_key, old_value))
    }

    /// Drops every entry and resets the eviction counter.
    pub fn clear(&mut self) {
        self.map.clear();
        self.slots.clear();
        self.head = None;
        self.tail = None;
        self.evictions = 0;
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let index = cursor?;
            cursor = self.slots[index].next;
            Some(&self.slots[index].key)
        })
    }

    fn touch(&mut self, index: usize) {
        if self.head != Some(index) {
            self.unlink(index);
            self.push_front(index);
        }
    }

    fn unlink(&mut self, index: usize) {
        let (prev, next) = (self.slots[index].prev, self.slots[index].next);
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.slots[index].prev = None;
        self.slots[index].next = None;
    }

    fn push_front(&mut self, index: usize) {
        self.slots[index].prev = None;
        self.slots[index].next = self.head;
        if let Some(h) = self.head {
            self.slots[h].prev = Some(index);
        }
        self.head = Some(index);
        if self.tail.is_none() {
            self.tail = Some(index);
        }
    }
}
