//! Bounded-capacity Space-Saving frequency estimator.
//!
//! Tracks the approximate top-k most frequent items of an unbounded
//! stream with a fixed number of counter slots. Slots are grouped into
//! buckets of equal count, kept in strictly descending order, which
//! makes `offer` amortised O(1) and `top_k` a single ordered walk.
//!
//! The intrusive bucket/slot lists are realised as index arenas: slots
//! and buckets live in `Vec`s and link to each other through `usize`
//! indices, with `NIL` as the null sentinel.

use crate::core::{Result, TracegateError};
use rustc_hash::FxHashMap;
use std::hash::Hash;

const NIL: usize = usize::MAX;

/// Observed frequency of a single item.
///
/// `value` is the estimated count; `error` is the maximum possible
/// overestimate inherited from the slot's previous occupant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter<T> {
    pub item: T,
    pub value: u64,
    pub error: u64,
}

#[derive(Debug)]
struct Slot<T> {
    item: Option<T>,
    value: u64,
    error: u64,
    bucket: usize,
    prev: usize,
    next: usize,
}

#[derive(Debug)]
struct Bucket {
    value: u64,
    first_slot: usize,
    last_slot: usize,
    prev: usize,
    next: usize,
}

/// Space-Saving estimator over items of type `T`.
#[derive(Debug)]
pub struct StreamSummary<T> {
    capacity: usize,
    n: u64,
    slots: Vec<Slot<T>>,
    buckets: Vec<Bucket>,
    free_buckets: Vec<usize>,
    /// Bucket holding the highest count.
    highest: usize,
    /// Bucket holding the lowest count.
    lowest: usize,
    index: FxHashMap<T, usize>,
}

impl<T: Clone + Eq + Hash> StreamSummary<T> {
    /// Create an estimator with `capacity` counter slots.
    ///
    /// All slots start empty in a single zero-count bucket, so the
    /// first `capacity` distinct items are tracked without error.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 1);
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        for i in 0..capacity {
            slots.push(Slot {
                item: None,
                value: 0,
                error: 0,
                bucket: 0,
                prev: if i == 0 { NIL } else { i - 1 },
                next: if i + 1 == capacity { NIL } else { i + 1 },
            });
        }
        let buckets = vec![Bucket {
            value: 0,
            first_slot: 0,
            last_slot: capacity - 1,
            prev: NIL,
            next: NIL,
        }];
        Self {
            capacity,
            n: 0,
            slots,
            buckets,
            free_buckets: Vec::new(),
            highest: 0,
            lowest: 0,
            index: FxHashMap::default(),
        }
    }

    /// Number of counter slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total weight offered since construction.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Record one occurrence of `item`.
    pub fn offer(&mut self, item: T) -> Counter<T> {
        self.offer_weighted(item, 1)
    }

    /// Record `delta` occurrences of `item` and return the resulting
    /// counter snapshot.
    ///
    /// A known item is incremented in place. An unknown item evicts the
    /// current minimum slot and inherits its previous count as `error`.
    pub fn offer_weighted(&mut self, item: T, delta: u64) -> Counter<T> {
        self.n += delta;
        let cached = self.index.get(&item).copied();
        let slot_idx = match cached {
            Some(idx) => {
                self.increment(idx, delta);
                idx
            },
            None => {
                let idx = self.buckets[self.lowest].last_slot;
                let original_min = self.slots[idx].value;
                if let Some(old) = self.slots[idx].item.take() {
                    self.index.remove(&old);
                }
                self.slots[idx].item = Some(item.clone());
                self.index.insert(item.clone(), idx);
                self.increment(idx, delta);
                self.slots[idx].error = original_min;
                idx
            },
        };
        let slot = &self.slots[slot_idx];
        Counter {
            item,
            value: slot.value,
            error: slot.error,
        }
    }

    /// Current estimated count of `item`, if it occupies a slot.
    pub fn value_of<Q>(&self, item: &Q) -> Option<u64>
    where
        T: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(item).map(|&idx| self.slots[idx].value)
    }

    /// Ordered top-k counters, most frequent first.
    ///
    /// Ties keep bucket insertion order. Empty slots are skipped.
    pub fn top_k(&self, k: usize) -> Vec<Counter<T>> {
        let mut result = Vec::with_capacity(self.index.len().min(k));
        let mut bucket_idx = self.highest;
        while bucket_idx != NIL {
            let bucket = &self.buckets[bucket_idx];
            let mut slot_idx = bucket.first_slot;
            while slot_idx != NIL {
                let slot = &self.slots[slot_idx];
                if let Some(item) = &slot.item {
                    result.push(Counter {
                        item: item.clone(),
                        value: slot.value,
                        error: slot.error,
                    });
                    if result.len() == k {
                        return result;
                    }
                }
                slot_idx = slot.next;
            }
            bucket_idx = bucket.next;
        }
        result
    }

    /// All populated counters in descending order.
    pub fn top(&self) -> Vec<Counter<T>> {
        self.top_k(usize::MAX)
    }

    /// Check the structural invariants.
    ///
    /// Intended for tests; a violation is a programming error, not a
    /// runtime condition.
    pub fn validate(&self) -> Result<()> {
        let mut seen_slots = 0usize;
        let mut value_sum = 0u64;
        let mut unindexed = self.index.len();

        let mut bucket_idx = self.highest;
        let mut prev_bucket = NIL;
        while bucket_idx != NIL {
            let bucket = &self.buckets[bucket_idx];
            if bucket.prev != prev_bucket {
                return Err(TracegateError::invariant("bucket list links are broken"));
            }
            if prev_bucket != NIL && self.buckets[prev_bucket].value <= bucket.value {
                return Err(TracegateError::invariant(
                    "buckets should be in descending order",
                ));
            }
            let mut slot_idx = bucket.first_slot;
            let mut prev_slot = NIL;
            while slot_idx != NIL {
                let slot = &self.slots[slot_idx];
                if slot.prev != prev_slot {
                    return Err(TracegateError::invariant("slot list links are broken"));
                }
                if slot.bucket != bucket_idx {
                    return Err(TracegateError::invariant("entry should point to its bucket"));
                }
                if slot.value != bucket.value {
                    return Err(TracegateError::invariant(
                        "entry and bucket should have the same value",
                    ));
                }
                if let Some(item) = &slot.item {
                    match self.index.get(item) {
                        Some(&mapped) if mapped == slot_idx => unindexed -= 1,
                        _ => {
                            return Err(TracegateError::invariant(
                                "populated entry missing from the lookup index",
                            ))
                        },
                    }
                }
                value_sum += slot.value;
                seen_slots += 1;
                prev_slot = slot_idx;
                slot_idx = slot.next;
            }
            if bucket.last_slot != prev_slot {
                return Err(TracegateError::invariant("bucket tail link is broken"));
            }
            prev_bucket = bucket_idx;
            bucket_idx = bucket.next;
        }

        if self.lowest != prev_bucket {
            return Err(TracegateError::invariant("lowest bucket link is broken"));
        }
        if seen_slots != self.capacity {
            return Err(TracegateError::invariant(
                "number of linked slots must equal capacity",
            ));
        }
        if unindexed != 0 {
            return Err(TracegateError::invariant(
                "there should be no dead index entries",
            ));
        }
        if self.index.len() > self.capacity {
            return Err(TracegateError::invariant(
                "index size must not exceed capacity",
            ));
        }
        if value_sum != self.n {
            return Err(TracegateError::invariant(
                "sum of all counter values must be equal to n",
            ));
        }
        Ok(())
    }

    fn increment(&mut self, slot_idx: usize, delta: u64) {
        let bucket_idx = self.slots[slot_idx].bucket;
        let higher = self.buckets[bucket_idx].prev;
        self.slots[slot_idx].value += delta;
        let new_value = self.slots[slot_idx].value;

        self.detach_slot(slot_idx);

        let target = if higher != NIL && self.buckets[higher].value == new_value {
            higher
        } else {
            self.insert_bucket_before(bucket_idx, new_value)
        };
        self.append_slot(target, slot_idx);

        if self.buckets[bucket_idx].first_slot == NIL {
            self.remove_bucket(bucket_idx);
        }
    }

    fn detach_slot(&mut self, slot_idx: usize) {
        let (bucket, prev, next) = {
            let slot = &self.slots[slot_idx];
            (slot.bucket, slot.prev, slot.next)
        };
        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.buckets[bucket].first_slot = next;
        }
        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.buckets[bucket].last_slot = prev;
        }
        self.slots[slot_idx].prev = NIL;
        self.slots[slot_idx].next = NIL;
    }

    fn append_slot(&mut self, bucket_idx: usize, slot_idx: usize) {
        let last = self.buckets[bucket_idx].last_slot;
        {
            let slot = &mut self.slots[slot_idx];
            slot.bucket = bucket_idx;
            slot.prev = last;
            slot.next = NIL;
        }
        if last != NIL {
            self.slots[last].next = slot_idx;
        } else {
            self.buckets[bucket_idx].first_slot = slot_idx;
        }
        self.buckets[bucket_idx].last_slot = slot_idx;
    }

    /// Insert a fresh bucket with `value` directly above `next_bucket`.
    fn insert_bucket_before(&mut self, next_bucket: usize, value: u64) -> usize {
        let prev = self.buckets[next_bucket].prev;
        let bucket = Bucket {
            value,
            first_slot: NIL,
            last_slot: NIL,
            prev,
            next: next_bucket,
        };
        let idx = match self.free_buckets.pop() {
            Some(idx) => {
                self.buckets[idx] = bucket;
                idx
            },
            None => {
                self.buckets.push(bucket);
                self.buckets.len() - 1
            },
        };
        if prev != NIL {
            self.buckets[prev].next = idx;
        } else {
            self.highest = idx;
        }
        self.buckets[next_bucket].prev = idx;
        idx
    }

    fn remove_bucket(&mut self, bucket_idx: usize) {
        let (prev, next) = {
            let bucket = &self.buckets[bucket_idx];
            (bucket.prev, bucket.next)
        };
        if prev != NIL {
            self.buckets[prev].next = next;
        } else {
            self.highest = next;
        }
        if next != NIL {
            self.buckets[next].prev = prev;
        } else {
            self.lowest = prev;
        }
        self.free_buckets.push(bucket_idx);
    }
}
