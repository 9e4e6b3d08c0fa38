//! Open-addressing `Price -> LevelHandle` map (§4.2). `Book::add_order`
//! uses this to find a resting level in O(1) before falling back to the
//! tree only on insert/remove.
#![allow(dead_code)]

use crate::types::{LevelHandle, Price};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Empty,
    Tombstone,
    Occupied(Price, LevelHandle),
}

/// splitmix64 — cheap, well-mixed for integer keys, no dependency needed.
#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[inline]
fn hash_price(p: Price) -> u64 {
    splitmix64(p as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertErr {
    Full,
    Duplicate,
}

/// Fixed-capacity open-addressing hash map. Capacity is the pool's level
/// capacity, rounded up to a power of two so probing can mask instead of
/// modulo. `tombs` tracks live tombstones so `insert` can refuse to pack
/// the table so full that no `Slot::Empty` survives — without a reachable
/// empty slot, a probe for an absent key would never terminate.
pub struct PriceIndex {
    slots: Vec<Slot>,
    mask: u64,
    len: usize,
    tombs: usize,
    capacity: usize,
}

impl PriceIndex {
    pub fn with_capacity(capacity: u32) -> Self {
        let capacity = capacity.max(1) as usize;
        let cap = (capacity * 2).next_power_of_two();
        Self { slots: vec![Slot::Empty; cap], mask: (cap - 1) as u64, len: 0, tombs: 0, capacity }
    }

    #[inline]
    fn start(&self, price: Price) -> usize {
        (hash_price(price) & self.mask) as usize
    }

    #[inline]
    fn physical_capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, price: Price) -> Option<LevelHandle> {
        let mut i = self.start(price);
        loop {
            match self.slots[i] {
                Slot::Empty => return None,
                Slot::Occupied(p, h) if p == price => return Some(h),
                _ => i = (i + 1) & self.mask as usize,
            }
        }
    }

    pub fn insert(&mut self, price: Price, handle: LevelHandle) -> Result<(), InsertErr> {
        if self.len >= self.capacity {
            return Err(InsertErr::Full);
        }
        let mut i = self.start(price);
        let mut first_tombstone: Option<usize> = None;
        loop {
            match self.slots[i] {
                Slot::Empty => {
                    let dest = first_tombstone.unwrap_or(i);
                    self.slots[dest] = Slot::Occupied(price, handle);
                    if first_tombstone.is_some() {
                        self.tombs -= 1;
                    }
                    self.len += 1;
                    return Ok(());
                }
                Slot::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(i);
                    }
                }
                Slot::Occupied(p, _) if p == price => return Err(InsertErr::Duplicate),
                Slot::Occupied(_, _) => {}
            }
            i = (i + 1) & self.mask as usize;

            // ported from the teacher's order_index.rs `len + tombs` guard:
            // bail before a tombstone-saturated table forces an unbounded
            // probe, unless we already have a tombstone slot to land in.
            if first_tombstone.is_none() && self.len + self.tombs >= self.physical_capacity() - 1 {
                return Err(InsertErr::Full);
            }
        }
    }

    pub fn remove(&mut self, price: Price) -> Option<LevelHandle> {
        let mut i = self.start(price);
        loop {
            match self.slots[i] {
                Slot::Empty => return None,
                Slot::Occupied(p, h) if p == price => {
                    self.slots[i] = Slot::Tombstone;
                    self.len -= 1;
                    self.tombs += 1;
                    return Some(h);
                }
                _ => i = (i + 1) & self.mask as usize,
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All occupied keys, unordered. Test/debug use only (checking map/tree
    /// lockstep against `RbTree::in_order`, §3 invariant 1).
    pub fn keys(&self) -> Vec<Price> {
        self.slots
            .iter()
            .filter_map(|s| match s {
                Slot::Occupied(p, _) => Some(*p),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LevelHandle;

    #[test]
    fn insert_find_remove_roundtrip() {
        let mut idx = PriceIndex::with_capacity(16);
        idx.insert(100, LevelHandle(1)).unwrap();
        idx.insert(101, LevelHandle(2)).unwrap();
        assert_eq!(idx.get(100), Some(LevelHandle(1)));
        assert_eq!(idx.get(101), Some(LevelHandle(2)));
        assert_eq!(idx.get(102), None);

        assert_eq!(idx.remove(100), Some(LevelHandle(1)));
        assert_eq!(idx.get(100), None);
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn duplicate_insert_rejected() {
        let mut idx = PriceIndex::with_capacity(8);
        idx.insert(5, LevelHandle(0)).unwrap();
        assert_eq!(idx.insert(5, LevelHandle(9)), Err(InsertErr::Duplicate));
    }

    #[test]
    fn tombstone_reuse_after_remove() {
        let mut idx = PriceIndex::with_capacity(4);
        idx.insert(1, LevelHandle(1)).unwrap();
        idx.remove(1);
        idx.insert(1, LevelHandle(2)).unwrap();
        assert_eq!(idx.get(1), Some(LevelHandle(2)));
    }

    /// Regression: sustained churn of *distinct* prices (insert a fresh
    /// price, remove it, insert another fresh price, ...) must never
    /// leave the table without a surviving `Slot::Empty`. Before the
    /// `len + tombs` guard this spun `get`/`insert` forever once
    /// tombstones alone filled every physical slot.
    #[test]
    fn churn_of_distinct_prices_never_hangs() {
        let mut idx = PriceIndex::with_capacity(8);
        for price in 0..10_000i64 {
            match idx.insert(price, LevelHandle(price as u32)) {
                Ok(()) => {
                    assert_eq!(idx.get(price), Some(LevelHandle(price as u32)));
                    assert_eq!(idx.remove(price), Some(LevelHandle(price as u32)));
                    assert_eq!(idx.get(price), None);
                }
                // a table wedged on tombstones reports Full rather than
                // spinning; a lookup for this never-inserted price must
                // still terminate.
                Err(InsertErr::Full) => assert_eq!(idx.get(price), None),
                Err(InsertErr::Duplicate) => unreachable!("price {price} inserted exactly once"),
            }
        }
    }

    #[test]
    fn tombstone_saturation_reports_full_instead_of_hanging() {
        // physical table is 2 * next_pow2(capacity); fill it with
        // tombstones by inserting-then-removing more distinct prices
        // than the logical capacity, then confirm a lookup for an
        // absent key still terminates.
        let mut idx = PriceIndex::with_capacity(4);
        for price in 0..64i64 {
            if idx.insert(price, LevelHandle(price as u32)).is_ok() {
                idx.remove(price);
            }
        }
        assert_eq!(idx.get(999_999), None);
    }

    #[test]
    fn full_reports_err() {
        let mut idx = PriceIndex::with_capacity(2);
        idx.insert(1, LevelHandle(1)).unwrap();
        idx.insert(2, LevelHandle(2)).unwrap();
        idx.insert(3, LevelHandle(3)).unwrap();
        assert_eq!(idx.insert(4, LevelHandle(4)), Err(InsertErr::Full));
    }
}
