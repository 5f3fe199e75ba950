//! Ordered interval index
//!
//! Stores half-open `[begin, end)` intervals, each carrying one value, in a
//! `BTreeMap` keyed by `(begin, end, seq)`. Intervals may overlap; callers that
//! need non-overlap (paint) express it as a `chop` followed by an `insert`.

use std::collections::BTreeMap;

/// A stored interval with its value
#[derive(Debug, Clone, PartialEq)]
pub struct Interval<V> {
    pub begin: i64,
    pub end: i64,
    pub value: V,
}

impl<V> Interval<V> {
    pub fn new(begin: i64, end: i64, value: V) -> Self {
        Self { begin, end, value }
    }

    pub fn contains(&self, point: i64) -> bool {
        self.begin <= point && point < self.end
    }

    pub fn overlaps(&self, begin: i64, end: i64) -> bool {
        self.begin < end && begin < self.end
    }
}

/// Handle to one stored interval; sorts by `(begin, end)` then insertion sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId {
    pub begin: i64,
    pub end: i64,
    seq: u64,
}

#[derive(Debug, Clone)]
pub struct IntervalIndex<V> {
    entries: BTreeMap<EntryId, V>,
    next_seq: u64,
}

impl<V> Default for IntervalIndex<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<V> IntervalIndex<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `[begin, end) -> value`. Empty or inverted ranges are ignored
    /// and yield `None`.
    pub fn insert(&mut self, begin: i64, end: i64, value: V) -> Option<EntryId> {
        if begin >= end {
            return None;
        }
        let id = EntryId {
            begin,
            end,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.entries.insert(id, value);
        Some(id)
    }

    pub fn remove(&mut self, id: &EntryId) -> Option<Interval<V>> {
        self.entries
            .remove(id)
            .map(|value| Interval::new(id.begin, id.end, value))
    }

    pub fn get(&self, id: &EntryId) -> Option<&V> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &EntryId) -> Option<&mut V> {
        self.entries.get_mut(id)
    }

    /// Lowest `begin` of any stored interval
    pub fn begin(&self) -> Option<i64> {
        self.entries.keys().next().map(|id| id.begin)
    }

    /// Highest `end` of any stored interval
    pub fn end(&self) -> Option<i64> {
        self.entries.keys().map(|id| id.end).max()
    }

    /// Ids of all intervals overlapping `[begin, end)`, in sorted order
    pub fn overlapping(&self, begin: i64, end: i64) -> Vec<EntryId> {
        if begin >= end {
            return Vec::new();
        }
        // Everything starting at or after `end` is out; scan the prefix.
        self.entries
            .keys()
            .take_while(|id| id.begin < end)
            .filter(|id| id.end > begin)
            .copied()
            .collect()
    }

    /// Ids of all intervals covering `point`, in sorted order
    pub fn covering(&self, point: i64) -> Vec<EntryId> {
        self.entries
            .keys()
            .take_while(|id| id.begin <= point)
            .filter(|id| point < id.end)
            .copied()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntryId, &V)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V: Clone> IntervalIndex<V> {
    /// Remove all coverage of `[begin, end)`.
    ///
    /// Intervals that only partially overlap keep the part outside the window,
    /// each piece carrying a clone of the original value. Returns the number of
    /// intervals that were touched.
    pub fn chop(&mut self, begin: i64, end: i64) -> usize {
        let hits = self.overlapping(begin, end);
        for id in &hits {
            let Some(removed) = self.remove(id) else {
                continue;
            };
            if removed.begin < begin {
                self.insert(removed.begin, begin, removed.value.clone());
            }
            if removed.end > end {
                self.insert(end, removed.end, removed.value);
            }
        }
        hits.len()
    }

    /// All stored intervals sorted by `(begin, end)`
    pub fn intervals(&self) -> Vec<Interval<V>> {
        self.entries
            .iter()
            .map(|(id, value)| Interval::new(id.begin, id.end, value.clone()))
            .collect()
    }
}

impl<V> FromIterator<Interval<V>> for IntervalIndex<V> {
    fn from_iter<I: IntoIterator<Item = Interval<V>>>(iter: I) -> Self {
        let mut index = Self::new();
        for iv in iter {
            index.insert(iv.begin, iv.end, iv.value);
        }
        index
    }
}
