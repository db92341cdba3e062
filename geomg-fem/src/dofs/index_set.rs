//! Sorted interval sets of DoF indices
//!
//! Used for ownership ranges and for the per-level boundary and
//! refinement-edge sets. Intervals are half-open, disjoint, non-adjacent and
//! kept in increasing order.

use std::ops::Range;

/// Set of indices in `0..size` stored as sorted intervals
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexSet {
    size: usize,
    ranges: Vec<Range<usize>>,
}

impl IndexSet {
    /// Empty set over `0..size`
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ranges: Vec::new(),
        }
    }

    /// The full range `0..size`
    pub fn complete(size: usize) -> Self {
        let mut set = Self::new(size);
        set.add_range(0..size);
        set
    }

    /// Build from arbitrary (unsorted, possibly repeated) indices
    pub fn from_indices<I: IntoIterator<Item = usize>>(size: usize, indices: I) -> Self {
        let mut sorted: Vec<usize> = indices.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut set = Self::new(size);
        let mut iter = sorted.into_iter();
        if let Some(first) = iter.next() {
            let mut current = first..first + 1;
            for index in iter {
                if index == current.end {
                    current.end += 1;
                } else {
                    set.ranges.push(current);
                    current = index..index + 1;
                }
            }
            set.ranges.push(current);
        }
        debug_assert!(set.ranges.last().is_none_or(|r| r.end <= size));
        set
    }

    /// Size of the index space
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of indices in the set
    pub fn n_elements(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Stored intervals
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Membership test, O(log #intervals)
    pub fn is_element(&self, index: usize) -> bool {
        let pos = self.ranges.partition_point(|r| r.end <= index);
        self.ranges.get(pos).is_some_and(|r| r.contains(&index))
    }

    pub fn add_index(&mut self, index: usize) {
        self.add_range(index..index + 1);
    }

    /// Insert an interval, merging with overlapping or adjacent ones
    pub fn add_range(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        debug_assert!(range.end <= self.size, "range {range:?} exceeds size {}", self.size);

        let first = self.ranges.partition_point(|r| r.end < range.start);
        let last = self.ranges.partition_point(|r| r.start <= range.end);
        if first < last {
            let merged = range.start.min(self.ranges[first].start)
                ..range.end.max(self.ranges[last - 1].end);
            self.ranges.splice(first..last, std::iter::once(merged));
        } else {
            self.ranges.insert(first, range);
        }
    }

    /// Set union; the result spans the larger of the two index spaces
    pub fn union(&self, other: &IndexSet) -> IndexSet {
        let mut result = self.clone();
        result.size = self.size.max(other.size);
        for range in &other.ranges {
            result.add_range(range.clone());
        }
        result
    }

    /// Set intersection
    pub fn intersection(&self, other: &IndexSet) -> IndexSet {
        let mut result = IndexSet::new(self.size.min(other.size));
        let (mut a, mut b) = (0, 0);
        while a < self.ranges.len() && b < other.ranges.len() {
            let (ra, rb) = (&self.ranges[a], &other.ranges[b]);
            let start = ra.start.max(rb.start);
            let end = ra.end.min(rb.end);
            if start < end {
                result.ranges.push(start..end);
            }
            if ra.end < rb.end {
                a += 1;
            } else {
                b += 1;
            }
        }
        result
    }

    /// Iterate over the indices in increasing order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.ranges.iter().flat_map(|r| r.clone())
    }
}
