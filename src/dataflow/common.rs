//! Shared set machinery for dataflow analyses.

/// A simple bit set over a fixed universe of definition ids.
///
/// Uses a `Vec<u64>` as backing storage; union and difference are O(n/64)
/// where n is the universe size. Out-of-range elements are silently ignored,
/// which is safe because the universe (all definitions of one file) is fixed
/// before any set is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSet {
    bits: Vec<u64>,
    capacity: usize,
}

impl BitSet {
    /// Create an empty set able to hold elements `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        let num_words = capacity.div_ceil(64);
        Self {
            bits: vec![0; num_words],
            capacity,
        }
    }

    /// Insert an element. Returns true if it was not already present.
    #[inline]
    pub fn insert(&mut self, elem: usize) -> bool {
        if elem >= self.capacity {
            return false;
        }
        let mask = 1u64 << (elem % 64);
        let word = &mut self.bits[elem / 64];
        let was_present = (*word & mask) != 0;
        *word |= mask;
        !was_present
    }

    /// Check if an element is in the set.
    #[inline]
    pub fn contains(&self, elem: usize) -> bool {
        if elem >= self.capacity {
            return false;
        }
        (self.bits[elem / 64] & (1u64 << (elem % 64))) != 0
    }

    /// Union: `self = self | other`.
    #[inline]
    pub fn union_with(&mut self, other: &BitSet) {
        for (a, b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a |= *b;
        }
    }

    /// Difference: `self = self - other`.
    #[inline]
    pub fn difference_with(&mut self, other: &BitSet) {
        for (a, b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a &= !*b;
        }
    }

    /// True if `self` is a subset of (or equal to) `other`.
    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .all(|(a, b)| a & !b == 0)
    }

    /// Check if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// Number of elements in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over all elements in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let capacity = self.capacity;
        self.bits
            .iter()
            .enumerate()
            .flat_map(move |(word_idx, &word)| {
                (0..64).filter_map(move |bit_idx| {
                    if (word & (1u64 << bit_idx)) != 0 {
                        let elem = word_idx * 64 + bit_idx;
                        (elem < capacity).then_some(elem)
                    } else {
                        None
                    }
                })
            })
    }
}
