//! Linear algebra over GF(2) on the edge space of a graph.
//!
//! A cycle is represented by the set of its edges, one bit per edge. Two
//! cycles add by symmetric difference, so a set of cycles is independent when
//! no non-empty subset XORs to the empty set.

use std::ops::BitXorAssign;

const WORD_BITS: usize = u64::BITS as usize;

/// Bit set over edge indices `0..len`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct EdgeSet {
    words: Vec<u64>,
}

impl EdgeSet {
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
        }
    }

    pub fn from_edges(len: usize, edges: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::new(len);
        for edge in edges {
            set.toggle(edge);
        }
        set
    }

    pub fn toggle(&mut self, edge: usize) {
        self.words[edge / WORD_BITS] ^= 1 << (edge % WORD_BITS);
    }

    pub fn contains(&self, edge: usize) -> bool {
        self.words[edge / WORD_BITS] & (1 << (edge % WORD_BITS)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Lowest set edge index.
    pub fn first(&self) -> Option<usize> {
        self.words
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * WORD_BITS + w.trailing_zeros() as usize)
    }
}

impl BitXorAssign<&EdgeSet> for EdgeSet {
    fn bitxor_assign(&mut self, rhs: &EdgeSet) {
        for (a, b) in self.words.iter_mut().zip(&rhs.words) {
            *a ^= b;
        }
    }
}

/// Incrementally built basis of a cycle space, kept in echelon form.
///
/// Every stored row is reduced against all rows inserted before it, and its
/// pivot is its lowest set edge. A row therefore never contains the pivot of
/// an earlier row, which is what lets [`CycleBasis::insert`] reduce a
/// candidate with a single pass in insertion order.
#[derive(Debug, Clone, Default)]
pub(crate) struct CycleBasis {
    rows: Vec<(usize, EdgeSet)>,
}

impl CycleBasis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rank(&self) -> usize {
        self.rows.len()
    }

    /// Adds `cycle` if it is independent of the cycles accepted so far.
    ///
    /// # Return
    ///
    /// `true` if the rank grew.
    pub fn insert(&mut self, cycle: &EdgeSet) -> bool {
        let mut reduced = cycle.clone();
        for (pivot, row) in &self.rows {
            if reduced.contains(*pivot) {
                reduced ^= row;
            }
        }
        match reduced.first() {
            Some(pivot) => {
                self.rows.push((pivot, reduced));
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_set_spans_word_boundaries() {
        let mut set = EdgeSet::new(130);
        set.toggle(3);
        set.toggle(64);
        set.toggle(129);

        assert!(set.contains(64));
        assert!(!set.contains(63));
        assert_eq!(set.count(), 3);
        assert_eq!(set.first(), Some(3));

        set.toggle(3);
        assert_eq!(set.first(), Some(64));
        assert!(EdgeSet::new(10).is_empty());
        assert_eq!(EdgeSet::new(10).first(), None);
    }

    #[test]
    fn xor_is_symmetric_difference() {
        let mut a = EdgeSet::from_edges(8, [0, 1, 2]);
        let b = EdgeSet::from_edges(8, [2, 3]);
        a ^= &b;
        assert_eq!(a, EdgeSet::from_edges(8, [0, 1, 3]));
    }

    #[test]
    fn dependent_cycles_are_rejected() {
        // Two squares sharing edge 3, edges 0..=6:
        // left = {0,1,2,3}, right = {3,4,5,6}, outer = {0,1,2,4,5,6}.
        let left = EdgeSet::from_edges(7, [0, 1, 2, 3]);
        let right = EdgeSet::from_edges(7, [3, 4, 5, 6]);
        let outer = EdgeSet::from_edges(7, [0, 1, 2, 4, 5, 6]);

        let mut basis = CycleBasis::new();
        assert!(basis.insert(&left));
        assert!(basis.insert(&right));
        assert!(!basis.insert(&outer));
        assert!(!basis.insert(&left));
        assert_eq!(basis.rank(), 2);
    }

    #[test]
    fn reduction_handles_pivots_reintroduced_by_later_rows() {
        let mut basis = CycleBasis::new();
        assert!(basis.insert(&EdgeSet::from_edges(6, [0, 2])));
        assert!(basis.insert(&EdgeSet::from_edges(6, [1, 2])));
        // {0, 1} = {0, 2} + {1, 2}.
        assert!(!basis.insert(&EdgeSet::from_edges(6, [0, 1])));
        assert!(basis.insert(&EdgeSet::from_edges(6, [2, 5])));
        assert_eq!(basis.rank(), 3);
    }
}
