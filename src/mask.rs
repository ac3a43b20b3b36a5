// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! A growable set of filter indices.

use bit_set::BitSet;

/// Set of filter indices.
///
/// Equality compares members only, so a mask that once held a high index
/// equals one that never did.
#[derive(Clone, Default)]
pub struct FilterMask(BitSet);

impl FilterMask {
    pub fn new() -> FilterMask {
        return FilterMask(BitSet::new());
    }

    /// A mask containing exactly the given indices.
    pub fn of(indices: &[usize]) -> FilterMask {
        return indices.iter().copied().collect();
    }

    /// A mask containing `start..end`.
    pub fn range(start: usize, end: usize) -> FilterMask {
        return (start..end).collect();
    }

    pub fn insert(&mut self, index: usize) {
        self.0.insert(index);
    }

    pub fn remove(&mut self, index: usize) {
        self.0.remove(index);
    }

    pub fn assign(&mut self, index: usize, value: bool) {
        if value {
            self.insert(index);
        } else {
            self.remove(index);
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        return self.0.contains(index);
    }

    /// Number of indices in the set.
    pub fn count(&self) -> usize {
        return self.0.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.0.is_empty();
    }

    /// One past the highest index in the set, zero when empty.
    pub fn span(&self) -> usize {
        return self.0.iter().last().map_or(0, |highest| highest + 1);
    }

    pub fn intersects(&self, other: &FilterMask) -> bool {
        return !self.0.is_disjoint(&other.0);
    }

    /// Remove every index that is in `other`.
    pub fn subtract(&mut self, other: &FilterMask) {
        self.0.difference_with(&other.0);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Indices in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        return self.0.iter();
    }

    pub fn to_vec(&self) -> Vec<usize> {
        return self.iter().collect();
    }
}

impl PartialEq for FilterMask {
    fn eq(&self, other: &FilterMask) -> bool {
        return self.iter().eq(other.iter());
    }
}

impl Eq for FilterMask {}

impl std::fmt::Debug for FilterMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f.debug_set().entries(self.iter()).finish();
    }
}

impl FromIterator<usize> for FilterMask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> FilterMask {
        let mut mask = FilterMask::new();
        for index in iter {
            mask.insert(index);
        }
        return mask;
    }
}
