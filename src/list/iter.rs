// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Iteration over a view.
//!
//! Three traversals, picked by how selective the filter is:
//!
//! - cherry: a positional lookup per element, for views shorter than the
//!   list is tall
//! - ladder: skips runs of rejected elements by riding the highest level
//!   whose edges are still likely to be empty
//! - walker: steps along level 0 and tests each edge, for dense views

use super::FacetList;
use super::HEAD;
use super::Hooks;
use super::Idx;
use super::NULL;
use super::UNIVERSE;

/// Traversal used by a [`ViewIter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Cherry,
    Ladder,
    Walker,
}

enum Strategy {
    Cherry,
    Walker,
    Ladder { level: usize, best: usize },
}

/// Elements of one view in order.
pub struct ViewIter<'a, T, H> {
    list: &'a FacetList<T, H>,
    filter: usize,
    strategy: Strategy,
    node: Idx,
    returned: usize,
    total: usize,
}

impl<'a, T, H: Hooks<T>> ViewIter<'a, T, H> {
    fn new(list: &'a FacetList<T, H>, filter: usize, strategy: Strategy) -> ViewIter<'a, T, H> {
        return ViewIter {
            list,
            filter,
            strategy,
            node: HEAD,
            returned: 0,
            total: list.size_of(filter),
        };
    }

    pub fn traversal(&self) -> Traversal {
        return match self.strategy {
            Strategy::Cherry => Traversal::Cherry,
            Strategy::Walker => Traversal::Walker,
            Strategy::Ladder { .. } => Traversal::Ladder,
        };
    }

    fn step(&self, node: Idx, level: usize) -> i32 {
        return self.list.distance_of(node, level).get(self.filter).copied().unwrap_or(0);
    }

    fn next_walker(&mut self) -> Idx {
        loop {
            let step = self.step(self.node, 0);
            self.node = self.list.next_of(self.node, 0);
            if self.node == NULL || step != 0 {
                return self.node;
            }
        }
    }

    fn next_ladder(&mut self, mut level: usize, best: usize) -> Idx {
        let mut node = self.node;
        while self.step(node, 0) == 0 {
            while level > 0 && self.step(node, level) != 0 {
                level -= 1;
            }
            node = self.list.next_of(node, level);
            if node == NULL {
                return NULL;
            }
        }
        node = self.list.next_of(node, 0);
        if node != NULL {
            self.strategy = Strategy::Ladder {
                level: best.min(self.list.level_of(node)),
                best,
            };
        }
        self.node = node;
        return node;
    }
}

impl<'a, T, H: Hooks<T>> Iterator for ViewIter<'a, T, H> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.returned >= self.total {
            return None;
        }
        let list = self.list;
        let element = match self.strategy {
            Strategy::Cherry => list.get(self.filter, self.returned),
            Strategy::Walker => {
                let node = self.next_walker();
                list.element(node)
            }
            Strategy::Ladder { level, best } => {
                let node = self.next_ladder(level, best);
                list.element(node)
            }
        };
        if element.is_none() {
            self.returned = self.total;
            return None;
        }
        self.returned += 1;
        return element;
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.returned;
        return (remaining, Some(remaining));
    }
}

impl<'a, T, H: Hooks<T>> ExactSizeIterator for ViewIter<'a, T, H> {}

/// Every element with its stored projection, in order.
pub struct Entries<'a, T, H> {
    list: &'a FacetList<T, H>,
    prev: Idx,
}

impl<'a, T, H: Hooks<T>> Iterator for Entries<'a, T, H> {
    type Item = (&'a T, &'a [i32]);

    fn next(&mut self) -> Option<(&'a T, &'a [i32])> {
        let list = self.list;
        let node = list.next_of(self.prev, 0);
        let element = list.element(node)?;
        let projection = list.distance_of(self.prev, 0);
        self.prev = node;
        return Some((element, projection));
    }
}

impl<T, H: Hooks<T>> FacetList<T, H> {
    /// Iterate a view with the traversal suited to its selectivity.
    pub fn iter(&self, filter: usize) -> ViewIter<'_, T, H> {
        let selected = self.size_of(filter);
        if selected < self.level_count {
            return self.cherry_iter(filter);
        }
        if selected < self.size() / self.denominator as usize {
            return self.ladder_iter(filter);
        }
        return self.walker_iter(filter);
    }

    pub fn cherry_iter(&self, filter: usize) -> ViewIter<'_, T, H> {
        return ViewIter::new(self, filter, Strategy::Cherry);
    }

    pub fn walker_iter(&self, filter: usize) -> ViewIter<'_, T, H> {
        return ViewIter::new(self, filter, Strategy::Walker);
    }

    /// Ladder traversal. The resting level is the highest one at which an
    /// edge is expected to span fewer than one selected element.
    pub fn ladder_iter(&self, filter: usize) -> ViewIter<'_, T, H> {
        let total = self.size_of(UNIVERSE) as u64;
        let denominator = self.denominator as u64;
        let mut selected = self.size_of(filter) as u64;
        let mut best = 0;
        while best < self.orbit() {
            selected = selected.saturating_mul(denominator);
            if selected >= total {
                break;
            }
            best += 1;
        }
        return ViewIter::new(self, filter, Strategy::Ladder { level: best, best });
    }

    /// Elements paired with their projections, as used for bulk import.
    pub fn entries(&self) -> Entries<'_, T, H> {
        return Entries { list: self, prev: HEAD };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::builder::Builder;
    use crate::projector::Predicate;

    fn numbers(count: u32) -> FacetList<u32> {
        let mut builder = Builder::new();
        builder.config_mut().seed = Some(3);
        builder.add_filter(Predicate::new(|n: &u32| n % 100 == 0)).unwrap();
        builder.add_filter(Predicate::new(|n: &u32| n % 2 == 0)).unwrap();
        builder.add_filter(Predicate::new(|n: &u32| n % 7 == 3)).unwrap();
        let mut list = builder.create().unwrap();
        for n in 0..count {
            list.add(n);
        }
        return list;
    }

    #[test]
    fn strategies_agree() {
        let list = numbers(1000);
        for filter in 0..4 {
            let expected: Vec<u32> = (0..1000u32)
                .filter(|n| match filter {
                    0 => true,
                    1 => n % 100 == 0,
                    2 => n % 2 == 0,
                    _ => n % 7 == 3,
                })
                .collect();
            let cherry: Vec<u32> = list.cherry_iter(filter).copied().collect();
            let ladder: Vec<u32> = list.ladder_iter(filter).copied().collect();
            let walker: Vec<u32> = list.walker_iter(filter).copied().collect();
            assert_eq!(cherry, expected);
            assert_eq!(ladder, expected);
            assert_eq!(walker, expected);
        }
    }

    #[test]
    fn policy_follows_selectivity() {
        let list = numbers(1000);
        // ten selected, fewer than the fifteen levels
        assert_eq!(list.iter(1).traversal(), Traversal::Cherry);
        // 143 selected, under a third of the list
        assert_eq!(list.iter(3).traversal(), Traversal::Ladder);
        assert_eq!(list.iter(2).traversal(), Traversal::Walker);
        assert_eq!(list.iter(0).traversal(), Traversal::Walker);
    }

    #[test]
    fn exact_size() {
        let list = numbers(300);
        let mut iter = list.iter(2);
        assert_eq!(iter.len(), 150);
        iter.next();
        assert_eq!(iter.len(), 149);
        assert_eq!(list.iter(1).len(), 3);
    }

    #[test]
    fn empty_views() {
        let list = numbers(0);
        for filter in 0..4 {
            assert_eq!(list.ladder_iter(filter).next(), None);
            assert_eq!(list.walker_iter(filter).next(), None);
            assert_eq!(list.cherry_iter(filter).next(), None);
        }
        assert_eq!(list.entries().count(), 0);
    }

    #[test]
    fn entries_carry_projections() {
        let list = numbers(10);
        let entries: Vec<(u32, Vec<i32>)> = list.entries().map(|(n, p)| (*n, p.to_vec())).collect();
        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0], (0, vec![1, 1, 1, 0]));
        assert_eq!(entries[3], (3, vec![1, 0, 0, 1]));
        assert_eq!(entries[4], (4, vec![1, 0, 1, 0]));
    }
}
