// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Top-down descent.
//!
//! Every lookup and edit runs the same loop: starting at the sentinel's
//! orbit, advance along a level while the [`Locator`] says so, then drop a
//! level, down to level 0. A [`Meter`] sums the distances of traversed edges
//! and a [`Tracker`] records the last node visited on each level (and, for a
//! gap, the meter reading there). Both are no-ops unless the caller needs
//! them. The descent itself never mutates the list.

use std::cmp::Ordering;

use smallvec::SmallVec;
use smallvec::smallvec;

use super::FacetList;
use super::HEAD;
use super::Hooks;
use super::Idx;
use super::NULL;
use crate::distance;
use crate::distance::Distance;

/// Per-level node handles.
type Path = SmallVec<[Idx; 16]>;

/// Records where the descent dropped a level.
pub(crate) enum Tracker {
    Off,
    /// Predecessor on each level.
    Section { nodes: Path },
    /// Predecessor on each level plus the vector position of it.
    Gap { nodes: Path, distances: Vec<Distance> },
}

impl Tracker {
    pub(crate) fn section(level_count: usize) -> Tracker {
        return Tracker::Section {
            nodes: smallvec![HEAD; level_count],
        };
    }

    pub(crate) fn gap(level_count: usize, width: usize) -> Tracker {
        return Tracker::Gap {
            nodes: smallvec![HEAD; level_count],
            distances: vec![distance::zero(width); level_count],
        };
    }

    fn set_next_node(&mut self, level: usize, node: Idx) {
        match self {
            Tracker::Off => {}
            Tracker::Section { nodes } | Tracker::Gap { nodes, .. } => nodes[level] = node,
        }
    }

    fn set_distance(&mut self, level: usize, value: &[i32], horizon: usize) {
        if let Tracker::Gap { distances, .. } = self {
            distance::set(&mut distances[level], value, horizon);
        }
    }

    /// Predecessor recorded for a level. The sentinel when not tracking.
    pub(crate) fn node(&self, level: usize) -> Idx {
        return match self {
            Tracker::Off => HEAD,
            Tracker::Section { nodes } | Tracker::Gap { nodes, .. } => nodes[level],
        };
    }

    /// Vector position recorded for a level. Empty unless this is a gap.
    pub(crate) fn distance(&self, level: usize) -> &[i32] {
        return match self {
            Tracker::Gap { distances, .. } => distances[level].as_slice(),
            _ => &[],
        };
    }
}

/// Accumulates the distance covered by the descent.
pub(crate) enum Meter {
    Off,
    /// Position within one view, starting before the first element.
    Scalar { filter: usize, position: i32 },
    /// Position within every view, counting up to the current node.
    Vector { position: Distance },
}

impl Meter {
    pub(crate) fn scalar(filter: usize) -> Meter {
        return Meter::Scalar { filter, position: -1 };
    }

    pub(crate) fn vector(width: usize) -> Meter {
        return Meter::Vector {
            position: distance::zero(width),
        };
    }

    fn add_distance(&mut self, edge: &[i32], horizon: usize) {
        match self {
            Meter::Off => {}
            Meter::Scalar { filter, position } => *position += edge.get(*filter).copied().unwrap_or(0),
            Meter::Vector { position } => distance::add(position, edge, horizon),
        }
    }

    fn mark(&self, tracker: &mut Tracker, level: usize, horizon: usize) {
        if let Meter::Vector { position } = self {
            tracker.set_distance(level, position, horizon);
        }
    }

    /// Vector reading, `None` when not measuring vectors.
    pub(crate) fn position(&self) -> Option<&[i32]> {
        return match self {
            Meter::Vector { position } => Some(position.as_slice()),
            _ => None,
        };
    }

    /// Scalar reading, -1 when not measuring a scalar.
    pub(crate) fn scalar_position(&self) -> i32 {
        return match self {
            Meter::Scalar { position, .. } => *position,
            _ => -1,
        };
    }
}

/// Stop condition of a descent.
pub(crate) enum Locator<'a, T> {
    /// Advance while the target sorts after the next element.
    Value {
        target: &'a T,
        comparison: Ordering,
        next: Idx,
    },
    /// Advance while the next edge ends before the target position in a view.
    Index {
        filter: usize,
        element_index: i32,
        lookup_index: i32,
        next_index: i32,
        next: Idx,
    },
    /// Advance until the next node is a known one.
    Exact { boundary: Idx, next: Idx },
}

impl<'a, T> Locator<'a, T> {
    pub(crate) fn value(target: &'a T) -> Locator<'a, T> {
        return Locator::Value {
            target,
            comparison: Ordering::Less,
            next: NULL,
        };
    }

    pub(crate) fn index(filter: usize, element_index: i32) -> Locator<'a, T> {
        return Locator::Index {
            filter,
            element_index,
            lookup_index: -1,
            next_index: -1,
            next: NULL,
        };
    }

    fn exact(boundary: Idx) -> Locator<'a, T> {
        return Locator::Exact { boundary, next: NULL };
    }

    fn has_next<H: Hooks<T>>(&mut self, list: &FacetList<T, H>, node: Idx, level: usize) -> bool {
        let following = list.next_of(node, level);
        return match self {
            Locator::Value {
                target,
                comparison,
                next,
            } => {
                *next = following;
                *comparison = match list.element(following) {
                    Some(element) => (list.comparator)(*target, element),
                    // the end of the chain sorts after everything
                    None => Ordering::Less,
                };
                *comparison == Ordering::Greater
            }
            Locator::Index {
                filter,
                element_index,
                lookup_index,
                next_index,
                next,
            } => {
                *next = following;
                *next_index = *lookup_index + list.distance_of(node, level).get(*filter).copied().unwrap_or(0);
                *element_index > *next_index
            }
            Locator::Exact { boundary, next } => {
                *next = following;
                *boundary != following
            }
        };
    }

    fn next(&mut self) -> Idx {
        return match self {
            Locator::Value { next, .. } | Locator::Exact { next, .. } => *next,
            Locator::Index {
                lookup_index,
                next_index,
                next,
                ..
            } => {
                *lookup_index = *next_index;
                *next
            }
        };
    }

    fn exact_match(&self) -> bool {
        return match self {
            Locator::Value { comparison, .. } => *comparison == Ordering::Equal,
            Locator::Index {
                element_index,
                next_index,
                ..
            } => element_index == next_index,
            Locator::Exact { .. } => true,
        };
    }

    /// Node the locator stopped in front of.
    fn found(&self) -> Idx {
        return match self {
            Locator::Value { next, .. } | Locator::Index { next, .. } | Locator::Exact { next, .. } => *next,
        };
    }
}

/// Descent state: the current node and level plus bookkeeping.
pub(crate) struct Navigator {
    pub(crate) node: Idx,
    pub(crate) level: usize,
    pub(crate) tracker: Tracker,
    pub(crate) meter: Meter,
}

impl Navigator {
    pub(crate) fn new<T, H>(list: &FacetList<T, H>, tracker: Tracker, meter: Meter) -> Navigator {
        return Navigator {
            node: HEAD,
            level: list.level_count - 1,
            tracker,
            meter,
        };
    }

    fn nav_forward<T, H: Hooks<T>>(&mut self, list: &FacetList<T, H>, locator: &mut Locator<'_, T>) -> bool {
        while locator.has_next(list, self.node, self.level) {
            self.meter.add_distance(list.distance_of(self.node, self.level), list.horizon);
            self.node = locator.next();
        }
        return locator.exact_match();
    }

    fn mark_level(&mut self, horizon: usize) {
        self.tracker.set_next_node(self.level, self.node);
        self.meter.mark(&mut self.tracker, self.level, horizon);
    }

    /// Run the descent down to level 0. With `stop_on_exact`, return true
    /// as soon as a level ends exactly at the target, leaving the lower
    /// levels unvisited.
    pub(crate) fn descend<T, H: Hooks<T>>(
        &mut self,
        list: &FacetList<T, H>,
        locator: &mut Locator<'_, T>,
        stop_on_exact: bool,
    ) -> bool {
        self.mark_level(list.horizon);
        while self.level > 0 {
            self.level -= 1;
            if self.nav_forward(list, locator) && stop_on_exact {
                return true;
            }
            self.mark_level(list.horizon);
        }
        return false;
    }

    /// Value descent that stops at an exact match when `stop_on_exact`.
    pub(crate) fn descend_value<T, H: Hooks<T>>(&mut self, list: &FacetList<T, H>, target: &T, stop_on_exact: bool) -> bool {
        let mut locator = Locator::value(target);
        return self.descend(list, &mut locator, stop_on_exact);
    }

    /// Find the first node equal to `target`, recording every level down to
    /// its predecessor. The sentinel when absent, with every level recorded
    /// down to where it would go.
    pub(crate) fn descend_to_value<T, H: Hooks<T>>(&mut self, list: &FacetList<T, H>, target: &T) -> Idx {
        let mut locator = Locator::value(target);
        if self.descend(list, &mut locator, true) {
            let found = locator.found();
            self.descend(list, &mut Locator::exact(found), false);
            return found;
        }
        return HEAD;
    }

    /// Index descent without bounds checks. Stops at the level-0
    /// predecessor of the target.
    pub(crate) fn descend_index<T, H: Hooks<T>>(&mut self, list: &FacetList<T, H>, filter: usize, index: i32) -> Idx {
        let mut locator = Locator::index(filter, index);
        self.descend(list, &mut locator, false);
        return list.next_of(self.node, 0);
    }

    /// The node at a position within a view, the sentinel when out of range.
    pub(crate) fn descend_to_index<T, H: Hooks<T>>(&mut self, list: &FacetList<T, H>, filter: usize, index: usize) -> Idx {
        if index >= list.size_of(filter) {
            return HEAD;
        }
        return self.descend_index(list, filter, index as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::builder::Builder;
    use crate::projector::Predicate;

    fn evens_and_odds() -> FacetList<u32> {
        let mut builder = Builder::new();
        builder.config_mut().seed = Some(11);
        builder.add_filter(Predicate::new(|n: &u32| n % 2 == 0)).unwrap();
        builder.add_filter(Predicate::new(|n: &u32| n % 2 == 1)).unwrap();
        let mut list = builder.create().unwrap();
        for n in 0..100 {
            list.add(n);
        }
        return list;
    }

    #[test]
    fn value_descent_records_predecessors() {
        let list = evens_and_odds();
        let mut navigator = Navigator::new(&list, Tracker::section(list.level_count), Meter::Off);
        let found = navigator.descend_to_value(&list, &42);
        assert_eq!(list.element(found), Some(&42));
        for level in 0..list.level_count {
            let prev = navigator.tracker.node(level);
            assert!(prev == HEAD || list.element(prev) < Some(&42));
            let next = list.next_of(prev, level);
            assert!(next == NULL || list.element(next) >= Some(&42));
        }
        assert_eq!(navigator.tracker.node(0), navigator.node);
        assert_eq!(list.element(navigator.node), Some(&41));
    }

    #[test]
    fn value_descent_misses_report_sentinel() {
        let list = evens_and_odds();
        let mut navigator = Navigator::new(&list, Tracker::section(list.level_count), Meter::Off);
        assert_eq!(navigator.descend_to_value(&list, &1000), HEAD);
        assert_eq!(list.element(navigator.tracker.node(0)), Some(&99));
    }

    #[test]
    fn vector_meter_counts_up_to_predecessor() {
        let list = evens_and_odds();
        let mut navigator = Navigator::new(&list, Tracker::gap(list.level_count, 3), Meter::vector(3));
        navigator.descend_to_value(&list, &10);
        // 0..=9 precede: ten elements, five even, five odd
        assert_eq!(navigator.meter.position(), Some(&[10, 5, 5][..]));
        for level in 0..list.level_count {
            assert!(navigator.tracker.distance(level)[0] <= 10);
        }
        assert_eq!(navigator.tracker.distance(0), &[10, 5, 5]);
    }

    #[test]
    fn index_descent_in_filtered_view() {
        let list = evens_and_odds();
        let mut navigator = Navigator::new(&list, Tracker::Off, Meter::scalar(0));
        let node = navigator.descend_to_index(&list, 2, 7);
        assert_eq!(list.element(node), Some(&15));
        // stopped on 14, the fifteenth element
        assert_eq!(navigator.meter.scalar_position(), 14);

        let mut navigator = Navigator::new(&list, Tracker::Off, Meter::Off);
        assert_eq!(navigator.descend_to_index(&list, 2, 50), HEAD);
    }
}
