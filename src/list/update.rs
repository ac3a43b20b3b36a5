// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Value updates.
//!
//! Three contracts, from cheapest to most general. Each takes a locator that
//! compares equal to the stored element and a modification that edits the
//! element and reports whether it changed anything:
//!
//! - [`update_in_place`](FacetList::update_in_place): neither order nor
//!   membership changes. Only a notification is emitted.
//! - [`update_filters`](FacetList::update_filters): order holds, membership
//!   may change. The projection is recomputed and the difference applied to
//!   the search path.
//! - [`update_reorder`](FacetList::update_reorder): nothing is assumed. If
//!   the edited element no longer fits between its neighbors it is unlinked
//!   and inserted again.
//!
//! With auto-add on, a locator that matches nothing is edited itself and
//! inserted.

use std::cmp::Ordering;

use log::warn;

use super::FacetList;
use super::HEAD;
use super::Hooks;
use super::Idx;
use super::navigator::Meter;
use super::navigator::Navigator;
use super::navigator::Tracker;
use crate::distance;
use crate::distance::Distance;

impl<T, H: Hooks<T>> FacetList<T, H> {
    /// Auto-add needs predecessors and positions for a splice.
    fn update_navigator(&self) -> Navigator {
        if self.auto_add {
            let tracker = Tracker::gap(self.level_count, self.filter_count);
            return Navigator::new(self, tracker, Meter::vector(self.filter_count));
        }
        return Navigator::new(self, Tracker::section(self.level_count), self.reporting_meter());
    }

    /// Position of the level-0 predecessor, zeros if not measured.
    fn splice_position(&self, navigator: &Navigator) -> Distance {
        return match navigator.meter.position() {
            Some(position) => Distance::from_slice(position),
            None => self.zero.clone(),
        };
    }

    fn modify_at<F>(&mut self, container: Idx, modification: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        return match self.nodes[container as usize].element.as_mut() {
            Some(element) => modification(element),
            None => false,
        };
    }

    fn project_at_node(&self, container: Idx) -> Distance {
        return match self.element(container) {
            Some(element) => self.project(element),
            None => self.zero.clone(),
        };
    }

    /// Edit a missing locator and splice it where the descent ended.
    fn insert_edited<F>(&mut self, mut locator: T, modification: F, navigator: &Navigator) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        modification(&mut locator);
        let projection = self.project(&locator);
        let position = self.splice_position(navigator);
        self.finish_addition(locator, &projection, &navigator.tracker, &position);
        return true;
    }

    /// Modify an element without touching order or membership.
    ///
    /// Observers see `delta_sign == 0` with the element's projection as the
    /// change estimate. Returns what the modification returned, false if the
    /// locator matches nothing. Nothing is reported when the modification
    /// returns false.
    pub fn update_in_place<F>(&mut self, locator: T, modification: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let mut navigator = self.update_navigator();
        let container = navigator.descend_to_value(self, &locator);
        if container == HEAD {
            if self.auto_add {
                return self.insert_edited(locator, modification, &navigator);
            }
            return false;
        }

        if !self.modify_at(container, modification) {
            return false;
        }
        let estimate: Distance = Distance::from_slice(self.distance_of(navigator.tracker.node(0), 0));
        let zero = self.zero.clone();
        self.notify(Some(container), navigator.meter.position(), &estimate, 0, &zero);
        return true;
    }

    /// Modify an element whose order is unchanged but whose filter
    /// membership may change. Observers see `delta_sign == 1` with the new
    /// minus the old projection, unless the modification returns false.
    pub fn update_filters<F>(&mut self, locator: T, modification: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let mut navigator = self.update_navigator();
        let container = navigator.descend_to_value(self, &locator);
        if container == HEAD {
            if self.auto_add {
                return self.insert_edited(locator, modification, &navigator);
            }
            return false;
        }
        return self.commit_filters(&navigator, container, modification);
    }

    /// [`update_filters`](Self::update_filters) addressed by position within
    /// a view.
    pub fn update_filters_at<F>(&mut self, filter: usize, index: usize, modification: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let mut navigator = Navigator::new(self, Tracker::section(self.level_count), self.reporting_meter());
        let container = navigator.descend_to_index(self, filter, index);
        if container == HEAD {
            return false;
        }
        return self.commit_filters(&navigator, container, modification);
    }

    fn commit_filters<F>(&mut self, navigator: &Navigator, container: Idx, modification: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let horizon = self.horizon;
        let old: Distance = Distance::from_slice(self.distance_of(navigator.tracker.node(0), 0));
        if !self.modify_at(container, modification) {
            return false;
        }
        let new = self.project_at_node(container);

        let mut delta = new.clone();
        distance::sub(&mut delta, &old, horizon);
        let mut estimate = new;
        distance::add(&mut estimate, &old, horizon);

        self.adjust_distance(&navigator.tracker, 1, &delta);
        self.notify(Some(container), navigator.meter.position(), &estimate, 1, &delta);
        return true;
    }

    /// Modify an element with no guarantees. If the edited element still
    /// sorts between its neighbors it stays put, otherwise it is removed and
    /// added again, which is dropped with a warning if it now collides with
    /// an equal element and duplicates are off.
    ///
    /// With broadcast of old values on, observers see the old projection
    /// leave before the new one arrives. Otherwise an in-place change is a
    /// single notification carrying the difference, and a move reports its
    /// removal after the modification, so that notification carries the
    /// edited value.
    pub fn update_reorder<F>(&mut self, locator: T, modification: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let mut navigator = self.update_navigator();
        let container = navigator.descend_to_value(self, &locator);
        if container == HEAD {
            if self.auto_add {
                return self.insert_reordered(locator, modification, &navigator);
            }
            return false;
        }

        let horizon = self.horizon;
        let broadcast = self.broadcast_old_value;
        let tracker = &navigator.tracker;
        let position = navigator.meter.position();
        let prev = tracker.node(0);

        let old_edge: Distance = Distance::from_slice(self.distance_of(prev, 0));
        self.adjust_distance(tracker, -1, &old_edge);
        if broadcast {
            self.notify(Some(container), position, &old_edge, -1, &old_edge);
        }

        let modified = self.modify_at(container, modification);
        let next = self.next_of(container, 0);
        let misplaced = modified
            && (self.compare_with_next(self.element(prev), container) == Ordering::Greater
                || self.compare_with_next(self.element(container), next) == Ordering::Greater);

        if misplaced {
            if !broadcast {
                self.notify(Some(container), position, &old_edge, -1, &old_edge);
            }
            self.finish_removal(tracker, container);
            if let Some(element) = self.release_node(container) {
                if !self.add(element) {
                    warn!("reordered element collides with an existing one and was dropped");
                }
            }
            return true;
        }

        let mut projection = self.project_at_node(container);
        self.adjust_distance(tracker, 1, &projection);
        if !broadcast {
            distance::sub(&mut projection, &old_edge, horizon);
        }
        self.notify(Some(container), position, &projection, 1, &projection);
        return modified;
    }

    /// Auto-add for reordering updates: the edited locator may no longer
    /// belong where the descent ended.
    fn insert_reordered<F>(&mut self, mut locator: T, modification: F, navigator: &Navigator) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let modified = modification(&mut locator);
        let prev = navigator.tracker.node(0);
        let before_prev = prev != HEAD
            && self
                .element(prev)
                .is_some_and(|prev| (self.comparator)(&locator, prev) == Ordering::Less);
        let misplaced = modified
            && (before_prev || self.compare_with_next(Some(&locator), self.next_of(prev, 0)) == Ordering::Greater);
        if misplaced {
            return self.add(locator);
        }
        let projection = self.project(&locator);
        let position = self.splice_position(navigator);
        self.finish_addition(locator, &projection, &navigator.tracker, &position);
        return true;
    }
}
