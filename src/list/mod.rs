// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Facet List
//!
//! A sorted skip list that maintains many filtered views of its contents at
//! once. Every edge carries a distance vector with one counter per filter, so
//! positional lookups work in any view in O(horizon * log n).
//!
//! # Distance Semantics
//!
//! The edge leaving node X at level L counts, per filter, the elements in the
//! half-open interval `(X, next_L(X)]`. The edge to the end of the chain
//! counts everything that remains. So:
//!
//! - the predecessor's level-0 edge is an element's own projection
//! - summing any level's edges gives the view sizes
//! - the sentinel's top edge holds the view sizes directly
//!
//! ```text
//! orbit:   HEAD ------------------------------------> NULL   [3]
//! level 1: HEAD ------------> B ----------------> NULL        [2] [1]
//! level 0: HEAD --> A --> B --> C --> NULL                   [1] [1] [1] [0]
//! ```
//!
//! # Levels
//!
//! `level_count - 1` is the orbit, reserved for the sentinel. Real nodes stop
//! one below it. A node may only open a new level if the sentinel already
//! links the level below, so the height grows at most one level per
//! insertion.
//!
//! # Nodes
//!
//! Nodes live in an arena addressed by `u32` handles, with a free list for
//! reuse. The sentinel is always at index 0 and holds no element.

mod iter;
mod navigator;
mod refresh;
mod update;

use std::cmp::Ordering;
use std::rc::Rc;

use log::debug;
use log::warn;

use crate::builder::Config;
use crate::distance;
use crate::distance::Distance;
use crate::mask::FilterMask;
use crate::observer::ElementObserver;
use crate::observer::FnObserver;
use crate::observer::ObserverId;
use crate::observer::Observers;
use crate::projector::Projector;

pub use iter::Entries;
pub use iter::Traversal;
pub use iter::ViewIter;

use navigator::Meter;
use navigator::Navigator;
use navigator::Tracker;

/// Node handle. u32 saves space vs usize on 64-bit.
pub(crate) type Idx = u32;

/// Null handle marker.
pub(crate) const NULL: Idx = Idx::MAX;

/// The sentinel.
pub(crate) const HEAD: Idx = 0;

/// Index of the filter that accepts every element.
pub const UNIVERSE: usize = 0;

/// Element ordering.
pub type Comparator<T> = Rc<dyn Fn(&T, &T) -> Ordering>;

/// Tie-breaking policy of [`FacetList::convert_index_with`] for elements
/// missing from the target view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Position of the nearest lower neighbor in the target view.
    #[default]
    Floor,
    /// Position of the nearest higher neighbor in the target view.
    Ceiling,
}

pub(crate) struct Link {
    pub(crate) next: Idx,
    pub(crate) distance: Distance,
}

pub(crate) struct Node<T> {
    /// `None` for the sentinel and for free slots.
    pub(crate) element: Option<T>,
    /// One link per level the node participates in.
    pub(crate) links: Vec<Link>,
}

impl<T> Node<T> {
    fn new(element: Option<T>, level: usize, width: usize) -> Node<T> {
        let links = (0..=level)
            .map(|_| Link {
                next: NULL,
                distance: distance::zero(width),
            })
            .collect();
        return Node { element, links };
    }

    /// Highest level this node links.
    pub(crate) fn level(&self) -> usize {
        return self.links.len() - 1;
    }
}

/// Extension seam for list variants: filter evaluation and notification
/// handling run through here before anything reaches external observers.
pub trait Hooks<T> {
    /// Evaluate one filter for an element.
    fn accept(&self, projector: &Projector<T>, element: &T, filter: usize, precomputed: &[i32]) -> bool {
        return projector.accept(element, filter, precomputed);
    }

    /// Sees every notification, including bulk imports that external
    /// observers only see as a summary.
    fn on_element_updated(&mut self, _element: Option<&T>, _delta_sign: i32, _delta_count: &[i32], _horizon: usize) {}

    fn on_clear(&mut self) {}

    /// Members of the group headed by `element` that pass a filter.
    fn child_count(&self, _element: &T, _filter: usize) -> usize {
        return 0;
    }

    fn on_bulk_begin(&mut self) {}

    fn on_bulk_completed(&mut self) {}
}

/// No extra behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl<T> Hooks<T> for Plain {}

/// Sorted container with incrementally maintained filtered views.
pub struct FacetList<T, H = Plain> {
    nodes: Vec<Node<T>>,
    free_list: Vec<Idx>,
    level_count: usize,
    denominator: u32,
    filter_count: usize,
    /// Number of leading filters whose distances are maintained.
    horizon: usize,
    comparator: Comparator<T>,
    /// Takes effect on the next clear.
    pending_comparator: Comparator<T>,
    projector: Projector<T>,
    hooks: H,
    observers: Observers<T>,
    /// All zeros, reported as the position when positions are not measured.
    zero: Distance,
    allow_duplicates: bool,
    broadcast_old_value: bool,
    position_unaware: bool,
    auto_add: bool,
    /// While set, element notifications reach hooks only.
    muted: bool,
    bulk_depth: u32,
    rand_state: u64,
}

const DEFAULT_SEED: u64 = 0x12345678_9abcdef0;

impl<T, H: Hooks<T>> FacetList<T, H> {
    /// Assemble a list from a validated configuration and a frozen projector.
    pub(crate) fn from_parts(config: &Config, comparator: Comparator<T>, projector: Projector<T>, hooks: H) -> FacetList<T, H> {
        let filter_count = projector.filter_count();
        let horizon = projector.horizon();
        let level_count = config.level_count;
        let mut list = FacetList {
            nodes: Vec::new(),
            free_list: Vec::new(),
            level_count,
            denominator: config.denominator,
            filter_count,
            horizon,
            pending_comparator: Rc::clone(&comparator),
            comparator,
            projector,
            hooks,
            observers: Observers::new(),
            zero: distance::zero(filter_count),
            allow_duplicates: config.allow_duplicates,
            broadcast_old_value: config.broadcast_old_value,
            position_unaware: config.position_unaware,
            auto_add: config.auto_add,
            muted: false,
            bulk_depth: 0,
            rand_state: DEFAULT_SEED,
        };
        if let Some(seed) = config.seed {
            list.set_seed(seed);
        }
        list.nodes.push(Node::new(None, level_count - 1, filter_count));
        debug!(
            "created list with {} filters (horizon {}), {} levels, denominator {}",
            filter_count, horizon, level_count, config.denominator
        );
        return list;
    }

    // --- Settings ---

    pub fn filter_count(&self) -> usize {
        return self.filter_count;
    }

    pub fn horizon(&self) -> usize {
        return self.horizon;
    }

    pub fn level_count(&self) -> usize {
        return self.level_count;
    }

    pub fn set_allow_duplicates(&mut self, allow: bool) {
        self.allow_duplicates = allow;
    }

    /// When set, order-preserving reorder updates are reported as a removal
    /// of the old value followed by an insertion of the new one.
    pub fn set_broadcast_old_value(&mut self, broadcast: bool) {
        self.broadcast_old_value = broadcast;
    }

    /// When set, notifications report all-zero positions.
    pub fn set_position_unaware(&mut self, unaware: bool) {
        self.position_unaware = unaware;
    }

    /// When set, updates of a missing locator insert the edited locator.
    pub fn set_auto_add(&mut self, auto_add: bool) {
        self.auto_add = auto_add;
    }

    /// Reseed the level generator for repeatable layouts.
    pub fn set_seed(&mut self, seed: u64) {
        // xorshift never leaves zero
        self.rand_state = if seed == 0 { DEFAULT_SEED } else { seed };
    }

    /// Comparator to switch to on the next [`clear`](Self::clear) or
    /// [`set_all`](Self::set_all).
    pub fn set_comparator<F>(&mut self, comparator: F)
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        self.pending_comparator = Rc::new(comparator);
    }

    /// The comparator the contents are currently sorted by.
    pub fn comparator(&self) -> &Comparator<T> {
        return &self.comparator;
    }

    pub fn projector(&self) -> &Projector<T> {
        return &self.projector;
    }

    /// Filter editing. Substitutions only take effect on the stored views
    /// after [`refresh_filters`](Self::refresh_filters) with the returned
    /// dirty mask.
    pub fn projector_mut(&mut self) -> &mut Projector<T> {
        return &mut self.projector;
    }

    // --- Observers ---

    pub fn add_observer(&mut self, observer: Box<dyn ElementObserver<T>>) -> ObserverId {
        return self.observers.add(observer);
    }

    pub fn add_observer_fn<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(Option<&T>, &[i32], &[i32], i32, &[i32]) + 'static,
    {
        return self.observers.add(Box::new(FnObserver(observer)));
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        return self.observers.remove(id);
    }

    // --- Bulk hints ---

    /// Announce a run of modifications. Hooks may defer work until
    /// [`hint_bulk_completed`](Self::hint_bulk_completed).
    pub fn hint_bulk_begin(&mut self) {
        self.bulk_depth += 1;
        if self.bulk_depth > 1 {
            warn!("nested bulk hint (depth {})", self.bulk_depth);
            return;
        }
        self.hooks.on_bulk_begin();
    }

    pub fn hint_bulk_completed(&mut self) {
        match self.bulk_depth {
            0 => warn!("bulk completion without a matching begin"),
            1 => {
                self.bulk_depth = 0;
                self.hooks.on_bulk_completed();
            }
            _ => self.bulk_depth -= 1,
        }
    }

    // --- Node access helpers ---

    fn node(&self, idx: Idx) -> &Node<T> {
        return &self.nodes[idx as usize];
    }

    pub(crate) fn next_of(&self, idx: Idx, level: usize) -> Idx {
        return self.nodes[idx as usize].links[level].next;
    }

    pub(crate) fn distance_of(&self, idx: Idx, level: usize) -> &[i32] {
        return &self.nodes[idx as usize].links[level].distance;
    }

    pub(crate) fn level_of(&self, idx: Idx) -> usize {
        return self.node(idx).level();
    }

    /// Element stored at a handle. `None` for the sentinel and for `NULL`.
    pub(crate) fn element(&self, idx: Idx) -> Option<&T> {
        return self.nodes.get(idx as usize)?.element.as_ref();
    }

    fn alloc_node(&mut self, element: T, level: usize) -> Idx {
        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx as usize] = Node::new(Some(element), level, self.filter_count);
            return idx;
        }
        let idx = self.nodes.len() as Idx;
        self.nodes.push(Node::new(Some(element), level, self.filter_count));
        return idx;
    }

    fn release_node(&mut self, idx: Idx) -> Option<T> {
        let node = &mut self.nodes[idx as usize];
        node.links.clear();
        let element = node.element.take();
        self.free_list.push(idx);
        return element;
    }

    fn orbit(&self) -> usize {
        return self.level_count - 1;
    }

    fn next_random(&mut self) -> u64 {
        self.rand_state ^= self.rand_state << 13;
        self.rand_state ^= self.rand_state >> 7;
        self.rand_state ^= self.rand_state << 17;
        return self.rand_state;
    }

    /// Geometric level, capped below the orbit, opening at most one new level.
    fn random_level(&mut self) -> usize {
        let cloud = self.orbit() - 1;
        let denominator = self.denominator as u64;
        let mut level = 0;
        while level < cloud && self.next_random() % denominator == 0 {
            level += 1;
            if self.next_of(HEAD, level) == NULL {
                break;
            }
        }
        return level;
    }

    // --- Projection ---

    pub(crate) fn accept(&self, element: &T, filter: usize, precomputed: &[i32]) -> bool {
        return self.hooks.accept(&self.projector, element, filter, precomputed);
    }

    /// Membership vector of an element under the current filters.
    pub(crate) fn project(&self, element: &T) -> Distance {
        let mut target = distance::zero(self.filter_count);
        distance::project(&mut target, self.horizon, |filter, precomputed| {
            self.accept(element, filter, precomputed)
        });
        return target;
    }

    /// Comparison of a (possibly absent) value with the element at `next`.
    /// The sentinel and the end of the chain always compare as less.
    fn compare_with_next(&self, prev: Option<&T>, next: Idx) -> Ordering {
        return match (prev, self.element(next)) {
            (Some(prev), Some(next)) => (self.comparator)(prev, next),
            _ => Ordering::Less,
        };
    }

    // --- Notification ---

    /// Report a change to hooks, then to observers unless muted.
    fn notify(&mut self, idx: Option<Idx>, position: Option<&[i32]>, estimate: &[i32], delta_sign: i32, delta_count: &[i32]) {
        let element = idx.and_then(|idx| self.nodes.get(idx as usize)).and_then(|node| node.element.as_ref());
        self.hooks.on_element_updated(element, delta_sign, delta_count, self.horizon);
        if self.muted && element.is_some() {
            return;
        }
        let position = position.unwrap_or(&self.zero);
        self.observers.dispatch(element, position, estimate, delta_sign, delta_count);
    }

    /// Meter for operations that only need positions for reporting.
    fn reporting_meter(&self) -> Meter {
        if self.position_unaware || self.observers.is_empty() {
            return Meter::Off;
        }
        return Meter::vector(self.filter_count);
    }

    // --- Structural edits ---

    /// Apply `delta_sign * delta_count` to every edge on the recorded path.
    fn adjust_distance(&mut self, tracker: &Tracker, delta_sign: i32, delta_count: &[i32]) {
        if delta_sign == 0 || distance::is_zero(delta_count, self.horizon) {
            return;
        }
        for level in 0..self.level_count {
            let prev = tracker.node(level);
            let edge = &mut self.nodes[prev as usize].links[level].distance;
            distance::add_scaled(edge, delta_sign, delta_count, self.horizon);
        }
    }

    /// Splice a new node after the predecessors recorded by a gap tracker.
    /// `position` is the vector position of the level-0 predecessor.
    fn finish_addition(&mut self, element: T, projection: &[i32], tracker: &Tracker, position: &[i32]) {
        let horizon = self.horizon;
        let mut ceiling: Distance = Distance::from_slice(position);
        distance::add(&mut ceiling, projection, horizon);

        let node_level = self.random_level();
        let inserted = self.alloc_node(element, node_level);

        for level in 0..self.level_count {
            let prev = tracker.node(level);
            let link = &mut self.nodes[prev as usize].links[level];
            distance::add(&mut link.distance, projection, horizon);
            if level > node_level {
                continue;
            }
            // split the grown edge at the new node
            let mut before = ceiling.clone();
            distance::sub(&mut before, tracker.distance(level), horizon);
            let mut after = link.distance.clone();
            distance::sub(&mut after, &before, horizon);
            let next = link.next;
            link.next = inserted;
            link.distance = before;

            let own = &mut self.nodes[inserted as usize].links[level];
            own.next = next;
            own.distance = after;
        }
        self.notify(Some(inserted), Some(position), projection, 1, projection);
    }

    /// Unlink a node at every level where the recorded predecessor points at
    /// it, merging its edges into the predecessors'.
    fn finish_removal(&mut self, tracker: &Tracker, container: Idx) {
        let horizon = self.horizon;
        for level in (0..self.level_count).rev() {
            let prev = tracker.node(level);
            if self.next_of(prev, level) != container {
                continue;
            }
            let Some(link) = self.nodes[container as usize].links.get(level) else {
                continue;
            };
            let next = link.next;
            let merged = link.distance.clone();
            let edge = &mut self.nodes[prev as usize].links[level];
            distance::add(&mut edge.distance, &merged, horizon);
            edge.next = next;
        }
    }

    fn remove_at_section(&mut self, tracker: &Tracker, container: Idx, meter: &Meter) -> Option<T> {
        if container == HEAD {
            return None;
        }
        let old_edge: Distance = Distance::from_slice(self.distance_of(tracker.node(0), 0));
        self.adjust_distance(tracker, -1, &old_edge);
        self.finish_removal(tracker, container);
        self.notify(Some(container), meter.position(), &old_edge, -1, &old_edge);
        return self.release_node(container);
    }

    fn add_precomputed(&mut self, element: T, projection: &[i32]) -> bool {
        let mut navigator = Navigator::new(self, Tracker::gap(self.level_count, self.filter_count), Meter::vector(self.filter_count));
        if navigator.descend_value(self, &element, !self.allow_duplicates) {
            return false;
        }
        let position = navigator.meter.position().map(Distance::from_slice).unwrap_or_else(|| self.zero.clone());
        self.finish_addition(element, projection, &navigator.tracker, &position);
        return true;
    }

    // --- Public operations ---

    /// Number of elements.
    pub fn size(&self) -> usize {
        return self.size_of(UNIVERSE);
    }

    pub fn is_empty(&self) -> bool {
        return self.size() == 0;
    }

    /// Number of elements passing a filter. Zero for unknown filters.
    pub fn size_of(&self, filter: usize) -> usize {
        return self.size_i32(filter).max(0) as usize;
    }

    pub(crate) fn size_i32(&self, filter: usize) -> i32 {
        return self.distance_of(HEAD, self.orbit()).get(filter).copied().unwrap_or(0);
    }

    /// Insert an element at its sorted position. Returns false, dropping the
    /// element, if an equal one exists and duplicates are not allowed.
    pub fn add(&mut self, element: T) -> bool {
        let projection = self.project(&element);
        return self.add_precomputed(element, &projection);
    }

    /// Remove an element comparing equal to `element`.
    pub fn remove(&mut self, element: &T) -> Option<T> {
        let mut navigator = Navigator::new(self, Tracker::section(self.level_count), self.reporting_meter());
        let container = navigator.descend_to_value(self, element);
        return self.remove_at_section(&navigator.tracker, container, &navigator.meter);
    }

    /// Remove the element at a position within a view.
    pub fn remove_at(&mut self, filter: usize, index: usize) -> Option<T> {
        let mut navigator = Navigator::new(self, Tracker::section(self.level_count), self.reporting_meter());
        let container = navigator.descend_to_index(self, filter, index);
        return self.remove_at_section(&navigator.tracker, container, &navigator.meter);
    }

    /// Element at a position within a view.
    pub fn get(&self, filter: usize, index: usize) -> Option<&T> {
        let mut navigator = Navigator::new(self, Tracker::Off, Meter::Off);
        let node = navigator.descend_to_index(self, filter, index);
        return self.element(node);
    }

    /// Position of an element equal to `element` within a view, if it
    /// is present and passes the filter.
    pub fn index_of(&self, filter: usize, element: &T) -> Option<usize> {
        let mut navigator = Navigator::new(self, Tracker::Off, Meter::scalar(filter));
        let container = navigator.descend_to_value(self, element);
        if container == HEAD {
            return None;
        }
        let projection = self.distance_of(navigator.node, 0).get(filter).copied().unwrap_or(0);
        if projection == 0 {
            return None;
        }
        return Some((navigator.meter.scalar_position() + projection) as usize);
    }

    /// Convert a position in view `source` to a position in view `target`,
    /// rounding down for elements missing from the target.
    pub fn convert_index(&self, index: isize, source: usize, target: usize) -> isize {
        return self.convert_index_with(index, source, target, Rounding::Floor);
    }

    /// Convert a position in view `source` to a position in view `target`.
    ///
    /// Negative positions map to -1 and positions past the source view map
    /// to the size of the target view. Same-view conversion is the identity.
    pub fn convert_index_with(&self, index: isize, source: usize, target: usize, rounding: Rounding) -> isize {
        if source == target {
            return index;
        }
        if index < 0 {
            return -1;
        }
        if index >= self.size_i32(source) as isize {
            return self.size_i32(target) as isize;
        }
        let mut navigator = Navigator::new(self, Tracker::Off, Meter::scalar(target));
        navigator.descend_index(self, source, index as i32);
        let projection = self.distance_of(navigator.node, 0).get(target).copied().unwrap_or(0);
        let step = match rounding {
            Rounding::Floor => projection,
            Rounding::Ceiling => 1,
        };
        return (navigator.meter.scalar_position() + step) as isize;
    }

    /// Drop every element at once. Observers receive a single notification
    /// with no element and the old view sizes in both vectors. The pending
    /// comparator and the current filter horizon take effect.
    pub fn clear(&mut self) {
        let sizes: Distance = Distance::from_slice(self.distance_of(HEAD, self.orbit()));
        self.comparator = Rc::clone(&self.pending_comparator);
        self.horizon = self.projector.horizon();
        self.nodes.clear();
        self.free_list.clear();
        self.nodes.push(Node::new(None, self.level_count - 1, self.filter_count));
        self.hooks.on_clear();
        debug!("cleared {} elements, horizon {}", sizes.first().copied().unwrap_or(0), self.horizon);
        self.notify(None, None, &sizes, -1, &sizes);
    }

    // --- Crate internals for list variants ---

    pub(crate) fn hooks(&self) -> &H {
        return &self.hooks;
    }

    pub(crate) fn hooks_mut(&mut self) -> &mut H {
        return &mut self.hooks;
    }

    /// Feed every element to the hooks as a fresh insertion.
    pub(crate) fn replay_into_hooks(&mut self) {
        let mut prev = HEAD;
        let mut node = self.next_of(HEAD, 0);
        while node != NULL {
            let element = self.nodes[node as usize].element.as_ref();
            let projection = &self.nodes[prev as usize].links[0].distance;
            self.hooks.on_element_updated(element, 1, projection, self.horizon);
            prev = node;
            node = self.next_of(node, 0);
        }
    }

    /// Filters whose distances are stale after a projector edit.
    pub(crate) fn all_filters(&self) -> FilterMask {
        return FilterMask::range(UNIVERSE + 1, self.filter_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::builder::Builder;
    use crate::projector::Predicate;

    fn letters() -> FacetList<char> {
        let mut builder = Builder::new();
        builder.config_mut().allow_duplicates = true;
        builder.config_mut().seed = Some(7);
        let mut list = builder.create().unwrap();
        for c in 'A'..='Z' {
            assert!(list.add(c));
        }
        list.validate_integrity().unwrap();
        return list;
    }

    #[test]
    fn sentinel_top_edge_holds_sizes() {
        let list = letters();
        assert_eq!(list.distance_of(HEAD, list.orbit())[0], 26);
        assert_eq!(list.next_of(HEAD, list.orbit()), NULL);
        assert_eq!(list.size(), 26);
    }

    #[test]
    fn level_zero_edges_are_projections() {
        let list = letters();
        let mut node = HEAD;
        let mut count = 0;
        while list.next_of(node, 0) != NULL {
            assert_eq!(list.distance_of(node, 0)[0], 1);
            node = list.next_of(node, 0);
            count += 1;
        }
        assert_eq!(count, 26);
        assert_eq!(list.distance_of(node, 0)[0], 0);
    }

    #[test]
    fn levels_stay_below_orbit() {
        let mut builder = Builder::new();
        builder.config_mut().level_count = 4;
        builder.config_mut().denominator = 2;
        let mut list = builder.create().unwrap();
        for n in 0..500 {
            list.add(n);
        }
        let mut node = list.next_of(HEAD, 0);
        while node != NULL {
            assert!(list.level_of(node) <= 2);
            node = list.next_of(node, 0);
        }
        list.validate_integrity().unwrap();
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut list = letters();
        let slots = list.nodes.len();
        assert_eq!(list.remove(&'Q'), Some('Q'));
        assert_eq!(list.free_list.len(), 1);
        list.add('q');
        assert_eq!(list.nodes.len(), slots);
        assert!(list.free_list.is_empty());
        list.validate_integrity().unwrap();
    }

    #[test]
    fn hopeless_filters_stay_zero() {
        let mut builder = Builder::new();
        builder.add_filter(Predicate::new(|c: &char| c.is_ascii_uppercase())).unwrap();
        builder.add_filter(Predicate::Placeholder).unwrap();
        let mut list = builder.create().unwrap();
        assert_eq!(list.horizon(), 2);
        for c in "aBcD".chars() {
            list.add(c);
        }
        assert_eq!(list.size_of(1), 2);
        assert_eq!(list.size_of(2), 0);
        assert_eq!(list.size_of(9), 0);
        assert_eq!(list.get(2, 0), None);
    }
}
