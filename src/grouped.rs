// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Grouped lists
//!
//! A [`Classifier`] sorts elements into groups, each represented in the list
//! by a header element that the classifier can recognize and synthesize. The
//! list keeps a per-group aggregate: the sum of the projections of the
//! group's members. A header passes a filter when any member does, unless
//! the filter is flagged to be computed on headers directly. The head-item
//! filter (index 1) selects the headers themselves.
//!
//! Header upkeep happens after the element change that caused it, inside the
//! same call: a new group gets its header inserted, a known group gets its
//! header's filters refreshed. Inside a bulk hint the work is collected and
//! done once per group when the hint completes.
//!
//! Aggregates are never pruned. A group that loses its last member keeps its
//! header in the head-item view, where it fails every aggregate-driven
//! filter including the universe.

use std::hash::Hash;
use std::mem;
use std::ops::Deref;
use std::rc::Rc;

use log::debug;
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::builder::HEAD_ITEM;
use crate::distance;
use crate::distance::Distance;
use crate::error::Result;
use crate::list::FacetList;
use crate::list::Hooks;
use crate::mask::FilterMask;
use crate::observer::ElementObserver;
use crate::observer::ObserverId;
use crate::projector::Projector;

/// Assigns elements to groups.
///
/// The comparator of the list must sort each header so that updating it by
/// value finds it again, typically right before the group's members.
pub trait Classifier<T> {
    type Key: Eq + Hash + Clone;

    fn is_header(&self, element: &T) -> bool;

    /// Synthesize the header of a group.
    fn header(&self, key: &Self::Key) -> T;

    fn key_of_header(&self, header: &T) -> Self::Key;

    /// Groups of a non-header element. May be empty.
    fn classify(&self, element: &T) -> SmallVec<[Self::Key; 2]>;
}

/// Hooks that maintain group aggregates and queue header upkeep.
pub struct Grouping<K, C> {
    classifier: Rc<C>,
    aggregates: FxHashMap<K, Distance>,
    delay: bool,
    pending: Vec<K>,
    queued: FxHashSet<K>,
    /// Groups changed while a bulk hint is active.
    touched: FxHashSet<K>,
}

impl<K: Eq + Hash + Clone, C> Grouping<K, C> {
    pub(crate) fn new(classifier: Rc<C>) -> Grouping<K, C> {
        return Grouping {
            classifier,
            aggregates: FxHashMap::default(),
            delay: false,
            pending: Vec::new(),
            queued: FxHashSet::default(),
            touched: FxHashSet::default(),
        };
    }

    fn queue(&mut self, key: K) {
        if self.queued.insert(key.clone()) {
            self.pending.push(key);
        }
    }

    fn take_pending(&mut self) -> Vec<K> {
        self.queued.clear();
        return mem::take(&mut self.pending);
    }

    fn reset(&mut self) {
        self.aggregates.clear();
        self.pending.clear();
        self.queued.clear();
        self.touched.clear();
    }

    /// Summed projections of a group's members.
    pub fn aggregate(&self, key: &K) -> Option<&[i32]> {
        return self.aggregates.get(key).map(|aggregate| aggregate.as_slice());
    }

    /// Number of groups seen since the last reclassification or clear.
    pub fn group_count(&self) -> usize {
        return self.aggregates.len();
    }
}

impl<T, K, C> Hooks<T> for Grouping<K, C>
where
    K: Eq + Hash + Clone,
    C: Classifier<T, Key = K>,
{
    fn accept(&self, projector: &Projector<T>, element: &T, filter: usize, precomputed: &[i32]) -> bool {
        if filter == HEAD_ITEM {
            return self.classifier.is_header(element);
        }
        if projector.should_compute_for_group(filter) || !self.classifier.is_header(element) {
            return projector.accept(element, filter, precomputed);
        }
        let key = self.classifier.key_of_header(element);
        return self
            .aggregates
            .get(&key)
            .is_some_and(|aggregate| aggregate.get(filter).is_some_and(|&count| count > 0));
    }

    fn on_element_updated(&mut self, element: Option<&T>, delta_sign: i32, delta_count: &[i32], horizon: usize) {
        let Some(element) = element else {
            return;
        };
        if delta_sign == 0 || distance::is_zero(delta_count, horizon) || self.classifier.is_header(element) {
            return;
        }
        for key in self.classifier.classify(element) {
            let aggregate = self
                .aggregates
                .entry(key.clone())
                .or_insert_with(|| distance::zero(delta_count.len()));
            distance::add_scaled(aggregate, delta_sign, delta_count, horizon);
            if self.delay {
                self.touched.insert(key);
            } else {
                self.queue(key);
            }
        }
    }

    fn on_clear(&mut self) {
        self.reset();
    }

    fn child_count(&self, header: &T, filter: usize) -> usize {
        if !self.classifier.is_header(header) {
            return 0;
        }
        let key = self.classifier.key_of_header(header);
        return match self.aggregate(&key).and_then(|aggregate| aggregate.get(filter)) {
            Some(&count) => count.max(0) as usize,
            None => 0,
        };
    }

    fn on_bulk_begin(&mut self) {
        self.delay = true;
    }

    fn on_bulk_completed(&mut self) {
        self.delay = false;
        let touched: Vec<K> = self.touched.drain().collect();
        debug!("flushing {} touched groups", touched.len());
        for key in touched {
            self.queue(key);
        }
    }
}

/// The list a [`GroupedList`] wraps.
pub type Inner<T, C> = FacetList<T, Grouping<<C as Classifier<T>>::Key, C>>;

/// A list whose elements are gathered under group headers.
///
/// Reads go through `Deref` to the underlying [`FacetList`]. Every mutation
/// goes through this type so header upkeep follows it.
pub struct GroupedList<T, C: Classifier<T>> {
    list: Inner<T, C>,
}

impl<T, C: Classifier<T>> Deref for GroupedList<T, C> {
    type Target = Inner<T, C>;

    fn deref(&self) -> &Inner<T, C> {
        return &self.list;
    }
}

impl<T, C: Classifier<T>> GroupedList<T, C> {
    pub(crate) fn from_list(list: Inner<T, C>) -> GroupedList<T, C> {
        return GroupedList { list };
    }

    pub fn classifier(&self) -> &C {
        return &self.list.hooks().classifier;
    }

    /// Insert or refresh the headers of every group queued so far.
    fn maintain_headers(&mut self) {
        let pending = self.list.hooks_mut().take_pending();
        if pending.is_empty() {
            return;
        }
        let classifier = Rc::clone(&self.list.hooks().classifier);
        for key in pending {
            let header = classifier.header(&key);
            if !self.list.update_filters(header, |_| true) {
                self.list.add(classifier.header(&key));
            }
        }
    }

    // --- Mutations ---

    pub fn add(&mut self, element: T) -> bool {
        let added = self.list.add(element);
        self.maintain_headers();
        return added;
    }

    pub fn remove(&mut self, element: &T) -> Option<T> {
        let removed = self.list.remove(element);
        self.maintain_headers();
        return removed;
    }

    pub fn remove_at(&mut self, filter: usize, index: usize) -> Option<T> {
        let removed = self.list.remove_at(filter, index);
        self.maintain_headers();
        return removed;
    }

    pub fn update_in_place<F>(&mut self, locator: T, modification: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let modified = self.list.update_in_place(locator, modification);
        self.maintain_headers();
        return modified;
    }

    pub fn update_filters<F>(&mut self, locator: T, modification: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let modified = self.list.update_filters(locator, modification);
        self.maintain_headers();
        return modified;
    }

    pub fn update_filters_at<F>(&mut self, filter: usize, index: usize, modification: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let modified = self.list.update_filters_at(filter, index, modification);
        self.maintain_headers();
        return modified;
    }

    pub fn update_reorder<F>(&mut self, locator: T, modification: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let modified = self.list.update_reorder(locator, modification);
        self.maintain_headers();
        return modified;
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// See [`FacetList::reorder`]. The comparator must still sort each
    /// header before its members.
    pub fn reorder(&mut self) {
        self.list.reorder();
        self.maintain_headers();
    }

    pub fn set_all<H2: Hooks<T>>(&mut self, source: &FacetList<T, H2>) -> Result<()>
    where
        T: Clone,
    {
        self.list.set_all(source)?;
        self.maintain_headers();
        return Ok(());
    }

    pub fn add_all<H2: Hooks<T>>(&mut self, source: &FacetList<T, H2>) -> Result<()>
    where
        T: Clone,
    {
        self.list.add_all(source)?;
        self.maintain_headers();
        return Ok(());
    }

    pub fn refresh_filters(&mut self, mask: &FilterMask) -> FilterMask {
        let changed = self.list.refresh_filters(mask);
        self.maintain_headers();
        return changed;
    }

    pub fn restore_filters(&mut self) -> FilterMask {
        let changed = self.list.restore_filters();
        self.maintain_headers();
        return changed;
    }

    /// Filter editing, see [`FacetList::projector_mut`].
    pub fn projector_mut(&mut self) -> &mut Projector<T> {
        return self.list.projector_mut();
    }

    /// Drop every header and aggregate, then classify every element again.
    pub fn update_range_classification(&mut self) {
        let mut dropped = 0;
        while self.list.size_of(HEAD_ITEM) > 0 {
            if self.list.remove_at(HEAD_ITEM, 0).is_none() {
                break;
            }
            dropped += 1;
        }
        self.list.hooks_mut().reset();
        self.list.replay_into_hooks();
        self.maintain_headers();
        debug!(
            "reclassified {} elements: {} headers dropped, {} groups",
            self.list.size(),
            dropped,
            self.list.hooks().group_count()
        );
    }

    /// Re-evaluate the filters of every existing header.
    pub fn update_range_population(&mut self) {
        for index in 0..self.list.size_of(HEAD_ITEM) {
            self.list.update_filters_at(HEAD_ITEM, index, |_| true);
        }
        self.maintain_headers();
    }

    /// Members of a group passing a filter, zero for non-headers.
    pub fn child_count(&self, header: &T, filter: usize) -> usize {
        return self.list.hooks().child_count(header, filter);
    }

    /// [`child_count`](Self::child_count) of the element at a position.
    pub fn child_count_at(&self, index: usize, source: usize, target: usize) -> usize {
        return match self.list.get(source, index) {
            Some(element) => self.child_count(element, target),
            None => 0,
        };
    }

    /// Summed projections of a group's members.
    pub fn aggregate(&self, key: &C::Key) -> Option<&[i32]> {
        return self.list.hooks().aggregate(key);
    }

    // --- Settings and observers ---

    pub fn set_allow_duplicates(&mut self, allow: bool) {
        self.list.set_allow_duplicates(allow);
    }

    pub fn set_position_unaware(&mut self, unaware: bool) {
        self.list.set_position_unaware(unaware);
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.list.set_seed(seed);
    }

    pub fn set_comparator<F>(&mut self, comparator: F)
    where
        F: Fn(&T, &T) -> std::cmp::Ordering + 'static,
    {
        self.list.set_comparator(comparator);
    }

    pub fn add_observer(&mut self, observer: Box<dyn ElementObserver<T>>) -> ObserverId {
        return self.list.add_observer(observer);
    }

    pub fn add_observer_fn<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(Option<&T>, &[i32], &[i32], i32, &[i32]) + 'static,
    {
        return self.list.add_observer_fn(observer);
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        return self.list.remove_observer(id);
    }

    pub fn hint_bulk_begin(&mut self) {
        self.list.hint_bulk_begin();
    }

    /// Ends the bulk region and does the header upkeep it collected.
    pub fn hint_bulk_completed(&mut self) {
        self.list.hint_bulk_completed();
        self.maintain_headers();
    }
}
