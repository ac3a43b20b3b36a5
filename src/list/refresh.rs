// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Whole-list passes: filter refresh, bulk import and integrity checking.
//!
//! A refresh walks level 0 once, re-evaluating the dirty filters for every
//! element, and rewrites the dirty entries of every edge from running
//! selection counts. Counts are kept per level at the last node seen on that
//! level, so an edge is closed as soon as the walk reaches its far end.

use std::cmp::Ordering;

use log::debug;
use smallvec::SmallVec;
use smallvec::smallvec;

use super::FacetList;
use super::HEAD;
use super::Hooks;
use super::Idx;
use super::NULL;
use super::UNIVERSE;
use crate::distance;
use crate::distance::Distance;
use crate::error::Error;
use crate::error::Result;
use crate::mask::FilterMask;

impl<T, H: Hooks<T>> FacetList<T, H> {
    /// Re-evaluate the given filters for every element after a projector
    /// edit, notifying each element whose membership changed. Returns the
    /// filters whose membership changed for at least one element.
    pub fn refresh_filters(&mut self, mask: &FilterMask) -> FilterMask {
        let indices: SmallVec<[usize; 8]> = mask.iter().filter(|&f| f < self.filter_count).collect();
        if indices.is_empty() {
            return FilterMask::new();
        }
        self.horizon = self.projector.horizon();

        self.hint_bulk_begin();
        let changed = match indices.as_slice() {
            &[filter] => self.refresh_single(filter),
            _ => self.refresh_many(&indices),
        };
        self.hint_bulk_completed();

        debug!(
            "refreshed filters {:?} over {} elements, changed {:?}",
            mask,
            self.size(),
            changed
        );
        return changed;
    }

    /// One dirty filter: lower filters are settled, so each element's old
    /// level-0 edge serves as the precomputed vector.
    ///
    /// Notifications fill only the universe and refreshed entries of the
    /// position, and like every other notification they count the elements
    /// before the changed one.
    fn refresh_single(&mut self, filter: usize) -> FilterMask {
        let level_count = self.level_count;
        let mut section: SmallVec<[Idx; 16]> = smallvec![HEAD; level_count];
        let mut last: SmallVec<[i32; 16]> = smallvec![0; level_count];
        let mut selection = 0;
        let mut visited = 0;
        let mut changed = false;

        let mut node = HEAD;
        let mut next = self.next_of(HEAD, 0);
        while next != NULL {
            let precomputed: Distance = Distance::from_slice(self.distance_of(node, 0));
            let before = selection;
            let mut delta = -precomputed[filter];
            let passed = match self.element(next) {
                Some(element) => self.accept(element, filter, &precomputed),
                None => false,
            };
            if passed {
                delta += 1;
                selection += 1;
            }
            if delta != 0 {
                changed = true;
                let mut position = self.zero.clone();
                position[UNIVERSE] = visited;
                position[filter] = before;
                let mut delta_count = self.zero.clone();
                delta_count[filter] = delta;
                self.notify(Some(next), Some(position.as_slice()), &delta_count, 1, &delta_count);
            }

            for level in 0..level_count {
                if self.next_of(section[level], level) != next {
                    continue;
                }
                self.nodes[section[level] as usize].links[level].distance[filter] = selection - last[level];
                last[level] = selection;
                section[level] = next;
            }
            visited += 1;
            node = next;
            next = self.next_of(node, 0);
        }

        // edges into the end of the chain
        for level in 0..level_count {
            self.nodes[section[level] as usize].links[level].distance[filter] = selection - last[level];
        }

        if changed {
            return FilterMask::of(&[filter]);
        }
        return FilterMask::new();
    }

    /// Several dirty filters: re-project them in index order so dependents
    /// read fresh values.
    fn refresh_many(&mut self, indices: &[usize]) -> FilterMask {
        let level_count = self.level_count;
        let width = self.filter_count;
        let mut path: SmallVec<[Idx; 16]> = smallvec![HEAD; level_count];
        let mut marks: Vec<Distance> = vec![distance::zero(width); level_count];
        let mut selection = distance::zero(width);
        let mut changed = FilterMask::new();

        let mut node = HEAD;
        let mut next = self.next_of(HEAD, 0);
        while next != NULL {
            let old: Distance = Distance::from_slice(self.distance_of(node, 0));
            let mut projection = old.clone();
            if let Some(element) = self.element(next) {
                distance::project_at(&mut projection, indices, |filter, precomputed| {
                    self.accept(element, filter, precomputed)
                });
            }

            let mut delta = distance::zero(width);
            for &filter in indices {
                delta[filter] = projection[filter] - old[filter];
                if delta[filter] != 0 {
                    changed.insert(filter);
                }
            }
            if !distance::is_zero(&delta, width) {
                self.notify(Some(next), Some(selection.as_slice()), &delta, 1, &delta);
            }
            distance::add(&mut selection, &projection, width);

            for level in 0..level_count {
                if self.next_of(path[level], level) != next {
                    continue;
                }
                let edge = &mut self.nodes[path[level] as usize].links[level].distance;
                for &filter in indices {
                    edge[filter] = selection[filter] - marks[level][filter];
                }
                marks[level].clone_from(&selection);
                path[level] = next;
            }
            node = next;
            next = self.next_of(node, 0);
        }

        for level in 0..level_count {
            let edge = &mut self.nodes[path[level] as usize].links[level].distance;
            for &filter in indices {
                edge[filter] = selection[filter] - marks[level][filter];
            }
        }
        return changed;
    }

    /// Put back the filters the list was created with and refresh every
    /// view.
    pub fn restore_filters(&mut self) -> FilterMask {
        if !self.projector.restore() {
            return FilterMask::new();
        }
        debug!("restored {} filters", self.filter_count);
        let all = self.all_filters();
        return self.refresh_filters(&all);
    }

    // --- Bulk import ---

    fn check_source<H2>(&self, source: &FacetList<T, H2>) -> Result<()> {
        if source.filter_count != self.filter_count {
            return Err(Error::FilterCountMismatch {
                expected: self.filter_count,
                actual: source.filter_count,
            });
        }
        return Ok(());
    }

    /// Replace the contents with clones of another list's elements, reusing
    /// its projections. Observers see the clear, then one summary
    /// notification with the imported view sizes.
    pub fn set_all<H2: Hooks<T>>(&mut self, source: &FacetList<T, H2>) -> Result<()>
    where
        T: Clone,
    {
        self.check_source(source)?;
        self.hint_bulk_begin();
        self.clear();
        self.import(source.entries().map(|(element, projection)| (element.clone(), projection)));
        self.hint_bulk_completed();
        return Ok(());
    }

    /// Add clones of another list's elements, reusing its projections.
    /// Observers see one summary notification with the imported counts.
    pub fn add_all<H2: Hooks<T>>(&mut self, source: &FacetList<T, H2>) -> Result<()>
    where
        T: Clone,
    {
        self.check_source(source)?;
        self.hint_bulk_begin();
        self.import(source.entries().map(|(element, projection)| (element.clone(), projection)));
        self.hint_bulk_completed();
        return Ok(());
    }

    /// Sort the contents again under the comparator set by
    /// [`set_comparator`](Self::set_comparator), keeping every element's
    /// projection. Observers see the clear, then one summary notification
    /// with the view sizes after the re-import. Elements that compare equal
    /// under the new order are dropped unless duplicates are allowed.
    pub fn reorder(&mut self) {
        let drained = self.drain();
        self.hint_bulk_begin();
        self.clear();
        self.import(drained);
        self.hint_bulk_completed();
    }

    /// Take every element out of the chain with its projection, in order.
    /// The structure is left stale for [`clear`](Self::clear) to reset.
    fn drain(&mut self) -> Vec<(T, Distance)> {
        let mut drained = Vec::with_capacity(self.size());
        let mut prev = HEAD;
        let mut node = self.next_of(HEAD, 0);
        while node != NULL {
            let projection = Distance::from_slice(self.distance_of(prev, 0));
            if let Some(element) = self.nodes[node as usize].element.take() {
                drained.push((element, projection));
            }
            prev = node;
            node = self.next_of(node, 0);
        }
        return drained;
    }

    fn import<I, P>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (T, P)>,
        P: AsRef<[i32]>,
    {
        let width = self.filter_count;
        let mut counts = distance::zero(width);
        let mut offered = 0;
        self.muted = true;
        for (element, projection) in entries {
            let projection = projection.as_ref();
            offered += 1;
            if self.add_precomputed(element, projection) {
                distance::add(&mut counts, projection, width);
            }
        }
        self.muted = false;
        debug!("imported {} of {} elements", counts[UNIVERSE], offered);
        self.notify(None, None, &counts, 1, &counts);
    }

    // --- Integrity ---

    /// Check the structural invariants: every level's edges sum to the
    /// level-0 walk, no node is skipped on a level it links, the elements
    /// are sorted and the sentinel alone reaches the orbit.
    pub fn validate_integrity(&self) -> Result<()> {
        let level_count = self.level_count;
        let orbit = self.orbit();
        let width = self.filter_count;
        if self.next_of(HEAD, orbit) != NULL {
            return Err(Error::Integrity("the orbit links a node".to_string()));
        }

        let mut path: SmallVec<[Idx; 16]> = smallvec![HEAD; level_count];
        let mut flown: Vec<Distance> = vec![distance::zero(width); level_count];
        let mut walked = distance::zero(width);
        let mut node = HEAD;
        let mut steps = 0;
        loop {
            let edge = self.distance_of(node, 0);
            distance::add(&mut walked, edge, width);
            let next = self.next_of(node, 0);
            if let Some(&count) = edge.iter().find(|&&count| count != 0 && count != 1) {
                return Err(Error::Integrity(format!("level 0 edge after step {steps} counts {count}")));
            }
            if next == NULL && !distance::is_zero(edge, width) {
                return Err(Error::Integrity("the last edge counts elements".to_string()));
            }

            let height = match next {
                NULL => orbit,
                _ => self.level_of(next),
            };
            if next != NULL && height >= orbit {
                return Err(Error::Integrity(format!("node at step {steps} reaches the orbit")));
            }
            for level in 1..level_count {
                let prev = path[level];
                if self.next_of(prev, level) != next {
                    if level <= height {
                        return Err(Error::Integrity(format!("gap at level {level} before step {steps}")));
                    }
                    continue;
                }
                distance::add(&mut flown[level], self.distance_of(prev, level), width);
                if flown[level] != walked {
                    return Err(Error::Integrity(format!(
                        "level {level} counts {:?} where level 0 counts {:?}",
                        flown[level], walked
                    )));
                }
                path[level] = next;
            }

            if next == NULL {
                break;
            }
            if node != HEAD && self.compare_with_next(self.element(node), next) == Ordering::Greater {
                return Err(Error::Integrity(format!("out of order at step {steps}")));
            }
            node = next;
            steps += 1;
        }
        return Ok(());
    }
}
