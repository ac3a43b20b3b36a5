// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! A borrowed window onto one filtered view of a list.
//!
//! A [`View`] answers positional questions in its own filter and converts
//! positions to and from a set of ancillary filters, for example a view of
//! visible rows converting to the full list underneath it.

use smallvec::SmallVec;

use crate::list::FacetList;
use crate::list::Hooks;
use crate::list::Rounding;
use crate::list::ViewIter;

pub struct View<'a, T, H> {
    list: &'a FacetList<T, H>,
    filter: usize,
    ancillaries: SmallVec<[usize; 4]>,
}

impl<'a, T, H: Hooks<T>> View<'a, T, H> {
    pub(crate) fn new(list: &'a FacetList<T, H>, filter: usize) -> View<'a, T, H> {
        return View {
            list,
            filter,
            ancillaries: SmallVec::new(),
        };
    }

    /// Attach the filters positions can be converted to, addressed by their
    /// order here.
    pub fn with_ancillaries<I>(mut self, ancillaries: I) -> View<'a, T, H>
    where
        I: IntoIterator<Item = usize>,
    {
        self.ancillaries = ancillaries.into_iter().collect();
        return self;
    }

    pub fn filter(&self) -> usize {
        return self.filter;
    }

    pub fn len(&self) -> usize {
        return self.list.size_of(self.filter);
    }

    pub fn is_empty(&self) -> bool {
        return self.len() == 0;
    }

    pub fn get(&self, index: usize) -> Option<&'a T> {
        return self.list.get(self.filter, index);
    }

    pub fn index_of(&self, element: &T) -> Option<usize> {
        return self.list.index_of(self.filter, element);
    }

    pub fn iter(&self) -> ViewIter<'a, T, H> {
        return self.list.iter(self.filter);
    }

    /// Members of a header's group that pass this view's filter. Zero for
    /// ungrouped lists and non-headers.
    pub fn child_count(&self, element: &T) -> usize {
        return self.list.hooks().child_count(element, self.filter);
    }

    /// A plain view of an ancillary filter.
    pub fn ancillary(&self, ancillary: usize) -> Option<View<'a, T, H>> {
        let filter = *self.ancillaries.get(ancillary)?;
        return Some(View::new(self.list, filter));
    }

    /// Convert a position in this view to one in an ancillary view.
    pub fn to_ancillary(&self, ancillary: usize, index: isize, rounding: Rounding) -> Option<isize> {
        let target = *self.ancillaries.get(ancillary)?;
        return Some(self.list.convert_index_with(index, self.filter, target, rounding));
    }

    /// Convert a position in an ancillary view to one in this view.
    pub fn from_ancillary(&self, ancillary: usize, index: isize, rounding: Rounding) -> Option<isize> {
        let source = *self.ancillaries.get(ancillary)?;
        return Some(self.list.convert_index_with(index, source, self.filter, rounding));
    }
}

impl<'a, T, H: Hooks<T>> IntoIterator for &View<'a, T, H> {
    type Item = &'a T;
    type IntoIter = ViewIter<'a, T, H>;

    fn into_iter(self) -> ViewIter<'a, T, H> {
        return self.iter();
    }
}

impl<T, H: Hooks<T>> FacetList<T, H> {
    /// A window onto one filter.
    pub fn view(&self, filter: usize) -> View<'_, T, H> {
        return View::new(self, filter);
    }
}
