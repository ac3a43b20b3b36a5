// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Construction.
//!
//! Filters are registered on a [`Builder`], which freezes them when the list
//! is created. The universe filter is always index 0. A grouped builder also
//! reserves index 1 for the head-item filter, which the classifier fills in
//! at [`Builder::create_grouped`].

use std::cmp::Ordering;
use std::rc::Rc;

use crate::error::Error;
use crate::error::Result;
use crate::grouped::Classifier;
use crate::grouped::GroupedList;
use crate::grouped::Grouping;
use crate::list::Comparator;
use crate::list::FacetList;
use crate::list::Plain;
use crate::list::UNIVERSE;
use crate::mask::FilterMask;
use crate::projector::Dep;
use crate::projector::Predicate;
use crate::projector::Projector;

/// Filter index of the group headers on a grouped list.
pub const HEAD_ITEM: usize = 1;

/// List configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Levels including the sentinel-only top level.
    pub level_count: usize,
    /// A node is promoted one level with probability `1 / denominator`.
    pub denominator: u32,
    pub allow_duplicates: bool,
    pub broadcast_old_value: bool,
    pub position_unaware: bool,
    pub auto_add: bool,
    /// Level generator seed, a fixed default when unset.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Config {
        return Config {
            level_count: 15,
            denominator: 3,
            allow_duplicates: false,
            broadcast_old_value: false,
            position_unaware: false,
            auto_add: false,
            seed: None,
        };
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.level_count < 2 {
            return Err(Error::InvalidConfig("level_count must be at least 2"));
        }
        if self.denominator < 2 {
            return Err(Error::InvalidConfig("denominator must be at least 2"));
        }
        return Ok(());
    }
}

/// Collects configuration and filters for a new list.
pub struct Builder<T> {
    config: Config,
    comparator: Comparator<T>,
    projector: Projector<T>,
    grouped: bool,
}

impl<T: Ord + 'static> Builder<T> {
    /// Builder for a plain list in natural order.
    pub fn new() -> Builder<T> {
        return Builder::with_comparator(T::cmp);
    }

    /// Builder for a grouped list in natural order.
    pub fn new_grouped() -> Builder<T> {
        return Builder::grouped_with_comparator(T::cmp);
    }
}

impl<T: Ord + 'static> Default for Builder<T> {
    fn default() -> Builder<T> {
        return Builder::new();
    }
}

impl<T> Builder<T> {
    pub fn with_comparator<F>(comparator: F) -> Builder<T>
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        return Builder::setup(Rc::new(comparator), false);
    }

    pub fn grouped_with_comparator<F>(comparator: F) -> Builder<T>
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        return Builder::setup(Rc::new(comparator), true);
    }

    fn setup(comparator: Comparator<T>, grouped: bool) -> Builder<T> {
        let mut projector = Projector::new();
        // registration on a fresh projector cannot fail
        let _ = projector.add_filter(Predicate::All);
        projector.freeze_filter(UNIVERSE);
        if grouped {
            let _ = projector.add_filter(Predicate::Placeholder);
        }
        return Builder {
            config: Config::default(),
            comparator,
            projector,
            grouped,
        };
    }

    // --- Configuration ---

    pub fn config(&self) -> &Config {
        return &self.config;
    }

    pub fn config_mut(&mut self) -> &mut Config {
        return &mut self.config;
    }

    pub fn set_level_count(&mut self, level_count: usize) -> &mut Self {
        self.config.level_count = level_count;
        return self;
    }

    pub fn set_denominator(&mut self, denominator: u32) -> &mut Self {
        self.config.denominator = denominator;
        return self;
    }

    pub fn set_allow_duplicates(&mut self, allow: bool) -> &mut Self {
        self.config.allow_duplicates = allow;
        return self;
    }

    pub fn set_broadcast_old_value(&mut self, broadcast: bool) -> &mut Self {
        self.config.broadcast_old_value = broadcast;
        return self;
    }

    pub fn set_position_unaware(&mut self, unaware: bool) -> &mut Self {
        self.config.position_unaware = unaware;
        return self;
    }

    pub fn set_auto_add(&mut self, auto_add: bool) -> &mut Self {
        self.config.auto_add = auto_add;
        return self;
    }

    pub fn set_seed(&mut self, seed: u64) -> &mut Self {
        self.config.seed = Some(seed);
        return self;
    }

    pub fn set_comparator<F>(&mut self, comparator: F) -> &mut Self
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        self.comparator = Rc::new(comparator);
        return self;
    }

    // --- Filters ---

    pub fn filter_count(&self) -> usize {
        return self.projector.filter_count();
    }

    pub fn horizon(&self) -> usize {
        return self.projector.horizon();
    }

    pub fn projector(&self) -> &Projector<T> {
        return &self.projector;
    }

    pub fn add_filter(&mut self, predicate: Predicate<T>) -> Result<usize> {
        return self.projector.add_filter(predicate);
    }

    pub fn add_named_filter(&mut self, name: &str, predicate: Predicate<T>) -> Result<usize> {
        return self.projector.add_named_filter(name, predicate);
    }

    pub fn add_narrower<I>(&mut self, predicate: Predicate<T>, preconditions: I) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: Into<Dep>,
    {
        return self.projector.add_narrower(predicate, preconditions);
    }

    pub fn add_named_narrower<I>(&mut self, name: &str, predicate: Predicate<T>, preconditions: I) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: Into<Dep>,
    {
        return self.projector.add_named_narrower(name, predicate, preconditions);
    }

    pub fn add_derivative<F, I>(&mut self, function: F, arguments: I) -> Result<usize>
    where
        F: Fn(&[i32]) -> bool + 'static,
        I: IntoIterator,
        I::Item: Into<Dep>,
    {
        return self.projector.add_derivative(function, arguments);
    }

    pub fn add_named_derivative<F, I>(&mut self, name: &str, function: F, arguments: I) -> Result<usize>
    where
        F: Fn(&[i32]) -> bool + 'static,
        I: IntoIterator,
        I::Item: Into<Dep>,
    {
        return self.projector.add_named_derivative(name, function, arguments);
    }

    /// On grouped lists, evaluate this filter on headers directly instead of
    /// answering from the group aggregate. Returns the dependents.
    pub fn set_compute_for_group(&mut self, filter: usize, compute: bool) -> FilterMask {
        return self.projector.set_compute_for_group(filter, compute);
    }

    /// Forbid later substitution of a filter.
    pub fn freeze_filter(&mut self, filter: usize) -> &mut Self {
        self.projector.freeze_filter(filter);
        return self;
    }

    // --- Creation ---

    /// Create a plain list.
    pub fn create(mut self) -> Result<FacetList<T>> {
        if self.grouped {
            return Err(Error::InvalidState("grouped builder needs create_grouped"));
        }
        self.config.validate()?;
        self.projector.freeze();
        return Ok(FacetList::from_parts(&self.config, self.comparator, self.projector, Plain));
    }

    /// Create a grouped list driven by `classifier`. Old values are always
    /// broadcast so group aggregates see what an element leaves behind.
    pub fn create_grouped<C>(mut self, classifier: C) -> Result<GroupedList<T, C>>
    where
        C: Classifier<T> + 'static,
        T: 'static,
    {
        if !self.grouped {
            return Err(Error::InvalidState("plain builder cannot create a grouped list"));
        }
        if self.config.auto_add {
            return Err(Error::InvalidState("auto-add is not supported on grouped lists"));
        }
        self.config.validate()?;

        let classifier = Rc::new(classifier);
        let headers = Rc::clone(&classifier);
        self.projector
            .set_filter(HEAD_ITEM, Predicate::new(move |element: &T| headers.is_header(element)))?;
        self.projector.freeze_filter(HEAD_ITEM);
        self.projector.freeze();
        self.config.broadcast_old_value = true;

        let list = FacetList::from_parts(&self.config, self.comparator, self.projector, Grouping::new(classifier));
        return Ok(GroupedList::from_list(list));
    }
}
