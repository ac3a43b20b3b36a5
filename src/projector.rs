// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Projector
//!
//! The ordered set of filters a list maintains views for. A filter is one of:
//!
//! - **direct**: a unary predicate on the element
//! - **narrower**: a predicate that only runs when every listed precondition
//!   filter passed
//! - **derivative**: a boolean function over the results of other filters
//!
//! Filters may only depend on filters registered before them, so evaluating
//! `0..horizon` in index order always finds every dependency already computed
//! in the precomputed vector.
//!
//! # Hope
//!
//! A filter wrapping [`Predicate::Placeholder`] passes nothing, and so does a
//! narrower over such a filter. These are "hopeless". The horizon is one past
//! the highest hopeful filter; distance vectors only maintain entries below
//! it, so trailing unconfigured filters cost nothing until they are set.
//! The horizon never shrinks on substitution, only on [`Projector::restore`].
//!
//! # Freezing
//!
//! [`Projector::freeze`] ends registration and takes a snapshot of every
//! filter. Afterwards only substitution is allowed, and
//! [`Projector::restore`] puts the snapshot back.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::Error;
use crate::error::Result;
use crate::mask::FilterMask;

/// A unary element test.
pub enum Predicate<T> {
    /// Accepts everything. Used for the universe filter.
    All,
    /// Accepts nothing. Marks a filter that is not configured yet.
    Placeholder,
    Test(Rc<dyn Fn(&T) -> bool>),
}

impl<T> Predicate<T> {
    pub fn new<F>(test: F) -> Predicate<T>
    where
        F: Fn(&T) -> bool + 'static,
    {
        return Predicate::Test(Rc::new(test));
    }

    pub fn accept(&self, element: &T) -> bool {
        return match self {
            Predicate::All => true,
            Predicate::Placeholder => false,
            Predicate::Test(test) => test(element),
        };
    }

    pub fn is_hopeful(&self) -> bool {
        return !matches!(self, Predicate::Placeholder);
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Predicate<T> {
        return match self {
            Predicate::All => Predicate::All,
            Predicate::Placeholder => Predicate::Placeholder,
            Predicate::Test(test) => Predicate::Test(Rc::clone(test)),
        };
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Predicate::All => write!(f, "All"),
            Predicate::Placeholder => write!(f, "Placeholder"),
            Predicate::Test(_) => write!(f, "Test(..)"),
        };
    }
}

/// A boolean function over the results of other filters. Receives one entry
/// per argument filter, nonzero when that filter passed.
pub type Derivative = Rc<dyn Fn(&[i32]) -> bool>;

/// A reference to an earlier filter, by index or by registered name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dep {
    Index(usize),
    Name(String),
}

impl From<usize> for Dep {
    fn from(index: usize) -> Dep {
        return Dep::Index(index);
    }
}

impl From<&str> for Dep {
    fn from(name: &str) -> Dep {
        return Dep::Name(name.to_string());
    }
}

impl From<String> for Dep {
    fn from(name: String) -> Dep {
        return Dep::Name(name);
    }
}

type Positions = SmallVec<[usize; 4]>;

enum Kind<T> {
    Direct(Predicate<T>),
    Narrower {
        predicate: Predicate<T>,
        preconditions: Positions,
    },
    Derivative {
        function: Derivative,
        arguments: Positions,
    },
}

impl<T> Clone for Kind<T> {
    fn clone(&self) -> Kind<T> {
        return match self {
            Kind::Direct(predicate) => Kind::Direct(predicate.clone()),
            Kind::Narrower {
                predicate,
                preconditions,
            } => Kind::Narrower {
                predicate: predicate.clone(),
                preconditions: preconditions.clone(),
            },
            Kind::Derivative {
                function,
                arguments,
            } => Kind::Derivative {
                function: Rc::clone(function),
                arguments: arguments.clone(),
            },
        };
    }
}

impl<T> Kind<T> {
    fn positions(&self) -> &[usize] {
        return match self {
            Kind::Direct(_) => &[],
            Kind::Narrower { preconditions, .. } => preconditions,
            Kind::Derivative { arguments, .. } => arguments,
        };
    }
}

struct Slot<T> {
    kind: Kind<T>,
    /// Same as `kind.positions()`, as a set for dependent lookup.
    dependencies: FilterMask,
    name: Option<String>,
}

impl<T> Slot<T> {
    fn new(kind: Kind<T>, name: Option<String>) -> Slot<T> {
        let dependencies = kind.positions().iter().copied().collect();
        return Slot {
            kind,
            dependencies,
            name,
        };
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Slot<T> {
        return Slot {
            kind: self.kind.clone(),
            dependencies: self.dependencies.clone(),
            name: self.name.clone(),
        };
    }
}

/// Filter state captured at freeze time.
struct Snapshot<T> {
    slots: Vec<Slot<T>>,
    names: FxHashMap<String, usize>,
    hopeful: FilterMask,
}

/// Dependency-ordered filter set with hope tracking.
pub struct Projector<T> {
    slots: Vec<Slot<T>>,
    names: FxHashMap<String, usize>,
    hopeful: FilterMask,
    horizon: usize,
    /// Compute-for-group flags as configured.
    group_flags: FilterMask,
    /// Compute-for-group flags as of the last freeze.
    group_frozen: FilterMask,
    immutable: FilterMask,
    frozen: bool,
    snapshot: Option<Snapshot<T>>,
}

impl<T> Default for Projector<T> {
    fn default() -> Projector<T> {
        return Projector::new();
    }
}

impl<T> Projector<T> {
    pub fn new() -> Projector<T> {
        return Projector {
            slots: Vec::new(),
            names: FxHashMap::default(),
            hopeful: FilterMask::new(),
            horizon: 0,
            group_flags: FilterMask::new(),
            group_frozen: FilterMask::new(),
            immutable: FilterMask::new(),
            frozen: false,
            snapshot: None,
        };
    }

    pub fn filter_count(&self) -> usize {
        return self.slots.len();
    }

    /// One past the highest hopeful filter.
    pub fn horizon(&self) -> usize {
        return self.horizon;
    }

    pub fn is_frozen(&self) -> bool {
        return self.frozen;
    }

    pub fn is_hopeful(&self, filter: usize) -> bool {
        return self.hopeful.contains(filter);
    }

    pub fn is_immutable(&self, filter: usize) -> bool {
        return self.immutable.contains(filter);
    }

    pub fn name_of(&self, filter: usize) -> Option<&str> {
        return self.slots.get(filter)?.name.as_deref();
    }

    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        return self.names.get(name).copied();
    }

    // --- Registration ---

    pub fn add_filter(&mut self, predicate: Predicate<T>) -> Result<usize> {
        return self.insert(Kind::Direct(predicate), None);
    }

    pub fn add_named_filter(&mut self, name: &str, predicate: Predicate<T>) -> Result<usize> {
        return self.insert(Kind::Direct(predicate), Some(name));
    }

    pub fn add_narrower<I>(&mut self, predicate: Predicate<T>, preconditions: I) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: Into<Dep>,
    {
        let preconditions = self.resolve(preconditions)?;
        return self.insert(
            Kind::Narrower {
                predicate,
                preconditions,
            },
            None,
        );
    }

    pub fn add_named_narrower<I>(
        &mut self,
        name: &str,
        predicate: Predicate<T>,
        preconditions: I,
    ) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: Into<Dep>,
    {
        let preconditions = self.resolve(preconditions)?;
        return self.insert(
            Kind::Narrower {
                predicate,
                preconditions,
            },
            Some(name),
        );
    }

    pub fn add_derivative<F, I>(&mut self, function: F, arguments: I) -> Result<usize>
    where
        F: Fn(&[i32]) -> bool + 'static,
        I: IntoIterator,
        I::Item: Into<Dep>,
    {
        let arguments = self.resolve(arguments)?;
        return self.insert(
            Kind::Derivative {
                function: Rc::new(function),
                arguments,
            },
            None,
        );
    }

    pub fn add_named_derivative<F, I>(&mut self, name: &str, function: F, arguments: I) -> Result<usize>
    where
        F: Fn(&[i32]) -> bool + 'static,
        I: IntoIterator,
        I::Item: Into<Dep>,
    {
        let arguments = self.resolve(arguments)?;
        return self.insert(
            Kind::Derivative {
                function: Rc::new(function),
                arguments,
            },
            Some(name),
        );
    }

    fn insert(&mut self, kind: Kind<T>, name: Option<&str>) -> Result<usize> {
        if self.frozen {
            return Err(Error::Frozen);
        }
        let position = self.slots.len();
        check_acyclic(position, kind.positions())?;

        if self.kind_is_hopeful(&kind) {
            self.hopeful.insert(position);
            self.horizon = position + 1;
        }
        if let Some(name) = name {
            self.names.insert(name.to_string(), position);
        }
        self.slots.push(Slot::new(kind, name.map(str::to_string)));
        return Ok(position);
    }

    fn resolve<I>(&self, dependencies: I) -> Result<Positions>
    where
        I: IntoIterator,
        I::Item: Into<Dep>,
    {
        let mut positions = Positions::new();
        for dependency in dependencies {
            let position = match dependency.into() {
                Dep::Index(index) => index,
                Dep::Name(name) => match self.names.get(&name) {
                    Some(&index) => index,
                    None => return Err(Error::UnknownFilter(name)),
                },
            };
            positions.push(position);
        }
        return Ok(positions);
    }

    fn kind_is_hopeful(&self, kind: &Kind<T>) -> bool {
        return match kind {
            Kind::Direct(predicate) => predicate.is_hopeful(),
            Kind::Narrower {
                predicate,
                preconditions,
            } => predicate.is_hopeful() && preconditions.iter().all(|&p| self.hopeful.contains(p)),
            Kind::Derivative { .. } => true,
        };
    }

    /// Mark a filter as never substitutable.
    pub fn freeze_filter(&mut self, filter: usize) {
        self.immutable.insert(filter);
    }

    /// Flag a filter to be evaluated on group headers like on any other
    /// element. Takes effect at the next freeze. Returns the dependents.
    pub fn set_compute_for_group(&mut self, filter: usize, compute: bool) -> FilterMask {
        self.group_flags.assign(filter, compute);
        return self.dependents(filter);
    }

    pub fn should_compute_for_group(&self, filter: usize) -> bool {
        return self.group_frozen.contains(filter);
    }

    /// End registration and snapshot the current filters.
    pub fn freeze(&mut self) {
        self.snapshot = Some(Snapshot {
            slots: self.slots.clone(),
            names: self.names.clone(),
            hopeful: self.hopeful.clone(),
        });
        self.group_frozen = self.group_flags.clone();
        self.frozen = true;
    }

    /// Put back the filters captured by the last freeze. Returns false when
    /// the projector was never frozen.
    pub fn restore(&mut self) -> bool {
        let Some(snapshot) = &self.snapshot else {
            return false;
        };
        self.slots.clone_from(&snapshot.slots);
        self.names.clone_from(&snapshot.names);
        self.hopeful.clone_from(&snapshot.hopeful);
        self.horizon = self.hopeful.span();
        return true;
    }

    /// The filter itself plus every later filter that depends on it,
    /// directly or through other dependents.
    pub fn dependents(&self, filter: usize) -> FilterMask {
        let mut out = FilterMask::new();
        out.insert(filter);
        for index in filter..self.slots.len() {
            if self.slots[index].dependencies.intersects(&out) {
                out.insert(index);
            }
        }
        return out;
    }

    // --- Evaluation ---

    /// Evaluate one filter. Dependencies are read from `precomputed`, which
    /// direct filters never touch.
    pub fn accept(&self, element: &T, filter: usize, precomputed: &[i32]) -> bool {
        let Some(slot) = self.slots.get(filter) else {
            return false;
        };
        return match &slot.kind {
            Kind::Direct(predicate) => predicate.accept(element),
            Kind::Narrower {
                predicate,
                preconditions,
            } => preconditions.iter().all(|&p| precomputed[p] != 0) && predicate.accept(element),
            Kind::Derivative {
                function,
                arguments,
            } => {
                let values: SmallVec<[i32; 8]> = arguments.iter().map(|&a| precomputed[a]).collect();
                function(&values)
            }
        };
    }

    // --- Substitution ---

    /// Replace a filter with a direct predicate. Returns the dependents that
    /// need refreshing.
    pub fn set_filter(&mut self, filter: usize, predicate: Predicate<T>) -> Result<FilterMask> {
        self.check_mutable(filter)?;
        let hopeful = predicate.is_hopeful();
        self.replace(filter, Kind::Direct(predicate));
        self.revisit(filter, hopeful);
        return Ok(self.dependents(filter));
    }

    /// Replace the predicate of a narrower, keeping its preconditions.
    pub fn set_narrower(&mut self, filter: usize, predicate: Predicate<T>) -> Result<FilterMask> {
        self.check_mutable(filter)?;
        let Kind::Narrower { preconditions, .. } = &self.slots[filter].kind else {
            return Err(Error::NotNarrower(filter));
        };
        let preconditions = preconditions.clone();
        return self.substitute_narrower(filter, predicate, preconditions);
    }

    /// Replace a filter with a narrower over new preconditions.
    pub fn set_narrower_with<I>(&mut self, filter: usize, predicate: Predicate<T>, preconditions: I) -> Result<FilterMask>
    where
        I: IntoIterator,
        I::Item: Into<Dep>,
    {
        self.check_mutable(filter)?;
        let preconditions = self.resolve(preconditions)?;
        check_acyclic(filter, &preconditions)?;
        return self.substitute_narrower(filter, predicate, preconditions);
    }

    fn substitute_narrower(&mut self, filter: usize, predicate: Predicate<T>, preconditions: Positions) -> Result<FilterMask> {
        let kind = Kind::Narrower {
            predicate,
            preconditions,
        };
        let hopeful = self.kind_is_hopeful(&kind);
        self.replace(filter, kind);
        self.revisit(filter, hopeful);
        return Ok(self.dependents(filter));
    }

    /// Replace the function of a derivative, keeping its arguments.
    pub fn set_derivative<F>(&mut self, filter: usize, function: F) -> Result<FilterMask>
    where
        F: Fn(&[i32]) -> bool + 'static,
    {
        self.check_mutable(filter)?;
        let Kind::Derivative { arguments, .. } = &self.slots[filter].kind else {
            return Err(Error::NotDerivative(filter));
        };
        let arguments = arguments.clone();
        self.replace(
            filter,
            Kind::Derivative {
                function: Rc::new(function),
                arguments,
            },
        );
        self.revisit(filter, true);
        return Ok(self.dependents(filter));
    }

    /// Replace a filter with a derivative over new arguments.
    pub fn set_derivative_with<F, I>(&mut self, filter: usize, function: F, arguments: I) -> Result<FilterMask>
    where
        F: Fn(&[i32]) -> bool + 'static,
        I: IntoIterator,
        I::Item: Into<Dep>,
    {
        self.check_mutable(filter)?;
        let arguments = self.resolve(arguments)?;
        check_acyclic(filter, &arguments)?;
        self.replace(
            filter,
            Kind::Derivative {
                function: Rc::new(function),
                arguments,
            },
        );
        self.revisit(filter, true);
        return Ok(self.dependents(filter));
    }

    fn check_mutable(&self, filter: usize) -> Result<()> {
        if filter >= self.slots.len() {
            return Err(Error::NoSuchFilter(filter));
        }
        if self.immutable.contains(filter) {
            return Err(Error::ImmutableFilter(filter));
        }
        return Ok(());
    }

    fn replace(&mut self, filter: usize, kind: Kind<T>) {
        let name = self.slots[filter].name.take();
        self.slots[filter] = Slot::new(kind, name);
    }

    /// Record the new hope of a substituted filter. Gaining hope may lift
    /// narrowers that were only hopeless because of it.
    fn revisit(&mut self, filter: usize, hopeful: bool) {
        self.hopeful.assign(filter, hopeful);
        if hopeful {
            let mut dependents = self.dependents(filter);
            dependents.subtract(&self.hopeful);
            for dependent in dependents.iter().filter(|&d| d > filter) {
                // derivatives are always hopeful and direct filters have no
                // dependencies, so only narrowers show up here
                let gained = match &self.slots[dependent].kind {
                    Kind::Narrower { .. } => self.kind_is_hopeful(&self.slots[dependent].kind),
                    _ => continue,
                };
                self.hopeful.assign(dependent, gained);
            }
        }
        self.horizon = self.horizon.max(self.hopeful.span());
    }
}

fn check_acyclic(filter: usize, dependencies: &[usize]) -> Result<()> {
    for &dependency in dependencies {
        if dependency >= filter {
            return Err(Error::CyclicDependency { filter, dependency });
        }
    }
    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Amalgam of direct filters and derivatives over integers
    // =========================================================================

    struct Amalgam {
        projector: Projector<i64>,
        is_even: usize,
        is_mul3: usize,
        bin_dif: usize,
        bin_int: usize,
        bin_uni: usize,
        is_pow2: usize,
        tri_int: usize,
    }

    fn amalgam() -> Amalgam {
        let mut projector = Projector::new();
        let is_even = projector
            .add_named_filter("even", Predicate::new(|n: &i64| n % 2 == 0))
            .unwrap();
        let is_mul3 = projector
            .add_named_filter("mul3", Predicate::new(|n: &i64| n % 3 == 0))
            .unwrap();
        let bin_dif = projector
            .add_derivative(|args: &[i32]| (args[0] == 0) ^ (args[1] == 0), ["even", "mul3"])
            .unwrap();
        let bin_int = projector
            .add_derivative(
                |args: &[i32]| args[0] * args[1] != 0,
                [Dep::from("even"), Dep::Index(1)],
            )
            .unwrap();
        let bin_uni = projector
            .add_named_derivative("union", |args: &[i32]| (args[0] | args[1]) != 0, [0usize, 1])
            .unwrap();
        let is_pow2 = projector
            .add_named_filter("pow2", Predicate::new(|n: &i64| n.count_ones() == 1))
            .unwrap();
        let tri_int = projector
            .add_derivative(
                |args: &[i32]| args[0] * args[1] * args[2] != 0,
                [Dep::Index(0), Dep::from("pow2"), Dep::from("union")],
            )
            .unwrap();
        return Amalgam {
            projector,
            is_even,
            is_mul3,
            bin_dif,
            bin_int,
            bin_uni,
            is_pow2,
            tri_int,
        };
    }

    #[test]
    fn amalgam_evaluation() {
        let a = amalgam();
        assert_eq!(a.projector.filter_count(), 7);

        // direct filters never read the precomputed vector
        assert!(!a.projector.accept(&7, a.is_even, &[]));
        assert!(!a.projector.accept(&7, a.is_mul3, &[]));
        assert!(!a.projector.accept(&7, a.is_pow2, &[]));
        assert!(a.projector.accept(&8, a.is_pow2, &[]));

        // even, mul3, not dif, not int, uni, pow2, not tri
        let precomputed = [1, 1, 0, 0, 1, 1, 0];
        assert!(!a.projector.accept(&0, a.bin_dif, &precomputed));
        assert!(a.projector.accept(&0, a.bin_int, &precomputed));
        assert!(a.projector.accept(&0, a.bin_uni, &precomputed));
        assert!(a.projector.accept(&0, a.tri_int, &precomputed));
    }

    #[test]
    fn amalgam_dependents() {
        let a = amalgam();
        let p = &a.projector;
        assert_eq!(
            p.dependents(a.is_even),
            FilterMask::of(&[a.is_even, a.bin_uni, a.bin_dif, a.bin_int, a.tri_int])
        );
        assert_eq!(
            p.dependents(a.is_mul3),
            FilterMask::of(&[a.is_mul3, a.bin_uni, a.bin_dif, a.bin_int, a.tri_int])
        );
        assert_eq!(p.dependents(a.bin_dif), FilterMask::of(&[a.bin_dif]));
        assert_eq!(p.dependents(a.bin_int), FilterMask::of(&[a.bin_int]));
        assert_eq!(p.dependents(a.bin_uni), FilterMask::of(&[a.bin_uni, a.tri_int]));
        assert_eq!(p.dependents(a.is_pow2), FilterMask::of(&[a.is_pow2, a.tri_int]));
        assert_eq!(p.dependents(a.tri_int), FilterMask::of(&[a.tri_int]));
    }

    #[test]
    fn narrower_requires_preconditions() {
        let mut projector: Projector<i64> = Projector::new();
        projector.add_filter(Predicate::new(|n: &i64| n % 2 == 0)).unwrap();
        let narrow = projector
            .add_narrower(Predicate::new(|n: &i64| *n > 10), [0usize])
            .unwrap();
        assert!(projector.accept(&12, narrow, &[1, 0]));
        assert!(!projector.accept(&12, narrow, &[0, 0]));
        assert!(!projector.accept(&4, narrow, &[1, 0]));
    }

    // =========================================================================
    // Registration errors
    // =========================================================================

    #[test]
    fn forward_references_are_cyclic() {
        let mut projector: Projector<i64> = Projector::new();
        projector.add_filter(Predicate::All).unwrap();
        assert_eq!(
            projector.add_narrower(Predicate::All, [1usize]),
            Err(Error::CyclicDependency {
                filter: 1,
                dependency: 1
            })
        );
        assert_eq!(
            projector.add_derivative(|_: &[i32]| true, [0usize, 5]),
            Err(Error::CyclicDependency {
                filter: 1,
                dependency: 5
            })
        );
        assert_eq!(projector.filter_count(), 1);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut projector: Projector<i64> = Projector::new();
        assert_eq!(
            projector.add_narrower(Predicate::All, ["missing"]),
            Err(Error::UnknownFilter("missing".to_string()))
        );
    }

    #[test]
    fn frozen_projector_only_substitutes() {
        let mut projector: Projector<i64> = Projector::new();
        projector.add_filter(Predicate::All).unwrap();
        projector.freeze_filter(0);
        projector.add_filter(Predicate::Placeholder).unwrap();
        projector.freeze();

        assert_eq!(projector.add_filter(Predicate::All), Err(Error::Frozen));
        assert_eq!(projector.set_filter(0, Predicate::Placeholder), Err(Error::ImmutableFilter(0)));
        assert_eq!(projector.set_filter(7, Predicate::All), Err(Error::NoSuchFilter(7)));
        assert!(projector.set_filter(1, Predicate::new(|n: &i64| *n > 0)).is_ok());
        assert_eq!(projector.set_narrower(1, Predicate::All), Err(Error::NotNarrower(1)));
        assert_eq!(projector.set_derivative(1, |_: &[i32]| true), Err(Error::NotDerivative(1)));
        assert_eq!(
            projector.set_narrower_with(1, Predicate::All, [1usize]),
            Err(Error::CyclicDependency {
                filter: 1,
                dependency: 1
            })
        );
    }

    // =========================================================================
    // Hope and horizon
    // =========================================================================

    #[test]
    fn trailing_placeholders_shrink_horizon() {
        let mut projector: Projector<i64> = Projector::new();
        projector.add_filter(Predicate::All).unwrap();
        projector.add_filter(Predicate::new(|n: &i64| *n > 0)).unwrap();
        projector.add_filter(Predicate::Placeholder).unwrap();
        projector.add_narrower(Predicate::All, [2usize]).unwrap();
        assert_eq!(projector.filter_count(), 4);
        assert_eq!(projector.horizon(), 2);
        assert!(!projector.is_hopeful(3));
    }

    #[test]
    fn substitution_spreads_hope_to_narrowers() {
        let mut projector: Projector<i64> = Projector::new();
        projector.add_filter(Predicate::All).unwrap();
        projector.add_filter(Predicate::Placeholder).unwrap();
        projector.add_narrower(Predicate::All, [1usize]).unwrap();
        projector.add_narrower(Predicate::All, [2usize]).unwrap();
        projector.freeze();
        assert_eq!(projector.horizon(), 1);

        let dirty = projector.set_filter(1, Predicate::new(|n: &i64| *n > 0)).unwrap();
        assert_eq!(dirty, FilterMask::of(&[1, 2, 3]));
        assert!(projector.is_hopeful(2));
        assert!(projector.is_hopeful(3));
        assert_eq!(projector.horizon(), 4);

        // losing hope again does not shrink the horizon
        projector.set_filter(1, Predicate::Placeholder).unwrap();
        assert!(!projector.is_hopeful(1));
        assert_eq!(projector.horizon(), 4);
    }

    #[test]
    fn restore_brings_back_frozen_filters() {
        let mut projector: Projector<i64> = Projector::new();
        projector.add_filter(Predicate::All).unwrap();
        projector
            .add_named_filter("positive", Predicate::new(|n: &i64| *n > 0))
            .unwrap();
        projector.add_filter(Predicate::Placeholder).unwrap();
        assert!(!projector.restore());
        projector.freeze();

        projector.set_filter(1, Predicate::new(|n: &i64| *n < 0)).unwrap();
        projector.set_filter(2, Predicate::All).unwrap();
        assert_eq!(projector.horizon(), 3);
        assert!(projector.accept(&-1, 1, &[]));

        assert!(projector.restore());
        assert!(projector.accept(&1, 1, &[]));
        assert!(!projector.is_hopeful(2));
        assert_eq!(projector.horizon(), 2);
        assert_eq!(projector.index_of_name("positive"), Some(1));
        assert_eq!(projector.name_of(1), Some("positive"));
    }

    #[test]
    fn compute_for_group_is_captured_at_freeze() {
        let mut projector: Projector<i64> = Projector::new();
        projector.add_filter(Predicate::All).unwrap();
        projector.add_filter(Predicate::All).unwrap();
        projector.add_narrower(Predicate::All, [1usize]).unwrap();
        let dependents = projector.set_compute_for_group(1, true);
        assert_eq!(dependents, FilterMask::of(&[1, 2]));
        assert!(!projector.should_compute_for_group(1));
        projector.freeze();
        assert!(projector.should_compute_for_group(1));
        assert!(!projector.should_compute_for_group(2));
    }
}
