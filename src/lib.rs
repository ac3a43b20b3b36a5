// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Facets - an ordered container with many filtered views.
//!
//! Elements are kept sorted in a skip list whose edges count, per filter,
//! how many elements they span. Any view supports positional access,
//! insertion, removal and index conversion to any other view in
//! logarithmic time, and every change is reported to observers with its
//! effect on each view.
//!
//! # Quick Start
//!
//! ```
//! use facets::Builder;
//! use facets::Predicate;
//!
//! let mut builder = Builder::new();
//! let even = builder.add_filter(Predicate::new(|n: &u32| n % 2 == 0)).unwrap();
//! let mut list = builder.create().unwrap();
//!
//! for n in [5, 2, 8, 1, 4] {
//!     list.add(n);
//! }
//! assert_eq!(list.get(facets::UNIVERSE, 0), Some(&1));
//! assert_eq!(list.get(even, 1), Some(&4));
//! assert_eq!(list.index_of(even, &8), Some(2));
//! assert_eq!(list.convert_index(3, facets::UNIVERSE, even), 1);
//! ```

pub mod builder;
pub mod distance;
pub mod error;
pub mod grouped;
pub mod list;
pub mod mask;
pub mod observer;
pub mod projector;
pub mod view;

pub use builder::Builder;
pub use builder::Config;
pub use builder::HEAD_ITEM;
pub use error::Error;
pub use error::Result;
pub use grouped::Classifier;
pub use grouped::GroupedList;
pub use list::FacetList;
pub use list::Rounding;
pub use list::UNIVERSE;
pub use mask::FilterMask;
pub use observer::ElementObserver;
pub use observer::ObserverId;
pub use projector::Dep;
pub use projector::Predicate;
pub use projector::Projector;
pub use view::View;
