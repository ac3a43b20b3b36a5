// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Error type shared by filter registration, filter editing, bulk import and
//! construction.
//!
//! Positional lookups never produce an error: they degrade to `None` or to a
//! sentinel index instead.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong when configuring or bulk-loading a list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A filter referenced a filter that is not registered before it.
    #[error("filter {filter} cannot depend on filter {dependency} (dependencies must precede)")]
    CyclicDependency { filter: usize, dependency: usize },

    /// Structural change after the filter set was frozen.
    #[error("filter set is frozen, only predicate substitution is allowed")]
    Frozen,

    /// Substitution attempted on an immutable filter (e.g. the universe).
    #[error("filter {0} is immutable")]
    ImmutableFilter(usize),

    /// Index past the registered filters.
    #[error("no filter at index {0}")]
    NoSuchFilter(usize),

    /// Dependency given by a name nobody registered.
    #[error("no filter named `{0}`")]
    UnknownFilter(String),

    /// Kind-preserving substitution on a filter of another kind.
    #[error("filter {0} is not a narrower")]
    NotNarrower(usize),

    /// Kind-preserving substitution on a filter of another kind.
    #[error("filter {0} is not a derivative")]
    NotDerivative(usize),

    /// Bulk import between lists with different filter sets.
    #[error("filter count mismatch: expected {expected}, found {actual}")]
    FilterCountMismatch { expected: usize, actual: usize },

    /// Rejected `Config` value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Construction path does not match the builder setup.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Structural inconsistency found by `validate_integrity`.
    #[error("integrity violation: {0}")]
    Integrity(String),
}
