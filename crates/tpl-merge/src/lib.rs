//! Structured merge algorithms and file classification for Template Manager
//!
//! This crate is the pure half of the sync engine. It knows nothing about
//! the filesystem; it receives file contents as strings (or already-parsed
//! [`Value`] trees) and returns merged results.
//!
//! - [`value`] — the generic configuration tree: a closed tagged union over
//!   scalars, mappings, and sequences
//! - [`merge`] — two-way and three-way deep merge over [`Value`] trees
//! - [`policy`] — declared per-field merge policies (template-owned fields
//!   versus user-preservable fields)
//! - [`classify`] — risk level and merge strategy selection per path
//! - [`formats`] — the per-strategy file mergers built on the above

pub mod classify;
pub mod error;
pub mod formats;
pub mod merge;
pub mod policy;
pub mod value;

pub use classify::{HIGH_RISK_BASENAMES, MergeStrategy, RiskLevel, classify};
pub use error::{Error, Result};
pub use formats::merge_with_strategy;
pub use merge::{merge_deep, merge_three_way};
pub use policy::{FieldPolicy, FieldPolicyTable};
pub use value::{Scalar, Value};
