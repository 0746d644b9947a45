//! Dynamic reviewer and metareviewer assignment for peer-reviewed coursework.
//!
//! A matching call captures a [`Snapshot`](snapshot::Snapshot) of one assignment, wraps it in a
//! [`ContributorRegistry`](registry::ContributorRegistry) and runs one of the pipelines over it:
//! - [`topics::candidate_topics_to_review`]
//! - [`reviewer::contributor_to_review`]
//! - [`metareviewer::response_map_to_metareview`]
//!
//! The pipelines only select. Use the [`Allocator`](allocator::Allocator) to also record the
//! result without racing other requests for the same assignment.

pub mod allocator;
pub mod error;
pub mod metareviewer;
pub mod model;
pub mod registry;
pub mod reviewer;
pub mod snapshot;
pub mod store;
#[cfg(test)]
mod testing;
pub mod topics;

pub use allocator::{Allocator, ReviewPolicy};
pub use error::{AllocationError, FailureKind, SelectionError, StoreError};
