//! Local filtering and sorting of catalog results.
//!
//! Everything here is pure: records come in, an ordered copy goes out.

mod engine;
mod spec;

pub use engine::{apply, genre_counts, paginate, FilterOutcome};
pub use spec::{FilterParams, FilterSpec, SortKey};
