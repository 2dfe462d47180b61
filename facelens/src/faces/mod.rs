//! Face comparison.
//!
//! A [`FaceComparator`] turns two staged image paths into a raw JSON verdict;
//! [`coerce_comparison`] makes that verdict safe to serialise with a strict
//! boolean `match`.

mod api;
mod coerce;
mod provider;

pub use api::FaceApiClient;
pub use coerce::{coerce_comparison, truthy, ComparisonResult};
pub use provider::{FaceComparator, FaceProvider};
