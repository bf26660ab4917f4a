// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod fetch;
pub mod snapshot;
pub mod sources;

// ---- Re-exports for stable public API ----
pub use crate::fetch::Fetcher;
pub use crate::snapshot::{run, FetchResult, RunOutcome, Snapshot};
pub use crate::sources::{Config, LatestPolicy, Source, SourceGroup};
