// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod archive;
pub mod classify;
pub mod config;
pub mod emit;
pub mod ingest;
pub mod pipeline;
pub mod rank;
pub mod report;
pub mod taxonomy;
pub mod trend;

// ---- Re-exports for stable public API ----
pub use crate::classify::{classify, Classification, ClassifierCfg, SignalType};
pub use crate::config::{Domain, SentinelConfig};
pub use crate::ingest::types::{Candidate, Concept, FetchQuery, SourceProvider};
pub use crate::pipeline::{build_report, run_once, RunOutcome, RunSettings};
pub use crate::report::Report;
pub use crate::taxonomy::{Taxonomy, TaxonomyRule};
