//! # npay Core
//!
//! Core business logic for the non-covered (비급여) medical price analysis
//! service:
//! - Dataset model and CSV loading, with a startup registry for the public and
//!   crawled data sources
//! - The query engine: keyword filtering over selectable scopes, per-item
//!   aggregate statistics, peer ranking of the distinguished hospital, and the
//!   price-sorted report projection
//! - The append-only feedback log
//! - Shared display formatting for prices and counts
//!
//! **No API concerns**: HTTP servers, OpenAPI docs, or export encodings belong
//! in `npay-api-rest` and `npay-export`.

pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod feedback;
pub mod format;
pub mod query;
pub mod registry;

pub use config::CoreConfig;
pub use dataset::{Dataset, DatasetId, Record};
pub use error::{AnalysisError, AnalysisResult};
pub use feedback::FeedbackLog;
pub use query::{aggregate, filter, rank, report_projection};
pub use query::{FilterOutcome, ItemStats, Query, RankOutcome, Scope};
pub use registry::{load_single_dataset, DatasetEntry, DatasetRegistry};
