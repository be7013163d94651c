//! # lookup-bench
//!
//! A benchmarking harness that compares an unbalanced binary search tree
//! against an unordered singly-linked list, measuring search latency and
//! comparison counts for keys that exist and keys that do not.
//!
//! Both stores keep their nodes in a `Vec` arena linked by index. The tree is
//! never rebalanced: ascending insertion collapses it into a chain, which is
//! the contrast case against the list.
//!
//! ## Example
//!
//! ```rust
//! use lookup_bench::{BinarySearchStore, KeyOrder, LookupStore, RecordGenerator, SequentialStore};
//!
//! let records = RecordGenerator::from_seed(1).generate(5, KeyOrder::Ascending).unwrap();
//!
//! let mut tree = BinarySearchStore::new();
//! let mut list = SequentialStore::new();
//! tree.extend(records.iter().cloned());
//! list.extend(records);
//!
//! // Ascending keys: the tree is a chain, so both stores walk five nodes.
//! assert_eq!(tree.search(5).comparisons, 5);
//! assert_eq!(list.search(5).comparisons, 5);
//! assert!(!tree.search(9).outcome.is_found());
//! ```

pub mod bench;
pub mod bst;
pub mod clock;
pub mod config;
pub mod error;
pub mod record;
pub mod report;
pub mod sequential;
pub mod store;
pub mod workload;

pub use bench::{run_benchmark, run_benchmark_with_clock, BenchReport, StoreReport};
pub use bst::BinarySearchStore;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{BenchConfig, StoreKind};
pub use error::{Error, Result};
pub use record::{Key, KeyMode, KeyOrder, Record, RecordGenerator};
pub use report::{CampaignSummary, QueryLine, ResultAggregator};
pub use sequential::{AppendMode, SequentialStore};
pub use store::{timed_search, InsertOutcome, LookupStore, Outcome, Probe, QueryResult};
pub use workload::{Campaign, CampaignEnd, MissPolicy, WorkloadRunner};

#[cfg(test)]
mod proptests;
