//! Benchmark configuration.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::record::{KeyMode, KeyOrder, DEFAULT_AUX_RANGE, DEFAULT_PAYLOAD_LEN};
use crate::sequential::AppendMode;
use crate::workload::{MissPolicy, DEFAULT_MAX_DRAWS_PER_SAMPLE};

/// Which stores a run exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    Bst,
    Sequential,
    #[default]
    Both,
}

impl StoreKind {
    pub fn includes_bst(self) -> bool {
        matches!(self, StoreKind::Bst | StoreKind::Both)
    }

    pub fn includes_sequential(self) -> bool {
        matches!(self, StoreKind::Sequential | StoreKind::Both)
    }
}

/// Configuration for a full benchmark run.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Number of records, keyed `1..=keys`.
    pub keys: usize,
    /// Queries per campaign.
    pub searches: usize,
    pub order: KeyOrder,
    pub key_mode: KeyMode,
    /// How the list finds its last node while loading.
    pub append_mode: AppendMode,
    pub payload_len: usize,
    pub aux_range: RangeInclusive<u32>,
    /// Seed for both generation and sampling. `None` draws from entropy.
    pub seed: Option<u64>,
    pub miss_policy: MissPolicy,
    pub max_draws_per_sample: u64,
    pub stores: StoreKind,
    /// Where to dump the generated records, if anywhere.
    pub data_file: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            keys: 1_000,
            searches: 100,
            order: KeyOrder::Shuffled,
            key_mode: KeyMode::Permutation,
            append_mode: AppendMode::Tail,
            payload_len: DEFAULT_PAYLOAD_LEN,
            aux_range: DEFAULT_AUX_RANGE,
            seed: None,
            miss_policy: MissPolicy::StrictCount,
            max_draws_per_sample: DEFAULT_MAX_DRAWS_PER_SAMPLE,
            stores: StoreKind::Both,
            data_file: None,
        }
    }
}

impl BenchConfig {
    /// Budget used by `MissPolicy::TimeBudgeted` when none is given.
    pub const DEFAULT_QUERY_BUDGET: Duration = Duration::from_secs(1);

    pub fn validate(&self) -> Result<()> {
        if self.keys == 0 {
            return Err(Error::invalid("key count", self.keys));
        }
        if self.searches == 0 {
            return Err(Error::invalid("search count", self.searches));
        }
        if self.payload_len == 0 {
            return Err(Error::invalid("payload length", self.payload_len));
        }
        if self.aux_range.is_empty() {
            return Err(Error::invalid("auxiliary range", format!("{:?}", self.aux_range)));
        }
        if self.max_draws_per_sample == 0 {
            return Err(Error::invalid("max draws per sample", 0));
        }
        if let MissPolicy::TimeBudgeted { per_query } = self.miss_policy {
            if per_query.is_zero() {
                return Err(Error::invalid("per-query budget", "0s"));
            }
        }
        Ok(())
    }
}
