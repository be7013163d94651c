//! End-to-end benchmark: generate, load each store, run both campaigns.

use std::collections::HashSet;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, info_span};

use crate::bst::BinarySearchStore;
use crate::clock::{Clock, MonotonicClock};
use crate::config::BenchConfig;
use crate::error::Result;
use crate::record::{write_records, Key, KeyMode, KeyOrder, Record, RecordGenerator};
use crate::report::{CampaignSummary, ResultAggregator};
use crate::sequential::SequentialStore;
use crate::store::{LookupStore, QueryResult};
use crate::workload::{known_keys, Campaign, WorkloadRunner};

/// Query sampling uses its own stream, derived from the run seed.
const QUERY_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone)]
pub struct StoreReport {
    pub store: &'static str,
    pub len: usize,
    /// Only reported for the tree.
    pub height: Option<usize>,
    pub build_time: Duration,
    pub existing: Vec<QueryResult>,
    pub missing: Campaign,
}

impl StoreReport {
    pub fn existing_summary(&self) -> CampaignSummary {
        ResultAggregator::summarize(&self.existing)
    }

    pub fn missing_summary(&self) -> CampaignSummary {
        ResultAggregator::summarize(&self.missing.results)
    }

    /// Both campaigns of this store combined.
    pub fn total_summary(&self) -> CampaignSummary {
        self.existing_summary().merge(self.missing_summary())
    }
}

#[derive(Debug, Clone)]
pub struct BenchReport {
    /// The seed actually used, for reproducing the run.
    pub seed: u64,
    pub records: usize,
    pub order: KeyOrder,
    pub key_mode: KeyMode,
    pub stores: Vec<StoreReport>,
}

impl BenchReport {
    /// Every campaign of every store combined.
    pub fn grand_total(&self) -> CampaignSummary {
        self.stores
            .iter()
            .fold(CampaignSummary::default(), |acc, s| acc.merge(s.total_summary()))
    }
}

pub fn run_benchmark(config: &BenchConfig) -> Result<BenchReport> {
    run_benchmark_with_clock(config, &MonotonicClock::new())
}

/// Same as [`run_benchmark`], timing loads and searches with `clock`.
pub fn run_benchmark_with_clock<C>(config: &BenchConfig, clock: &C) -> Result<BenchReport>
where
    C: Clock + ?Sized,
{
    config.validate()?;
    let seed = config
        .seed
        .unwrap_or_else(|| StdRng::from_entropy().gen());
    let _span = info_span!("benchmark", seed, keys = config.keys, order = ?config.order).entered();

    let mut generator = RecordGenerator::from_seed(seed)
        .with_payload_len(config.payload_len)
        .with_aux_range(config.aux_range.clone())?;
    let records = generator.generate_mode(config.keys, config.order, config.key_mode)?;
    if let Some(path) = &config.data_file {
        write_records(path, &records)?;
        info!(path = %path.display(), "data file written");
    }
    let known = known_keys(&records);
    let universe = config.keys as u64;

    let mut stores = Vec::new();
    if config.stores.includes_bst() {
        let mut store = BinarySearchStore::with_capacity(records.len());
        let build_time = load(&mut store, &records, clock);
        let height = Some(store.height());
        stores.push(campaigns(config, seed, clock, &store, &known, universe, build_time, height)?);
    }
    if config.stores.includes_sequential() {
        let mut store =
            SequentialStore::with_capacity(records.len()).append_mode(config.append_mode);
        let build_time = load(&mut store, &records, clock);
        stores.push(campaigns(config, seed, clock, &store, &known, universe, build_time, None)?);
    }

    Ok(BenchReport {
        seed,
        records: records.len(),
        order: config.order,
        key_mode: config.key_mode,
        stores,
    })
}

fn load<S, C>(store: &mut S, records: &[Record], clock: &C) -> Duration
where
    S: LookupStore,
    C: Clock + ?Sized,
{
    let start = clock.now();
    let inserted = store.extend(records.iter().cloned());
    let build_time = clock.now().saturating_sub(start);
    debug!(store = store.name(), inserted, build_s = build_time.as_secs_f64(), "store loaded");
    build_time
}

#[allow(clippy::too_many_arguments)]
fn campaigns<S, C>(
    config: &BenchConfig,
    seed: u64,
    clock: &C,
    store: &S,
    known: &HashSet<Key>,
    universe: u64,
    build_time: Duration,
    height: Option<usize>,
) -> Result<StoreReport>
where
    S: LookupStore,
    C: Clock + ?Sized,
{
    let _span = info_span!("store", name = store.name()).entered();

    // Every store sees the same query keys.
    let mut runner = WorkloadRunner::from_seed(seed ^ QUERY_SEED_SALT)
        .with_clock(clock)
        .with_policy(config.miss_policy)
        .with_max_draws_per_sample(config.max_draws_per_sample);

    let existing = runner.run_existing(store, config.searches, universe)?;
    let missing = runner.run_missing(store, known, config.searches, universe)?;

    let report = StoreReport {
        store: store.name(),
        len: store.len(),
        height,
        build_time,
        existing,
        missing,
    };
    info!(existing = %report.existing_summary(), "existing-key campaign done");
    info!(missing = %report.missing_summary(), end = ?report.missing.end, "missing-key campaign done");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::StoreKind;
    use crate::record::read_records;
    use crate::sequential::AppendMode;
    use crate::workload::{CampaignEnd, MissPolicy};

    fn config(keys: usize, searches: usize, order: KeyOrder) -> BenchConfig {
        BenchConfig {
            keys,
            searches,
            order,
            seed: Some(17),
            ..Default::default()
        }
    }

    #[test]
    fn test_both_stores_agree() {
        let report = run_benchmark(&config(300, 50, KeyOrder::Shuffled)).unwrap();
        assert_eq!(report.seed, 17);
        assert_eq!(report.stores.len(), 2);

        let bst = &report.stores[0];
        let seq = &report.stores[1];
        assert_eq!(bst.store, "bst");
        assert_eq!(seq.store, "sequential");
        assert_eq!(bst.len, 300);
        assert!(bst.height.unwrap() < 300);

        let bst_keys: Vec<_> = bst.existing.iter().map(|r| r.key).collect();
        let seq_keys: Vec<_> = seq.existing.iter().map(|r| r.key).collect();
        assert_eq!(bst_keys, seq_keys);
        for (b, s) in bst.existing.iter().zip(&seq.existing) {
            assert_eq!(b.outcome, s.outcome);
        }

        assert_eq!(bst.existing_summary().found, 50);
        assert_eq!(seq.missing_summary().not_found, 50);
        assert_eq!(seq.missing.end, CampaignEnd::Completed);
    }

    #[test]
    fn test_ascending_degenerates_to_list_cost() {
        let report = run_benchmark(&config(200, 40, KeyOrder::Ascending)).unwrap();
        let bst = &report.stores[0];
        let seq = &report.stores[1];
        assert_eq!(bst.height, Some(200));
        // In a chain, a key's depth equals its list position.
        for (b, s) in bst.existing.iter().zip(&seq.existing) {
            assert_eq!(b.comparisons, s.comparisons);
        }
    }

    #[test]
    fn test_single_store_and_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");
        let cfg = BenchConfig {
            stores: StoreKind::Sequential,
            data_file: Some(path.clone()),
            ..config(64, 10, KeyOrder::Ascending)
        };
        let report = run_benchmark(&cfg).unwrap();
        assert_eq!(report.stores.len(), 1);
        assert_eq!(report.stores[0].height, None);

        let keys: Vec<_> = read_records(&path).unwrap().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, (1..=64).collect::<Vec<_>>());
    }

    #[test]
    fn test_budgeted_run_with_manual_clock() {
        let clock = ManualClock::with_step(Duration::from_millis(3));
        let cfg = BenchConfig {
            miss_policy: MissPolicy::TimeBudgeted {
                per_query: Duration::from_millis(2),
            },
            ..config(100, 20, KeyOrder::Shuffled)
        };
        let report = run_benchmark_with_clock(&cfg, &clock).unwrap();
        for s in &report.stores {
            assert_eq!(s.existing.len(), 20);
            assert_eq!(s.missing.results.len(), 1);
            assert!(matches!(s.missing.end, CampaignEnd::BudgetExceeded { .. }));
            assert_eq!(s.existing_summary().total_elapsed, Duration::from_millis(60));
            // One reading before and one after the bulk load.
            assert_eq!(s.build_time, Duration::from_millis(3));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(run_benchmark(&config(0, 10, KeyOrder::Shuffled)).is_err());
        assert!(run_benchmark(&config(10, 0, KeyOrder::Shuffled)).is_err());
    }

    #[test]
    fn test_grand_total_sums_every_campaign() {
        let report = run_benchmark(&config(150, 25, KeyOrder::Shuffled)).unwrap();
        let campaigns: Vec<CampaignSummary> = report
            .stores
            .iter()
            .flat_map(|s| [s.existing_summary(), s.missing_summary()])
            .collect();
        assert_eq!(campaigns.len(), 4);

        let total = report.grand_total();
        assert_eq!(total.queries, campaigns.iter().map(|c| c.queries).sum::<usize>());
        assert_eq!(total.queries, 100);
        assert_eq!(
            total.total_elapsed,
            campaigns.iter().map(|c| c.total_elapsed).sum::<Duration>()
        );
        assert_eq!(
            total.total_comparisons,
            campaigns.iter().map(|c| c.total_comparisons).sum::<u64>()
        );

        let bst = &report.stores[0];
        assert_eq!(
            bst.total_summary().total_elapsed,
            bst.existing_summary().total_elapsed + bst.missing_summary().total_elapsed
        );
    }

    #[test]
    fn test_with_replacement_keys() {
        let cfg = BenchConfig {
            key_mode: KeyMode::WithReplacement,
            ..config(200, 30, KeyOrder::Shuffled)
        };
        let report = run_benchmark(&cfg).unwrap();
        assert_eq!(report.key_mode, KeyMode::WithReplacement);
        let bst = &report.stores[0];
        let seq = &report.stores[1];

        let distinct = RecordGenerator::from_seed(17)
            .generate_mode(200, KeyOrder::Shuffled, KeyMode::WithReplacement)
            .unwrap()
            .iter()
            .map(|r| r.key)
            .collect::<HashSet<_>>()
            .len();
        // The tree drops repeated keys, the list keeps them all.
        assert_eq!(bst.len, distinct);
        assert!(bst.len < 200);
        assert_eq!(seq.len, 200);

        for (b, s) in bst.existing.iter().zip(&seq.existing) {
            assert_eq!(b.key, s.key);
            assert_eq!(b.outcome.is_found(), s.outcome.is_found());
        }
        assert_eq!(seq.missing_summary().not_found, 30);
    }

    #[test]
    fn test_scan_append_same_results() {
        let tail = run_benchmark(&BenchConfig {
            stores: StoreKind::Sequential,
            ..config(120, 20, KeyOrder::Shuffled)
        })
        .unwrap();
        let scan = run_benchmark(&BenchConfig {
            stores: StoreKind::Sequential,
            append_mode: AppendMode::Scan,
            ..config(120, 20, KeyOrder::Shuffled)
        })
        .unwrap();

        let (a, b) = (&tail.stores[0], &scan.stores[0]);
        assert_eq!(a.len, b.len);
        let counts = |r: &StoreReport| -> Vec<(Key, u64)> {
            r.existing
                .iter()
                .chain(&r.missing.results)
                .map(|q| (q.key, q.comparisons))
                .collect()
        };
        assert_eq!(counts(a), counts(b));
    }
}
