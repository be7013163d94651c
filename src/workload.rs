//! Randomized hit/miss query campaigns.

use std::collections::HashSet;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::error::{Error, Result};
use crate::record::{Key, Record};
use crate::store::{timed_search, LookupStore, QueryResult};

/// Default cap on missing-key draws, per requested sample.
pub const DEFAULT_MAX_DRAWS_PER_SAMPLE: u64 = 1_000;

/// How a missing-key campaign decides it is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissPolicy {
    /// Keep drawing until the requested number of misses is collected.
    #[default]
    StrictCount,
    /// As `StrictCount`, but abandon the campaign as soon as one query takes
    /// longer than `per_query`.
    TimeBudgeted { per_query: Duration },
}

/// Why a campaign stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignEnd {
    Completed,
    /// The query for `key` took `elapsed`, over budget. Its result is the
    /// last one in the campaign.
    BudgetExceeded { key: Key, elapsed: Duration },
}

#[derive(Debug, Clone)]
pub struct Campaign {
    pub results: Vec<QueryResult>,
    pub end: CampaignEnd,
    /// Random draws consumed, including ones rejected as known keys.
    pub draws: u64,
}

/// The key set of a generated batch, used to filter missing-key draws.
pub fn known_keys(records: &[Record]) -> HashSet<Key> {
    records.iter().map(|r| r.key).collect()
}

/// Drives query campaigns against a populated store.
pub struct WorkloadRunner<C = MonotonicClock> {
    rng: StdRng,
    clock: C,
    policy: MissPolicy,
    max_draws_per_sample: u64,
}

impl WorkloadRunner<MonotonicClock> {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            clock: MonotonicClock::new(),
            policy: MissPolicy::default(),
            max_draws_per_sample: DEFAULT_MAX_DRAWS_PER_SAMPLE,
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<C: Clock> WorkloadRunner<C> {
    pub fn with_clock<D: Clock>(self, clock: D) -> WorkloadRunner<D> {
        WorkloadRunner {
            rng: self.rng,
            clock,
            policy: self.policy,
            max_draws_per_sample: self.max_draws_per_sample,
        }
    }

    pub fn with_policy(mut self, policy: MissPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_draws_per_sample(mut self, max: u64) -> Self {
        self.max_draws_per_sample = max;
        self
    }

    pub fn policy(&self) -> MissPolicy {
        self.policy
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Queries `sample_count` keys drawn uniformly, with replacement, from
    /// `1..=key_universe`. Results are in draw order.
    pub fn run_existing<S>(
        &mut self,
        store: &S,
        sample_count: usize,
        key_universe: u64,
    ) -> Result<Vec<QueryResult>>
    where
        S: LookupStore + ?Sized,
    {
        check_counts(sample_count, key_universe)?;
        debug!(store = store.name(), sample_count, key_universe, "existing-key campaign");

        let mut results = Vec::with_capacity(sample_count);
        for _ in 0..sample_count {
            let key = self.rng.gen_range(1..=key_universe);
            let r = timed_search(store, key, &self.clock);
            trace!(key, found = r.outcome.is_found(), comparisons = r.comparisons, "hit query");
            results.push(r);
        }
        Ok(results)
    }

    /// Collects `sample_count` misses by rejection sampling `1..=2*key_universe`
    /// against `known`.
    ///
    /// Draws are capped at `sample_count * max_draws_per_sample`; running out
    /// is reported as [`Error::Exhausted`]. A draw that `known` does not
    /// contain but the store still finds is skipped.
    pub fn run_missing<S>(
        &mut self,
        store: &S,
        known: &HashSet<Key>,
        sample_count: usize,
        key_universe: u64,
    ) -> Result<Campaign>
    where
        S: LookupStore + ?Sized,
    {
        check_counts(sample_count, key_universe)?;
        if self.max_draws_per_sample == 0 {
            return Err(Error::invalid("max draws per sample", 0));
        }

        let upper = key_universe.saturating_mul(2);
        let known_in_range = known.iter().filter(|&&k| (1..=upper).contains(&k)).count() as u64;
        if known_in_range >= upper {
            warn!(store = store.name(), upper, "no missing keys exist in draw range");
            return Err(Error::Exhausted {
                collected: 0,
                requested: sample_count,
                attempts: 0,
            });
        }

        let max_draws = (sample_count as u64).saturating_mul(self.max_draws_per_sample);
        debug!(
            store = store.name(),
            sample_count,
            upper,
            max_draws,
            policy = ?self.policy,
            "missing-key campaign"
        );

        let mut results = Vec::with_capacity(sample_count);
        let mut draws = 0u64;
        while results.len() < sample_count {
            if draws >= max_draws {
                warn!(
                    store = store.name(),
                    collected = results.len(),
                    draws,
                    "missing-key sampling exhausted"
                );
                return Err(Error::Exhausted {
                    collected: results.len(),
                    requested: sample_count,
                    attempts: draws,
                });
            }

            let key = self.rng.gen_range(1..=upper);
            draws += 1;
            if known.contains(&key) {
                continue;
            }

            let r = timed_search(store, key, &self.clock);
            if r.outcome.is_found() {
                trace!(key, "draw outside known set was found; skipping");
                continue;
            }
            trace!(key, comparisons = r.comparisons, "miss query");

            let elapsed = r.elapsed;
            results.push(r);

            if let MissPolicy::TimeBudgeted { per_query } = self.policy {
                if elapsed > per_query {
                    warn!(
                        store = store.name(),
                        key,
                        elapsed_s = elapsed.as_secs_f64(),
                        budget_s = per_query.as_secs_f64(),
                        "query over budget; abandoning campaign"
                    );
                    return Ok(Campaign {
                        results,
                        end: CampaignEnd::BudgetExceeded { key, elapsed },
                        draws,
                    });
                }
            }
        }

        Ok(Campaign {
            results,
            end: CampaignEnd::Completed,
            draws,
        })
    }
}

fn check_counts(sample_count: usize, key_universe: u64) -> Result<()> {
    if sample_count == 0 {
        return Err(Error::invalid("sample count", sample_count));
    }
    if key_universe == 0 {
        return Err(Error::invalid("key universe size", key_universe));
    }
    Ok(())
}
