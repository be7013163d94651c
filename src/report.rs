//! Reduction of query results into totals, plus the console line format.

use std::fmt;
use std::time::Duration;

use crate::store::{Outcome, QueryResult};

/// Pure reductions over a slice of results.
pub struct ResultAggregator;

impl ResultAggregator {
    pub fn total_elapsed(results: &[QueryResult]) -> Duration {
        results.iter().map(|r| r.elapsed).sum()
    }

    pub fn total_comparisons(results: &[QueryResult]) -> u64 {
        results.iter().map(|r| r.comparisons).sum()
    }

    pub fn summarize(results: &[QueryResult]) -> CampaignSummary {
        let found = results.iter().filter(|r| r.outcome.is_found()).count();
        CampaignSummary {
            queries: results.len(),
            found,
            not_found: results.len() - found,
            total_elapsed: Self::total_elapsed(results),
            total_comparisons: Self::total_comparisons(results),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CampaignSummary {
    pub queries: usize,
    pub found: usize,
    pub not_found: usize,
    pub total_elapsed: Duration,
    pub total_comparisons: u64,
}

impl CampaignSummary {
    pub fn mean_comparisons(&self) -> f64 {
        if self.queries == 0 {
            return 0.0;
        }
        self.total_comparisons as f64 / self.queries as f64
    }

    pub fn mean_elapsed(&self) -> Duration {
        match u32::try_from(self.queries) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_elapsed / n,
            Err(_) => Duration::from_secs_f64(self.total_elapsed.as_secs_f64() / self.queries as f64),
        }
    }

    /// Combines two summaries, e.g. the hit and miss campaigns of one store.
    pub fn merge(self, other: CampaignSummary) -> CampaignSummary {
        CampaignSummary {
            queries: self.queries + other.queries,
            found: self.found + other.found,
            not_found: self.not_found + other.not_found,
            total_elapsed: self.total_elapsed + other.total_elapsed,
            total_comparisons: self.total_comparisons + other.total_comparisons,
        }
    }
}

impl fmt::Display for CampaignSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} queries ({} found, {} not found), total {:.6}s, {} comparisons (mean {:.2})",
            self.queries,
            self.found,
            self.not_found,
            self.total_elapsed.as_secs_f64(),
            self.total_comparisons,
            self.mean_comparisons()
        )
    }
}

/// Displays one result as `key=<k> found elapsed=<s>s comparisons=<n>`.
pub struct QueryLine<'a>(pub &'a QueryResult);

impl fmt::Display for QueryLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        let status = match r.outcome {
            Outcome::Found(_) => "found",
            Outcome::NotFound => "not found",
        };
        write!(
            f,
            "key={} {} elapsed={:.6}s comparisons={}",
            r.key,
            status,
            r.elapsed.as_secs_f64(),
            r.comparisons
        )
    }
}
