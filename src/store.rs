//! The lookup-store abstraction shared by the list and the tree.

use std::time::Duration;

use crate::clock::{Clock, MonotonicClock};
use crate::record::{Key, Record};

/// Result of an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The key was already present and the store was left unchanged.
    Duplicate,
}

/// Untimed result of a single traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe<'a> {
    pub record: Option<&'a Record>,
    /// Nodes visited, including the node that terminated the walk.
    pub comparisons: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found(Record),
    NotFound,
}

impl Outcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }
}

/// A timed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub key: Key,
    pub outcome: Outcome,
    pub elapsed: Duration,
    pub comparisons: u64,
}

/// A keyed store that can be bulk loaded and then searched.
pub trait LookupStore {
    /// Short label used in logs and reports.
    fn name(&self) -> &'static str;

    fn insert(&mut self, record: Record) -> InsertOutcome;

    fn probe(&self, key: Key) -> Probe<'_>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Searches for `key`, timing the traversal with the wall clock.
    fn search(&self, key: Key) -> QueryResult {
        timed_search(self, key, &MonotonicClock::new())
    }

    /// Inserts every record in order, returning how many were stored.
    fn extend<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = Record>,
        Self: Sized,
    {
        let mut inserted = 0;
        for r in records {
            if self.insert(r) == InsertOutcome::Inserted {
                inserted += 1;
            }
        }
        inserted
    }
}

/// Runs `store.probe(key)` between two clock readings.
///
/// The found record is cloned only after the second reading.
pub fn timed_search<S, C>(store: &S, key: Key, clock: &C) -> QueryResult
where
    S: LookupStore + ?Sized,
    C: Clock + ?Sized,
{
    let start = clock.now();
    let probe = store.probe(key);
    let elapsed = clock.now().saturating_sub(start);

    let outcome = match probe.record {
        Some(r) => Outcome::Found(r.clone()),
        None => Outcome::NotFound,
    };
    QueryResult {
        key,
        outcome,
        elapsed,
        comparisons: probe.comparisons,
    }
}
