//! Records and the randomized record generator.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::ops::RangeInclusive;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{Error, Result};

/// Record key. Generated datasets use the dense range `1..=count`.
pub type Key = u64;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const DEFAULT_PAYLOAD_LEN: usize = 10;
pub const DEFAULT_AUX_RANGE: RangeInclusive<u32> = 1..=100;

/// An immutable `(key, auxiliary, payload)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: Key,
    pub auxiliary: u32,
    pub payload: String,
}

impl Record {
    pub fn new(key: Key, auxiliary: u32, payload: impl Into<String>) -> Self {
        Self {
            key,
            auxiliary,
            payload: payload.into(),
        }
    }
}

/// Order in which generated keys are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyOrder {
    /// `1, 2, ..., count`. Degenerates the BST into a chain.
    Ascending,
    /// A uniform permutation of `1..=count`.
    #[default]
    Shuffled,
}

impl KeyOrder {
    pub fn from_sorted(sorted: bool) -> Self {
        if sorted {
            KeyOrder::Ascending
        } else {
            KeyOrder::Shuffled
        }
    }
}

/// How generated keys are drawn from `1..=count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    /// Every key exactly once.
    #[default]
    Permutation,
    /// Independent draws, so duplicates and gaps are expected.
    WithReplacement,
}

/// Produces record batches from an explicitly owned, optionally seeded rng.
pub struct RecordGenerator {
    rng: StdRng,
    payload_len: usize,
    aux_range: RangeInclusive<u32>,
}

impl RecordGenerator {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            payload_len: DEFAULT_PAYLOAD_LEN,
            aux_range: DEFAULT_AUX_RANGE,
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn with_payload_len(mut self, len: usize) -> Self {
        self.payload_len = len;
        self
    }

    pub fn with_aux_range(mut self, range: RangeInclusive<u32>) -> Result<Self> {
        if range.is_empty() {
            return Err(Error::invalid("auxiliary range", format!("{range:?}")));
        }
        self.aux_range = range;
        Ok(self)
    }

    /// Generates exactly `count` records whose keys are a permutation of
    /// `1..=count`.
    pub fn generate(&mut self, count: usize, order: KeyOrder) -> Result<Vec<Record>> {
        if count == 0 {
            return Err(Error::invalid("record count", count));
        }

        let mut keys: Vec<Key> = (1..=count as Key).collect();
        if order == KeyOrder::Shuffled {
            keys.shuffle(&mut self.rng);
        }

        let records: Vec<Record> = keys.into_iter().map(|key| self.record(key)).collect();
        debug!(count, ?order, payload_len = self.payload_len, "generated records");
        Ok(records)
    }

    /// Generates `count` records with keys drawn from `1..=count` with
    /// replacement, so duplicates and gaps are expected.
    pub fn generate_with_replacement(&mut self, count: usize) -> Result<Vec<Record>> {
        if count == 0 {
            return Err(Error::invalid("record count", count));
        }
        let records = (0..count)
            .map(|_| {
                let key = self.rng.gen_range(1..=count as Key);
                self.record(key)
            })
            .collect();
        debug!(count, "generated records with replacement");
        Ok(records)
    }

    /// Dispatches on `mode`. With replacement and ascending order, the drawn
    /// keys are emitted sorted.
    pub fn generate_mode(
        &mut self,
        count: usize,
        order: KeyOrder,
        mode: KeyMode,
    ) -> Result<Vec<Record>> {
        match mode {
            KeyMode::Permutation => self.generate(count, order),
            KeyMode::WithReplacement => {
                let mut records = self.generate_with_replacement(count)?;
                if order == KeyOrder::Ascending {
                    records.sort_by_key(|r| r.key);
                }
                Ok(records)
            }
        }
    }

    fn record(&mut self, key: Key) -> Record {
        let auxiliary = self.rng.gen_range(self.aux_range.clone());
        let payload = (0..self.payload_len)
            .map(|_| LETTERS[self.rng.gen_range(0..LETTERS.len())] as char)
            .collect();
        Record {
            key,
            auxiliary,
            payload,
        }
    }
}

/// Writes one `key auxiliary payload` line per record, in slice order.
pub fn write_records_to<W: Write>(mut out: W, records: &[Record]) -> Result<()> {
    for r in records {
        writeln!(out, "{} {} {}", r.key, r.auxiliary, r.payload)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_records(path: impl AsRef<Path>, records: &[Record]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_records_to(BufWriter::new(file), records)?;
    debug!(path = %path.display(), count = records.len(), "wrote data file");
    Ok(())
}

pub fn read_records_from<R: BufRead>(input: R) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let lineno = idx + 1;
        let mut fields = line.split_whitespace();
        let (Some(key), Some(aux), Some(payload), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(Error::Parse {
                line: lineno,
                reason: "expected exactly 3 fields".into(),
            });
        };
        let key = key.parse::<Key>().map_err(|e| Error::Parse {
            line: lineno,
            reason: format!("key: {e}"),
        })?;
        let auxiliary = aux.parse::<u32>().map_err(|e| Error::Parse {
            line: lineno,
            reason: format!("auxiliary: {e}"),
        })?;
        records.push(Record::new(key, auxiliary, payload));
    }
    Ok(records)
}

pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    read_records_from(BufReader::new(File::open(path)?))
}
