//! Unordered singly-linked list store.
//!
//! Nodes live in a `Vec` arena and link to each other by index. Lookups are a
//! linear scan from the head; the first node with a matching key wins.

use crate::record::{Key, Record};
use crate::store::{InsertOutcome, LookupStore, Probe};

#[derive(Debug, Clone)]
struct Node {
    record: Record,
    next: Option<usize>,
}

/// How an insert finds the node to link after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppendMode {
    /// Link after the remembered tail.
    #[default]
    Tail,
    /// Walk from the head to find the last node on every insert.
    Scan,
}

#[derive(Debug, Clone)]
pub struct SequentialStore {
    nodes: Vec<Node>,
    head: Option<usize>,
    tail: Option<usize>,
    append: AppendMode,
}

impl SequentialStore {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: None,
            tail: None,
            append: AppendMode::Tail,
        }
    }

    /// A store whose inserts are O(n): each append scans for the last node.
    pub fn with_scan_append() -> Self {
        Self::new().append_mode(AppendMode::Scan)
    }

    /// Switches how later inserts append. The tail is tracked in both modes,
    /// so this is valid on a non-empty store.
    pub fn append_mode(mut self, mode: AppendMode) -> Self {
        self.append = mode;
        self
    }

    pub fn mode(&self) -> AppendMode {
        self.append
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    fn last(&self) -> Option<usize> {
        match self.append {
            AppendMode::Tail => self.tail,
            AppendMode::Scan => {
                let mut cur = self.head?;
                while let Some(next) = self.nodes[cur].next {
                    cur = next;
                }
                Some(cur)
            }
        }
    }

    /// Records in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            store: self,
            cur: self.head,
        }
    }
}

impl Default for SequentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupStore for SequentialStore {
    fn name(&self) -> &'static str {
        "sequential"
    }

    /// Appends without checking for an existing key.
    fn insert(&mut self, record: Record) -> InsertOutcome {
        let idx = self.nodes.len();
        let last = self.last();
        self.nodes.push(Node { record, next: None });
        match last {
            Some(last) => self.nodes[last].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        InsertOutcome::Inserted
    }

    fn probe(&self, key: Key) -> Probe<'_> {
        let mut comparisons = 0;
        let mut cur = self.head;
        while let Some(idx) = cur {
            let node = &self.nodes[idx];
            comparisons += 1;
            if node.record.key == key {
                return Probe {
                    record: Some(&node.record),
                    comparisons,
                };
            }
            cur = node.next;
        }
        Probe {
            record: None,
            comparisons,
        }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

pub struct Iter<'a> {
    store: &'a SequentialStore,
    cur: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.store.nodes[self.cur?];
        self.cur = node.next;
        Some(&node.record)
    }
}
