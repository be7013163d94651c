//! Unbalanced binary search tree store.
//!
//! Nodes live in a `Vec` arena; `left`/`right` hold child indices. There is no
//! rebalancing, so insertion order fixes the shape: ascending keys produce a
//! right-leaning chain whose searches cost as much as a list scan.
//!
//! Invariant: for every node, keys in the left subtree are strictly smaller
//! and keys in the right subtree strictly greater. Inserting a key that is
//! already present is a no-op.

use std::cmp::Ordering;

use crate::record::{Key, Record};
use crate::store::{InsertOutcome, LookupStore, Probe};

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) record: Record,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct BinarySearchStore {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: Option<usize>,
}

impl BinarySearchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root: None,
        }
    }

    fn alloc(&mut self, record: Record) -> usize {
        self.nodes.push(Node {
            record,
            left: None,
            right: None,
        });
        self.nodes.len() - 1
    }

    /// Number of nodes on the longest root-to-leaf path. Zero when empty.
    pub fn height(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(usize, usize)> = Vec::new();
        if let Some(root) = self.root {
            stack.push((root, 1));
        }
        while let Some((idx, depth)) = stack.pop() {
            max = max.max(depth);
            let node = &self.nodes[idx];
            for child in [node.left, node.right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        max
    }

    /// 1-indexed depth of the node holding `key`.
    pub fn depth_of(&self, key: Key) -> Option<u64> {
        let probe = self.probe(key);
        probe.record.map(|_| probe.comparisons)
    }

    /// Records in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        let mut it = Iter {
            store: self,
            stack: Vec::new(),
        };
        it.push_left(self.root);
        it
    }
}

impl LookupStore for BinarySearchStore {
    fn name(&self) -> &'static str {
        "bst"
    }

    fn insert(&mut self, record: Record) -> InsertOutcome {
        let Some(mut cur) = self.root else {
            let idx = self.alloc(record);
            self.root = Some(idx);
            return InsertOutcome::Inserted;
        };

        loop {
            let ord = record.key.cmp(&self.nodes[cur].record.key);
            let next = match ord {
                Ordering::Equal => return InsertOutcome::Duplicate,
                Ordering::Less => self.nodes[cur].left,
                Ordering::Greater => self.nodes[cur].right,
            };
            match next {
                Some(child) => cur = child,
                None => {
                    let idx = self.alloc(record);
                    let parent = &mut self.nodes[cur];
                    if ord == Ordering::Less {
                        parent.left = Some(idx);
                    } else {
                        parent.right = Some(idx);
                    }
                    return InsertOutcome::Inserted;
                }
            }
        }
    }

    /// On a miss in a non-empty tree the empty child slot that ends the walk
    /// is counted too, so the count is the depth of that slot.
    fn probe(&self, key: Key) -> Probe<'_> {
        if self.root.is_none() {
            return Probe {
                record: None,
                comparisons: 0,
            };
        }

        let mut comparisons = 0;
        let mut cur = self.root;
        while let Some(idx) = cur {
            let node = &self.nodes[idx];
            comparisons += 1;
            cur = match key.cmp(&node.record.key) {
                Ordering::Equal => {
                    return Probe {
                        record: Some(&node.record),
                        comparisons,
                    }
                }
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        Probe {
            record: None,
            comparisons: comparisons + 1,
        }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// In-order iterator over a [`BinarySearchStore`].
pub struct Iter<'a> {
    store: &'a BinarySearchStore,
    stack: Vec<usize>,
}

impl<'a> Iter<'a> {
    fn push_left(&mut self, mut cur: Option<usize>) {
        while let Some(idx) = cur {
            self.stack.push(idx);
            cur = self.store.nodes[idx].left;
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = &self.store.nodes[idx];
        self.push_left(node.right);
        Some(&node.record)
    }
}
