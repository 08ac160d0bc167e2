//! Prefix index over course codes for autocomplete.
//!
//! A character trie stored as an arena of nodes, keyed on the codes exactly
//! as given. Search folds case while walking the prefix, so `"cs1"` reaches
//! both `CS101` and `cs102`, which stay on separate nodes. The index is a
//! derived cache: rebuild it whenever the catalog changes.

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Node<T> {
    children: BTreeMap<char, usize>,
    records: Vec<T>,
}

/// Trie mapping code prefixes to the records indexed under them.
#[derive(Debug, Clone)]
pub struct PrefixIndex<T> {
    nodes: Vec<Node<T>>,
    len: usize,
}

impl<T> Default for PrefixIndex<T> {
    fn default() -> Self {
        Self {
            nodes: vec![Node {
                children: BTreeMap::new(),
                records: Vec::new(),
            }],
            len: 0,
        }
    }
}

impl<T: Clone> PrefixIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `(code, record)` pairs.
    pub fn build<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        index.rebuild(entries);
        index
    }

    /// Discard all entries and index `entries` from scratch.
    pub fn rebuild<I, S>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        *self = Self::default();
        for (code, record) in entries {
            self.insert(code.as_ref(), record);
        }
    }

    /// Index `record` under `code`. Only records with identical codes share
    /// a node; codes differing in case do not.
    pub fn insert(&mut self, code: &str, record: T) {
        let mut node = 0;
        for ch in code.chars() {
            let existing = self.nodes[node].children.get(&ch).copied();
            node = match existing {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node {
                        children: BTreeMap::new(),
                        records: Vec::new(),
                    });
                    self.nodes[node].children.insert(ch, child);
                    child
                }
            };
        }
        self.nodes[node].records.push(record);
        self.len += 1;
    }

    /// All records whose code starts with `prefix`, depth-first with
    /// children visited in character order. An empty prefix matches nothing.
    pub fn search(&self, prefix: &str) -> Vec<T> {
        self.search_limited(prefix, usize::MAX)
    }

    /// Like [`search`](Self::search) but stops after `limit` records.
    pub fn search_limited(&self, prefix: &str, limit: usize) -> Vec<T> {
        let mut results = Vec::new();
        if prefix.is_empty() || limit == 0 {
            return results;
        }

        let mut frontier = vec![0];
        for ch in prefix.chars() {
            frontier = frontier
                .iter()
                .flat_map(|&node| {
                    self.nodes[node]
                        .children
                        .iter()
                        .filter(move |(key, _)| same_letter(**key, ch))
                        .map(|(_, &child)| child)
                })
                .collect();
            if frontier.is_empty() {
                return results;
            }
        }

        let mut stack: Vec<usize> = frontier.into_iter().rev().collect();
        while let Some(idx) = stack.pop() {
            let current = &self.nodes[idx];
            for record in &current.records {
                if results.len() == limit {
                    return results;
                }
                results.push(record.clone());
            }
            stack.extend(current.children.values().rev().copied());
        }
        results
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_uppercase().eq(b.to_uppercase())
}
