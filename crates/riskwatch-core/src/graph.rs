//! Course prerequisite graph.
//!
//! Edges point from a prerequisite to the course that requires it, so the
//! prerequisites of a course are its ancestors. The graph is built once per
//! catalog version and handed to the engine by reference; rebuilding after a
//! catalog change is the caller's job.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use petgraph::Direction;

use crate::error::RiskError;

/// Directed graph of course codes with prerequisite → dependent edges.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `code` and an edge from each prerequisite to it.
    ///
    /// Nodes are created on first mention. Re-adding a course only adds
    /// edges; nothing is ever removed.
    pub fn add_course<S: AsRef<str>>(&mut self, code: &str, prereqs: &[S]) {
        let target = self.node(code);
        for prereq in prereqs {
            let source = self.node(prereq.as_ref());
            self.graph.update_edge(source, target, ());
        }
    }

    /// All transitive prerequisites of `code`. Empty for unknown codes.
    pub fn prerequisites_of(&self, code: &str) -> BTreeSet<String> {
        let Some(&start) = self.nodes.get(code) else {
            return BTreeSet::new();
        };
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, start);
        let mut ancestors = BTreeSet::new();
        while let Some(idx) = bfs.next(reversed) {
            if idx != start {
                ancestors.insert(self.graph[idx].clone());
            }
        }
        ancestors
    }

    /// Immediate prerequisites of `code`. Empty for unknown codes.
    pub fn direct_prerequisites_of(&self, code: &str) -> BTreeSet<String> {
        let Some(&idx) = self.nodes.get(code) else {
            return BTreeSet::new();
        };
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    /// Transitive prerequisites of `code` not present in `completed`.
    pub fn missing_prerequisites(
        &self,
        code: &str,
        completed: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        self.prerequisites_of(code)
            .into_iter()
            .filter(|p| !completed.contains(p))
            .collect()
    }

    /// Whether every transitive prerequisite of `code` is in `completed`.
    pub fn can_take(&self, code: &str, completed: &BTreeSet<String>) -> bool {
        self.missing_prerequisites(code, completed).is_empty()
    }

    /// Enumerate simple cycles.
    ///
    /// Each cycle is listed once, rotated to start at its lexicographically
    /// smallest code. Cycles are grouped by strongly connected component and
    /// only walked inside their component.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();

        for component in tarjan_scc(&self.graph) {
            if component.len() == 1 {
                let idx = component[0];
                if self.graph.contains_edge(idx, idx) {
                    cycles.push(vec![self.graph[idx].clone()]);
                }
                continue;
            }

            let mut members: Vec<NodeIndex> = component;
            members.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
            let rank: HashMap<NodeIndex, usize> =
                members.iter().enumerate().map(|(i, n)| (*n, i)).collect();

            for (i, &start) in members.iter().enumerate() {
                self.cycles_from(start, i, &rank, &mut cycles);
            }
        }

        cycles.sort();
        cycles
    }

    /// Fail with [`RiskError::CyclicCatalog`] if any cycle exists.
    pub fn ensure_acyclic(&self) -> Result<(), RiskError> {
        let cycles = self.detect_cycles();
        if cycles.is_empty() {
            return Ok(());
        }
        tracing::warn!(count = cycles.len(), "prerequisite graph contains cycles");
        Err(RiskError::CyclicCatalog { cycles })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.nodes.contains_key(code)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn node(&mut self, code: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(code) {
            return idx;
        }
        let idx = self.graph.add_node(code.to_string());
        self.nodes.insert(code.to_string(), idx);
        idx
    }

    /// Depth-first walk from `start` over nodes ranked at or after
    /// `min_rank`, recording every path that returns to `start`.
    fn cycles_from(
        &self,
        start: NodeIndex,
        min_rank: usize,
        rank: &HashMap<NodeIndex, usize>,
        out: &mut Vec<Vec<String>>,
    ) {
        let successors = |n: NodeIndex| -> Vec<NodeIndex> {
            let mut next: Vec<NodeIndex> = self
                .graph
                .neighbors_directed(n, Direction::Outgoing)
                .filter(|m| rank.get(m).is_some_and(|&r| r >= min_rank))
                .collect();
            next.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
            next.dedup();
            next
        };

        let mut path = vec![start];
        let mut on_path = vec![false; self.graph.node_count()];
        on_path[start.index()] = true;
        let mut stack = vec![(successors(start), 0usize)];

        while let Some((next, pos)) = stack.last_mut() {
            let Some(&n) = next.get(*pos) else {
                stack.pop();
                if let Some(done) = path.pop() {
                    on_path[done.index()] = false;
                }
                continue;
            };
            *pos += 1;

            if n == start {
                out.push(path.iter().map(|i| self.graph[*i].clone()).collect());
            } else if !on_path[n.index()] {
                on_path[n.index()] = true;
                path.push(n);
                stack.push((successors(n), 0));
            }
        }
    }
}
