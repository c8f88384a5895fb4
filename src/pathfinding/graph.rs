use std::collections::BTreeMap;

use super::models::{CorridorDirection, Node};

/// Directed weighted adjacency list.
///
/// Nodes are kept in key order and each node's edges in insertion order, so
/// iteration (and everything built on it) is reproducible for a given input.
#[derive(Clone, Debug, PartialEq)]
pub struct Graph<N: Ord> {
    adj: BTreeMap<N, Vec<(N, f64)>>,
}

impl<N: Ord> Default for Graph<N> {
    fn default() -> Self {
        Self { adj: BTreeMap::new() }
    }
}

impl<N: Copy + Ord> Graph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, n: N) {
        self.adj.entry(n).or_default();
    }

    /// Inserts `a -> b`. Returns false for self-loops and for edges that
    /// already existed (the smaller weight is kept).
    pub fn add_edge(&mut self, a: N, b: N, weight: f64) -> bool {
        if a == b {
            return false;
        }
        self.add_node(b);
        let edges = self.adj.entry(a).or_default();
        if let Some(existing) = edges.iter_mut().find(|(t, _)| *t == b) {
            if weight < existing.1 {
                existing.1 = weight;
            }
            return false;
        }
        edges.push((b, weight));
        true
    }

    /// Inserts the directed edge(s) a corridor segment `a -> b` allows.
    /// Returns how many new edges were added.
    pub fn add_directed(&mut self, a: N, b: N, weight: f64, direction: CorridorDirection) -> usize {
        match direction {
            CorridorDirection::Both => {
                self.add_edge(a, b, weight) as usize + self.add_edge(b, a, weight) as usize
            }
            CorridorDirection::Forward => self.add_edge(a, b, weight) as usize,
            CorridorDirection::Backward => self.add_edge(b, a, weight) as usize,
        }
    }

    pub fn contains(&self, n: &N) -> bool {
        self.adj.contains_key(n)
    }

    pub fn neighbors(&self, n: &N) -> &[(N, f64)] {
        self.adj.get(n).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn edge_weight(&self, a: &N, b: &N) -> Option<f64> {
        self.neighbors(a).iter().find(|(t, _)| t == b).map(|&(_, w)| w)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.adj.keys()
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adj.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }

    /// Re-keys every node through `f`; used to lift per-level graphs into
    /// the level-qualified keyspace.
    pub fn map_nodes<M: Copy + Ord>(self, f: impl Fn(N) -> M) -> Graph<M> {
        let mut out = Graph::new();
        for (n, edges) in self.adj {
            let from = f(n);
            out.add_node(from);
            for (t, w) in edges {
                out.add_edge(from, f(t), w);
            }
        }
        out
    }

    /// Folds `other` into `self`.
    pub fn merge(&mut self, other: Graph<N>) {
        for (n, edges) in other.adj {
            self.add_node(n);
            for (t, w) in edges {
                self.add_edge(n, t, w);
            }
        }
    }
}

impl Graph<Node> {
    pub fn nodes_on_level(&self, level: i32) -> impl Iterator<Item = &Node> {
        self.adj
            .range(Node::new(level, i32::MIN, i32::MIN)..=Node::new(level, i32::MAX, i32::MAX))
            .map(|(n, _)| n)
    }
}
