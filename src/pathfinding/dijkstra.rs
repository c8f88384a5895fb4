use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use super::graph::Graph;

/// Distance key with a total order so it can live in the frontier set.
#[derive(Copy, Clone, Debug)]
struct Dist(f64);

impl PartialEq for Dist {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Dist {}

impl PartialOrd for Dist {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dist {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SearchTimedOut;

/// Result of a single-source search: final distances for every node settled
/// before the search stopped. Nodes only seen on the frontier are not
/// reported.
#[derive(Clone, Debug)]
pub struct ShortestPathTree<N: Ord> {
    pub source: N,
    dist: BTreeMap<N, f64>,
    prev: BTreeMap<N, N>,
}

impl<N: Copy + Ord> ShortestPathTree<N> {
    pub fn distance_to(&self, n: &N) -> f64 {
        self.dist.get(n).copied().unwrap_or(f64::INFINITY)
    }

    pub fn reaches(&self, n: &N) -> bool {
        self.dist.contains_key(n)
    }

    /// Walks predecessors back to the source.
    pub fn path_to(&self, n: &N) -> Option<Vec<N>> {
        if !self.dist.contains_key(n) {
            return None;
        }
        let mut path = vec![*n];
        let mut cur = *n;
        while cur != self.source {
            cur = *self.prev.get(&cur)?;
            path.push(cur);
        }
        path.reverse();
        Some(path)
    }
}

/// Shortest path from `start` to `end`.
///
/// Returns `(None, inf)` when either endpoint is missing from the graph or
/// no path connects them, and `([start], 0)` when they coincide.
pub fn dijkstra<N: Copy + Ord>(graph: &Graph<N>, start: N, end: N) -> (Option<Vec<N>>, f64) {
    match dijkstra_with_deadline(graph, start, end, None) {
        Ok(r) => r,
        Err(SearchTimedOut) => (None, f64::INFINITY),
    }
}

pub fn dijkstra_with_deadline<N: Copy + Ord>(
    graph: &Graph<N>,
    start: N,
    end: N,
    deadline: Option<Instant>,
) -> Result<(Option<Vec<N>>, f64), SearchTimedOut> {
    if !graph.contains(&start) || !graph.contains(&end) {
        return Ok((None, f64::INFINITY));
    }
    if start == end {
        return Ok((Some(vec![start]), 0.0));
    }
    let tree = search(graph, start, Some(end), deadline)?;
    let total = tree.distance_to(&end);
    Ok((tree.path_to(&end), total))
}

/// Distances from `start` to everything it reaches.
pub fn shortest_path_tree<N: Copy + Ord>(
    graph: &Graph<N>,
    start: N,
    deadline: Option<Instant>,
) -> Result<ShortestPathTree<N>, SearchTimedOut> {
    search(graph, start, None, deadline)
}

// Deadline is polled every this many settled nodes.
const DEADLINE_POLL: usize = 64;

fn search<N: Copy + Ord>(
    graph: &Graph<N>,
    start: N,
    target: Option<N>,
    deadline: Option<Instant>,
) -> Result<ShortestPathTree<N>, SearchTimedOut> {
    let mut tree = ShortestPathTree { source: start, dist: BTreeMap::new(), prev: BTreeMap::new() };
    if !graph.contains(&start) {
        return Ok(tree);
    }

    // Frontier ordered by (distance, discovery sequence); equal distances pop
    // in the order nodes were first discovered.
    let mut frontier: BTreeSet<(Dist, u64, N)> = BTreeSet::new();
    let mut discovered: BTreeMap<N, u64> = BTreeMap::new();
    let mut tentative: BTreeMap<N, f64> = BTreeMap::new();
    let mut seq: u64 = 0;

    tentative.insert(start, 0.0);
    discovered.insert(start, seq);
    frontier.insert((Dist(0.0), seq, start));

    let mut settled = 0usize;
    while let Some(entry) = frontier.iter().next().copied() {
        frontier.remove(&entry);
        let (Dist(d), _, n) = entry;

        if let Some(limit) = deadline {
            if settled % DEADLINE_POLL == 0 && Instant::now() >= limit {
                return Err(SearchTimedOut);
            }
        }
        settled += 1;
        tree.dist.insert(n, d);

        if target == Some(n) {
            break;
        }
        for &(m, w) in graph.neighbors(&n) {
            if tree.dist.contains_key(&m) {
                continue;
            }
            let nd = d + w;
            if let Some(&old) = tentative.get(&m) {
                if nd >= old {
                    continue;
                }
            }
            let order = match discovered.get(&m) {
                Some(&s) => {
                    if let Some(&old) = tentative.get(&m) {
                        frontier.remove(&(Dist(old), s, m));
                    }
                    s
                }
                None => {
                    seq += 1;
                    discovered.insert(m, seq);
                    seq
                }
            };
            tentative.insert(m, nd);
            tree.prev.insert(m, n);
            frontier.insert((Dist(nd), order, m));
        }
    }

    Ok(tree)
}
