//! Graph representation for the metric TSP.
//!
//! This module holds the geo-located node set, the weighted edge collection,
//! and the graph-level algorithms the Christofides pipeline builds on:
//! Kruskal minimum spanning tree and minimum-weight perfect matching.
//! Distances come from an injected metric and are cached in a matrix.

use crate::error::{Error, Result};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A geo-located point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier; node identity is this id
    pub id: usize,
    /// First coordinate component (e.g. longitude)
    pub x: f64,
    /// Second coordinate component (e.g. latitude)
    pub y: f64,
}

impl Node {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Node { id, x, y }
    }
}

/// Planar Euclidean distance over the raw coordinates
pub fn euclidean(a: &Node, b: &Node) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Great-circle distance in kilometres, treating (x, y) as (lon, lat) degrees
pub fn haversine(a: &Node, b: &Node) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let (lat1, lat2) = (a.y.to_radians(), b.y.to_radians());
    let dlat = (b.y - a.y).to_radians();
    let dlon = (b.x - a.x).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// An unordered node pair with its derived weight.
///
/// Endpoints are indices into `Graph::nodes`; the weight is the metric
/// applied to the pair and is never mutated independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

impl Edge {
    pub fn new(source: usize, target: usize, weight: f64) -> Self {
        Edge { source, target, weight }
    }
}

/// Strategy for the minimum-weight perfect matching over the odd-degree set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchingStrategy {
    /// Greedy approximation: pair cheapest available endpoints first.
    /// Always completes on a complete subgraph with an even node count.
    #[default]
    Greedy,
    /// Exact bitmask dynamic program, O(m^2 * 2^m) over the m odd nodes.
    /// Intended for small odd sets (m <= 20); larger sets fall back to
    /// the greedy pairing.
    Exact,
}

/// Disjoint-set structure for Kruskal edge acceptance
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        DisjointSet {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the components of a and b; false if already joined
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        if self.rank[ra] < self.rank[rb] {
            self.parent[ra] = rb;
        } else if self.rank[ra] > self.rank[rb] {
            self.parent[rb] = ra;
        } else {
            self.parent[rb] = ra;
            self.rank[ra] += 1;
        }
        true
    }
}

/// A set of nodes plus a weighted edge collection
#[derive(Debug, Clone)]
pub struct Graph {
    /// All nodes; tour indices refer into this list
    pub nodes: Vec<Node>,
    /// Current edge collection (one entry per unordered pair once connected)
    pub edges: Vec<Edge>,
    /// Pairwise distances under the injected metric
    pub distance_matrix: Vec<Vec<f64>>,
}

impl Graph {
    /// Build a graph from a node list and a distance metric.
    ///
    /// The metric is assumed symmetric and nonnegative; the triangle
    /// inequality is assumed but not enforced (violating it only weakens the
    /// Christofides approximation bound). Fails with `InvalidInput` on fewer
    /// than 2 nodes.
    pub fn new<M>(nodes: Vec<Node>, metric: M) -> Result<Self>
    where
        M: Fn(&Node, &Node) -> f64,
    {
        if nodes.len() < 2 {
            return Err(Error::invalid_input(format!(
                "need at least 2 nodes, got {}",
                nodes.len()
            )));
        }

        let n = nodes.len();
        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i + 1..n {
                let d = metric(&nodes[i], &nodes[j]);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }

        Ok(Graph {
            nodes,
            edges: Vec::new(),
            distance_matrix: matrix,
        })
    }

    /// Create an edge for every unordered node pair exactly once
    pub fn connect_all(&mut self) {
        let n = self.nodes.len();
        self.edges.clear();
        self.edges.reserve(n * (n - 1) / 2);
        for i in 0..n {
            for j in i + 1..n {
                self.edges.push(Edge::new(i, j, self.distance_matrix[i][j]));
            }
        }
    }

    /// Distance between two nodes by index
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance_matrix[i][j]
    }

    /// Total closed-tour length: the sum over all consecutive pairs in tour
    /// order plus the wraparound edge from the last node back to the first,
    /// each pair counted exactly once.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }

        let mut length = 0.0;
        for i in 0..tour.len() - 1 {
            length += self.distance(tour[i], tour[i + 1]);
        }
        length += self.distance(tour[tour.len() - 1], tour[0]);

        length
    }

    /// Kruskal minimum spanning tree over the current edge collection.
    ///
    /// Returns the accepted edges in ascending weight order. Fails with
    /// `DisconnectedGraph` if fewer than |nodes| - 1 edges can be accepted,
    /// which only happens when the caller skipped `connect_all`.
    pub fn minimum_spanning_tree(&self) -> Result<Vec<Edge>> {
        let n = self.nodes.len();
        let mut sorted: Vec<&Edge> = self.edges.iter().collect();
        sorted.sort_by_key(|e| OrderedFloat(e.weight));

        let mut components = DisjointSet::new(n);
        let mut mst = Vec::with_capacity(n - 1);

        for edge in sorted {
            if components.union(edge.source, edge.target) {
                mst.push(edge.clone());
                if mst.len() == n - 1 {
                    break;
                }
            }
        }

        if mst.len() < n - 1 {
            return Err(Error::DisconnectedGraph(format!(
                "accepted {} of {} required edges",
                mst.len(),
                n - 1
            )));
        }

        Ok(mst)
    }

    /// Minimum-weight perfect matching over the complete subgraph induced by
    /// `subset`. Every subset node appears as an endpoint exactly once in the
    /// returned edges; anything else is `InvalidMatching`.
    pub fn minimum_weight_perfect_matching(
        &self,
        subset: &[usize],
        strategy: MatchingStrategy,
    ) -> Result<Vec<Edge>> {
        if subset.len() % 2 != 0 {
            return Err(Error::InvalidMatching(format!(
                "cannot perfectly match {} nodes",
                subset.len()
            )));
        }
        if subset.is_empty() {
            return Ok(Vec::new());
        }

        let matching = match strategy {
            MatchingStrategy::Exact if subset.len() <= 20 => self.exact_matching(subset),
            MatchingStrategy::Exact => {
                log::warn!(
                    "odd set of {} nodes too large for exact matching, pairing greedily",
                    subset.len()
                );
                self.greedy_matching(subset)
            }
            MatchingStrategy::Greedy => self.greedy_matching(subset),
        };

        self.validate_matching(subset, &matching)?;
        Ok(matching)
    }

    /// Pair cheapest available endpoints first
    fn greedy_matching(&self, subset: &[usize]) -> Vec<Edge> {
        let m = subset.len();
        let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(m * (m - 1) / 2);
        for i in 0..m {
            for j in i + 1..m {
                pairs.push((i, j));
            }
        }
        pairs.sort_by_key(|&(i, j)| OrderedFloat(self.distance(subset[i], subset[j])));

        let mut matched = vec![false; m];
        let mut matching = Vec::with_capacity(m / 2);
        for (i, j) in pairs {
            if !matched[i] && !matched[j] {
                matched[i] = true;
                matched[j] = true;
                matching.push(Edge::new(
                    subset[i],
                    subset[j],
                    self.distance(subset[i], subset[j]),
                ));
            }
        }

        matching
    }

    /// Bitmask dynamic program over subsets of the odd set
    fn exact_matching(&self, subset: &[usize]) -> Vec<Edge> {
        let m = subset.len();
        let full = (1usize << m) - 1;
        let mut cost = vec![f64::INFINITY; full + 1];
        let mut choice: Vec<Option<(usize, usize)>> = vec![None; full + 1];
        cost[0] = 0.0;

        for mask in 1..=full {
            if (mask as u32).count_ones() % 2 != 0 {
                continue;
            }
            let i = mask.trailing_zeros() as usize;
            let rest = mask & !(1 << i);
            let mut j_bits = rest;
            while j_bits != 0 {
                let j = j_bits.trailing_zeros() as usize;
                j_bits &= j_bits - 1;
                let prev = rest & !(1 << j);
                let candidate = cost[prev] + self.distance(subset[i], subset[j]);
                if candidate < cost[mask] {
                    cost[mask] = candidate;
                    choice[mask] = Some((i, j));
                }
            }
        }

        let mut matching = Vec::with_capacity(m / 2);
        let mut mask = full;
        // every even mask over a complete subgraph has a pairing; a missing
        // choice falls through to matching validation
        while mask != 0 {
            let Some((i, j)) = choice[mask] else { break };
            matching.push(Edge::new(
                subset[i],
                subset[j],
                self.distance(subset[i], subset[j]),
            ));
            mask &= !(1 << i);
            mask &= !(1 << j);
        }

        matching
    }

    /// Check that every subset node is an endpoint of exactly one edge
    fn validate_matching(&self, subset: &[usize], matching: &[Edge]) -> Result<()> {
        let mut seen = vec![0usize; self.nodes.len()];
        for edge in matching {
            seen[edge.source] += 1;
            seen[edge.target] += 1;
        }
        for &node in subset {
            if seen[node] != 1 {
                return Err(Error::InvalidMatching(format!(
                    "node {} appears {} times across matching edges",
                    node, seen[node]
                )));
            }
        }
        if matching.len() * 2 != subset.len() {
            return Err(Error::InvalidMatching(format!(
                "{} edges cannot pair {} nodes",
                matching.len(),
                subset.len()
            )));
        }
        Ok(())
    }
}
