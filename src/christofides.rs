//! The Christofides construction pipeline.
//!
//! Produces an initial Hamiltonian tour in five steps: minimum spanning tree,
//! odd-degree vertex detection, minimum-weight perfect matching over the odd
//! set, Eulerian circuit over the combined multigraph, and a first-visit
//! shortcut. With a metric distance function the result is within 1.5x of the
//! optimal tour; a non-metric distance only weakens that bound.

use crate::error::{Error, Result};
use crate::graph::{Edge, Graph, MatchingStrategy};
use crate::recorder::{NullRecorder, OperationRecorder};

/// Nodes incident to an odd number of MST edges.
///
/// By the handshake lemma the returned set always has even cardinality; an
/// odd count means the edge list was not a tree and is reported as
/// `InternalInvariant`.
pub fn odd_degree_vertices(node_count: usize, mst: &[Edge]) -> Result<Vec<usize>> {
    let mut degrees = vec![0usize; node_count];
    for edge in mst {
        degrees[edge.source] += 1;
        degrees[edge.target] += 1;
    }

    let odd: Vec<usize> = (0..node_count).filter(|&i| degrees[i] % 2 == 1).collect();
    if odd.len() % 2 != 0 {
        return Err(Error::internal(format!(
            "odd-degree set has odd cardinality {}",
            odd.len()
        )));
    }

    Ok(odd)
}

/// Eulerian circuit over a connected multigraph in which every node has even
/// degree. Iterative Hierholzer: adjacency lists of (edge id, neighbor) with
/// an edge-used bitmap, O(E) overall and no recursion.
///
/// The returned walk consumes each edge exactly once; leftover edges signal a
/// malformed combined graph and become `IncompleteTraversal`.
pub fn euler_circuit(node_count: usize, edges: &[Edge]) -> Result<Vec<usize>> {
    if edges.is_empty() {
        return Err(Error::IncompleteTraversal("no edges to traverse".into()));
    }

    let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); node_count];
    for (id, edge) in edges.iter().enumerate() {
        adjacency[edge.source].push((id, edge.target));
        adjacency[edge.target].push((id, edge.source));
    }

    let mut used = vec![false; edges.len()];
    let mut consumed = 0usize;
    let mut stack = vec![edges[0].source];
    let mut circuit = Vec::with_capacity(edges.len() + 1);

    while let Some(&node) = stack.last() {
        let mut next = None;
        while let Some(&(id, neighbor)) = adjacency[node].last() {
            if used[id] {
                adjacency[node].pop();
            } else {
                next = Some((id, neighbor));
                break;
            }
        }

        match next {
            Some((id, neighbor)) => {
                used[id] = true;
                consumed += 1;
                adjacency[node].pop();
                stack.push(neighbor);
            }
            None => {
                circuit.push(node);
                stack.pop();
            }
        }
    }
    circuit.reverse();

    if consumed != edges.len() {
        return Err(Error::IncompleteTraversal(format!(
            "{} of {} edges left unconsumed",
            edges.len() - consumed,
            edges.len()
        )));
    }

    Ok(circuit)
}

/// Shortcut the Euler walk into a Hamiltonian tour: emit each node on first
/// visit, skip repeats. Valid as a shortcut whenever the metric satisfies the
/// triangle inequality; mechanically valid regardless.
pub fn hamiltonian_shortcut(euler_tour: &[usize], node_count: usize) -> Vec<usize> {
    let mut seen = vec![false; node_count];
    let mut tour = Vec::with_capacity(node_count);
    for &node in euler_tour {
        if !seen[node] {
            seen[node] = true;
            tour.push(node);
        }
    }
    tour
}

/// Christofides pipeline configuration and entry point
#[derive(Debug, Clone, Copy, Default)]
pub struct Christofides {
    /// How to pair the odd-degree vertices
    pub matching: MatchingStrategy,
}

impl Christofides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matching(matching: MatchingStrategy) -> Self {
        Christofides { matching }
    }

    /// Run the pipeline without recording operations
    pub fn solve(&self, graph: &Graph) -> Result<Vec<usize>> {
        self.solve_recorded(graph, &mut NullRecorder)
    }

    /// Run the pipeline, reporting edge additions to `recorder` at MST
    /// discovery and over the final shortcut tour (in call order matching
    /// algorithmic discovery order)
    pub fn solve_recorded<R: OperationRecorder>(
        &self,
        graph: &Graph,
        recorder: &mut R,
    ) -> Result<Vec<usize>> {
        let n = graph.nodes.len();

        let mst = graph.minimum_spanning_tree()?;
        for edge in &mst {
            recorder.edge_added(&graph.nodes[edge.source], &graph.nodes[edge.target]);
        }

        let odd = odd_degree_vertices(n, &mst)?;
        let matching = graph.minimum_weight_perfect_matching(&odd, self.matching)?;
        log::debug!(
            "mst {} edges, {} odd vertices, matching {} edges",
            mst.len(),
            odd.len(),
            matching.len()
        );

        let mut combined = mst;
        combined.extend(matching);
        let circuit = euler_circuit(n, &combined)?;

        let tour = hamiltonian_shortcut(&circuit, n);
        if tour.len() != n {
            return Err(Error::internal(format!(
                "shortcut produced {} of {} nodes",
                tour.len(),
                n
            )));
        }

        for window in tour.windows(2) {
            recorder.edge_added(&graph.nodes[window[0]], &graph.nodes[window[1]]);
        }
        recorder.edge_added(&graph.nodes[tour[n - 1]], &graph.nodes[tour[0]]);

        log::debug!("initial tour length {:.4}", graph.tour_length(&tour));
        Ok(tour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{euclidean, Node};
    use crate::heuristics::local_search::{LocalSearch, RandomSwap};
    use crate::recorder::EdgeLog;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn connected_graph(count: usize, seed: u64) -> Graph {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let nodes = (0..count)
            .map(|id| Node::new(id, rng.gen_range(-1.0..1.0), rng.gen_range(50.0..52.0)))
            .collect();
        let mut graph = Graph::new(nodes, euclidean).unwrap();
        graph.connect_all();
        graph
    }

    #[test]
    fn odd_degree_set_has_even_cardinality() {
        for seed in 0..10 {
            let graph = connected_graph(20, seed);
            let mst = graph.minimum_spanning_tree().unwrap();
            let odd = odd_degree_vertices(20, &mst).unwrap();
            assert_eq!(odd.len() % 2, 0);
        }
    }

    #[test]
    fn euler_circuit_consumes_every_combined_edge() {
        let graph = connected_graph(15, 4);
        let mst = graph.minimum_spanning_tree().unwrap();
        let odd = odd_degree_vertices(15, &mst).unwrap();
        let matching = graph
            .minimum_weight_perfect_matching(&odd, MatchingStrategy::Greedy)
            .unwrap();

        let mut combined = mst.clone();
        combined.extend(matching.clone());
        let circuit = euler_circuit(15, &combined).unwrap();

        // a closed walk over E edges lists E+1 nodes
        assert_eq!(circuit.len(), combined.len() + 1);
        assert_eq!(circuit.first(), circuit.last());
    }

    #[test]
    fn euler_circuit_reports_unreachable_edges() {
        // two disjoint even-degree triangles: traversal cannot leave the first
        let edges = vec![
            Edge::new(0, 1, 1.0),
            Edge::new(1, 2, 1.0),
            Edge::new(2, 0, 1.0),
            Edge::new(3, 4, 1.0),
            Edge::new(4, 5, 1.0),
            Edge::new(5, 3, 1.0),
        ];
        assert!(matches!(
            euler_circuit(6, &edges),
            Err(Error::IncompleteTraversal(_))
        ));
    }

    #[test]
    fn shortcut_visits_every_node_exactly_once() {
        for seed in [2, 9, 31] {
            let graph = connected_graph(30, seed);
            let tour = Christofides::new().solve(&graph).unwrap();
            assert_eq!(tour.len(), 30);
            let mut sorted = tour.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..30).collect::<Vec<_>>());
        }
    }

    #[test]
    fn exact_matching_pipeline_is_no_worse() {
        let graph = connected_graph(18, 13);
        let greedy = Christofides::with_matching(MatchingStrategy::Greedy)
            .solve(&graph)
            .unwrap();
        let exact = Christofides::with_matching(MatchingStrategy::Exact)
            .solve(&graph)
            .unwrap();
        assert_eq!(greedy.len(), exact.len());
    }

    #[test]
    fn two_node_graph_tours_both_nodes() {
        let nodes = vec![
            Node::new(0, -0.009691, 51.483548),
            Node::new(1, -0.118888, 51.513075),
        ];
        let mut graph = Graph::new(nodes, euclidean).unwrap();
        graph.connect_all();

        let tour = Christofides::new().solve(&graph).unwrap();
        assert_eq!(tour, vec![0, 1]);
        // closed two-node tour travels the single edge out and back
        let expected = 2.0 * graph.distance(0, 1);
        assert!((graph.tour_length(&tour) - expected).abs() < 0.01);
    }

    #[test]
    fn three_node_graph_preserves_leading_pair() {
        let nodes = vec![
            Node::new(0, -0.009691, 51.483548),
            Node::new(1, -0.118888, 51.513075),
            Node::new(2, 0.076327, 51.540042),
        ];
        let mut graph = Graph::new(nodes, euclidean).unwrap();
        graph.connect_all();

        let tour = Christofides::new().solve(&graph).unwrap();
        assert_eq!(tour[0], 0);
        assert_eq!(tour[1], 1);

        // with three nodes every visiting order closes the same triangle, so
        // a couple of random swaps cannot change the length
        let before = graph.tour_length(&tour);
        let mut swapped = tour.clone();
        RandomSwap::new(2).improve(&graph, &mut swapped);
        assert!((graph.tour_length(&swapped) - before).abs() < 0.01);
        assert_eq!(swapped.len(), tour.len());
    }

    #[test]
    fn recorder_sees_mst_then_shortcut_edges() {
        let graph = connected_graph(12, 5);
        let mut log = EdgeLog::new();
        let tour = Christofides::new()
            .solve_recorded(&graph, &mut log)
            .unwrap();
        // n-1 MST discoveries plus n shortcut tour edges including closing
        assert_eq!(log.len(), (12 - 1) + tour.len());
    }
}
