//! Ant colony optimization.
//!
//! A population of agents builds complete tours by repeatedly choosing an
//! unvisited next node with probability proportional to
//! pheromone^alpha * (1/distance)^beta. After every round the pheromone
//! matrix evaporates and each ant deposits 1/tourLength on the edges it
//! traversed, then the ants restart from fresh random positions. The final
//! answer is the best tour among the last round's ants.

use crate::graph::Graph;
use crate::heuristics::local_search::LocalSearch;
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// ACO tunables. Defaults follow the usual metric-TSP ranges; none of them is
/// a hardcoded requirement.
#[derive(Debug, Clone)]
pub struct AcoConfig {
    /// Number of ants per round
    pub num_ants: usize,
    /// Number of rounds
    pub max_iterations: usize,
    /// Pheromone importance
    pub alpha: f64,
    /// Inverse-distance importance
    pub beta: f64,
    /// Per-round pheromone decay factor (rho)
    pub evaporation_rate: f64,
    /// Initial pheromone level on every edge
    pub initial_pheromone: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for AcoConfig {
    fn default() -> Self {
        AcoConfig {
            num_ants: 10,
            max_iterations: 100,
            alpha: 1.0,
            beta: 5.0,
            evaporation_rate: 0.5,
            initial_pheromone: 1.0,
            seed: 42,
        }
    }
}

/// One agent: a visiting order over node indices, a contiguous
/// visited-membership mask, and the current position. Lives for one
/// construction pass per round, then resets.
struct Ant {
    visited: Vec<usize>,
    visited_mask: Vec<bool>,
    current: usize,
}

impl Ant {
    fn new(start: usize, node_count: usize) -> Self {
        let mut ant = Ant {
            visited: Vec::with_capacity(node_count),
            visited_mask: vec![false; node_count],
            current: start,
        };
        ant.visited.push(start);
        ant.visited_mask[start] = true;
        ant
    }

    fn is_complete(&self) -> bool {
        self.visited.len() == self.visited_mask.len()
    }

    fn reset(&mut self, start: usize) {
        self.visited.clear();
        self.visited_mask.fill(false);
        self.current = start;
        self.visited.push(start);
        self.visited_mask[start] = true;
    }

    /// Pick and move to the next unvisited node by roulette selection over
    /// pheromone^alpha * (1/distance)^beta
    fn step(
        &mut self,
        distances: &[Vec<f64>],
        pheromones: &[Vec<f64>],
        alpha: f64,
        beta: f64,
        rng: &mut ChaCha8Rng,
    ) {
        let n = self.visited_mask.len();
        let mut weights = vec![0.0; n];
        let mut total = 0.0;

        for next in 0..n {
            if self.visited_mask[next] {
                continue;
            }
            let d = distances[self.current][next];
            // coincident points would divide by zero; treat them as almost
            // irresistibly close instead
            let desirability = if d > 0.0 { 1.0 / d } else { 1e6 };
            let weight = pheromones[self.current][next].powf(alpha) * desirability.powf(beta);
            weights[next] = weight;
            total += weight;
        }

        let mut pick = rng.gen::<f64>() * total;
        let mut chosen = None;
        for next in 0..n {
            if self.visited_mask[next] {
                continue;
            }
            pick -= weights[next];
            if pick <= 0.0 {
                chosen = Some(next);
                break;
            }
        }
        // numeric underflow can leave the roulette unresolved; fall back to
        // the heaviest remaining candidate
        let next = match chosen {
            Some(next) => next,
            None => (0..n)
                .filter(|&i| !self.visited_mask[i])
                .max_by_key(|&i| OrderedFloat(weights[i]))
                .unwrap_or(self.current),
        };

        self.visited.push(next);
        self.visited_mask[next] = true;
        self.current = next;
    }

    /// Closed-tour length of the visiting order, wraparound included
    fn tour_length(&self, distances: &[Vec<f64>]) -> f64 {
        let mut length = 0.0;
        for pair in self.visited.windows(2) {
            length += distances[pair[0]][pair[1]];
        }
        if let (Some(&first), Some(&last)) = (self.visited.first(), self.visited.last()) {
            length += distances[last][first];
        }
        length
    }
}

/// Ant colony optimizer over a fully built graph
pub struct AntColonyOptimisation {
    pub config: AcoConfig,
}

impl AntColonyOptimisation {
    pub fn new(config: AcoConfig) -> Self {
        AntColonyOptimisation { config }
    }

    /// Run the colony and return the best tour among the last round's ants.
    /// No monotonic guarantee relative to any prior tour.
    pub fn run(&self, graph: &Graph) -> Vec<usize> {
        let n = graph.nodes.len();
        let cfg = &self.config;
        let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
        let distances = &graph.distance_matrix;

        let mut pheromones = vec![vec![cfg.initial_pheromone; n]; n];
        for (i, row) in pheromones.iter_mut().enumerate() {
            row[i] = 0.0;
        }

        let mut ants: Vec<Ant> = (0..cfg.num_ants)
            .map(|_| Ant::new(rng.gen_range(0..n), n))
            .collect();

        for round in 0..cfg.max_iterations {
            if round > 0 {
                for ant in &mut ants {
                    ant.reset(rng.gen_range(0..n));
                }
            }

            for ant in &mut ants {
                while !ant.is_complete() {
                    ant.step(distances, &pheromones, cfg.alpha, cfg.beta, &mut rng);
                }
            }

            for row in &mut pheromones {
                for level in row.iter_mut() {
                    *level *= 1.0 - cfg.evaporation_rate;
                }
            }

            for ant in &ants {
                let length = ant.tour_length(distances);
                if length <= 0.0 {
                    continue;
                }
                let deposit = 1.0 / length;
                for pair in ant.visited.windows(2) {
                    pheromones[pair[0]][pair[1]] += deposit;
                    pheromones[pair[1]][pair[0]] += deposit;
                }
                let (first, last) = (ant.visited[0], ant.visited[n - 1]);
                pheromones[last][first] += deposit;
                pheromones[first][last] += deposit;
            }
        }

        let best = ants
            .iter()
            .min_by_key(|ant| OrderedFloat(ant.tour_length(distances)));
        match best {
            Some(ant) => {
                log::debug!(
                    "colony best tour length {:.4} after {} rounds",
                    ant.tour_length(distances),
                    cfg.max_iterations
                );
                ant.visited.clone()
            }
            None => Vec::new(),
        }
    }
}

impl LocalSearch for AntColonyOptimisation {
    /// Replace the tour with the colony result when it is strictly shorter
    fn improve(&self, graph: &Graph, tour: &mut Vec<usize>) -> bool {
        if tour.len() < 2 {
            return false;
        }
        let candidate = self.run(graph);
        if candidate.len() == tour.len()
            && graph.tour_length(&candidate) < graph.tour_length(tour) - 1e-9
        {
            *tour = candidate;
            true
        } else {
            false
        }
    }

    fn name(&self) -> &str {
        "AntColony"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::christofides::Christofides;
    use crate::graph::{euclidean, Node};
    use crate::heuristics::local_search::TwoOpt;

    fn random_graph(count: usize, seed: u64) -> Graph {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let nodes = (0..count)
            .map(|id| Node::new(id, rng.gen_range(-1.0..1.0), rng.gen_range(50.0..52.0)))
            .collect();
        let mut graph = Graph::new(nodes, euclidean).unwrap();
        graph.connect_all();
        graph
    }

    #[test]
    fn colony_builds_a_permutation() {
        let graph = random_graph(8, 3);
        let colony = AntColonyOptimisation::new(AcoConfig {
            num_ants: 5,
            max_iterations: 20,
            ..Default::default()
        });
        let tour = colony.run(&graph);
        let mut sorted = tour.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn seeded_colony_is_reproducible() {
        let graph = random_graph(9, 11);
        let colony = AntColonyOptimisation::new(AcoConfig {
            max_iterations: 30,
            seed: 5,
            ..Default::default()
        });
        assert_eq!(colony.run(&graph), colony.run(&graph));
    }

    #[test]
    fn colony_stays_within_reach_of_two_opt_baseline() {
        let graph = random_graph(8, 42);

        let mut baseline = Christofides::new().solve(&graph).unwrap();
        TwoOpt::new().improve(&graph, &mut baseline);
        let baseline_length = graph.tour_length(&baseline);

        let colony = AntColonyOptimisation::new(AcoConfig::default());
        let tour = colony.run(&graph);
        let colony_length = graph.tour_length(&tour);

        assert!(
            colony_length <= baseline_length * 1.5 + 1e-9,
            "colony {colony_length:.4} vs baseline {baseline_length:.4}"
        );
    }

    #[test]
    fn improve_keeps_a_better_input() {
        // a colony run on 3 nodes cannot beat the unique cyclic order
        let graph = random_graph(3, 7);
        let mut tour = vec![0, 1, 2];
        let before = graph.tour_length(&tour);
        AntColonyOptimisation::new(AcoConfig {
            max_iterations: 5,
            ..Default::default()
        })
        .improve(&graph, &mut tour);
        assert!(graph.tour_length(&tour) <= before + 1e-9);
    }
}
