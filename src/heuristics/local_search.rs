//! Deterministic and randomized local search over tours.
//!
//! This module implements the neighborhood searches applied after the
//! Christofides construction:
//! - Random pairwise swap with strict-improvement acceptance
//! - 2-opt segment reversal
//! - 3-opt, segment-relocation variant
//! - 3-opt, multi-reconnection variant
//! - k-opt window reversal
//!
//! Every operator is total over structurally valid tours: it either improves
//! the tour or leaves it unchanged.

use crate::graph::Graph;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const EPSILON: f64 = 1e-9;

/// Trait for tour improvement methods.
///
/// `improve` mutates the tour in place and reports whether it got strictly
/// shorter. Operators with identical inputs produce identical outputs; the
/// randomized ones derive their generator from a config seed.
pub trait LocalSearch {
    fn improve(&self, graph: &Graph, tour: &mut Vec<usize>) -> bool;
    fn name(&self) -> &str;
}

/// Length change from reversing the segment `[i..=j]`.
///
/// Only the two boundary edges change; interior edges survive in reverse
/// order. Exact under the wraparound-inclusive tour length.
fn reversal_delta(graph: &Graph, tour: &[usize], i: usize, j: usize) -> f64 {
    let n = tour.len();
    let prev = tour[(i + n - 1) % n];
    let next = tour[(j + 1) % n];
    graph.distance(prev, tour[j]) + graph.distance(tour[i], next)
        - graph.distance(prev, tour[i])
        - graph.distance(tour[j], next)
}

/// Random pairwise swap under a fixed iteration budget.
///
/// Each iteration swaps two uniformly chosen positions and keeps the result
/// only when the tour gets strictly shorter.
pub struct RandomSwap {
    /// Number of candidate swaps to try
    pub iterations: usize,
    /// Random seed
    pub seed: u64,
}

impl RandomSwap {
    pub fn new(iterations: usize) -> Self {
        RandomSwap {
            iterations,
            seed: 42,
        }
    }

    pub fn with_seed(iterations: usize, seed: u64) -> Self {
        RandomSwap { iterations, seed }
    }
}

impl LocalSearch for RandomSwap {
    fn improve(&self, graph: &Graph, tour: &mut Vec<usize>) -> bool {
        let n = tour.len();
        if n < 2 {
            return false;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut current_length = graph.tour_length(tour);
        let mut improved = false;

        for _ in 0..self.iterations {
            let i = rng.gen_range(0..n);
            let j = rng.gen_range(0..n);
            tour.swap(i, j);
            let swapped_length = graph.tour_length(tour);
            if swapped_length < current_length - EPSILON {
                current_length = swapped_length;
                improved = true;
            } else {
                tour.swap(i, j);
            }
        }

        improved
    }

    fn name(&self) -> &str {
        "RandomSwap"
    }
}

/// 2-opt: reverse every segment, first improvement, full passes until a pass
/// yields no improving move
#[derive(Debug, Default, Clone, Copy)]
pub struct TwoOpt;

impl TwoOpt {
    pub fn new() -> Self {
        TwoOpt
    }
}

impl LocalSearch for TwoOpt {
    fn improve(&self, graph: &Graph, tour: &mut Vec<usize>) -> bool {
        let n = tour.len();
        if n < 3 {
            return false;
        }

        let mut total_improved = false;
        let mut improved = true;
        while improved {
            improved = false;
            for i in 0..n - 1 {
                for j in i + 1..n {
                    if i == 0 && j == n - 1 {
                        continue; // reversing the whole tour changes nothing
                    }
                    if reversal_delta(graph, tour, i, j) < -EPSILON {
                        tour[i..=j].reverse();
                        improved = true;
                        total_improved = true;
                    }
                }
            }
        }

        total_improved
    }

    fn name(&self) -> &str {
        "2-Opt"
    }
}

/// 3-opt, segment-relocation variant: for every triple (i, j, k) the two
/// segments (i, j] and (j, k] trade places, keeping both in forward
/// orientation. Passes repeat until none of the relocations improves.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreeOptSegment;

impl ThreeOptSegment {
    pub fn new() -> Self {
        ThreeOptSegment
    }

    /// Length change of the relocation: three edges are replaced, interior
    /// edges are untouched
    fn relocation_delta(graph: &Graph, tour: &[usize], i: usize, j: usize, k: usize) -> f64 {
        let n = tour.len();
        let after_k = tour[(k + 1) % n];
        graph.distance(tour[i], tour[j + 1])
            + graph.distance(tour[k], tour[i + 1])
            + graph.distance(tour[j], after_k)
            - graph.distance(tour[i], tour[i + 1])
            - graph.distance(tour[j], tour[j + 1])
            - graph.distance(tour[k], after_k)
    }

    fn relocate(tour: &[usize], i: usize, j: usize, k: usize) -> Vec<usize> {
        let mut reordered = Vec::with_capacity(tour.len());
        reordered.extend_from_slice(&tour[..=i]);
        reordered.extend_from_slice(&tour[j + 1..=k]);
        reordered.extend_from_slice(&tour[i + 1..=j]);
        reordered.extend_from_slice(&tour[k + 1..]);
        reordered
    }
}

impl LocalSearch for ThreeOptSegment {
    fn improve(&self, graph: &Graph, tour: &mut Vec<usize>) -> bool {
        let n = tour.len();
        if n < 3 {
            return false;
        }

        let mut total_improved = false;
        let mut improved = true;
        while improved {
            improved = false;
            for i in 0..n - 2 {
                for j in i + 1..n - 1 {
                    for k in j + 1..n {
                        if Self::relocation_delta(graph, tour, i, j, k) < -EPSILON {
                            *tour = Self::relocate(tour, i, j, k);
                            improved = true;
                            total_improved = true;
                        }
                    }
                }
            }
        }

        total_improved
    }

    fn name(&self) -> &str {
        "3-Opt-Segment"
    }
}

/// 3-opt, multi-reconnection variant: for every triple, five reconnections of
/// the segments cut at (i, i+1), (j, j+1) and (k-1, k) are priced against the
/// removed-edge baseline and the cheapest strictly-improving one is applied,
/// mixing segment reversal and positional swap primitives.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreeOptReconnect;

impl ThreeOptReconnect {
    pub fn new() -> Self {
        ThreeOptReconnect
    }
}

/// The four non-identity reconnection patterns
#[derive(Clone, Copy)]
enum Reconnection {
    DoubleReverse,
    DoubleSwap,
    SwapThenReverse,
    SwapPair,
}

impl LocalSearch for ThreeOptReconnect {
    fn improve(&self, graph: &Graph, tour: &mut Vec<usize>) -> bool {
        let n = tour.len();
        if n < 5 {
            return false;
        }
        let d = |a: usize, b: usize| graph.distance(a, b);

        let mut total_improved = false;
        let mut improved = true;
        while improved {
            improved = false;
            for i in 0..n - 3 {
                for j in i + 2..n - 1 {
                    for k in j + 2..n {
                        let tail = d(tour[k], tour[k - 1]);
                        let baseline = d(tour[i], tour[i + 1]) + d(tour[j], tour[j + 1]) + tail;

                        let candidates = [
                            (
                                d(tour[i], tour[j]) + d(tour[i + 1], tour[j + 1]) + tail,
                                Reconnection::DoubleReverse,
                            ),
                            (
                                d(tour[i], tour[j + 1]) + d(tour[i + 1], tour[j]) + tail,
                                Reconnection::DoubleSwap,
                            ),
                            (
                                d(tour[i], tour[j + 1])
                                    + d(tour[i + 1], tour[k])
                                    + d(tour[j], tour[k - 1]),
                                Reconnection::SwapThenReverse,
                            ),
                            (
                                d(tour[i], tour[k])
                                    + d(tour[j + 1], tour[i + 1])
                                    + d(tour[j], tour[k - 1]),
                                Reconnection::SwapPair,
                            ),
                        ];

                        let (cost, pattern) = candidates
                            .iter()
                            .copied()
                            .min_by(|a, b| a.0.total_cmp(&b.0))
                            .unwrap_or(candidates[0]);
                        if cost >= baseline - EPSILON {
                            continue;
                        }

                        // the candidate pricing is a heuristic over three
                        // edges; accept only moves the full evaluation
                        // confirms, otherwise restore
                        let before = graph.tour_length(tour);
                        let saved = tour.clone();
                        match pattern {
                            Reconnection::DoubleReverse => {
                                tour[i + 1..=j].reverse();
                                tour[j + 1..=k].reverse();
                            }
                            Reconnection::DoubleSwap => {
                                tour.swap(i + 1, j);
                                tour.swap(j + 1, k);
                            }
                            Reconnection::SwapThenReverse => {
                                tour.swap(i + 1, k);
                                tour[j + 1..=k].reverse();
                            }
                            Reconnection::SwapPair => {
                                tour.swap(i + 1, j);
                                tour.swap(k, j + 1);
                            }
                        }
                        if graph.tour_length(tour) < before - EPSILON {
                            improved = true;
                            total_improved = true;
                        } else {
                            *tour = saved;
                        }
                    }
                }
            }
        }

        total_improved
    }

    fn name(&self) -> &str {
        "3-Opt-Reconnect"
    }
}

/// k-opt: one sweep reversing each window of length k+1 in place, keeping a
/// reversal only when the tour gets strictly shorter
pub struct KOpt {
    /// Window order; a window spans k+1 consecutive positions
    pub k: usize,
}

impl KOpt {
    pub fn new(k: usize) -> Self {
        KOpt { k }
    }
}

impl LocalSearch for KOpt {
    fn improve(&self, graph: &Graph, tour: &mut Vec<usize>) -> bool {
        let n = tour.len();
        if self.k < 2 || self.k + 1 > n {
            return false;
        }

        let mut current_length = graph.tour_length(tour);
        let mut improved = false;

        for start in 0..=n - (self.k + 1) {
            tour[start..start + self.k + 1].reverse();
            let flipped_length = graph.tour_length(tour);
            if flipped_length < current_length - EPSILON {
                current_length = flipped_length;
                improved = true;
            } else {
                tour[start..start + self.k + 1].reverse();
            }
        }

        improved
    }

    fn name(&self) -> &str {
        "K-Opt"
    }
}
