//! All-pairs shortest paths over a snapshot of the graph

use std::collections::HashMap;

use log::{debug, info};
use serde::Serialize;
use transit_common::{Error, Result};

use crate::core::graph::Graph;
use crate::core::identity::{StopIdentity, StopKey};

/// Marks a pair whose best route is the direct edge
const NO_INTERMEDIATE: u32 = u32::MAX;

/// Relative gain below which a relaxation counts as a tie
const RELATIVE_TOLERANCE: f64 = 1e-12;

/// Whether `candidate` beats `current` by more than rounding noise
#[inline]
fn improves(candidate: f64, current: f64) -> bool {
    candidate.is_finite()
        && (current.is_infinite() || candidate < current - RELATIVE_TOLERANCE * current.abs().max(1.0))
}

/// Aggregate figures over every reachable ordered pair of distinct stops
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AllPairsSummary {
    pub stops: usize,
    pub reachable_pairs: usize,
    pub mean_minutes: f64,
    pub max_minutes: f64,
}

/// Dense distance and intermediate-vertex tables
///
/// Matrix indices follow the enumeration order of [`Graph::all_vertices`] at
/// build time. Stops added to the graph afterwards are unknown to the table.
#[derive(Debug, Clone)]
pub struct FloydWarshall {
    stops: Vec<StopIdentity>,
    index: HashMap<StopKey, usize>,
    /// Row-major `n x n`, `INFINITY` for unreachable pairs
    dist: Vec<f64>,
    /// Row-major `n x n` best intermediate index
    via: Vec<u32>,
    revision: u64,
}

impl FloydWarshall {
    /// Compute the tables, refusing graphs above `max_vertices`
    pub fn build(graph: &Graph, max_vertices: usize) -> Result<Self> {
        Self::build_with(graph, max_vertices, |_| {})
    }

    /// [`FloydWarshall::build`] reporting each completed relaxation round
    pub fn build_with<F>(graph: &Graph, max_vertices: usize, mut progress: F) -> Result<Self>
    where
        F: FnMut(usize),
    {
        let n = graph.vertex_count();
        if n > max_vertices {
            return Err(Error::Capacity {
                vertices: n,
                limit: max_vertices,
            });
        }

        let stops: Vec<StopIdentity> = graph.all_vertices().iter().map(|v| *v.stop()).collect();
        let index: HashMap<StopKey, usize> =
            stops.iter().enumerate().map(|(i, s)| (s.key(), i)).collect();

        let mut dist = vec![f64::INFINITY; n * n];
        let mut via = vec![NO_INTERMEDIATE; n * n];
        for (i, vertex) in graph.all_vertices().iter().enumerate() {
            dist[i * n + i] = 0.0;
            for edge in vertex.edges() {
                let cell = &mut dist[i * n + edge.target.index()];
                // Parallel edges collapse to the cheapest one
                if edge.weight < *cell {
                    *cell = edge.weight;
                }
            }
        }

        for k in 0..n {
            for i in 0..n {
                let d_ik = dist[i * n + k];
                if d_ik.is_infinite() {
                    continue;
                }
                for j in 0..n {
                    let candidate = d_ik + dist[k * n + j];
                    if improves(candidate, dist[i * n + j]) {
                        dist[i * n + j] = candidate;
                        via[i * n + j] = k as u32;
                    }
                }
            }
            progress(k + 1);
        }

        let reachable = dist.iter().filter(|d| d.is_finite()).count();
        info!(
            "All-pairs table over {} stops: {} of {} pairs reachable",
            n,
            reachable,
            n * n
        );

        Ok(Self {
            stops,
            index,
            dist,
            via,
            revision: graph.revision(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Graph revision the tables were computed from
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Shortest distance, `None` when a stop is unknown or unreachable
    pub fn distance(&self, origin: impl Into<StopKey>, destination: impl Into<StopKey>) -> Option<f64> {
        let (i, j) = self.pair(origin.into(), destination.into())?;
        let d = self.dist[i * self.len() + j];
        d.is_finite().then_some(d)
    }

    /// Shortest path from `origin` to `destination`, both inclusive
    ///
    /// Empty when either stop is unknown or the destination is unreachable.
    pub fn path(&self, origin: impl Into<StopKey>, destination: impl Into<StopKey>) -> Vec<StopIdentity> {
        let (origin, destination) = (origin.into(), destination.into());
        let Some((i, j)) = self.pair(origin, destination) else {
            debug!("Floyd-Warshall: {} or {} not in table", origin, destination);
            return Vec::new();
        };
        if self.dist[i * self.len() + j].is_infinite() {
            return Vec::new();
        }
        if i == j {
            return vec![self.stops[i]];
        }

        let mut hops = vec![i];
        self.unfold(i, j, &mut hops);
        hops.push(j);
        without_loops(hops).into_iter().map(|h| self.stops[h]).collect()
    }

    /// Stops in matrix order
    pub fn stops(&self) -> &[StopIdentity] {
        &self.stops
    }

    pub fn summary(&self) -> AllPairsSummary {
        let n = self.len();
        let (mut count, mut total, mut max) = (0usize, 0.0, 0.0f64);
        for i in 0..n {
            for j in (0..n).filter(|&j| j != i) {
                let d = self.dist[i * n + j];
                if d.is_finite() {
                    count += 1;
                    total += d;
                    max = max.max(d);
                }
            }
        }
        AllPairsSummary {
            stops: n,
            reachable_pairs: count,
            mean_minutes: if count == 0 { 0.0 } else { total / count as f64 },
            max_minutes: max,
        }
    }

    fn pair(&self, origin: StopKey, destination: StopKey) -> Option<(usize, usize)> {
        Some((*self.index.get(&origin)?, *self.index.get(&destination)?))
    }

    /// Push the intermediate stops strictly between `i` and `j`
    fn unfold(&self, i: usize, j: usize, hops: &mut Vec<usize>) {
        let k = self.via[i * self.len() + j];
        if k == NO_INTERMEDIATE {
            return;
        }
        let k = k as usize;
        self.unfold(i, k, hops);
        hops.push(k);
        self.unfold(k, j, hops);
    }
}

/// Cut every stretch that returns to an earlier stop
///
/// Weights are non-negative, so the trimmed path never costs more.
fn without_loops(hops: Vec<usize>) -> Vec<usize> {
    let mut simple: Vec<usize> = Vec::with_capacity(hops.len());
    for hop in hops {
        match simple.iter().position(|&h| h == hop) {
            Some(pos) => simple.truncate(pos + 1),
            None => simple.push(hop),
        }
    }
    simple
}
