//! Reusable best-first search state shared by Dijkstra and A*
//!
//! Per-vertex entries carry a version stamp so a solver can run many queries
//! without clearing its arrays; an entry from an older search reads as unset.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;

use crate::core::graph::Graph;
use crate::core::identity::{StopIdentity, VertexId};

/// Min-queue priority: lowest estimate first, ties to the lowest vertex handle
type Priority = Reverse<(OrderedFloat<f64>, VertexId)>;

#[derive(Debug, Clone, Copy)]
struct NodeEntry {
    dist: f64,
    parent: Option<VertexId>,
    version: u32,
}

const UNSET: NodeEntry = NodeEntry {
    dist: f64::INFINITY,
    parent: None,
    version: 0,
};

#[derive(Debug, Default)]
pub(crate) struct SearchState {
    entries: Vec<NodeEntry>,
    current_version: u32,
    queue: PriorityQueue<VertexId, Priority>,
    /// Vertices popped during the last search
    pub(crate) settled: usize,
}

impl SearchState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn start_search(&mut self, n_vertices: usize) {
        if self.entries.len() < n_vertices {
            self.entries.resize(n_vertices, UNSET);
        }
        self.current_version = self.current_version.wrapping_add(1);
        if self.current_version == 0 {
            self.entries.fill(UNSET);
            self.current_version = 1;
        }
        self.queue.clear();
        self.settled = 0;
    }

    #[inline]
    fn entry(&self, v: VertexId) -> NodeEntry {
        let e = self.entries[v.index()];
        if e.version == self.current_version {
            e
        } else {
            UNSET
        }
    }

    #[inline]
    pub(crate) fn dist(&self, v: VertexId) -> f64 {
        self.entry(v).dist
    }

    /// Record `dist` for `v` if it improves on the current tentative distance
    #[inline]
    fn relax(&mut self, v: VertexId, dist: f64, parent: Option<VertexId>) -> bool {
        if dist < self.entry(v).dist {
            self.entries[v.index()] = NodeEntry {
                dist,
                parent,
                version: self.current_version,
            };
            true
        } else {
            false
        }
    }

    /// Run a best-first search from `source` until `target` is popped
    ///
    /// `estimate` returns a lower bound on the remaining cost from a stop to
    /// the target (zero for plain Dijkstra). `admit` filters which stops the
    /// search may enter. A vertex whose distance improves after being popped
    /// is queued again, so the search stays optimal for admissible estimates
    /// that are not consistent.
    ///
    /// Returns the target's distance, or `None` when it is unreachable.
    pub(crate) fn run<E, A>(
        &mut self,
        graph: &Graph,
        source: VertexId,
        target: VertexId,
        estimate: E,
        admit: A,
    ) -> Option<f64>
    where
        E: Fn(&StopIdentity) -> f64,
        A: Fn(&StopIdentity) -> bool,
    {
        self.start_search(graph.vertex_count());
        self.relax(source, 0.0, None);
        self.queue.push(
            source,
            Reverse((OrderedFloat(estimate(graph.stop(source))), source)),
        );

        while let Some((u, _)) = self.queue.pop() {
            self.settled += 1;
            let d = self.dist(u);
            if u == target {
                return Some(d);
            }

            for edge in graph.vertex(u).edges() {
                let v = edge.target;
                let stop = graph.stop(v);
                if !admit(stop) {
                    continue;
                }
                let candidate = d + edge.weight;
                if self.relax(v, candidate, Some(u)) {
                    let f = candidate + estimate(stop);
                    self.queue.push_increase(v, Reverse((OrderedFloat(f), v)));
                }
            }
        }

        None
    }

    /// Stops from the search source to `target`, following parent links
    pub(crate) fn path_to(&self, graph: &Graph, target: VertexId) -> Vec<StopIdentity> {
        if self.dist(target).is_infinite() {
            return Vec::new();
        }

        let mut path = vec![*graph.stop(target)];
        let mut current = target;
        while let Some(parent) = self.entry(current).parent {
            path.push(*graph.stop(parent));
            current = parent;
        }
        path.reverse();
        path
    }
}
