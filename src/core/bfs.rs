//! Breadth-first reachability and the connectivity audit built on it

use std::collections::{HashSet, VecDeque};

use log::{debug, info};
use serde::Serialize;

use crate::core::graph::Graph;
use crate::core::identity::{StopIdentity, StopKey, VertexId};

/// Lazy breadth-first traversal
///
/// Yields the start stop first, then every stop reachable from it in frontier
/// order; within a frontier, neighbours follow edge insertion order.
pub struct Bfs<'g> {
    graph: &'g Graph,
    queue: VecDeque<VertexId>,
    visited: HashSet<StopKey>,
}

impl<'g> Iterator for Bfs<'g> {
    type Item = &'g StopIdentity;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.queue.pop_front()?;
        for edge in self.graph.vertex(current).edges() {
            if self.visited.insert(self.graph.stop(edge.target).key()) {
                self.queue.push_back(edge.target);
            }
        }
        Some(self.graph.stop(current))
    }
}

/// Stops reachable from `start`, including `start` itself
///
/// An absent start yields nothing.
pub fn bfs(graph: &Graph, start: impl Into<StopKey>) -> Bfs<'_> {
    let key = start.into();
    let mut queue = VecDeque::new();
    let mut visited = HashSet::new();
    if let Some(id) = graph.vertex_id(key) {
        queue.push_back(id);
        visited.insert(key);
    }
    Bfs {
        graph,
        queue,
        visited,
    }
}

/// Connectivity summary over every possible start stop
///
/// A start's failure count is the number of stops it cannot reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReachabilityAudit {
    pub vertices: usize,
    pub min_failures: usize,
    pub max_failures: usize,
}

impl ReachabilityAudit {
    /// Every stop reaches every other stop
    pub fn is_strongly_connected(&self) -> bool {
        self.max_failures == 0
    }
}

pub fn reachability_audit(graph: &Graph) -> ReachabilityAudit {
    reachability_audit_with(graph, |_| {})
}

/// [`reachability_audit`] reporting the number of starts processed so far
pub fn reachability_audit_with<F>(graph: &Graph, mut progress: F) -> ReachabilityAudit
where
    F: FnMut(usize),
{
    let total = graph.vertex_count();
    let mut min_failures = if total == 0 { 0 } else { usize::MAX };
    let mut max_failures = 0;

    for (done, vertex) in graph.all_vertices().iter().enumerate() {
        let failures = total - bfs(graph, vertex.stop()).count();
        if failures > 0 {
            debug!("{} cannot reach {} stops", vertex.stop(), failures);
        }
        min_failures = min_failures.min(failures);
        max_failures = max_failures.max(failures);
        progress(done + 1);
    }

    info!(
        "Reachability over {} stops: failures min {} max {}",
        total, min_failures, max_failures
    );
    ReachabilityAudit {
        vertices: total,
        min_failures,
        max_failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: i64) -> StopIdentity {
        StopIdentity::base(id, 0.0, 0.0)
    }

    /// A -> B -> C -> D
    fn line() -> Graph {
        let mut graph = Graph::new();
        for id in 1..=4 {
            graph.add_vertex(stop(id));
        }
        for id in 1..4 {
            graph.add_edge(stop(id), stop(id + 1), 1.0, id as u64);
        }
        graph
    }

    fn reached(graph: &Graph, start: i64) -> HashSet<i64> {
        bfs(graph, stop(start)).map(|s| s.id).collect()
    }

    #[test]
    fn test_reaches_downstream() {
        let graph = line();
        assert_eq!(reached(&graph, 1), HashSet::from([1, 2, 3, 4]));
        assert_eq!(reached(&graph, 4), HashSet::from([4]));
    }

    #[test]
    fn test_yields_in_frontier_order() {
        let mut graph = line();
        graph.add_vertex(stop(5));
        graph.add_edge(stop(1), stop(5), 1.0, 9);

        let order: Vec<i64> = bfs(&graph, stop(1)).map(|s| s.id).collect();
        assert_eq!(order, vec![1, 2, 5, 3, 4]);
    }

    #[test]
    fn test_absent_start_yields_nothing() {
        let graph = line();
        assert_eq!(bfs(&graph, stop(42)).count(), 0);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut graph = line();
        graph.add_edge(stop(4), stop(1), 1.0, 9);
        assert_eq!(bfs(&graph, stop(3)).count(), 4);
    }

    #[test]
    fn test_adding_edges_never_shrinks_reach() {
        let mut graph = line();
        graph.add_vertex(stop(5));
        let before = reached(&graph, 2);

        graph.add_edge(stop(4), stop(5), 1.0, 9);
        graph.add_edge(stop(3), stop(1), 1.0, 10);
        let after = reached(&graph, 2);

        assert!(before.is_subset(&after));
        assert!(after.contains(&5));
    }

    #[test]
    fn test_audit_counts_failures() {
        let graph = line();
        let mut calls = 0;
        let audit = reachability_audit_with(&graph, |_| calls += 1);

        assert_eq!(
            audit,
            ReachabilityAudit {
                vertices: 4,
                min_failures: 0,
                max_failures: 3,
            }
        );
        assert_eq!(calls, 4);
        assert!(!audit.is_strongly_connected());
    }

    #[test]
    fn test_audit_empty_graph() {
        let audit = reachability_audit(&Graph::new());
        assert_eq!(audit.min_failures, 0);
        assert!(audit.is_strongly_connected());
    }
}
