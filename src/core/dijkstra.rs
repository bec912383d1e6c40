//! Single-pair Dijkstra over the graph store

use log::debug;

use crate::core::graph::Graph;
use crate::core::identity::{Mode, StopIdentity, StopKey};
use crate::core::search::SearchState;

/// Dijkstra solver with reusable search buffers
///
/// Among equal tentative distances the vertex inserted first into the graph
/// is settled first.
#[derive(Debug, Default)]
pub struct Dijkstra {
    state: SearchState,
}

impl Dijkstra {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortest path from `origin` to `destination`, both inclusive
    ///
    /// Empty when either stop is absent or the destination is unreachable.
    pub fn path(
        &mut self,
        graph: &Graph,
        origin: impl Into<StopKey>,
        destination: impl Into<StopKey>,
    ) -> Vec<StopIdentity> {
        self.search(graph, origin.into(), destination.into(), None)
    }

    /// Like [`Dijkstra::path`], restricted to stops of a single layer
    pub fn path_on_layer(
        &mut self,
        graph: &Graph,
        origin: impl Into<StopKey>,
        destination: impl Into<StopKey>,
        layer: Mode,
    ) -> Vec<StopIdentity> {
        self.search(graph, origin.into(), destination.into(), Some(layer))
    }

    fn search(
        &mut self,
        graph: &Graph,
        origin: StopKey,
        destination: StopKey,
        layer: Option<Mode>,
    ) -> Vec<StopIdentity> {
        let (Some(source), Some(target)) = (graph.vertex_id(origin), graph.vertex_id(destination))
        else {
            debug!("Dijkstra: {} or {} not in graph", origin, destination);
            return Vec::new();
        };
        if layer.is_some_and(|m| origin.mode != m || destination.mode != m) {
            return Vec::new();
        }

        let found = self.state.run(
            graph,
            source,
            target,
            |_| 0.0,
            |stop| layer.map_or(true, |m| stop.mode == m),
        );
        debug!(
            "Dijkstra {} -> {}: {:?} after settling {} vertices",
            origin, destination, found, self.state.settled
        );

        match found {
            Some(_) => self.state.path_to(graph, target),
            None => Vec::new(),
        }
    }
}
