//! A* search guided by great-circle distance to the destination

use log::{debug, warn};

use crate::core::geo::haversine_distance;
use crate::core::graph::Graph;
use crate::core::identity::{StopIdentity, StopKey};
use crate::core::search::SearchState;

/// Lower bound on travel time to a fixed destination
///
/// Great-circle distance divided by the fastest speed on the network never
/// exceeds the real travel time, since every edge weight is a distance
/// travelled at one of the network speeds.
#[derive(Debug, Clone, Copy)]
pub struct Heuristic {
    target: StopKey,
    latitude: f64,
    longitude: f64,
    minutes_per_km: f64,
}

impl Heuristic {
    pub fn target(&self) -> StopKey {
        self.target
    }

    #[inline]
    pub fn estimate(&self, stop: &StopIdentity) -> f64 {
        haversine_distance(stop.latitude, stop.longitude, self.latitude, self.longitude)
            * self.minutes_per_km
    }
}

#[derive(Debug)]
pub struct AStar {
    state: SearchState,
    minutes_per_km: f64,
    heuristic: Option<Heuristic>,
}

impl AStar {
    /// Solver for a network whose fastest mode moves at `fastest_kmh`
    ///
    /// A speed that is not finite and positive gives a zero heuristic, which
    /// reduces the search to Dijkstra.
    pub fn new(fastest_kmh: f64) -> Self {
        let minutes_per_km = if fastest_kmh.is_finite() && fastest_kmh > 0.0 {
            60.0 / fastest_kmh
        } else {
            warn!("A*: invalid fastest speed {fastest_kmh} km/h, heuristic disabled");
            0.0
        };
        Self {
            state: SearchState::new(),
            minutes_per_km,
            heuristic: None,
        }
    }

    /// Bind the heuristic to `destination`
    ///
    /// Returns `false` and clears any previous binding when the destination
    /// is not in the graph.
    pub fn prepare_heuristic(&mut self, graph: &Graph, destination: impl Into<StopKey>) -> bool {
        let key = destination.into();
        self.heuristic = graph.get_vertex(key).map(|v| Heuristic {
            target: key,
            latitude: v.stop().latitude,
            longitude: v.stop().longitude,
            minutes_per_km: self.minutes_per_km,
        });
        self.heuristic.is_some()
    }

    pub fn heuristic(&self) -> Option<&Heuristic> {
        self.heuristic.as_ref()
    }

    /// Shortest path from `origin` to `destination`, both inclusive
    ///
    /// Rebinds the heuristic first if it targets a different stop.
    pub fn path(
        &mut self,
        graph: &Graph,
        origin: impl Into<StopKey>,
        destination: impl Into<StopKey>,
    ) -> Vec<StopIdentity> {
        let (origin, destination) = (origin.into(), destination.into());
        if self.heuristic.map(|h| h.target) != Some(destination)
            && !self.prepare_heuristic(graph, destination)
        {
            debug!("A*: destination {} not in graph", destination);
            return Vec::new();
        }
        let Some(heuristic) = self.heuristic else {
            return Vec::new();
        };

        let (Some(source), Some(target)) = (graph.vertex_id(origin), graph.vertex_id(destination))
        else {
            debug!("A*: origin {} not in graph", origin);
            return Vec::new();
        };

        let found = self
            .state
            .run(graph, source, target, |stop| heuristic.estimate(stop), |_| true);
        debug!(
            "A* {} -> {}: {:?} after settling {} vertices",
            origin, destination, found, self.state.settled
        );

        match found {
            Some(_) => self.state.path_to(graph, target),
            None => Vec::new(),
        }
    }
}
