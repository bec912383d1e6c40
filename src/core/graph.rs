//! Arena graph store
//!
//! Vertices live in a `Vec` addressed by [`VertexId`]; edges store the target
//! handle instead of a reference. Vertices are never removed, so every handle
//! handed out by a graph stays valid for that graph's lifetime.

use std::collections::HashMap;

use log::warn;
use serde::Serialize;

use crate::core::identity::{StopIdentity, StopKey, VertexId};

/// A directed, weighted edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: VertexId,
    /// Travel time in minutes; zero for board/alight transfers
    pub weight: f64,
    pub sequence_id: u64,
}

impl Edge {
    #[inline]
    pub fn is_transfer(&self) -> bool {
        self.weight == 0.0
    }
}

/// A stop and its outgoing edges, in insertion order
#[derive(Debug, Clone)]
pub struct Vertex {
    stop: StopIdentity,
    edges: Vec<Edge>,
}

impl Vertex {
    #[inline]
    pub fn stop(&self) -> &StopIdentity {
        &self.stop
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

/// Mutation record for observers mirroring the graph (e.g. a map display)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GraphEvent {
    VertexAdded {
        stop: StopIdentity,
    },
    EdgeAdded {
        from: StopIdentity,
        to: StopIdentity,
        weight: f64,
        sequence_id: u64,
    },
    EdgeRemoved {
        from: StopIdentity,
        to: StopIdentity,
        sequence_id: u64,
    },
}

#[derive(Debug, Default)]
pub struct Graph {
    vertices: Vec<Vertex>,
    index: HashMap<StopKey, VertexId>,
    edge_count: usize,
    next_sequence_id: u64,
    /// Bumped on every structural change; lets cached all-pairs tables detect staleness
    revision: u64,
    journal: Option<Vec<GraphEvent>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording [`GraphEvent`]s for later [`Graph::drain_events`]
    pub fn enable_journal(&mut self) {
        if self.journal.is_none() {
            self.journal = Some(Vec::new());
        }
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        self.journal.as_mut().map(std::mem::take).unwrap_or_default()
    }

    fn record(&mut self, event: GraphEvent) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push(event);
        }
    }

    /// Insert a stop, returning its handle. Inserting an existing stop is a no-op.
    pub fn add_vertex(&mut self, stop: StopIdentity) -> VertexId {
        let key = stop.key();
        if let Some(&id) = self.index.get(&key) {
            return id;
        }

        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(Vertex {
            stop,
            edges: Vec::new(),
        });
        self.index.insert(key, id);
        self.revision += 1;
        self.record(GraphEvent::VertexAdded { stop });
        id
    }

    /// Append an edge between two present stops
    ///
    /// Returns `false` and leaves the graph untouched when an endpoint is
    /// missing or the weight is negative or not finite.
    pub fn add_edge(
        &mut self,
        from: impl Into<StopKey>,
        to: impl Into<StopKey>,
        weight: f64,
        sequence_id: u64,
    ) -> bool {
        let (from, to) = (from.into(), to.into());
        match (self.vertex_id(from), self.vertex_id(to)) {
            (Some(source), Some(target)) => self.add_edge_between(source, target, weight, sequence_id),
            _ => false,
        }
    }

    /// [`Graph::add_edge`] on handles
    pub fn add_edge_between(
        &mut self,
        source: VertexId,
        target: VertexId,
        weight: f64,
        sequence_id: u64,
    ) -> bool {
        if !weight.is_finite() || weight < 0.0 {
            warn!(
                "Rejected edge {} -> {} with invalid weight {}",
                self.vertices[source.index()].stop,
                self.vertices[target.index()].stop,
                weight
            );
            return false;
        }

        self.vertices[source.index()].edges.push(Edge {
            target,
            weight,
            sequence_id,
        });
        self.edge_count += 1;
        self.next_sequence_id = self.next_sequence_id.max(sequence_id + 1);
        self.revision += 1;

        let (from, to) = (self.vertices[source.index()].stop, self.vertices[target.index()].stop);
        self.record(GraphEvent::EdgeAdded {
            from,
            to,
            weight,
            sequence_id,
        });
        true
    }

    /// Add `from -> to` unless such an edge already exists
    ///
    /// Returns `true` only when a new edge was appended.
    pub fn ensure_edge(&mut self, source: VertexId, target: VertexId, weight: f64) -> bool {
        if self.vertices[source.index()]
            .edges
            .iter()
            .any(|e| e.target == target)
        {
            return false;
        }
        let sequence_id = self.next_sequence_id();
        self.add_edge_between(source, target, weight, sequence_id)
    }

    /// Remove the first edge `from -> to`, reporting whether one existed
    pub fn remove_edge(&mut self, from: impl Into<StopKey>, to: impl Into<StopKey>) -> bool {
        let (from, to) = (from.into(), to.into());
        let (Some(source), Some(target)) = (self.vertex_id(from), self.vertex_id(to)) else {
            return false;
        };

        let edges = &mut self.vertices[source.index()].edges;
        let Some(pos) = edges.iter().position(|e| e.target == target) else {
            return false;
        };
        let removed = edges.remove(pos);
        self.edge_count -= 1;
        self.revision += 1;

        let (from, to) = (self.vertices[source.index()].stop, self.vertices[target.index()].stop);
        self.record(GraphEvent::EdgeRemoved {
            from,
            to,
            sequence_id: removed.sequence_id,
        });
        true
    }

    /// Remove any existing `from -> to` edge, then add the new one
    ///
    /// Returns `(added, replaced)`.
    pub fn replace_edge(
        &mut self,
        from: impl Into<StopKey>,
        to: impl Into<StopKey>,
        weight: f64,
        sequence_id: u64,
    ) -> (bool, bool) {
        let (from, to) = (from.into(), to.into());
        let replaced = self.remove_edge(from, to);
        (self.add_edge(from, to, weight, sequence_id), replaced)
    }

    /// Next unused edge sequence id
    pub fn next_sequence_id(&mut self) -> u64 {
        let id = self.next_sequence_id;
        self.next_sequence_id += 1;
        id
    }

    #[inline]
    pub fn vertex_id(&self, key: impl Into<StopKey>) -> Option<VertexId> {
        self.index.get(&key.into()).copied()
    }

    pub fn get_vertex(&self, key: impl Into<StopKey>) -> Option<&Vertex> {
        self.vertex_id(key).map(|id| &self.vertices[id.index()])
    }

    /// Vertex behind a handle issued by this graph
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    #[inline]
    pub fn stop(&self, id: VertexId) -> &StopIdentity {
        &self.vertices[id.index()].stop
    }

    /// All vertices in insertion order
    #[inline]
    pub fn all_vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len() as u32).map(VertexId)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Total weight of a stop sequence, taking the cheapest edge per hop
    ///
    /// `None` for an empty path or when two consecutive stops are not connected.
    pub fn path_weight(&self, path: &[StopIdentity]) -> Option<f64> {
        if path.is_empty() {
            return None;
        }

        let mut total = 0.0;
        for pair in path.windows(2) {
            let source = self.vertex_id(pair[0])?;
            let target = self.vertex_id(pair[1])?;
            let cheapest = self.vertices[source.index()]
                .edges
                .iter()
                .filter(|e| e.target == target)
                .map(|e| e.weight)
                .min_by(f64::total_cmp)?;
            total += cheapest;
        }
        Some(total)
    }
}
