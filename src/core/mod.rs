//! Core library modules for transit-graph
//!
//! Graph store, distance oracle, path solvers and overlay line synthesis.

pub mod astar;
pub mod bfs;
pub mod config;
pub mod dijkstra;
pub mod floyd_warshall;
pub mod geo;
pub mod graph;
pub mod identity;
pub mod ingest;
pub mod network;
pub mod overlay;
mod search;

// Re-export main types for internal use
pub use astar::{AStar, Heuristic};
pub use bfs::{bfs, reachability_audit, reachability_audit_with, Bfs, ReachabilityAudit};
pub use config::{LineRequest, NetworkConfig, TravelSpeeds};
pub use dijkstra::Dijkstra;
pub use floyd_warshall::{AllPairsSummary, FloydWarshall};
pub use geo::{haversine_distance, travel_minutes, EARTH_RADIUS_KM};
pub use graph::{Edge, Graph, GraphEvent, Vertex};
pub use identity::{Mode, StopIdentity, StopKey, VertexId};
pub use ingest::{load_network, IngestReport, MapFiles};
pub use network::{Algorithm, TransitNetwork};
pub use overlay::{Line, LineSpec, LineStop, LineSynthesizer, StopRole};
