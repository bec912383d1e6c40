//! # transit-graph
//!
//! A municipal transit network modelled as a weighted directed graph over
//! geocoded stops. The base layer is the pedestrian street network; bus and
//! subway lines are synthesized on top of it as separate layers joined to the
//! street network by zero-weight board and alight edges.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rand::SeedableRng;
//! use transit_graph::{load_network, Algorithm, LineRequest, NetworkConfig, StopKey, TransitNetwork};
//!
//! # fn main() -> transit_graph::Result<()> {
//! let config = NetworkConfig::default();
//! let (graph, _report) = load_network("maps/porto", &config.speeds)?;
//! let mut network = TransitNetwork::new(graph, config);
//!
//! let request = LineRequest { subway_lines: 2, subway_min_stops: 8, bus_lines: 4, bus_min_stops: 5 };
//! network.synthesize_lines(&request, &mut rand::rngs::StdRng::seed_from_u64(7))?;
//!
//! let path = network.shortest_path(StopKey::base(1), StopKey::base(42), Algorithm::AStar)?;
//! if path.is_empty() {
//!     println!("There is no such path");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Weights are travel minutes. Every solver returns the stops from origin to
//! destination inclusive, or an empty path when either stop is unknown or the
//! destination is unreachable.

mod core;

pub use crate::core::*;
pub use transit_common::{Error, Result};
