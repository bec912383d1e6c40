//! Query facade over a transit network

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use transit_common::{suggest_correction, Error, Result};

use crate::core::astar::AStar;
use crate::core::bfs::{reachability_audit_with, ReachabilityAudit};
use crate::core::config::{LineRequest, NetworkConfig};
use crate::core::dijkstra::Dijkstra;
use crate::core::floyd_warshall::FloydWarshall;
use crate::core::graph::Graph;
use crate::core::identity::{Mode, StopIdentity, StopKey};
use crate::core::overlay::{Line, LineSpec, LineSynthesizer};

/// Shortest-path algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    Dijkstra,
    AStar,
    FloydWarshall,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Dijkstra, Algorithm::AStar, Algorithm::FloydWarshall];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Dijkstra => "Dijkstra",
            Algorithm::AStar => "A*",
            Algorithm::FloydWarshall => "Floyd-Warshall",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ALGORITHM_NAMES: &[&str] = &["dijkstra", "a*", "astar", "floyd-warshall"];

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "a*" | "astar" | "a-star" => Ok(Algorithm::AStar),
            "floyd-warshall" | "floydwarshall" | "floyd_warshall" => Ok(Algorithm::FloydWarshall),
            _ => Err(Error::UnknownAlgorithm {
                given: s.to_string(),
                suggestion: suggest_correction(s.trim(), ALGORITHM_NAMES),
            }),
        }
    }
}

/// A graph together with its configuration, solvers and synthesized lines
#[derive(Debug)]
pub struct TransitNetwork {
    graph: Graph,
    config: NetworkConfig,
    dijkstra: Dijkstra,
    astar: AStar,
    all_pairs: Option<FloydWarshall>,
    synthesizer: LineSynthesizer,
}

impl TransitNetwork {
    pub fn new(graph: Graph, config: NetworkConfig) -> Self {
        let astar = AStar::new(config.speeds.fastest_kmh());
        Self {
            graph,
            config,
            dijkstra: Dijkstra::new(),
            astar,
            all_pairs: None,
            synthesizer: LineSynthesizer::new(),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access to the graph; cached all-pairs tables are rebuilt on next use
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn lines(&self) -> &[Line] {
        self.synthesizer.lines()
    }

    pub fn contains(&self, stop: impl Into<StopKey>) -> bool {
        self.graph.vertex_id(stop).is_some()
    }

    /// Shortest path with the chosen algorithm, empty when there is none
    ///
    /// Only Floyd-Warshall can fail, with [`Error::Capacity`] on graphs above
    /// the configured size.
    pub fn shortest_path(
        &mut self,
        origin: impl Into<StopKey>,
        destination: impl Into<StopKey>,
        algorithm: Algorithm,
    ) -> Result<Vec<StopIdentity>> {
        let (origin, destination) = (origin.into(), destination.into());
        let path = match algorithm {
            Algorithm::Dijkstra => self.dijkstra.path(&self.graph, origin, destination),
            Algorithm::AStar => {
                self.astar.prepare_heuristic(&self.graph, destination);
                self.astar.path(&self.graph, origin, destination)
            }
            Algorithm::FloydWarshall => self.all_pairs()?.path(origin, destination),
        };
        debug!(
            "{} {} -> {}: {} stops",
            algorithm,
            origin,
            destination,
            path.len()
        );
        Ok(path)
    }

    /// All-pairs tables for the current graph, recomputed after any mutation
    pub fn all_pairs(&mut self) -> Result<&FloydWarshall> {
        self.all_pairs_with(|_| {})
    }

    pub fn all_pairs_with<F>(&mut self, progress: F) -> Result<&FloydWarshall>
    where
        F: FnMut(usize),
    {
        let fw = match self.all_pairs.take() {
            Some(fw) if fw.revision() == self.graph.revision() => fw,
            _ => FloydWarshall::build_with(
                &self.graph,
                self.config.floyd_warshall_max_vertices,
                progress,
            )?,
        };
        let fw: &FloydWarshall = self.all_pairs.insert(fw);
        Ok(fw)
    }

    pub fn reachability_audit(&self) -> ReachabilityAudit {
        reachability_audit_with(&self.graph, |_| {})
    }

    pub fn reachability_audit_with<F>(&self, progress: F) -> ReachabilityAudit
    where
        F: FnMut(usize),
    {
        reachability_audit_with(&self.graph, progress)
    }

    /// Synthesize bus lines, then subway lines, into the graph
    ///
    /// Returns the total number of lines added by this call.
    pub fn synthesize_lines<R>(&mut self, request: &LineRequest, rng: &mut R) -> Result<usize>
    where
        R: Rng + ?Sized,
    {
        let batches = [
            (Mode::Bus, request.bus_lines, request.bus_min_stops),
            (Mode::Subway, request.subway_lines, request.subway_min_stops),
        ];

        let mut produced = 0;
        for (mode, count, min_stops) in batches {
            let spec = LineSpec {
                mode,
                count,
                min_stops,
                speed_kmh: self.config.speeds.speed_for(mode),
                max_attempts: self.config.max_line_attempts,
            };
            produced += self.synthesizer.generate(&mut self.graph, &spec, rng)?;
        }

        info!(
            "Network now has {} lines, {} stops and {} edges",
            self.synthesizer.lines().len(),
            self.graph.vertex_count(),
            self.graph.edge_count()
        );
        Ok(produced)
    }

    /// Label the stops of every `mode` line from `names`, in line order
    ///
    /// The pool is shared across lines and restarts from the top when exhausted.
    pub fn name_lines<S: AsRef<str>>(&mut self, mode: Mode, names: &[S]) {
        let mut pool = names.iter().cycle();
        for line in self.synthesizer.lines_mut().iter_mut().filter(|l| l.mode() == mode) {
            let chunk: Vec<&S> = pool.by_ref().take(line.len()).collect();
            line.assign_names(&chunk);
        }
    }
}
