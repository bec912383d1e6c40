//! Synthesis of bus and subway lines on top of the pedestrian network
//!
//! A line follows the walking shortest path between two random base stops.
//! Each stop on it gets a twin on the line's layer, joined to the base stop
//! by zero-weight board/alight edges, and consecutive twins are joined by
//! edges timed at the mode's speed.

use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;
use transit_common::{Error, Result};

use crate::core::dijkstra::Dijkstra;
use crate::core::geo::travel_minutes;
use crate::core::graph::Graph;
use crate::core::identity::{Mode, StopIdentity, VertexId};

/// Position of a stop along its line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StopRole {
    Origin,
    Intermediate,
    Terminus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStop {
    pub stop: StopIdentity,
    /// Display name, assigned by the consumer of the line
    pub name: Option<String>,
}

/// A synthesized transit line; stops are on the line's layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    mode: Mode,
    stops: Vec<LineStop>,
}

impl Line {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn stops(&self) -> &[LineStop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Ordered overlay identities of the line
    pub fn identities(&self) -> Vec<StopIdentity> {
        self.stops.iter().map(|s| s.stop).collect()
    }

    pub fn role_of(&self, position: usize) -> Option<StopRole> {
        match position {
            p if p >= self.stops.len() => None,
            0 => Some(StopRole::Origin),
            p if p + 1 == self.stops.len() => Some(StopRole::Terminus),
            _ => Some(StopRole::Intermediate),
        }
    }

    /// Name the stops in order, cycling through `names` when it is shorter than the line
    pub fn assign_names<S: AsRef<str>>(&mut self, names: &[S]) {
        if names.is_empty() {
            return;
        }
        for (stop, name) in self.stops.iter_mut().zip(names.iter().cycle()) {
            stop.name = Some(name.as_ref().to_string());
        }
    }
}

/// Parameters for one batch of lines of a single mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSpec {
    pub mode: Mode,
    pub count: usize,
    /// Minimum stops per line; never less than two
    pub min_stops: usize,
    pub speed_kmh: f64,
    /// Sampling attempts allowed for the whole batch
    pub max_attempts: usize,
}

impl LineSpec {
    fn effective_min_stops(&self) -> usize {
        self.min_stops.max(2)
    }

    fn validate(&self) -> Result<()> {
        if !self.mode.is_overlay() {
            return Err(Error::InvalidInput(format!(
                "lines must be on an overlay layer, got '{}'",
                self.mode
            )));
        }
        if !self.speed_kmh.is_finite() || self.speed_kmh <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "{} speed must be positive, got {}",
                self.mode, self.speed_kmh
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidInput(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Generates lines into a graph and keeps every accepted line
#[derive(Debug, Default)]
pub struct LineSynthesizer {
    lines: Vec<Line>,
    dijkstra: Dijkstra,
}

impl LineSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut [Line] {
        &mut self.lines
    }

    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }

    /// Add `spec.count` lines of `spec.mode` to `graph`
    ///
    /// Every line of the batch draws from one budget of `spec.max_attempts`
    /// samples. Fails with [`Error::LineConstraintUnsatisfied`] once the
    /// budget runs out. Lines accepted before the failure stay in the graph
    /// and in [`LineSynthesizer::lines`].
    pub fn generate<R>(&mut self, graph: &mut Graph, spec: &LineSpec, rng: &mut R) -> Result<usize>
    where
        R: Rng + ?Sized,
    {
        spec.validate()?;
        if spec.count == 0 {
            return Ok(0);
        }

        let base: Vec<VertexId> = graph
            .vertex_ids()
            .filter(|&id| graph.stop(id).mode == Mode::Base)
            .collect();
        if base.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "{} lines need at least 2 base stops, network has {}",
                spec.mode,
                base.len()
            )));
        }

        let min_stops = spec.effective_min_stops();
        let mut budget = spec.max_attempts;
        for produced in 0..spec.count {
            let Some(baseline) = self.sample_baseline(graph, &base, min_stops, &mut budget, rng)
            else {
                warn!(
                    "Gave up on {} line {} of {} after {} attempts in the batch",
                    spec.mode,
                    produced + 1,
                    spec.count,
                    spec.max_attempts
                );
                return Err(Error::LineConstraintUnsatisfied {
                    mode: spec.mode.to_string(),
                    min_stops,
                    attempts: spec.max_attempts,
                    produced,
                });
            };

            let line = graft(graph, &baseline, spec);
            info!(
                "{} line {}: {} stops from {} to {}",
                spec.mode,
                produced + 1,
                line.len(),
                baseline[0],
                baseline[baseline.len() - 1]
            );
            self.lines.push(line);
        }

        Ok(spec.count)
    }

    /// Walking path between two random distinct base stops with at least `min_stops` stops
    ///
    /// Each sample spends one unit of `budget`.
    fn sample_baseline<R>(
        &mut self,
        graph: &Graph,
        base: &[VertexId],
        min_stops: usize,
        budget: &mut usize,
        rng: &mut R,
    ) -> Option<Vec<StopIdentity>>
    where
        R: Rng + ?Sized,
    {
        while *budget > 0 {
            *budget -= 1;
            let origin = base[rng.random_range(0..base.len())];
            let destination = base[rng.random_range(0..base.len())];
            if origin == destination {
                continue;
            }

            let (origin, destination) = (*graph.stop(origin), *graph.stop(destination));
            let path = self
                .dijkstra
                .path_on_layer(graph, origin, destination, Mode::Base);
            if path.len() >= min_stops {
                debug!(
                    "Accepted baseline {} -> {}, {} attempts left",
                    origin, destination, budget
                );
                return Some(path);
            }
            debug!(
                "Rejected baseline {} -> {}: {} stops, need {}",
                origin,
                destination,
                path.len(),
                min_stops
            );
        }
        None
    }
}

/// Build the overlay chain for `baseline` and wire it to the base network
fn graft(graph: &mut Graph, baseline: &[StopIdentity], spec: &LineSpec) -> Line {
    let last = baseline.len() - 1;
    let mut stops = Vec::with_capacity(baseline.len());
    let mut previous: Option<(VertexId, StopIdentity)> = None;

    for (i, base_stop) in baseline.iter().enumerate() {
        let overlay_stop = base_stop.on_layer(spec.mode);
        let overlay = graph.add_vertex(overlay_stop);
        let Some(base) = graph.vertex_id(base_stop) else {
            continue;
        };

        // Board everywhere but the terminus, alight everywhere but the origin
        if i < last {
            graph.ensure_edge(base, overlay, 0.0);
        }
        if i > 0 {
            graph.ensure_edge(overlay, base, 0.0);
        }
        if let Some((prev, prev_stop)) = previous {
            let minutes = travel_minutes(prev_stop.distance_km(&overlay_stop), spec.speed_kmh);
            graph.ensure_edge(prev, overlay, minutes);
        }

        previous = Some((overlay, overlay_stop));
        stops.push(LineStop {
            stop: overlay_stop,
            name: None,
        });
    }

    Line {
        mode: spec.mode,
        stops,
    }
}
