//! Loading the base pedestrian network from semicolon-separated text files
//!
//! A map is three files sharing a prefix:
//!
//! - `<prefix>_a.txt`: stops, `id;latitude;longitude[;...]` in degrees
//! - `<prefix>_b.txt`: streets, `street_id;name;True|False` (two-way flag)
//! - `<prefix>_c.txt`: segments, `street_id;from_stop;to_stop`

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info, warn};
use serde::Serialize;
use transit_common::{Error, Result};

use crate::core::config::TravelSpeeds;
use crate::core::geo::travel_minutes;
use crate::core::graph::Graph;
use crate::core::identity::{StopIdentity, StopKey};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopRecord {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetRecord {
    pub id: i64,
    pub name: String,
    pub two_way: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRecord {
    pub street_id: i64,
    pub from: i64,
    pub to: i64,
}

/// Counters from building a base network
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub stops: usize,
    pub streets: usize,
    pub segments: usize,
    pub edges_added: usize,
    /// Edges that replaced an existing edge between the same two stops
    pub edges_replaced: usize,
    /// Segments dropped because an endpoint is not a known stop
    pub skipped_segments: usize,
    /// Segments whose street is missing from the streets file; treated as one-way
    pub unknown_streets: usize,
}

/// The three data files of a map prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFiles {
    pub stops: PathBuf,
    pub streets: PathBuf,
    pub segments: PathBuf,
}

impl MapFiles {
    pub fn from_prefix(prefix: impl AsRef<Path>) -> Self {
        let with_suffix = |suffix: &str| {
            let mut name = OsString::from(prefix.as_ref().as_os_str());
            name.push(suffix);
            PathBuf::from(name)
        };
        Self {
            stops: with_suffix("_a.txt"),
            streets: with_suffix("_b.txt"),
            segments: with_suffix("_c.txt"),
        }
    }
}

/// Semicolon reader over one data file; records carry their 1-based line
struct Records<R> {
    path: PathBuf,
    reader: csv::Reader<R>,
}

impl<R: Read> Records<R> {
    fn new(path: &Path, input: R) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .from_reader(input);
        Self {
            path: path.to_path_buf(),
            reader,
        }
    }

    /// Visit every non-blank record
    fn for_each<F>(&mut self, mut visit: F) -> Result<()>
    where
        F: FnMut(&Path, u64, &StringRecord) -> Result<()>,
    {
        let mut record = StringRecord::new();
        loop {
            let more = self.reader.read_record(&mut record).map_err(|e| {
                let line = e.position().map_or(0, |p| p.line());
                match e.into_kind() {
                    csv::ErrorKind::Io(io) => Error::Io(io),
                    kind => Error::Parse {
                        path: self.path.clone(),
                        line,
                        message: format!("{kind:?}"),
                    },
                }
            })?;
            if !more {
                return Ok(());
            }
            if record.iter().all(str::is_empty) {
                continue;
            }
            let line = record.position().map_or(0, |p| p.line());
            visit(&self.path, line, &record)?;
        }
    }
}

fn field<T: FromStr>(path: &Path, line: u64, record: &StringRecord, index: usize, what: &str) -> Result<T> {
    let raw = record.get(index).unwrap_or("");
    raw.parse().map_err(|_| Error::Parse {
        path: path.to_path_buf(),
        line,
        message: if raw.is_empty() {
            format!("missing {what}")
        } else {
            format!("invalid {what} '{raw}'")
        },
    })
}

fn open(path: &Path) -> Result<Records<File>> {
    Ok(Records::new(path, File::open(path)?))
}

pub fn read_stops(path: impl AsRef<Path>) -> Result<Vec<StopRecord>> {
    let path = path.as_ref();
    parse_stops(path, open(path)?)
}

fn parse_stops<R: Read>(path: &Path, mut records: Records<R>) -> Result<Vec<StopRecord>> {
    let mut stops = Vec::new();
    records.for_each(|_, line, record| {
        stops.push(StopRecord {
            id: field(path, line, record, 0, "stop id")?,
            latitude: field(path, line, record, 1, "latitude")?,
            longitude: field(path, line, record, 2, "longitude")?,
        });
        Ok(())
    })?;
    debug!("Read {} stops from {}", stops.len(), path.display());
    Ok(stops)
}

pub fn read_streets(path: impl AsRef<Path>) -> Result<Vec<StreetRecord>> {
    let path = path.as_ref();
    parse_streets(path, open(path)?)
}

fn parse_streets<R: Read>(path: &Path, mut records: Records<R>) -> Result<Vec<StreetRecord>> {
    let mut streets = Vec::new();
    records.for_each(|_, line, record| {
        let name = match record.get(1).unwrap_or("") {
            "" => "unnamed".to_string(),
            name => name.to_string(),
        };
        let two_way = match record.get(2).unwrap_or("") {
            flag if flag.eq_ignore_ascii_case("true") => true,
            flag if flag.eq_ignore_ascii_case("false") => false,
            flag => {
                return Err(Error::Parse {
                    path: path.to_path_buf(),
                    line,
                    message: format!("two-way flag must be True or False, got '{flag}'"),
                })
            }
        };
        streets.push(StreetRecord {
            id: field(path, line, record, 0, "street id")?,
            name,
            two_way,
        });
        Ok(())
    })?;
    debug!("Read {} streets from {}", streets.len(), path.display());
    Ok(streets)
}

pub fn read_segments(path: impl AsRef<Path>) -> Result<Vec<SegmentRecord>> {
    let path = path.as_ref();
    parse_segments(path, open(path)?)
}

fn parse_segments<R: Read>(path: &Path, mut records: Records<R>) -> Result<Vec<SegmentRecord>> {
    let mut segments = Vec::new();
    records.for_each(|_, line, record| {
        segments.push(SegmentRecord {
            street_id: field(path, line, record, 0, "street id")?,
            from: field(path, line, record, 1, "origin stop")?,
            to: field(path, line, record, 2, "destination stop")?,
        });
        Ok(())
    })?;
    debug!("Read {} segments from {}", segments.len(), path.display());
    Ok(segments)
}

/// One name per non-blank line, for labelling synthesized line stops
pub fn read_names(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Assemble the walking network
///
/// Edge weights are walking minutes over the great-circle distance. A segment
/// repeating an existing directed stop pair replaces the earlier edge; two-way
/// streets also get the reverse edge.
pub fn build_graph(
    stops: &[StopRecord],
    streets: &[StreetRecord],
    segments: &[SegmentRecord],
    speeds: &TravelSpeeds,
) -> (Graph, IngestReport) {
    let mut graph = Graph::new();
    let mut report = IngestReport {
        streets: streets.len(),
        segments: segments.len(),
        ..IngestReport::default()
    };

    for stop in stops {
        graph.add_vertex(StopIdentity::base(stop.id, stop.longitude, stop.latitude));
    }
    report.stops = graph.vertex_count();

    let two_way: HashMap<i64, bool> = streets.iter().map(|s| (s.id, s.two_way)).collect();

    for segment in segments {
        let (from, to) = (StopKey::base(segment.from), StopKey::base(segment.to));
        let (Some(a), Some(b)) = (graph.get_vertex(from), graph.get_vertex(to)) else {
            warn!(
                "Skipping segment {} -> {} of street {}: unknown stop",
                segment.from, segment.to, segment.street_id
            );
            report.skipped_segments += 1;
            continue;
        };
        let minutes = travel_minutes(a.stop().distance_km(b.stop()), speeds.walk_kmh);

        let reciprocal = match two_way.get(&segment.street_id) {
            Some(&flag) => flag,
            None => {
                debug!("Street {} not in streets file, assuming one-way", segment.street_id);
                report.unknown_streets += 1;
                false
            }
        };

        let mut connect = |graph: &mut Graph, from: StopKey, to: StopKey| {
            let sequence_id = graph.next_sequence_id();
            let (added, replaced) = graph.replace_edge(from, to, minutes, sequence_id);
            report.edges_added += usize::from(added);
            report.edges_replaced += usize::from(replaced);
        };
        connect(&mut graph, from, to);
        if reciprocal {
            connect(&mut graph, to, from);
        }
    }

    info!(
        "Built base network: {} stops, {} edges ({} replaced, {} segments skipped)",
        report.stops,
        graph.edge_count(),
        report.edges_replaced,
        report.skipped_segments
    );
    (graph, report)
}

/// Read the three files of `prefix` and build the walking network
pub fn load_network(prefix: impl AsRef<Path>, speeds: &TravelSpeeds) -> Result<(Graph, IngestReport)> {
    let files = MapFiles::from_prefix(prefix);
    let stops = read_stops(&files.stops)?;
    let streets = read_streets(&files.streets)?;
    let segments = read_segments(&files.segments)?;
    Ok(build_graph(&stops, &streets, &segments, speeds))
}
