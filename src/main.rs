//! # transit-graph CLI
//!
//! Command-line interface for the transit-graph library: shortest paths,
//! connectivity audits and line synthesis over a map's text files.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use transit_graph::{
    ingest, load_network, Algorithm, LineRequest, Mode, NetworkConfig, StopKey, TransitNetwork,
};

mod cli;

/// Exit code when the origin or destination stop is not in the network
const EXIT_UNKNOWN_STOP: u8 = 2;
/// Exit code when the algorithm name is not recognized
const EXIT_UNKNOWN_ALGORITHM: u8 = 3;

/// Command-line interface for transit-graph
#[derive(Parser)]
#[command(name = "transit-graph")]
#[command(about = "Shortest paths and synthetic transit lines over a city stop network")]
#[command(long_about = "Loads a map from <prefix>_a.txt (stops), <prefix>_b.txt (streets) and
<prefix>_c.txt (segments), then:
  transit-graph route -p maps/porto --from 1 --to 42 -a A*
  transit-graph route -p maps/porto --from 1 --to 42 --bus-lines 4 --bus-length 10 --seed 7
  transit-graph connectivity -p maps/porto
  transit-graph lines -p maps/porto --subway-lines 2 --subway-length 20 --json
  transit-graph all-pairs -p maps/porto --paths 5
  transit-graph compare -p maps/porto --pairs 200 --bus-lines 4")]
#[command(version = env!("TRANSIT_GRAPH_VERSION"))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file overriding speeds and limits
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct NetworkArgs {
    /// Map file prefix, e.g. "maps/porto" for maps/porto_a.txt
    #[arg(short, long)]
    prefix: PathBuf,
}

#[derive(Args)]
struct LineArgs {
    /// Number of subway lines to synthesize
    #[arg(long, default_value_t = 0)]
    subway_lines: usize,

    /// Minimum stops per subway line
    #[arg(long, default_value_t = 10)]
    subway_length: usize,

    /// Number of bus lines to synthesize
    #[arg(long, default_value_t = 0)]
    bus_lines: usize,

    /// Minimum stops per bus line
    #[arg(long, default_value_t = 10)]
    bus_length: usize,

    /// Seed for stop sampling; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Names for subway stops, one per line
    #[arg(long, value_name = "FILE")]
    subway_names: Option<PathBuf>,

    /// Names for bus stops, one per line
    #[arg(long, value_name = "FILE")]
    bus_names: Option<PathBuf>,
}

impl LineArgs {
    fn request(&self) -> LineRequest {
        LineRequest {
            subway_lines: self.subway_lines,
            subway_min_stops: self.subway_length,
            bus_lines: self.bus_lines,
            bus_min_stops: self.bus_length,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Shortest path between two base stops
    Route {
        #[command(flatten)]
        network: NetworkArgs,

        /// Origin stop id
        #[arg(long)]
        from: i64,

        /// Destination stop id
        #[arg(long)]
        to: i64,

        /// "Dijkstra", "A*" or "Floyd-Warshall"
        #[arg(short, long, default_value = "Dijkstra")]
        algorithm: String,

        #[command(flatten)]
        lines: LineArgs,
    },

    /// Count unreachable stops from every start stop
    Connectivity {
        #[command(flatten)]
        network: NetworkArgs,

        #[command(flatten)]
        lines: LineArgs,
    },

    /// Synthesize transit lines and print them
    Lines {
        #[command(flatten)]
        network: NetworkArgs,

        #[command(flatten)]
        lines: LineArgs,

        /// Print lines as JSON
        #[arg(long)]
        json: bool,
    },

    /// All-pairs shortest paths summary
    AllPairs {
        #[command(flatten)]
        network: NetworkArgs,

        #[command(flatten)]
        lines: LineArgs,

        /// Also print this many random reachable paths
        #[arg(long, default_value_t = 0)]
        paths: usize,
    },

    /// Time every algorithm on random stop pairs and check their costs agree
    Compare {
        #[command(flatten)]
        network: NetworkArgs,

        #[command(flatten)]
        lines: LineArgs,

        /// Number of origin-destination pairs to sample
        #[arg(long, default_value_t = 100)]
        pairs: usize,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            if let Some(transit_graph::Error::UnknownAlgorithm { .. }) = e.downcast_ref::<transit_graph::Error>() {
                error!("{e}");
                return ExitCode::from(EXIT_UNKNOWN_ALGORITHM);
            }
            error!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    info!("transit-graph v{} starting", env!("TRANSIT_GRAPH_VERSION"));

    let config = match &cli.config {
        Some(path) => NetworkConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => NetworkConfig::default(),
    };

    match cli.command {
        Command::Route {
            network,
            from,
            to,
            algorithm,
            lines,
        } => {
            let algorithm: Algorithm = algorithm.parse()?;
            let mut network = open_network(&network, config, &lines)?;
            route(&mut network, from, to, algorithm)
        }
        Command::Connectivity { network, lines } => {
            let network = open_network(&network, config, &lines)?;
            connectivity(&network, cli.verbose)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Lines {
            network,
            lines,
            json,
        } => {
            let network = open_network(&network, config, &lines)?;
            let mut out = io::stdout().lock();
            if json {
                serde_json::to_writer_pretty(&mut out, network.lines())?;
                writeln!(out)?;
            } else {
                cli::report::write_lines(&mut out, network.lines())?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::AllPairs {
            network,
            lines,
            paths,
        } => {
            let mut rng = make_rng(lines.seed);
            let mut network = open_network(&network, config, &lines)?;
            all_pairs(&mut network, paths, &mut rng, cli.verbose)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Compare {
            network,
            lines,
            pairs,
        } => {
            let mut rng = make_rng(lines.seed);
            let mut network = open_network(&network, config, &lines)?;
            compare(&mut network, pairs, &mut rng, cli.verbose)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Load the base network and synthesize the requested lines on top of it
fn open_network(args: &NetworkArgs, config: NetworkConfig, lines: &LineArgs) -> Result<TransitNetwork> {
    let (graph, report) = load_network(&args.prefix, &config.speeds)
        .with_context(|| format!("Failed to load map {}", args.prefix.display()))?;
    info!(
        "Loaded {} stops and {} edges from {} segments",
        report.stops,
        graph.edge_count(),
        report.segments
    );

    let mut network = TransitNetwork::new(graph, config);
    let request = lines.request();
    if !request.is_empty() {
        let mut rng = make_rng(lines.seed);
        network
            .synthesize_lines(&request, &mut rng)
            .context("Line synthesis failed")?;
    }

    for (mode, file) in [(Mode::Subway, &lines.subway_names), (Mode::Bus, &lines.bus_names)] {
        if let Some(path) = file {
            let names = ingest::read_names(path)
                .with_context(|| format!("Failed to read names {}", path.display()))?;
            network.name_lines(mode, &names);
        }
    }

    Ok(network)
}

fn route(network: &mut TransitNetwork, from: i64, to: i64, algorithm: Algorithm) -> Result<ExitCode> {
    let (origin, destination) = (StopKey::base(from), StopKey::base(to));
    for stop in [origin, destination] {
        if !network.contains(stop) {
            eprintln!("Stop {} is not in the network", stop.id);
            return Ok(ExitCode::from(EXIT_UNKNOWN_STOP));
        }
    }

    let path = network.shortest_path(origin, destination, algorithm)?;
    let mut out = io::stdout().lock();
    writeln!(out, "{algorithm} from {from} to {to}")?;
    cli::report::write_path(&mut out, network.graph(), &path)?;
    Ok(ExitCode::SUCCESS)
}

fn connectivity(network: &TransitNetwork, verbose: bool) -> Result<()> {
    let total = network.graph().vertex_count() as u64;
    let progress = cli::ProgressManager::new(total, "stops", "Auditing reachability", verbose);
    let audit = network.reachability_audit_with(progress.tracker());
    progress.finish("Audit complete");

    cli::report::write_audit(&mut io::stdout().lock(), &audit)?;
    Ok(())
}

fn all_pairs<R: Rng>(network: &mut TransitNetwork, paths: usize, rng: &mut R, verbose: bool) -> Result<()> {
    let total = network.graph().vertex_count() as u64;
    let progress = cli::ProgressManager::new(total, "rounds", "Computing all-pairs table", verbose);
    let (summary, samples) = {
        let fw = network.all_pairs_with(progress.tracker())?;
        let summary = fw.summary();
        let stops = fw.stops();

        let wanted = paths.min(summary.reachable_pairs);
        let mut samples = Vec::with_capacity(wanted);
        let mut attempts = 0usize;
        while samples.len() < wanted && attempts < wanted.saturating_mul(100) {
            attempts += 1;
            let origin = stops[rng.random_range(0..stops.len())];
            let destination = stops[rng.random_range(0..stops.len())];
            if origin == destination {
                continue;
            }
            let path = fw.path(origin, destination);
            if !path.is_empty() {
                samples.push(path);
            }
        }
        (summary, samples)
    };
    progress.finish("Table complete");

    let mut out = io::stdout().lock();
    writeln!(out, "Stops: {}", summary.stops)?;
    writeln!(out, "Reachable pairs: {}", summary.reachable_pairs)?;
    writeln!(out, "Mean travel time: {:.1} min", summary.mean_minutes)?;
    writeln!(out, "Longest travel time: {:.1} min", summary.max_minutes)?;
    for (n, path) in samples.iter().enumerate() {
        writeln!(out, "\nPath {}: {} -> {}", n + 1, path[0], path[path.len() - 1])?;
        cli::report::write_path(&mut out, network.graph(), path)?;
    }
    Ok(())
}

/// Relative tolerance when comparing path costs between algorithms
const COST_TOLERANCE: f64 = 1e-9;

fn costs_agree(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() <= COST_TOLERANCE * a.abs().max(1.0),
        (None, None) => true,
        _ => false,
    }
}

fn compare<R: Rng>(network: &mut TransitNetwork, pairs: usize, rng: &mut R, verbose: bool) -> Result<()> {
    let base: Vec<StopKey> = network
        .graph()
        .all_vertices()
        .iter()
        .map(|v| v.stop().key())
        .filter(|key| key.mode == Mode::Base)
        .collect();
    if base.is_empty() {
        anyhow::bail!("The network has no stops to compare");
    }
    let sample: Vec<(StopKey, StopKey)> = (0..pairs)
        .map(|_| {
            (
                base[rng.random_range(0..base.len())],
                base[rng.random_range(0..base.len())],
            )
        })
        .collect();

    // Floyd-Warshall timings below cover table lookups only
    let total = network.graph().vertex_count() as u64;
    let progress = cli::ProgressManager::new(total, "rounds", "Computing all-pairs table", verbose);
    let started = Instant::now();
    network.all_pairs_with(progress.tracker())?;
    let table = started.elapsed();
    progress.finish("Table complete");

    let mut timings = Vec::with_capacity(Algorithm::ALL.len());
    let mut costs: Vec<Vec<Option<f64>>> = Vec::with_capacity(Algorithm::ALL.len());
    for algorithm in Algorithm::ALL {
        let mut found = Vec::with_capacity(sample.len());
        let started = Instant::now();
        for &(origin, destination) in &sample {
            found.push(network.shortest_path(origin, destination, algorithm)?);
        }
        let elapsed = started.elapsed();
        info!("{algorithm}: {} queries in {:?}", sample.len(), elapsed);

        costs.push(found.iter().map(|path| network.graph().path_weight(path)).collect());
        timings.push(cli::report::Timing {
            algorithm,
            queries: sample.len(),
            elapsed,
        });
    }

    let mismatches = (0..sample.len())
        .filter(|&i| costs[1..].iter().any(|other| !costs_agree(costs[0][i], other[i])))
        .count();
    cli::report::write_comparison(&mut io::stdout().lock(), table, &timings, mismatches)?;
    Ok(())
}
