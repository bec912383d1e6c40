//! Plain-text rendering of query results

use std::io::{self, Write};
use std::time::Duration;

use transit_graph::{Algorithm, Graph, Line, Mode, ReachabilityAudit, StopIdentity};

/// Wall-clock time one algorithm spent answering a batch of queries
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub algorithm: Algorithm,
    pub queries: usize,
    pub elapsed: Duration,
}

impl Timing {
    pub fn mean(&self) -> Duration {
        match u32::try_from(self.queries) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.elapsed / n,
            Err(_) => Duration::from_secs_f64(self.elapsed.as_secs_f64() / self.queries as f64),
        }
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

pub fn write_path<W: Write>(out: &mut W, graph: &Graph, path: &[StopIdentity]) -> io::Result<()> {
    if path.is_empty() {
        return writeln!(out, "There is no such path");
    }

    for (i, stop) in path.iter().enumerate() {
        let layer = match stop.mode {
            Mode::Base => String::new(),
            mode => format!(" [{mode}]"),
        };
        writeln!(
            out,
            "{:>4}. {} ({:.6}, {:.6}){}",
            i + 1,
            stop.id,
            stop.latitude,
            stop.longitude,
            layer
        )?;
    }

    let changes = path.windows(2).filter(|p| p[0].mode != p[1].mode).count();
    match graph.path_weight(path) {
        Some(minutes) => writeln!(
            out,
            "{} stops, {:.1} min, {} mode changes",
            path.len(),
            minutes,
            changes
        ),
        None => writeln!(out, "{} stops", path.len()),
    }
}

pub fn write_audit<W: Write>(out: &mut W, audit: &ReachabilityAudit) -> io::Result<()> {
    writeln!(out, "Stops: {}", audit.vertices)?;
    writeln!(out, "Minimum unreachable: {}", audit.min_failures)?;
    writeln!(out, "Maximum unreachable: {}", audit.max_failures)
}

pub fn write_lines<W: Write>(out: &mut W, lines: &[Line]) -> io::Result<()> {
    for (n, line) in lines.iter().enumerate() {
        writeln!(out, "Line {} ({}, {} stops)", n + 1, line.mode(), line.len())?;
        for stop in line.stops() {
            match &stop.name {
                Some(name) => writeln!(out, "  {} {}", stop.stop.id, name)?,
                None => writeln!(out, "  {}", stop.stop.id)?,
            }
        }
    }
    Ok(())
}

/// Per-algorithm timings plus the number of pairs whose costs disagree
pub fn write_comparison<W: Write>(
    out: &mut W,
    table: Duration,
    timings: &[Timing],
    mismatches: usize,
) -> io::Result<()> {
    let pairs = timings.first().map_or(0, |t| t.queries);
    writeln!(out, "Pairs: {pairs}")?;
    writeln!(out, "Floyd-Warshall table: {:.3} ms", millis(table))?;
    for timing in timings {
        writeln!(
            out,
            "{}: {:.3} ms total, {:.4} ms per query",
            timing.algorithm,
            millis(timing.elapsed),
            millis(timing.mean())
        )?;
    }
    if mismatches == 0 {
        writeln!(out, "Costs agree: yes")
    } else {
        writeln!(out, "Costs agree: no ({mismatches} of {pairs} pairs differ)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_empty_path() {
        let graph = Graph::new();
        assert_eq!(render(|out| write_path(out, &graph, &[])), "There is no such path\n");
    }

    #[test]
    fn test_path_summary() {
        let mut graph = Graph::new();
        let a = StopIdentity::base(1, -8.61, 41.15);
        let b = a.on_layer(Mode::Bus);
        graph.add_vertex(a);
        graph.add_vertex(b);
        graph.add_edge(a, b, 0.0, 0);

        let text = render(|out| write_path(out, &graph, &[a, b]));
        assert!(text.contains("[bus]"));
        assert!(text.ends_with("2 stops, 0.0 min, 1 mode changes\n"));
    }

    #[test]
    fn test_audit() {
        let audit = ReachabilityAudit {
            vertices: 5,
            min_failures: 0,
            max_failures: 4,
        };
        let text = render(|out| write_audit(out, &audit));
        assert_eq!(text, "Stops: 5\nMinimum unreachable: 0\nMaximum unreachable: 4\n");
    }

    #[test]
    fn test_comparison() {
        let timings: Vec<Timing> = Algorithm::ALL
            .iter()
            .map(|&algorithm| Timing {
                algorithm,
                queries: 4,
                elapsed: Duration::from_millis(2),
            })
            .collect();

        let text = render(|out| write_comparison(out, Duration::from_millis(10), &timings, 0));
        assert!(text.starts_with("Pairs: 4\nFloyd-Warshall table: 10.000 ms\n"));
        assert!(text.contains("A*: 2.000 ms total, 0.5000 ms per query\n"));
        assert!(text.ends_with("Costs agree: yes\n"));

        let text = render(|out| write_comparison(out, Duration::ZERO, &timings, 1));
        assert!(text.ends_with("Costs agree: no (1 of 4 pairs differ)\n"));
    }

    #[test]
    fn test_mean_of_empty_batch() {
        let timing = Timing {
            algorithm: Algorithm::Dijkstra,
            queries: 0,
            elapsed: Duration::from_millis(3),
        };
        assert_eq!(timing.mean(), Duration::ZERO);
    }
}
