// metrics.rs - Algorithm Metrics Toolkit
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Operation counters recorded by the analysis engines.
///
/// Each engine only touches the counters relevant to it:
/// - Tarjan SCC: `Visits`, `EdgesExplored`, `ComponentsFound`
/// - Kahn topological sort: `Pushes`, `Pops`
/// - DFS topological sort: `Visits`, `EdgesExplored`
/// - DAG paths: `Relaxations`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Counter {
    Visits,
    EdgesExplored,
    Pushes,
    Pops,
    Relaxations,
    ComponentsFound,
}

const COUNTER_SLOTS: usize = 6;

impl Counter {
    /// Every counter, in reporting order.
    pub const ALL: [Counter; COUNTER_SLOTS] = [
        Counter::Visits,
        Counter::EdgesExplored,
        Counter::Pushes,
        Counter::Pops,
        Counter::Relaxations,
        Counter::ComponentsFound,
    ];

    /// Stable snake-case name used in summaries and serialized reports.
    pub fn name(&self) -> &'static str {
        match self {
            Counter::Visits => "dfs_visits",
            Counter::EdgesExplored => "edges_explored",
            Counter::Pushes => "pushes",
            Counter::Pops => "pops",
            Counter::Relaxations => "relaxations",
            Counter::ComponentsFound => "sccs_found",
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Timer plus operation counters for a single algorithm run.
///
/// A `Metrics` value is owned by exactly one engine invocation. The elapsed time is
/// `stop - start`; before `start_timer` it is zero, and between `start_timer` and
/// `stop_timer` it is measured up to now.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    started: Option<Instant>,
    stopped: Option<Instant>,
    counters: [u64; COUNTER_SLOTS],
}

impl Metrics {
    /// Creates a new instance of `Metrics` with no timing and all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start instant and clears any previous stop instant.
    pub fn start_timer(&mut self) {
        self.started = Some(Instant::now());
        self.stopped = None;
    }

    /// Records the stop instant.
    pub fn stop_timer(&mut self) {
        self.stopped = Some(Instant::now());
    }

    /// Elapsed time between `start_timer` and `stop_timer`.
    pub fn elapsed(&self) -> Duration {
        match (self.started, self.stopped) {
            (Some(start), Some(stop)) => stop.saturating_duration_since(start),
            (Some(start), None) => start.elapsed(),
            (None, _) => Duration::ZERO,
        }
    }

    /// Elapsed time as fractional milliseconds.
    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed().as_nanos() as f64 / 1_000_000.0
    }

    /// Adds one to `counter`.
    pub fn increment(&mut self, counter: Counter) {
        self.increment_by(counter, 1);
    }

    /// Adds `amount` to `counter`.
    pub fn increment_by(&mut self, counter: Counter, amount: u64) {
        let slot = &mut self.counters[counter.slot()];
        *slot = slot.saturating_add(amount);
    }

    /// Current value of `counter`; counters never touched read as zero.
    pub fn counter(&self, counter: Counter) -> u64 {
        self.counters[counter.slot()]
    }

    /// Non-zero counters in reporting order.
    pub fn counters(&self) -> impl Iterator<Item = (Counter, u64)> + '_ {
        Counter::ALL
            .iter()
            .map(move |&counter| (counter, self.counter(counter)))
            .filter(|&(_, value)| value > 0)
    }

    /// Clears the timer and every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Times `f` with this collector's timer and returns its result.
    pub fn measure<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.start_timer();
        let result = f(self);
        self.stop_timer();
        result
    }

    /// Human-readable dump of the elapsed time and the non-zero counters.
    ///
    /// Meant for diagnostics; the exact text is not a stable format.
    pub fn summary(&self) -> String {
        self.to_string()
    }

    /// Serializable copy of the current values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            elapsed_ms: self.elapsed_millis(),
            counters: self
                .counters()
                .map(|(counter, value)| (counter.name(), value))
                .collect(),
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Execution Time: {:.3} ms", self.elapsed_millis())?;
        writeln!(f, "Counters:")?;
        for (counter, value) in self.counters() {
            writeln!(f, "  {}: {}", counter, value)?;
        }
        Ok(())
    }
}

/// Point-in-time view of a [`Metrics`] value, suitable for reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub elapsed_ms: f64,
    pub counters: BTreeMap<&'static str, u64>,
}
