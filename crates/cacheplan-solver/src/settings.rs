//! Configuration settings for the branch-and-bound search.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// Search settings. Every limit is optional; with none set the search runs
/// until the gap target is met or the tree is exhausted.
#[derive(Debug, Clone)]
pub struct SolverSettings {
    /// Relative optimality gap at which the search stops.
    /// Gap is `(bound - incumbent) / max(1, |incumbent|)`.
    pub gap_tolerance: f64,

    /// A value within this distance of an integer counts as integral.
    pub integrality_tolerance: f64,

    /// Wall-clock budget, checked whenever a node is dequeued.
    pub time_limit: Option<Duration>,

    /// Maximum number of nodes to bound.
    pub node_limit: Option<u64>,

    /// Worker threads pulling from the shared frontier. One keeps the search
    /// fully deterministic.
    pub threads: usize,

    /// Emit a progress line every N explored nodes (0 disables).
    pub log_interval: u64,

    /// Pivot limit for a single LP relaxation.
    pub max_lp_iterations: usize,

    /// External cancellation flag, polled whenever a node is dequeued.
    pub interrupt: Option<Arc<AtomicBool>>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            gap_tolerance: 0.005,
            integrality_tolerance: 1e-6,
            time_limit: None,
            node_limit: None,
            threads: 1,
            log_interval: 1000,
            max_lp_iterations: 50_000,
            interrupt: None,
        }
    }
}

impl SolverSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set optimality gap tolerance.
    pub fn with_gap_tolerance(mut self, gap: f64) -> Self {
        self.gap_tolerance = gap.max(0.0);
        self
    }

    pub fn with_integrality_tolerance(mut self, tol: f64) -> Self {
        self.integrality_tolerance = tol;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_log_interval(mut self, interval: u64) -> Self {
        self.log_interval = interval;
        self
    }

    pub fn with_max_lp_iterations(mut self, max: usize) -> Self {
        self.max_lp_iterations = max;
        self
    }

    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SolverSettings::default();
        assert_eq!(settings.gap_tolerance, 0.005);
        assert_eq!(settings.integrality_tolerance, 1e-6);
        assert_eq!(settings.threads, 1);
        assert!(settings.time_limit.is_none());
        assert!(settings.node_limit.is_none());
    }

    #[test]
    fn test_builders_clamp_degenerate_values() {
        let settings = SolverSettings::new().with_threads(0).with_gap_tolerance(-1.0);
        assert_eq!(settings.threads, 1);
        assert_eq!(settings.gap_tolerance, 0.0);
    }
}
