use std::time::Duration;

/// Statistics collected during a branch-and-bound run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStatistics {
    /// Nodes whose relaxation was solved.
    pub nodes_explored: u64,
    /// Nodes whose relaxation had no feasible point.
    pub pruned_infeasible: u64,
    /// Nodes discarded because their bound could not beat the incumbent.
    pub pruned_bound: u64,
    /// Nodes whose relaxation was already integral.
    pub integral_nodes: u64,
    /// Nodes split into two children.
    pub branchings: u64,
    /// Strict incumbent improvements, warm start included.
    pub incumbent_updates: u64,
    /// Simplex pivots over all relaxations.
    pub lp_iterations: u64,
    /// The deepest level reached in the tree.
    pub max_depth: u32,
    /// Relaxation bound at the root node.
    pub root_bound: Option<f64>,
    /// Total time spent in the search.
    #[cfg_attr(feature = "serde", serde(with = "duration_secs"))]
    pub time_total: Duration,
}

impl SearchStatistics {
    #[inline]
    pub fn on_node_explored(&mut self, depth: u32, lp_iterations: usize) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
        self.lp_iterations = self.lp_iterations.saturating_add(lp_iterations as u64);
        self.max_depth = self.max_depth.max(depth);
    }

    #[inline]
    pub fn on_pruning_infeasible(&mut self) {
        self.pruned_infeasible = self.pruned_infeasible.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.pruned_bound = self.pruned_bound.saturating_add(1);
    }

    #[inline]
    pub fn on_integral_node(&mut self) {
        self.integral_nodes = self.integral_nodes.saturating_add(1);
    }

    #[inline]
    pub fn on_branching(&mut self) {
        self.branchings = self.branchings.saturating_add(1);
    }

    #[inline]
    pub fn on_incumbent_update(&mut self) {
        self.incumbent_updates = self.incumbent_updates.saturating_add(1);
    }

    #[inline]
    pub fn set_root_bound(&mut self, bound: f64) {
        self.root_bound = Some(bound);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Search statistics:")?;
        writeln!(f, "  Nodes explored:        {}", self.nodes_explored)?;
        writeln!(f, "  Pruned (infeasible):   {}", self.pruned_infeasible)?;
        writeln!(f, "  Pruned (bound):        {}", self.pruned_bound)?;
        writeln!(f, "  Integral nodes:        {}", self.integral_nodes)?;
        writeln!(f, "  Branchings:            {}", self.branchings)?;
        writeln!(f, "  Incumbent updates:     {}", self.incumbent_updates)?;
        writeln!(f, "  LP iterations:         {}", self.lp_iterations)?;
        writeln!(f, "  Max depth reached:     {}", self.max_depth)?;
        match self.root_bound {
            Some(bound) => writeln!(f, "  Root bound:            {:.2}", bound)?,
            None => writeln!(f, "  Root bound:            -")?,
        }
        writeln!(f, "  Total time:            {:.2?}", self.time_total)?;
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}
