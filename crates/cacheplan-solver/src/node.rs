//! Search node representation.

use crate::problem::VarBounds;
use std::cmp::Ordering;

/// Fixing of one binary variable, made by a branching decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixing {
    pub var: usize,
    pub value: bool,
}

/// Lifecycle of a node: `Unexplored` until its relaxation is solved, then
/// `Bounded`, and finally closed in one of the remaining states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Unexplored,
    Bounded,
    Pruned,
    Branched,
    IntegralFeasible,
}

/// A node in the search frontier.
///
/// Nodes are self-contained values: the fixings from the root are carried
/// along, so the base model is never touched and a node can be bounded by any
/// worker without access to its ancestors.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Unique node identifier, assigned in creation order.
    pub id: u64,

    /// Depth in the tree (0 for root).
    pub depth: u32,

    /// Upper bound inherited from the parent relaxation.
    pub bound: f64,

    /// Fixings accumulated from the root to this node.
    pub fixings: Vec<Fixing>,

    pub state: NodeState,
}

impl SearchNode {
    /// Create the root node.
    pub fn root() -> Self {
        Self {
            id: 0,
            depth: 0,
            bound: f64::INFINITY,
            fixings: Vec::new(),
            state: NodeState::Unexplored,
        }
    }

    /// Create a child with one more fixing and the parent's relaxation bound.
    pub fn child(&self, id: u64, bound: f64, fixing: Fixing) -> Self {
        let mut fixings = Vec::with_capacity(self.fixings.len() + 1);
        fixings.extend_from_slice(&self.fixings);
        fixings.push(fixing);
        Self {
            id,
            depth: self.depth + 1,
            bound,
            fixings,
            state: NodeState::Unexplored,
        }
    }

    /// Base bounds narrowed by this node's fixings.
    pub fn restrict(&self, base: &[VarBounds]) -> Vec<VarBounds> {
        let mut bounds = base.to_vec();
        for fixing in &self.fixings {
            let value = if fixing.value { 1.0 } else { 0.0 };
            bounds[fixing.var] = VarBounds {
                lower: value,
                upper: value,
            };
        }
        bounds
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SearchNode {}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    /// Best bound first; among equal bounds the older node wins.
    fn cmp(&self, other: &Self) -> Ordering {
        self.bound
            .total_cmp(&other.bound)
            .then_with(|| other.id.cmp(&self.id))
    }
}
