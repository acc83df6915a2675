//! # Shared Incumbent
//!
//! Holder for the best integral solution found so far. The objective is kept
//! twice: as `f64` bits in an atomic for cheap lock-free pruning checks, and
//! next to the solution behind a `Mutex`, which is the source of truth.
//! Candidates are installed only when strictly better than the stored one, so
//! concurrent workers can publish without coordinating.
//!
//! All objectives here are in maximization sense.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// An integral feasible assignment and its objective value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Incumbent {
    values: Vec<f64>,
    objective: f64,
}

impl Incumbent {
    pub fn new(values: Vec<f64>, objective: f64) -> Self {
        Self { values, objective }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    pub(crate) fn negated(mut self) -> Self {
        self.objective = -self.objective;
        self
    }
}

/// Single-writer-at-a-time, many-reader slot for the best known solution.
#[derive(Debug)]
pub struct SharedIncumbent {
    /// Objective of the stored solution as `f64` bits; `-inf` while empty.
    best: AtomicU64,
    solution: Mutex<Option<Incumbent>>,
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedIncumbent {
    /// Creates an empty incumbent.
    pub fn new() -> Self {
        Self {
            best: AtomicU64::new(f64::NEG_INFINITY.to_bits()),
            solution: Mutex::new(None),
        }
    }

    /// Fast read of the best objective; `-inf` when nothing is installed.
    #[inline]
    pub fn best_objective(&self) -> f64 {
        f64::from_bits(self.best.load(Ordering::Acquire))
    }

    /// Returns `true` once a solution has been installed.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.best_objective() > f64::NEG_INFINITY
    }

    /// Returns a clone of the stored solution, if any.
    pub fn snapshot(&self) -> Option<Incumbent> {
        self.solution
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs `candidate` if it is strictly better than the stored solution.
    /// Returns `true` if the candidate was installed.
    pub fn try_install(&self, candidate: Incumbent) -> bool {
        if candidate.objective <= self.best_objective() {
            return false;
        }

        let mut guard = self.solution.lock().unwrap_or_else(PoisonError::into_inner);
        // Another worker may have installed a better one while we waited.
        if let Some(current) = guard.as_ref() {
            if candidate.objective <= current.objective {
                return false;
            }
        }

        self.best.store(candidate.objective.to_bits(), Ordering::Release);
        *guard = Some(candidate);
        true
    }

    pub fn into_inner(self) -> Option<Incumbent> {
        self.solution
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_starts_empty() {
        let incumbent = SharedIncumbent::new();
        assert!(!incumbent.is_set());
        assert_eq!(incumbent.best_objective(), f64::NEG_INFINITY);
        assert!(incumbent.snapshot().is_none());
    }

    #[test]
    fn test_installs_only_strict_improvements() {
        let incumbent = SharedIncumbent::new();
        assert!(incumbent.try_install(Incumbent::new(vec![1.0], 10.0)));
        assert!(!incumbent.try_install(Incumbent::new(vec![0.0], 10.0)));
        assert!(!incumbent.try_install(Incumbent::new(vec![0.0], 5.0)));
        assert!(incumbent.try_install(Incumbent::new(vec![1.0, 1.0], 12.5)));

        assert_eq!(incumbent.best_objective(), 12.5);
        let snapshot = incumbent.snapshot().expect("solution installed");
        assert_eq!(snapshot.values(), &[1.0, 1.0]);
        assert_eq!(incumbent.into_inner().map(|s| s.objective()), Some(12.5));
    }

    #[test]
    fn test_concurrent_installs_keep_the_best() {
        let incumbent = Arc::new(SharedIncumbent::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let incumbent = Arc::clone(&incumbent);
                thread::spawn(move || {
                    for k in 0..100 {
                        let objective = (t * 100 + k) as f64;
                        incumbent.try_install(Incumbent::new(vec![objective], objective));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked");
        }

        assert_eq!(incumbent.best_objective(), 799.0);
        let snapshot = incumbent.snapshot().expect("solution installed");
        assert_eq!(snapshot.values(), &[799.0]);
    }
}
