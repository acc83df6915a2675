//! Projection of a model solution back onto caches, items and requests.

use crate::builder::{CacheModel, ModelVar};
use crate::instance::{CacheId, ItemId, ProblemInstance, RequestId};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Values above this count as a binary set to 1.
const SELECTED: f64 = 0.5;

/// Items stored per cache and the cache each served request is answered by.
/// Caches without items are absent.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    caches: BTreeMap<CacheId, BTreeSet<ItemId>>,
    assignments: BTreeMap<RequestId, CacheId>,
}

/// A way in which a placement breaks the rules of its instance
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementIssue {
    #[error("Cache {cache} holds {used} units but has capacity {capacity}")]
    OverCapacity { cache: CacheId, used: u64, capacity: u64 },
    #[error("Request {request} is served by cache {cache}, which does not store its item")]
    UnstoredItem { request: RequestId, cache: CacheId },
    #[error("Request {request} is served by cache {cache}, which its endpoint cannot reach")]
    Unreachable { request: RequestId, cache: CacheId },
    #[error("Cache {cache} is not part of the instance")]
    UnknownCache { cache: CacheId },
}

impl Placement {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reads selected store and serve variables out of `values`.
    pub fn from_values(model: &CacheModel, values: &[f64]) -> Self {
        let mut placement = Self::empty();
        for (var, &value) in model.vars().iter().zip(values) {
            if value <= SELECTED {
                continue;
            }
            match *var {
                ModelVar::Store { item, cache } => placement.store(cache, item),
                ModelVar::Serve { request, cache } => placement.assign(request, cache),
            }
        }
        placement
    }

    pub fn store(&mut self, cache: CacheId, item: ItemId) {
        self.caches.entry(cache).or_default().insert(item);
    }

    pub fn assign(&mut self, request: RequestId, cache: CacheId) {
        self.assignments.insert(request, cache);
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    /// Number of caches holding at least one item
    pub fn num_used_caches(&self) -> usize {
        self.caches.len()
    }

    /// Used caches in ascending id order with their items
    pub fn caches(&self) -> impl Iterator<Item = (CacheId, &BTreeSet<ItemId>)> {
        self.caches.iter().map(|(&cache, items)| (cache, items))
    }

    pub fn items_on(&self, cache: CacheId) -> Option<&BTreeSet<ItemId>> {
        self.caches.get(&cache)
    }

    pub fn stores(&self, cache: CacheId, item: ItemId) -> bool {
        self.caches.get(&cache).is_some_and(|items| items.contains(&item))
    }

    pub fn assignments(&self) -> &BTreeMap<RequestId, CacheId> {
        &self.assignments
    }

    pub fn server_of(&self, request: RequestId) -> Option<CacheId> {
        self.assignments.get(&request).copied()
    }

    /// Total saving of the recorded assignments. Equals the model objective of
    /// the values the placement was read from.
    pub fn savings(&self, instance: &ProblemInstance) -> u64 {
        self.assignments
            .iter()
            .map(|(&request, &cache)| instance.saving(request, cache))
            .sum()
    }

    /// Total saving when every request uses its best cache holding the item,
    /// ignoring the recorded assignments.
    pub fn best_savings(&self, instance: &ProblemInstance) -> u64 {
        instance
            .requests()
            .iter()
            .enumerate()
            .map(|(r, request)| {
                instance
                    .endpoint(request.endpoint)
                    .cache_latencies
                    .keys()
                    .filter(|&&cache| self.stores(cache, request.item))
                    .map(|&cache| instance.saving(RequestId(r), cache))
                    .max()
                    .unwrap_or(0)
            })
            .sum()
    }

    /// Every capacity, storage and reachability rule the placement breaks.
    pub fn violations(&self, instance: &ProblemInstance) -> Vec<PlacementIssue> {
        let mut issues = Vec::new();

        for (&cache, items) in &self.caches {
            if cache.index() >= instance.num_caches() {
                issues.push(PlacementIssue::UnknownCache { cache });
                continue;
            }
            let used: u64 = items.iter().map(|&item| instance.item(item).size).sum();
            let capacity = instance.cache(cache).capacity;
            if used > capacity {
                issues.push(PlacementIssue::OverCapacity { cache, used, capacity });
            }
        }

        for (&request, &cache) in &self.assignments {
            let r = instance.request(request);
            if !instance.endpoint(r.endpoint).cache_latencies.contains_key(&cache) {
                issues.push(PlacementIssue::Unreachable { request, cache });
            } else if !self.stores(cache, r.item) {
                issues.push(PlacementIssue::UnstoredItem { request, cache });
            }
        }

        issues
    }

    /// Writes the submission text to `path`.
    pub fn write_submission(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_string())?;
        info!(path = %path.display(), caches = self.num_used_caches(), "submission written");
        Ok(())
    }
}

/// Submission format: the number of used caches, then one line per cache
/// with its id followed by its item ids.
impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.caches.len())?;
        for (cache, items) in &self.caches {
            write!(f, "{}", cache)?;
            for item in items {
                write!(f, " {}", item)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
