//! Savings-per-size greedy placement used as the search's first incumbent.
//!
//! Repeatedly stores the (item, cache) pair with the best marginal saving per
//! unit of size that still fits, until nothing fits or nothing helps. Each
//! request is then served by its best cache holding the item. The result is
//! always feasible for the model it was computed on.

use crate::builder::CacheModel;
use crate::instance::ProblemInstance;
use tracing::debug;

/// Returns model variable values for the greedy placement.
pub fn greedy_start(instance: &ProblemInstance, model: &CacheModel) -> Vec<f64> {
    let num_vars = model.problem().num_variables();
    let links = model.links();

    // Link indices grouped by store variable
    let mut by_store: Vec<Vec<usize>> = vec![Vec::new(); num_vars];
    for (l, link) in links.iter().enumerate() {
        by_store[link.store].push(l);
    }

    let mut remaining: Vec<u64> = instance.caches().iter().map(|c| c.capacity).collect();
    let mut stored = vec![false; num_vars];
    // Saving currently achieved per request
    let mut achieved = vec![0u64; instance.num_requests()];

    loop {
        let mut best: Option<(usize, f64)> = None;

        for (store, store_links) in by_store.iter().enumerate() {
            if stored[store] || store_links.is_empty() {
                continue;
            }
            let first = links[store_links[0]];
            let item = instance.request(first.request).item;
            let size = instance.item(item).size;
            if size > remaining[first.cache.index()] {
                continue;
            }

            let gain: u64 = store_links
                .iter()
                .map(|&l| links[l].saving.saturating_sub(achieved[links[l].request.index()]))
                .sum();
            if gain == 0 {
                continue;
            }

            let score = gain as f64 / size as f64;
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((store, score));
            }
        }

        let Some((store, _)) = best else {
            break;
        };

        stored[store] = true;
        let first = links[by_store[store][0]];
        let size = instance.item(instance.request(first.request).item).size;
        remaining[first.cache.index()] -= size;
        for &l in &by_store[store] {
            let link = links[l];
            let slot = &mut achieved[link.request.index()];
            *slot = (*slot).max(link.saving);
        }
    }

    let mut values = vec![0.0; num_vars];
    for (store, &on) in stored.iter().enumerate() {
        if on {
            values[store] = 1.0;
        }
    }

    // Links are ordered by request, then cache: keep the first best per request
    let mut chosen: Vec<Option<usize>> = vec![None; instance.num_requests()];
    for (l, link) in links.iter().enumerate() {
        if !stored[link.store] {
            continue;
        }
        let slot = &mut chosen[link.request.index()];
        if slot.is_none_or(|c| link.saving > links[c].saving) {
            *slot = Some(l);
        }
    }
    for l in chosen.into_iter().flatten() {
        values[links[l].serve] = 1.0;
    }

    debug!(
        stored = stored.iter().filter(|&&s| s).count(),
        objective = model.problem().evaluate(&values),
        "greedy placement"
    );

    values
}
