//! Property-based tests over small random instances.
//!
//! 1. **Feasibility**: every plan respects capacity, storage and reachability
//! 2. **Consistent objective**: recomputed savings equal the reported objective
//! 3. **Optimality**: with a zero gap target the plan matches exhaustive search
//! 4. **Determinism**: identical inputs give identical plans

#![cfg(test)]

use proptest::prelude::*;

use crate::builder::build_model;
use crate::greedy::greedy_start;
use crate::instance::{CacheId, Endpoint, EndpointId, Item, ItemId, ProblemInstance, Request};
use crate::placement::Placement;
use crate::planner::{PlanOptions, plan};
use cacheplan_solver::SolverSettings;

// =============================================================================
// Strategies
// =============================================================================

/// Instances with up to `max_items` items, `max_caches` caches, three
/// endpoints and six requests. Each endpoint reaches a random subset of caches.
fn instance_strategy(max_items: usize, max_caches: usize) -> impl Strategy<Value = ProblemInstance> {
    (1..=max_items, 1..=max_caches, 1usize..=3)
        .prop_flat_map(|(num_items, num_caches, num_endpoints)| {
            let sizes = prop::collection::vec(1u64..=60, num_items);
            let capacity = 0u64..=100;
            let endpoints = prop::collection::vec(
                (
                    0u64..=1000,
                    prop::collection::vec(prop::option::of(0u64..=1000), num_caches),
                ),
                num_endpoints,
            );
            let requests = prop::collection::vec((0..num_items, 0..num_endpoints, 1u64..=50), 0..=6);
            (sizes, Just(num_caches), capacity, endpoints, requests)
        })
        .prop_map(|(sizes, num_caches, capacity, endpoints, requests)| {
            let items = sizes.into_iter().map(|size| Item { size }).collect();
            let endpoints = endpoints
                .into_iter()
                .map(|(origin, latencies)| {
                    latencies
                        .into_iter()
                        .enumerate()
                        .filter_map(|(c, latency)| latency.map(|l| (c, l)))
                        .fold(Endpoint::new(origin), |e, (c, l)| e.with_cache(CacheId(c), l))
                })
                .collect();
            let requests = requests
                .into_iter()
                .map(|(item, endpoint, weight)| Request {
                    item: ItemId(item),
                    endpoint: EndpointId(endpoint),
                    weight,
                })
                .collect();
            ProblemInstance::new(
                items,
                ProblemInstance::uniform_caches(num_caches, capacity),
                endpoints,
                requests,
            )
            .unwrap()
        })
}

fn exact() -> PlanOptions {
    PlanOptions::default().with_solver(SolverSettings::default().with_gap_tolerance(0.0))
}

/// Best achievable saving over every capacity-feasible placement
fn brute_force(instance: &ProblemInstance) -> u64 {
    let pairs: Vec<(ItemId, CacheId)> = (0..instance.num_items())
        .flat_map(|i| (0..instance.num_caches()).map(move |c| (ItemId(i), CacheId(c))))
        .collect();

    let mut best = 0;
    for mask in 0u32..(1 << pairs.len()) {
        let mut placement = Placement::empty();
        for (bit, &(item, cache)) in pairs.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                placement.store(cache, item);
            }
        }
        if placement.violations(instance).is_empty() {
            best = best.max(placement.best_savings(instance));
        }
    }
    best
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: the plan is feasible and its objective is what it saves.
    #[test]
    fn prop_plan_is_feasible(instance in instance_strategy(4, 3)) {
        let report = plan(&instance, &PlanOptions::default()).unwrap();

        prop_assert!(report.placement.violations(&instance).is_empty());
        prop_assert_eq!(report.placement.savings(&instance) as f64, report.objective);
        let bound = report.best_bound.unwrap();
        prop_assert!(report.objective <= bound + 1e-6 * bound.abs().max(1.0));
        if let Some(gap) = report.gap {
            prop_assert!(gap <= SolverSettings::default().gap_tolerance + 1e-9);
        }
    }

    /// Property: every served request is served from a cache holding its item.
    #[test]
    fn prop_serving_implies_storing(instance in instance_strategy(4, 3)) {
        let report = plan(&instance, &exact().with_warm_start(false)).unwrap();

        for (&request, &cache) in report.placement.assignments() {
            let item = instance.request(request).item;
            prop_assert!(report.placement.stores(cache, item));
        }
    }

    /// Property: with no gap allowed the search finds the exhaustive optimum.
    #[test]
    fn prop_exact_plan_is_optimal(instance in instance_strategy(3, 2)) {
        let expected = brute_force(&instance) as f64;

        let warm = plan(&instance, &exact()).unwrap();
        prop_assert_eq!(warm.objective, expected);

        let cold = plan(&instance, &exact().with_warm_start(false)).unwrap();
        prop_assert_eq!(cold.objective, expected);
    }

    /// Property: the greedy start is always accepted by the model.
    #[test]
    fn prop_greedy_start_is_feasible(instance in instance_strategy(4, 3)) {
        let model = build_model(&instance).unwrap();
        let values = greedy_start(&instance, &model);

        prop_assert!(model.problem().find_violations(&values, 1e-9).is_empty());
        let placement = Placement::from_values(&model, &values);
        prop_assert_eq!(placement.savings(&instance) as f64, model.problem().evaluate(&values));
    }

    /// Property: planning twice gives the same placement and search effort.
    #[test]
    fn prop_plan_is_deterministic(instance in instance_strategy(4, 3)) {
        let first = plan(&instance, &PlanOptions::default()).unwrap();
        let second = plan(&instance, &PlanOptions::default()).unwrap();

        prop_assert_eq!(first.objective, second.objective);
        prop_assert_eq!(&first.placement, &second.placement);
        prop_assert_eq!(first.statistics.nodes_explored, second.statistics.nodes_explored);
    }
}
