//! Translates a [`ProblemInstance`] into a 0/1 model.
//!
//! Variables:
//! - `store[item, cache]`: the item is placed on the cache
//! - `serve[request, cache]`: the request is answered by the cache
//!
//! Objective: maximize `sum(weight * (origin - latency) * serve)`.
//! Constraints: one capacity row per cache, one "served at most once" row per
//! request and one `serve <= store` link per serve variable.
//!
//! Serve variables exist only for reachable caches with a positive saving;
//! the others can never improve the objective. Store variables exist only for
//! pairs some serve variable links to, for the same reason.

use crate::instance::{CacheId, InstanceError, ItemId, ProblemInstance, RequestId};
use cacheplan_solver::{ConstraintOp, MipProblem, Variable};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Store variables are branched on before serve variables.
pub const STORE_PRIORITY: u32 = 1;
pub const SERVE_PRIORITY: u32 = 0;

/// Role of a model variable
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelVar {
    Store { item: ItemId, cache: CacheId },
    Serve { request: RequestId, cache: CacheId },
}

/// One serve variable together with the store variable it is linked to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeLink {
    pub request: RequestId,
    pub cache: CacheId,
    pub serve: usize,
    pub store: usize,
    pub saving: u64,
}

/// The built model plus the mapping from variable indices back to entities
#[derive(Debug, Clone)]
pub struct CacheModel {
    problem: MipProblem,
    vars: Vec<ModelVar>,
    store_index: HashMap<(ItemId, CacheId), usize>,
    links: Vec<ServeLink>,
}

impl CacheModel {
    pub fn problem(&self) -> &MipProblem {
        &self.problem
    }

    pub fn vars(&self) -> &[ModelVar] {
        &self.vars
    }

    pub fn var(&self, index: usize) -> ModelVar {
        self.vars[index]
    }

    pub fn store_var(&self, item: ItemId, cache: CacheId) -> Option<usize> {
        self.store_index.get(&(item, cache)).copied()
    }

    /// Serve variables in request order, then cache order
    pub fn links(&self) -> &[ServeLink] {
        &self.links
    }

    pub fn num_store_vars(&self) -> usize {
        self.store_index.len()
    }

    pub fn num_serve_vars(&self) -> usize {
        self.links.len()
    }
}

pub struct ModelBuilder<'a> {
    instance: &'a ProblemInstance,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(instance: &'a ProblemInstance) -> Self {
        Self { instance }
    }

    /// Builds the model. Deterministic: variables and rows always come out in
    /// the same order for the same instance.
    pub fn build(&self) -> Result<CacheModel, InstanceError> {
        let instance = self.instance;
        instance.validate()?;

        // Profitable (request, cache) pairs
        let mut candidates = Vec::new();
        for (r, request) in instance.requests().iter().enumerate() {
            let request_id = RequestId(r);
            for &cache in instance.endpoint(request.endpoint).cache_latencies.keys() {
                let saving = instance.saving(request_id, cache);
                if saving > 0 {
                    candidates.push((request_id, cache, saving));
                }
            }
        }

        let store_pairs: BTreeSet<(ItemId, CacheId)> = candidates
            .iter()
            .map(|&(request, cache, _)| (instance.request(request).item, cache))
            .collect();

        let mut problem = MipProblem::new();
        let mut vars = Vec::with_capacity(store_pairs.len() + candidates.len());
        let mut store_index = HashMap::with_capacity(store_pairs.len());

        // Store variables first, in (item, cache) order
        let mut capacity_terms: Vec<Vec<(usize, f64)>> = vec![Vec::new(); instance.num_caches()];
        for &(item, cache) in &store_pairs {
            let var = problem.add_variable(
                Variable::binary(format!("store_{}_{}", item, cache)).with_priority(STORE_PRIORITY),
            );
            vars.push(ModelVar::Store { item, cache });
            store_index.insert((item, cache), var);
            capacity_terms[cache.index()].push((var, instance.item(item).size as f64));
        }

        let mut assign_terms: Vec<Vec<(usize, f64)>> = vec![Vec::new(); instance.num_requests()];
        let mut links = Vec::with_capacity(candidates.len());
        for (request, cache, saving) in candidates {
            let serve = problem.add_variable(
                Variable::binary(format!("serve_{}_{}", request, cache)).with_priority(SERVE_PRIORITY),
            );
            problem.set_objective_coefficient(serve, saving as f64);
            vars.push(ModelVar::Serve { request, cache });
            assign_terms[request.index()].push((serve, 1.0));

            let item = instance.request(request).item;
            let store = store_index[&(item, cache)];
            links.push(ServeLink {
                request,
                cache,
                serve,
                store,
                saving,
            });
        }

        for (c, terms) in capacity_terms.into_iter().enumerate() {
            let capacity = instance.cache(CacheId(c)).capacity as f64;
            problem.add_constraint(format!("capacity_{}", c), terms, ConstraintOp::Le, capacity);
        }

        for (r, terms) in assign_terms.into_iter().enumerate() {
            problem.add_constraint(format!("assign_{}", r), terms, ConstraintOp::Le, 1.0);
        }

        for link in &links {
            problem.add_constraint(
                format!("link_r{}_c{}", link.request, link.cache),
                vec![(link.serve, 1.0), (link.store, -1.0)],
                ConstraintOp::Le,
                0.0,
            );
        }

        debug!(
            store_vars = store_index.len(),
            serve_vars = links.len(),
            constraints = problem.num_constraints(),
            "model built"
        );

        Ok(CacheModel {
            problem,
            vars,
            store_index,
            links,
        })
    }
}

/// Shorthand for `ModelBuilder::new(instance).build()`
pub fn build_model(instance: &ProblemInstance) -> Result<CacheModel, InstanceError> {
    ModelBuilder::new(instance).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Endpoint, EndpointId, Item, Request};

    fn request(item: usize, endpoint: usize, weight: u64) -> Request {
        Request {
            item: ItemId(item),
            endpoint: EndpointId(endpoint),
            weight,
        }
    }

    /// Two items, two caches; endpoint 0 reaches both caches, endpoint 1 only
    /// a cache slower than its origin.
    fn instance() -> ProblemInstance {
        ProblemInstance::new(
            vec![Item { size: 30 }, Item { size: 50 }],
            ProblemInstance::uniform_caches(2, 60),
            vec![
                Endpoint::new(1000)
                    .with_cache(CacheId(0), 100)
                    .with_cache(CacheId(1), 400),
                Endpoint::new(200).with_cache(CacheId(0), 300),
            ],
            vec![request(1, 0, 10), request(0, 0, 4), request(0, 1, 7)],
        )
        .unwrap()
    }

    #[test]
    fn test_variables_and_objective() {
        let model = build_model(&instance()).unwrap();
        let problem = model.problem();

        // Stores: (0,0), (0,1), (1,0), (1,1); serves: r0 x2, r1 x2, r2 none
        assert_eq!(model.num_store_vars(), 4);
        assert_eq!(model.num_serve_vars(), 4);
        assert_eq!(problem.num_variables(), 8);
        assert!(!problem.objective.minimize);

        assert_eq!(model.var(0), ModelVar::Store { item: ItemId(0), cache: CacheId(0) });
        assert_eq!(model.var(3), ModelVar::Store { item: ItemId(1), cache: CacheId(1) });
        assert_eq!(model.var(4), ModelVar::Serve { request: RequestId(0), cache: CacheId(0) });

        let coefficients = &problem.objective.coefficients;
        assert_eq!(&coefficients[..4], &[0.0; 4]);
        assert_eq!(&coefficients[4..], &[9000.0, 6000.0, 3600.0, 2400.0]);

        assert!(problem.variables[..4].iter().all(|v| v.branch_priority == STORE_PRIORITY));
        assert!(problem.variables[4..].iter().all(|v| v.branch_priority == SERVE_PRIORITY));
    }

    #[test]
    fn test_constraints() {
        let model = build_model(&instance()).unwrap();
        let problem = model.problem();

        // 2 capacity rows, 3 assignment rows, 4 links
        assert_eq!(problem.num_constraints(), 9);

        let capacity = &problem.constraints[0];
        assert_eq!(capacity.name, "capacity_0");
        assert_eq!(capacity.op, ConstraintOp::Le);
        assert_eq!(capacity.rhs, 60.0);
        assert_eq!(capacity.terms, vec![(0, 30.0), (2, 50.0)]);

        let assign = &problem.constraints[2];
        assert_eq!(assign.name, "assign_0");
        assert_eq!(assign.terms, vec![(4, 1.0), (5, 1.0)]);
        // Request 2 has no profitable cache
        assert!(problem.constraints[4].terms.is_empty());

        let link = &problem.constraints[5];
        assert_eq!(link.name, "link_r0_c0");
        assert_eq!(link.terms, vec![(4, 1.0), (2, -1.0)]);
        assert_eq!(link.rhs, 0.0);

        let first = model.links()[0];
        assert_eq!(first.store, model.store_var(ItemId(1), CacheId(0)).unwrap());
        assert_eq!(first.saving, 9000);
    }

    #[test]
    fn test_build_is_deterministic() {
        let first = build_model(&instance()).unwrap();
        let second = build_model(&instance()).unwrap();
        assert_eq!(first.vars(), second.vars());
        assert_eq!(first.links(), second.links());
        let names = |m: &CacheModel| m.problem().constraints.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&first), names(&second));
    }

    #[test]
    fn test_empty_instance_builds_empty_model() {
        let instance = ProblemInstance::new(Vec::new(), Vec::new(), Vec::new(), Vec::new()).unwrap();
        let model = build_model(&instance).unwrap();
        assert_eq!(model.problem().num_variables(), 0);
        assert_eq!(model.problem().num_constraints(), 0);
    }
}
