//! Validated, immutable cache placement instances.

use std::collections::BTreeMap;
use thiserror::Error;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub usize);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(
    /// Position of an item in the instance.
    ItemId
);
typed_id!(
    /// Position of a cache in the instance.
    CacheId
);
typed_id!(
    /// Position of an endpoint in the instance.
    EndpointId
);
typed_id!(
    /// Position of a request in the instance.
    RequestId
);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    #[error("Item {item} has size 0")]
    ZeroSizedItem { item: ItemId },
    #[error("Request {request} refers to unknown item {item}")]
    UnknownItem { request: RequestId, item: ItemId },
    #[error("Request {request} refers to unknown endpoint {endpoint}")]
    UnknownEndpoint { request: RequestId, endpoint: EndpointId },
    #[error("Endpoint {endpoint} is connected to unknown cache {cache}")]
    UnknownCache { endpoint: EndpointId, cache: CacheId },
    #[error("Request {request} has weight 0")]
    ZeroWeight { request: RequestId },
}

/// A content unit to be placed on caches
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub size: u64,
}

/// A capacity-bounded storage node
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cache {
    pub capacity: u64,
}

/// An access point with an origin latency and latencies to reachable caches
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub origin_latency: u64,
    /// Caches absent from the map are unreachable
    pub cache_latencies: BTreeMap<CacheId, u64>,
}

/// Weighted demand for one item from one endpoint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub item: ItemId,
    pub endpoint: EndpointId,
    pub weight: u64,
}

impl Endpoint {
    pub fn new(origin_latency: u64) -> Self {
        Self {
            origin_latency,
            cache_latencies: BTreeMap::new(),
        }
    }

    pub fn with_cache(mut self, cache: CacheId, latency: u64) -> Self {
        self.cache_latencies.insert(cache, latency);
        self
    }

    /// Latency saved per request by serving from `cache` instead of the origin
    pub fn saving(&self, cache: CacheId) -> u64 {
        self.cache_latencies
            .get(&cache)
            .map_or(0, |&latency| self.origin_latency.saturating_sub(latency))
    }
}

/// Items, caches, endpoints and requests whose cross references are known to
/// be valid. Built once, then only read.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemInstance {
    items: Vec<Item>,
    caches: Vec<Cache>,
    endpoints: Vec<Endpoint>,
    requests: Vec<Request>,
}

impl ProblemInstance {
    pub fn new(
        items: Vec<Item>,
        caches: Vec<Cache>,
        endpoints: Vec<Endpoint>,
        requests: Vec<Request>,
    ) -> Result<Self, InstanceError> {
        let instance = Self {
            items,
            caches,
            endpoints,
            requests,
        };
        instance.validate()?;
        Ok(instance)
    }

    /// `count` caches sharing one capacity, as in the dataset format
    pub fn uniform_caches(count: usize, capacity: u64) -> Vec<Cache> {
        vec![Cache { capacity }; count]
    }

    /// Checks every cross reference and the positivity of sizes and weights
    pub fn validate(&self) -> Result<(), InstanceError> {
        if let Some(i) = self.items.iter().position(|item| item.size == 0) {
            return Err(InstanceError::ZeroSizedItem { item: ItemId(i) });
        }

        for (e, endpoint) in self.endpoints.iter().enumerate() {
            if let Some(&cache) = endpoint.cache_latencies.keys().find(|c| c.0 >= self.caches.len()) {
                return Err(InstanceError::UnknownCache {
                    endpoint: EndpointId(e),
                    cache,
                });
            }
        }

        for (r, request) in self.requests.iter().enumerate() {
            let request_id = RequestId(r);
            if request.item.0 >= self.items.len() {
                return Err(InstanceError::UnknownItem {
                    request: request_id,
                    item: request.item,
                });
            }
            if request.endpoint.0 >= self.endpoints.len() {
                return Err(InstanceError::UnknownEndpoint {
                    request: request_id,
                    endpoint: request.endpoint,
                });
            }
            if request.weight == 0 {
                return Err(InstanceError::ZeroWeight { request: request_id });
            }
        }

        Ok(())
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn caches(&self) -> &[Cache] {
        &self.caches
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id.0]
    }

    pub fn cache(&self, id: CacheId) -> &Cache {
        &self.caches[id.0]
    }

    pub fn endpoint(&self, id: EndpointId) -> &Endpoint {
        &self.endpoints[id.0]
    }

    pub fn request(&self, id: RequestId) -> &Request {
        &self.requests[id.0]
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn num_caches(&self) -> usize {
        self.caches.len()
    }

    pub fn num_endpoints(&self) -> usize {
        self.endpoints.len()
    }

    pub fn num_requests(&self) -> usize {
        self.requests.len()
    }

    /// Weighted latency saved when `request` is served from `cache`;
    /// zero when the cache is unreachable or slower than the origin.
    pub fn saving(&self, request: RequestId, cache: CacheId) -> u64 {
        let r = self.request(request);
        r.weight
            .saturating_mul(self.endpoint(r.endpoint).saving(cache))
    }
}
