pub mod builder;
pub mod greedy;
pub mod instance;
pub mod placement;
pub mod planner;
pub mod reader;

mod properties;

pub use builder::{CacheModel, ModelBuilder, ModelVar, ServeLink, build_model};
pub use greedy::greedy_start;
pub use instance::{Cache, CacheId, Endpoint, EndpointId, InstanceError, Item, ItemId, ProblemInstance, Request, RequestId};
pub use placement::{Placement, PlacementIssue};
pub use planner::{PlanError, PlanOptions, PlanReport, PlanStatus, plan};
pub use reader::{ReadError, parse_instance, read_instance};
