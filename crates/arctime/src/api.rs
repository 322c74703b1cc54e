//! Curated API surface.
//!
//! One flat place for callers that want the whole toolkit without walking
//! the module tree. `prelude` covers the common planning path; this module
//! also exposes the lower-level pieces (mesh, geometry helpers, scenarios).

// Value types
pub use crate::path::{ArcTimePath, ArcTimePoint, PathSegment, SpatialPath, Trajectory};
// Obstacles
pub use crate::obstacle::{DynamicObstacle, StaticObstacle, World};
// Forbidden regions
pub use crate::forbidden::{build_forbidden_regions, ForbiddenRegion, ForbiddenRegionBuilder};
// Mesh and search
pub use crate::mesh::{
    build_fixed_mesh, build_minimum_mesh, closest_first, finish_candidate, shortest_arc_time_path,
    ArcTimeBounds, BlockedMap, Edge, FinishWindow, Mesh,
};
// Planning
pub use crate::plan::{plan, plan_fixed_time, plan_minimum_time, FinishCondition, PlanningInput};
// Validation
pub use crate::validate::{
    validate_dynamic, validate_dynamic_with, validate_static, validate_static_with,
};
// Geometry and time helpers
pub use crate::geom::{nudge_down, nudge_up, normalize, ArcTimeMap, GeomCfg, Vec2};
pub use crate::time::{at_offset, duration_secs, secs_between};
// Seeded scenarios
pub use crate::scenario::{
    crossing_obstacles, route_scenario, square, straight_route, CrossingCfg, RouteCfg,
};
// Errors
pub use crate::error::{PlanError, PlanResult};
