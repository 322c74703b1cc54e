//! Arc-time velocity planning.
//!
//! A point agent follows a fixed 2D route; moving obstacles occupy the plane
//! over time. Projecting every obstacle onto (arc, time) space turns collision
//! avoidance into a visibility problem: find a monotone-in-time polyline through
//! the free part of that space whose slope never exceeds the speed limit.
//!
//! Layout
//! - `path`: spatial paths, arc-time paths and trajectories (value types).
//! - `obstacle`: static and dynamic obstacles, and the `World` that holds them.
//! - `forbidden`: per-obstacle forbidden regions in arc-time space.
//! - `mesh`: the visibility mesh over arc-time space and its closest-first search.
//! - `plan`: fixed-time and minimum-time pathfinders.
//! - `validate`: independent collision checks for finished trajectories.
//!
//! Conventions
//! - Arc-time coordinates are `geo` coordinates with `x = arc`, `y = seconds since base`.
//! - Spatial vectors are `nalgebra::Vector2<f64>` (`Vec2`).
//! - Infeasibility is `Ok(None)`, never an error.

pub mod api;
pub mod error;
pub mod forbidden;
pub mod geom;
pub mod mesh;
pub mod obstacle;
pub mod path;
pub mod plan;
pub mod scenario;
pub mod time;
pub mod validate;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{PlanError, PlanResult};
pub use geom::{GeomCfg, Vec2};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::error::{PlanError, PlanResult};
    pub use crate::forbidden::{build_forbidden_regions, ForbiddenRegion, ForbiddenRegionBuilder};
    pub use crate::geom::{GeomCfg, Vec2};
    pub use crate::obstacle::{DynamicObstacle, StaticObstacle, World};
    pub use crate::path::{ArcTimePath, ArcTimePoint, SpatialPath, Trajectory};
    pub use crate::plan::{
        plan, plan_fixed_time, plan_minimum_time, FinishCondition, PlanningInput,
    };
    pub use crate::validate::{validate_dynamic, validate_static};
}
