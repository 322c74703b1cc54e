//! Velocity pathfinders: when should the agent be where along its route?
//!
//! Purpose
//! - Combine forbidden regions, the visibility mesh and closest-first search
//!   into the two planning modes: arrive at a fixed instant, or arrive as early
//!   as possible inside a window and be able to stay at the destination for a
//!   buffer afterwards.
//!
//! Flow
//! - `PlanningInput` validates the route and speed once.
//! - Regions are built along the route with `base = start_time`, so arc-time
//!   start is `(0, 0)`.
//! - The shortest mesh path is decoded into an `ArcTimePath` and composed
//!   with the route into a `Trajectory`.
//!
//! Infeasibility is `Ok(None)`; invalid inputs are `Err(InvalidArgument)`.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use geo::Coord;
use tracing::debug;

use crate::error::{PlanError, PlanResult};
use crate::forbidden::regions_for;
use crate::geom::GeomCfg;
use crate::mesh::{
    build_fixed_mesh, build_minimum_mesh, shortest_arc_time_path, ArcTimeBounds, BlockedMap,
    FinishWindow,
};
use crate::obstacle::DynamicObstacle;
use crate::path::{SpatialPath, Trajectory};
use crate::time::{duration_secs, secs_between};

/// Route, speed limit and obstacles shared by both planning modes.
#[derive(Clone, Debug)]
pub struct PlanningInput {
    route: SpatialPath,
    max_speed: f64,
    start_time: DateTime<Utc>,
    obstacles: Vec<Arc<DynamicObstacle>>,
    cfg: GeomCfg,
}

impl PlanningInput {
    /// Fails when `max_speed` is not a positive finite number, or the route
    /// has fewer than 2 points or zero length. Consecutive duplicate route
    /// points are dropped.
    pub fn new(route: &SpatialPath, max_speed: f64, start_time: DateTime<Utc>) -> PlanResult<Self> {
        if !max_speed.is_finite() || max_speed <= 0.0 {
            return Err(PlanError::invalid(format!(
                "max speed must be positive and finite (got {max_speed})"
            )));
        }
        if route.len() < 2 {
            return Err(PlanError::invalid("route needs at least 2 points"));
        }
        let route = route.deduped();
        if route.length() <= 0.0 {
            return Err(PlanError::invalid("route has zero length"));
        }
        Ok(Self {
            route,
            max_speed,
            start_time,
            obstacles: Vec::new(),
            cfg: GeomCfg::default(),
        })
    }

    pub fn with_obstacles(mut self, obstacles: Vec<Arc<DynamicObstacle>>) -> Self {
        self.obstacles = obstacles;
        self
    }

    pub fn with_cfg(mut self, cfg: GeomCfg) -> Self {
        self.cfg = cfg;
        self
    }

    #[inline]
    pub fn route(&self) -> &SpatialPath {
        &self.route
    }

    #[inline]
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    #[inline]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[inline]
    pub fn obstacles(&self) -> &[Arc<DynamicObstacle>] {
        &self.obstacles
    }

    fn blocked_map(&self) -> BlockedMap {
        let regions = regions_for(&self.route, self.start_time, &self.obstacles, &self.cfg);
        BlockedMap::new(&regions, self.cfg.eps_contact)
    }

    fn bounds(&self, max_time: f64) -> ArcTimeBounds {
        ArcTimeBounds {
            max_speed: self.max_speed,
            max_arc: self.route.length(),
            min_time: 0.0,
            max_time,
        }
    }
}

/// When the agent has to reach the end of its route.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FinishCondition {
    /// Arrive exactly at `finish`.
    Fixed { finish: DateTime<Utc> },
    /// Arrive as early as possible in `[earliest, latest]`, then be able to
    /// stay put for `buffer`.
    Minimum {
        earliest: DateTime<Utc>,
        latest: DateTime<Utc>,
        buffer: Duration,
    },
}

/// Plan a collision-free trajectory; `Ok(None)` when none exists.
pub fn plan(input: &PlanningInput, finish: &FinishCondition) -> PlanResult<Option<Trajectory>> {
    let start = Coord { x: 0.0, y: 0.0 };
    let mesh = match *finish {
        FinishCondition::Fixed { finish } => {
            if finish < input.start_time {
                return Err(PlanError::invalid(format!(
                    "finish time {finish} precedes start time {}",
                    input.start_time
                )));
            }
            let t = secs_between(input.start_time, finish);
            let bounds = input.bounds(t);
            let goal = Coord {
                x: bounds.max_arc,
                y: t,
            };
            build_fixed_mesh(&bounds, &input.blocked_map(), start, goal)
        }
        FinishCondition::Minimum {
            earliest,
            latest,
            buffer,
        } => {
            if earliest > latest {
                return Err(PlanError::invalid(format!(
                    "earliest finish {earliest} is after latest finish {latest}"
                )));
            }
            if buffer < Duration::zero() {
                return Err(PlanError::invalid("buffer duration must not be negative"));
            }
            let window = FinishWindow {
                earliest: secs_between(input.start_time, earliest),
                latest: secs_between(input.start_time, latest),
                buffer: duration_secs(buffer),
            };
            let bounds = input.bounds(window.latest);
            build_minimum_mesh(&bounds, &input.blocked_map(), start, &window)
        }
    };

    let Some(arc_time) = shortest_arc_time_path(&mesh) else {
        debug!(?finish, "no admissible trajectory");
        return Ok(None);
    };
    debug!(
        vertices = arc_time.len(),
        finish_secs = arc_time.finish_time().unwrap_or_default(),
        "trajectory found"
    );
    Trajectory::compose(&input.route, &arc_time, input.start_time).map(Some)
}

/// Arrive at the end of `route` exactly at `finish_time`.
pub fn plan_fixed_time(
    route: &SpatialPath,
    obstacles: &[Arc<DynamicObstacle>],
    max_speed: f64,
    start_time: DateTime<Utc>,
    finish_time: DateTime<Utc>,
) -> PlanResult<Option<Trajectory>> {
    let input = PlanningInput::new(route, max_speed, start_time)?.with_obstacles(obstacles.to_vec());
    plan(
        &input,
        &FinishCondition::Fixed {
            finish: finish_time,
        },
    )
}

/// Arrive at the end of `route` as early as possible within `[earliest, latest]`,
/// with room to wait there for `buffer` afterwards.
pub fn plan_minimum_time(
    route: &SpatialPath,
    obstacles: &[Arc<DynamicObstacle>],
    max_speed: f64,
    start_time: DateTime<Utc>,
    earliest: DateTime<Utc>,
    latest: DateTime<Utc>,
    buffer: Duration,
) -> PlanResult<Option<Trajectory>> {
    let input = PlanningInput::new(route, max_speed, start_time)?.with_obstacles(obstacles.to_vec());
    plan(
        &input,
        &FinishCondition::Minimum {
            earliest,
            latest,
            buffer,
        },
    )
}

#[cfg(test)]
mod tests;
