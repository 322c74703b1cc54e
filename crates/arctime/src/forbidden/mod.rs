//! Forbidden regions: where in arc-time space a route point collides with a moving obstacle.
//!
//! Purpose
//! - For an agent confined to a fixed route, an obstacle is only relevant
//!   through the set of `(arc, time)` pairs at which the route point at `arc`
//!   lies inside the obstacle at `time`. This module computes that set as a
//!   polygon per obstacle, exactly for piecewise-linear motion.
//!
//! Construction
//! - The route is split into straight segments and each obstacle trajectory
//!   into constant-velocity segments. Every pair is solved in closed form in
//!   the basis `[u, −v]` (route direction, negated obstacle velocity); when that
//!   basis is singular the relative motion runs along the route and the region
//!   is a sheared band built from a 1D clip. See `build.rs`.
//! - Sub-regions are unioned and normalized so equal inputs give equal output.
//!
//! Coordinates: `x = arc`, `y = seconds since base_time`.

mod build;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use geo::{BoundingRect, MultiPolygon, Rect};

use crate::error::{PlanError, PlanResult};
use crate::geom::{clip_to_rect, nudge_down, nudge_up, GeomCfg};
use crate::obstacle::DynamicObstacle;
use crate::path::SpatialPath;

pub(crate) use build::regions_for;

/// The arc-time footprint of one obstacle.
#[derive(Clone, Debug)]
pub struct ForbiddenRegion {
    region: MultiPolygon<f64>,
    obstacle: Arc<DynamicObstacle>,
}

impl ForbiddenRegion {
    pub(crate) fn new(region: MultiPolygon<f64>, obstacle: Arc<DynamicObstacle>) -> Self {
        Self { region, obstacle }
    }

    /// Normalized region (`x = arc`, `y = seconds since base`); may be empty.
    #[inline]
    pub fn region(&self) -> &MultiPolygon<f64> {
        &self.region
    }

    /// The obstacle this region was built from.
    #[inline]
    pub fn obstacle(&self) -> &Arc<DynamicObstacle> {
        &self.obstacle
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.region.0.is_empty()
    }

    /// Parts of the region strictly before and strictly after `time`.
    ///
    /// The line `y = time` belongs to neither half: each side stops one ULP
    /// short of it.
    pub fn split_at(&self, time: f64) -> (MultiPolygon<f64>, MultiPolygon<f64>) {
        let empty = || MultiPolygon::new(Vec::new());
        let Some(bb) = self.region.bounding_rect() else {
            return (empty(), empty());
        };
        let (lo, hi) = (bb.min(), bb.max());
        let below = nudge_down(time);
        let above = nudge_up(time);
        let keep = |mask: Rect<f64>| {
            MultiPolygon::new(
                self.region
                    .iter()
                    .filter_map(|p| clip_to_rect(p, &mask))
                    .collect(),
            )
        };
        let before = if below > lo.y {
            keep(Rect::new((lo.x, lo.y), (hi.x, below.min(hi.y))))
        } else {
            empty()
        };
        let after = if above < hi.y {
            keep(Rect::new((lo.x, above.max(lo.y)), (hi.x, hi.y)))
        } else {
            empty()
        };
        (before, after)
    }
}

/// Collects inputs for region building; `build` consumes it.
///
/// ```
/// use arctime::forbidden::ForbiddenRegionBuilder;
///
/// let err = ForbiddenRegionBuilder::default().build().unwrap_err();
/// assert!(matches!(err, arctime::PlanError::Configuration("route")));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ForbiddenRegionBuilder {
    route: Option<SpatialPath>,
    base_time: Option<DateTime<Utc>>,
    obstacles: Vec<Arc<DynamicObstacle>>,
    cap_extension: f64,
}

impl ForbiddenRegionBuilder {
    pub fn route(mut self, route: SpatialPath) -> Self {
        self.route = Some(route);
        self
    }

    pub fn base_time(mut self, base_time: DateTime<Utc>) -> Self {
        self.base_time = Some(base_time);
        self
    }

    pub fn obstacles(mut self, obstacles: Vec<Arc<DynamicObstacle>>) -> Self {
        self.obstacles = obstacles;
        self
    }

    /// Extend the first and last route segments by `len` beyond the route ends (default 0).
    pub fn cap_extension(mut self, len: f64) -> Self {
        self.cap_extension = len;
        self
    }

    /// One region per obstacle, in input order.
    pub fn build(self) -> PlanResult<Vec<ForbiddenRegion>> {
        let route = self.route.ok_or(PlanError::Configuration("route"))?;
        let base = self.base_time.ok_or(PlanError::Configuration("base_time"))?;
        if !self.cap_extension.is_finite() || self.cap_extension < 0.0 {
            return Err(PlanError::invalid(format!(
                "cap extension must be finite and >= 0 (got {})",
                self.cap_extension
            )));
        }
        let cfg = GeomCfg {
            cap_extension: self.cap_extension,
            ..GeomCfg::default()
        };
        Ok(regions_for(&route, base, &self.obstacles, &cfg))
    }
}

/// Regions for `obstacles` along `route`, times relative to `base_time`.
pub fn build_forbidden_regions(
    route: &SpatialPath,
    base_time: DateTime<Utc>,
    obstacles: &[Arc<DynamicObstacle>],
) -> PlanResult<Vec<ForbiddenRegion>> {
    ForbiddenRegionBuilder::default()
        .route(route.clone())
        .base_time(base_time)
        .obstacles(obstacles.to_vec())
        .build()
}
