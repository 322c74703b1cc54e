//! Independent collision checks for finished trajectories.
//!
//! Both validators return `true` when the trajectory is collision free.
//! Touching an obstacle boundary is not a collision. Entering the interior is
//! judged with `GeomCfg::eps_contact`, so regions rebuilt on a subdivided path
//! do not flag rounding-level overlaps.

use std::sync::Arc;

use geo::{Geometry, LineString, MultiPolygon};
use tracing::trace;

use crate::forbidden::regions_for;
use crate::geom::{enters_interior, point_enters_interior, to_coord, GeomCfg};
use crate::obstacle::{DynamicObstacle, StaticObstacle};
use crate::path::Trajectory;

fn trace_enters(region: &MultiPolygon<f64>, trace: &Geometry<f64>, eps: f64) -> bool {
    match trace {
        Geometry::Point(p) => point_enters_interior(region, *p, eps),
        Geometry::LineString(ls) => enters_interior(region, ls, eps),
        _ => false,
    }
}

/// Does the planar trace of `trajectory` stay out of every static obstacle?
pub fn validate_static(trajectory: &Trajectory, obstacles: &[StaticObstacle]) -> bool {
    validate_static_with(trajectory, obstacles, &GeomCfg::default())
}

pub fn validate_static_with(
    trajectory: &Trajectory,
    obstacles: &[StaticObstacle],
    cfg: &GeomCfg,
) -> bool {
    let Some(trace) = trajectory.trace() else {
        return true;
    };
    obstacles.iter().all(|o| {
        let region = MultiPolygon::new(vec![o.shape().clone()]);
        !trace_enters(&region, &trace, cfg.eps_contact)
    })
}

/// Does `trajectory` avoid every moving obstacle at every instant?
///
/// Regions are rebuilt along the trajectory's own path with its epoch as
/// base, and the trajectory's arc-time trace is tested against them.
pub fn validate_dynamic(trajectory: &Trajectory, obstacles: &[Arc<DynamicObstacle>]) -> bool {
    validate_dynamic_with(trajectory, obstacles, &GeomCfg::default())
}

pub fn validate_dynamic_with(
    trajectory: &Trajectory,
    obstacles: &[Arc<DynamicObstacle>],
    cfg: &GeomCfg,
) -> bool {
    if trajectory.is_empty() || obstacles.is_empty() {
        return true;
    }
    let path = trajectory.path().deduped();
    if path.length() == 0.0 {
        return stationary_clear(trajectory, obstacles, cfg);
    }
    let epoch = trajectory.epoch();
    let regions = regions_for(&path, epoch, obstacles, cfg);
    let trace = trajectory.to_arc_time(epoch).to_line_string();
    regions.iter().enumerate().all(|(k, r)| {
        let hit = enters_interior(r.region(), &trace, cfg.eps_contact);
        if hit {
            trace!(obstacle = k, "arc-time trace enters forbidden region");
        }
        !hit
    })
}

/// An agent parked at one point: seen from that point, each obstacle's
/// reference motion over the waiting window must stay out of its shape.
fn stationary_clear(
    trajectory: &Trajectory,
    obstacles: &[Arc<DynamicObstacle>],
    cfg: &GeomCfg,
) -> bool {
    let (Some(at), Some(from), Some(to)) = (
        trajectory.path().start(),
        trajectory.start_time(),
        trajectory.finish_time(),
    ) else {
        return true;
    };
    obstacles.iter().all(|o| {
        let Some(window) = o.trajectory().sub_trajectory(from, to) else {
            return true;
        };
        let relative =
            LineString::new(window.path().points().iter().map(|p| to_coord(at - p)).collect());
        let shape = MultiPolygon::new(vec![o.shape().clone()]);
        !enters_interior(&shape, &relative, cfg.eps_contact)
    })
}
