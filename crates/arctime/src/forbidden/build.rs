//! Per-segment-pair region construction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use geo::{
    BoundingRect, Contains, Intersects, LineString, MapCoords, Point, Polygon, Rect, Translate,
};
use nalgebra::Matrix2;
use tracing::{debug, trace};

use super::ForbiddenRegion;
use crate::geom::{
    clip_to_rect, normalize, segment_splits, to_coord, union_all, ArcTimeMap, GeomCfg, Vec2,
};
use crate::obstacle::DynamicObstacle;
use crate::path::SpatialPath;
use crate::time::secs_between;

/// A straight piece of the route.
///
/// `start_arc`/`end_arc` are the route's own cumulative arcs, so adjacent
/// segments meet at the same value.
#[derive(Clone, Copy, Debug)]
struct RouteSegment {
    start: Vec2,
    dir: Vec2,
    start_arc: f64,
    end_arc: f64,
}

impl RouteSegment {
    #[inline]
    fn length(&self) -> f64 {
        self.end_arc - self.start_arc
    }
}

/// A constant-velocity piece of an obstacle trajectory.
#[derive(Clone, Copy, Debug)]
struct ObstacleSegment {
    start: Vec2,
    velocity: Vec2,
    start_time: f64,
    end_time: f64,
}

impl ObstacleSegment {
    #[inline]
    fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

fn route_segments(route: &SpatialPath, cap: f64) -> Vec<RouteSegment> {
    let mut segs: Vec<RouteSegment> = route
        .segments()
        .filter_map(|s| {
            let dir = s.direction()?;
            Some(RouteSegment {
                start: s.start,
                dir,
                start_arc: s.start_arc,
                end_arc: s.end_arc,
            })
        })
        .collect();
    if cap > 0.0 {
        if let Some(first) = segs.first_mut() {
            first.start -= first.dir * cap;
            first.start_arc -= cap;
        }
        if let Some(last) = segs.last_mut() {
            last.end_arc += cap;
        }
    }
    segs
}

fn obstacle_segments(obstacle: &DynamicObstacle, base: DateTime<Utc>) -> Vec<ObstacleSegment> {
    let traj = obstacle.trajectory();
    let shift = secs_between(base, traj.epoch());
    traj.path()
        .points()
        .windows(2)
        .zip(traj.offsets().windows(2))
        .map(|(p, o)| ObstacleSegment {
            start: p[0],
            velocity: (p[1] - p[0]) / (o[1] - o[0]),
            start_time: o[0] + shift,
            end_time: o[1] + shift,
        })
        .collect()
}

/// The arc-time image of the pair: `[start_arc, end_arc] × [start_time, end_time]`.
#[inline]
fn window(rs: &RouteSegment, os: &ObstacleSegment) -> Rect<f64> {
    Rect::new((rs.start_arc, os.start_time), (rs.end_arc, os.end_time))
}

/// Route segment × obstacle segment → zero or more arc-time polygons.
fn pair_region(
    shape: &Polygon<f64>,
    rs: &RouteSegment,
    os: &ObstacleSegment,
    eps_det: f64,
) -> Vec<Polygon<f64>> {
    let placed = shape.translate(os.start.x, os.start.y);
    let basis = Matrix2::from_columns(&[rs.dir, -os.velocity]);
    let st0 = Vec2::new(rs.start_arc, os.start_time);
    match ArcTimeMap::from_basis(basis, rs.start, st0, eps_det) {
        Some(map) => regular_case(&placed, rs, os, &map),
        None => {
            trace!(
                arc = rs.start_arc,
                time = os.start_time,
                "relative motion parallel to route"
            );
            parallel_case(&placed, rs, os)
        }
    }
}

/// Invertible basis: route point `start + a·u` collides at `t0 + b` exactly
/// when `start + a·u − b·v` lies in the placed shape, and the affine map sends
/// that point to `(s0 + a, t0 + b)`. Mapping the shape and clipping it to the
/// pair's window gives the region.
fn regular_case(
    placed: &Polygon<f64>,
    rs: &RouteSegment,
    os: &ObstacleSegment,
    map: &ArcTimeMap,
) -> Vec<Polygon<f64>> {
    let window = window(rs, os);
    let mapped = placed.map_coords(|c| map.apply_coord(c));
    match mapped.bounding_rect() {
        Some(mb) if mb.intersects(&window) => clip_to_rect(&mapped, &window).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Singular basis: obstacle velocity is `k·u`. A route point at offset `σ`
/// from the segment start collides at time `t` when the shape covers
/// `start + (σ − k·(t − t0))·u`, so splitting the route line once gives the
/// occupied `σ` intervals at `t0`; each then shears by `k` per second.
fn parallel_case(
    placed: &Polygon<f64>,
    rs: &RouteSegment,
    os: &ObstacleSegment,
) -> Vec<Polygon<f64>> {
    let k = os.velocity.dot(&rs.dir);
    let shift = k * os.duration();
    let lo = (-shift).min(0.0);
    let hi = rs.length() + (-shift).max(0.0);
    let (a, b) = (rs.start + rs.dir * lo, rs.start + rs.dir * hi);
    let line = LineString::new(vec![to_coord(a), to_coord(b)]);
    let (Some(lb), Some(pb)) = (line.bounding_rect(), placed.bounding_rect()) else {
        return Vec::new();
    };
    if !lb.intersects(&pb) {
        return Vec::new();
    }

    let rings = std::iter::once(placed.exterior()).chain(placed.interiors());
    let ts = segment_splits(rings, to_coord(a), to_coord(b));
    let sigma = |t: f64| lo + (hi - lo) * t;
    // occupied intervals; pieces along the boundary are contact, not overlap
    let mut spans: Vec<(f64, f64)> = Vec::new();
    for w in ts.windows(2) {
        let mid = a + (b - a) * ((w[0] + w[1]) / 2.0);
        if !placed.contains(&Point::new(mid.x, mid.y)) {
            continue;
        }
        let (sa, sb) = (sigma(w[0]), sigma(w[1]));
        match spans.last_mut() {
            Some(last) if last.1 == sa => last.1 = sb,
            _ => spans.push((sa, sb)),
        }
    }

    let (s0, t0, t1) = (rs.start_arc, os.start_time, os.end_time);
    let window = window(rs, os);
    spans
        .into_iter()
        .filter(|(sa, sb)| sb > sa)
        .filter_map(|(sa, sb)| {
            let band = Polygon::new(
                LineString::from(vec![
                    (s0 + sa, t0),
                    (s0 + sb, t0),
                    (s0 + sb + shift, t1),
                    (s0 + sa + shift, t1),
                ]),
                Vec::new(),
            );
            clip_to_rect(&band, &window)
        })
        .collect()
}

fn region_for(
    route: &[RouteSegment],
    obstacle: &Arc<DynamicObstacle>,
    base: DateTime<Utc>,
    eps_det: f64,
) -> ForbiddenRegion {
    let segs = obstacle_segments(obstacle, base);
    let shape = obstacle.shape();
    let parts = route
        .iter()
        .flat_map(|rs| segs.iter().flat_map(move |os| pair_region(shape, rs, os, eps_det)));
    let region = normalize(&union_all(parts));
    ForbiddenRegion::new(region, Arc::clone(obstacle))
}

/// Build regions with the first and last route segments extended by
/// `cfg.cap_extension`.
pub(crate) fn regions_for(
    route: &SpatialPath,
    base: DateTime<Utc>,
    obstacles: &[Arc<DynamicObstacle>],
    cfg: &GeomCfg,
) -> Vec<ForbiddenRegion> {
    let segs = route_segments(route, cfg.cap_extension);
    let eps_det = cfg.eps_det;
    debug!(
        route_segments = segs.len(),
        obstacles = obstacles.len(),
        route_length = route.length(),
        "building forbidden regions"
    );

    #[cfg(not(feature = "parallel"))]
    let regions: Vec<ForbiddenRegion> = obstacles
        .iter()
        .map(|o| region_for(&segs, o, base, eps_det))
        .collect();

    #[cfg(feature = "parallel")]
    let regions: Vec<ForbiddenRegion> = {
        use rayon::prelude::*;
        obstacles
            .par_iter()
            .map(|o| region_for(&segs, o, base, eps_det))
            .collect()
    };

    debug!(
        non_empty = regions.iter().filter(|r| !r.is_empty()).count(),
        "forbidden regions built"
    );
    regions
}
