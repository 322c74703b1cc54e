use std::cmp::Ordering;
use std::collections::HashSet;

use geo::line_intersection::line_intersection;
use geo::orient::Direction;
#[allow(deprecated)]
use geo::EuclideanDistance;
use geo::{
    Area, BooleanOps, BoundingRect, Contains, Coord, Intersects, Line, LineIntersection,
    LineString, MultiPolygon, Orient, Point, Polygon, Rect, Relate,
};

use super::types::Vec2;
use crate::error::{PlanError, PlanResult};

#[inline]
pub fn to_coord(v: Vec2) -> Coord<f64> {
    Coord { x: v.x, y: v.y }
}

#[inline]
pub fn from_coord(c: Coord<f64>) -> Vec2 {
    Vec2::new(c.x, c.y)
}

/// Smallest representable value strictly greater than `x`.
///
/// NaN and +∞ are returned unchanged; both zeros step to the smallest
/// positive subnormal.
pub fn nudge_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

/// Largest representable value strictly less than `x`.
#[inline]
pub fn nudge_down(x: f64) -> f64 {
    -nudge_up(-x)
}

#[inline]
fn cmp_coord(a: &Coord<f64>, b: &Coord<f64>) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// Open ring coordinates (closing duplicate dropped).
fn open_ring(ring: &LineString<f64>) -> &[Coord<f64>] {
    let pts = &ring.0;
    if pts.len() > 1 && pts.first() == pts.last() {
        &pts[..pts.len() - 1]
    } else {
        pts
    }
}

fn canonical_ring(ring: &LineString<f64>) -> LineString<f64> {
    let mut pts = open_ring(ring).to_vec();
    if pts.is_empty() {
        return ring.clone();
    }
    let start = (0..pts.len())
        .min_by(|&a, &b| cmp_coord(&pts[a], &pts[b]))
        .unwrap_or(0);
    pts.rotate_left(start);
    pts.push(pts[0]);
    LineString::new(pts)
}

/// Canonical form for deterministic comparison: exteriors counter-clockwise,
/// holes clockwise, every ring starting at its smallest coordinate, holes and
/// polygons sorted by that coordinate.
pub fn normalize(mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    let oriented = mp.orient(Direction::Default);
    let mut polys: Vec<Polygon<f64>> = oriented
        .into_iter()
        .map(|p| {
            let exterior = canonical_ring(p.exterior());
            let mut holes: Vec<LineString<f64>> =
                p.interiors().iter().map(canonical_ring).collect();
            holes.sort_by(|a, b| cmp_coord(&a.0[0], &b.0[0]));
            Polygon::new(exterior, holes)
        })
        .collect();
    polys.sort_by(|a, b| match (a.exterior().0.first(), b.exterior().0.first()) {
        (Some(ca), Some(cb)) => cmp_coord(ca, cb),
        _ => Ordering::Equal,
    });
    MultiPolygon::new(polys)
}

/// Union of all polygons with positive area.
///
/// A single polygon is returned as is; `geo`'s overlay snaps its output to a
/// grid, so it only runs when there is something to merge.
pub fn union_all<I>(polys: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = Polygon<f64>>,
{
    polys
        .into_iter()
        .filter(|p| p.unsigned_area() > 0.0)
        .fold(MultiPolygon::new(Vec::new()), |acc, p| {
            if acc.0.is_empty() {
                MultiPolygon::new(vec![p])
            } else {
                acc.union(&p)
            }
        })
}

#[derive(Clone, Copy, Debug)]
enum Side {
    Left(f64),
    Right(f64),
    Bottom(f64),
    Top(f64),
}

impl Side {
    #[inline]
    fn inside(self, c: Coord<f64>) -> bool {
        match self {
            Side::Left(x) => c.x >= x,
            Side::Right(x) => c.x <= x,
            Side::Bottom(y) => c.y >= y,
            Side::Top(y) => c.y <= y,
        }
    }

    /// Crossing of `a → b` with this side; the clipped coordinate is exact.
    #[inline]
    fn cut(self, a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
        match self {
            Side::Left(x) | Side::Right(x) => Coord {
                x,
                y: a.y + (b.y - a.y) * ((x - a.x) / (b.x - a.x)),
            },
            Side::Bottom(y) | Side::Top(y) => Coord {
                x: a.x + (b.x - a.x) * ((y - a.y) / (b.y - a.y)),
                y,
            },
        }
    }

    fn clip(self, pts: &[Coord<f64>]) -> Vec<Coord<f64>> {
        let n = pts.len();
        let mut out = Vec::with_capacity(n + 2);
        for (k, &cur) in pts.iter().enumerate() {
            let prev = pts[(k + n - 1) % n];
            match (self.inside(prev), self.inside(cur)) {
                (true, true) => out.push(cur),
                (true, false) => out.push(self.cut(prev, cur)),
                (false, true) => {
                    out.push(self.cut(prev, cur));
                    out.push(cur);
                }
                (false, false) => {}
            }
        }
        out
    }
}

/// Pull `v` onto `edge` when it is within a few ULPs of it.
#[inline]
fn snap(v: f64, edge: f64) -> f64 {
    if (v - edge).abs() <= 1e-12 * (1.0 + edge.abs()) {
        edge
    } else {
        v
    }
}

fn clip_ring(ring: &LineString<f64>, rect: &Rect<f64>) -> Option<LineString<f64>> {
    let (lo, hi) = (rect.min(), rect.max());
    let mut pts: Vec<Coord<f64>> = open_ring(ring)
        .iter()
        .map(|c| Coord {
            x: snap(snap(c.x, lo.x), hi.x),
            y: snap(snap(c.y, lo.y), hi.y),
        })
        .collect();
    for side in [
        Side::Left(lo.x),
        Side::Right(hi.x),
        Side::Bottom(lo.y),
        Side::Top(hi.y),
    ] {
        if pts.is_empty() {
            return None;
        }
        pts = side.clip(&pts);
    }
    pts.dedup();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    let ring = LineString::new(pts);
    (ring.0.len() >= 3 && Polygon::new(ring.clone(), Vec::new()).unsigned_area() > 0.0)
        .then_some(ring)
}

/// Part of `poly` inside `rect` (Sutherland–Hodgman per ring).
///
/// Vertices on or within rounding of a side of `rect` land exactly on it, so
/// pieces clipped to adjacent windows share their common edge bit for bit.
/// `None` when nothing of positive area is left.
pub fn clip_to_rect(poly: &Polygon<f64>, rect: &Rect<f64>) -> Option<Polygon<f64>> {
    let exterior = clip_ring(poly.exterior(), rect)?;
    let holes = poly
        .interiors()
        .iter()
        .filter_map(|h| clip_ring(h, rect))
        .collect();
    Some(Polygon::new(exterior, holes))
}

#[inline]
fn rings(poly: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    std::iter::once(poly.exterior()).chain(poly.interiors())
}

/// Sorted parameters `0 = t₀ < … < tₖ = 1` at which `a → b` meets an edge of
/// `rings`. Between two consecutive parameters the segment is entirely inside,
/// outside or on the boundary.
pub fn segment_splits<'a, I>(rings: I, a: Coord<f64>, b: Coord<f64>) -> Vec<f64>
where
    I: IntoIterator<Item = &'a LineString<f64>>,
{
    let mut ts = vec![0.0, 1.0];
    let d = b - a;
    let len2 = d.x * d.x + d.y * d.y;
    if len2 == 0.0 {
        return ts;
    }
    let seg = Line::new(a, b);
    let param = |c: Coord<f64>| ((c.x - a.x) * d.x + (c.y - a.y) * d.y) / len2;
    for ring in rings {
        for edge in ring.lines() {
            match line_intersection(seg, edge) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    ts.push(param(intersection));
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    ts.push(param(intersection.start));
                    ts.push(param(intersection.end));
                }
                None => {}
            }
        }
    }
    ts.retain(|t| (0.0..=1.0).contains(t));
    ts.sort_by(f64::total_cmp);
    ts.dedup();
    ts
}

/// Reject shapes that are not simple polygons with positive area.
pub fn validate_shape(shape: &Polygon<f64>) -> PlanResult<()> {
    if !shape.interiors().is_empty() {
        return Err(PlanError::invalid("obstacle shape must not have holes"));
    }
    let pts = open_ring(shape.exterior());
    if pts.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(PlanError::invalid("obstacle shape has non-finite coordinates"));
    }
    if pts.len() < 3 {
        return Err(PlanError::invalid("obstacle shape needs at least 3 vertices"));
    }
    if shape.unsigned_area() <= 0.0 {
        return Err(PlanError::invalid("obstacle shape has zero area"));
    }
    let n = pts.len();
    let edge = |i: usize| Line::new(pts[i], pts[(i + 1) % n]);
    for i in 0..n {
        let a = edge(i);
        if a.start == a.end {
            return Err(PlanError::invalid("obstacle shape repeats a vertex"));
        }
        for j in (i + 2)..n {
            // edges (0, n-1) share the closing vertex
            if i == 0 && j == n - 1 {
                continue;
            }
            if a.intersects(&edge(j)) {
                return Err(PlanError::invalid(format!(
                    "obstacle shape is self-intersecting (edges {i} and {j})"
                )));
            }
        }
    }
    Ok(())
}

/// Distinct ring coordinates of `mp`, in ring order.
pub fn boundary_coords(mp: &MultiPolygon<f64>) -> Vec<Coord<f64>> {
    let mut seen: HashSet<(u64, u64)> = HashSet::new();
    let mut out = Vec::new();
    for poly in mp {
        for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
            for c in open_ring(ring) {
                if seen.insert((c.x.to_bits(), c.y.to_bits())) {
                    out.push(*c);
                }
            }
        }
    }
    out
}

/// Exact test: does the open segment `a → b` meet the interior of `poly`?
pub fn crosses_interior(poly: &Polygon<f64>, a: Coord<f64>, b: Coord<f64>) -> bool {
    if a == b {
        return poly.contains(&Point::from(a));
    }
    let seg = LineString::new(vec![a, b]);
    seg.relate(poly).matches("T********").unwrap_or(false)
}

/// Distance from `p` to the boundary of `region` when `p` is interior, else 0.
#[allow(deprecated)]
pub fn interior_depth(region: &MultiPolygon<f64>, p: Point<f64>) -> f64 {
    if !region.contains(&p) {
        return 0.0;
    }
    region
        .iter()
        .flat_map(rings)
        .map(|ring| p.euclidean_distance(ring))
        .fold(f64::INFINITY, f64::min)
}

/// Tolerant test: is `p` inside `region` deeper than `eps`?
#[inline]
pub fn point_enters_interior(region: &MultiPolygon<f64>, p: Point<f64>, eps: f64) -> bool {
    interior_depth(region, p) > eps
}

/// Tolerant test: does `trace` run through the interior of `region` deeper than `eps`?
///
/// Each trace segment is split where it meets the region boundary; every
/// piece is then either outside, on the boundary or across the interior, so
/// probing piece midpoints suffices.
pub fn enters_interior(region: &MultiPolygon<f64>, trace: &LineString<f64>, eps: f64) -> bool {
    let mut coords = trace.0.clone();
    coords.dedup();
    match coords.len() {
        0 => return false,
        1 => return point_enters_interior(region, Point::from(coords[0]), eps),
        _ => {}
    }
    let trace = LineString::new(coords);
    let (Some(rb), Some(tb)) = (region.bounding_rect(), trace.bounding_rect()) else {
        return false;
    };
    if !rb.intersects(&tb) {
        return false;
    }
    let enters = trace.lines().any(|line| {
        let ts = segment_splits(region.iter().flat_map(rings), line.start, line.end);
        ts.windows(2).any(|w| {
            let mid = line.start + (line.end - line.start) * ((w[0] + w[1]) / 2.0);
            point_enters_interior(region, Point::from(mid), eps)
        })
    });
    enters
}
