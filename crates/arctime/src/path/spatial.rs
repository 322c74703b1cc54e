//! Arc-length parameterized polylines.

use geo::{Geometry, LineString, Point};

use crate::error::{PlanError, PlanResult};
use crate::geom::{to_coord, Vec2};

fn cumulative_arcs(points: &[Vec2]) -> Vec<f64> {
    let mut arcs = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    for (k, p) in points.iter().enumerate() {
        if k > 0 {
            acc += (p - points[k - 1]).norm();
        }
        arcs.push(acc);
    }
    arcs
}

/// One consecutive pair of path vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSegment {
    pub start: Vec2,
    pub end: Vec2,
    pub start_arc: f64,
    /// Cumulative arc at `end`, taken from the path's arc table.
    pub end_arc: f64,
    pub length: f64,
}

impl PathSegment {
    /// Unit direction, `None` for a zero-length segment.
    #[inline]
    pub fn direction(&self) -> Option<Vec2> {
        if self.length > 0.0 {
            Some((self.end - self.start) / self.length)
        } else {
            None
        }
    }
}

/// Ordered 2D polyline with 0 or at least 2 vertices.
///
/// Invariant: `arcs[k]` is the cumulative Euclidean length up to vertex `k`;
/// non-negative and non-decreasing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpatialPath {
    points: Vec<Vec2>,
    arcs: Vec<f64>,
}

impl SpatialPath {
    pub fn new(points: Vec<Vec2>) -> PlanResult<Self> {
        if points.len() == 1 {
            return Err(PlanError::invalid("spatial path must have 0 or at least 2 points"));
        }
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(PlanError::invalid("spatial path has non-finite coordinates"));
        }
        let arcs = cumulative_arcs(&points);
        Ok(Self { points, arcs })
    }

    /// Convenience constructor from `(x, y)` tuples.
    pub fn from_xy(points: &[(f64, f64)]) -> PlanResult<Self> {
        Self::new(points.iter().map(|&(x, y)| Vec2::new(x, y)).collect())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    #[inline]
    pub fn arcs(&self) -> &[f64] {
        &self.arcs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total arc length (0 for an empty path).
    #[inline]
    pub fn length(&self) -> f64 {
        self.arcs.last().copied().unwrap_or(0.0)
    }

    pub fn start(&self) -> Option<Vec2> {
        self.points.first().copied()
    }

    pub fn finish(&self) -> Option<Vec2> {
        self.points.last().copied()
    }

    pub fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        self.points
            .windows(2)
            .zip(self.arcs.windows(2))
            .map(|(p, a)| PathSegment {
                start: p[0],
                end: p[1],
                start_arc: a[0],
                end_arc: a[1],
                length: a[1] - a[0],
            })
    }

    /// Location at `arc ∈ [0, length]`; `None` outside that range or on an empty path.
    ///
    /// Vertex arcs return the vertex itself, bit for bit.
    pub fn interpolate(&self, arc: f64) -> Option<Vec2> {
        if self.is_empty() || !(0.0..=self.length()).contains(&arc) {
            return None;
        }
        let idx = self.arcs.partition_point(|&a| a < arc);
        if idx == 0 {
            return Some(self.points[0]);
        }
        if self.arcs[idx] == arc {
            return Some(self.points[idx]);
        }
        let (a0, a1) = (self.arcs[idx - 1], self.arcs[idx]);
        let (p0, p1) = (self.points[idx - 1], self.points[idx]);
        Some(p0 + (p1 - p0) * ((arc - a0) / (a1 - a0)))
    }

    /// Sub-path between fractional arc positions `alpha ≤ beta` in `[0, 1]`.
    pub fn sub_path(&self, alpha: f64, beta: f64) -> PlanResult<SpatialPath> {
        if !(0.0..=1.0).contains(&alpha) || !(0.0..=1.0).contains(&beta) || alpha > beta {
            return Err(PlanError::invalid(format!(
                "sub-path fractions must satisfy 0 <= alpha <= beta <= 1 (got {alpha}, {beta})"
            )));
        }
        let len = self.length();
        self.sub_path_by_arc(alpha * len, beta * len)
    }

    /// Sub-path between arcs `from ≤ to` in `[0, length]`.
    pub fn sub_path_by_arc(&self, from: f64, to: f64) -> PlanResult<SpatialPath> {
        let (Some(a), Some(b)) = (self.interpolate(from), self.interpolate(to)) else {
            return Err(PlanError::invalid(format!(
                "arc range [{from}, {to}] outside path of length {}",
                self.length()
            )));
        };
        if from > to {
            return Err(PlanError::invalid(format!("arc range [{from}, {to}] is reversed")));
        }
        let mut pts = vec![a];
        pts.extend(
            self.points
                .iter()
                .zip(&self.arcs)
                .filter(|&(_, &s)| s > from && s < to)
                .map(|(p, _)| *p),
        );
        pts.push(b);
        SpatialPath::new(pts)
    }

    /// Same polyline with consecutive duplicate vertices removed.
    ///
    /// A path that collapses to one location keeps two copies of it.
    pub fn deduped(&self) -> SpatialPath {
        let mut points = self.points.clone();
        points.dedup();
        if points.len() == 1 {
            points.push(points[0]);
        }
        let arcs = cumulative_arcs(&points);
        SpatialPath { points, arcs }
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(self.points.iter().map(|p| to_coord(*p)).collect())
    }

    /// Geometry swept in the plane: a point when the path never moves,
    /// otherwise the polyline. `None` for an empty path.
    pub fn trace(&self) -> Option<Geometry<f64>> {
        let first = self.start()?;
        if self.length() == 0.0 {
            return Some(Geometry::Point(Point::from(to_coord(first))));
        }
        Some(Geometry::LineString(self.to_line_string()))
    }
}
