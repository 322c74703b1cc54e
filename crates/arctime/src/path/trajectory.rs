//! Time-stamped spatial paths.

use chrono::{DateTime, Utc};
use geo::Geometry;

use super::{ArcTimePath, ArcTimePoint, SpatialPath};
use crate::error::{PlanError, PlanResult};
use crate::geom::Vec2;
use crate::time::{at_offset, secs_between};

/// Seconds within which a query time counts as a trajectory endpoint.
const END_SNAP: f64 = 1e-9;

/// A spatial path with one timestamp per vertex.
///
/// Timestamps are stored as an absolute `epoch` plus `f64` second offsets, so
/// converting to arc-time against the same epoch is exact. Offsets strictly
/// increase.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    path: SpatialPath,
    epoch: DateTime<Utc>,
    offsets: Vec<f64>,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::empty()
    }
}

impl Trajectory {
    pub fn new(path: SpatialPath, epoch: DateTime<Utc>, offsets: Vec<f64>) -> PlanResult<Self> {
        if path.len() != offsets.len() {
            return Err(PlanError::invalid(format!(
                "trajectory has {} points but {} timestamps",
                path.len(),
                offsets.len()
            )));
        }
        if offsets.iter().any(|o| !o.is_finite()) {
            return Err(PlanError::invalid("trajectory has non-finite timestamps"));
        }
        if let Some(w) = offsets.windows(2).find(|w| w[1] <= w[0]) {
            return Err(PlanError::invalid(format!(
                "trajectory timestamps must strictly increase ({} then {})",
                w[0], w[1]
            )));
        }
        Ok(Self {
            path,
            epoch,
            offsets,
        })
    }

    /// Build from absolute timestamps; the first one becomes the epoch.
    pub fn from_timestamps(path: SpatialPath, times: &[DateTime<Utc>]) -> PlanResult<Self> {
        let epoch = times.first().copied().unwrap_or_default();
        let offsets = times.iter().map(|t| secs_between(epoch, *t)).collect();
        Self::new(path, epoch, offsets)
    }

    pub fn empty() -> Self {
        Self {
            path: SpatialPath::empty(),
            epoch: DateTime::<Utc>::default(),
            offsets: Vec::new(),
        }
    }

    /// Realize `arc_time` (times relative to `base`) along `route`.
    ///
    /// Route vertices crossed between two arc-time vertices are inserted with
    /// linearly interpolated timestamps so the result follows every corner.
    pub fn compose(
        route: &SpatialPath,
        arc_time: &ArcTimePath,
        base: DateTime<Utc>,
    ) -> PlanResult<Self> {
        let pts = arc_time.points();
        let Some(first) = pts.first() else {
            return Ok(Self::empty());
        };
        let locate = |arc: f64| {
            route.interpolate(arc).ok_or_else(|| {
                PlanError::invalid(format!(
                    "arc {arc} outside route of length {}",
                    route.length()
                ))
            })
        };
        let mut points = vec![locate(first.arc)?];
        let mut offsets = vec![first.time];
        for w in pts.windows(2) {
            let (p, q) = (w[0], w[1]);
            let between = |s: f64| s > p.arc.min(q.arc) && s < p.arc.max(q.arc);
            let mut corners: Vec<(Vec2, f64)> = route
                .points()
                .iter()
                .zip(route.arcs())
                .filter(|&(_, &s)| between(s))
                .map(|(pt, &s)| (*pt, s))
                .collect();
            if q.arc < p.arc {
                corners.reverse();
            }
            for (pt, s) in corners {
                // a corner that rounds onto a neighbouring timestamp is dropped
                let o = p.time + (q.time - p.time) * ((s - p.arc) / (q.arc - p.arc));
                if o > p.time && o < q.time {
                    points.push(pt);
                    offsets.push(o);
                }
            }
            points.push(locate(q.arc)?);
            offsets.push(q.time);
        }
        Self::new(SpatialPath::new(points)?, base, offsets)
    }

    #[inline]
    pub fn path(&self) -> &SpatialPath {
        &self.path
    }

    #[inline]
    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// Seconds since `epoch`, one per vertex.
    #[inline]
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.offsets.first().map(|&o| at_offset(self.epoch, o))
    }

    pub fn finish_time(&self) -> Option<DateTime<Utc>> {
        self.offsets.last().map(|&o| at_offset(self.epoch, o))
    }

    pub fn duration_secs(&self) -> f64 {
        match (self.offsets.first(), self.offsets.last()) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }

    /// Absolute timestamp of every vertex.
    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.offsets
            .iter()
            .map(|&o| at_offset(self.epoch, o))
            .collect()
    }

    /// Location at `offset` seconds after the epoch, `None` outside the trajectory.
    pub fn location_at_offset(&self, offset: f64) -> Option<Vec2> {
        let (first, last) = (*self.offsets.first()?, *self.offsets.last()?);
        if offset < first || offset > last {
            return None;
        }
        let idx = self.offsets.partition_point(|&o| o < offset);
        let pts = self.path.points();
        if idx == 0 || self.offsets[idx] == offset {
            return Some(pts[idx]);
        }
        let (o0, o1) = (self.offsets[idx - 1], self.offsets[idx]);
        let (p0, p1) = (pts[idx - 1], pts[idx]);
        Some(p0 + (p1 - p0) * ((offset - o0) / (o1 - o0)))
    }

    /// Location at `time`. Times within a nanosecond of either end snap to it,
    /// which absorbs the rounding of `DateTime` arithmetic.
    pub fn interpolate_location(&self, time: DateTime<Utc>) -> Option<Vec2> {
        let (first, last) = (*self.offsets.first()?, *self.offsets.last()?);
        let offset = secs_between(self.epoch, time);
        let offset = if (offset - first).abs() <= END_SNAP {
            first
        } else if (offset - last).abs() <= END_SNAP {
            last
        } else {
            offset
        };
        self.location_at_offset(offset)
    }

    /// The part of the trajectory inside `[from, to]`.
    ///
    /// `None` when the overlap with the trajectory has zero length.
    pub fn sub_trajectory(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Option<Trajectory> {
        let (first, last) = (*self.offsets.first()?, *self.offsets.last()?);
        let a = secs_between(self.epoch, from).max(first);
        let b = secs_between(self.epoch, to).min(last);
        if a >= b {
            return None;
        }
        let mut points = vec![self.location_at_offset(a)?];
        let mut offsets = vec![a];
        for (p, &o) in self.path.points().iter().zip(&self.offsets) {
            if o > a && o < b {
                points.push(*p);
                offsets.push(o);
            }
        }
        points.push(self.location_at_offset(b)?);
        offsets.push(b);
        let path = SpatialPath::new(points).ok()?;
        Some(Trajectory {
            path,
            epoch: self.epoch,
            offsets,
        })
    }

    /// Append `other`, which must start no earlier than `self` finishes.
    ///
    /// When `other` starts exactly where and when `self` finishes the shared
    /// vertex is kept once. The result keeps `self`'s epoch.
    pub fn concat(&self, other: &Trajectory) -> PlanResult<Trajectory> {
        if other.is_empty() {
            return Ok(self.clone());
        }
        if self.is_empty() {
            return Ok(other.clone());
        }
        let shift = secs_between(self.epoch, other.epoch);
        let mut points = self.path.points().to_vec();
        let mut offsets = self.offsets.clone();
        let last_offset = offsets[offsets.len() - 1];
        let last_point = points[points.len() - 1];
        for (k, (p, &o)) in other.path.points().iter().zip(&other.offsets).enumerate() {
            let o = o + shift;
            if k == 0 && o == last_offset {
                if *p != last_point {
                    return Err(PlanError::invalid(
                        "cannot concatenate: trajectories meet at the same time in different places",
                    ));
                }
                continue;
            }
            if k == 0 && o < last_offset {
                return Err(PlanError::invalid(
                    "cannot concatenate: second trajectory starts before the first finishes",
                ));
            }
            points.push(*p);
            offsets.push(o);
        }
        Trajectory::new(SpatialPath::new(points)?, self.epoch, offsets)
    }

    /// Arc-time view with times in seconds since `base`.
    pub fn to_arc_time(&self, base: DateTime<Utc>) -> ArcTimePath {
        let shift = secs_between(base, self.epoch);
        ArcTimePath::from_trusted(
            self.path
                .arcs()
                .iter()
                .zip(&self.offsets)
                .map(|(&s, &o)| ArcTimePoint::new(s, o + shift))
                .collect(),
        )
    }

    /// Geometry swept in the plane, ignoring time.
    pub fn trace(&self) -> Option<Geometry<f64>> {
        self.path.trace()
    }
}
