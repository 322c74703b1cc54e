//! Paths in (arc, time) space.

use geo::{Coord, LineString};

use crate::error::{PlanError, PlanResult};

/// A point in arc-time space: `arc` along the route, `time` in seconds since a base.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcTimePoint {
    pub arc: f64,
    pub time: f64,
}

impl ArcTimePoint {
    #[inline]
    pub fn new(arc: f64, time: f64) -> Self {
        Self { arc, time }
    }

    #[inline]
    pub fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.arc,
            y: self.time,
        }
    }

    #[inline]
    pub fn from_coord(c: Coord<f64>) -> Self {
        Self {
            arc: c.x,
            time: c.y,
        }
    }
}

/// Ordered arc-time vertices (0 or at least 2).
///
/// Invariants: every arc is finite and `>= 0`; time strictly increases from
/// vertex to vertex (an agent cannot be in two places at once).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArcTimePath {
    points: Vec<ArcTimePoint>,
}

impl ArcTimePath {
    pub fn new(points: Vec<ArcTimePoint>) -> PlanResult<Self> {
        if points.len() == 1 {
            return Err(PlanError::invalid("arc-time path must have 0 or at least 2 points"));
        }
        if let Some(p) = points
            .iter()
            .find(|p| !p.arc.is_finite() || !p.time.is_finite() || p.arc < 0.0)
        {
            return Err(PlanError::invalid(format!(
                "arc-time vertex ({}, {}) must be finite with arc >= 0",
                p.arc, p.time
            )));
        }
        if let Some(w) = points.windows(2).find(|w| w[1].time <= w[0].time) {
            return Err(PlanError::invalid(format!(
                "arc-time path is not causal: time {} follows {}",
                w[1].time, w[0].time
            )));
        }
        Ok(Self { points })
    }

    /// Skip validation for vertex lists that are causal by construction.
    pub(crate) fn from_trusted(points: Vec<ArcTimePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[1].time > w[0].time));
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[ArcTimePoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start_time(&self) -> Option<f64> {
        self.points.first().map(|p| p.time)
    }

    pub fn finish_time(&self) -> Option<f64> {
        self.points.last().map(|p| p.time)
    }

    /// Arc occupied at `time`, `None` outside `[start_time, finish_time]`.
    pub fn interpolate_arc(&self, time: f64) -> Option<f64> {
        let (first, last) = (self.points.first()?, self.points.last()?);
        if time < first.time || time > last.time {
            return None;
        }
        let idx = self.points.partition_point(|p| p.time < time);
        if idx == 0 {
            return Some(first.arc);
        }
        let (p0, p1) = (self.points[idx - 1], self.points[idx]);
        if p1.time == time {
            return Some(p1.arc);
        }
        Some(p0.arc + (p1.arc - p0.arc) * ((time - p0.time) / (p1.time - p0.time)))
    }

    /// Largest `|Δarc / Δtime|` over all consecutive vertex pairs (0 when empty).
    pub fn max_slope(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].arc - w[0].arc).abs() / (w[1].time - w[0].time))
            .fold(0.0, f64::max)
    }

    /// The path as a line string with `x = arc`, `y = time`.
    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(self.points.iter().map(|p| p.to_coord()).collect())
    }
}
