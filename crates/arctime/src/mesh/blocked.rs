//! The blocked map: union of all forbidden regions, with per-polygon bounding boxes.

use geo::{BoundingRect, Coord, Intersects, LineString, MultiPolygon, Rect};

use super::types::ArcTimeBounds;
use crate::forbidden::ForbiddenRegion;
use crate::geom::{boundary_coords, clip_to_rect, crosses_interior, enters_interior, union_all};

#[derive(Clone, Debug)]
pub struct BlockedMap {
    polys: Vec<(MultiPolygon<f64>, Rect<f64>)>,
    union: MultiPolygon<f64>,
    eps: f64,
}

impl Default for BlockedMap {
    fn default() -> Self {
        Self {
            polys: Vec::new(),
            union: MultiPolygon::new(Vec::new()),
            eps: 0.0,
        }
    }
}

impl BlockedMap {
    /// `eps` is the contact tolerance: overlaps shallower than it are not crossings.
    pub fn new(regions: &[ForbiddenRegion], eps: f64) -> Self {
        let union = union_all(regions.iter().flat_map(|r| r.region().iter().cloned()));
        let polys = union
            .iter()
            .filter_map(|p| Some((MultiPolygon::new(vec![p.clone()]), p.bounding_rect()?)))
            .collect();
        Self { polys, union, eps }
    }

    #[inline]
    pub fn union(&self) -> &MultiPolygon<f64> {
        &self.union
    }

    /// Distinct boundary vertices of the blocked map clipped to `bounds`.
    ///
    /// Clipping adds the points where region edges leave the box, so a region
    /// that runs past a route end still contributes a vertex on that end.
    pub fn vertices_within(&self, bounds: &ArcTimeBounds) -> Vec<Coord<f64>> {
        if self.union.0.is_empty() || bounds.max_arc < 0.0 || bounds.max_time < bounds.min_time {
            return Vec::new();
        }
        let window = Rect::new((0.0, bounds.min_time), (bounds.max_arc, bounds.max_time));
        let clipped = MultiPolygon::new(
            self.union
                .iter()
                .filter_map(|p| clip_to_rect(p, &window))
                .collect(),
        );
        boundary_coords(&clipped)
            .into_iter()
            .map(|c| bounds.clamp(c))
            .collect()
    }

    /// Does the closed segment `a → b` run through the interior of a blocked polygon?
    ///
    /// DE-9IM interior/interior decides; a hit counts only where the segment
    /// gets deeper than the contact tolerance.
    pub fn crosses(&self, a: Coord<f64>, b: Coord<f64>) -> bool {
        let bbox = Rect::new(a, b);
        let seg = LineString::new(vec![a, b]);
        self.polys.iter().any(|(mp, bb)| {
            bb.intersects(&bbox)
                && mp.iter().any(|p| crosses_interior(p, a, b))
                && enters_interior(mp, &seg, self.eps)
        })
    }
}
