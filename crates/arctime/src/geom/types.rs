//! Tolerances and the affine map from the physical plane to arc-time space.

use geo::Coord;
use nalgebra::{Matrix2, Vector2};

/// Spatial vector / point in the physical plane.
pub type Vec2 = Vector2<f64>;

/// Geometry configuration (tolerances).
#[derive(Clone, Copy, Debug)]
pub struct GeomCfg {
    /// Relative determinant (sine of the angle between route and obstacle
    /// velocity) at or below which the motion counts as parallel to the route.
    pub eps_det: f64,
    /// Depth below which a trace touching a region counts as contact, not collision.
    /// Must exceed the rounding of the region union.
    pub eps_contact: f64,
    /// Length by which the first and last route segments are extended when
    /// building regions, so an agent resting on a route end is strictly inside
    /// the region of an obstacle covering that end. Must exceed `eps_contact`.
    pub cap_extension: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self {
            eps_det: 1e-9,
            eps_contact: 1e-6,
            cap_extension: 1e-5,
        }
    }
}

/// Affine map `XY ↦ M·XY + t` from the physical plane into arc-time space.
#[derive(Clone, Copy, Debug)]
pub struct ArcTimeMap {
    pub m: Matrix2<f64>,
    pub t: Vector2<f64>,
}

impl ArcTimeMap {
    /// Build `ST = M·(XY − XY₀) + ST₀` with `M = basis⁻¹`.
    ///
    /// `basis` has the unit route direction and the negated obstacle velocity
    /// as columns. Returns `None` when the basis is singular up to `eps_det`,
    /// relative to the column lengths (relative motion parallel to the route,
    /// or none at all).
    pub fn from_basis(basis: Matrix2<f64>, xy0: Vec2, st0: Vec2, eps_det: f64) -> Option<Self> {
        let scale = basis.column(0).norm() * basis.column(1).norm();
        if basis.determinant().abs() <= eps_det * scale {
            return None;
        }
        let m = basis.try_inverse()?;
        Some(Self {
            m,
            t: st0 - m * xy0,
        })
    }

    #[inline]
    pub fn apply(&self, xy: Vec2) -> Vec2 {
        self.m * xy + self.t
    }

    #[inline]
    pub fn apply_coord(&self, c: Coord<f64>) -> Coord<f64> {
        let st = self.apply(Vector2::new(c.x, c.y));
        Coord { x: st.x, y: st.y }
    }
}
