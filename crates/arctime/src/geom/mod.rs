//! Shared 2D geometry for the arc-time engine.
//!
//! Purpose
//! - Keep the affine basis change (physical plane → arc-time plane) and the
//!   polygon bookkeeping (union, normalization, interior tests) in one place so
//!   the region builder, mesh and validators agree on numerics.
//!
//! Numeric policy
//! - Degeneracy of the arc/velocity basis is decided by a relative determinant
//!   tolerance (`GeomCfg::eps_det`, see `ArcTimeMap::from_basis`).
//! - Clipping against axis-aligned windows is done here, not by `geo`'s
//!   boolean ops: those snap output to an integer grid, while window edges
//!   must come out exactly so neighbouring pieces share coordinates.
//! - Interior tests run DE-9IM via `geo::Relate` and count a hit only past the
//!   contact tolerance in `GeomCfg`, so geometry rebuilt from rounded vertices
//!   agrees with the unrounded input.
//! - `nudge_up`/`nudge_down` move a coordinate by exactly one ULP to keep a split
//!   line out of both halves.

mod types;
mod util;

pub use types::{ArcTimeMap, GeomCfg, Vec2};
pub use util::{
    boundary_coords, clip_to_rect, crosses_interior, enters_interior, from_coord, interior_depth,
    normalize, nudge_down, nudge_up, point_enters_interior, segment_splits, to_coord, union_all,
    validate_shape,
};
