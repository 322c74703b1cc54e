//! Arc-time visibility mesh and its closest-first search.
//!
//! Purpose
//! - Turn the blocked part of arc-time space into a directed graph whose
//!   vertices are the corners of the blocked map (clipped to the admissible
//!   box) plus the start and finish points. A shortest path in that graph is a
//!   fastest admissible motion along the route.
//!
//! Edges
//! - `from → to` is admitted when both ends are in bounds, time does not run
//!   backwards, `|Δarc| ≤ max_speed · Δtime`, and the segment does not meet the
//!   interior of any blocked polygon. Weight = `Δtime`.
//! - The interior test is DE-9IM (`geo::Relate`), confirmed by requiring the
//!   segment to get deeper than `GeomCfg::eps_contact`. Clipped vertices are
//!   only accurate to rounding, and an edge along a region boundary must stay
//!   admissible.
//!
//! Two flavours
//! - `build_fixed_mesh`: a single finish vertex at a fixed time.
//! - `build_minimum_mesh`: one candidate finish per vertex (earliest arrival at
//!   the route end inside a window, followed by a clear dwell).

mod blocked;
mod build;
mod search;
mod types;

pub use blocked::BlockedMap;
pub use build::{build_fixed_mesh, build_minimum_mesh, finish_candidate, FinishWindow};
pub use search::closest_first;
pub use types::{ArcTimeBounds, Edge, Mesh};

use crate::path::{ArcTimePath, ArcTimePoint};

/// Shortest path through `mesh` as arc-time vertices; `None` when no finish is reachable.
pub fn shortest_arc_time_path(mesh: &Mesh) -> Option<ArcTimePath> {
    let idx = closest_first(mesh)?;
    let points = idx
        .into_iter()
        .map(|k| ArcTimePoint::from_coord(mesh.vertices[k]))
        .collect();
    Some(ArcTimePath::from_trusted(points))
}
