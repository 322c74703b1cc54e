//! Immutable path and trajectory value types.
//!
//! - `SpatialPath`: a polyline with eagerly computed cumulative arc lengths.
//! - `ArcTimePath`: `(arc, time)` vertices with strictly increasing time.
//! - `Trajectory`: a spatial path with one timestamp per vertex.
//!
//! All three are built once from validated input and never mutated.

mod arctime;
mod spatial;
mod trajectory;

pub use arctime::{ArcTimePath, ArcTimePoint};
pub use spatial::{PathSegment, SpatialPath};
pub use trajectory::Trajectory;

#[cfg(test)]
mod tests;
