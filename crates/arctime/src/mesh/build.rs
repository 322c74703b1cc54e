//! Mesh construction: vertices, edge admission and finish candidates.

use std::collections::HashMap;

use geo::Coord;
use tracing::debug;

use super::blocked::BlockedMap;
use super::types::{ArcTimeBounds, Edge, Mesh};

/// Window for the minimum-finish mesh, in seconds since base.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FinishWindow {
    pub earliest: f64,
    pub latest: f64,
    /// How long the agent must be able to stay at the route end after arriving.
    pub buffer: f64,
}

/// Insertion-ordered vertex list with exact (bitwise) deduplication.
#[derive(Default)]
struct VertexSet {
    coords: Vec<Coord<f64>>,
    index: HashMap<(u64, u64), usize>,
}

impl VertexSet {
    fn insert(&mut self, c: Coord<f64>) -> usize {
        // -0.0 and 0.0 are the same vertex
        let key = ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits());
        *self.index.entry(key).or_insert_with(|| {
            self.coords.push(c);
            self.coords.len() - 1
        })
    }
}

fn edges_from(
    i: usize,
    vertices: &[Coord<f64>],
    bounds: &ArcTimeBounds,
    blocked: &BlockedMap,
) -> Vec<Edge> {
    let from = vertices[i];
    if !bounds.contains(from) {
        return Vec::new();
    }
    vertices
        .iter()
        .enumerate()
        .filter(|&(j, to)| {
            j != i
                && bounds.contains(*to)
                && bounds.reachable(from, *to)
                && !blocked.crosses(from, *to)
        })
        .map(|(j, to)| Edge {
            to: j,
            weight: to.y - from.y,
        })
        .collect()
}

/// Admit every edge `from → to` between in-bounds vertices that stays causal,
/// within the speed limit, and out of the interior of the blocked map.
/// Weight = elapsed time.
fn admit_edges(
    vertices: &[Coord<f64>],
    bounds: &ArcTimeBounds,
    blocked: &BlockedMap,
) -> Vec<Vec<Edge>> {
    #[cfg(not(feature = "parallel"))]
    {
        (0..vertices.len())
            .map(|i| edges_from(i, vertices, bounds, blocked))
            .collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..vertices.len())
            .into_par_iter()
            .map(|i| edges_from(i, vertices, bounds, blocked))
            .collect()
    }
}

/// Start first, then the boundary vertices of the blocked map inside `bounds`.
fn base_vertices(start: Coord<f64>, bounds: &ArcTimeBounds, blocked: &BlockedMap) -> VertexSet {
    let mut set = VertexSet::default();
    set.insert(start);
    for c in blocked.vertices_within(bounds) {
        set.insert(c);
    }
    set
}

/// Mesh from `start` to a single `finish` vertex.
pub fn build_fixed_mesh(
    bounds: &ArcTimeBounds,
    blocked: &BlockedMap,
    start: Coord<f64>,
    finish: Coord<f64>,
) -> Mesh {
    let mut set = base_vertices(start, bounds, blocked);
    let finish = set.insert(finish);
    let adj = admit_edges(&set.coords, bounds, blocked);
    let mesh = Mesh {
        vertices: set.coords,
        adj,
        start: 0,
        finish: vec![finish],
    };
    debug!(
        vertices = mesh.vertices.len(),
        edges = mesh.num_edges(),
        "fixed-finish mesh built"
    );
    mesh
}

/// Earliest arrival at the route end from `v` at full speed, clamped up to
/// `window.earliest`; `None` when it misses `window.latest`.
pub fn finish_candidate(
    v: Coord<f64>,
    bounds: &ArcTimeBounds,
    window: &FinishWindow,
) -> Option<Coord<f64>> {
    let arrival = if v.x == bounds.max_arc {
        v.y
    } else {
        v.y + (bounds.max_arc - v.x) / bounds.max_speed
    };
    let t = arrival.max(window.earliest);
    (t <= window.latest).then_some(Coord {
        x: bounds.max_arc,
        y: t,
    })
}

/// Mesh whose finish vertices are every admissible arrival at the route end.
///
/// Each base vertex contributes at most one candidate, joined by a direct
/// edge. A candidate is kept only if the approach is unobstructed and the
/// agent can then wait at the end for `window.buffer` seconds.
pub fn build_minimum_mesh(
    bounds: &ArcTimeBounds,
    blocked: &BlockedMap,
    start: Coord<f64>,
    window: &FinishWindow,
) -> Mesh {
    let mut set = base_vertices(start, bounds, blocked);
    let mut adj = admit_edges(&set.coords, bounds, blocked);
    let mut finish = Vec::new();
    let base_len = set.coords.len();
    for v in 0..base_len {
        let from = set.coords[v];
        let Some(cand) = finish_candidate(from, bounds, window) else {
            continue;
        };
        if cand != from && cand.y <= from.y {
            continue;
        }
        let dwell_end = Coord {
            x: cand.x,
            y: cand.y + window.buffer,
        };
        if blocked.crosses(from, cand) || blocked.crosses(cand, dwell_end) {
            continue;
        }
        let idx = set.insert(cand);
        if idx == adj.len() {
            adj.push(Vec::new());
        }
        if idx != v {
            adj[v].push(Edge {
                to: idx,
                weight: cand.y - from.y,
            });
        }
        if !finish.contains(&idx) {
            finish.push(idx);
        }
    }
    let mesh = Mesh {
        vertices: set.coords,
        adj,
        start: 0,
        finish,
    };
    debug!(
        vertices = mesh.vertices.len(),
        edges = mesh.num_edges(),
        finishes = mesh.finish.len(),
        "minimum-finish mesh built"
    );
    mesh
}
