//! Closest-first search over a mesh.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::types::Mesh;

/// Heap entry ordered so that `BinaryHeap` pops the smallest distance first;
/// ties go to the lower vertex index for deterministic output.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Entry {
    dist: f64,
    vertex: usize,
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Vertex indices of a shortest path from `mesh.start` to the nearest finish vertex.
///
/// Stops at the first finish vertex popped from the heap. That is only the
/// nearest one because every weight is non-negative.
pub fn closest_first(mesh: &Mesh) -> Option<Vec<usize>> {
    let n = mesh.vertices.len();
    if mesh.start >= n {
        return None;
    }
    let mut target = vec![false; n];
    for &f in &mesh.finish {
        target[f] = true;
    }
    let mut dist = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut heap = BinaryHeap::new();
    dist[mesh.start] = 0.0;
    heap.push(Entry {
        dist: 0.0,
        vertex: mesh.start,
    });

    while let Some(Entry { dist: d, vertex: v }) = heap.pop() {
        if d > dist[v] {
            continue; // stale
        }
        if target[v] {
            return Some(unwind(&parent, v));
        }
        for e in &mesh.adj[v] {
            debug_assert!(e.weight >= 0.0, "negative edge weight {}", e.weight);
            let nd = d + e.weight;
            if nd < dist[e.to] {
                dist[e.to] = nd;
                parent[e.to] = Some(v);
                heap.push(Entry {
                    dist: nd,
                    vertex: e.to,
                });
            }
        }
    }
    None
}

fn unwind(parent: &[Option<usize>], mut v: usize) -> Vec<usize> {
    let mut path = vec![v];
    while let Some(p) = parent[v] {
        path.push(p);
        v = p;
    }
    path.reverse();
    path
}
