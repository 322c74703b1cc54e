//! Mesh data types.

use geo::Coord;

/// The admissible box of arc-time space plus the speed limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcTimeBounds {
    pub max_speed: f64,
    pub max_arc: f64,
    pub min_time: f64,
    pub max_time: f64,
}

impl ArcTimeBounds {
    /// Is `c` inside `[0, max_arc] × [min_time, max_time]`?
    #[inline]
    pub fn contains(&self, c: Coord<f64>) -> bool {
        (0.0..=self.max_arc).contains(&c.x) && (self.min_time..=self.max_time).contains(&c.y)
    }

    /// Nearest point of the box.
    #[inline]
    pub fn clamp(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: c.x.clamp(0.0, self.max_arc),
            y: c.y.clamp(self.min_time, self.max_time),
        }
    }

    /// Can an agent get from `from` to `to` without going back in time or speeding?
    #[inline]
    pub fn reachable(&self, from: Coord<f64>, to: Coord<f64>) -> bool {
        let dt = to.y - from.y;
        dt >= 0.0 && (to.x - from.x).abs() <= self.max_speed * dt
    }
}

/// Directed edge; `weight` is the elapsed time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub to: usize,
    pub weight: f64,
}

/// Directed visibility graph over arc-time coordinates.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Coord<f64>>,
    pub adj: Vec<Vec<Edge>>, // out-edges of vertex k
    pub start: usize,
    pub finish: Vec<usize>,
}

impl Mesh {
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.adj.iter().map(Vec::len).sum()
    }

    #[inline]
    pub fn is_finish(&self, v: usize) -> bool {
        self.finish.contains(&v)
    }
}
