//! Static and moving obstacles, and the `World` that groups them.
//!
//! Shapes are simple polygons without holes, validated once at construction.
//! A dynamic obstacle's shape lives in its own local frame; at any instant it
//! is translated by the reference point of its trajectory.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use geo::{MultiPolygon, Polygon, Translate};

use crate::error::{PlanError, PlanResult};
use crate::geom::{union_all, validate_shape, Vec2};
use crate::path::Trajectory;
use crate::validate::{validate_dynamic, validate_static};

/// An obstacle that never moves.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticObstacle {
    shape: Polygon<f64>,
}

impl StaticObstacle {
    pub fn new(shape: Polygon<f64>) -> PlanResult<Self> {
        validate_shape(&shape)?;
        Ok(Self { shape })
    }

    #[inline]
    pub fn shape(&self) -> &Polygon<f64> {
        &self.shape
    }
}

/// A rigid shape whose reference point follows a trajectory.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicObstacle {
    shape: Polygon<f64>,
    trajectory: Trajectory,
}

impl DynamicObstacle {
    /// `shape` is given relative to the reference point; `trajectory` must be
    /// non-empty and last longer than zero seconds.
    pub fn new(shape: Polygon<f64>, trajectory: Trajectory) -> PlanResult<Self> {
        validate_shape(&shape)?;
        if trajectory.is_empty() {
            return Err(PlanError::invalid("dynamic obstacle needs a non-empty trajectory"));
        }
        if trajectory.duration_secs() <= 0.0 {
            return Err(PlanError::invalid("dynamic obstacle trajectory has zero duration"));
        }
        Ok(Self { shape, trajectory })
    }

    #[inline]
    pub fn shape(&self) -> &Polygon<f64> {
        &self.shape
    }

    #[inline]
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// The shape in world coordinates at `time`; `None` outside the trajectory.
    pub fn shape_at(&self, time: DateTime<Utc>) -> Option<Polygon<f64>> {
        let at = self.trajectory.interpolate_location(time)?;
        Some(self.placed(at))
    }

    #[inline]
    pub(crate) fn placed(&self, at: Vec2) -> Polygon<f64> {
        self.shape.translate(at.x, at.y)
    }
}

/// Every obstacle in the plane, with the union of static shapes computed up front.
#[derive(Clone, Debug)]
pub struct World {
    statics: Vec<StaticObstacle>,
    dynamics: Vec<Arc<DynamicObstacle>>,
    map: MultiPolygon<f64>,
}

impl World {
    pub fn new(statics: Vec<StaticObstacle>, dynamics: Vec<Arc<DynamicObstacle>>) -> Self {
        let map = union_all(statics.iter().map(|s| s.shape().clone()));
        Self {
            statics,
            dynamics,
            map,
        }
    }

    #[inline]
    pub fn statics(&self) -> &[StaticObstacle] {
        &self.statics
    }

    #[inline]
    pub fn dynamics(&self) -> &[Arc<DynamicObstacle>] {
        &self.dynamics
    }

    /// Union of all static shapes.
    #[inline]
    pub fn map(&self) -> &MultiPolygon<f64> {
        &self.map
    }

    /// True when `trajectory` avoids every static and dynamic obstacle.
    pub fn is_collision_free(&self, trajectory: &Trajectory) -> bool {
        validate_static(trajectory, &self.statics) && validate_dynamic(trajectory, &self.dynamics)
    }
}
