// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Signed distance fields and sampled distance grids
//!
//! A field is negative inside the solid, zero on its surface and positive
//! outside. Booleans combine distances with `min`/`max`; transforms map the
//! query point back into the operand's frame.

use super::Vec3;
use crate::error::{CsgError, CsgResult};
use nalgebra::{Point3, Rotation3, Vector2};
use std::sync::Arc;

/// Largest distance, in units of node spacing, between a query point and
/// the lattice node it is matched to
const LATTICE_TOLERANCE: f64 = 1e-9;

/// Composable signed distance field
#[derive(Debug, Clone, PartialEq)]
pub enum Sdf {
    /// Sphere about the origin
    Sphere { radius: f64 },
    /// Axis-aligned box about the origin
    Cuboid { half_extents: Vec3 },
    /// Capped cylinder along z, centered on the origin
    Cylinder { height: f64, radius: f64 },

    Union(Arc<Sdf>, Arc<Sdf>),
    Intersection(Arc<Sdf>, Arc<Sdf>),
    /// First operand minus the second
    Difference(Arc<Sdf>, Arc<Sdf>),

    Translate(Arc<Sdf>, Vec3),
    /// Uniform scale about the origin
    Scale(Arc<Sdf>, f64),
    Rotate(Arc<Sdf>, Rotation3<f64>),
    /// Adds a constant to the distance; positive shrinks the solid
    Offset(Arc<Sdf>, f64),
}

impl Sdf {
    pub fn sphere(radius: f64) -> Self {
        Sdf::Sphere { radius }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Sdf::Cuboid { half_extents }
    }

    pub fn cylinder(height: f64, radius: f64) -> Self {
        Sdf::Cylinder { height, radius }
    }

    pub fn union(self, other: Sdf) -> Self {
        Sdf::Union(Arc::new(self), Arc::new(other))
    }

    pub fn intersection(self, other: Sdf) -> Self {
        Sdf::Intersection(Arc::new(self), Arc::new(other))
    }

    pub fn difference(self, other: Sdf) -> Self {
        Sdf::Difference(Arc::new(self), Arc::new(other))
    }

    pub fn translate(self, offset: Vec3) -> Self {
        Sdf::Translate(Arc::new(self), offset)
    }

    pub fn scale(self, factor: f64) -> CsgResult<Self> {
        if !(factor > 0.0) {
            return Err(CsgError::degenerate(
                "field",
                "scale",
                format!("scale factor must be positive, got {}", factor),
            ));
        }
        Ok(Sdf::Scale(Arc::new(self), factor))
    }

    pub fn rotate(self, rotation: Rotation3<f64>) -> Self {
        Sdf::Rotate(Arc::new(self), rotation)
    }

    /// Move the surface inwards by `delta`
    pub fn erode(self, delta: f64) -> Self {
        Sdf::Offset(Arc::new(self), delta)
    }

    /// Move the surface outwards by `delta`
    pub fn dilate(self, delta: f64) -> Self {
        Sdf::Offset(Arc::new(self), -delta)
    }

    /// Erosion followed by dilation by the same amount
    pub fn open(self, delta: f64) -> Self {
        self.erode(delta).dilate(delta)
    }

    /// Signed distance from `p` to the surface
    pub fn distance(&self, p: &Point3<f64>) -> f64 {
        match self {
            Sdf::Sphere { radius } => p.coords.norm() - radius,
            Sdf::Cuboid { half_extents } => {
                let q = p.coords.abs() - half_extents;
                q.sup(&Vec3::zeros()).norm() + q.max().min(0.0)
            }
            Sdf::Cylinder { height, radius } => {
                let q = Vector2::new(p.x.hypot(p.y) - radius, p.z.abs() - height / 2.0);
                q.sup(&Vector2::zeros()).norm() + q.max().min(0.0)
            }
            Sdf::Union(a, b) => a.distance(p).min(b.distance(p)),
            Sdf::Intersection(a, b) => a.distance(p).max(b.distance(p)),
            Sdf::Difference(a, b) => a.distance(p).max(-b.distance(p)),
            Sdf::Translate(inner, offset) => inner.distance(&(p - offset)),
            Sdf::Scale(inner, factor) => {
                factor * inner.distance(&Point3::from(p.coords / *factor))
            }
            Sdf::Rotate(inner, rotation) => inner.distance(&(rotation.inverse() * p)),
            Sdf::Offset(inner, delta) => inner.distance(p) + delta,
        }
    }
}

/// Distance values sampled on a regular lattice
///
/// Node `(i, j, k)` sits at `min + spacing * (i, j, k)` and is stored at
/// index `(k * J + j) * I + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    min: Point3<f64>,
    max: Point3<f64>,
    counts: [usize; 3],
    values: Vec<f64>,
}

impl Grid {
    /// Sample `field` at `counts` evenly spaced nodes per axis, bounds included
    pub fn sample(
        min: Point3<f64>,
        max: Point3<f64>,
        counts: [usize; 3],
        field: &Sdf,
    ) -> CsgResult<Self> {
        for axis in 0..3 {
            if counts[axis] < 2 {
                return Err(CsgError::degenerate(
                    "grid",
                    "counts",
                    format!("at least 2 nodes per axis are required, got {}", counts[axis]),
                ));
            }
            if !(max[axis] > min[axis]) {
                return Err(CsgError::degenerate(
                    "grid",
                    "bounds",
                    format!("empty extent along axis {}", axis),
                ));
            }
        }

        let mut grid = Self {
            min,
            max,
            counts,
            values: Vec::with_capacity(counts.iter().product()),
        };
        for k in 0..counts[2] {
            for j in 0..counts[1] {
                for i in 0..counts[0] {
                    let value = field.distance(&grid.point(i, j, k));
                    grid.values.push(value);
                }
            }
        }

        log::debug!("sampled {} grid nodes", grid.values.len());
        Ok(grid)
    }

    pub fn counts(&self) -> [usize; 3] {
        self.counts
    }

    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        (self.min, self.max)
    }

    /// Distance between neighbouring nodes along each axis
    pub fn spacing(&self) -> Vec3 {
        let steps = Vec3::new(
            (self.counts[0] - 1) as f64,
            (self.counts[1] - 1) as f64,
            (self.counts[2] - 1) as f64,
        );
        (self.max - self.min).component_div(&steps)
    }

    pub fn point(&self, i: usize, j: usize, k: usize) -> Point3<f64> {
        self.min + self.spacing().component_mul(&Vec3::new(i as f64, j as f64, k as f64))
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<f64> {
        let [ni, nj, nk] = self.counts;
        if i >= ni || j >= nj || k >= nk {
            return None;
        }
        Some(self.values[(k * nj + j) * ni + i])
    }

    /// Sampled value at `p`; `None` unless `p` is a lattice node
    pub fn value_at(&self, p: &Point3<f64>) -> Option<f64> {
        let spacing = self.spacing();
        let mut index = [0usize; 3];
        for axis in 0..3 {
            let t = (p[axis] - self.min[axis]) / spacing[axis];
            let node = t.round();
            if node < 0.0 || node > (self.counts[axis] - 1) as f64 {
                return None;
            }
            if (t - node).abs() > LATTICE_TOLERANCE {
                return None;
            }
            index[axis] = node as usize;
        }
        self.get(index[0], index[1], index[2])
    }

    /// Values in storage order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn min_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn union(&self, other: &Grid) -> CsgResult<Grid> {
        self.combine(other, f64::min)
    }

    pub fn intersection(&self, other: &Grid) -> CsgResult<Grid> {
        self.combine(other, f64::max)
    }

    pub fn difference(&self, other: &Grid) -> CsgResult<Grid> {
        self.combine(other, |a, b| a.max(-b))
    }

    fn combine<F>(&self, other: &Grid, f: F) -> CsgResult<Grid>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.counts != other.counts || self.min != other.min || self.max != other.max {
            return Err(CsgError::GridMismatch(format!(
                "{:?} nodes over [{}, {}] against {:?} nodes over [{}, {}]",
                self.counts, self.min, self.max, other.counts, other.min, other.max
            )));
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| f(*a, *b))
            .collect();
        Ok(Grid {
            min: self.min,
            max: self.max,
            counts: self.counts,
            values,
        })
    }
}
