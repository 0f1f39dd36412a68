// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Immutable triangle mesh shared by every stage of the graph

use super::BoundingBox;
use crate::error::{CsgError, CsgResult};
use nalgebra::{Point3, Vector3};
use serde::Serialize;

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }
}

/// Semantic tag attached to a vertex by the generator that produced it
///
/// Operators that only make sense for a specific primitive select vertices by
/// role instead of by buffer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VertexRole {
    /// One of the 8 corners of an unrefined cuboid, in generator order
    CuboidCorner(u8),
    /// Corner of a pyramid base rectangle
    BaseCorner,
    /// Pyramid apex
    Apex,
    /// Center of a cylinder end cap
    CapCenter,
    /// Point on a cylinder cap rim
    CapRim,
}

/// Triangular mesh
///
/// Buffers are private: once built, a mesh is never mutated. Operators build
/// a new mesh from an existing one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<Triangle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    roles: Option<Vec<VertexRole>>,
}

impl Mesh {
    /// Build a mesh from raw buffers, checking every face
    pub fn from_buffers(vertices: Vec<Point3<f64>>, triangles: Vec<Triangle>) -> CsgResult<Self> {
        let mesh = Self {
            vertices,
            triangles,
            roles: None,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Generator-side constructor; callers guarantee the face invariant
    pub(crate) fn from_parts(vertices: Vec<Point3<f64>>, triangles: Vec<Triangle>) -> Self {
        let mesh = Self {
            vertices,
            triangles,
            roles: None,
        };
        debug_assert!(mesh.validate().is_ok());
        mesh
    }

    pub(crate) fn with_roles(mut self, roles: Vec<VertexRole>) -> Self {
        debug_assert_eq!(roles.len(), self.vertices.len());
        self.roles = Some(roles);
        self
    }

    /// Same mesh with its vertex roles dropped
    pub(crate) fn without_roles(mut self) -> Self {
        self.roles = None;
        self
    }

    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            roles: None,
        }
    }

    /// Check face indices are in range and pairwise distinct
    pub fn validate(&self) -> CsgResult<()> {
        let count = self.vertices.len();
        for (i, triangle) in self.triangles.iter().enumerate() {
            let [a, b, c] = triangle.indices;
            if a >= count || b >= count || c >= count {
                return Err(CsgError::MalformedMesh(format!(
                    "face {} {:?} references a vertex outside 0..{}",
                    i, triangle.indices, count
                )));
            }
            if a == b || b == c || a == c {
                return Err(CsgError::MalformedMesh(format!(
                    "face {} {:?} repeats a vertex",
                    i, triangle.indices
                )));
            }
        }
        if let Some(roles) = &self.roles {
            if roles.len() != count {
                return Err(CsgError::MalformedMesh(format!(
                    "{} vertex roles for {} vertices",
                    roles.len(),
                    count
                )));
            }
        }
        Ok(())
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn roles(&self) -> Option<&[VertexRole]> {
        self.roles.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Positions of the three corners of a face
    pub fn triangle_positions(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        let [a, b, c] = triangle.indices;
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Unnormalized face normal (length is twice the face area)
    pub fn triangle_normal(&self, triangle: &Triangle) -> Vector3<f64> {
        let [p0, p1, p2] = self.triangle_positions(triangle);
        (p1 - p0).cross(&(p2 - p0))
    }

    /// Mean of all vertex positions
    pub fn centroid(&self) -> Point3<f64> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    /// New mesh with identical topology and roles and a rewritten vertex buffer
    pub fn map_vertices<F>(&self, mut f: F) -> Mesh
    where
        F: FnMut(usize, &Point3<f64>) -> Point3<f64>,
    {
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| f(i, v))
            .collect();
        Mesh {
            vertices,
            triangles: self.triangles.clone(),
            roles: self.roles.clone(),
        }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_from_buffers_rejects_out_of_range_index() {
        let err = Mesh::from_buffers(unit_triangle(), vec![Triangle::new([0, 1, 3])]).unwrap_err();
        assert!(matches!(err, CsgError::MalformedMesh(_)));
    }

    #[test]
    fn test_from_buffers_rejects_repeated_vertex() {
        let err = Mesh::from_buffers(unit_triangle(), vec![Triangle::new([0, 1, 1])]).unwrap_err();
        assert!(matches!(err, CsgError::MalformedMesh(_)));
    }

    #[test]
    fn test_triangle_normal_follows_winding() {
        let mesh = Mesh::from_buffers(unit_triangle(), vec![Triangle::new([0, 1, 2])]).unwrap();
        let n = mesh.triangle_normal(&mesh.triangles()[0]);
        assert_eq!(n, Vector3::new(0.0, 0.0, 1.0));

        let reversed = Triangle::new([0, 2, 1]);
        assert_eq!(mesh.triangle_normal(&reversed), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_map_vertices_keeps_faces() {
        let a = Mesh::from_buffers(unit_triangle(), vec![Triangle::new([0, 1, 2])]).unwrap();
        let b = a.map_vertices(|_, v| v + Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(a.triangles(), b.triangles());
        assert_eq!(b.vertices()[0], Point3::new(0.0, 0.0, 2.0));
        assert_eq!(a.vertices()[0], Point3::new(0.0, 0.0, 0.0));
    }
}
