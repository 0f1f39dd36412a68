// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Midpoint subdivision shared by the refinable primitives
//!
//! Each pass replaces every triangle `(v0, v1, v2)` with four triangles built
//! from its edge midpoints `v3 = mid(v0, v1)`, `v4 = mid(v1, v2)` and
//! `v5 = mid(v2, v0)`. Every face owns its own six vertices afterwards, so
//! a pass multiplies the face count by 4 and produces 6 vertices per input
//! face. Winding is preserved.

use super::Triangle;
use nalgebra::Point3;

/// Where the edge midpoints of a pass end up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Midpoint {
    /// Plain midpoint, stays on the flat face
    Linear,
    /// Midpoint pushed radially onto a sphere about the origin
    Spherical { radius: f64 },
}

impl Midpoint {
    fn place(&self, a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
        let mid = nalgebra::center(a, b);
        match *self {
            Midpoint::Linear => mid,
            Midpoint::Spherical { radius } => Point3::from(mid.coords.normalize() * radius),
        }
    }
}

/// Face count after `passes` rounds of subdivision
pub fn refined_face_count(base_faces: usize, passes: u32) -> usize {
    base_faces * 4usize.pow(passes)
}

/// Apply `passes` rounds of subdivision to raw buffers
pub fn subdivide(
    mut vertices: Vec<Point3<f64>>,
    mut triangles: Vec<Triangle>,
    passes: u32,
    midpoint: Midpoint,
) -> (Vec<Point3<f64>>, Vec<Triangle>) {
    for _ in 0..passes {
        let mut next_vertices = Vec::with_capacity(triangles.len() * 6);
        let mut next_triangles = Vec::with_capacity(refined_face_count(triangles.len(), 1));

        for triangle in &triangles {
            let [i0, i1, i2] = triangle.indices;
            let (v0, v1, v2) = (vertices[i0], vertices[i1], vertices[i2]);

            let base = next_vertices.len();
            next_vertices.extend_from_slice(&[
                v0,
                v1,
                v2,
                midpoint.place(&v0, &v1),
                midpoint.place(&v1, &v2),
                midpoint.place(&v2, &v0),
            ]);

            next_triangles.push(Triangle::new([base, base + 3, base + 5]));
            next_triangles.push(Triangle::new([base + 1, base + 4, base + 3]));
            next_triangles.push(Triangle::new([base + 2, base + 5, base + 4]));
            next_triangles.push(Triangle::new([base + 3, base + 4, base + 5]));
        }

        vertices = next_vertices;
        triangles = next_triangles;
    }

    (vertices, triangles)
}
