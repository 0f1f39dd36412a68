// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::Mesh;
use ahash::AHashMap;
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Geometry statistics and analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Enclosed volume; negative when the winding points inwards
    pub volume: f64,
    pub surface_area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// Mean vertex position [x, y, z]
    pub centroid: [f64; 3],
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Every edge (after welding equal positions) is shared by exactly 2 faces
    pub is_watertight: bool,
}

impl GeometryStats {
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            surface_area: 0.0,
            bbox: [0.0; 6],
            centroid: [0.0; 3],
            vertex_count: 0,
            triangle_count: 0,
            is_watertight: false,
        }
    }

    /// Pretty print statistics
    pub fn print(&self, name: &str) {
        println!("{} {}", "Solid:".bold(), name.cyan());
        println!("  {:<14} {}", "Vertices:", self.vertex_count);
        println!("  {:<14} {}", "Triangles:", self.triangle_count);
        println!("  {:<14} {:.4}", "Volume:", self.volume);
        println!("  {:<14} {:.4}", "Surface area:", self.surface_area);
        println!(
            "  {:<14} ({:.3}, {:.3}, {:.3})",
            "Centroid:", self.centroid[0], self.centroid[1], self.centroid[2]
        );
        println!(
            "  {:<14} ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
            "Bounds:", self.bbox[0], self.bbox[1], self.bbox[2], self.bbox[3], self.bbox[4], self.bbox[5]
        );
        let watertight = if self.is_watertight {
            "yes".green()
        } else {
            "no".yellow()
        };
        println!("  {:<14} {}", "Watertight:", watertight);
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> GeometryStats {
    if mesh.vertex_count() == 0 || mesh.triangle_count() == 0 {
        return GeometryStats::empty();
    }

    let bbox = mesh.bounding_box();
    let centroid = mesh.centroid();

    GeometryStats {
        volume: signed_volume(mesh),
        surface_area: surface_area(mesh),
        bbox: [
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z,
        ],
        centroid: [centroid.x, centroid.y, centroid.z],
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        is_watertight: is_watertight(mesh),
    }
}

/// Signed volume by the divergence theorem; positive for outward winding
pub fn signed_volume(mesh: &Mesh) -> f64 {
    mesh.triangles()
        .iter()
        .map(|t| {
            let [v0, v1, v2] = mesh.triangle_positions(t);
            v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0
        })
        .sum()
}

pub fn surface_area(mesh: &Mesh) -> f64 {
    mesh.triangles()
        .iter()
        .map(|t| mesh.triangle_normal(t).norm() / 2.0)
        .sum()
}

/// Edge-sharing check on position-welded vertices
///
/// Subdivided primitives duplicate vertices per face, so indices alone would
/// report every refined mesh as open.
pub fn is_watertight(mesh: &Mesh) -> bool {
    let mut welded: AHashMap<[u64; 3], usize> = AHashMap::new();
    let ids: Vec<usize> = mesh
        .vertices()
        .iter()
        .map(|p| {
            let key = [p.x, p.y, p.z].map(|c| if c == 0.0 { 0u64 } else { c.to_bits() });
            let next = welded.len();
            *welded.entry(key).or_insert(next)
        })
        .collect();

    let mut edge_count: AHashMap<(usize, usize), usize> = AHashMap::new();
    for triangle in mesh.triangles() {
        for i in 0..3 {
            let a = ids[triangle.indices[i]];
            let b = ids[triangle.indices[(i + 1) % 3]];
            let edge = if a < b { (a, b) } else { (b, a) };
            *edge_count.entry(edge).or_insert(0) += 1;
        }
    }

    !edge_count.is_empty() && edge_count.values().all(|&count| count == 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Primitive, Vec3};
    use approx::assert_relative_eq;

    #[test]
    fn test_analyze_cuboid() {
        let mesh = Primitive::cuboid(Vec3::new(10.0, 10.0, 10.0), Vec3::zeros(), 1.0, 0)
            .to_mesh("box")
            .unwrap();
        let stats = analyze(&mesh);

        assert_relative_eq!(stats.volume, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(stats.surface_area, 600.0, epsilon = 1e-9);
        assert_eq!(stats.vertex_count, 8);
        assert_eq!(stats.triangle_count, 12);
        assert!(stats.is_watertight);
        assert_eq!(stats.bbox, [-5.0, -5.0, -5.0, 5.0, 5.0, 5.0]);
    }

    #[test]
    fn test_refined_sphere_is_watertight() {
        let mesh = Primitive::sphere(Vec3::zeros(), 1.0, 2).to_mesh("ball").unwrap();
        assert!(is_watertight(&mesh));
    }

    #[test]
    fn test_refined_cuboid_welds_shared_midpoints() {
        let mesh = Primitive::cuboid(Vec3::repeat(1.0), Vec3::zeros(), 1.0, 1)
            .to_mesh("box")
            .unwrap();
        assert!(is_watertight(&mesh));
    }

    #[test]
    fn test_empty_mesh() {
        let stats = analyze(&Mesh::empty());
        assert_eq!(stats.triangle_count, 0);
        assert!(!stats.is_watertight);
    }
}
