// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator

use super::subdivision::{subdivide, Midpoint};
use super::{Mesh, Triangle, Vec3, VertexRole};
use crate::error::{CsgError, CsgResult};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Golden ratio, used by the icosahedron construction
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Shape names accepted by `solid` declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Cuboid,
    Cylinder,
    Sphere,
    Pyramid,
    Prism,
}

impl FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cuboid" | "cube" => Ok(Self::Cuboid),
            "cylinder" => Ok(Self::Cylinder),
            "sphere" => Ok(Self::Sphere),
            "pyramid" => Ok(Self::Pyramid),
            "prism" => Ok(Self::Prism),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cuboid => "cuboid",
            Self::Cylinder => "cylinder",
            Self::Sphere => "sphere",
            Self::Pyramid => "pyramid",
            Self::Prism => "prism",
        };
        f.write_str(name)
    }
}

/// Geometric primitives with their fully resolved parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Cuboid {
        size: Vec3,
        center: Vec3,
        scale: f64,
        refining: u32,
    },
    Cylinder {
        start: Vec3,
        end: Vec3,
        radius: f64,
        resolution: u32,
    },
    Sphere {
        center: Vec3,
        scale: f64,
        refining: u32,
    },
    Pyramid {
        height: f64,
        width: f64,
        length: f64,
        center: Vec3,
        scale: f64,
    },
    Prism {
        center: Vec3,
        length: f64,
        height: f64,
        angle: f64,
    },
}

impl Primitive {
    pub const DEFAULT_SCALE: f64 = 1.0;
    pub const DEFAULT_CUBOID_REFINING: u32 = 0;
    pub const DEFAULT_SPHERE_REFINING: u32 = 1;
    pub const DEFAULT_RADIUS: f64 = 1.0;
    pub const DEFAULT_RESOLUTION: u32 = 8;
    pub const DEFAULT_PRISM_LENGTH: f64 = 1.0;
    pub const DEFAULT_PRISM_HEIGHT: f64 = 1.0;
    pub const DEFAULT_PRISM_ANGLE: f64 = 45.0;

    pub fn cuboid(size: Vec3, center: Vec3, scale: f64, refining: u32) -> Self {
        Self::Cuboid {
            size,
            center,
            scale,
            refining,
        }
    }

    pub fn cylinder(start: Vec3, end: Vec3, radius: f64, resolution: u32) -> Self {
        Self::Cylinder {
            start,
            end,
            radius,
            resolution,
        }
    }

    pub fn sphere(center: Vec3, scale: f64, refining: u32) -> Self {
        Self::Sphere {
            center,
            scale,
            refining,
        }
    }

    pub fn pyramid(height: f64, width: f64, length: f64, center: Vec3, scale: f64) -> Self {
        Self::Pyramid {
            height,
            width,
            length,
            center,
            scale,
        }
    }

    pub fn prism(center: Vec3, length: f64, height: f64, angle: f64) -> Self {
        Self::Prism {
            center,
            length,
            height,
            angle,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Cuboid { .. } => ShapeKind::Cuboid,
            Self::Cylinder { .. } => ShapeKind::Cylinder,
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Pyramid { .. } => ShapeKind::Pyramid,
            Self::Prism { .. } => ShapeKind::Prism,
        }
    }

    /// Reject parameters that would produce a degenerate solid
    pub fn validate(&self, node: &str) -> CsgResult<()> {
        match self {
            Self::Cuboid { size, scale, .. } => {
                ensure_positive_vec(node, "size", size)?;
                ensure_positive(node, "scale", *scale)
            }
            Self::Cylinder {
                start,
                end,
                radius,
                resolution,
            } => {
                ensure_positive(node, "radius", *radius)?;
                if *resolution < 3 {
                    return Err(CsgError::degenerate(
                        node,
                        "resolution",
                        format!("at least 3 rim points are required, got {}", resolution),
                    ));
                }
                cylinder_axis(node, start, end).map(|_| ())
            }
            Self::Sphere { scale, .. } => ensure_positive(node, "scale", *scale),
            Self::Pyramid {
                height,
                width,
                length,
                scale,
                ..
            } => {
                ensure_positive(node, "height", *height)?;
                ensure_positive(node, "width", *width)?;
                ensure_positive(node, "length", *length)?;
                ensure_positive(node, "scale", *scale)
            }
            Self::Prism {
                length,
                height,
                angle,
                ..
            } => {
                ensure_positive(node, "length", *length)?;
                ensure_positive(node, "height", *height)?;
                if !(*angle > 0.0 && *angle < 180.0) {
                    return Err(CsgError::degenerate(
                        node,
                        "angle",
                        format!("wedge angle must lie in (0, 180) degrees, got {}", angle),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Generate the mesh for this primitive; `node` names it in errors
    pub fn to_mesh(&self, node: &str) -> CsgResult<Mesh> {
        self.validate(node)?;

        let mesh = match self {
            Self::Cuboid {
                size,
                center,
                scale,
                refining,
            } => generate_cuboid_mesh(size, center, *scale, *refining),
            Self::Cylinder {
                start,
                end,
                radius,
                resolution,
            } => {
                let axis = cylinder_axis(node, start, end)?;
                generate_cylinder_mesh(start, end, axis, *radius, *resolution)
            }
            Self::Sphere {
                center,
                scale,
                refining,
            } => generate_sphere_mesh(center, *scale, *refining),
            Self::Pyramid {
                height,
                width,
                length,
                center,
                scale,
            } => generate_pyramid_mesh(*height, *width, *length, center, *scale),
            Self::Prism {
                center,
                length,
                height,
                angle,
            } => generate_prism_mesh(center, *length, *height, *angle),
        };

        Ok(mesh)
    }
}

fn ensure_positive(node: &str, parameter: &str, value: f64) -> CsgResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CsgError::degenerate(
            node,
            parameter,
            format!("must be a positive finite number, got {}", value),
        ))
    }
}

fn ensure_positive_vec(node: &str, parameter: &str, value: &Vec3) -> CsgResult<()> {
    if value.iter().all(|c| c.is_finite() && *c > 0.0) {
        Ok(())
    } else {
        Err(CsgError::degenerate(
            node,
            parameter,
            format!(
                "every component must be positive, got [{}, {}, {}]",
                value.x, value.y, value.z
            ),
        ))
    }
}

/// Index of the single coordinate axis along which the cylinder runs
fn cylinder_axis(node: &str, start: &Vec3, end: &Vec3) -> CsgResult<usize> {
    let diff = end - start;
    let moving: Vec<usize> = (0..3).filter(|&k| diff[k] != 0.0).collect();
    match moving.as_slice() {
        [axis] => Ok(*axis),
        [] => Err(CsgError::degenerate(
            node,
            "end",
            "start and end coincide",
        )),
        _ => Err(CsgError::degenerate(
            node,
            "end",
            "start and end must differ along exactly one coordinate axis",
        )),
    }
}

/// Cuboid corner order; `scaleRectangleXZ` relies on the roles derived from it
const CUBOID_CORNERS: [[f64; 3]; 8] = [
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
];

const CUBOID_FACES: [[usize; 3]; 12] = [
    [3, 1, 0],
    [3, 2, 1],
    [4, 2, 3],
    [4, 5, 2],
    [4, 0, 7],
    [4, 3, 0],
    [7, 5, 4],
    [7, 6, 5],
    [0, 6, 7],
    [0, 1, 6],
    [6, 2, 5],
    [6, 1, 2],
];

fn generate_cuboid_mesh(size: &Vec3, center: &Vec3, scale: f64, refining: u32) -> Mesh {
    let half = size * (scale / 2.0);
    let vertices: Vec<Point3<f64>> = CUBOID_CORNERS
        .iter()
        .map(|c| Point3::from(Vector3::from(*c).component_mul(&half) + center))
        .collect();
    let triangles: Vec<Triangle> = CUBOID_FACES.iter().map(|f| Triangle::new(*f)).collect();

    if refining == 0 {
        let roles = (0..8u8).map(VertexRole::CuboidCorner).collect();
        return Mesh::from_parts(vertices, triangles).with_roles(roles);
    }

    let (vertices, triangles) = subdivide(vertices, triangles, refining, Midpoint::Linear);
    Mesh::from_parts(vertices, triangles)
}

/// Two in-plane directions `(u, v)` with `u x v` along the positive axis
fn cap_basis(axis: usize) -> (Vector3<f64>, Vector3<f64>) {
    match axis {
        0 => (Vector3::y(), Vector3::z()),
        1 => (Vector3::x(), -Vector3::z()),
        _ => (Vector3::x(), Vector3::y()),
    }
}

fn generate_cylinder_mesh(
    start: &Vec3,
    end: &Vec3,
    axis: usize,
    radius: f64,
    resolution: u32,
) -> Mesh {
    let n = resolution as usize;
    // The start cap sits at the lower coordinate so its fan faces point backwards
    let (low, high) = if start[axis] <= end[axis] {
        (start, end)
    } else {
        (end, start)
    };
    let (u, v) = cap_basis(axis);

    let mut vertices = Vec::with_capacity(2 * n + 2);
    let mut roles = Vec::with_capacity(2 * n + 2);
    for cap_center in [low, high] {
        vertices.push(Point3::from(*cap_center));
        roles.push(VertexRole::CapCenter);
        for i in 0..n {
            let phi = -2.0 * PI * i as f64 / n as f64;
            let offset = (u * phi.cos() + v * phi.sin()) * radius;
            vertices.push(Point3::from(cap_center + offset));
            roles.push(VertexRole::CapRim);
        }
    }

    // Rim indices are 1-based within each cap: start rim 1..=n, end rim n+2..=2n+1
    let end_center = n + 1;
    let mut triangles = Vec::with_capacity(4 * n);
    for i in 1..=n {
        let next = i % n + 1;
        triangles.push(Triangle::new([0, i, next]));
    }
    for i in 1..=n {
        let next = i % n + 1;
        triangles.push(Triangle::new([end_center, end_center + next, end_center + i]));
    }
    for i in 1..=n {
        let next = i % n + 1;
        triangles.push(Triangle::new([i, end_center + i, end_center + next]));
        triangles.push(Triangle::new([end_center + next, next, i]));
    }

    Mesh::from_parts(vertices, triangles).with_roles(roles)
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Radius of the icosahedron (and of the refined sphere) for a given scale
pub fn geodesic_radius(scale: f64) -> f64 {
    scale * (GOLDEN_RATIO * GOLDEN_RATIO + 1.0).sqrt()
}

fn generate_sphere_mesh(center: &Vec3, scale: f64, refining: u32) -> Mesh {
    let t = GOLDEN_RATIO;
    // Three orthogonal golden rectangles
    let base = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let vertices: Vec<Point3<f64>> = base
        .iter()
        .map(|p| Point3::from(Vector3::from(*p) * scale))
        .collect();
    let triangles: Vec<Triangle> = ICOSAHEDRON_FACES.iter().map(|f| Triangle::new(*f)).collect();

    let midpoint = Midpoint::Spherical {
        radius: geodesic_radius(scale),
    };
    let (vertices, triangles) = subdivide(vertices, triangles, refining, midpoint);

    let vertices = vertices.into_iter().map(|p| p + center).collect();
    Mesh::from_parts(vertices, triangles)
}

fn generate_pyramid_mesh(height: f64, width: f64, length: f64, center: &Vec3, scale: f64) -> Mesh {
    let base = [
        [-width, 0.0, -length],
        [width, 0.0, -length],
        [width, 0.0, length],
        [-width, 0.0, length],
        [0.0, height, 0.0],
    ];
    let vertices = base
        .iter()
        .map(|p| Point3::from(Vector3::from(*p) * (scale / 2.0) + center))
        .collect();
    let triangles = [[0, 4, 1], [2, 1, 4], [2, 4, 3], [0, 3, 4], [3, 1, 2], [3, 0, 1]]
        .into_iter()
        .map(Triangle::new)
        .collect();
    let roles = vec![
        VertexRole::BaseCorner,
        VertexRole::BaseCorner,
        VertexRole::BaseCorner,
        VertexRole::BaseCorner,
        VertexRole::Apex,
    ];

    Mesh::from_parts(vertices, triangles).with_roles(roles)
}

/// Base width of the wedge for a given height and opening angle
pub fn prism_width(height: f64, angle_degrees: f64) -> f64 {
    let half = (angle_degrees / 2.0).to_radians();
    2.0 * (height / half.cos()) * half.sin()
}

fn generate_prism_mesh(center: &Vec3, length: f64, height: f64, angle: f64) -> Mesh {
    let w = prism_width(height, angle);
    let (x, y, z) = (center.x, center.y, center.z);
    let vertices = vec![
        Point3::new(x - w / 2.0, y + length / 2.0, z + height / 2.0),
        Point3::new(x, y + length / 2.0, z - height / 2.0),
        Point3::new(x + w / 2.0, y + length / 2.0, z + height / 2.0),
        Point3::new(x + w / 2.0, y - length / 2.0, z + height / 2.0),
        Point3::new(x, y - length / 2.0, z - height / 2.0),
        Point3::new(x - w / 2.0, y - length / 2.0, z + height / 2.0),
    ];
    let triangles = [
        [0, 2, 1],
        [3, 5, 4],
        [0, 3, 2],
        [0, 5, 3],
        [1, 3, 4],
        [1, 2, 3],
        [0, 1, 4],
        [0, 4, 5],
    ]
    .into_iter()
    .map(Triangle::new)
    .collect();

    // Always exactly one pass
    let (vertices, triangles) = subdivide(vertices, triangles, 1, Midpoint::Linear);
    Mesh::from_parts(vertices, triangles)
}
