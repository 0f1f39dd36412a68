// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operator adapter
//!
//! The evaluator hands two well-formed meshes to a [`BooleanKernel`] and gets
//! one mesh back. Which kernel does the work is decided by whoever constructs
//! the evaluator; [`BspKernel`] is the built-in default.

use super::{Mesh, Triangle};
use ahash::AHashMap;
use anyhow::{bail, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    Union,
    Intersection,
    Difference,
}

impl FromStr for BooleanOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(Self::Union),
            "intersection" => Ok(Self::Intersection),
            "difference" => Ok(Self::Difference),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Union => "union",
            Self::Intersection => "intersection",
            Self::Difference => "difference",
        };
        f.write_str(name)
    }
}

/// Set-theoretic combination of two closed triangle meshes
///
/// Watertightness and robustness of the result are the kernel's business.
/// Errors are opaque to the caller and reported against the node that asked
/// for the operation.
pub trait BooleanKernel: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, op: BooleanOp, a: &Mesh, b: &Mesh) -> Result<Mesh>;
}

/// CSG on BSP trees with polygon splitting
#[derive(Debug, Clone)]
pub struct BspKernel {
    epsilon: f64,
}

impl BspKernel {
    pub const DEFAULT_EPSILON: f64 = 1e-5;

    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for BspKernel {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EPSILON)
    }
}

impl BooleanKernel for BspKernel {
    fn name(&self) -> &str {
        "bsp"
    }

    fn apply(&self, op: BooleanOp, a: &Mesh, b: &Mesh) -> Result<Mesh> {
        if !(self.epsilon > 0.0) {
            bail!("plane epsilon must be positive, got {}", self.epsilon);
        }

        // Empty operands short-circuit; an empty BSP tree clips nothing
        match (op, a.is_empty(), b.is_empty()) {
            (BooleanOp::Union, true, _) => return Ok(b.clone()),
            (BooleanOp::Union, _, true) | (BooleanOp::Difference, _, true) => return Ok(a.clone()),
            (BooleanOp::Difference, true, _) | (BooleanOp::Intersection, true, _) | (BooleanOp::Intersection, _, true) => {
                return Ok(Mesh::empty())
            }
            _ => {}
        }

        let eps = self.epsilon;
        let mut tree_a = BspNode::new(mesh_to_polygons(a), eps);
        let mut tree_b = BspNode::new(mesh_to_polygons(b), eps);

        match op {
            BooleanOp::Union => {
                tree_a.clip_to(&tree_b);
                tree_b.clip_to(&tree_a);
                tree_b.invert();
                tree_b.clip_to(&tree_a);
                tree_b.invert();
                tree_a.build(tree_b.all_polygons());
            }
            BooleanOp::Difference => {
                tree_a.invert();
                tree_a.clip_to(&tree_b);
                tree_b.clip_to(&tree_a);
                tree_b.invert();
                tree_b.clip_to(&tree_a);
                tree_b.invert();
                tree_a.build(tree_b.all_polygons());
                tree_a.invert();
            }
            BooleanOp::Intersection => {
                tree_a.invert();
                tree_b.clip_to(&tree_a);
                tree_b.invert();
                tree_a.clip_to(&tree_b);
                tree_b.clip_to(&tree_a);
                tree_a.build(tree_b.all_polygons());
                tree_a.invert();
            }
        }

        polygons_to_mesh(&tree_a.all_polygons())
    }
}

#[derive(Debug, Clone, Copy)]
struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Coplanar = 0,
    Front = 1,
    Back = 2,
    Spanning = 3,
}

impl Side {
    fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Side::Coplanar,
            1 => Side::Front,
            2 => Side::Back,
            _ => Side::Spanning,
        }
    }
}

/// Destination buckets for [`Plane::split_polygon`]
#[derive(Default)]
struct Split {
    coplanar_front: Vec<Polygon>,
    coplanar_back: Vec<Polygon>,
    front: Vec<Polygon>,
    back: Vec<Polygon>,
}

impl Plane {
    fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a));
        let length = normal.norm();
        if length <= f64::EPSILON {
            return None;
        }
        let normal = normal / length;
        Some(Self {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    fn side_of(&self, point: &Point3<f64>, eps: f64) -> Side {
        let t = self.normal.dot(&point.coords) - self.w;
        if t < -eps {
            Side::Back
        } else if t > eps {
            Side::Front
        } else {
            Side::Coplanar
        }
    }

    fn split_polygon(&self, polygon: Polygon, eps: f64, out: &mut Split) {
        let sides: Vec<Side> = polygon
            .vertices
            .iter()
            .map(|v| self.side_of(v, eps))
            .collect();
        let combined = Side::from_bits(sides.iter().fold(0u8, |acc, s| acc | *s as u8));

        match combined {
            Side::Coplanar => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    out.coplanar_front.push(polygon);
                } else {
                    out.coplanar_back.push(polygon);
                }
            }
            Side::Front => out.front.push(polygon),
            Side::Back => out.back.push(polygon),
            Side::Spanning => {
                let n = polygon.vertices.len();
                let mut front = Vec::with_capacity(n + 1);
                let mut back = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (si, sj) = (sides[i], sides[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                    if si != Side::Back {
                        front.push(vi);
                    }
                    if si != Side::Front {
                        back.push(vi);
                    }
                    if (si as u8 | sj as u8) == Side::Spanning as u8 {
                        let t = (self.w - self.normal.dot(&vi.coords))
                            / self.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        front.push(v);
                        back.push(v);
                    }
                }
                if front.len() >= 3 {
                    out.front.push(Polygon::with_plane(front, polygon.plane));
                }
                if back.len() >= 3 {
                    out.back.push(Polygon::with_plane(back, polygon.plane));
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Polygon {
    vertices: Vec<Point3<f64>>,
    plane: Plane,
}

impl Polygon {
    fn with_plane(vertices: Vec<Point3<f64>>, plane: Plane) -> Self {
        Self { vertices, plane }
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

/// BSP tree node for CSG operations
#[derive(Debug, Default)]
struct BspNode {
    plane: Option<Plane>,
    front: Option<Box<BspNode>>,
    back: Option<Box<BspNode>>,
    polygons: Vec<Polygon>,
    eps: f64,
}

impl BspNode {
    fn new(polygons: Vec<Polygon>, eps: f64) -> Self {
        let mut node = Self::empty(eps);
        node.build(polygons);
        node
    }

    fn empty(eps: f64) -> Self {
        Self {
            eps,
            ..Default::default()
        }
    }

    fn build(&mut self, polygons: Vec<Polygon>) {
        let Some(first) = polygons.first() else {
            return;
        };
        let plane = *self.plane.get_or_insert(first.plane);

        let mut split = Split::default();
        for polygon in polygons {
            plane.split_polygon(polygon, self.eps, &mut split);
        }
        self.polygons.append(&mut split.coplanar_front);
        self.polygons.append(&mut split.coplanar_back);

        let eps = self.eps;
        if !split.front.is_empty() {
            self.front
                .get_or_insert_with(|| Box::new(BspNode::empty(eps)))
                .build(split.front);
        }
        if !split.back.is_empty() {
            self.back
                .get_or_insert_with(|| Box::new(BspNode::empty(eps)))
                .build(split.back);
        }
    }

    /// Turn solid space into empty space and vice versa
    fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` that lie inside this tree
    fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = self.plane else {
            return polygons;
        };

        let mut split = Split::default();
        for polygon in polygons {
            plane.split_polygon(polygon, self.eps, &mut split);
        }
        let mut front = split.front;
        front.append(&mut split.coplanar_front);
        let mut back = split.back;
        back.append(&mut split.coplanar_back);

        let mut result = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        if let Some(node) = &self.back {
            result.extend(node.clip_polygons(back));
        }
        result
    }

    fn clip_to(&mut self, other: &BspNode) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = self.polygons.clone();
        if let Some(front) = &self.front {
            result.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            result.extend(back.all_polygons());
        }
        result
    }
}

/// Convert mesh to polygons, dropping zero-area faces
fn mesh_to_polygons(mesh: &Mesh) -> Vec<Polygon> {
    mesh.triangles()
        .iter()
        .filter_map(|tri| {
            let [a, b, c] = mesh.triangle_positions(tri);
            Plane::from_points(&a, &b, &c).map(|plane| Polygon::with_plane(vec![a, b, c], plane))
        })
        .collect()
}

/// Bit-exact position key; `-0.0` and `0.0` weld together
fn position_key(p: &Point3<f64>) -> [u64; 3] {
    [p.x, p.y, p.z].map(|c| if c == 0.0 { 0.0f64.to_bits() } else { c.to_bits() })
}

/// Fan-triangulate polygons into a welded mesh
fn polygons_to_mesh(polygons: &[Polygon]) -> Result<Mesh> {
    let mut lookup: AHashMap<[u64; 3], usize> = AHashMap::new();
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();

    let mut index_of = |p: &Point3<f64>, vertices: &mut Vec<Point3<f64>>| {
        *lookup.entry(position_key(p)).or_insert_with(|| {
            vertices.push(*p);
            vertices.len() - 1
        })
    };

    for polygon in polygons {
        let ids: Vec<usize> = polygon
            .vertices
            .iter()
            .map(|p| index_of(p, &mut vertices))
            .collect();
        for k in 1..ids.len().saturating_sub(1) {
            let tri = [ids[0], ids[k], ids[k + 1]];
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                continue;
            }
            let normal = (vertices[tri[1]] - vertices[tri[0]]).cross(&(vertices[tri[2]] - vertices[tri[0]]));
            if normal.norm() <= f64::EPSILON {
                continue;
            }
            triangles.push(Triangle::new(tri));
        }
    }

    Ok(Mesh::from_buffers(vertices, triangles)?)
}
