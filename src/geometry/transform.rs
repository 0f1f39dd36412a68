// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Affine operators applied to a mesh vertex buffer
//!
//! Every operator keeps the face buffer and vertex roles of its operand and
//! returns a new mesh with a freshly computed vertex buffer.

use super::{Mesh, Vec3, VertexRole};
use crate::error::{CsgError, CsgResult};
use nalgebra::{Matrix4, Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cuboid corners moved by `scaleRectangleXZ`
pub const RECTANGLE_XZ_CORNERS: [u8; 4] = [1, 3, 4, 6];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(&self) -> Unit<Vector3<f64>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }
}

/// Unary operator names accepted by `unary_op` declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOpKind {
    Translate,
    RotateX,
    RotateY,
    RotateZ,
    Scale,
    ScaleRectangleXZ,
}

impl FromStr for UnaryOpKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "translate" => Ok(Self::Translate),
            "rotateX" => Ok(Self::RotateX),
            "rotateY" => Ok(Self::RotateY),
            "rotateZ" => Ok(Self::RotateZ),
            "scale" => Ok(Self::Scale),
            "scaleRectangleXZ" => Ok(Self::ScaleRectangleXZ),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for UnaryOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Translate => "translate",
            Self::RotateX => "rotateX",
            Self::RotateY => "rotateY",
            Self::RotateZ => "rotateZ",
            Self::Scale => "scale",
            Self::ScaleRectangleXZ => "scaleRectangleXZ",
        };
        f.write_str(name)
    }
}

/// Transformation operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransformOp {
    Translate(Vec3),
    /// Rotation in degrees about the operand's own centroid
    Rotate { axis: Axis, degrees: f64 },
    /// Component-wise scale about the origin
    Scale(Vec3),
    ScaleRectangleXZ(Vec3),
}

impl TransformOp {
    pub fn kind(&self) -> UnaryOpKind {
        match self {
            TransformOp::Translate(_) => UnaryOpKind::Translate,
            TransformOp::Rotate { axis: Axis::X, .. } => UnaryOpKind::RotateX,
            TransformOp::Rotate { axis: Axis::Y, .. } => UnaryOpKind::RotateY,
            TransformOp::Rotate { axis: Axis::Z, .. } => UnaryOpKind::RotateZ,
            TransformOp::Scale(_) => UnaryOpKind::Scale,
            TransformOp::ScaleRectangleXZ(_) => UnaryOpKind::ScaleRectangleXZ,
        }
    }

    /// Apply to `mesh`; `node` and `operand` only name things in errors
    pub fn apply(&self, mesh: &Mesh, node: &str, operand: &str) -> CsgResult<Mesh> {
        match self {
            TransformOp::Translate(d) => Ok(translate(mesh, d)),
            TransformOp::Rotate { axis, degrees } => Ok(rotate(mesh, *axis, *degrees)),
            TransformOp::Scale(s) => Ok(scale(mesh, s)),
            TransformOp::ScaleRectangleXZ(s) => scale_rectangle_xz(mesh, s).ok_or_else(|| {
                CsgError::IncompatibleOperand {
                    node: node.to_string(),
                    operand: operand.to_string(),
                    reason: "scaleRectangleXZ needs an unrefined cuboid".to_string(),
                }
            }),
        }
    }
}

pub fn translate(mesh: &Mesh, d: &Vec3) -> Mesh {
    mesh.map_vertices(|_, v| v + d)
}

/// Rotation matrix about `pivot`
pub fn rotation_about(pivot: &Vec3, axis: Axis, degrees: f64) -> Matrix4<f64> {
    let rotation = Rotation3::from_axis_angle(&axis.unit(), degrees.to_radians());
    Matrix4::new_translation(pivot) * rotation.to_homogeneous() * Matrix4::new_translation(&-pivot)
}

pub fn rotate(mesh: &Mesh, axis: Axis, degrees: f64) -> Mesh {
    let matrix = rotation_about(&mesh.centroid().coords, axis, degrees);
    let index = match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
    };
    mesh.map_vertices(|_, v| {
        let mut rotated = matrix.transform_point(v);
        // The axis coordinate never changes
        rotated[index] = v[index];
        rotated
    })
}

pub fn scale(mesh: &Mesh, s: &Vec3) -> Mesh {
    mesh.map_vertices(|_, v| v.coords.component_mul(s).into())
}

/// `None` when the mesh carries no cuboid corner roles
pub fn scale_rectangle_xz(mesh: &Mesh, s: &Vec3) -> Option<Mesh> {
    let roles = mesh.roles()?;
    let selected = |role: &VertexRole| {
        matches!(role, VertexRole::CuboidCorner(i) if RECTANGLE_XZ_CORNERS.contains(i))
    };
    if !roles.iter().any(selected) {
        return None;
    }
    Some(mesh.map_vertices(|i, v| {
        if selected(&roles[i]) {
            v.coords.component_mul(s).into()
        } else {
            *v
        }
    }))
}
