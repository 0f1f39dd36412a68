// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! AST Node definitions

use super::{Declaration, Params};
use crate::error::{CsgError, CsgResult};
use crate::geometry::{Axis, BooleanOp, Primitive, ShapeKind, TransformOp, UnaryOpKind, Vec3};
use serde::{Deserialize, Serialize};

/// Named node of the modeling graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Interpret a raw declaration into a typed node
    ///
    /// Shape and operator names are resolved and every parameter is read and
    /// validated here, so a node that exists is always evaluable up to its
    /// operands.
    pub fn from_declaration(decl: &Declaration) -> CsgResult<Self> {
        let kind = match decl {
            Declaration::Solid {
                name,
                shape,
                params,
            } => {
                let shape = shape
                    .parse::<ShapeKind>()
                    .map_err(|shape| CsgError::UnsupportedShape {
                        node: name.clone(),
                        shape,
                    })?;
                let primitive = primitive_from_params(name, shape, params)?;
                primitive.validate(name)?;
                NodeKind::Primitive(primitive)
            }
            Declaration::Unary {
                name,
                op,
                operand,
                params,
            } => {
                let kind = op
                    .parse::<UnaryOpKind>()
                    .map_err(|op| CsgError::UnsupportedOperator {
                        node: name.clone(),
                        op,
                    })?;
                NodeKind::Unary {
                    op: transform_from_params(name, kind, params)?,
                    operand: operand.clone(),
                }
            }
            Declaration::Binary { name, op, lhs, rhs } => {
                let op = op
                    .parse::<BooleanOp>()
                    .map_err(|op| CsgError::UnsupportedOperator {
                        node: name.clone(),
                        op,
                    })?;
                NodeKind::Binary {
                    op,
                    lhs: lhs.clone(),
                    rhs: rhs.clone(),
                }
            }
        };

        Ok(Node::new(decl.name(), kind))
    }
}

/// Types of AST nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Primitive(Primitive),
    Unary {
        op: TransformOp,
        operand: String,
    },
    Binary {
        op: BooleanOp,
        lhs: String,
        rhs: String,
    },
}

impl NodeKind {
    /// Names this node depends on, in evaluation order
    pub fn operands(&self) -> Vec<&str> {
        match self {
            NodeKind::Primitive(_) => Vec::new(),
            NodeKind::Unary { operand, .. } => vec![operand],
            NodeKind::Binary { lhs, rhs, .. } => vec![lhs, rhs],
        }
    }
}

fn primitive_from_params(node: &str, shape: ShapeKind, params: &Params) -> CsgResult<Primitive> {
    let p = params.reader(node);
    let primitive = match shape {
        ShapeKind::Cuboid => {
            p.only(&["size", "center", "scale", "refining"])?;
            Primitive::cuboid(
                p.vec3("size")?,
                p.vec3_or("center", Vec3::zeros())?,
                p.scalar_or("scale", Primitive::DEFAULT_SCALE)?,
                p.count_or("refining", Primitive::DEFAULT_CUBOID_REFINING)?,
            )
        }
        ShapeKind::Cylinder => {
            p.only(&["start", "end", "radius", "resolution"])?;
            Primitive::cylinder(
                p.vec3("start")?,
                p.vec3("end")?,
                p.scalar_or("radius", Primitive::DEFAULT_RADIUS)?,
                p.count_or("resolution", Primitive::DEFAULT_RESOLUTION)?,
            )
        }
        ShapeKind::Sphere => {
            p.only(&["center", "scale", "refining"])?;
            Primitive::sphere(
                p.vec3_or("center", Vec3::zeros())?,
                p.scalar_or("scale", Primitive::DEFAULT_SCALE)?,
                p.count_or("refining", Primitive::DEFAULT_SPHERE_REFINING)?,
            )
        }
        ShapeKind::Pyramid => {
            p.only(&["height", "width", "length", "center", "scale"])?;
            Primitive::pyramid(
                p.scalar("height")?,
                p.scalar("width")?,
                p.scalar("length")?,
                p.vec3_or("center", Vec3::zeros())?,
                p.scalar_or("scale", Primitive::DEFAULT_SCALE)?,
            )
        }
        ShapeKind::Prism => {
            p.only(&["center", "length", "height", "angle"])?;
            Primitive::prism(
                p.vec3_or("center", Vec3::zeros())?,
                p.scalar_or("length", Primitive::DEFAULT_PRISM_LENGTH)?,
                p.scalar_or("height", Primitive::DEFAULT_PRISM_HEIGHT)?,
                p.scalar_or("angle", Primitive::DEFAULT_PRISM_ANGLE)?,
            )
        }
    };
    Ok(primitive)
}

fn transform_from_params(node: &str, kind: UnaryOpKind, params: &Params) -> CsgResult<TransformOp> {
    let p = params.reader(node);
    let rotate = |axis: Axis| -> CsgResult<TransformOp> {
        p.only(&["rotation"])?;
        Ok(TransformOp::Rotate {
            axis,
            degrees: p.scalar("rotation")?,
        })
    };
    match kind {
        UnaryOpKind::Translate => {
            p.only(&["distance"])?;
            Ok(TransformOp::Translate(p.vec3("distance")?))
        }
        UnaryOpKind::RotateX => rotate(Axis::X),
        UnaryOpKind::RotateY => rotate(Axis::Y),
        UnaryOpKind::RotateZ => rotate(Axis::Z),
        UnaryOpKind::Scale => {
            p.only(&["scale"])?;
            Ok(TransformOp::Scale(p.factor("scale")?))
        }
        UnaryOpKind::ScaleRectangleXZ => {
            p.only(&["scale"])?;
            Ok(TransformOp::ScaleRectangleXZ(p.factor("scale")?))
        }
    }
}
