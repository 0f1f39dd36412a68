// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation and operations

pub mod analytics;
mod bbox;
pub mod boolean;
mod mesh;
pub mod primitives;
pub mod sdf;
pub mod subdivision;
pub mod transform;

/// Component-wise parameter vector used by primitives and operators
pub type Vec3 = nalgebra::Vector3<f64>;

pub use analytics::{analyze, GeometryStats};
pub use bbox::BoundingBox;
pub use boolean::{BooleanKernel, BooleanOp, BspKernel};
pub use mesh::{Mesh, Triangle, VertexRole};
pub use primitives::{Primitive, ShapeKind};
pub use sdf::{Grid, Sdf};
pub use subdivision::Midpoint;
pub use transform::{Axis, TransformOp, UnaryOpKind};
