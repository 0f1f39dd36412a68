// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Solidgraph procedural modeling kernel
//!
//! Evaluates a declarative graph of named primitives, affine transforms and
//! boolean combinations into a single triangle mesh.

pub mod ast;
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod kernel;

pub use ast::{Declaration, Evaluator, Graph, Node, NodeKind, Params, ReferencePolicy, Value};
pub use config::RenderConfig;
pub use error::{CsgError, CsgResult};
pub use geometry::{BooleanKernel, BooleanOp, BspKernel, Mesh, Primitive, TransformOp};
pub use io::{export_stl, import_description, parse_description, Description, StlEncoding};
pub use kernel::Kernel;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Main entry point for rendering an XML description to a mesh
pub fn render(source: &str) -> Result<Arc<Mesh>> {
    let description = parse_description(source)?;
    let mut kernel = Kernel::from_description(&description, &RenderConfig::default())?;
    Ok(kernel.render()?)
}

/// Render a description file to a mesh
pub fn render_file(path: impl AsRef<Path>) -> Result<Arc<Mesh>> {
    let description = import_description(path)?;
    let mut kernel = Kernel::from_description(&description, &RenderConfig::default())?;
    Ok(kernel.render()?)
}
