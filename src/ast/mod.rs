// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Abstract Syntax Tree module
//!
//! Declarations are read from a description, interpreted into typed nodes,
//! collected in a named graph and evaluated into meshes.

mod declaration;
mod evaluator;
mod graph;
mod node;
mod params;

pub use declaration::Declaration;
pub use evaluator::Evaluator;
pub use graph::{Graph, ReferencePolicy};
pub use node::{Node, NodeKind};
pub use params::{ParamReader, Params, Value};
