// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error taxonomy for graph construction and evaluation
//!
//! Every variant names the offending node and, where one is involved, the
//! offending parameter. Nothing in the library recovers from these silently.

use thiserror::Error;

/// Result alias used throughout the modeling core
pub type CsgResult<T> = std::result::Result<T, CsgError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CsgError {
    /// Malformed description text
    #[error("parse error: {0}")]
    Parse(String),

    #[error("node '{node}' is missing required parameter '{parameter}'")]
    MissingParameter { node: String, parameter: String },

    /// A vector parameter did not have exactly 3 components
    #[error("node '{node}': parameter '{parameter}' must have 3 components, got {found}")]
    Dimension {
        node: String,
        parameter: String,
        found: usize,
    },

    #[error("node '{0}' is already declared")]
    DuplicateName(String),

    #[error("node '{node}' references undeclared operand '{operand}'")]
    UndefinedReference { node: String, operand: String },

    #[error("node '{node}': unsupported shape '{shape}'")]
    UnsupportedShape { node: String, shape: String },

    #[error("node '{node}': unsupported operator '{op}'")]
    UnsupportedOperator { node: String, op: String },

    #[error("node '{node}': degenerate geometry for '{parameter}': {reason}")]
    DegenerateGeometry {
        node: String,
        parameter: String,
        reason: String,
    },

    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// No node declared, so there is no output to evaluate
    #[error("graph declares no nodes")]
    EmptyGraph,

    /// Reference chain that loops back on itself; the path ends where it started
    #[error("cycle detected: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),

    /// Operand mesh lacks the structure an operator relies on
    #[error("node '{node}': operand '{operand}' is incompatible: {reason}")]
    IncompatibleOperand {
        node: String,
        operand: String,
        reason: String,
    },

    #[error("malformed mesh: {0}")]
    MalformedMesh(String),

    /// Sampled distance grids combined over different lattices
    #[error("sampling grids differ: {0}")]
    GridMismatch(String),

    /// Opaque failure surfaced from the boolean kernel
    #[error("node '{node}': boolean {op} failed: {message}")]
    BooleanOperation {
        node: String,
        op: String,
        message: String,
    },
}

impl CsgError {
    pub(crate) fn degenerate(node: &str, parameter: &str, reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            node: node.to_string(),
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(node: &str, parameter: &str) -> Self {
        Self::MissingParameter {
            node: node.to_string(),
            parameter: parameter.to_string(),
        }
    }
}
