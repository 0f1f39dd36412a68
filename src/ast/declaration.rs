// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Untyped node declarations as read from a description

use super::Params;
use serde::{Deserialize, Serialize};

/// One `solid`, `unary_op` or `binary_op` entry, strings not yet interpreted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "declaration")]
pub enum Declaration {
    #[serde(rename = "solid")]
    Solid {
        name: String,
        shape: String,
        params: Params,
    },
    #[serde(rename = "unary_op")]
    Unary {
        name: String,
        op: String,
        operand: String,
        params: Params,
    },
    #[serde(rename = "binary_op")]
    Binary {
        name: String,
        op: String,
        lhs: String,
        rhs: String,
    },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Solid { name, .. }
            | Declaration::Unary { name, .. }
            | Declaration::Binary { name, .. } => name,
        }
    }

    pub fn solid(name: impl Into<String>, shape: impl Into<String>, params: Params) -> Self {
        Declaration::Solid {
            name: name.into(),
            shape: shape.into(),
            params,
        }
    }

    pub fn unary(
        name: impl Into<String>,
        op: impl Into<String>,
        operand: impl Into<String>,
        params: Params,
    ) -> Self {
        Declaration::Unary {
            name: name.into(),
            op: op.into(),
            operand: operand.into(),
            params,
        }
    }

    pub fn binary(
        name: impl Into<String>,
        op: impl Into<String>,
        lhs: impl Into<String>,
        rhs: impl Into<String>,
    ) -> Self {
        Declaration::Binary {
            name: name.into(),
            op: op.into(),
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }
}
