// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! AST Evaluator - converts graph nodes to geometry

use super::{Graph, NodeKind};
use crate::error::{CsgError, CsgResult};
use crate::geometry::{BooleanKernel, BooleanOp, BspKernel, Mesh};
use ahash::{AHashMap, AHashSet};
use std::sync::Arc;

/// Memoizing evaluator; every node is computed at most once
pub struct Evaluator {
    kernel: Arc<dyn BooleanKernel>,
    memo: AHashMap<String, Arc<Mesh>>,
    computed: usize,
}

impl Evaluator {
    pub fn new(kernel: Arc<dyn BooleanKernel>) -> Self {
        Self {
            kernel,
            memo: AHashMap::new(),
            computed: 0,
        }
    }

    pub fn kernel_name(&self) -> &str {
        self.kernel.name()
    }

    /// Mesh of `name`, computing it and its operands on first request
    pub fn evaluate(&mut self, graph: &Graph, name: &str) -> CsgResult<Arc<Mesh>> {
        if !graph.contains(name) {
            return Err(CsgError::UnknownNode(name.to_string()));
        }
        self.resolve(graph, name)
    }

    /// Evaluate the graph's output node
    pub fn evaluate_output(&mut self, graph: &Graph) -> CsgResult<Arc<Mesh>> {
        let name = graph.output_name().ok_or(CsgError::EmptyGraph)?;
        self.evaluate(graph, name)
    }

    /// Compute every node in declaration order
    pub fn evaluate_all(&mut self, graph: &Graph) -> CsgResult<()> {
        for node in graph.iter() {
            self.evaluate(graph, &node.name)?;
        }
        log::info!(
            "evaluated {} nodes ({} computed, {} booleans)",
            graph.len(),
            self.computed,
            self.kernel_name()
        );
        Ok(())
    }

    /// Number of node meshes computed so far
    pub fn computed_count(&self) -> usize {
        self.computed
    }

    pub fn cached(&self, name: &str) -> Option<Arc<Mesh>> {
        self.memo.get(name).cloned()
    }

    /// Depth-first walk over an explicit work stack
    ///
    /// A node is pushed once to schedule its operands and once more to be
    /// computed after them, so dependency depth never reaches the call stack.
    fn resolve<'a>(&mut self, graph: &'a Graph, target: &'a str) -> CsgResult<Arc<Mesh>> {
        let mut stack: Vec<(&'a str, bool)> = vec![(target, false)];
        let mut path: Vec<&'a str> = Vec::new();
        let mut on_path: AHashSet<&'a str> = AHashSet::new();

        while let Some((name, expanded)) = stack.pop() {
            if expanded {
                path.pop();
                on_path.remove(name);
                self.compute(graph, name)?;
                continue;
            }
            if self.memo.contains_key(name) {
                continue;
            }
            if on_path.contains(name) {
                let start = path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Err(CsgError::CycleDetected(cycle));
            }
            let node = graph
                .get(name)
                .ok_or_else(|| CsgError::UnknownNode(name.to_string()))?;

            path.push(name);
            on_path.insert(name);
            stack.push((name, true));
            for operand in node.kind.operands().into_iter().rev() {
                if !graph.contains(operand) {
                    return Err(CsgError::UndefinedReference {
                        node: name.to_string(),
                        operand: operand.to_string(),
                    });
                }
                if !self.memo.contains_key(operand) {
                    stack.push((operand, false));
                }
            }
        }

        self.memoized(target)
    }

    /// Build the mesh of `name`; its operands are already memoized
    fn compute(&mut self, graph: &Graph, name: &str) -> CsgResult<()> {
        let node = graph
            .get(name)
            .ok_or_else(|| CsgError::UnknownNode(name.to_string()))?;

        let mesh = match &node.kind {
            NodeKind::Primitive(primitive) => primitive.to_mesh(name)?,
            NodeKind::Unary { op, operand } => {
                let input = self.memoized(operand)?;
                op.apply(&input, name, operand)?
            }
            NodeKind::Binary { op, lhs, rhs } => {
                let a = self.memoized(lhs)?;
                let b = self.memoized(rhs)?;
                self.combine(name, *op, &a, &b)?
            }
        };

        log::debug!(
            "computed '{}': {} vertices, {} triangles",
            name,
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        self.memo.insert(name.to_string(), Arc::new(mesh));
        self.computed += 1;
        Ok(())
    }

    fn memoized(&self, name: &str) -> CsgResult<Arc<Mesh>> {
        self.memo
            .get(name)
            .cloned()
            .ok_or_else(|| CsgError::UnknownNode(name.to_string()))
    }

    fn combine(&self, node: &str, op: BooleanOp, a: &Mesh, b: &Mesh) -> CsgResult<Mesh> {
        let failure = |message: String| CsgError::BooleanOperation {
            node: node.to_string(),
            op: op.to_string(),
            message,
        };

        // Roles describe generator output; no kernel result keeps them
        let mesh = self
            .kernel
            .apply(op, a, b)
            .map_err(|e| failure(format!("{:#}", e)))?
            .without_roles();
        mesh.validate().map_err(|e| failure(e.to_string()))?;

        if mesh.is_empty() {
            log::warn!("{} '{}' produced an empty mesh", op, node);
        }
        Ok(mesh)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Arc::new(BspKernel::default()))
    }
}
