// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel API: a graph, its evaluator and the boolean kernel behind it

use crate::ast::{Declaration, Evaluator, Graph, Node, ReferencePolicy};
use crate::config::RenderConfig;
use crate::error::CsgResult;
use crate::geometry::{BooleanKernel, Mesh};
use crate::io::Description;
use std::sync::Arc;

/// Main kernel for rendering a description
pub struct Kernel {
    graph: Graph,
    evaluator: Evaluator,
}

impl Kernel {
    /// Create an empty kernel
    pub fn new(policy: ReferencePolicy, boolean: Arc<dyn BooleanKernel>) -> Self {
        Self {
            graph: Graph::new(policy),
            evaluator: Evaluator::new(boolean),
        }
    }

    pub fn with_config(config: &RenderConfig) -> Self {
        Self::new(config.reference_policy, config.boolean_kernel())
    }

    /// Declare every node of `description` and apply its output designation
    pub fn from_description(description: &Description, config: &RenderConfig) -> CsgResult<Self> {
        let mut graph = Graph::from_declarations(&description.declarations, config.reference_policy)?;
        if let Some(output) = &description.output {
            graph.designate_output(output)?;
        }
        Ok(Self {
            graph,
            evaluator: Evaluator::new(config.boolean_kernel()),
        })
    }

    pub fn declare(&mut self, decl: &Declaration) -> CsgResult<()> {
        self.graph.insert(Node::from_declaration(decl)?)
    }

    pub fn designate_output(&mut self, name: &str) -> CsgResult<()> {
        self.graph.designate_output(name)
    }

    /// Render the output node
    pub fn render(&mut self) -> CsgResult<Arc<Mesh>> {
        self.check()?;
        self.evaluator.evaluate_output(&self.graph)
    }

    /// Render a specific node
    pub fn render_node(&mut self, name: &str) -> CsgResult<Arc<Mesh>> {
        self.check()?;
        self.evaluator.evaluate(&self.graph, name)
    }

    /// Render every declared node
    pub fn render_all(&mut self) -> CsgResult<()> {
        self.check()?;
        self.evaluator.evaluate_all(&self.graph)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn computed_count(&self) -> usize {
        self.evaluator.computed_count()
    }

    fn check(&self) -> CsgResult<()> {
        // Strict graphs are acyclic and resolved by construction
        match self.graph.policy() {
            ReferencePolicy::Strict => Ok(()),
            ReferencePolicy::Deferred => self.graph.validate(),
        }
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::with_config(&RenderConfig::default())
    }
}
