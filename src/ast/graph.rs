// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Named node graph built from declarations

use super::{Declaration, Node, NodeKind};
use crate::error::{CsgError, CsgResult};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When operand references are checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// Operands must be declared before use; cycles cannot form
    #[default]
    Strict,
    /// Forward references allowed; call [`Graph::validate`] before evaluating
    Deferred,
}

impl FromStr for ReferencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "deferred" => Ok(Self::Deferred),
            other => Err(format!("unknown reference policy '{}'", other)),
        }
    }
}

impl fmt::Display for ReferencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Deferred => f.write_str("deferred"),
        }
    }
}

/// Insertion-ordered mapping from name to node, plus the output designation
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: AHashMap<String, usize>,
    output: Option<String>,
    policy: ReferencePolicy,
}

impl Graph {
    pub fn new(policy: ReferencePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Convert and declare every declaration in order
    pub fn from_declarations<'a, I>(decls: I, policy: ReferencePolicy) -> CsgResult<Self>
    where
        I: IntoIterator<Item = &'a Declaration>,
    {
        let mut graph = Self::new(policy);
        for decl in decls {
            graph.insert(Node::from_declaration(decl)?)?;
        }
        Ok(graph)
    }

    pub fn declare(&mut self, name: impl Into<String>, kind: NodeKind) -> CsgResult<()> {
        self.insert(Node::new(name, kind))
    }

    pub fn insert(&mut self, node: Node) -> CsgResult<()> {
        if self.index.contains_key(&node.name) {
            return Err(CsgError::DuplicateName(node.name));
        }
        if let NodeKind::Primitive(primitive) = &node.kind {
            primitive.validate(&node.name)?;
        }
        if self.policy == ReferencePolicy::Strict {
            if let Some(missing) = node.kind.operands().into_iter().find(|o| !self.contains(o)) {
                return Err(CsgError::UndefinedReference {
                    node: node.name.clone(),
                    operand: missing.to_string(),
                });
            }
        }

        log::trace!("declared node '{}'", node.name);
        self.index.insert(node.name.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Make `name` the output instead of the last declared node
    pub fn designate_output(&mut self, name: &str) -> CsgResult<()> {
        if !self.contains(name) {
            return Err(CsgError::UnknownNode(name.to_string()));
        }
        self.output = Some(name.to_string());
        Ok(())
    }

    /// Explicit output if designated, else the last declared node
    pub fn output_name(&self) -> Option<&str> {
        self.output
            .as_deref()
            .or_else(|| self.nodes.last().map(|n| n.name.as_str()))
    }

    /// Check every reference resolves and no node depends on itself
    pub fn validate(&self) -> CsgResult<()> {
        for node in &self.nodes {
            for operand in node.kind.operands() {
                if !self.contains(operand) {
                    return Err(CsgError::UndefinedReference {
                        node: node.name.clone(),
                        operand: operand.to_string(),
                    });
                }
            }
        }

        let mut finished: AHashSet<&str> = AHashSet::new();
        for root in &self.nodes {
            self.check_acyclic(&root.name, &mut finished)?;
        }
        Ok(())
    }

    /// Iterative depth-first search from `root`, skipping `finished` nodes
    fn check_acyclic<'a>(&'a self, root: &'a str, finished: &mut AHashSet<&'a str>) -> CsgResult<()> {
        let mut stack: Vec<(&'a str, bool)> = vec![(root, false)];
        let mut path: Vec<&'a str> = Vec::new();
        let mut on_path: AHashSet<&'a str> = AHashSet::new();

        while let Some((name, expanded)) = stack.pop() {
            if expanded {
                path.pop();
                on_path.remove(name);
                finished.insert(name);
                continue;
            }
            if finished.contains(name) {
                continue;
            }
            if on_path.contains(name) {
                let start = path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Err(CsgError::CycleDetected(cycle));
            }

            path.push(name);
            on_path.insert(name);
            stack.push((name, true));
            if let Some(node) = self.get(name) {
                for operand in node.kind.operands().into_iter().rev() {
                    if !finished.contains(operand) {
                        stack.push((operand, false));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Nodes in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn policy(&self) -> ReferencePolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BooleanOp, Primitive, TransformOp, Vec3};

    fn cube() -> NodeKind {
        NodeKind::Primitive(Primitive::cuboid(Vec3::repeat(1.0), Vec3::zeros(), 1.0, 0))
    }

    fn moved(operand: &str) -> NodeKind {
        NodeKind::Unary {
            op: TransformOp::Translate(Vec3::new(1.0, 0.0, 0.0)),
            operand: operand.to_string(),
        }
    }

    #[test]
    fn test_duplicate_name() {
        let mut graph = Graph::default();
        graph.declare("a", cube()).unwrap();
        assert_eq!(graph.declare("a", cube()), Err(CsgError::DuplicateName("a".into())));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_strict_rejects_forward_reference() {
        let mut graph = Graph::new(ReferencePolicy::Strict);
        let err = graph.declare("b", moved("a")).unwrap_err();
        assert_eq!(
            err,
            CsgError::UndefinedReference {
                node: "b".into(),
                operand: "a".into()
            }
        );
        assert!(graph.is_empty());
    }

    #[test]
    fn test_strict_rejects_self_reference() {
        let mut graph = Graph::new(ReferencePolicy::Strict);
        assert!(matches!(
            graph.declare("a", moved("a")),
            Err(CsgError::UndefinedReference { .. })
        ));
    }

    #[test]
    fn test_deferred_allows_forward_reference() {
        let mut graph = Graph::new(ReferencePolicy::Deferred);
        graph.declare("b", moved("a")).unwrap();
        graph.declare("a", cube()).unwrap();
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_deferred_undefined_reference() {
        let mut graph = Graph::new(ReferencePolicy::Deferred);
        graph.declare("b", moved("ghost")).unwrap();
        assert_eq!(
            graph.validate(),
            Err(CsgError::UndefinedReference {
                node: "b".into(),
                operand: "ghost".into()
            })
        );
    }

    #[test]
    fn test_deferred_cycle() {
        let mut graph = Graph::new(ReferencePolicy::Deferred);
        graph.declare("a", moved("c")).unwrap();
        graph.declare("b", moved("a")).unwrap();
        graph
            .declare(
                "c",
                NodeKind::Binary {
                    op: BooleanOp::Union,
                    lhs: "b".into(),
                    rhs: "b".into(),
                },
            )
            .unwrap();
        assert_eq!(
            graph.validate(),
            Err(CsgError::CycleDetected(vec![
                "a".into(),
                "c".into(),
                "b".into(),
                "a".into()
            ]))
        );
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut graph = Graph::default();
        graph.declare("base", cube()).unwrap();
        graph.declare("left", moved("base")).unwrap();
        graph
            .declare(
                "both",
                NodeKind::Binary {
                    op: BooleanOp::Union,
                    lhs: "left".into(),
                    rhs: "base".into(),
                },
            )
            .unwrap();
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_output_designation() {
        let mut graph = Graph::default();
        assert_eq!(graph.output_name(), None);
        graph.declare("a", cube()).unwrap();
        graph.declare("b", moved("a")).unwrap();
        assert_eq!(graph.output_name(), Some("b"));
        graph.designate_output("a").unwrap();
        assert_eq!(graph.output_name(), Some("a"));
        assert_eq!(
            graph.designate_output("zzz"),
            Err(CsgError::UnknownNode("zzz".into()))
        );
    }

    #[test]
    fn test_declare_rejects_degenerate_primitive() {
        let mut graph = Graph::default();
        graph.declare("base", cube()).unwrap();
        let wedge = NodeKind::Primitive(Primitive::prism(Vec3::zeros(), 1.0, 1.0, 180.0));

        let err = graph.declare("wedge", wedge).unwrap_err();
        assert!(matches!(err, CsgError::DegenerateGeometry { ref node, .. } if node == "wedge"));
        assert!(!graph.contains("wedge"));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_validate_long_forward_chain() {
        const LENGTH: usize = 100_000;
        let mut graph = Graph::new(ReferencePolicy::Deferred);
        for i in 0..LENGTH {
            graph.declare(format!("n{}", i), moved(&format!("n{}", i + 1))).unwrap();
        }
        graph.declare(format!("n{}", LENGTH), cube()).unwrap();
        graph.validate().unwrap();

        // Closing the chain into a loop is reported without exhausting the stack
        let mut looped = Graph::new(ReferencePolicy::Deferred);
        for i in 0..LENGTH {
            looped.declare(format!("n{}", i), moved(&format!("n{}", (i + 1) % LENGTH))).unwrap();
        }
        match looped.validate() {
            Err(CsgError::CycleDetected(path)) => {
                assert_eq!(path.len(), LENGTH + 1);
                assert_eq!(path.first(), path.last());
            }
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_policy_names() {
        assert_eq!("Deferred".parse::<ReferencePolicy>(), Ok(ReferencePolicy::Deferred));
        assert_eq!(ReferencePolicy::Strict.to_string(), "strict");
    }
}
