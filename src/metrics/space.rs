/*!
# Space Complexity Analysis

Sums the memory each node contributes: arrays by rank, heap instances as
linear. Recursion overrides the sum with a linear bound for the call stack.
*/

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::complexity::Complexity;
use crate::core::errors::{AnalyzerError, AnalyzerResult};
use crate::parser::ast::{NodeId, NodeKind, SyntaxTree};

/// Result of space analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceComplexity {
    pub bound: Complexity,
    pub recursion_detected: bool,
    /// Sum of fully literal array sizes, e.g. `O(200)` for `int a[10][20];`
    pub literal_footprint: Option<Complexity>,
}

impl fmt::Display for SpaceComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bound)
    }
}

/// Mutable state of one analysis run
struct SpaceWalk<'t> {
    tree: &'t SyntaxTree,
    total: Complexity,
    footprint: Option<Complexity>,
    recursive: bool,
    in_progress: HashSet<String>,
}

impl<'t> SpaceWalk<'t> {
    fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            tree,
            total: Complexity::constant(),
            footprint: None,
            recursive: false,
            in_progress: HashSet::new(),
        }
    }

    fn contribute(&mut self, amount: Complexity) {
        self.total = self.total.add(&amount);
    }

    fn visit(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::ArrayDeclaration(shape) => {
                let amount = match shape.rank() {
                    1 => Complexity::linear(),
                    rank => Complexity::polynomial(rank as u32),
                };
                self.contribute(amount);
                if let Some(size) = shape.size() {
                    let literal = Complexity::symbolic(size.to_string());
                    self.footprint = Some(match self.footprint.take() {
                        Some(existing) => existing.add(&literal),
                        None => literal,
                    });
                }
                self.visit_children(id);
            }
            NodeKind::NewInstance => self.contribute(Complexity::linear()),
            NodeKind::FunctionDeclaration { name } => {
                if self.in_progress.contains(name) {
                    self.recursive = true;
                } else {
                    self.in_progress.insert(name.clone());
                    self.visit_children(id);
                    self.in_progress.remove(name);
                }
            }
            NodeKind::FunctionCall { name } | NodeKind::RecursiveCall { name } => {
                if self.in_progress.contains(name) {
                    tracing::trace!("Recursive call to {}", name);
                    self.recursive = true;
                } else {
                    self.visit_children(id);
                }
            }
            NodeKind::ReturnStatement => {
                for child in tree.children(id) {
                    if matches!(tree.kind(*child), NodeKind::Expression) {
                        self.visit(*child);
                    }
                }
            }
            NodeKind::Program
            | NodeKind::Block
            | NodeKind::Loop { .. }
            | NodeKind::Conditional
            | NodeKind::TypeDeclaration(_)
            | NodeKind::Expression
            | NodeKind::Initialization
            | NodeKind::Condition
            | NodeKind::Update => self.visit_children(id),
            NodeKind::Literal
            | NodeKind::SpecialReference
            | NodeKind::Typedef
            | NodeKind::Sizeof
            | NodeKind::Unknown => {}
        }
    }

    fn visit_children(&mut self, id: NodeId) {
        let tree = self.tree;
        for child in tree.children(id) {
            self.visit(*child);
        }
    }
}

/// Analyzer for space complexity
#[derive(Debug, Default)]
pub struct SpaceComplexityAnalyzer;

impl SpaceComplexityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, tree: &SyntaxTree) -> AnalyzerResult<SpaceComplexity> {
        let root = tree
            .root()
            .ok_or_else(|| AnalyzerError::InvalidArgument("syntax tree has no root".into()))?;

        let mut walk = SpaceWalk::new(tree);
        walk.visit(root);

        let bound = if walk.recursive {
            Complexity::linear()
        } else {
            walk.total
        };
        tracing::debug!(
            "Space complexity: {} (recursion detected: {})",
            bound,
            walk.recursive
        );

        Ok(SpaceComplexity {
            bound,
            recursion_detected: walk.recursive,
            literal_footprint: walk.footprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{ArrayShape, Dimension, LoopForm, TreeBuilder};

    fn array(dimensions: Vec<Dimension>) -> NodeKind {
        NodeKind::ArrayDeclaration(ArrayShape::new(dimensions).unwrap())
    }

    #[test]
    fn test_empty_tree_is_invalid() {
        assert!(matches!(
            SpaceComplexityAnalyzer::new().analyze(&SyntaxTree::default()),
            Err(AnalyzerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_scalars_only_is_constant() {
        let mut builder = TreeBuilder::new();
        builder.leaf(NodeKind::Expression, Some("x".into()));
        let result = SpaceComplexityAnalyzer::new()
            .analyze(&builder.finish())
            .unwrap();
        assert_eq!(result.bound, Complexity::constant());
        assert!(!result.recursion_detected);
        assert_eq!(result.literal_footprint, None);
    }

    #[test]
    fn test_array_rank_sets_the_bound() {
        let mut builder = TreeBuilder::new();
        builder.leaf(array(vec![Dimension::Symbolic("n".into())]), None);
        builder.open(NodeKind::loop_of(LoopForm::For), None);
        builder.leaf(
            array(vec![Dimension::Literal(10), Dimension::Literal(20)]),
            Some("grid".into()),
        );
        let result = SpaceComplexityAnalyzer::new()
            .analyze(&builder.finish())
            .unwrap();

        assert_eq!(result.to_string(), "O(n^2)");
        assert_eq!(result.literal_footprint, Some(Complexity::symbolic("200")));
    }

    #[test]
    fn test_new_instances_are_linear() {
        let mut builder = TreeBuilder::new();
        builder.leaf(NodeKind::NewInstance, Some("ArrayList".into()));
        let result = SpaceComplexityAnalyzer::new()
            .analyze(&builder.finish())
            .unwrap();
        assert_eq!(result.bound, Complexity::linear());
    }

    #[test]
    fn test_recursion_forces_linear_stack() {
        let mut builder = TreeBuilder::new();
        builder.open(
            NodeKind::FunctionDeclaration { name: "f".into() },
            Some("f".into()),
        );
        builder.leaf(
            array(vec![Dimension::Symbolic("n".into()), Dimension::Unsized]),
            None,
        );
        builder.leaf(
            NodeKind::RecursiveCall { name: "f".into() },
            Some("f(n - 1)".into()),
        );
        let result = SpaceComplexityAnalyzer::new()
            .analyze(&builder.finish())
            .unwrap();

        assert!(result.recursion_detected);
        assert_eq!(result.bound, Complexity::linear());
    }

    #[test]
    fn test_calls_outside_the_function_are_not_recursion() {
        let mut builder = TreeBuilder::new();
        builder.open(
            NodeKind::FunctionDeclaration { name: "f".into() },
            Some("f".into()),
        );
        builder.close();
        builder.leaf(
            NodeKind::FunctionCall { name: "f".into() },
            Some("f(3)".into()),
        );
        let result = SpaceComplexityAnalyzer::new()
            .analyze(&builder.finish())
            .unwrap();
        assert!(!result.recursion_detected);
        assert_eq!(result.bound, Complexity::constant());
    }
}
