/*!
# Time Complexity Analysis

Bottom-up walk over a [`SyntaxTree`]:

- scopes (program, block, conditional, function body) take the dominant
  bound of their children;
- a loop raises the bound of its body by one step;
- a self-recursive call is classified from the shape of its enclosing
  function (one `n - 1` self-call is linear, several self-calls are
  exponential);
- calls to other functions cannot be resolved and make the result unknown.
*/

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::complexity::{Complexity, ComplexityClass};
use crate::core::errors::{AnalyzerError, AnalyzerResult};
use crate::parser::ast::{NodeId, NodeKind, SyntaxTree};

/// Why a time bound could not be determined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Unresolved {
    /// Self-recursion that matches neither known pattern
    RecursionPattern { function: String },
    /// Call to a function whose cost is not analysed
    FunctionCall { name: String },
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::RecursionPattern { function } => {
                write!(f, "recursion in `{}` matches no known pattern", function)
            }
            Unresolved::FunctionCall { name } => {
                write!(f, "cost of call to `{}` is unknown", name)
            }
        }
    }
}

/// Result of time analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeComplexity {
    Known(Complexity),
    Unknown(Unresolved),
}

impl TimeComplexity {
    pub fn constant() -> Self {
        TimeComplexity::Known(Complexity::constant())
    }

    pub fn known(&self) -> Option<&Complexity> {
        match self {
            TimeComplexity::Known(c) => Some(c),
            TimeComplexity::Unknown(_) => None,
        }
    }

    pub fn unresolved(&self) -> Option<&Unresolved> {
        match self {
            TimeComplexity::Known(_) => None,
            TimeComplexity::Unknown(reason) => Some(reason),
        }
    }

    /// Sequential composition; an unknown operand makes the result unknown
    pub fn dominant(self, other: TimeComplexity) -> TimeComplexity {
        match (self, other) {
            (TimeComplexity::Unknown(reason), _) | (_, TimeComplexity::Unknown(reason)) => {
                TimeComplexity::Unknown(reason)
            }
            (TimeComplexity::Known(a), TimeComplexity::Known(b)) => {
                TimeComplexity::Known(a.add(&b))
            }
        }
    }
}

impl From<Complexity> for TimeComplexity {
    fn from(value: Complexity) -> Self {
        TimeComplexity::Known(value)
    }
}

impl fmt::Display for TimeComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeComplexity::Known(c) => write!(f, "{}", c),
            TimeComplexity::Unknown(_) => write!(f, "O(?)"),
        }
    }
}

/// Time bound of one function definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionComplexity {
    pub name: String,
    pub time: TimeComplexity,
}

/// Bound of a loop whose body costs `body`
fn nest_in_loop(body: Complexity) -> Complexity {
    match body.class() {
        Some(ComplexityClass::Constant) | Some(ComplexityClass::Logarithmic) | None => {
            Complexity::linear()
        }
        Some(ComplexityClass::Linear) => Complexity::quadratic(),
        Some(ComplexityClass::Quadratic) => Complexity::cubic(),
        Some(_) => body,
    }
}

static DECREMENT_ARGUMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(.*\bn\s*-\s*1\b.*\)").expect("decrement pattern is a valid regex")
});

/// `name(... n - 1 ...)`
fn is_decrementing_call(name: &str, call_text: &str) -> bool {
    let Some(arguments) = call_text.strip_prefix(name) else {
        return false;
    };
    DECREMENT_ARGUMENT.is_match(arguments)
}

/// Analyzer for time complexity
#[derive(Debug, Default)]
pub struct TimeComplexityAnalyzer;

impl TimeComplexityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Bound of the whole tree
    pub fn analyze(&self, tree: &SyntaxTree) -> AnalyzerResult<TimeComplexity> {
        let root = tree
            .root()
            .ok_or_else(|| AnalyzerError::InvalidArgument("syntax tree has no root".into()))?;
        let result = self.analyze_node(tree, root);
        tracing::debug!("Time complexity: {}", result);
        Ok(result)
    }

    /// Bound of each function definition, in source order
    pub fn analyze_functions(&self, tree: &SyntaxTree) -> Vec<FunctionComplexity> {
        tree.iter()
            .filter_map(|(id, node)| match &node.kind {
                NodeKind::FunctionDeclaration { name } => Some(FunctionComplexity {
                    name: name.clone(),
                    time: self.analyze_node(tree, id),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn analyze_node(&self, tree: &SyntaxTree, id: NodeId) -> TimeComplexity {
        match tree.kind(id) {
            NodeKind::Program
            | NodeKind::Block
            | NodeKind::Conditional
            | NodeKind::FunctionDeclaration { .. } => self.analyze_children(tree, id),
            NodeKind::Loop { .. } => match self.analyze_children(tree, id) {
                TimeComplexity::Known(body) => TimeComplexity::Known(nest_in_loop(body)),
                unknown => unknown,
            },
            NodeKind::RecursiveCall { name } => self.analyze_recursion(tree, id, name),
            NodeKind::FunctionCall { name } => {
                tracing::trace!("Unresolved call to {}", name);
                TimeComplexity::Unknown(Unresolved::FunctionCall { name: name.clone() })
            }
            NodeKind::TypeDeclaration(_)
            | NodeKind::ArrayDeclaration(_)
            | NodeKind::ReturnStatement
            | NodeKind::NewInstance
            | NodeKind::SpecialReference
            | NodeKind::Typedef
            | NodeKind::Sizeof
            | NodeKind::Expression
            | NodeKind::Literal
            | NodeKind::Initialization
            | NodeKind::Condition
            | NodeKind::Update
            | NodeKind::Unknown => TimeComplexity::constant(),
        }
    }

    fn analyze_children(&self, tree: &SyntaxTree, id: NodeId) -> TimeComplexity {
        tree.children(id)
            .iter()
            .fold(TimeComplexity::constant(), |acc, child| {
                acc.dominant(self.analyze_node(tree, *child))
            })
    }

    fn analyze_recursion(&self, tree: &SyntaxTree, id: NodeId, name: &str) -> TimeComplexity {
        let unresolved = |function: &str| {
            TimeComplexity::Unknown(Unresolved::RecursionPattern {
                function: function.to_string(),
            })
        };

        let Some(function) = tree.enclosing_function(id) else {
            return unresolved(name);
        };
        let function_name = tree.kind(function).function_name().unwrap_or(name);

        let self_calls = collect_self_calls(tree, function, function_name);
        tracing::trace!(
            "{} contains {} self-call(s)",
            function_name,
            self_calls.len()
        );

        match self_calls.as_slice() {
            [single] if is_decrementing_call(function_name, tree.node(*single).text()) => {
                Complexity::linear().into()
            }
            [_, _, ..] => Complexity::exponential().into(),
            _ => unresolved(function_name),
        }
    }
}

/// Self-calls inside `function`, not descending into nested definitions
fn collect_self_calls(tree: &SyntaxTree, function: NodeId, name: &str) -> Vec<NodeId> {
    let mut found = Vec::new();
    let mut stack: Vec<NodeId> = tree.children(function).iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        match tree.kind(id) {
            NodeKind::FunctionDeclaration { .. } => continue,
            NodeKind::RecursiveCall { name: callee } if callee == name => found.push(id),
            _ => {}
        }
        stack.extend(tree.children(id).iter().rev().copied());
    }
    found
}
