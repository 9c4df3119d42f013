/*!
# Syntax Tree

Arena-held tree produced by the structural parser. Nodes are addressed by
[`NodeId`]; a node owns its ordered children and keeps a non-owning parent
index used for upward queries (locating the enclosing function).
*/

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable node identifier within one tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Loop flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopForm {
    For,
    While,
    DoWhile,
}

/// Header text of a loop, as far as the grammar's header reader saw it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopHeader {
    pub initialization: Option<String>,
    pub condition: Option<String>,
    pub update: Option<String>,
}

/// Variable or type declaration details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub var_type: String,
    pub var_name: Option<String>,
    pub is_array: bool,
    pub is_two_dimensional: bool,
}

/// One declared array dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    Literal(u64),
    Symbolic(String),
    /// `[]`
    Unsized,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Literal(n) => write!(f, "{}", n),
            Dimension::Symbolic(text) => write!(f, "{}", text),
            Dimension::Unsized => write!(f, ""),
        }
    }
}

/// Dimensions of an array declaration; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayShape {
    dimensions: Vec<Dimension>,
}

impl ArrayShape {
    /// Returns `None` for an empty dimension list.
    pub fn new(dimensions: Vec<Dimension>) -> Option<Self> {
        if dimensions.is_empty() {
            None
        } else {
            Some(Self { dimensions })
        }
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    /// Element count when every dimension is a literal
    pub fn size(&self) -> Option<u64> {
        self.dimensions.iter().try_fold(1u64, |acc, dim| match dim {
            Dimension::Literal(n) => acc.checked_mul(*n),
            _ => None,
        })
    }
}

/// Node kind with the semantic slots each construct carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Program,
    Block,
    Loop { form: LoopForm, header: LoopHeader },
    Conditional,
    TypeDeclaration(Declaration),
    ArrayDeclaration(ArrayShape),
    FunctionDeclaration { name: String },
    FunctionCall { name: String },
    RecursiveCall { name: String },
    ReturnStatement,
    NewInstance,
    SpecialReference,
    Typedef,
    Sizeof,
    Expression,
    Literal,
    Initialization,
    Condition,
    Update,
    Unknown,
}

impl NodeKind {
    pub fn loop_of(form: LoopForm) -> Self {
        NodeKind::Loop {
            form,
            header: LoopHeader::default(),
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, NodeKind::Loop { .. })
    }

    /// Function identity for declarations and calls
    pub fn function_name(&self) -> Option<&str> {
        match self {
            NodeKind::FunctionDeclaration { name }
            | NodeKind::FunctionCall { name }
            | NodeKind::RecursiveCall { name } => Some(name),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::Block => "Block",
            NodeKind::Loop { form: LoopForm::For, .. } => "ForLoop",
            NodeKind::Loop { form: LoopForm::While, .. } => "WhileLoop",
            NodeKind::Loop { form: LoopForm::DoWhile, .. } => "DoWhileLoop",
            NodeKind::Conditional => "Conditional",
            NodeKind::TypeDeclaration(_) => "TypeDeclaration",
            NodeKind::ArrayDeclaration(_) => "ArrayDeclaration",
            NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeKind::FunctionCall { .. } => "FunctionCall",
            NodeKind::RecursiveCall { .. } => "RecursiveCall",
            NodeKind::ReturnStatement => "ReturnStatement",
            NodeKind::NewInstance => "NewInstance",
            NodeKind::SpecialReference => "SpecialReference",
            NodeKind::Typedef => "Typedef",
            NodeKind::Sizeof => "Sizeof",
            NodeKind::Expression => "Expression",
            NodeKind::Literal => "Literal",
            NodeKind::Initialization => "Initialization",
            NodeKind::Condition => "Condition",
            NodeKind::Update => "Update",
            NodeKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Node in the arena
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub label: Option<String>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl SyntaxNode {
    fn new(kind: NodeKind, label: Option<String>) -> Self {
        Self {
            kind,
            label,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn text(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

/// Arena tree. Node 0 is the `Program` root of a non-empty tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    unclosed_scopes: usize,
}

impl SyntaxTree {
    /// A tree holding only the `Program` root
    pub fn new() -> Self {
        Self {
            nodes: vec![SyntaxNode::new(NodeKind::Program, Some("program".to_string()))],
            unclosed_scopes: 0,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Scopes still open when the token stream ran out (root excluded)
    pub fn unclosed_scopes(&self) -> usize {
        self.unclosed_scopes
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SyntaxNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Innermost `FunctionDeclaration` at or above `id`
    pub fn enclosing_function(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if matches!(self.kind(node_id), NodeKind::FunctionDeclaration { .. }) {
                return Some(node_id);
            }
            current = self.parent(node_id);
        }
        None
    }

    /// Nodes of a given tag anywhere in the tree
    pub fn find_all(&self, tag: &str) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.kind.tag() == tag)
            .map(|(id, _)| id)
            .collect()
    }

    /// Indented outline, one node per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root() {
            self.render_node(root, 0, &mut out);
        }
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.node(id);
        out.push_str(&"  ".repeat(depth));
        out.push_str(node.kind.tag());
        if let Some(label) = &node.label {
            out.push_str(": ");
            out.push_str(label);
        }
        match &node.kind {
            NodeKind::Loop { header, .. } => {
                let parts = [&header.initialization, &header.condition, &header.update];
                if parts.iter().any(|p| p.is_some()) {
                    let shown: Vec<&str> = parts
                        .iter()
                        .map(|p| p.as_deref().unwrap_or("-"))
                        .collect();
                    out.push_str(&format!(" [{}]", shown.join(" | ")));
                }
            }
            NodeKind::ArrayDeclaration(shape) => {
                for dim in shape.dimensions() {
                    out.push_str(&format!("[{}]", dim));
                }
            }
            NodeKind::TypeDeclaration(decl) => {
                if let Some(name) = &decl.var_name {
                    out.push_str(&format!(" ({} {})", decl.var_type, name));
                }
            }
            _ => {}
        }
        out.push('\n');
        for child in &node.children {
            self.render_node(*child, depth + 1, out);
        }
    }
}

/// Builds a [`SyntaxTree`] while tracking the open-scope stack.
///
/// The root is pushed on creation and can never be popped.
pub struct TreeBuilder {
    tree: SyntaxTree,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        let tree = SyntaxTree::new();
        Self {
            tree,
            stack: vec![NodeId(0)],
        }
    }

    /// Innermost open scope
    pub fn top(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId(0))
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Attaches a node under the current scope and makes it the new scope
    pub fn open(&mut self, kind: NodeKind, label: Option<String>) -> NodeId {
        let id = self.leaf(kind, label);
        self.stack.push(id);
        id
    }

    /// Attaches a node under the current scope without opening it
    pub fn leaf(&mut self, kind: NodeKind, label: Option<String>) -> NodeId {
        let parent = self.top();
        self.attach_to(parent, kind, label)
    }

    /// Attaches a node under an explicit parent
    pub fn attach_to(&mut self, parent: NodeId, kind: NodeKind, label: Option<String>) -> NodeId {
        let id = NodeId(self.tree.nodes.len() as u32);
        let mut node = SyntaxNode::new(kind, label);
        node.parent = Some(parent);
        self.tree.nodes.push(node);
        self.tree.nodes[parent.index()].children.push(id);
        id
    }

    /// Pops the innermost scope unless it is the root
    pub fn close(&mut self) -> Option<NodeId> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Mutable access to a node that is still being built
    pub fn node_mut(&mut self, id: NodeId) -> &mut SyntaxNode {
        &mut self.tree.nodes[id.index()]
    }

    pub fn finish(mut self) -> SyntaxTree {
        self.tree.unclosed_scopes = self.stack.len() - 1;
        self.tree
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_attaches_in_order() {
        let mut builder = TreeBuilder::new();
        let loop_id = builder.open(NodeKind::loop_of(LoopForm::For), Some("for".into()));
        let expr = builder.leaf(NodeKind::Expression, Some("x".into()));
        builder.close();
        let after = builder.leaf(NodeKind::Expression, Some("y".into()));
        let tree = builder.finish();

        let root = tree.root().unwrap();
        assert_eq!(tree.children(root), &[loop_id, after]);
        assert_eq!(tree.children(loop_id), &[expr]);
        assert_eq!(tree.parent(expr), Some(loop_id));
        assert_eq!(tree.parent(loop_id), Some(root));
        assert_eq!(tree.unclosed_scopes(), 0);
    }

    #[test]
    fn test_root_is_never_popped() {
        let mut builder = TreeBuilder::new();
        assert_eq!(builder.close(), None);
        assert_eq!(builder.close(), None);
        assert_eq!(builder.depth(), 1);
        assert_eq!(builder.top(), NodeId(0));
    }

    #[test]
    fn test_unclosed_scopes_are_counted() {
        let mut builder = TreeBuilder::new();
        builder.open(NodeKind::Conditional, None);
        builder.open(NodeKind::loop_of(LoopForm::While), None);
        let tree = builder.finish();
        assert_eq!(tree.unclosed_scopes(), 2);
    }

    #[test]
    fn test_enclosing_function() {
        let mut builder = TreeBuilder::new();
        let func = builder.open(
            NodeKind::FunctionDeclaration { name: "fib".into() },
            Some("fib".into()),
        );
        builder.open(NodeKind::Conditional, None);
        let call = builder.leaf(NodeKind::RecursiveCall { name: "fib".into() }, None);
        let tree = builder.finish();

        assert_eq!(tree.enclosing_function(call), Some(func));
        assert_eq!(tree.enclosing_function(NodeId(0)), None);
    }

    #[test]
    fn test_array_shape() {
        assert!(ArrayShape::new(Vec::new()).is_none());

        let shape = ArrayShape::new(vec![Dimension::Literal(10), Dimension::Literal(4)]).unwrap();
        assert_eq!(shape.rank(), 2);
        assert_eq!(shape.size(), Some(40));

        let symbolic =
            ArrayShape::new(vec![Dimension::Symbolic("n".into()), Dimension::Literal(2)]).unwrap();
        assert_eq!(symbolic.size(), None);
    }

    #[test]
    fn test_render_and_find_all() {
        let mut builder = TreeBuilder::new();
        builder.open(NodeKind::Conditional, Some("if".into()));
        builder.leaf(NodeKind::Expression, Some("x".into()));
        builder.close();
        let tree = builder.finish();

        assert_eq!(tree.render(), "Program: program\n  Conditional: if\n    Expression: x\n");
        assert_eq!(tree.find_all("Expression"), vec![NodeId(2)]);
    }

    #[test]
    fn test_empty_tree_has_no_root() {
        let tree = SyntaxTree::default();
        assert!(tree.root().is_none());
        assert!(tree.is_empty());
    }
}
