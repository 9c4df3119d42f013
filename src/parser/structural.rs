/*!
# Structural Parser

Shallow single-pass parser that turns a token stream into a [`SyntaxTree`].
It does not validate programs; it only tracks scope nesting well enough to
place loops, conditionals, declarations, calls and returns.

Rules:
- keywords dispatch through the grammar's table; loops and conditionals open
  a scope, declarations/returns/typedef/sizeof/new/this attach leaves;
- every other token attaches as an `Expression` leaf to the innermost open
  scope;
- `}` closes the innermost scope, never the root. Brackets are not matched,
  so unbalanced input simply under- or over-closes.
*/

use crate::core::errors::{AnalyzerError, AnalyzerResult};
use crate::parser::ast::{
    ArrayShape, Declaration, Dimension, LoopForm, LoopHeader, NodeId, NodeKind, SyntaxTree,
    TreeBuilder,
};
use crate::parser::grammar::{GrammarSpec, KeywordAction, LoopHeaderStyle};
use crate::parser::lexer::{Token, TokenKind};

/// Structural parser over one token stream
pub struct StructuralParser<'a> {
    spec: &'a GrammarSpec,
    tokens: &'a [Token],
    pos: usize,
    builder: TreeBuilder,
    extra_intrinsics: &'a [String],
    /// Scope closed by the most recent `}`
    last_closed: Option<NodeId>,
}

impl<'a> StructuralParser<'a> {
    pub fn new(spec: &'a GrammarSpec, tokens: &'a [Token]) -> Self {
        Self {
            spec,
            tokens,
            pos: 0,
            builder: TreeBuilder::new(),
            extra_intrinsics: &[],
            last_closed: None,
        }
    }

    /// Additional routines to treat as constant-time expressions
    pub fn with_intrinsics(mut self, extra: &'a [String]) -> Self {
        self.extra_intrinsics = extra;
        self
    }

    /// Consumes the token stream and returns the finished tree
    pub fn parse(mut self) -> AnalyzerResult<SyntaxTree> {
        let tokens = self.tokens;
        while let Some(token) = tokens.get(self.pos) {
            match token.kind {
                TokenKind::Keyword => self.handle_keyword(token)?,
                TokenKind::Unknown => {
                    self.builder.leaf(NodeKind::Unknown, Some(token.text.clone()));
                }
                _ => self.handle_other(token),
            }
            self.pos += 1;
        }

        let tree = self.builder.finish();
        if tree.unclosed_scopes() > 0 {
            tracing::warn!(
                "Token stream ended with {} scope(s) still open",
                tree.unclosed_scopes()
            );
        }
        tracing::debug!("Built syntax tree with {} nodes", tree.len());
        Ok(tree)
    }

    fn peek(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    fn previous(&self) -> Option<&'a Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Advances to the next token, failing at the end of the stream
    fn next_required(&mut self, context: &'static str) -> AnalyzerResult<&'a Token> {
        match self.tokens.get(self.pos + 1) {
            Some(token) => {
                self.pos += 1;
                Ok(token)
            }
            None => Err(AnalyzerError::end_of_input(context)),
        }
    }

    fn handle_keyword(&mut self, token: &'a Token) -> AnalyzerResult<()> {
        let action = self.spec.keyword_action(&token.text);
        tracing::trace!("Keyword {:?} -> {:?}", token.text, action);

        match action {
            Some(KeywordAction::ForLoop) => self.handle_for_loop(token)?,
            Some(KeywordAction::WhileLoop) => self.handle_while_loop(token)?,
            Some(KeywordAction::DoLoop) => {
                self.builder
                    .open(NodeKind::loop_of(LoopForm::DoWhile), Some(token.text.clone()));
            }
            Some(KeywordAction::Conditional) => {
                self.builder
                    .open(NodeKind::Conditional, Some(token.text.clone()));
            }
            Some(KeywordAction::TypeDeclaration) => self.handle_type_declaration(token),
            Some(KeywordAction::Return) => {
                self.builder
                    .leaf(NodeKind::ReturnStatement, Some(token.text.clone()));
            }
            Some(KeywordAction::Typedef) => {
                self.builder.leaf(NodeKind::Typedef, Some(token.text.clone()));
            }
            Some(KeywordAction::Sizeof) => {
                self.builder.leaf(NodeKind::Sizeof, Some(token.text.clone()));
            }
            Some(KeywordAction::NewInstance) => self.handle_new_instance(token),
            Some(KeywordAction::SpecialReference) => {
                self.builder
                    .leaf(NodeKind::SpecialReference, Some(token.text.clone()));
            }
            None => self.handle_other(token),
        }
        Ok(())
    }

    fn handle_for_loop(&mut self, token: &'a Token) -> AnalyzerResult<()> {
        let loop_id = self
            .builder
            .open(NodeKind::loop_of(LoopForm::For), Some(token.text.clone()));

        match self.spec.loop_headers {
            LoopHeaderStyle::Positional => {
                let initialization = self.next_required("for-loop header")?.text.clone();
                let condition = self.next_required("for-loop header")?.text.clone();
                let update = self.next_required("for-loop header")?.text.clone();
                self.set_header(
                    loop_id,
                    LoopHeader {
                        initialization: Some(initialization),
                        condition: Some(condition),
                        update: Some(update),
                    },
                );
            }
            LoopHeaderStyle::Structured => {
                self.read_structured_header(loop_id)?;
                self.builder.close();
            }
        }
        Ok(())
    }

    /// `( init ; cond ; update )` into Initialization/Condition/Update children
    fn read_structured_header(&mut self, loop_id: NodeId) -> AnalyzerResult<()> {
        let open = self.next_required("for-loop header")?;
        if !open.is("(") {
            // No header; let the main loop dispatch this token
            self.pos -= 1;
            return Ok(());
        }

        let mut header = LoopHeader::default();
        let (initialization, closed) =
            self.read_header_clause(loop_id, NodeKind::Initialization, "initialization")?;
        header.initialization = Some(initialization);

        // `for (T x : xs)` ends after its first clause
        if !closed {
            let (condition, closed) =
                self.read_header_clause(loop_id, NodeKind::Condition, "condition")?;
            header.condition = Some(condition);
            if !closed {
                let (update, _) = self.read_header_clause(loop_id, NodeKind::Update, "update")?;
                header.update = Some(update);
            }
        }

        self.set_header(loop_id, header);
        Ok(())
    }

    /// Reads tokens up to a top-level `;` or `)`; returns the clause text and
    /// whether the header's closing `)` was consumed.
    fn read_header_clause(
        &mut self,
        loop_id: NodeId,
        kind: NodeKind,
        label: &str,
    ) -> AnalyzerResult<(String, bool)> {
        let clause = self.builder.attach_to(loop_id, kind, Some(label.to_string()));
        let mut parts: Vec<&str> = Vec::new();
        let mut depth = 0usize;

        loop {
            let token = self.next_required("for-loop header")?;
            if depth == 0 && (token.is(";") || token.is(")")) {
                return Ok((parts.join(" "), token.is(")")));
            }
            if token.is("(") {
                depth += 1;
            } else if token.is(")") {
                depth -= 1;
            }
            self.builder
                .attach_to(clause, NodeKind::Expression, Some(token.text.clone()));
            parts.push(&token.text);
        }
    }

    fn set_header(&mut self, loop_id: NodeId, new_header: LoopHeader) {
        if let NodeKind::Loop { header, .. } = &mut self.builder.node_mut(loop_id).kind {
            *header = new_header;
        }
    }

    fn handle_while_loop(&mut self, token: &'a Token) -> AnalyzerResult<()> {
        if let Some(do_loop) = self.pending_do_trailer() {
            self.last_closed = None;
            if self.spec.loop_headers == LoopHeaderStyle::Positional {
                let condition = self.next_required("do-while condition")?.text.clone();
                if let NodeKind::Loop { header, .. } = &mut self.builder.node_mut(do_loop).kind {
                    header.condition = Some(condition);
                }
            }
            return Ok(());
        }

        let loop_id = self
            .builder
            .open(NodeKind::loop_of(LoopForm::While), Some(token.text.clone()));
        if self.spec.loop_headers == LoopHeaderStyle::Positional {
            let condition = self.next_required("while-loop condition")?.text.clone();
            self.set_header(
                loop_id,
                LoopHeader {
                    condition: Some(condition),
                    ..LoopHeader::default()
                },
            );
        }
        Ok(())
    }

    /// The do-loop whose body was closed by the token right before this one
    fn pending_do_trailer(&self) -> Option<NodeId> {
        let closed = self.last_closed?;
        let after_brace = self.previous().is_some_and(|t| t.is("}"));
        let is_do = matches!(
            self.builder.tree().kind(closed),
            NodeKind::Loop {
                form: LoopForm::DoWhile,
                ..
            }
        );
        (after_brace && is_do).then_some(closed)
    }

    fn handle_type_declaration(&mut self, token: &'a Token) {
        let var_type = token.text.clone();

        // `T *name`, `T **name`
        let stars = self.tokens[self.pos + 1..]
            .iter()
            .take_while(|t| t.is("*"))
            .count();
        if stars > 0
            && self
                .peek(stars + 1)
                .is_some_and(|t| t.kind == TokenKind::Identifier)
        {
            self.pos += stars;
        }

        let next = self.peek(1);
        let after = self.peek(2);

        match (next, after) {
            (Some(name), Some(follow)) if name.kind == TokenKind::Identifier && follow.is("(") => {
                self.handle_function_header(var_type, name);
            }
            (Some(name), Some(follow)) if name.kind == TokenKind::Identifier && follow.is("[") => {
                // T name [d]...
                self.pos += 1;
                let dimensions = self.read_dimensions();
                self.attach_typed_array(var_type, Some(name.text.clone()), dimensions);
            }
            (Some(bracket), _) if bracket.is("[") => {
                // T [d]... name
                let dimensions = self.read_dimensions();
                match (self.peek(1), self.peek(2)) {
                    (Some(name), Some(follow))
                        if name.kind == TokenKind::Identifier && follow.is("(") =>
                    {
                        self.handle_function_header(format!("{}[]", var_type), name);
                    }
                    (Some(name), _) if name.kind == TokenKind::Identifier => {
                        self.pos += 1;
                        self.attach_typed_array(var_type, Some(name.text.clone()), dimensions);
                    }
                    _ => self.attach_typed_array(var_type, None, dimensions),
                }
            }
            (Some(name), _) if name.kind == TokenKind::Identifier => {
                self.pos += 1;
                let declaration = Declaration {
                    var_type,
                    var_name: Some(name.text.clone()),
                    ..Declaration::default()
                };
                self.builder.leaf(
                    NodeKind::TypeDeclaration(declaration),
                    Some(token.text.clone()),
                );
            }
            _ => {
                let declaration = Declaration {
                    var_type,
                    ..Declaration::default()
                };
                self.builder.leaf(
                    NodeKind::TypeDeclaration(declaration),
                    Some(token.text.clone()),
                );
            }
        }
    }

    /// `T name (` : a definition when the parameter list is followed by a body
    fn handle_function_header(&mut self, return_type: String, name: &'a Token) {
        self.pos += 1;

        if self.has_function_body(self.pos + 1) {
            self.open_function(name);
        } else {
            let declaration = Declaration {
                var_type: return_type.clone(),
                var_name: Some(name.text.clone()),
                ..Declaration::default()
            };
            self.builder
                .leaf(NodeKind::TypeDeclaration(declaration), Some(return_type));
        }
    }

    fn open_function(&mut self, name: &'a Token) {
        tracing::trace!("Function definition {}", name.text);
        self.builder.open(
            NodeKind::FunctionDeclaration {
                name: name.text.clone(),
            },
            Some(name.text.clone()),
        );
    }

    /// `name (` right after something that can end a return type
    /// (`String`, `*`, `[]`, `List<T>`) and followed by a body
    fn is_definition_site(&self) -> bool {
        let ends_type = self.previous().is_some_and(|prev| match prev.kind {
            TokenKind::Identifier => true,
            TokenKind::Keyword => {
                self.spec.keyword_action(&prev.text) == Some(KeywordAction::TypeDeclaration)
            }
            _ => prev.is("*") || prev.is("]") || prev.is(">"),
        });
        ends_type && self.has_function_body(self.pos + 1)
    }

    /// Whether the parameter list opening at `open` is followed by `{`
    /// before any `;`, `}` or `)` (so `throws` clauses are skipped).
    fn has_function_body(&self, open: usize) -> bool {
        let mut depth = 0usize;
        let mut close = None;
        for (i, token) in self.tokens.iter().enumerate().skip(open) {
            if token.is("(") {
                depth += 1;
            } else if token.is(")") {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
        }

        let Some(close) = close else {
            return false;
        };
        self.tokens[close + 1..]
            .iter()
            .find(|t| t.is("{") || t.is(";") || t.is("}") || t.is(")"))
            .is_some_and(|t| t.is("{"))
    }

    /// Reads `[d] [d] ...` starting at the next token
    fn read_dimensions(&mut self) -> Vec<Dimension> {
        let mut dimensions = Vec::new();

        while self.peek(1).is_some_and(|t| t.is("[")) {
            self.pos += 1;
            let mut parts: Vec<&'a Token> = Vec::new();
            while let Some(token) = self.peek(1) {
                self.pos += 1;
                if token.is("]") {
                    break;
                }
                parts.push(token);
            }

            let dimension = match parts.as_slice() {
                [] => Dimension::Unsized,
                [single] if single.kind == TokenKind::Literal => match single.text.parse() {
                    Ok(n) => Dimension::Literal(n),
                    Err(_) => Dimension::Symbolic(single.text.clone()),
                },
                _ => Dimension::Symbolic(
                    parts
                        .iter()
                        .map(|t| t.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" "),
                ),
            };
            dimensions.push(dimension);
        }
        dimensions
    }

    fn attach_typed_array(
        &mut self,
        var_type: String,
        var_name: Option<String>,
        dimensions: Vec<Dimension>,
    ) {
        let declaration = Declaration {
            var_type: var_type.clone(),
            var_name: var_name.clone(),
            is_array: true,
            is_two_dimensional: dimensions.len() == 2,
        };
        let decl_id = self
            .builder
            .leaf(NodeKind::TypeDeclaration(declaration), Some(var_type.clone()));
        self.attach_array(decl_id, var_name.unwrap_or(var_type), dimensions);
    }

    fn attach_array(&mut self, parent: NodeId, label: String, dimensions: Vec<Dimension>) {
        let literals: Vec<u64> = dimensions
            .iter()
            .filter_map(|d| match d {
                Dimension::Literal(n) => Some(*n),
                _ => None,
            })
            .collect();

        if let Some(shape) = ArrayShape::new(dimensions) {
            let array_id = self
                .builder
                .attach_to(parent, NodeKind::ArrayDeclaration(shape), Some(label));
            for size in literals {
                self.builder
                    .attach_to(array_id, NodeKind::Literal, Some(size.to_string()));
            }
        }
    }

    fn handle_new_instance(&mut self, token: &'a Token) {
        let label = match self.peek(1) {
            Some(next) if next.kind == TokenKind::Identifier => {
                self.pos += 1;
                next.text.clone()
            }
            _ => token.text.clone(),
        };
        self.builder.leaf(NodeKind::NewInstance, Some(label));
    }

    fn handle_other(&mut self, token: &'a Token) {
        if token.is("}") {
            self.builder
                .leaf(NodeKind::Expression, Some(token.text.clone()));
            self.last_closed = self.builder.close();
            return;
        }

        if token.kind == TokenKind::Identifier {
            if self.peek(1).is_some_and(|t| t.is("(")) {
                self.handle_call_site(token);
                return;
            }
            if self.at_statement_start() && self.is_subscript_statement() {
                let dimensions = self.read_dimensions();
                let parent = self.builder.top();
                self.attach_array(parent, token.text.clone(), dimensions);
                return;
            }
        }

        self.builder
            .leaf(NodeKind::Expression, Some(token.text.clone()));
    }

    fn at_statement_start(&self) -> bool {
        match self.previous() {
            None => true,
            Some(prev) => prev.is(";") || prev.is("{") || prev.is("}"),
        }
    }

    /// `[..] [..] ... ;` follows the current identifier
    fn is_subscript_statement(&self) -> bool {
        let mut i = self.pos + 1;
        let mut seen_any = false;
        while self.tokens.get(i).is_some_and(|t| t.is("[")) {
            seen_any = true;
            match self.tokens[i..].iter().position(|t| t.is("]")) {
                Some(offset) => i += offset + 1,
                None => return false,
            }
        }
        seen_any && self.tokens.get(i).is_some_and(|t| t.is(";"))
    }

    fn is_intrinsic(&self, name: &str) -> bool {
        self.spec.is_intrinsic(name) || self.extra_intrinsics.iter().any(|n| n == name)
    }

    fn handle_call_site(&mut self, token: &'a Token) {
        let name = token.text.as_str();
        if self.is_definition_site() {
            self.open_function(token);
        } else if self.is_intrinsic(name) {
            self.builder
                .leaf(NodeKind::Expression, Some(token.text.clone()));
        } else if self.spec.is_allocator(name) {
            self.builder
                .leaf(NodeKind::NewInstance, Some(token.text.clone()));
        } else {
            let parent = self.builder.top();
            self.read_call(parent, token);
        }
    }

    /// Reads `name ( args )` into a call node under `parent`; returns the call text.
    fn read_call(&mut self, parent: NodeId, name_token: &'a Token) -> String {
        let name = name_token.text.clone();
        let recursive = self
            .builder
            .tree()
            .enclosing_function(self.builder.top())
            .and_then(|id| self.builder.tree().kind(id).function_name())
            .is_some_and(|enclosing| enclosing == name);

        let kind = if recursive {
            NodeKind::RecursiveCall { name: name.clone() }
        } else {
            NodeKind::FunctionCall { name: name.clone() }
        };
        let call_id = self.builder.attach_to(parent, kind, None);

        // opening parenthesis
        self.pos += 1;
        let mut parts: Vec<String> = Vec::new();
        let mut depth = 1usize;

        while let Some(token) = self.peek(1) {
            if depth == 1 && (token.is(";") || token.is("{") || token.is("}")) {
                break;
            }
            self.pos += 1;

            if token.is("(") {
                depth += 1;
            } else if token.is(")") {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }

            let nested_call = token.kind == TokenKind::Identifier
                && self.peek(1).is_some_and(|t| t.is("("))
                && !self.is_intrinsic(&token.text)
                && !self.spec.is_allocator(&token.text);
            if nested_call {
                parts.push(self.read_call(call_id, token));
                continue;
            }

            self.builder
                .attach_to(call_id, NodeKind::Expression, Some(token.text.clone()));
            parts.push(token.text.clone());
        }

        let text = format!("{}({})", name, parts.join(" "));
        self.builder.node_mut(call_id).label = Some(text.clone());
        text
    }
}
