/*!
# Source Parsing

Front half of the pipeline: grammar tables, tokenizer and the structural
parser that turns a token stream into a [`SyntaxTree`].
*/

pub mod ast;
pub mod grammar;
pub mod lexer;
pub mod structural;

pub use ast::{
    ArrayShape, Declaration, Dimension, LoopForm, LoopHeader, NodeId, NodeKind, SyntaxNode,
    SyntaxTree, TreeBuilder,
};
pub use grammar::{detect_grammar, detect_grammar_from_path, Grammar, GrammarSpec};
pub use lexer::{Lexer, Token, TokenKind, TokenStats};
pub use structural::StructuralParser;

use crate::core::errors::AnalyzerResult;

/// Tokenizer and structural parser bound to one grammar
#[derive(Debug, Clone)]
pub struct ComplexityParser {
    grammar: Grammar,
    extra_intrinsics: Vec<String>,
}

impl ComplexityParser {
    pub fn new(grammar: Grammar) -> Self {
        Self {
            grammar,
            extra_intrinsics: Vec::new(),
        }
    }

    /// Adds routine names to treat as constant-time expressions
    pub fn with_intrinsics(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.extra_intrinsics.extend(names);
        self
    }

    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        Lexer::new(self.grammar.spec()).tokenize(input)
    }

    pub fn parse_tokens(&self, tokens: &[Token]) -> AnalyzerResult<SyntaxTree> {
        StructuralParser::new(self.grammar.spec(), tokens)
            .with_intrinsics(&self.extra_intrinsics)
            .parse()
    }

    /// Tokenize and parse in one step
    pub fn parse_text(&self, input: &str) -> AnalyzerResult<SyntaxTree> {
        let tokens = self.tokenize(input);
        self.parse_tokens(&tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_empty_input() {
        let parser = ComplexityParser::new(Grammar::JavaLike);
        let tree = parser.parse_text("").unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.kind(tree.root().unwrap()), &NodeKind::Program);
    }

    #[test]
    fn test_parser_intrinsics() {
        let source = "void run() { audit(x); }";
        let plain = ComplexityParser::new(Grammar::JavaLike);
        assert_eq!(plain.parse_text(source).unwrap().find_all("FunctionCall").len(), 1);

        let configured = plain.with_intrinsics(vec!["audit".to_string()]);
        assert!(configured
            .parse_text(source)
            .unwrap()
            .find_all("FunctionCall")
            .is_empty());
    }
}
