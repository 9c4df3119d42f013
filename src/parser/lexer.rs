/*!
# Lexical Analyzer

Table-driven lexer shared by both grammars. A logos scanner recognises the
character classes (words, integers, quoted literals, punctuation); the
grammar's tables then decide which words are keywords and extend each
punctuation character to the longest operator or separator of that grammar.
*/

use logos::Logos;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use super::grammar::{GrammarSpec, SymbolKind};

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Operator,
    Literal,
    Separator,
    Unknown,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword => write!(f, "KEYWORD"),
            TokenKind::Identifier => write!(f, "IDENTIFIER"),
            TokenKind::Operator => write!(f, "OPERATOR"),
            TokenKind::Literal => write!(f, "LITERAL"),
            TokenKind::Separator => write!(f, "SEPARATOR"),
            TokenKind::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Immutable token in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<10} {}", self.kind, self.text)
    }
}

/// Raw lexeme classes. Anything matching none of them is dropped.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Lexeme {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral,

    #[regex(r"'([^'\\]|\\.)'")]
    CharLiteral,

    // First character only; the grammar table extends it to the longest symbol
    #[regex(r"[=!<>+\-*/%&|\^~(){}\[\];,.:]")]
    Punct,
}

/// Comments plus the quoted literals they must not be searched for inside.
static COMMENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|//[^\n]*|/\*[\s\S]*?\*/"#)
        .expect("comment pattern is a valid regex")
});

/// Removes `//` and `/* */` comments, leaving string and char literals intact.
pub fn strip_comments(input: &str) -> Cow<'_, str> {
    COMMENT_PATTERN.replace_all(input, |caps: &regex::Captures| {
        let matched = &caps[0];
        if matched.starts_with('"') || matched.starts_with('\'') {
            matched.to_string()
        } else {
            " ".to_string()
        }
    })
}

/// Lexer bound to one grammar's tables
pub struct Lexer<'g> {
    spec: &'g GrammarSpec,
}

impl<'g> Lexer<'g> {
    pub fn new(spec: &'g GrammarSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &'g GrammarSpec {
        self.spec
    }

    /// Tokenizes source text. Never fails: unrecognised characters are skipped.
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let source = if self.spec.strips_comments {
            strip_comments(input)
        } else {
            Cow::Borrowed(input)
        };

        let mut tokens = Vec::new();
        let mut lexer = Lexeme::lexer(&source);

        while let Some(result) = lexer.next() {
            let text = lexer.slice();
            let lexeme = match result {
                Ok(lexeme) => lexeme,
                Err(()) => {
                    tracing::trace!("Dropping unrecognised character {:?}", text);
                    continue;
                }
            };

            let token = match lexeme {
                Lexeme::Word if self.spec.is_keyword(text) => Token::new(TokenKind::Keyword, text),
                Lexeme::Word => Token::new(TokenKind::Identifier, text),
                Lexeme::Integer | Lexeme::StringLiteral | Lexeme::CharLiteral => {
                    Token::new(TokenKind::Literal, text)
                }
                Lexeme::Punct => {
                    let start = lexer.span().start;
                    match self.spec.longest_symbol(&source[start..]) {
                        Some((symbol, kind)) => {
                            lexer.bump(symbol.len() - text.len());
                            let kind = match kind {
                                SymbolKind::Operator => TokenKind::Operator,
                                SymbolKind::Separator => TokenKind::Separator,
                            };
                            Token::new(kind, symbol)
                        }
                        None => Token::new(TokenKind::Unknown, text),
                    }
                }
            };
            tokens.push(token);
        }

        tracing::debug!(
            "Tokenized {} bytes into {} {} tokens",
            input.len(),
            tokens.len(),
            self.spec.grammar
        );
        tokens
    }

    /// Token statistics for reporting
    pub fn token_stats(&self, tokens: &[Token]) -> TokenStats {
        let mut stats = TokenStats::default();

        for token in tokens {
            match token.kind {
                TokenKind::Keyword => stats.keywords += 1,
                TokenKind::Identifier => stats.identifiers += 1,
                TokenKind::Operator => stats.operators += 1,
                TokenKind::Literal => stats.literals += 1,
                TokenKind::Separator => stats.separators += 1,
                TokenKind::Unknown => stats.unknown += 1,
            }
        }

        stats.total = tokens.len();
        stats
    }
}

/// Token statistics for analysis and reporting
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStats {
    pub total: usize,
    pub keywords: usize,
    pub identifiers: usize,
    pub operators: usize,
    pub literals: usize,
    pub separators: usize,
    pub unknown: usize,
}

impl fmt::Display for TokenStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Token Statistics:")?;
        writeln!(f, "  Total tokens: {}", self.total)?;
        writeln!(f, "  Keywords: {}", self.keywords)?;
        writeln!(f, "  Identifiers: {}", self.identifiers)?;
        writeln!(f, "  Operators: {}", self.operators)?;
        writeln!(f, "  Literals: {}", self.literals)?;
        writeln!(f, "  Separators: {}", self.separators)?;
        writeln!(f, "  Unknown: {}", self.unknown)?;
        Ok(())
    }
}
