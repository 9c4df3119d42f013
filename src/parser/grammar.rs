/*!
# Grammar Tables

Keyword, operator and separator tables for the two supported grammars, plus the
keyword dispatch table the structural parser consults. Everything that differs
between the C-like and Java-like grammars lives here; the lexer and parser
algorithms are shared.
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::core::errors::{AnalyzerError, AnalyzerResult};

/// Grammar selector handed to the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grammar {
    #[serde(rename = "c")]
    CLike,
    #[serde(rename = "java")]
    JavaLike,
}

impl Grammar {
    /// Tables for this grammar
    pub fn spec(self) -> &'static GrammarSpec {
        match self {
            Grammar::CLike => &C_LIKE,
            Grammar::JavaLike => &JAVA_LIKE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Grammar::CLike => "C",
            Grammar::JavaLike => "Java",
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Grammar {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" | "c-like" => Ok(Grammar::CLike),
            "java" | "java-like" => Ok(Grammar::JavaLike),
            _ => Err(AnalyzerError::UnsupportedGrammar),
        }
    }
}

/// How a grammar reads the header of a `for` loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopHeaderStyle {
    /// Next three tokens are taken verbatim as initialization/condition/update
    /// and the loop stays open as a scope.
    Positional,
    /// `( init ; cond ; update )` is consumed into three child sub-trees and
    /// the loop is closed right after the header.
    Structured,
}

/// What the structural parser does with a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordAction {
    ForLoop,
    WhileLoop,
    DoLoop,
    Conditional,
    TypeDeclaration,
    Return,
    Typedef,
    Sizeof,
    NewInstance,
    SpecialReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Operator,
    Separator,
}

/// Complete table set for one grammar
#[derive(Debug)]
pub struct GrammarSpec {
    pub grammar: Grammar,
    pub keywords: &'static [&'static str],
    pub operators: &'static [&'static str],
    pub separators: &'static [&'static str],
    pub dispatch: &'static [(&'static str, KeywordAction)],
    pub loop_headers: LoopHeaderStyle,
    /// `//` and `/* */` comments are removed before scanning
    pub strips_comments: bool,
    /// Library routines treated as constant-time expressions rather than calls
    pub intrinsics: &'static [&'static str],
    /// Routines that allocate on the heap (parsed as `NewInstance`)
    pub allocators: &'static [&'static str],
}

impl GrammarSpec {
    pub fn is_keyword(&self, text: &str) -> bool {
        self.keywords.contains(&text)
    }

    pub fn keyword_action(&self, keyword: &str) -> Option<KeywordAction> {
        self.dispatch
            .iter()
            .find(|(kw, _)| *kw == keyword)
            .map(|(_, action)| *action)
    }

    /// Longest operator or separator that prefixes `input`
    pub fn longest_symbol(&self, input: &str) -> Option<(&'static str, SymbolKind)> {
        let operators = self.operators.iter().map(|s| (*s, SymbolKind::Operator));
        let separators = self.separators.iter().map(|s| (*s, SymbolKind::Separator));
        operators
            .chain(separators)
            .filter(|(symbol, _)| input.starts_with(symbol))
            .max_by_key(|(symbol, _)| symbol.len())
    }

    pub fn is_intrinsic(&self, name: &str) -> bool {
        self.intrinsics.contains(&name)
    }

    pub fn is_allocator(&self, name: &str) -> bool {
        self.allocators.contains(&name)
    }
}

use KeywordAction::*;

pub static C_LIKE: GrammarSpec = GrammarSpec {
    grammar: Grammar::CLike,
    keywords: &[
        "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
        "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
        "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch",
        "typedef", "union", "unsigned", "void", "volatile", "while",
    ],
    operators: &[
        "=", "==", "!=", ">", "<", ">=", "<=", "+", "-", "*", "/", "%", "++", "--", "&&", "||",
        "!", "&", "|", "^", "~", "<<", ">>", "+=", "-=", "*=", "/=", "%=",
    ],
    separators: &["(", ")", "{", "}", "[", "]", ";", ",", ".", "->"],
    dispatch: &[
        ("for", ForLoop),
        ("while", WhileLoop),
        ("do", DoLoop),
        ("if", Conditional),
        ("else", Conditional),
        ("int", TypeDeclaration),
        ("double", TypeDeclaration),
        ("float", TypeDeclaration),
        ("char", TypeDeclaration),
        ("struct", TypeDeclaration),
        ("void", TypeDeclaration),
        ("long", TypeDeclaration),
        ("short", TypeDeclaration),
        ("signed", TypeDeclaration),
        ("unsigned", TypeDeclaration),
        ("return", Return),
        ("typedef", Typedef),
        ("sizeof", Sizeof),
    ],
    loop_headers: LoopHeaderStyle::Positional,
    strips_comments: false,
    intrinsics: &[
        "printf", "scanf", "puts", "putchar", "getchar", "fprintf", "sprintf", "snprintf",
        "abs", "fabs", "sqrt", "pow", "exit", "free", "assert",
    ],
    allocators: &["malloc", "calloc", "realloc"],
};

pub static JAVA_LIKE: GrammarSpec = GrammarSpec {
    grammar: Grammar::JavaLike,
    keywords: &[
        "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
        "const", "continue", "default", "do", "double", "else", "enum", "extends", "final",
        "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
        "interface", "long", "native", "new", "package", "private", "protected", "public",
        "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this",
        "throw", "throws", "transient", "try", "void", "volatile", "while",
    ],
    operators: &[
        "=", "==", "!=", ">", "<", ">=", "<=", "+", "-", "*", "/", "%", "++", "--", "&&", "||",
        "!", "&", "|", "^", "~", "<<", ">>", ">>>", "+=", "-=", "*=", "/=", "%=",
    ],
    separators: &["(", ")", "{", "}", "[", "]", ";", ",", ".", ":", "->", "::"],
    dispatch: &[
        ("for", ForLoop),
        ("while", WhileLoop),
        ("do", DoLoop),
        ("if", Conditional),
        ("else", Conditional),
        ("switch", Conditional),
        ("case", Conditional),
        ("int", TypeDeclaration),
        ("double", TypeDeclaration),
        ("float", TypeDeclaration),
        ("char", TypeDeclaration),
        ("boolean", TypeDeclaration),
        ("byte", TypeDeclaration),
        ("short", TypeDeclaration),
        ("long", TypeDeclaration),
        ("void", TypeDeclaration),
        ("class", TypeDeclaration),
        ("interface", TypeDeclaration),
        ("return", Return),
        ("new", NewInstance),
        ("this", SpecialReference),
        ("super", SpecialReference),
    ],
    loop_headers: LoopHeaderStyle::Structured,
    strips_comments: true,
    intrinsics: &[
        "println", "print", "printf", "format", "max", "min", "abs", "sqrt", "pow",
        "parseInt", "nextInt", "nextLine", "charAt", "length", "size", "get", "add",
        "equals", "isEmpty",
    ],
    allocators: &[],
};

/// Guesses the grammar from marker substrings.
///
/// `import` / `public class` select the Java-like grammar, `#include` /
/// `int main` the C-like one; the Java markers are checked first.
pub fn detect_grammar(source: &str) -> AnalyzerResult<Grammar> {
    if source.contains("import") || source.contains("public class") {
        Ok(Grammar::JavaLike)
    } else if source.contains("#include") || source.contains("int main") {
        Ok(Grammar::CLike)
    } else {
        Err(AnalyzerError::UnsupportedGrammar)
    }
}

/// Grammar implied by a file extension, if any
pub fn detect_grammar_from_path(path: &Path) -> Option<Grammar> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("c") | Some("h") => Some(Grammar::CLike),
        Some("java") => Some(Grammar::JavaLike),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_grammar() {
        assert_eq!(
            detect_grammar("#include <stdio.h>\nint main() {}").unwrap(),
            Grammar::CLike
        );
        assert_eq!(
            detect_grammar("public class Main { }").unwrap(),
            Grammar::JavaLike
        );
        assert_eq!(
            detect_grammar("import java.util.*;").unwrap(),
            Grammar::JavaLike
        );
        assert_eq!(
            detect_grammar("x = 1"),
            Err(AnalyzerError::UnsupportedGrammar)
        );
    }

    #[test]
    fn test_detect_from_path() {
        assert_eq!(detect_grammar_from_path(Path::new("a/b.c")), Some(Grammar::CLike));
        assert_eq!(
            detect_grammar_from_path(Path::new("Main.java")),
            Some(Grammar::JavaLike)
        );
        assert_eq!(detect_grammar_from_path(Path::new("script.py")), None);
    }

    #[test]
    fn test_longest_symbol_prefers_multi_char() {
        let spec = Grammar::CLike.spec();
        assert_eq!(spec.longest_symbol("++i"), Some(("++", SymbolKind::Operator)));
        assert_eq!(spec.longest_symbol("->next"), Some(("->", SymbolKind::Separator)));
        assert_eq!(spec.longest_symbol("<<2"), Some(("<<", SymbolKind::Operator)));
        assert_eq!(spec.longest_symbol(":x"), None);

        let java = Grammar::JavaLike.spec();
        assert_eq!(java.longest_symbol(">>>1"), Some((">>>", SymbolKind::Operator)));
        assert_eq!(java.longest_symbol("::new"), Some(("::", SymbolKind::Separator)));
    }

    #[test]
    fn test_dispatch_tables_differ() {
        assert_eq!(C_LIKE.keyword_action("sizeof"), Some(Sizeof));
        assert_eq!(JAVA_LIKE.keyword_action("sizeof"), None);
        assert_eq!(JAVA_LIKE.keyword_action("new"), Some(NewInstance));
        assert_eq!(C_LIKE.keyword_action("static"), None);
        assert!(C_LIKE.is_keyword("static"));
    }

    #[test]
    fn test_grammar_from_str() {
        assert_eq!("java".parse::<Grammar>().unwrap(), Grammar::JavaLike);
        assert_eq!("C".parse::<Grammar>().unwrap(), Grammar::CLike);
        assert!("rust".parse::<Grammar>().is_err());
    }
}
