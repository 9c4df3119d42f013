/*!
# Complexity Analyzer

Static estimator of asymptotic time and space complexity for short C-like and
Java-like code snippets.

## Pipeline

```text
source ──► Lexer ──► StructuralParser ──► SyntaxTree ──┬─► TimeComplexityAnalyzer
           (grammar tables)                            └─► SpaceComplexityAnalyzer
```

- **Parser** - table-driven tokenizer and a shallow, stack-driven structural
  parser. It does not validate programs; it only recovers loops,
  conditionals, declarations, calls and returns.
- **Metrics** - Big-O algebra plus the time and space analyzers.
- **Core** - errors, reports and file reading.

## Usage

```rust
use complexity_analyzer::{analyze_source, Grammar};

let report = analyze_source("for (i = 0; i < n; i++) { a[n]; }", Grammar::CLike)?;
assert_eq!(report.time_notation(), "O(n)");
assert_eq!(report.space_notation(), "O(n)");
# Ok::<(), complexity_analyzer::AnalyzerError>(())
```
*/

pub mod cli_common;
pub mod config;
pub mod core;
pub mod metrics;
pub mod parser;

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use crate::config::{AnalyzerConfig, GrammarChoice};
pub use crate::core::{
    AnalyzerError, AnalyzerResult, BatchReport, ComplexityReport, FileOutcome, FileReport,
    FunctionSummary,
};
pub use crate::metrics::{
    Complexity, ComplexityClass, SpaceComplexity, SpaceComplexityAnalyzer, TimeComplexity,
    TimeComplexityAnalyzer, Unresolved,
};
pub use crate::parser::{
    detect_grammar, ComplexityParser, Grammar, NodeKind, SyntaxTree, Token, TokenKind,
};

/// Parser plus both analyzers for one grammar
#[derive(Debug, Clone)]
pub struct ComplexityEngine {
    parser: ComplexityParser,
}

impl ComplexityEngine {
    pub fn new(grammar: Grammar) -> Self {
        Self {
            parser: ComplexityParser::new(grammar),
        }
    }

    /// Engine using the intrinsics configured for `grammar`
    pub fn from_config(grammar: Grammar, config: &AnalyzerConfig) -> Self {
        Self::new(grammar).with_intrinsics(config.intrinsics_for(grammar).iter().cloned())
    }

    pub fn with_intrinsics(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.parser = self.parser.with_intrinsics(names);
        self
    }

    pub fn grammar(&self) -> Grammar {
        self.parser.grammar()
    }

    pub fn parser(&self) -> &ComplexityParser {
        &self.parser
    }

    /// Tokenize, parse and analyse a snippet
    pub fn analyze(&self, source: &str) -> AnalyzerResult<ComplexityReport> {
        let tokens = self.parser.tokenize(source);
        let tree = self.parser.parse_tokens(&tokens)?;
        self.analyze_tree(&tree, tokens.len())
    }

    /// Analyse an already parsed tree
    pub fn analyze_tree(
        &self,
        tree: &SyntaxTree,
        token_count: usize,
    ) -> AnalyzerResult<ComplexityReport> {
        let time_analyzer = TimeComplexityAnalyzer::new();
        let time = time_analyzer.analyze(tree)?;
        let space = SpaceComplexityAnalyzer::new().analyze(tree)?;
        let functions = time_analyzer
            .analyze_functions(tree)
            .into_iter()
            .map(FunctionSummary::from)
            .collect();
        let notes = ComplexityReport::derive_notes(&time, &space, tree.unclosed_scopes());

        Ok(ComplexityReport {
            grammar: self.grammar(),
            time,
            space,
            functions,
            notes,
            token_count,
            node_count: tree.len(),
            unclosed_scopes: tree.unclosed_scopes(),
        })
    }
}

/// Analyse a snippet with the given grammar
pub fn analyze_source(source: &str, grammar: Grammar) -> AnalyzerResult<ComplexityReport> {
    ComplexityEngine::new(grammar).analyze(source)
}

/// Analyse a snippet, choosing the grammar from its markers
pub fn analyze_detected(source: &str) -> AnalyzerResult<ComplexityReport> {
    analyze_source(source, detect_grammar(source)?)
}

/// Source files (`.c`, `.h`, `.java`) under `dir`, sorted by path
pub fn collect_source_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| parser::detect_grammar_from_path(path).is_some())
        .collect();
    files.sort();
    files
}

/// Analyse one file; the grammar comes from the config choice, the file
/// extension, or the source markers, in that order.
pub fn analyze_file(path: &Path, config: &AnalyzerConfig) -> FileReport {
    let outcome = match crate::core::read_source_file(path) {
        Err(err) => FileOutcome::Error {
            code: "io-error".to_string(),
            message: err.to_string(),
        },
        Ok(source) => {
            let result = config
                .analysis
                .grammar
                .resolve(&source, Some(path))
                .and_then(|grammar| ComplexityEngine::from_config(grammar, config).analyze(&source));
            match result {
                Ok(report) => FileOutcome::Report(report),
                Err(err) => FileOutcome::Error {
                    code: err.code().to_string(),
                    message: err.to_string(),
                },
            }
        }
    };

    FileReport {
        path: path.to_path_buf(),
        outcome,
    }
}

/// Analyse every source file under `dir` in parallel
pub fn analyze_directory(dir: &Path, config: &AnalyzerConfig) -> BatchReport {
    let files = collect_source_files(dir);
    tracing::info!("Analyzing {} source files in {}", files.len(), dir.display());

    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| analyze_file(path, config))
        .collect();

    BatchReport { files: reports }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_counts() {
        let report = analyze_source("int x = 1;", Grammar::CLike).unwrap();
        assert_eq!(report.token_count, 5);
        assert_eq!(report.unclosed_scopes, 0);
        assert!(report.functions.is_empty());
        assert!(report.notes.is_empty());
    }

    #[test]
    fn test_analyze_detected() {
        let report = analyze_detected("#include <stdio.h>\nint main() { return 0; }").unwrap();
        assert_eq!(report.grammar, Grammar::CLike);
        assert_eq!(report.functions[0].name, "main");
        assert_eq!(
            analyze_detected("x = 1;").unwrap_err(),
            AnalyzerError::UnsupportedGrammar
        );
    }

    #[test]
    fn test_engine_uses_configured_intrinsics() {
        let mut config = AnalyzerConfig::default();
        config.intrinsics.c.push("trace".to_string());
        let source = "for (i = 0; i < n; i++) { trace(i); }";

        let plain = ComplexityEngine::new(Grammar::CLike).analyze(source).unwrap();
        assert_eq!(plain.time_notation(), "O(?)");

        let configured = ComplexityEngine::from_config(Grammar::CLike, &config)
            .analyze(source)
            .unwrap();
        assert_eq!(configured.time_notation(), "O(n)");
    }
}
