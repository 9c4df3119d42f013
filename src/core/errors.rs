/*!
# Error System for the Complexity Analyzer

Failures of the lexing/parsing/analysis core. "Could not determine" outcomes of
the time analyzer are not errors; they live in [`crate::metrics::Unresolved`].
*/

use thiserror::Error;

/// Result of a core operation
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors raised by the analyzer core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    /// The grammar selector could not classify the input
    #[error("Unsupported grammar: source matches neither the C-like nor the Java-like markers")]
    UnsupportedGrammar,

    /// A structural handler needed more tokens than remained
    #[error("Unexpected end of input while parsing {context}")]
    UnexpectedEndOfInput { context: &'static str },

    /// An analyzer was handed an absent or empty tree
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AnalyzerError {
    pub fn end_of_input(context: &'static str) -> Self {
        AnalyzerError::UnexpectedEndOfInput { context }
    }

    /// Short stable code used in JSON output
    pub fn code(&self) -> &'static str {
        match self {
            AnalyzerError::UnsupportedGrammar => "unsupported-grammar",
            AnalyzerError::UnexpectedEndOfInput { .. } => "unexpected-end-of-input",
            AnalyzerError::InvalidArgument(_) => "invalid-argument",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AnalyzerError::end_of_input("for-loop header");
        assert_eq!(
            err.to_string(),
            "Unexpected end of input while parsing for-loop header"
        );
        assert_eq!(err.code(), "unexpected-end-of-input");

        let err = AnalyzerError::InvalidArgument("syntax tree has no root".to_string());
        assert!(err.to_string().contains("syntax tree has no root"));
    }
}
