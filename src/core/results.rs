/*!
# Analysis Results

Report structures produced by the engine and consumed by the output writers.
Complexity values serialize as their Big-O notation.
*/

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

use crate::metrics::{FunctionComplexity, SpaceComplexity, TimeComplexity};
use crate::parser::Grammar;

fn as_notation<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Per-function entry of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSummary {
    pub name: String,
    #[serde(serialize_with = "as_notation")]
    pub time: TimeComplexity,
}

impl From<FunctionComplexity> for FunctionSummary {
    fn from(value: FunctionComplexity) -> Self {
        Self {
            name: value.name,
            time: value.time,
        }
    }
}

/// Outcome of analysing one snippet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexityReport {
    pub grammar: Grammar,
    #[serde(serialize_with = "as_notation")]
    pub time: TimeComplexity,
    #[serde(serialize_with = "as_notation")]
    pub space: SpaceComplexity,
    pub functions: Vec<FunctionSummary>,
    /// Human-readable caveats (unresolved calls, recursion, open scopes)
    pub notes: Vec<String>,
    pub token_count: usize,
    pub node_count: usize,
    pub unclosed_scopes: usize,
}

impl ComplexityReport {
    pub fn time_notation(&self) -> String {
        self.time.to_string()
    }

    pub fn space_notation(&self) -> String {
        self.space.to_string()
    }

    /// Collects notes from the analysis results
    pub fn derive_notes(time: &TimeComplexity, space: &SpaceComplexity, unclosed: usize) -> Vec<String> {
        let mut notes = Vec::new();
        if let Some(reason) = time.unresolved() {
            notes.push(reason.to_string());
        }
        if space.recursion_detected {
            notes.push("recursion detected; call stack grows linearly".to_string());
        }
        if let Some(footprint) = &space.literal_footprint {
            notes.push(format!("fixed-size arrays occupy {}", footprint));
        }
        if unclosed > 0 {
            notes.push(format!("{} scope(s) left open at end of input", unclosed));
        }
        notes
    }
}

impl fmt::Display for ComplexityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time Complexity: {}", self.time)?;
        write!(f, "Space Complexity: {}", self.space)
    }
}

/// One file of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    Report(ComplexityReport),
    Error { code: String, message: String },
}

/// Aggregate of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn analyzed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Report(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.analyzed()
    }
}
