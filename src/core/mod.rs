/*!
# Core Module

Error types, report structures and file helpers shared by the library and CLI.
*/

pub mod errors;
pub mod fs_utils;
pub mod results;

pub use errors::{AnalyzerError, AnalyzerResult};
pub use fs_utils::read_source_file;
pub use results::{BatchReport, ComplexityReport, FileOutcome, FileReport, FunctionSummary};
