/*!
# Complexity Metrics

Asymptotic bounds computed over a parsed [`SyntaxTree`](crate::parser::SyntaxTree):
the Big-O algebra plus the time and space analyzers built on it.
*/

pub mod complexity;
pub mod space;
pub mod time;

pub use complexity::{Complexity, ComplexityClass};
pub use space::{SpaceComplexity, SpaceComplexityAnalyzer};
pub use time::{FunctionComplexity, TimeComplexity, TimeComplexityAnalyzer, Unresolved};
