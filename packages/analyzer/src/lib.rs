mod analyzer;
mod finding;
mod rules;

pub use analyzer::{analyze, analyze_with, Analysis, AnalysisResult, AnalyzeOptions};
pub use finding::{Category, Finding};
pub use rules::{AnalysisRule, RuleRegistry};
