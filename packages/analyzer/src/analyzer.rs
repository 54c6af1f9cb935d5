use listing_dom::{AttributeLayout, Document, LayoutSource};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::finding::{Category, Finding};
use crate::rules::RuleRegistry;

const FULL_SCORE: u32 = 100;

/// Options for configuring the analyzer
#[derive(Debug, Default)]
pub struct AnalyzeOptions {
    /// Custom rule registry (uses default if None)
    pub registry: Option<RuleRegistry>,
}

/// Score and advice for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Always within `0..=100`
    pub score: u8,
    /// Distinct tips in first-seen order
    pub tips: Vec<String>,
}

impl AnalysisResult {
    fn from_findings<'a>(findings: impl Iterator<Item = &'a Finding>) -> Self {
        let mut penalty: u32 = 0;
        let mut tips: Vec<String> = Vec::new();
        for finding in findings {
            penalty = penalty.saturating_add(finding.penalty);
            push_unique(&mut tips, &finding.tip);
        }
        let score = FULL_SCORE.saturating_sub(penalty).min(FULL_SCORE) as u8;
        Self { score, tips }
    }
}

/// Both scores plus the merged tip list (SEO tips first)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub seo: AnalysisResult,
    pub performance: AnalysisResult,
    pub tips: Vec<String>,
    pub findings: Vec<Finding>,
}

/// Analyze a document, measuring images from markup only
pub fn analyze(doc: &Document) -> Analysis {
    analyze_with(doc, &AttributeLayout, AnalyzeOptions::default())
}

/// Analyze a document with a host-provided layout source
pub fn analyze_with(doc: &Document, layout: &dyn LayoutSource, options: AnalyzeOptions) -> Analysis {
    let registry = options.registry.unwrap_or_default();

    let mut findings = Vec::new();
    for rule in registry.rules() {
        let found = rule.check(doc, layout);
        if !found.is_empty() {
            debug!(rule = rule.name(), count = found.len(), "Rule reported findings");
        }
        findings.extend(found);
    }

    let seo = AnalysisResult::from_findings(findings.iter().filter(|f| f.category == Category::Seo));
    let performance = AnalysisResult::from_findings(
        findings
            .iter()
            .filter(|f| f.category == Category::Performance),
    );

    let mut tips = Vec::new();
    for tip in seo.tips.iter().chain(performance.tips.iter()) {
        push_unique(&mut tips, tip);
    }

    debug!(seo = seo.score, performance = performance.score, "Analysis complete");
    Analysis {
        seo,
        performance,
        tips,
        findings,
    }
}

fn push_unique(tips: &mut Vec<String>, tip: &str) {
    if !tips.iter().any(|t| t == tip) {
        tips.push(tip.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::AnalysisRule;
    use listing_dom::parse;

    struct Harsh;

    impl AnalysisRule for Harsh {
        fn name(&self) -> &'static str {
            "harsh"
        }

        fn description(&self) -> &'static str {
            "Always deducts more than the full score"
        }

        fn category(&self) -> Category {
            Category::Seo
        }

        fn check(&self, _doc: &Document, _layout: &dyn LayoutSource) -> Vec<Finding> {
            vec![Finding::seo("harsh", 70, "Bad."), Finding::seo("harsh", 70, "Bad.")]
        }
    }

    #[test]
    fn test_scores_clamp_at_zero() {
        let mut registry = RuleRegistry::empty();
        registry.add_rule(Box::new(Harsh));
        let analysis = analyze_with(
            &parse("<p>x</p>"),
            &AttributeLayout,
            AnalyzeOptions {
                registry: Some(registry),
            },
        );

        assert_eq!(analysis.seo.score, 0);
        assert_eq!(analysis.seo.tips, vec!["Bad.".to_string()]);
        assert_eq!(analysis.performance.score, 100);
    }

    #[test]
    fn test_empty_document_collects_every_tip_once() {
        let analysis = analyze(&parse("<a href=\"#\"></a><a href=\"#\"></a>"));

        assert_eq!(analysis.seo.score, 100 - 20 - 15 - 10 - 4 - 10);
        assert_eq!(analysis.performance.score, 95);
        assert_eq!(
            analysis.tips,
            vec![
                "Add a <title> tag.",
                "Add a meta description (≤155 chars).",
                "Add an H1/H2 heading.",
                "Some links lack anchor text.",
                "Add more descriptive text.",
                "Add headings for readability.",
            ]
        );
    }
}
