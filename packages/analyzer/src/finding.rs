use serde::{Deserialize, Serialize};

/// Which score a finding counts against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Seo,
    Performance,
}

/// A single deduction produced by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,

    /// The rule that produced this finding
    pub rule: String,

    /// Points taken off the category score
    pub penalty: u32,

    /// Advice shown to the user
    pub tip: String,
}

impl Finding {
    pub fn seo(rule: impl Into<String>, penalty: u32, tip: impl Into<String>) -> Self {
        Self {
            category: Category::Seo,
            rule: rule.into(),
            penalty,
            tip: tip.into(),
        }
    }

    pub fn performance(rule: impl Into<String>, penalty: u32, tip: impl Into<String>) -> Self {
        Self {
            category: Category::Performance,
            rule: rule.into(),
            penalty,
            tip: tip.into(),
        }
    }
}
