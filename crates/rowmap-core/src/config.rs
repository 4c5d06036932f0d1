use serde::Deserialize;

/// Operator rendered for a less-than-or-equal comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMapping {
    /// `<=` renders as `>=`, matching SQL produced by earlier releases
    #[default]
    Legacy,
    /// `<=` renders as `<=`
    Corrected,
}

impl ComparisonMapping {
    pub fn less_or_equal(self) -> &'static str {
        match self {
            ComparisonMapping::Legacy => ">=",
            ComparisonMapping::Corrected => "<=",
        }
    }
}

/// Engine-wide settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub comparison_mapping: ComparisonMapping,
}
