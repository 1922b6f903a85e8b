//! Pipeline configuration.
//!
//! Defaults match the raw export conventions; a JSON config file can
//! override any subset of fields.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Single-character prefix stripped from account ids ("C00042" → 42).
    pub id_prefix: char,
    /// Raw churn_status value marking a churned account. Exact match only;
    /// "y", blank and null are all active.
    pub churn_marker: String,
    /// Plan names the product catalog defines. The validator flags values
    /// outside this set; the normalizer maps them to an absent plan.
    pub expected_plans: Vec<String>,
    /// Channel value the support export writes when the channel is unknown.
    /// Left as-is by the normalizer, reported by the validator.
    pub unknown_channel: String,
    /// Timestamp formats tried in order. Date-only formats parse to
    /// midnight.
    pub timestamp_formats: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            id_prefix: 'C',
            churn_marker: "Y".to_string(),
            expected_plans: vec![
                "Free".to_string(),
                "Basic".to_string(),
                "Pro".to_string(),
                "Enterprise".to_string(),
            ],
            unknown_channel: "-".to_string(),
            timestamp_formats: vec![
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M:%S".to_string(),
                "%Y-%m-%d".to_string(),
            ],
        }
    }
}
