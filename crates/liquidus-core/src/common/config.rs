//! Tunable constants of the phase-window analysis.

use crate::domain::{LiquidusError, LiquidusResult};
use serde::Deserialize;

pub const DEFAULT_MASS_THRESHOLD_G: f64 = 0.01;
pub const DEFAULT_REACTANT_TOLERANCE_G: f64 = 1.0e-3;
pub const DEFAULT_TRACKED_REACTANT: &str = "Fe";
pub const DEFAULT_TARGET_ELEMENT: &str = "Si";
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Minimum mass (g) for a phase, species row or pure solid to be listed.
    pub mass_threshold: f64,
    /// Largest change in tracked reactant mass (g) tolerated inside one run.
    pub reactant_tolerance: f64,
    pub tracked_reactant: String,
    pub target_element: String,
    pub top_k: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mass_threshold: DEFAULT_MASS_THRESHOLD_G,
            reactant_tolerance: DEFAULT_REACTANT_TOLERANCE_G,
            tracked_reactant: DEFAULT_TRACKED_REACTANT.to_string(),
            target_element: DEFAULT_TARGET_ELEMENT.to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(source: &str) -> LiquidusResult<Self> {
        let config = serde_json::from_str::<Self>(source).map_err(|source| {
            LiquidusError::input_validation(
                "INPUT.CONFIG_PARSE",
                format!("failed to parse analysis config: {}", source),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LiquidusResult<()> {
        if !self.mass_threshold.is_finite() || self.mass_threshold < 0.0 {
            return Err(LiquidusError::input_validation(
                "INPUT.CONFIG_THRESHOLD",
                format!(
                    "mass threshold must be a finite non-negative number, got {}",
                    self.mass_threshold
                ),
            ));
        }
        if !self.reactant_tolerance.is_finite() || self.reactant_tolerance < 0.0 {
            return Err(LiquidusError::input_validation(
                "INPUT.CONFIG_TOLERANCE",
                format!(
                    "reactant tolerance must be a finite non-negative number, got {}",
                    self.reactant_tolerance
                ),
            ));
        }
        if self.tracked_reactant.trim().is_empty() {
            return Err(LiquidusError::input_validation(
                "INPUT.CONFIG_REACTANT",
                "tracked reactant name must not be empty",
            ));
        }
        if self.target_element.trim().is_empty() {
            return Err(LiquidusError::input_validation(
                "INPUT.CONFIG_TARGET",
                "target element name must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::AnalysisConfig;
    use crate::domain::LiquidusErrorCategory;

    #[test]
    fn defaults_match_documented_constants() {
        let config = AnalysisConfig::default();
        assert_eq!(config.mass_threshold, 0.01);
        assert_eq!(config.reactant_tolerance, 1.0e-3);
        assert_eq!(config.tracked_reactant, "Fe");
        assert_eq!(config.target_element, "Si");
        assert_eq!(config.top_k, 3);
    }

    #[test]
    fn json_config_fills_missing_keys_from_defaults() {
        let config = AnalysisConfig::from_json_str(r#"{ "topK": 5, "targetElement": "Mn" }"#)
            .expect("partial config should parse");
        assert_eq!(config.top_k, 5);
        assert_eq!(config.target_element, "Mn");
        assert_eq!(config.tracked_reactant, "Fe");
        assert_eq!(config.mass_threshold, 0.01);
    }

    #[test]
    fn json_config_rejects_unknown_keys_and_negative_thresholds() {
        let unknown = AnalysisConfig::from_json_str(r#"{ "massThreshhold": 0.1 }"#)
            .expect_err("misspelled key should fail");
        assert_eq!(unknown.placeholder(), "INPUT.CONFIG_PARSE");

        let negative = AnalysisConfig::from_json_str(r#"{ "massThreshold": -1.0 }"#)
            .expect_err("negative threshold should fail");
        assert_eq!(
            negative.category(),
            LiquidusErrorCategory::InputValidationError
        );
        assert_eq!(negative.placeholder(), "INPUT.CONFIG_THRESHOLD");
    }
}
