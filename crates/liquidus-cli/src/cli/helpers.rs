use super::CliError;
use anyhow::Context;
use liquidus_core::common::config::AnalysisConfig;
use liquidus_core::domain::AnalysisRequest;
use liquidus_core::modules::pipeline::StageSummary;
use std::fs;
use std::path::PathBuf;

/// Config file plus per-field flag overrides; flags win over the file.
#[derive(clap::Args, Debug, Clone, Default)]
pub(super) struct ConfigOverrides {
    /// JSON analysis config (camelCase keys, missing keys use defaults)
    #[arg(long, value_name = "PATH")]
    pub(super) config: Option<PathBuf>,

    /// Minimum mass (g) for listing species, phases and pure solids
    #[arg(long)]
    pub(super) mass_threshold: Option<f64>,

    /// Reactant mass change (g) that starts a new simulation run
    #[arg(long)]
    pub(super) reactant_tolerance: Option<f64>,

    /// Reactant whose mass drives run grouping
    #[arg(long)]
    pub(super) tracked_reactant: Option<String>,

    /// Species whose weight fraction selects the best liquid
    #[arg(long)]
    pub(super) target_element: Option<String>,

    /// Number of ranked runs in the report
    #[arg(long)]
    pub(super) top_k: Option<usize>,
}

pub(super) fn load_analysis_config(overrides: &ConfigOverrides) -> Result<AnalysisConfig, CliError> {
    let mut config = match &overrides.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read analysis config '{}'", path.display()))?;
            AnalysisConfig::from_json_str(&content).map_err(CliError::Compute)?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(mass_threshold) = overrides.mass_threshold {
        config.mass_threshold = mass_threshold;
    }
    if let Some(reactant_tolerance) = overrides.reactant_tolerance {
        config.reactant_tolerance = reactant_tolerance;
    }
    if let Some(tracked_reactant) = &overrides.tracked_reactant {
        config.tracked_reactant = tracked_reactant.clone();
    }
    if let Some(target_element) = &overrides.target_element {
        config.target_element = target_element.clone();
    }
    if let Some(top_k) = overrides.top_k {
        config.top_k = top_k;
    }

    config.validate().map_err(CliError::Compute)?;
    tracing::debug!(?config, "resolved analysis config");
    Ok(config)
}

pub(super) fn render_stage_summary(request: &AnalysisRequest, summary: &StageSummary) -> String {
    let mut lines = vec![format!(
        "{} completed: {} conditions parsed.",
        summary.stage, summary.condition_count
    )];
    if let Some(outcome) = &summary.outcome {
        lines.push(format!(
            "Runs found: {}; runs ranked: {} (top {}).",
            outcome.run_count,
            outcome.ranked.len(),
            request.config.top_k
        ));
    }
    for artifact in &summary.artifacts {
        lines.push(format!(
            "Wrote {}",
            request.output_dir.join(&artifact.relative_path).display()
        ));
    }
    lines.join("\n")
}

pub(super) fn print_stage_summary(request: &AnalysisRequest, summary: &StageSummary) {
    println!("{}", render_stage_summary(request, summary));
}

#[cfg(test)]
mod tests {
    use super::{ConfigOverrides, load_analysis_config, render_stage_summary};
    use liquidus_core::domain::{AnalysisArtifact, AnalysisRequest, PipelineStage};
    use liquidus_core::modules::pipeline::{AnalysisOutcome, StageSummary};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn flags_override_config_file_values() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"topK": 5, "targetElement": "Mn"}"#)
            .expect("config should be written");

        let overrides = ConfigOverrides {
            config: Some(path),
            top_k: Some(1),
            ..ConfigOverrides::default()
        };
        let config = load_analysis_config(&overrides).expect("config should load");
        assert_eq!(config.top_k, 1);
        assert_eq!(config.target_element, "Mn");
        assert_eq!(config.tracked_reactant, "Fe");
    }

    #[test]
    fn missing_config_file_is_reported_with_path_context() {
        let overrides = ConfigOverrides {
            config: Some("does-not-exist.json".into()),
            ..ConfigOverrides::default()
        };
        let error = load_analysis_config(&overrides).expect_err("missing config should fail");
        let diagnostic = error.as_liquidus_error();
        assert_eq!(diagnostic.placeholder(), "IO.CLI");
        assert!(diagnostic.message().contains("does-not-exist.json"));
    }

    #[test]
    fn invalid_override_fails_validation() {
        let overrides = ConfigOverrides {
            mass_threshold: Some(-1.0),
            ..ConfigOverrides::default()
        };
        let error = load_analysis_config(&overrides).expect_err("negative threshold should fail");
        assert_eq!(error.as_liquidus_error().exit_code(), 2);
    }

    #[test]
    fn summary_lists_counts_and_written_paths() {
        let request = AnalysisRequest::new(PipelineStage::Analyze, "export.xml", "out");
        let summary = StageSummary {
            stage: PipelineStage::Analyze,
            condition_count: 4,
            outcome: Some(AnalysisOutcome {
                condition_count: 4,
                run_count: 2,
                ..AnalysisOutcome::default()
            }),
            artifacts: vec![AnalysisArtifact::new("analysis.csv")],
        };

        let rendered = render_stage_summary(&request, &summary);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "ANALYZE completed: 4 conditions parsed.");
        assert_eq!(lines[1], "Runs found: 2; runs ranked: 0 (top 3).");
        assert!(lines[2].starts_with("Wrote out"));
        assert!(lines[2].ends_with("analysis.csv"));
    }
}
